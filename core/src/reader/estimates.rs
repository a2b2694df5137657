use crate::suite::{OutlierCounts, SamplingMode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn decode<T: DeserializeOwned>(self, input: &str) -> Result<T, String> {
        match self {
            Format::Json => serde_json::from_str(input).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(input).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(input).map_err(|e| e.to_string()),
        }
    }
}

/// Criterion's `estimates.json`, plus optional fields other exporters add.
#[derive(Debug, Deserialize)]
struct EstimateFile {
    #[serde(default)]
    mean: Option<Stat>,
    #[serde(default)]
    sample_count: Option<u64>,
    #[serde(default)]
    total_iterations: Option<u64>,
    #[serde(default)]
    outliers: Option<OutlierCounts>,
}

#[derive(Debug, Deserialize)]
struct Stat {
    #[serde(default)]
    point_estimate: Option<f64>,
    #[serde(default)]
    confidence_interval: Option<ConfidenceInterval>,
}

#[derive(Debug, Deserialize)]
struct ConfidenceInterval {
    lower_bound: f64,
    upper_bound: f64,
}

/// Criterion's `sample.json`.
#[derive(Debug, Deserialize)]
struct SampleFile {
    #[serde(default)]
    sampling_mode: Option<SamplingMode>,
    iters: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estimates {
    pub mean_nanos: f64,
    pub confidence: Option<(f64, f64)>,
    pub sample_count: Option<u64>,
    pub total_iterations: Option<u64>,
    pub outliers: Option<OutlierCounts>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub sampling_mode: Option<SamplingMode>,
    pub sample_count: u64,
    pub total_iterations: u64,
}

pub fn parse_estimates(input: &str, format: Format) -> Result<Estimates, String> {
    let file: EstimateFile = format.decode(input)?;
    let mean = file.mean.ok_or_else(|| "missing field `mean`".to_string())?;
    let mean_nanos = mean
        .point_estimate
        .ok_or_else(|| "missing field `mean.point_estimate`".to_string())?;
    if !mean_nanos.is_finite() || mean_nanos < 0.0 {
        return Err(format!(
            "mean.point_estimate must be a finite non-negative number of nanoseconds, got {}",
            mean_nanos
        ));
    }

    Ok(Estimates {
        mean_nanos,
        confidence: mean
            .confidence_interval
            .map(|interval| (interval.lower_bound, interval.upper_bound)),
        sample_count: file.sample_count,
        total_iterations: file.total_iterations,
        outliers: file.outliers,
    })
}

pub fn parse_samples(input: &str, format: Format) -> Result<Samples, String> {
    let file: SampleFile = format.decode(input)?;
    let total: f64 = file.iters.iter().sum();
    if !total.is_finite() || total < 0.0 {
        return Err(format!("iteration counts must be non-negative, got total {}", total));
    }
    Ok(Samples {
        sampling_mode: file.sampling_mode,
        sample_count: file.iters.len() as u64,
        total_iterations: total.round() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRITERION_ESTIMATES: &str = r#"{
        "mean": {
            "confidence_interval": {"confidence_level": 0.95, "lower_bound": 17650.2, "upper_bound": 18120.9},
            "point_estimate": 17885.0,
            "standard_error": 120.4
        },
        "median": {
            "confidence_interval": {"confidence_level": 0.95, "lower_bound": 17600.0, "upper_bound": 18000.0},
            "point_estimate": 17800.0,
            "standard_error": 100.0
        },
        "slope": null
    }"#;

    #[test]
    fn parses_criterion_json() {
        let estimates = parse_estimates(CRITERION_ESTIMATES, Format::Json).expect("criterion output parses");
        assert_eq!(estimates.mean_nanos, 17885.0);
        assert_eq!(estimates.confidence, Some((17650.2, 18120.9)));
        assert_eq!(estimates.sample_count, None);
        assert_eq!(estimates.outliers, None);
    }

    #[test]
    fn parses_toml_with_extras() {
        let input = r#"
sample_count = 100

[mean]
point_estimate = 182700.0

[outliers]
mild_high = 3
severe_high = 1
"#;
        let estimates = parse_estimates(input, Format::Toml).expect("toml parses");
        assert_eq!(estimates.mean_nanos, 182700.0);
        assert_eq!(estimates.sample_count, Some(100));
        let outliers = estimates.outliers.expect("outliers present");
        assert_eq!(outliers.mild_high, 3);
        assert_eq!(outliers.severe_high, 1);
        assert_eq!(outliers.total(), 4);
    }

    #[test]
    fn parses_yaml() {
        let input = "mean:\n  point_estimate: 1798300\n";
        let estimates = parse_estimates(input, Format::Yaml).expect("yaml parses");
        assert_eq!(estimates.mean_nanos, 1_798_300.0);
    }

    #[test]
    fn missing_mean_is_an_error() {
        let err = parse_estimates(r#"{"median": {"point_estimate": 1.0}}"#, Format::Json).unwrap_err();
        assert!(err.contains("mean"));

        let err = parse_estimates(r#"{"mean": {"standard_error": 1.0}}"#, Format::Json).unwrap_err();
        assert!(err.contains("mean.point_estimate"));
    }

    #[test]
    fn rejects_negative_and_non_numeric_estimates() {
        assert!(parse_estimates(r#"{"mean": {"point_estimate": -3.0}}"#, Format::Json).is_err());
        assert!(parse_estimates(r#"{"mean": {"point_estimate": "fast"}}"#, Format::Json).is_err());
        assert!(parse_estimates("not json", Format::Json).is_err());
    }

    #[test]
    fn sample_sidecar_counts_iterations() {
        let input = r#"{"sampling_mode": "Linear", "iters": [1.0, 2.0, 3.0, 4.0], "times": [10.0, 20.0, 30.0, 40.0]}"#;
        let samples = parse_samples(input, Format::Json).expect("sample parses");
        assert_eq!(samples.sampling_mode, Some(SamplingMode::Linear));
        assert_eq!(samples.sample_count, 4);
        assert_eq!(samples.total_iterations, 10);
    }
}
