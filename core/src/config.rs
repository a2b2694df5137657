use crate::error::BenchError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Extensions recognised for estimate and sample files, in lookup order.
pub const ESTIMATE_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Snapshot directories accepted below a parameter (Criterion writes `new`).
    pub labels: Vec<String>,
    /// Directory names that never hold estimates and are not descended into.
    pub excluded: Vec<String>,
    pub estimate_stem: String,
    pub sample_stem: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            labels: vec!["new".to_string()],
            excluded: vec!["report".to_string(), "base".to_string(), "change".to_string()],
            estimate_stem: "estimates".to_string(),
            sample_stem: "sample".to_string(),
        }
    }
}

impl ReaderConfig {
    pub fn is_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|excluded| excluded == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Minimum implied sampling time before a record is flagged.
    pub target_duration: Duration,
    pub min_sample_count: u64,
    /// Relative per-entry cost change tolerated before a trend is non-stable.
    pub trend_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_duration: Duration::from_secs(1),
            min_sample_count: 10,
            trend_tolerance: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub summary_stem: String,
    pub write_json: bool,
    pub write_csv: bool,
    /// Timestamp embedded in `summary.json`; `None` means now.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            summary_stem: "summary".to_string(),
            write_json: true,
            write_csv: true,
            generated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub reader: ReaderConfig,
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    parallel: Option<bool>,
    #[serde(default)]
    reader: ReaderSection,
    #[serde(default)]
    analysis: AnalysisSection,
    #[serde(default)]
    render: RenderSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ReaderSection {
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    excluded: Option<Vec<String>>,
    #[serde(default)]
    estimate_stem: Option<String>,
    #[serde(default)]
    sample_stem: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AnalysisSection {
    #[serde(default)]
    target_duration_secs: Option<f64>,
    #[serde(default)]
    min_sample_count: Option<u64>,
    #[serde(default)]
    trend_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RenderSection {
    #[serde(default)]
    summary_stem: Option<String>,
    #[serde(default)]
    write_json: Option<bool>,
    #[serde(default)]
    write_csv: Option<bool>,
}

impl PipelineConfig {
    /// Parse a TOML config, overlaying the values it sets on the defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, BenchError> {
        let file: FileConfig =
            toml::from_str(input).map_err(|e| BenchError::config(format!("config is not valid TOML: {}", e)))?;
        let mut config = PipelineConfig::default();
        config.apply(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| BenchError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&input)
    }

    fn apply(&mut self, file: FileConfig) -> Result<(), BenchError> {
        if let Some(parallel) = file.parallel {
            self.parallel = parallel;
        }

        let reader = file.reader;
        if let Some(labels) = reader.labels {
            self.reader.labels = labels;
        }
        if let Some(excluded) = reader.excluded {
            self.reader.excluded = excluded;
        }
        if let Some(stem) = reader.estimate_stem {
            self.reader.estimate_stem = stem;
        }
        if let Some(stem) = reader.sample_stem {
            self.reader.sample_stem = stem;
        }

        let analysis = file.analysis;
        if let Some(secs) = analysis.target_duration_secs {
            self.analysis.target_duration = duration_from_secs(secs)?;
        }
        if let Some(count) = analysis.min_sample_count {
            self.analysis.min_sample_count = count;
        }
        if let Some(tolerance) = analysis.trend_tolerance {
            self.analysis.trend_tolerance = tolerance;
        }

        let render = file.render;
        if let Some(stem) = render.summary_stem {
            self.render.summary_stem = stem;
        }
        if let Some(json) = render.write_json {
            self.render.write_json = json;
        }
        if let Some(csv) = render.write_csv {
            self.render.write_csv = csv;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.reader.estimate_stem.trim().is_empty() {
            return Err(BenchError::config("reader.estimate_stem must not be empty"));
        }
        if self.render.summary_stem.trim().is_empty() {
            return Err(BenchError::config("render.summary_stem must not be empty"));
        }
        let tolerance = self.analysis.trend_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(BenchError::config(format!(
                "analysis.trend_tolerance must be a non-negative number, got {}",
                tolerance
            )));
        }
        Ok(())
    }
}

pub fn duration_from_secs(secs: f64) -> Result<Duration, BenchError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| BenchError::config(format!("duration must be a non-negative number of seconds, got {}", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn sections_overlay_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
parallel = true

[reader]
labels = ["new", "base"]

[analysis]
target_duration_secs = 2.5
trend_tolerance = 0.2

[render]
write_csv = false
"#,
        )
        .expect("config parses");

        assert!(config.parallel);
        assert_eq!(config.reader.labels, vec!["new", "base"]);
        assert_eq!(config.reader.estimate_stem, "estimates");
        assert_eq!(config.analysis.target_duration, Duration::from_millis(2500));
        assert_eq!(config.analysis.min_sample_count, 10);
        assert!((config.analysis.trend_tolerance - 0.2).abs() < f64::EPSILON);
        assert!(config.render.write_json);
        assert!(!config.render.write_csv);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let err = PipelineConfig::from_toml_str("[analysis]\nbogus = 1\n").unwrap_err();
        assert!(err.to_string().contains("not valid TOML"));

        let err = PipelineConfig::from_toml_str("[analysis]\ntarget_duration_secs = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("non-negative"));

        let err = PipelineConfig::from_toml_str("[analysis]\ntrend_tolerance = -0.5\n").unwrap_err();
        assert!(err.to_string().contains("trend_tolerance"));
    }
}
