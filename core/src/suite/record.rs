use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outlier counts as classified by the upstream estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierCounts {
    #[serde(default)]
    pub mild_low: u64,
    #[serde(default)]
    pub mild_high: u64,
    #[serde(default)]
    pub severe_low: u64,
    #[serde(default)]
    pub severe_high: u64,
}

impl OutlierCounts {
    pub fn total(&self) -> u64 {
        self.mild_low + self.mild_high + self.severe_low + self.severe_high
    }

    pub fn severe(&self) -> u64 {
        self.severe_low + self.severe_high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    Linear,
    Flat,
}

impl SamplingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingMode::Linear => "linear",
            SamplingMode::Flat => "flat",
        }
    }
}

/// One measured data point. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<String>,
    parameter: String,
    point_estimate_nanos: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sampling_mode: Option<SamplingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outliers: Option<OutlierCounts>,
    source: PathBuf,
}

impl ResultRecord {
    pub fn new(group: impl Into<String>, parameter: impl Into<String>, point_estimate_nanos: f64) -> Self {
        Self {
            group: group.into(),
            function: None,
            parameter: parameter.into(),
            point_estimate_nanos,
            confidence_low: None,
            confidence_high: None,
            sample_count: None,
            total_iterations: None,
            sampling_mode: None,
            outliers: None,
            source: PathBuf::new(),
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_confidence(mut self, low: f64, high: f64) -> Self {
        self.confidence_low = Some(low);
        self.confidence_high = Some(high);
        self
    }

    pub fn with_sample_count(mut self, count: u64) -> Self {
        self.sample_count = Some(count);
        self
    }

    pub fn with_total_iterations(mut self, iterations: u64) -> Self {
        self.total_iterations = Some(iterations);
        self
    }

    pub fn with_sampling_mode(mut self, mode: SamplingMode) -> Self {
        self.sampling_mode = Some(mode);
        self
    }

    pub fn with_outliers(mut self, outliers: OutlierCounts) -> Self {
        self.outliers = Some(outliers);
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn point_estimate_nanos(&self) -> f64 {
        self.point_estimate_nanos
    }

    pub fn confidence_low(&self) -> Option<f64> {
        self.confidence_low
    }

    pub fn confidence_high(&self) -> Option<f64> {
        self.confidence_high
    }

    pub fn sample_count(&self) -> Option<u64> {
        self.sample_count
    }

    pub fn total_iterations(&self) -> Option<u64> {
        self.total_iterations
    }

    pub fn sampling_mode(&self) -> Option<SamplingMode> {
        self.sampling_mode
    }

    pub fn outliers(&self) -> Option<OutlierCounts> {
        self.outliers
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Parameter as a positive integer input size, if it is one.
    pub fn numeric_parameter(&self) -> Option<u64> {
        parse_size(&self.parameter)
    }
}

pub fn parse_size(parameter: &str) -> Option<u64> {
    if parameter.is_empty() || !parameter.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parameter.parse::<u64>().ok().filter(|size| *size > 0)
}
