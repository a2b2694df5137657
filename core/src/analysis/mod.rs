//! Per-entry scaling, trend classification and sample-sufficiency checks.

#[cfg(test)]
mod analysis_test;

use crate::config::AnalysisConfig;
use crate::error::{Warning, WarningKind};
use crate::suite::{AggregatedSuite, OutlierCounts, ResultRecord, parse_size};
use crate::units::format_nanos;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingPoint {
    pub parameter: String,
    pub size: u64,
    pub total_nanos: f64,
    pub per_entry_nanos: f64,
}

/// A parameter that is not an input size; kept without per-entry scaling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPoint {
    pub parameter: String,
    pub total_nanos: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Stable,
    Superlinear,
    Sublinear,
    Undetermined,
}

impl Trend {
    /// Classify the relative per-entry cost change between the smallest and
    /// largest input.
    pub fn classify(change: f64, tolerance: f64) -> Self {
        if change > tolerance {
            Trend::Superlinear
        } else if change < -tolerance {
            Trend::Sublinear
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Stable => "stable",
            Trend::Superlinear => "superlinear",
            Trend::Sublinear => "sublinear",
            Trend::Undetermined => "undetermined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierEntry {
    pub parameter: String,
    pub counts: OutlierCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScaling {
    pub group: String,
    /// Ascending by `size`.
    pub points: Vec<ScalingPoint>,
    pub raw: Vec<RawPoint>,
    pub trend: Trend,
    /// `cost(largest) / cost(smallest) - 1`, when defined.
    pub cost_change: Option<f64>,
    pub outliers: Vec<OutlierEntry>,
}

impl GroupScaling {
    pub fn parameter_order(&self) -> impl Iterator<Item = &str> {
        self.points
            .iter()
            .map(|p| p.parameter.as_str())
            .chain(self.raw.iter().map(|p| p.parameter.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScalingReport {
    pub groups: BTreeMap<String, GroupScaling>,
    pub warnings: Vec<Warning>,
}

impl ScalingReport {
    pub fn group(&self, name: &str) -> Option<&GroupScaling> {
        self.groups.get(name)
    }

    pub fn warnings_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Warning> + 'a {
        self.warnings.iter().filter(move |w| w.is_for_group(group))
    }
}

pub fn analyze(suite: &AggregatedSuite, config: &AnalysisConfig) -> ScalingReport {
    let mut report = ScalingReport::default();

    for (group, params) in suite.groups() {
        let scaling = scale_group(group, params.values(), config.trend_tolerance);

        for parameter in scaling.parameter_order() {
            if let Some(warning) = params.get(parameter).and_then(|record| check_samples(record, config)) {
                warn!("{}", warning);
                report.warnings.push(warning);
            }
        }

        info!(
            group,
            points = scaling.points.len(),
            trend = scaling.trend.as_str(),
            "analyzed group"
        );
        report.groups.insert(group.to_string(), scaling);
    }

    report
}

pub fn scale_group<'a, I>(group: &str, records: I, tolerance: f64) -> GroupScaling
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut points = Vec::new();
    let mut raw = Vec::new();
    let mut outliers = Vec::new();

    for record in records {
        let total_nanos = record.point_estimate_nanos();
        match record.numeric_parameter() {
            Some(size) => points.push(ScalingPoint {
                parameter: record.parameter().to_string(),
                size,
                total_nanos,
                per_entry_nanos: total_nanos / size as f64,
            }),
            None => {
                debug!(group, parameter = record.parameter(), "parameter is not an input size");
                raw.push(RawPoint {
                    parameter: record.parameter().to_string(),
                    total_nanos,
                });
            }
        }
        if let Some(counts) = record.outliers() {
            outliers.push(OutlierEntry {
                parameter: record.parameter().to_string(),
                counts,
            });
        }
    }

    points.sort_by(|a, b| a.size.cmp(&b.size));
    raw.sort_by(|a, b| a.parameter.cmp(&b.parameter));
    outliers.sort_by(|a, b| compare_parameters(&a.parameter, &b.parameter));

    let (trend, cost_change) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => {
            let change = relative_change(first.per_entry_nanos, last.per_entry_nanos);
            match change {
                Some(change) => (Trend::classify(change, tolerance), Some(change)),
                None => (Trend::Superlinear, None),
            }
        }
        _ => (Trend::Undetermined, None),
    };

    GroupScaling {
        group: group.to_string(),
        points,
        raw,
        trend,
        cost_change,
        outliers,
    }
}

/// `to / from - 1`; `None` when the base is zero and the target is not.
fn relative_change(from: f64, to: f64) -> Option<f64> {
    if from > 0.0 {
        Some(to / from - 1.0)
    } else if to > 0.0 {
        None
    } else {
        Some(0.0)
    }
}

/// Numeric parameters ascending, then the rest lexicographically.
pub fn compare_parameters(a: &str, b: &str) -> Ordering {
    match (parse_size(a), parse_size(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Flag records whose sampling looks too thin to trust.
///
/// A record is flagged when it has fewer than `min_sample_count` samples, or
/// when `point_estimate * total_iterations` (falling back to the sample
/// count when the iteration total is unknown) is below `target_duration`.
/// Records without a sample count are never flagged.
pub fn check_samples(record: &ResultRecord, config: &AnalysisConfig) -> Option<Warning> {
    let samples = record.sample_count()?;
    let iterations = record.total_iterations().unwrap_or(samples);
    let implied_nanos = record.point_estimate_nanos() * iterations as f64;
    let target_nanos = config.target_duration.as_secs_f64() * 1e9;

    let reason = if samples < config.min_sample_count {
        format!(
            "insufficient samples: only {} collected (minimum {}); increase the measurement time or enable flat sampling",
            samples, config.min_sample_count
        )
    } else if implied_nanos < target_nanos {
        let suggested = ((samples as f64) * implied_nanos / target_nanos).floor() as u64;
        let suggested = suggested.max(config.min_sample_count.max(1)).min(samples);
        format!(
            "insufficient sample duration: {} samples cover {} of the {} target; increase the measurement time, enable flat sampling, or reduce the sample count to {}",
            samples,
            format_nanos(implied_nanos),
            format_nanos(target_nanos),
            suggested
        )
    } else {
        return None;
    };

    Some(
        Warning::for_entry(WarningKind::InsufficientSamples, record.group(), record.parameter(), reason)
            .with_path(record.source()),
    )
}
