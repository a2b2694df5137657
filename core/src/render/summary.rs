use crate::analysis::{GroupScaling, ScalingReport};
use crate::error::Warning;
use crate::suite::AggregatedSuite;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    generated_at: String,
    groups: &'a AggregatedSuite,
    scaling: &'a BTreeMap<String, GroupScaling>,
    warnings: Vec<&'a Warning>,
}

pub fn render_json(
    suite: &AggregatedSuite,
    report: &ScalingReport,
    warnings: &[Warning],
    generated_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    let document = SummaryDocument {
        generated_at: generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        groups: suite,
        scaling: &report.groups,
        warnings: warnings.iter().chain(report.warnings.iter()).collect(),
    };
    serde_json::to_string_pretty(&document)
}

pub fn render_csv(suite: &AggregatedSuite, report: &ScalingReport) -> String {
    let mut out = String::new();
    out.push_str("group,function,parameter,mean_ns,ci_low_ns,ci_high_ns,per_entry_ns,sample_count\n");
    for record in suite.records() {
        let per_entry = report
            .group(record.group())
            .and_then(|scaling| scaling.points.iter().find(|p| p.parameter == record.parameter()))
            .map(|p| p.per_entry_nanos);
        let _ = writeln!(
            out,
            "{},{},{},{:.3},{},{},{},{}",
            csv_field(record.group()),
            csv_field(record.function().unwrap_or("")),
            csv_field(record.parameter()),
            record.point_estimate_nanos(),
            optional_float(record.confidence_low()),
            optional_float(record.confidence_high()),
            optional_float(per_entry),
            record.sample_count().map(|n| n.to_string()).unwrap_or_default()
        );
    }
    out
}

fn optional_float(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

