use crate::analysis::{GroupScaling, OutlierEntry, ScalingReport, Trend, compare_parameters};
use crate::error::Warning;
use crate::suite::{AggregatedSuite, OutlierCounts, ResultRecord};
use crate::units::format_nanos;
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const NO_DATA_MESSAGE: &str = "no data to visualize";

/// Markdown summary: one section per group, then warnings that do not belong
/// to any rendered group.
pub fn render_narrative(suite: &AggregatedSuite, report: &ScalingReport, warnings: &[Warning]) -> String {
    let mut out = String::new();
    out.push_str("# Benchmark summary\n\n");

    if suite.is_empty() {
        let _ = writeln!(out, "{}\n", NO_DATA_MESSAGE);
        write_warning_list(&mut out, warnings.iter());
        return out;
    }

    let _ = writeln!(
        out,
        "{} groups, {} measurements.\n",
        suite.group_count(),
        suite.record_count()
    );

    for (group, params) in suite.groups() {
        let _ = writeln!(out, "## {}\n", group);
        write_measurements(&mut out, params, report.group(group));

        if let Some(scaling) = report.group(group) {
            write_trend(&mut out, scaling);
            write_outliers(&mut out, &scaling.outliers);
        }

        let group_warnings = warnings
            .iter()
            .chain(report.warnings.iter())
            .filter(|w| w.is_for_group(group));
        write_warning_list(&mut out, group_warnings);
    }

    let orphaned: Vec<&Warning> = warnings
        .iter()
        .filter(|w| w.group.as_deref().is_none_or(|g| suite.group(g).is_none()))
        .collect();
    if !orphaned.is_empty() {
        out.push_str("## Other warnings\n\n");
        write_warning_list(&mut out, orphaned.into_iter());
    }

    out
}

fn write_measurements(out: &mut String, params: &BTreeMap<String, ResultRecord>, scaling: Option<&GroupScaling>) {
    let mut records: Vec<&ResultRecord> = params.values().collect();
    records.sort_by(|a, b| compare_parameters(a.parameter(), b.parameter()));

    out.push_str("| parameter | mean | confidence interval | per entry |\n");
    out.push_str("|---|---|---|---|\n");
    for record in records {
        let interval = match (record.confidence_low(), record.confidence_high()) {
            (Some(low), Some(high)) => format!("{} – {}", format_nanos(low), format_nanos(high)),
            _ => "n/a".to_string(),
        };
        let per_entry = scaling
            .and_then(|s| s.points.iter().find(|p| p.parameter == record.parameter()))
            .map(|p| format_nanos(p.per_entry_nanos))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            record.parameter(),
            format_nanos(record.point_estimate_nanos()),
            interval,
            per_entry
        );
    }
    out.push('\n');
}

fn write_trend(out: &mut String, scaling: &GroupScaling) {
    let (Some(first), Some(last)) = (scaling.points.first(), scaling.points.last()) else {
        out.push_str("Per-entry cost trend: undetermined (no numeric parameters).\n\n");
        return;
    };

    match (scaling.trend, scaling.cost_change) {
        (Trend::Undetermined, _) => {
            out.push_str("Per-entry cost trend: undetermined (needs at least two numeric parameters).\n\n");
        }
        (trend, Some(change)) => {
            let _ = writeln!(
                out,
                "Per-entry cost trend: {} ({:+.1}% from {} to {}: {} → {}).\n",
                trend.as_str(),
                change * 100.0,
                first.parameter,
                last.parameter,
                format_nanos(first.per_entry_nanos),
                format_nanos(last.per_entry_nanos)
            );
        }
        (trend, None) => {
            let _ = writeln!(
                out,
                "Per-entry cost trend: {} (from {} to {}: {} → {}).\n",
                trend.as_str(),
                first.parameter,
                last.parameter,
                format_nanos(first.per_entry_nanos),
                format_nanos(last.per_entry_nanos)
            );
        }
    }
}

fn write_outliers(out: &mut String, outliers: &[OutlierEntry]) {
    let flagged: Vec<_> = outliers.iter().filter(|entry| entry.counts.total() > 0).collect();
    if flagged.is_empty() {
        return;
    }
    out.push_str("Outliers:\n\n");
    for entry in flagged {
        let _ = writeln!(out, "- {}: {}", entry.parameter, describe_outliers(&entry.counts));
    }
    out.push('\n');
}

pub fn describe_outliers(counts: &OutlierCounts) -> String {
    let buckets = [
        (counts.mild_low, "mild low"),
        (counts.mild_high, "mild high"),
        (counts.severe_low, "severe low"),
        (counts.severe_high, "severe high"),
    ];
    buckets
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, name)| format!("{} {}", count, name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_warning_list<'a>(out: &mut String, warnings: impl Iterator<Item = &'a Warning>) {
    let mut any = false;
    for warning in warnings {
        if !any {
            out.push_str("Warnings:\n\n");
            any = true;
        }
        let _ = writeln!(out, "- {}", warning);
    }
    if any {
        out.push('\n');
    }
}
