//! Writes charts and summaries for an analyzed suite.
//!
//! Every artifact is written independently; a failed write is recorded in
//! [`RenderOutcome::failures`] and the remaining artifacts are still
//! attempted.

mod chart;
mod narrative;
mod summary;


pub use chart::{Bar, BarChart, escape_xml};
pub use narrative::{NO_DATA_MESSAGE, describe_outliers, render_narrative};
pub use summary::{render_csv, render_json};

use crate::analysis::ScalingReport;
use crate::config::RenderConfig;
use crate::error::{BenchError, Warning};
use crate::suite::AggregatedSuite;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Default)]
pub struct RenderOutcome {
    pub artifacts: Vec<PathBuf>,
    pub failures: Vec<BenchError>,
    /// Informational message when there was nothing to chart.
    pub message: Option<String>,
}

impl RenderOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub fn chart_file_name(group: &str) -> String {
    sanitize_filename::sanitize(format!("{}_visualization.svg", group))
}

pub struct Renderer<'a> {
    output_dir: &'a Path,
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(output_dir: &'a Path, config: &'a RenderConfig) -> Self {
        Self { output_dir, config }
    }

    /// Render every artifact. `warnings` are the scan and aggregation
    /// warnings; analysis warnings come from `report`.
    pub fn render(&self, suite: &AggregatedSuite, report: &ScalingReport, warnings: &[Warning]) -> RenderOutcome {
        let mut outcome = RenderOutcome::default();
        let summary_name = format!("{}.md", self.config.summary_stem);

        if suite.is_empty() {
            info!("{}", NO_DATA_MESSAGE);
            let narrative = render_narrative(suite, report, warnings);
            self.write_artifact(&mut outcome, &summary_name, narrative.as_bytes());
            outcome.message = Some(NO_DATA_MESSAGE.to_string());
            return outcome;
        }

        for (group, params) in suite.groups() {
            let chart = BarChart::for_group(group, params);
            self.write_artifact(&mut outcome, &chart_file_name(group), chart.to_svg().as_bytes());
        }

        let narrative = render_narrative(suite, report, warnings);
        self.write_artifact(&mut outcome, &summary_name, narrative.as_bytes());

        if self.config.write_json {
            let generated_at = self.config.generated_at.unwrap_or_else(Utc::now);
            let name = format!("{}.json", self.config.summary_stem);
            match render_json(suite, report, warnings, generated_at) {
                Ok(json) => self.write_artifact(&mut outcome, &name, json.as_bytes()),
                Err(e) => {
                    let path = self.output_dir.join(&name);
                    error!(path = %path.display(), "cannot serialize summary: {}", e);
                    outcome.failures.push(BenchError::write_failure(path, e.into()));
                }
            }
        }

        if self.config.write_csv {
            let name = format!("{}.csv", self.config.summary_stem);
            self.write_artifact(&mut outcome, &name, render_csv(suite, report).as_bytes());
        }

        info!(
            written = outcome.artifacts.len(),
            failed = outcome.failures.len(),
            output = %self.output_dir.display(),
            "rendered report"
        );
        outcome
    }

    fn write_artifact(&self, outcome: &mut RenderOutcome, name: &str, contents: &[u8]) {
        let path = self.output_dir.join(name);
        match fs::write(&path, contents) {
            Ok(()) => outcome.artifacts.push(path),
            Err(e) => {
                let err = BenchError::write_failure(path, e);
                error!("{}", err);
                outcome.failures.push(err);
            }
        }
    }
}
