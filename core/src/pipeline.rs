//! End-to-end run: scan, aggregate, analyze, render.

use crate::analysis::{ScalingReport, analyze};
use crate::config::PipelineConfig;
use crate::error::{BenchError, Warning};
use crate::reader::Reader;
use crate::render::{RenderOutcome, Renderer};
use crate::store::{DiskTree, FileTree};
use crate::suite::{Aggregated, AggregatedSuite, aggregate};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub struct PipelineOutcome {
    pub suite: AggregatedSuite,
    pub report: ScalingReport,
    pub rendered: RenderOutcome,
    /// Scan and aggregation warnings followed by analysis warnings.
    pub warnings: Vec<Warning>,
}

impl PipelineOutcome {
    pub fn is_partial(&self) -> bool {
        self.rendered.is_partial()
    }
}

pub fn run(root: &Path, output: &Path, config: &PipelineConfig) -> Result<PipelineOutcome, BenchError> {
    run_with_tree(&DiskTree, root, output, config)
}

/// Run against an arbitrary tree. Only failing to create `output` or a root
/// that is not a directory is an `Err`; everything else ends up in the
/// outcome.
pub fn run_with_tree(
    tree: &dyn FileTree,
    root: &Path,
    output: &Path,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, BenchError> {
    fs::create_dir_all(output).map_err(|e| BenchError::write_failure(output, e))?;

    let Aggregated {
        suite,
        warnings: mut run_warnings,
    } = scan(tree, root, config)?;
    info!(
        groups = suite.group_count(),
        records = suite.record_count(),
        warnings = run_warnings.len(),
        "aggregated results"
    );

    let report = analyze(&suite, &config.analysis);
    let rendered = Renderer::new(output, &config.render).render(&suite, &report, &run_warnings);

    run_warnings.extend(report.warnings.iter().cloned());
    Ok(PipelineOutcome {
        suite,
        report,
        rendered,
        warnings: run_warnings,
    })
}

fn scan(tree: &dyn FileTree, root: &Path, config: &PipelineConfig) -> Result<Aggregated, BenchError> {
    let reader = Reader::new(tree, root, &config.reader);
    let scanned = if config.parallel {
        reader.scan_parallel()
    } else {
        reader.scan().map(aggregate)
    };

    match scanned {
        Ok(aggregated) => Ok(aggregated),
        Err(err @ BenchError::NotFound { .. }) => {
            warn!("{}", err);
            Ok(Aggregated {
                suite: AggregatedSuite::default(),
                warnings: vec![Warning::from_error(&err)],
            })
        }
        Err(err) => Err(err),
    }
}
