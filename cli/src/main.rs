use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use anyhow::Context;
use benchviz_core::{
    BenchError, PipelineConfig, PipelineOutcome,
    config::duration_from_secs,
    reader::Reader,
    render::NO_DATA_MESSAGE,
    store::DiskTree,
    suite::aggregate,
    units::format_nanos,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;


static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "benchviz_core=info,benchviz=info";
const VERBOSE_TRACE_FILTER: &str = "benchviz_core=debug,benchviz=debug";
const QUIET_TRACE_FILTER: &str = "benchviz_core=error,benchviz=error";

const DEFAULT_ROOT: &str = "target/criterion";
const DEFAULT_OUTPUT: &str = "target/benchviz";

const EXIT_SETUP_FAILURE: u8 = 1;
const EXIT_PARTIAL: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "benchviz",
    author,
    version,
    about = "Charts and summaries for Criterion benchmark results",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Without a subcommand, behave like `report`
    #[command(flatten)]
    report: ReportArgs,

    /// More log output (debug level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Aggregate results, analyze scaling and write the report (default).
    Report(ReportArgs),
    /// Print aggregated results without writing anything.
    List(ListArgs),
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    /// Directory holding benchmark results
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// Directory the report is written to
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// TOML config file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parse result files on all cores
    #[arg(long)]
    parallel: bool,

    /// Sampling time below which a measurement is flagged, in seconds
    #[arg(long, value_name = "SECS")]
    target_duration: Option<f64>,

    /// Sample count below which a measurement is flagged
    #[arg(long, value_name = "N")]
    min_samples: Option<u64>,

    /// Relative per-entry cost change still considered stable
    #[arg(long, value_name = "FRACTION")]
    tolerance: Option<f64>,

    /// Skip summary.json
    #[arg(long)]
    no_json: bool,

    /// Skip summary.csv
    #[arg(long)]
    no_csv: bool,

    /// Fixed generation time for summary.json (RFC 3339)
    #[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    /// Directory holding benchmark results
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn env_filter_expr(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn init_tracing(verbose: bool, quiet: bool) {
    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = if quiet {
            Some(QUIET_TRACE_FILTER.to_string())
        } else if verbose {
            Some(VERBOSE_TRACE_FILTER.to_string())
        } else {
            env_filter_expr("BENCHVIZ_LOG").or_else(|| env_filter_expr("RUST_LOG"))
        };

        let builder = fmt().with_writer(std::io::stderr).with_target(false);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("Failed to load config '{}'", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn build_config(args: &ReportArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if args.parallel {
        config.parallel = true;
    }
    if let Some(secs) = args.target_duration {
        config.analysis.target_duration = duration_from_secs(secs).context("Invalid --target-duration")?;
    }
    if let Some(count) = args.min_samples {
        config.analysis.min_sample_count = count;
    }
    if let Some(tolerance) = args.tolerance {
        config.analysis.trend_tolerance = tolerance;
    }
    if args.no_json {
        config.render.write_json = false;
    }
    if args.no_csv {
        config.render.write_csv = false;
    }
    if args.timestamp.is_some() {
        config.render.generated_at = args.timestamp;
    }

    config.validate().context("Invalid command line options")?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn run_report(args: &ReportArgs) -> anyhow::Result<ExitCode> {
    let config = build_config(args)?;
    let outcome = benchviz_core::run(&args.root, &args.output, &config).map_err(|err| {
        let context = match &err {
            BenchError::WriteFailure { .. } => {
                format!("Failed to prepare output directory '{}'", args.output.display())
            }
            _ => format!("Invalid result root '{}'", args.root.display()),
        };
        anyhow::Error::new(err).context(context)
    })?;
    Ok(print_outcome(&outcome))
}

fn print_outcome(outcome: &PipelineOutcome) -> ExitCode {
    for artifact in &outcome.rendered.artifacts {
        println!("wrote {}", artifact.display());
    }
    if let Some(message) = &outcome.rendered.message {
        println!("{}", message);
    }
    if !outcome.warnings.is_empty() {
        println!("{} warning(s); see the summary for details", outcome.warnings.len());
    }

    if outcome.is_partial() {
        for failure in &outcome.rendered.failures {
            eprintln!("Error: {}", failure);
        }
        return ExitCode::from(EXIT_PARTIAL);
    }
    ExitCode::SUCCESS
}

fn run_list(args: &ListArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let reader = Reader::new(&DiskTree, &args.root, &config.reader);
    let scan = match reader.scan() {
        Ok(scan) => scan,
        Err(err @ BenchError::NotFound { .. }) => {
            eprintln!("warning: {}", err);
            println!("{}", NO_DATA_MESSAGE);
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err).context("Failed to scan results"),
    };

    let aggregated = aggregate(scan);
    for warning in &aggregated.warnings {
        eprintln!("warning: {}", warning);
    }
    if aggregated.suite.is_empty() {
        println!("{}", NO_DATA_MESSAGE);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<32} {:<16} {:>12} {:>8}", "group", "parameter", "mean", "samples");
    for record in aggregated.suite.records() {
        println!(
            "{:<32} {:<16} {:>12} {:>8}",
            record.group(),
            record.parameter(),
            format_nanos(record.point_estimate_nanos()),
            record.sample_count().map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn dispatch(args: CliArgs) -> anyhow::Result<ExitCode> {
    match args.command {
        Some(Commands::Report(report)) => run_report(&report),
        Some(Commands::List(list)) => run_list(&list),
        None => run_report(&args.report),
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose, args.quiet);

    match dispatch(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_SETUP_FAILURE)
        }
    }
}
