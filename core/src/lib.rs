pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod store;
pub mod suite;
pub mod units;

pub use config::PipelineConfig;
pub use error::{BenchError, Warning, WarningKind};
pub use pipeline::{PipelineOutcome, run, run_with_tree};
