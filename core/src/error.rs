use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Failure conditions raised by the pipeline stages.
///
/// Only setup failures are returned as `Err` from the pipeline; everything
/// scoped to a single file or record is downgraded to a [`Warning`].
#[derive(Debug)]
pub enum BenchError {
    /// The result root does not exist.
    NotFound { root: PathBuf },
    /// The result root exists but is not a directory.
    InvalidRoot { root: PathBuf },
    /// An estimate file is malformed or lacks a required field.
    Parse { path: PathBuf, message: String },
    /// Two records resolved to the same (group, parameter) key.
    DuplicateKey { group: String, parameter: String },
    /// An artifact (or the output directory) could not be written.
    WriteFailure { path: PathBuf, source: io::Error },
    /// Invalid configuration value or file.
    Config { message: String },
}

impl BenchError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        BenchError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn write_failure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BenchError::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        BenchError::Config {
            message: message.into(),
        }
    }

    /// Path the error refers to, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            BenchError::NotFound { root } | BenchError::InvalidRoot { root } => Some(root),
            BenchError::Parse { path, .. } | BenchError::WriteFailure { path, .. } => Some(path),
            BenchError::DuplicateKey { .. } | BenchError::Config { .. } => None,
        }
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::NotFound { root } => {
                write!(f, "no benchmark data at {}; run benchmarks first", root.display())
            }
            BenchError::InvalidRoot { root } => write!(f, "result root {} is not a directory", root.display()),
            BenchError::Parse { path, message } => write!(f, "failed to parse {}: {}", path.display(), message),
            BenchError::DuplicateKey { group, parameter } => {
                write!(f, "duplicate entry overwritten for {}/{}", group, parameter)
            }
            BenchError::WriteFailure { path, source } => write!(f, "failed to write {}: {}", path.display(), source),
            BenchError::Config { message } => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::WriteFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingData,
    Parse,
    DuplicateKey,
    InsufficientSamples,
    /// Parameter is not an input size. Informational; the analyzer only logs it.
    NonNumericParameter,
    Unreadable,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::MissingData => "missing data",
            WarningKind::Parse => "parse error",
            WarningKind::DuplicateKey => "duplicate key",
            WarningKind::InsufficientSamples => "insufficient samples",
            WarningKind::NonNumericParameter => "non-numeric parameter",
            WarningKind::Unreadable => "unreadable",
        }
    }
}

/// Structured advisory collected alongside a stage's primary result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub reason: String,
}

impl Warning {
    pub fn new(kind: WarningKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            group: None,
            parameter: None,
            path: None,
            reason: reason.into(),
        }
    }

    pub fn for_entry(kind: WarningKind, group: &str, parameter: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            group: Some(group.to_string()),
            parameter: Some(parameter.to_string()),
            path: None,
            reason: reason.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.as_os_str().is_empty() {
            self.path = Some(path);
        }
        self
    }

    /// Downgrade a per-record error into an advisory.
    pub fn from_error(err: &BenchError) -> Self {
        let kind = match err {
            BenchError::NotFound { .. } => WarningKind::MissingData,
            BenchError::Parse { .. } => WarningKind::Parse,
            BenchError::DuplicateKey { .. } => WarningKind::DuplicateKey,
            BenchError::InvalidRoot { .. } | BenchError::WriteFailure { .. } | BenchError::Config { .. } => {
                WarningKind::Unreadable
            }
        };
        let mut warning = Warning::new(kind, err.to_string());
        if let BenchError::DuplicateKey { group, parameter } = err {
            warning.group = Some(group.clone());
            warning.parameter = Some(parameter.clone());
        }
        warning.path = err.path().map(Path::to_path_buf);
        warning
    }

    pub fn is_for_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.group, &self.parameter) {
            (Some(group), Some(parameter)) => write!(f, "[{}] {}/{}: {}", self.kind.label(), group, parameter, self.reason),
            (Some(group), None) => write!(f, "[{}] {}: {}", self.kind.label(), group, self.reason),
            _ => write!(f, "[{}] {}", self.kind.label(), self.reason),
        }
    }
}
