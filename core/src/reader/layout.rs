use crate::config::ReaderConfig;
use std::fmt;

/// Deepest directory below the root that can hold an estimate file:
/// `group/function/parameter/label`.
pub const MAX_DEPTH: usize = 4;

/// Key encoded by the directory holding an estimate file.
///
/// Grammar, relative to the result root:
///
/// ```text
/// leaf      := group [ "/" function ] "/" parameter [ "/" label ]
/// label     := one of ReaderConfig::labels
/// component := non-empty, no leading '.', not in ReaderConfig::excluded
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPath {
    pub group: String,
    pub function: Option<String>,
    pub parameter: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMismatch {
    Depth(usize),
    InvalidName(String),
}

impl fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMismatch::Depth(depth) => write!(f, "expected group/[function/]parameter, found {} components", depth),
            LayoutMismatch::InvalidName(name) => write!(f, "'{}' is not a valid key component", name),
        }
    }
}

impl LeafPath {
    pub fn parse<S: AsRef<str>>(components: &[S], config: &ReaderConfig) -> Result<Self, LayoutMismatch> {
        let mut names: Vec<&str> = components.iter().map(AsRef::as_ref).collect();

        let label = if names.last().is_some_and(|last| config.is_label(last)) {
            names.pop().map(str::to_string)
        } else {
            None
        };

        for name in &names {
            if !is_key_component(name, config) {
                return Err(LayoutMismatch::InvalidName(name.to_string()));
            }
        }

        match names.as_slice() {
            [group, parameter] => Ok(Self {
                group: group.to_string(),
                function: None,
                parameter: parameter.to_string(),
                label,
            }),
            [group, function, parameter] => Ok(Self {
                group: group.to_string(),
                function: Some(function.to_string()),
                parameter: parameter.to_string(),
                label,
            }),
            other => Err(LayoutMismatch::Depth(other.len())),
        }
    }
}

/// Whether a directory name may be descended into or used as a key.
pub fn is_key_component(name: &str, config: &ReaderConfig) -> bool {
    !name.is_empty() && !name.starts_with('.') && !config.is_excluded(name)
}
