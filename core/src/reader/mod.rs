//! Discovers estimate files below a result root and turns them into
//! [`ResultRecord`]s.
//!
//! The walk is lazy: directories are listed only when the iterator reaches
//! them, and each leaf is parsed on demand. Problems with a single file are
//! yielded as [`Warning`]s so the caller can keep going.

mod estimates;
mod layout;


pub use estimates::{Estimates, Format, Samples, parse_estimates, parse_samples};
pub use layout::{LayoutMismatch, LeafPath, MAX_DEPTH, is_key_component};

use crate::config::{ESTIMATE_EXTENSIONS, ReaderConfig};
use crate::error::{BenchError, Warning, WarningKind};
use crate::store::{FileTree, TreeEntry};
use crate::suite::{Aggregated, ResultRecord, ScanItem, aggregate};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A directory holding an estimate file whose path matched the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub key: LeafPath,
    pub dir: PathBuf,
    pub estimate_file: PathBuf,
    pub format: Format,
    pub sample_file: Option<(PathBuf, Format)>,
}

pub struct Reader<'a> {
    tree: &'a dyn FileTree,
    root: PathBuf,
    config: &'a ReaderConfig,
}

impl<'a> Reader<'a> {
    pub fn new(tree: &'a dyn FileTree, root: impl Into<PathBuf>, config: &'a ReaderConfig) -> Self {
        Self {
            tree,
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<(), BenchError> {
        if !self.tree.exists(&self.root) {
            return Err(BenchError::NotFound {
                root: self.root.clone(),
            });
        }
        if !self.tree.is_dir(&self.root) {
            return Err(BenchError::InvalidRoot {
                root: self.root.clone(),
            });
        }
        Ok(())
    }

    /// Walk the tree, yielding each leaf that matches the layout.
    pub fn leaves(&self) -> Result<LeafWalk<'_>, BenchError> {
        self.ensure_root()?;
        Ok(LeafWalk {
            tree: self.tree,
            config: self.config,
            stack: vec![(self.root.clone(), Vec::new())],
        })
    }

    /// Lazily read every record below the root.
    pub fn scan(&self) -> Result<RecordScan<'_, 'a>, BenchError> {
        Ok(RecordScan {
            reader: self,
            walk: self.leaves()?,
        })
    }

    /// Parse all leaves on the rayon pool, then aggregate in walk order.
    pub fn scan_parallel(&self) -> Result<Aggregated, BenchError> {
        let leaves: Vec<Result<Leaf, Warning>> = self.leaves()?.collect();
        debug!(leaves = leaves.len(), "parsing leaves in parallel");
        let items: Vec<ScanItem> = leaves
            .par_iter()
            .map(|leaf| match leaf {
                Ok(leaf) => self.read_leaf(leaf),
                Err(warning) => Err(warning.clone()),
            })
            .collect();
        Ok(aggregate(items))
    }

    pub fn read_leaf(&self, leaf: &Leaf) -> ScanItem {
        let estimates = self
            .tree
            .read_to_string(&leaf.estimate_file)
            .map_err(|e| e.to_string())
            .and_then(|input| parse_estimates(&input, leaf.format))
            .map_err(|message| BenchError::parse(&leaf.estimate_file, message));

        let estimates = match estimates {
            Ok(estimates) => estimates,
            Err(err) => {
                warn!("{}", err);
                let mut warning = Warning::from_error(&err);
                warning.group = Some(leaf.key.group.clone());
                warning.parameter = Some(leaf.key.parameter.clone());
                return Err(warning);
            }
        };

        let mut record = ResultRecord::new(&leaf.key.group, &leaf.key.parameter, estimates.mean_nanos)
            .with_source(&leaf.estimate_file);
        if let Some(function) = &leaf.key.function {
            record = record.with_function(function);
        }
        if let Some((low, high)) = estimates.confidence {
            record = record.with_confidence(low, high);
        }
        if let Some(outliers) = estimates.outliers {
            record = record.with_outliers(outliers);
        }

        let samples = leaf.sample_file.as_ref().and_then(|(path, format)| self.read_samples(path, *format));
        let sample_count = estimates.sample_count.or(samples.as_ref().map(|s| s.sample_count));
        let total_iterations = estimates
            .total_iterations
            .or(samples.as_ref().map(|s| s.total_iterations));
        if let Some(count) = sample_count {
            record = record.with_sample_count(count);
        }
        if let Some(iterations) = total_iterations {
            record = record.with_total_iterations(iterations);
        }
        if let Some(mode) = samples.and_then(|s| s.sampling_mode) {
            record = record.with_sampling_mode(mode);
        }

        debug!(
            group = record.group(),
            parameter = record.parameter(),
            nanos = record.point_estimate_nanos(),
            "read estimate"
        );
        Ok(record)
    }

    fn read_samples(&self, path: &Path, format: Format) -> Option<Samples> {
        let parsed = self
            .tree
            .read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|input| parse_samples(&input, format));
        match parsed {
            Ok(samples) => Some(samples),
            Err(message) => {
                debug!(path = %path.display(), "ignoring sample file: {}", message);
                None
            }
        }
    }
}

/// Depth-first walk over the result tree.
pub struct LeafWalk<'a> {
    tree: &'a dyn FileTree,
    config: &'a ReaderConfig,
    stack: Vec<(PathBuf, Vec<String>)>,
}

impl LeafWalk<'_> {
    fn descends_into(&self, entry: &TreeEntry) -> bool {
        entry.is_dir
            && (is_key_component(&entry.name, self.config)
                || (self.config.is_label(&entry.name) && !entry.name.starts_with('.')))
    }
}

fn find_file(entries: &[TreeEntry], dir: &Path, stem: &str) -> Option<(PathBuf, Format)> {
    ESTIMATE_EXTENSIONS.iter().find_map(|ext| {
        let name = format!("{}.{}", stem, ext);
        let present = entries.iter().any(|entry| !entry.is_dir && entry.name == name);
        let format = Format::from_extension(ext)?;
        present.then(|| (dir.join(&name), format))
    })
}

impl Iterator for LeafWalk<'_> {
    type Item = Result<Leaf, Warning>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((dir, components)) = self.stack.pop() {
            let entries = match self.tree.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %dir.display(), "cannot list directory: {}", err);
                    let warning = Warning::new(WarningKind::Unreadable, format!("cannot list directory: {}", err))
                        .with_path(&dir);
                    return Some(Err(warning));
                }
            };

            if components.len() < MAX_DEPTH {
                // Reverse so the smallest name is popped first.
                let children: Vec<String> = entries
                    .iter()
                    .rev()
                    .filter(|entry| self.descends_into(entry))
                    .map(|entry| entry.name.clone())
                    .collect();
                for name in children {
                    let mut child = components.clone();
                    child.push(name.clone());
                    self.stack.push((dir.join(&name), child));
                }
            }

            if components.is_empty() {
                continue;
            }

            let Some((estimate_file, format)) = find_file(&entries, &dir, &self.config.estimate_stem) else {
                continue;
            };

            match LeafPath::parse(&components, self.config) {
                Ok(key) => {
                    let sample_file = find_file(&entries, &dir, &self.config.sample_stem);
                    return Some(Ok(Leaf {
                        key,
                        dir,
                        estimate_file,
                        format,
                        sample_file,
                    }));
                }
                Err(mismatch) => {
                    debug!(path = %dir.display(), "skipping estimate outside the result layout: {}", mismatch);
                }
            }
        }
        None
    }
}

/// Lazy sequence of records (or per-file warnings) from one scan.
pub struct RecordScan<'r, 'a> {
    reader: &'r Reader<'a>,
    walk: LeafWalk<'r>,
}

impl Iterator for RecordScan<'_, '_> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.walk.next()?;
        Some(leaf.and_then(|leaf| self.reader.read_leaf(&leaf)))
    }
}
