//! Read-only view over the directory tree holding benchmark output.
//!
//! The reader only ever talks to a [`FileTree`], so its traversal and
//! parsing rules can be exercised against [`MemoryTree`] without touching
//! the filesystem.

mod memory;


pub use memory::MemoryTree;

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TreeEntry {
    pub name: String,
    pub is_dir: bool,
}

impl TreeEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

pub trait FileTree: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Entries directly below `path`, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<TreeEntry>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileTree`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskTree;

impl FileTree for DiskTree {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Non UTF-8 names cannot encode a group or parameter.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_dir = entry.file_type()?.is_dir();
            entries.push(TreeEntry { name, is_dir });
        }
        entries.sort();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}
