use super::{FileTree, TreeEntry};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory file tree. Directories exist implicitly as prefixes of the
/// stored file paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn has_children(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

impl FileTree for MemoryTree {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.has_children(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.has_children(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<TreeEntry>> {
        if !self.has_children(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", path.display()),
            ));
        }

        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        for file in self.files.keys() {
            let Ok(rest) = file.strip_prefix(path) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let name = first.as_os_str().to_string_lossy().into_owned();
            let is_dir = components.next().is_some();
            let slot = children.entry(name).or_insert(is_dir);
            *slot |= is_dir;
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| TreeEntry { name, is_dir })
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    }
}
