//! File name lookup over the installed TeX tree.

use crate::model::{File, FileRole};
use indexmap::IndexMap;

pub mod ls_r;

pub use ls_r::{LsRIndex, TEX_DIR_ROOTS};

pub trait NameIndex: Send + Sync {
    fn lookup(&self, name: &str) -> Option<File>;

    /// Every known file whose role is one of `roles`, in index order.
    fn list(&self, roles: &[FileRole]) -> Vec<File>;
}

/// In-memory name index. The first file registered under a name wins.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    files: IndexMap<String, File>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already taken.
    pub fn insert(&mut self, file: File) -> bool {
        if self.files.contains_key(&file.name) {
            return false;
        }
        self.files.insert(file.name.clone(), file);
        true
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<File> for FileIndex {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        let mut index = FileIndex::new();
        for file in iter {
            index.insert(file);
        }
        index
    }
}

impl NameIndex for FileIndex {
    fn lookup(&self, name: &str) -> Option<File> {
        self.files.get(name).cloned()
    }

    fn list(&self, roles: &[FileRole]) -> Vec<File> {
        self.files
            .values()
            .filter(|f| roles.contains(&f.role))
            .cloned()
            .collect()
    }
}
