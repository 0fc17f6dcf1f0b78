use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A single entry in the folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub is_file: bool,
}

/// Decides which directory entries make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Lowercase extensions without the dot. `None` lists every regular file.
    pub extensions: Option<Vec<String>>,
    /// Whether dot-files are listed.
    pub show_hidden: bool,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            extensions: None,
            show_hidden: true,
        }
    }
}

impl CatalogFilter {
    /// Restrict the listing to the given extensions (case-insensitive, leading dot optional).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: Some(extensions.into_iter().map(|e| normalize_ext(e.as_ref())).collect()),
            ..Self::default()
        }
    }

    /// Whether a file name passes the filter.
    pub fn accepts(&self, name: &str) -> bool {
        if !self.show_hidden && name.starts_with('.') {
            return false;
        }
        match &self.extensions {
            None => true,
            Some(allowed) => Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext))),
        }
    }
}

/// Lowercase an extension and strip a leading dot.
pub fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// List the regular files of `folder` that pass `filter`, in enumeration order.
///
/// Directories are excluded; symlinks pointing at regular files are kept.
/// Entries whose name is not valid UTF-8 or whose metadata can't be read are skipped.
pub fn list_files(folder: &Path, filter: &CatalogFilter) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(raw) => {
                log::debug!("skipping non UTF-8 entry {:?}", raw);
                continue;
            }
        };
        let is_file = match fs::metadata(entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(_) => continue,
        };
        if is_file && filter.accepts(&name) {
            entries.push(CatalogEntry { name, is_file });
        }
    }
    Ok(entries)
}

/// The ordered set of files shown in the navigation list.
#[derive(Debug, Default)]
pub struct FileCatalog {
    folder: Option<PathBuf>,
    entries: Vec<CatalogEntry>,
    filter: CatalogFilter,
}

impl FileCatalog {
    pub fn new(filter: CatalogFilter) -> Self {
        Self {
            folder: None,
            entries: Vec::new(),
            filter,
        }
    }

    /// Rebuild the catalog from `folder`.
    ///
    /// On failure the catalog is left exactly as it was; the caller decides
    /// whether to clear it.
    pub fn load(&mut self, folder: &Path) -> Result<&[CatalogEntry]> {
        let entries = list_files(folder, &self.filter)?;
        self.folder = Some(folder.to_path_buf());
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Drop the folder and every entry.
    pub fn clear(&mut self) {
        self.folder = None;
        self.entries.clear();
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Full path of the entry at `index`.
    pub fn path_of(&self, index: usize) -> Option<PathBuf> {
        let folder = self.folder.as_ref()?;
        self.entries.get(index).map(|e| folder.join(&e.name))
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }
}
