//! On-disk storage of converted monitor documents.
//!
//! One YAML file per monitor, named after the monitor id on the origin side
//! and `converted-<id>` on the destination side.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TransferError};
use crate::lock::LOCK_FILENAME;

/// A converted monitor document: nested mappings and sequences.
pub type Document = serde_yaml::Value;

/// Extension of document files, without the dot.
pub const DOCUMENT_EXTENSION: &str = "yaml";

/// Convert a JSON body returned by the platform into a [`Document`].
pub fn document_from_json(value: serde_json::Value) -> std::result::Result<Document, serde_yaml::Error> {
    serde_yaml::to_value(value)
}

/// A document read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// File name including the extension.
    pub file_name: String,
    pub document: Document,
}

impl StoredDocument {
    /// File name without the `.yaml` extension.
    pub fn base_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Outcome of [`DocumentStore::clear`].
#[derive(Debug, Default)]
pub struct ClearSummary {
    pub removed: usize,
    pub failures: Vec<TransferError>,
}

/// A directory of document files.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document called `base_name`.
    pub fn path_for(&self, base_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", base_name, DOCUMENT_EXTENSION))
    }

    /// Write `document` as `<base_name>.yaml`, replacing any existing file.
    ///
    /// `base_name` must name a file directly inside the directory.
    pub fn save(&self, base_name: &str, document: &Document) -> Result<PathBuf> {
        if !is_plain_name(base_name) {
            return Err(TransferError::InvalidDocumentName {
                name: base_name.to_string(),
            });
        }
        let path = self.path_for(base_name);
        let yaml = serde_yaml::to_string(document).map_err(|source| TransferError::Serialization {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, yaml).map_err(|e| TransferError::fs(&path, e))?;
        Ok(path)
    }

    /// Iterate over every `.yaml` file in the directory, sorted by file name.
    ///
    /// Files are only read as the iterator advances. A file that cannot be
    /// read or parsed yields an error for that file alone.
    pub fn load_all(&self) -> Result<impl Iterator<Item = Result<StoredDocument>>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| TransferError::fs(&self.dir, e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_document(path))
            .collect();
        paths.sort();

        Ok(paths.into_iter().map(load_document))
    }

    /// Delete every regular file directly inside the directory.
    ///
    /// Sub-directories and the run lock file are kept. A file that cannot be
    /// deleted is logged and recorded; the rest are still removed.
    pub fn clear(&self) -> ClearSummary {
        let mut summary = ClearSummary::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to list directory");
                summary.failures.push(TransferError::fs(&self.dir, e));
                return summary;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to read directory entry");
                    summary.failures.push(TransferError::fs(&self.dir, e));
                    continue;
                }
            };
            if !path.is_file() || path.file_name().is_some_and(|name| name == LOCK_FILENAME) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => summary.removed += 1,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Failed to delete file");
                    summary.failures.push(TransferError::fs(&path, e));
                }
            }
        }

        summary
    }
}

// Monitor ids come from the platform or a hand-edited inventory
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && !name.starts_with('.')
}

fn is_document(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

fn load_document(path: PathBuf) -> Result<StoredDocument> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = fs::read_to_string(&path).map_err(|e| TransferError::fs(&path, e))?;
    let document = serde_yaml::from_str(&content)
        .map_err(|source| TransferError::Serialization { path, source })?;
    Ok(StoredDocument {
        file_name,
        document,
    })
}
