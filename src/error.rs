//! Errors raised while transferring monitors.

use std::io;
use std::path::PathBuf;

use monitor_transfer_client::ApiError;
use thiserror::Error;

/// Everything that can go wrong with a single step of a transfer.
///
/// None of these end a run by themselves; the orchestrator records them in
/// the [`RunReport`](crate::RunReport) and moves on.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The platform rejected or failed a call.
    #[error("remote error: {0}")]
    Remote(#[from] ApiError),

    /// A converted document lacks a field the transform needs.
    #[error("malformed document {file}: {reason}")]
    MalformedDocument { file: String, reason: String },

    /// Reading, writing or deleting a file failed.
    #[error("filesystem error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The inventory file could not be written or parsed.
    #[error("inventory error on {}: {source}", path.display())]
    Inventory {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A document could not be converted to or from YAML.
    #[error("serialization error on {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A monitor id cannot be used as a file name inside the working
    /// directory.
    #[error("{name:?} is not a valid document name")]
    InvalidDocumentName { name: String },

    /// Another run holds the working directory.
    #[error("{} is locked by another transfer run", path.display())]
    Locked { path: PathBuf },
}

impl TransferError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransferError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        TransferError::MalformedDocument {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
