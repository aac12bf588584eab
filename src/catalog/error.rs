//! Error types for catalog loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("IO error reading catalog {path}: {source}")]
    Io {
        /// The catalog file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON or does not match the record schema.
    #[error("invalid catalog JSON in {path}: {source}")]
    Json {
        /// The catalog file path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Two records share an id.
    #[error("duplicate paper id {id}")]
    DuplicateId {
        /// The repeated id.
        id: u32,
    },

    /// Two records would be downloaded under the same filename.
    #[error("paper {id} reuses filename {filename:?} of paper {first_id}")]
    DuplicateFilename {
        /// The shared filename.
        filename: String,
        /// Id of the record that claimed the filename first.
        first_id: u32,
        /// Id of the later record.
        id: u32,
    },

    /// A record failed validation.
    #[error("invalid paper record {id}: {reason}")]
    InvalidRecord {
        /// Id of the offending record.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },
}

impl CatalogError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-record error.
    pub fn invalid_record(id: u32, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id,
            reason: reason.into(),
        }
    }
}
