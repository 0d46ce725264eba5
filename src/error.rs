// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for project storage and archive pipelines.

use std::path::{Path, PathBuf};

/// Failures surfaced by the project store and the export/backup pipelines.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Hotspot not found: {0}")]
    HotspotNotFound(String),

    #[error("Marker not found: {0}")]
    MarkerNotFound(String),

    #[error("Map config not found for project {0}")]
    MapNotConfigured(String),

    #[error("Invalid project backup: {0}")]
    InvalidBackup(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl StoreError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for the "entity not found" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ProjectNotFound(_)
                | StoreError::SceneNotFound(_)
                | StoreError::HotspotNotFound(_)
                | StoreError::MarkerNotFound(_)
                | StoreError::MapNotConfigured(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Attach a path to a bare `std::io::Result`.
pub trait IoContext<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| StoreError::io(path, e))
    }
}
