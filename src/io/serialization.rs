// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document serialization and deserialization.
//!
//! Documents are written as pretty-printed JSON. Writes go to a temporary
//! file in the destination directory which is then renamed over the
//! target, so readers see either the old or the new document.

use crate::error::{IoContext, Result, StoreError};
use crate::models::Project;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(&json).at(tmp.path())?;
    tmp.as_file().sync_all().at(tmp.path())?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// Read and parse a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).at(path)?;
    serde_json::from_str(&json).map_err(|e| StoreError::json(path, e))
}

/// Export project data to JSON format.
pub fn export_json(data: &Project, path: &Path) -> Result<()> {
    write_json_atomic(data, path)
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<Project> {
    read_json(path)
}
