// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem helpers shared by the store and the archive pipelines.

use crate::error::{IoContext, Result, StoreError};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// A regular file found while walking a directory tree.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Path relative to the walk root, always using `/` separators
    pub relative: String,
    pub absolute: PathBuf,
    pub size: u64,
}

/// Recursively list regular files and directories under `root`, sorted by
/// relative path. Directories are returned with a trailing `/`.
pub fn walk(root: &Path) -> Result<(Vec<String>, Vec<WalkedFile>)> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    walk_into(root, root, &mut dirs, &mut files)?;
    dirs.sort();
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok((dirs, files))
}

fn walk_into(root: &Path, dir: &Path, dirs: &mut Vec<String>, files: &mut Vec<WalkedFile>) -> Result<()> {
    for entry in fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let path = entry.path();
        let file_type = entry.file_type().at(&path)?;
        let relative = relative_slash_path(root, &path);
        if file_type.is_dir() {
            dirs.push(format!("{}/", relative));
            walk_into(root, &path, dirs, files)?;
        } else if file_type.is_file() {
            let size = entry.metadata().at(&path)?.len();
            files.push(WalkedFile {
                relative,
                absolute: path,
                size,
            });
        }
    }
    Ok(())
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Total size in bytes of all regular files under `path`.
pub fn dir_size(path: &Path) -> Result<u64> {
    let (_, files) = walk(path)?;
    Ok(files.iter().map(|f| f.size).sum())
}

/// Copy a directory tree, creating `dst` as needed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).at(dst)?;
    for entry in fs::read_dir(src).at(src)? {
        let entry = entry.at(src)?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type().at(&from)?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to).at(&from)?;
        }
    }
    Ok(())
}

/// Create a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).at(path)
}

/// Delete a file, logging instead of failing. Used for stale media cleanup
/// where the primary operation has already succeeded.
pub fn remove_file_best_effort(path: &Path, what: &str) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Could not delete {} {}: {}", what, path.display(), e);
    }
}

/// Turn a display name into a safe lowercase file stem.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// The extension of `path` including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// File name of a stored path string, regardless of the separator style it
/// was written with.
pub fn basename(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\']).find(|s| !s.is_empty())
}

/// Size and timestamps of a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub fn file_info(path: &Path) -> Result<FileInfo> {
    let meta = fs::metadata(path).at(path)?;
    Ok(FileInfo {
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

/// Open a folder in the platform file manager.
pub fn open_in_file_manager(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(StoreError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "folder does not exist"),
        ));
    }

    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let program = "xdg-open";

    std::process::Command::new(program)
        .arg(path)
        .spawn()
        .at(path)?;
    log::info!("Opened {} with {}", path.display(), program);
    Ok(())
}
