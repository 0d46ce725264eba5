// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Whole-project zip backups.

use super::archive;
use super::progress::{Progress, ProgressReporter};
use crate::error::{IoContext, Result, StoreError};
use crate::io::serialization;
use crate::models::Project;
use crate::store::{ProjectStore, MAP_DIR, PROJECT_FILE, SCENES_DIR, THUMBNAILS_DIR};
use crate::util::{fs as fsutil, ids};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const IMPORTED_SUFFIX: &str = " (Imported)";

/// `<sanitized name>_backup.zip`
pub fn default_file_name(project_name: &str) -> String {
    format!("{}_backup.zip", fsutil::sanitize_file_stem(project_name))
}

/// Zip an entire project directory to `dest`.
pub fn export_backup(
    store: &ProjectStore,
    project_id: &str,
    dest: &Path,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<u64> {
    let project = store.load(project_id)?;
    let project_dir = store.project_path(project_id);
    let mut progress = ProgressReporter::new(on_progress);

    let bytes = archive::zip_directory(&project_dir, dest, &mut |done, total| {
        progress.report_fraction(0.0, 99.0, done, total, "Processing");
    })?;
    progress.report(100.0, "Completed");

    log::info!("Backed up {} ({} bytes) to {}", project.name, bytes, dest.display());
    Ok(bytes)
}

/// Import a backup archive as a new project.
pub fn import_backup(store: &ProjectStore, zip_path: &Path) -> Result<Project> {
    import_backup_in(store, zip_path, &std::env::temp_dir())
}

/// Like [`import_backup`], extracting under `scratch_root`.
pub fn import_backup_in(store: &ProjectStore, zip_path: &Path, scratch_root: &Path) -> Result<Project> {
    let work = tempfile::Builder::new()
        .prefix("backup-import-")
        .tempdir_in(scratch_root)
        .at(scratch_root)?;

    let result = import_from(store, zip_path, work.path());

    let work_path = work.path().to_path_buf();
    if let Err(e) = work.close() {
        log::warn!("Could not remove import directory {}: {}", work_path.display(), e);
    }
    result
}

fn import_from(store: &ProjectStore, zip_path: &Path, work: &Path) -> Result<Project> {
    archive::extract_archive(zip_path, work)?;
    let root = locate_project_root(work)?;

    let mut project: Project = serialization::import_json(&root.join(PROJECT_FILE))
        .map_err(|e| StoreError::InvalidBackup(format!("unreadable {}: {}", PROJECT_FILE, e)))?;
    let old_id = project.id.clone();

    fsutil::ensure_dir(store.projects_dir())?;
    let new_id = ids::unique_id(ids::project_id, |id| store.project_path(id).exists());
    let target = store.project_path(&new_id);

    project.id = new_id;
    project.name.push_str(IMPORTED_SUFFIX);
    remap_media_paths(&mut project, &target);
    project.touch();
    serialization::export_json(&project, &root.join(PROJECT_FILE))?;

    if let Err(e) = fsutil::copy_dir_recursive(&root, &target) {
        if target.exists() {
            if let Err(cleanup) = fs::remove_dir_all(&target) {
                log::warn!("Could not remove partial import {}: {}", target.display(), cleanup);
            }
        }
        return Err(e);
    }

    log::info!(
        "Imported backup {} as {} ({}, was {})",
        zip_path.display(),
        project.name,
        project.id,
        old_id
    );
    Ok(project)
}

/// The extracted root if it holds `project.json`, otherwise its single
/// top-level folder if that does.
pub fn locate_project_root(extracted: &Path) -> Result<PathBuf> {
    if extracted.join(PROJECT_FILE).is_file() {
        return Ok(extracted.to_path_buf());
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(extracted).at(extracted)? {
        let entry = entry.at(extracted)?;
        if entry.file_type().at(entry.path())?.is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.as_slice() {
        [only] if only.join(PROJECT_FILE).is_file() => Ok(only.clone()),
        _ => Err(StoreError::InvalidBackup(format!(
            "no {} at the archive root or in a single top-level folder",
            PROJECT_FILE
        ))),
    }
}

fn relocate(stored: &str, target_dir: &Path) -> Option<String> {
    fsutil::basename(stored).map(|name| target_dir.join(name).to_string_lossy().into_owned())
}

/// Point every media path at the same file name inside the new project.
fn remap_media_paths(project: &mut Project, target: &Path) {
    let scenes_dir = target.join(SCENES_DIR);
    let thumbs_dir = target.join(THUMBNAILS_DIR);

    let mut seen: HashMap<String, String> = HashMap::new();
    for scene in &mut project.scenes {
        if let Some(name) = fsutil::basename(&scene.media_path) {
            match seen.get(name) {
                Some(first) if first != &scene.media_path => log::warn!(
                    "Scenes share media file name {} ({} and {}); both now point at one file",
                    name,
                    first,
                    scene.media_path
                ),
                Some(_) => {}
                None => {
                    seen.insert(name.to_string(), scene.media_path.clone());
                }
            }
        }

        if let Some(path) = relocate(&scene.media_path, &scenes_dir) {
            scene.media_path = path;
        }
        scene.thumbnail = scene
            .thumbnail
            .take()
            .and_then(|thumb| relocate(&thumb, &thumbs_dir));
    }

    if let Some(config) = project.map_config.as_mut() {
        config.image_path = config
            .image_path
            .take()
            .and_then(|image| relocate(&image, &target.join(MAP_DIR)));
    }
}
