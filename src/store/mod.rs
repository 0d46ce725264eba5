// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project store.
//!
//! Each project lives in `<workspace>/projects/<project id>/` as a
//! `project.json` document next to its `scenes/`, `thumbnails/` and `map/`
//! media directories. The store holds no cached state: every operation
//! reads the document from disk, mutates it and writes it back.
//!
//! Mutations for a single project are serialized by a per-project lock and
//! the document is replaced atomically, so two rapid edits cannot lose each
//! other's writes and a crash mid-save leaves the previous document intact.

mod hotspots;
mod map;
mod projects;
mod scenes;

pub use scenes::NewScene;

use crate::error::{Result, StoreError};
use crate::io::serialization;
use crate::models::Project;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const PROJECT_FILE: &str = "project.json";
pub const SCENES_DIR: &str = "scenes";
pub const THUMBNAILS_DIR: &str = "thumbnails";
pub const MAP_DIR: &str = "map";
pub const UI_DIR: &str = "ui";
pub const BUILD_DIR: &str = "build";

/// Reads and writes projects under one projects directory.
pub struct ProjectStore {
    projects_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProjectStore {
    /// Store rooted at an explicit projects directory.
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Store for a workspace; projects live in its `projects/` folder.
    pub fn for_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join("projects"))
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    pub fn project_path(&self, project_id: &str) -> PathBuf {
        self.projects_dir.join(project_id)
    }

    fn project_file(&self, project_id: &str) -> PathBuf {
        self.project_path(project_id).join(PROJECT_FILE)
    }

    /// Load a project document.
    pub fn load(&self, project_id: &str) -> Result<Project> {
        validate_project_id(project_id)?;
        let path = self.project_file(project_id);
        if !path.is_file() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        serialization::import_json(&path)
    }

    fn save(&self, project: &Project) -> Result<()> {
        serialization::export_json(project, &self.project_file(&project.id))
    }

    fn lock_for(&self, project_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read-modify-write a project under its lock.
    ///
    /// `apply` receives the loaded document and the project directory. If it
    /// fails nothing is written. On success `updatedAt` is stamped and the
    /// document is saved.
    pub fn update<T>(
        &self,
        project_id: &str,
        apply: impl FnOnce(&mut Project, &Path) -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_for(project_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut project = self.load(project_id)?;
        let project_dir = self.project_path(project_id);
        let out = apply(&mut project, &project_dir)?;
        project.touch();
        self.save(&project)?;
        Ok(out)
    }
}

/// Project ids double as directory names and must stay inside the store.
fn validate_project_id(project_id: &str) -> Result<()> {
    let bad = project_id.is_empty()
        || project_id == "."
        || project_id == ".."
        || project_id.contains(['/', '\\']);
    if bad {
        return Err(StoreError::Invalid(format!("bad project id {:?}", project_id)));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A store in a scratch workspace, plus a helper to drop media files.
    pub struct Fixture {
        pub dir: TempDir,
        pub store: ProjectStore,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = ProjectStore::for_workspace(dir.path());
            Self { dir, store }
        }

        /// Write a file outside the projects directory, as a user upload.
        pub fn upload(&self, name: &str, bytes: &[u8]) -> PathBuf {
            let uploads = self.dir.path().join("uploads");
            std::fs::create_dir_all(&uploads).unwrap();
            let path = uploads.join(name);
            std::fs::write(&path, bytes).unwrap();
            path
        }

        pub fn project_json(&self, project_id: &str) -> Vec<u8> {
            std::fs::read(self.store.project_file(project_id)).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use std::thread;

    #[test]
    fn test_rejects_path_like_ids() {
        let fx = Fixture::new();
        for id in ["", "..", "a/b", "..\\x"] {
            assert!(matches!(fx.store.load(id), Err(StoreError::Invalid(_))));
        }
    }

    #[test]
    fn test_missing_project_is_not_found() {
        let fx = Fixture::new();
        let err = fx.store.load("prj_nothere").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let fx = Fixture::new();
        let id = fx.store.create_project("Tour", "", None).unwrap().id;
        let before = fx.project_json(&id);

        let result: Result<()> = fx.store.update(&id, |project, _| {
            project.name = "changed".into();
            Err(StoreError::SceneNotFound("scene_x".into()))
        });
        assert!(result.is_err());
        assert_eq!(fx.project_json(&id), before);
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_writes() {
        let fx = Fixture::new();
        let id = fx.store.create_project("Tour", "", None).unwrap().id;
        let store = Arc::new(fx.store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    store
                        .update(&id, |project, _| {
                            project.description.push_str(&format!("{};", i));
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let project = store.load(&id).unwrap();
        assert_eq!(project.description.matches(';').count(), 8);
    }
}
