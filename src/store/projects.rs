// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project-level operations: create, list, rename, delete, categories.

use super::{ProjectStore, BUILD_DIR, PROJECT_FILE, SCENES_DIR, UI_DIR};
use crate::error::{IoContext, Result};
use crate::io::serialization;
use crate::models::{Project, ProjectEntry, ProjectUpdate, ViewerSettings};
use crate::util::{fs as fsutil, ids};
use serde::Serialize;
use std::fs;

/// Defaults written to `ui/settings.json` for a new project.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewerUiDefaults {
    theme: &'static str,
    show_controls: bool,
}

impl ProjectStore {
    /// Create a project with an empty scene list.
    pub fn create_project(
        &self,
        name: &str,
        description: &str,
        category: Option<&str>,
    ) -> Result<Project> {
        fsutil::ensure_dir(self.projects_dir())?;
        let project_id = ids::unique_id(ids::project_id, |id| self.project_path(id).exists());
        let project_path = self.project_path(&project_id);

        for sub in [SCENES_DIR, UI_DIR, BUILD_DIR] {
            fsutil::ensure_dir(&project_path.join(sub))?;
        }

        let project = Project::new(
            project_id,
            name.to_string(),
            description.to_string(),
            category.map(str::to_string),
        );
        serialization::export_json(&project, &project_path.join(PROJECT_FILE))?;
        serialization::write_json_atomic(
            &ViewerUiDefaults {
                theme: "dark",
                show_controls: true,
            },
            &project_path.join(UI_DIR).join("settings.json"),
        )?;

        log::info!("Created project {} ({})", project.name, project.id);
        Ok(project)
    }

    /// All readable projects. Folders without a valid `project.json` are
    /// skipped with a warning.
    pub fn list_projects(&self) -> Result<Vec<ProjectEntry>> {
        fsutil::ensure_dir(self.projects_dir())?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.projects_dir()).at(self.projects_dir())? {
            let entry = entry.at(self.projects_dir())?;
            if !entry.file_type().at(entry.path())?.is_dir() {
                continue;
            }
            let path = entry.path();
            match serialization::import_json(&path.join(PROJECT_FILE)) {
                Ok(project) => entries.push(ProjectEntry { project, path }),
                Err(e) => log::warn!("Failed to read project in {}: {}", path.display(), e),
            }
        }
        entries.sort_by(|a, b| b.project.updated_at.cmp(&a.project.updated_at));
        Ok(entries)
    }

    /// A project and its directory, or `None` if it cannot be read.
    pub fn get_project(&self, project_id: &str) -> Option<ProjectEntry> {
        match self.load(project_id) {
            Ok(project) => Some(ProjectEntry {
                project,
                path: self.project_path(project_id),
            }),
            Err(e) => {
                log::warn!("Failed to read project {}: {}", project_id, e);
                None
            }
        }
    }

    pub fn rename_project(&self, project_id: &str, new_name: &str) -> Result<Project> {
        self.update_project(
            project_id,
            ProjectUpdate {
                name: Some(new_name.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn update_project_description(&self, project_id: &str, description: &str) -> Result<Project> {
        self.update_project(
            project_id,
            ProjectUpdate {
                description: Some(description.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn update_viewer_settings(&self, project_id: &str, settings: ViewerSettings) -> Result<Project> {
        self.update_project(
            project_id,
            ProjectUpdate {
                settings: Some(settings),
                ..Default::default()
            },
        )
    }

    /// Apply a partial update to project-level fields.
    pub fn update_project(&self, project_id: &str, update: ProjectUpdate) -> Result<Project> {
        self.update(project_id, |project, _| {
            project.apply(update);
            Ok(())
        })?;
        self.load(project_id)
    }

    /// Remove a project directory and everything in it.
    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        self.load(project_id)?;
        let path = self.project_path(project_id);
        fs::remove_dir_all(&path).at(&path)?;
        log::info!("Deleted project {}", project_id);
        Ok(())
    }

    /// Number of projects filed under `category`.
    pub fn category_usage(&self, category: &str) -> Result<usize> {
        Ok(self
            .list_projects()?
            .iter()
            .filter(|e| e.project.category.as_deref() == Some(category))
            .count())
    }

    /// Move every project in `old_category` to `new_category`. Projects that
    /// fail to update are logged and skipped.
    pub fn recategorize_projects(&self, old_category: &str, new_category: &str) -> Result<usize> {
        let mut updated = 0;
        for entry in self.list_projects()? {
            if entry.project.category.as_deref() != Some(old_category) {
                continue;
            }
            let result = self.update(&entry.project.id, |project, _| {
                project.category = Some(new_category.to_string());
                Ok(())
            });
            match result {
                Ok(()) => updated += 1,
                Err(e) => log::warn!("Failed to update project {}: {}", entry.project.id, e),
            }
        }
        Ok(updated)
    }
}
