// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document.
//!
//! This module defines the persisted `project.json` document and the
//! in-memory rules that keep it consistent: scene lookup and the
//! single-featured-scene invariant.

use super::hotspot::HotspotKind;
use super::map::MapConfig;
use super::scene::Scene;
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PROJECT_VERSION: &str = "1.0";

fn default_version() -> String {
    PROJECT_VERSION.to_string()
}

/// Viewer defaults stored with the project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettings {
    pub auto_rotate: bool,
    pub initial_fov: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            auto_rotate: false,
            initial_fov: 75.0,
        }
    }
}

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_scene_id: Option<String>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub settings: ViewerSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_config: Option<MapConfig>,
}

impl Project {
    /// Create an empty project.
    pub fn new(id: String, name: String, description: String, category: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description,
            category,
            version: default_version(),
            created_at: now,
            updated_at: now,
            main_scene_id: None,
            scenes: Vec::new(),
            settings: ViewerSettings::default(),
            map_config: None,
        }
    }

    /// Stamp the modification time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn scene(&self, scene_id: &str) -> Result<&Scene> {
        self.scenes
            .iter()
            .find(|s| s.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
    }

    pub fn scene_mut(&mut self, scene_id: &str) -> Result<&mut Scene> {
        self.scenes
            .iter_mut()
            .find(|s| s.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
    }

    pub fn featured_scene(&self) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.is_featured)
    }

    /// The scene a viewer opens first: the featured one, else the first.
    pub fn entry_scene(&self) -> Option<&Scene> {
        self.featured_scene().or_else(|| self.scenes.first())
    }

    /// Append a scene. The first scene of a project becomes featured.
    pub fn push_scene(&mut self, mut scene: Scene) {
        if self.scenes.is_empty() {
            scene.is_featured = true;
        } else if scene.is_featured {
            self.scenes.iter_mut().for_each(|s| s.is_featured = false);
        }
        self.scenes.push(scene);
    }

    /// Set or clear the featured flag. Setting it clears every other scene.
    pub fn set_featured(&mut self, scene_id: &str, featured: bool) -> Result<()> {
        // Validate before touching any other scene
        self.scene(scene_id)?;
        for scene in &mut self.scenes {
            if scene.id == scene_id {
                scene.is_featured = featured;
            } else if featured {
                scene.is_featured = false;
            }
        }
        Ok(())
    }

    /// Remove a scene, promoting the first remaining scene to featured when
    /// the removed one was featured.
    pub fn remove_scene(&mut self, scene_id: &str) -> Result<Scene> {
        let index = self
            .scenes
            .iter()
            .position(|s| s.id == scene_id)
            .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
        let removed = self.scenes.remove(index);
        if removed.is_featured {
            if let Some(first) = self.scenes.first_mut() {
                first.is_featured = true;
            }
        }
        if self.main_scene_id.as_deref() == Some(scene_id) {
            self.main_scene_id = None;
        }

        // Nothing may keep pointing at the removed scene
        if let Some(config) = self.map_config.as_mut() {
            config.markers.retain(|m| m.scene_id != scene_id);
        }
        for scene in &mut self.scenes {
            scene.hotspots.retain(|h| {
                !matches!(&h.kind, HotspotKind::Scene { target_scene_id, .. } if target_scene_id == scene_id)
            });
        }
        Ok(removed)
    }

    /// Map configuration, created empty and visible on first use.
    pub fn map_config_mut(&mut self) -> &mut MapConfig {
        self.map_config.get_or_insert_with(MapConfig::default)
    }

    /// Total hotspot count across all scenes.
    pub fn hotspot_count(&self) -> usize {
        self.scenes.iter().map(|s| s.hotspots.len()).sum()
    }
}

/// A project as found on disk: the document plus its directory.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    pub project: Project,
    pub path: PathBuf,
}

/// Partial update for project-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub settings: Option<ViewerSettings>,
}

impl Project {
    pub fn apply(&mut self, update: ProjectUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_scenes(n: usize) -> Project {
        let mut project = Project::new("prj_test".into(), "Test".into(), String::new(), None);
        for i in 0..n {
            project.push_scene(Scene::new(
                format!("scene_{i}"),
                format!("Scene {i}"),
                format!("/tmp/{i}.jpg"),
            ));
        }
        project
    }

    fn featured_count(project: &Project) -> usize {
        project.scenes.iter().filter(|s| s.is_featured).count()
    }

    #[test]
    fn test_first_scene_is_featured() {
        let project = project_with_scenes(3);
        assert!(project.scenes[0].is_featured);
        assert_eq!(featured_count(&project), 1);
    }

    #[test]
    fn test_set_featured_keeps_single_flag() {
        let mut project = project_with_scenes(4);
        project.set_featured("scene_2", true).unwrap();
        project.set_featured("scene_3", true).unwrap();
        project.set_featured("scene_1", true).unwrap();
        assert_eq!(featured_count(&project), 1);
        assert!(project.scene("scene_1").unwrap().is_featured);

        project.set_featured("scene_1", false).unwrap();
        assert_eq!(featured_count(&project), 0);
    }

    #[test]
    fn test_set_featured_unknown_scene_changes_nothing() {
        let mut project = project_with_scenes(2);
        let before = project.clone();
        assert!(matches!(
            project.set_featured("scene_missing", true),
            Err(StoreError::SceneNotFound(_))
        ));
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_featured_promotes_first_remaining() {
        let mut project = project_with_scenes(3);
        project.set_featured("scene_1", true).unwrap();
        project.remove_scene("scene_1").unwrap();
        assert_eq!(project.scenes.len(), 2);
        assert!(project.scenes[0].is_featured);
        assert_eq!(featured_count(&project), 1);
    }

    #[test]
    fn test_remove_unfeatured_keeps_featured() {
        let mut project = project_with_scenes(3);
        project.remove_scene("scene_2").unwrap();
        assert!(project.scene("scene_0").unwrap().is_featured);
        assert_eq!(featured_count(&project), 1);
    }

    #[test]
    fn test_entry_scene_falls_back_to_first() {
        let mut project = project_with_scenes(2);
        project.set_featured("scene_0", false).unwrap();
        assert_eq!(project.entry_scene().unwrap().id, "scene_0");
    }
}
