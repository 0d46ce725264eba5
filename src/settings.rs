// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings persisted as JSON in the user config directory.
//!
//! Fields missing from the file take their default values, and a missing
//! or unreadable file yields the defaults.

use crate::error::{Result, StoreError};
use crate::io::serialization;
use crate::store::PROJECT_FILE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_WORKSPACES: usize = 5;
const APP_DIR: &str = "panotour";
const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_WORKSPACE_DIR: &str = "Panotour";

/// Built-in project categories as `(id, label)`.
pub const BUILTIN_CATEGORIES: [(&str, &str); 5] = [
    ("real-estate", "Real Estate"),
    ("tourism", "Tourism"),
    ("education", "Education"),
    ("events", "Events"),
    ("other", "Other"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
}

/// Lowercase label with each whitespace run replaced by `-`.
pub fn category_id(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub workspace_path: PathBuf,
    /// Stored for the settings screen; imports do not recompress yet.
    pub photo_compression_enabled: bool,
    pub compression_quality: u8,
    pub max_image_width: u32,
    pub max_image_height: u32,
    pub recent_workspaces: Vec<PathBuf>,
    pub gallery_view_mode: GalleryViewMode,
    pub last_updated_at: DateTime<Utc>,
    pub custom_categories: Vec<Category>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            workspace_path: default_workspace(),
            photo_compression_enabled: true,
            compression_quality: 60,
            max_image_width: 8192,
            max_image_height: 4096,
            recent_workspaces: Vec::new(),
            gallery_view_mode: GalleryViewMode::Grid,
            last_updated_at: Utc::now(),
            custom_categories: Vec::new(),
        }
    }
}

/// Partial update of the compression options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressionUpdate {
    pub quality: Option<u8>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

/// `<documents>/Panotour`, falling back to the home directory.
pub fn default_workspace() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_WORKSPACE_DIR)
}

/// `<config dir>/panotour/settings.json`
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE))
}

impl AppSettings {
    /// Load from the user config directory.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match serialization::read_json(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&mut self) -> Result<()> {
        let path = settings_path().ok_or_else(|| StoreError::Invalid("no config directory available".into()))?;
        self.save_to(&path)
    }

    /// Stamp `lastUpdatedAt` and write the file.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        self.last_updated_at = Utc::now();
        if let Some(parent) = path.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        serialization::write_json_atomic(self, path)
    }

    /// Move `path` to the front of the recent list.
    pub fn push_recent_workspace(&mut self, path: &Path) {
        self.recent_workspaces.retain(|p| p != path);
        self.recent_workspaces.insert(0, path.to_path_buf());
        self.recent_workspaces.truncate(MAX_RECENT_WORKSPACES);
    }

    /// Validate `path` as a workspace and make it current.
    pub fn switch_workspace(&mut self, path: &Path) -> Result<WorkspaceInfo> {
        let info = check_workspace(path);
        if !info.is_valid {
            return Err(StoreError::Invalid(
                info.error.clone().unwrap_or_else(|| "invalid workspace path".into()),
            ));
        }
        self.workspace_path = path.to_path_buf();
        self.push_recent_workspace(path);
        log::info!("Workspace switched to {} ({} projects)", path.display(), info.project_count);
        Ok(info)
    }

    pub fn set_compression(&mut self, update: CompressionUpdate) {
        if let Some(quality) = update.quality {
            self.compression_quality = quality.clamp(1, 100);
        }
        if let Some(width) = update.max_width {
            self.max_image_width = width.max(1);
        }
        if let Some(height) = update.max_height {
            self.max_image_height = height.max(1);
        }
    }

    /// Built-in categories followed by custom ones.
    pub fn categories(&self) -> Vec<Category> {
        BUILTIN_CATEGORIES
            .iter()
            .map(|(id, label)| Category {
                id: id.to_string(),
                label: label.to_string(),
            })
            .chain(self.custom_categories.iter().cloned())
            .collect()
    }

    pub fn add_custom_category(&mut self, label: &str) -> Result<Category> {
        let id = category_id(label);
        if id.is_empty() {
            return Err(StoreError::Invalid("category label is empty".into()));
        }
        if BUILTIN_CATEGORIES.iter().any(|(builtin, _)| *builtin == id) {
            return Err(StoreError::Invalid(format!("category {} already exists in defaults", id)));
        }
        if self.custom_categories.iter().any(|c| c.id == id) {
            return Err(StoreError::Invalid(format!("category {} already exists", id)));
        }
        let category = Category {
            id,
            label: label.trim().to_string(),
        };
        self.custom_categories.push(category.clone());
        Ok(category)
    }

    pub fn remove_custom_category(&mut self, category_id: &str) {
        self.custom_categories.retain(|c| c.id != category_id);
    }
}

/// Result of inspecting a candidate workspace directory.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceInfo {
    pub path: PathBuf,
    pub exists: bool,
    /// Folders under `projects/` that contain a `project.json`
    pub project_count: usize,
    pub is_valid: bool,
    pub error: Option<String>,
}

impl WorkspaceInfo {
    pub fn has_projects(&self) -> bool {
        self.project_count > 0
    }
}

/// Inspect a workspace, creating the directory if it is missing.
pub fn check_workspace(path: &Path) -> WorkspaceInfo {
    let mut info = WorkspaceInfo {
        path: path.to_path_buf(),
        exists: false,
        project_count: 0,
        is_valid: false,
        error: None,
    };

    if !path.is_dir() {
        if let Err(e) = fs::create_dir_all(path) {
            log::warn!("Cannot create workspace {}: {}", path.display(), e);
            info.error = Some("Cannot create workspace directory. Check permissions.".into());
            return info;
        }
    }
    info.exists = true;

    if let Ok(entries) = fs::read_dir(path.join("projects")) {
        info.project_count = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().join(PROJECT_FILE).is_file())
            .count();
    }
    info.is_valid = true;
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppSettings::load_from(&dir.path().join("none.json"));
        assert_eq!(missing.compression_quality, 60);
        assert_eq!(missing.gallery_view_mode, GalleryViewMode::Grid);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, b"{ nope").unwrap();
        let settings = AppSettings::load_from(&bad);
        assert_eq!((settings.max_image_width, settings.max_image_height), (8192, 4096));
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{"galleryViewMode":"list","compressionQuality":85}"#).unwrap();

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.gallery_view_mode, GalleryViewMode::List);
        assert_eq!(settings.compression_quality, 85);
        assert!(settings.photo_compression_enabled);
        assert!(settings.custom_categories.is_empty());
    }

    #[test]
    fn test_save_round_trip_stamps_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let mut settings = AppSettings::default();
        let before = settings.last_updated_at;
        settings.add_custom_category("Night Life").unwrap();
        settings.save_to(&path).unwrap();

        assert!(settings.last_updated_at >= before);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"customCategories\""));
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_recent_workspaces_dedup_and_cap() {
        let mut settings = AppSettings::default();
        for i in 0..7 {
            settings.push_recent_workspace(Path::new(&format!("/ws/{}", i)));
        }
        settings.push_recent_workspace(Path::new("/ws/4"));

        assert_eq!(settings.recent_workspaces.len(), MAX_RECENT_WORKSPACES);
        assert_eq!(settings.recent_workspaces[0], PathBuf::from("/ws/4"));
        assert_eq!(settings.recent_workspaces[1], PathBuf::from("/ws/6"));
        assert_eq!(
            settings.recent_workspaces.iter().filter(|p| **p == PathBuf::from("/ws/4")).count(),
            1
        );
    }

    #[test]
    fn test_custom_categories() {
        let mut settings = AppSettings::default();
        let category = settings.add_custom_category("  Night   Life ").unwrap();
        assert_eq!(category.id, "night-life");
        assert_eq!(category.label, "Night   Life");

        assert!(settings.add_custom_category("night life").is_err());
        assert!(settings.add_custom_category("Tourism").is_err());
        assert!(settings.add_custom_category("   ").is_err());
        assert_eq!(settings.categories().len(), 6);

        settings.remove_custom_category("night-life");
        assert_eq!(settings.categories().len(), 5);
    }

    #[test]
    fn test_compression_update_clamps() {
        let mut settings = AppSettings::default();
        settings.set_compression(CompressionUpdate {
            quality: Some(0),
            max_width: Some(4096),
            ..Default::default()
        });
        assert_eq!(settings.compression_quality, 1);
        assert_eq!(settings.max_image_width, 4096);
        assert_eq!(settings.max_image_height, 4096);
    }

    #[test]
    fn test_check_and_switch_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("new_ws");
        let store = crate::store::ProjectStore::for_workspace(&ws);
        let info = check_workspace(&ws);
        assert!(info.is_valid && info.exists && !info.has_projects());

        store.create_project("One", "", None).unwrap();
        fs::create_dir_all(ws.join("projects").join("junk")).unwrap();

        let mut settings = AppSettings::default();
        let info = settings.switch_workspace(&ws).unwrap();
        assert_eq!(info.project_count, 1);
        assert_eq!(settings.workspace_path, ws);
        assert_eq!(settings.recent_workspaces, vec![ws.clone()]);
    }

    #[test]
    fn test_switch_to_unusable_workspace_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a_file");
        fs::write(&file, b"x").unwrap();

        let mut settings = AppSettings::default();
        let previous = settings.workspace_path.clone();
        assert!(settings.switch_workspace(&file.join("sub")).is_err());
        assert_eq!(settings.workspace_path, previous);
        assert!(settings.recent_workspaces.is_empty());
    }
}
