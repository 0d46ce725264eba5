// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene data structures.
//!
//! A scene is one panoramic image or video together with its hotspots and
//! display metadata.

use super::hotspot::Hotspot;
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "avi"];

/// Kind of media backing a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    /// Detect the media type from a file extension. Unknown extensions are
    /// treated as images.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

/// Per-scene orientation offsets applied by the viewer, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SphereCorrection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
}

/// File information captured when the scene was added.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

fn default_visible() -> bool {
    true
}

/// A panorama scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub name: String,
    /// Media path (image or video). Kept under the historical key name.
    #[serde(rename = "imagePath")]
    pub media_path: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// GPS coordinates as `[longitude, latitude]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere_correction: Option<SphereCorrection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SceneMetadata>,
}

impl Scene {
    pub fn new(id: String, name: String, media_path: String) -> Self {
        let media_type = MediaType::from_path(Path::new(&media_path));
        Self {
            id,
            name,
            media_path,
            media_type,
            hotspots: Vec::new(),
            thumbnail: None,
            description: None,
            comment: None,
            is_visible: true,
            is_featured: false,
            coordinates: None,
            bearing: None,
            sphere_correction: None,
            metadata: None,
        }
    }

    pub fn hotspot(&self, hotspot_id: &str) -> Result<&Hotspot> {
        self.hotspots
            .iter()
            .find(|h| h.id == hotspot_id)
            .ok_or_else(|| StoreError::HotspotNotFound(hotspot_id.to_string()))
    }

    pub fn hotspot_mut(&mut self, hotspot_id: &str) -> Result<&mut Hotspot> {
        self.hotspots
            .iter_mut()
            .find(|h| h.id == hotspot_id)
            .ok_or_else(|| StoreError::HotspotNotFound(hotspot_id.to_string()))
    }

    pub fn apply(&mut self, update: SceneUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(comment) = update.comment {
            self.comment = comment;
        }
        if let Some(visible) = update.is_visible {
            self.is_visible = visible;
        }
        if let Some(coordinates) = update.coordinates {
            self.coordinates = coordinates;
        }
        if let Some(bearing) = update.bearing {
            self.bearing = bearing;
        }
        if let Some(correction) = update.sphere_correction {
            self.sphere_correction = correction;
        }
    }
}

/// Partial scene update. `None` leaves a field untouched; `Some(None)`
/// clears an optional field.
///
/// The featured flag is changed through `ProjectStore::set_featured_scene`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub comment: Option<Option<String>>,
    pub is_visible: Option<bool>,
    pub coordinates: Option<Option<[f64; 2]>>,
    pub bearing: Option<Option<f64>>,
    pub sphere_correction: Option<Option<SphereCorrection>>,
}
