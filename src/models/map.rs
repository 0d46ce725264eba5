// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor-plan map configuration and scene markers.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// A point on the map image with normalized coordinates (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// A marker tying a scene to a spot on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: String,
    pub scene_id: String,
    pub position: MapPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Partial marker update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerUpdate {
    pub scene_id: Option<String>,
    pub position: Option<MapPoint>,
    pub label: Option<Option<String>>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub markers: Vec<MapMarker>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            visible: true,
            markers: Vec::new(),
        }
    }
}

impl MapConfig {
    pub fn marker_mut(&mut self, marker_id: &str) -> Result<&mut MapMarker> {
        self.markers
            .iter_mut()
            .find(|m| m.id == marker_id)
            .ok_or_else(|| StoreError::MarkerNotFound(marker_id.to_string()))
    }
}

impl MapMarker {
    pub fn apply(&mut self, update: MarkerUpdate) {
        if let Some(scene_id) = update.scene_id {
            self.scene_id = scene_id;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(label) = update.label {
            self.label = label;
        }
    }
}
