// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspot data structures.
//!
//! A hotspot is a clickable marker anchored at a yaw/pitch position on a
//! panorama. It either links to another scene, opens an information popup,
//! or points at an external URL.

use serde::{Deserialize, Serialize};

/// A position on the panorama sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpherePosition {
    pub yaw: f64,
    pub pitch: f64,
}

impl SpherePosition {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }
}

/// Transition played when following a scene link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Fade,
    Slide,
    None,
}

/// Type-specific payload of a hotspot, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotspotKind {
    #[serde(rename_all = "camelCase")]
    Scene {
        target_scene_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition: Option<Transition>,
    },
    #[serde(rename_all = "camelCase")]
    Info {
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open_in_new_tab: Option<bool>,
    },
}

impl HotspotKind {
    /// Short lowercase label matching the JSON tag.
    pub fn label(&self) -> &'static str {
        match self {
            HotspotKind::Scene { .. } => "scene",
            HotspotKind::Info { .. } => "info",
            HotspotKind::Url { .. } => "url",
        }
    }
}

fn default_visible() -> bool {
    true
}

/// A hotspot placed on a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    #[serde(flatten)]
    pub kind: HotspotKind,
    pub position: SpherePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

/// Everything needed to create a hotspot; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotDraft {
    pub kind: HotspotKind,
    pub position: SpherePosition,
    pub tooltip: Option<String>,
    pub is_visible: bool,
}

impl HotspotDraft {
    pub fn new(kind: HotspotKind, position: SpherePosition) -> Self {
        Self {
            kind,
            position,
            tooltip: None,
            is_visible: true,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn into_hotspot(self, id: String) -> Hotspot {
        Hotspot {
            id,
            kind: self.kind,
            position: self.position,
            tooltip: self.tooltip,
            is_visible: self.is_visible,
        }
    }
}

/// Partial hotspot update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotUpdate {
    pub kind: Option<HotspotKind>,
    pub position: Option<SpherePosition>,
    pub tooltip: Option<Option<String>>,
    pub is_visible: Option<bool>,
}

impl Hotspot {
    /// Apply a partial update. The id never changes.
    pub fn apply(&mut self, update: HotspotUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(tooltip) = update.tooltip {
            self.tooltip = tooltip;
        }
        if let Some(visible) = update.is_visible {
            self.is_visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_hotspot_json_shape() {
        let hotspot = HotspotDraft::new(
            HotspotKind::Scene {
                target_scene_id: "scene_2".to_string(),
                transition: Some(Transition::Fade),
            },
            SpherePosition::new(12.5, -4.0),
        )
        .into_hotspot("hotspot_1".to_string());

        let value = serde_json::to_value(&hotspot).unwrap();
        assert_eq!(value["type"], "scene");
        assert_eq!(value["targetSceneId"], "scene_2");
        assert_eq!(value["transition"], "fade");
        assert_eq!(value["position"]["yaw"], 12.5);
        assert_eq!(value["isVisible"], true);
        assert!(value.get("tooltip").is_none());
    }

    #[test]
    fn test_reads_document_without_visibility_flag() {
        let json = r#"{
            "id": "hotspot_a",
            "type": "url",
            "position": { "yaw": 0, "pitch": 10 },
            "url": "https://example.com",
            "openInNewTab": true
        }"#;
        let hotspot: Hotspot = serde_json::from_str(json).unwrap();
        assert!(hotspot.is_visible);
        assert_eq!(
            hotspot.kind,
            HotspotKind::Url {
                url: "https://example.com".to_string(),
                open_in_new_tab: Some(true),
            }
        );
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut hotspot = HotspotDraft::new(
            HotspotKind::Info {
                title: "Lobby".to_string(),
                content: String::new(),
                image_url: None,
            },
            SpherePosition::default(),
        )
        .into_hotspot("hotspot_x".to_string());

        hotspot.apply(HotspotUpdate {
            position: Some(SpherePosition::new(90.0, 5.0)),
            tooltip: Some(Some("Front desk".to_string())),
            ..Default::default()
        });

        assert_eq!(hotspot.id, "hotspot_x");
        assert_eq!(hotspot.position.yaw, 90.0);
        assert_eq!(hotspot.tooltip.as_deref(), Some("Front desk"));
        assert_eq!(hotspot.kind.label(), "info");
    }
}
