// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted tour data: projects, scenes, hotspots and the map.

pub mod hotspot;
pub mod map;
pub mod project;
pub mod scene;

pub use hotspot::{Hotspot, HotspotDraft, HotspotKind, HotspotUpdate, SpherePosition, Transition};
pub use map::{MapConfig, MapMarker, MapPoint, MarkerUpdate};
pub use project::{Project, ProjectEntry, ProjectUpdate, ViewerSettings};
pub use scene::{MediaType, Scene, SceneMetadata, SceneUpdate, SphereCorrection};
