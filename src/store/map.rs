// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor-plan map operations.

use super::{ProjectStore, MAP_DIR};
use crate::error::{IoContext, Result, StoreError};
use crate::models::{MapConfig, MapMarker, MapPoint, MarkerUpdate};
use crate::util::{fs as fsutil, ids};
use std::fs;
use std::path::Path;

fn clamp_point(point: MapPoint) -> MapPoint {
    MapPoint {
        x: point.x.clamp(0.0, 1.0),
        y: point.y.clamp(0.0, 1.0),
    }
}

impl ProjectStore {
    /// Copy an image to `map/map<ext>` and make it the project's map.
    pub fn upload_map_image(&self, project_id: &str, source: &Path) -> Result<MapConfig> {
        self.update(project_id, |project, project_dir| {
            let map_dir = project_dir.join(MAP_DIR);
            fsutil::ensure_dir(&map_dir)?;
            let target = map_dir.join(format!("map{}", fsutil::dotted_extension(source)));
            // Stage next to the target; `source` may be the current map file
            let staged = tempfile::NamedTempFile::new_in(&map_dir).at(&map_dir)?;
            fs::copy(source, staged.path()).at(source)?;
            staged.persist(&target).map_err(|e| StoreError::io(&target, e.error))?;

            let previous = project
                .map_config
                .as_ref()
                .and_then(|c| c.image_path.clone());
            let config = project.map_config_mut();
            config.image_path = Some(target.to_string_lossy().into_owned());

            // A different extension leaves the old image behind
            if let Some(previous) = previous.filter(|p| Path::new(p) != target) {
                if Path::new(&previous).starts_with(&map_dir) {
                    fsutil::remove_file_best_effort(Path::new(&previous), "old map image");
                }
            }
            log::info!("Map image for {} set to {}", project.id, target.display());
            Ok(project.map_config_mut().clone())
        })
    }

    /// The map configuration; an empty visible map if none was set up.
    pub fn map_config(&self, project_id: &str) -> Result<MapConfig> {
        Ok(self.load(project_id)?.map_config.unwrap_or_default())
    }

    /// Replace the whole map configuration.
    pub fn save_map_config(&self, project_id: &str, config: MapConfig) -> Result<()> {
        self.update(project_id, |project, _| {
            project.map_config = Some(config);
            Ok(())
        })
    }

    pub fn set_map_visibility(&self, project_id: &str, visible: bool) -> Result<MapConfig> {
        self.update(project_id, |project, _| {
            let config = project.map_config_mut();
            config.visible = visible;
            Ok(config.clone())
        })
    }

    /// Place a scene on the map. Positions are clamped to the image.
    pub fn add_map_marker(
        &self,
        project_id: &str,
        scene_id: &str,
        position: MapPoint,
        label: Option<String>,
    ) -> Result<MapMarker> {
        self.update(project_id, |project, _| {
            project.scene(scene_id)?;
            let config = project.map_config_mut();
            let id = ids::unique_id(ids::marker_id, |id| config.markers.iter().any(|m| m.id == id));
            let marker = MapMarker {
                id,
                scene_id: scene_id.to_string(),
                position: clamp_point(position),
                label,
            };
            config.markers.push(marker.clone());
            Ok(marker)
        })
    }

    pub fn update_map_marker(&self, project_id: &str, marker_id: &str, update: MarkerUpdate) -> Result<MapMarker> {
        self.update(project_id, |project, _| {
            if let Some(scene_id) = update.scene_id.as_deref() {
                project.scene(scene_id)?;
            }
            let config = project
                .map_config
                .as_mut()
                .ok_or_else(|| StoreError::MapNotConfigured(project_id.to_string()))?;
            let marker = config.marker_mut(marker_id)?;
            marker.apply(update);
            marker.position = clamp_point(marker.position);
            Ok(marker.clone())
        })
    }

    pub fn delete_map_marker(&self, project_id: &str, marker_id: &str) -> Result<()> {
        self.update(project_id, |project, _| {
            let config = project
                .map_config
                .as_mut()
                .ok_or_else(|| StoreError::MapNotConfigured(project_id.to_string()))?;
            config.markers.retain(|m| m.id != marker_id);
            Ok(())
        })
    }

    /// Remove the map image, every marker and the map configuration.
    pub fn clear_map(&self, project_id: &str) -> Result<()> {
        self.update(project_id, |project, project_dir| {
            let map_dir = project_dir.join(MAP_DIR);
            if map_dir.exists() {
                fs::remove_dir_all(&map_dir).at(&map_dir)?;
            }
            project.map_config = None;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::super::NewScene;
    use super::*;

    fn setup(fx: &Fixture) -> (String, String) {
        let project = fx.store.create_project("Tour", "", None).unwrap();
        let scene = fx
            .store
            .add_scene(&project.id, NewScene::upload("Hall", fx.upload("hall.jpg", b"h")))
            .unwrap();
        (project.id, scene.id)
    }

    #[test]
    fn test_default_config_when_unset() {
        let fx = Fixture::new();
        let (project_id, _) = setup(&fx);
        let config = fx.store.map_config(&project_id).unwrap();
        assert!(config.visible);
        assert!(config.markers.is_empty());
        assert!(config.image_path.is_none());
    }

    #[test]
    fn test_upload_and_clear_map() {
        let fx = Fixture::new();
        let (project_id, scene_id) = setup(&fx);
        let plan = fx.upload("plan.png", b"png");

        let config = fx.store.upload_map_image(&project_id, &plan).unwrap();
        let image = config.image_path.unwrap();
        assert!(image.ends_with("map.png"));
        assert!(Path::new(&image).exists());

        fx.store
            .add_map_marker(&project_id, &scene_id, MapPoint { x: 0.2, y: 0.4 }, None)
            .unwrap();
        fx.store.clear_map(&project_id).unwrap();

        assert!(!fx.store.project_path(&project_id).join("map").exists());
        assert!(fx.store.load(&project_id).unwrap().map_config.is_none());
    }

    #[test]
    fn test_reupload_of_current_map_keeps_bytes() {
        let fx = Fixture::new();
        let (project_id, _) = setup(&fx);
        let plan = fx.upload("plan.png", b"floorplan-bytes");

        let stored = fx.store.upload_map_image(&project_id, &plan).unwrap().image_path.unwrap();
        let config = fx.store.upload_map_image(&project_id, Path::new(&stored)).unwrap();

        assert_eq!(config.image_path.as_deref(), Some(stored.as_str()));
        assert_eq!(fs::read(&stored).unwrap(), b"floorplan-bytes");
        let leftovers = fs::read_dir(fx.store.project_path(&project_id).join("map")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_marker_crud() {
        let fx = Fixture::new();
        let (project_id, scene_id) = setup(&fx);

        let marker = fx
            .store
            .add_map_marker(&project_id, &scene_id, MapPoint { x: 1.5, y: -0.2 }, Some("Hall".into()))
            .unwrap();
        assert_eq!(marker.position, MapPoint { x: 1.0, y: 0.0 });

        let moved = fx
            .store
            .update_map_marker(
                &project_id,
                &marker.id,
                MarkerUpdate {
                    position: Some(MapPoint { x: 0.5, y: 0.5 }),
                    label: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.id, marker.id);
        assert_eq!(moved.label, None);

        fx.store.delete_map_marker(&project_id, &marker.id).unwrap();
        assert!(fx.store.map_config(&project_id).unwrap().markers.is_empty());
    }

    #[test]
    fn test_save_whole_config() {
        let fx = Fixture::new();
        let (project_id, scene_id) = setup(&fx);

        let config = MapConfig {
            image_path: None,
            visible: false,
            markers: vec![MapMarker {
                id: "marker_a".into(),
                scene_id,
                position: MapPoint { x: 0.3, y: 0.7 },
                label: Some("Lobby".into()),
            }],
        };
        fx.store.save_map_config(&project_id, config.clone()).unwrap();
        assert_eq!(fx.store.map_config(&project_id).unwrap(), config);

        let config = fx.store.set_map_visibility(&project_id, true).unwrap();
        assert!(config.visible);
        assert_eq!(config.markers.len(), 1);
    }

    #[test]
    fn test_marker_errors() {
        let fx = Fixture::new();
        let (project_id, scene_id) = setup(&fx);

        let err = fx
            .store
            .add_map_marker(&project_id, "scene_nope", MapPoint::default(), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::SceneNotFound(_)));

        let err = fx.store.delete_map_marker(&project_id, "marker_x").unwrap_err();
        assert!(matches!(err, StoreError::MapNotConfigured(_)));

        fx.store.add_map_marker(&project_id, &scene_id, MapPoint::default(), None).unwrap();
        let err = fx
            .store
            .update_map_marker(&project_id, "marker_x", MarkerUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::MarkerNotFound(_)));
    }
}
