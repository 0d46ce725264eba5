// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspot operations.

use super::ProjectStore;
use crate::error::Result;
use crate::models::{Hotspot, HotspotDraft, HotspotUpdate, Scene};
use crate::util::{geometry, ids};

impl ProjectStore {
    /// Add a hotspot to a scene and return it with its generated id.
    pub fn add_hotspot(&self, project_id: &str, scene_id: &str, draft: HotspotDraft) -> Result<Hotspot> {
        self.update(project_id, |project, _| {
            let scene = project.scene_mut(scene_id)?;
            let id = ids::unique_id(ids::hotspot_id, |id| scene.hotspots.iter().any(|h| h.id == id));
            let mut hotspot = draft.into_hotspot(id);
            hotspot.position.yaw = geometry::wrap_yaw(hotspot.position.yaw);
            hotspot.position.pitch = geometry::clamp_pitch(hotspot.position.pitch);
            scene.hotspots.push(hotspot.clone());
            Ok(hotspot)
        })
    }

    /// Apply a partial update. The hotspot id is preserved.
    pub fn update_hotspot(
        &self,
        project_id: &str,
        scene_id: &str,
        hotspot_id: &str,
        update: HotspotUpdate,
    ) -> Result<Hotspot> {
        self.update(project_id, |project, _| {
            let hotspot = project.scene_mut(scene_id)?.hotspot_mut(hotspot_id)?;
            hotspot.apply(update);
            hotspot.position.yaw = geometry::wrap_yaw(hotspot.position.yaw);
            hotspot.position.pitch = geometry::clamp_pitch(hotspot.position.pitch);
            Ok(hotspot.clone())
        })
    }

    /// Remove one hotspot. Removing an id that is not present is a no-op on
    /// the hotspot list, but the scene must exist.
    pub fn delete_hotspot(&self, project_id: &str, scene_id: &str, hotspot_id: &str) -> Result<Scene> {
        self.update(project_id, |project, _| {
            let scene = project.scene_mut(scene_id)?;
            scene.hotspots.retain(|h| h.id != hotspot_id);
            Ok(scene.clone())
        })
    }

    pub fn delete_all_hotspots(&self, project_id: &str, scene_id: &str) -> Result<Scene> {
        self.update(project_id, |project, _| {
            let scene = project.scene_mut(scene_id)?;
            scene.hotspots.clear();
            Ok(scene.clone())
        })
    }

    pub fn set_hotspot_visibility(
        &self,
        project_id: &str,
        scene_id: &str,
        hotspot_id: &str,
        visible: bool,
    ) -> Result<Hotspot> {
        self.update_hotspot(
            project_id,
            scene_id,
            hotspot_id,
            HotspotUpdate {
                is_visible: Some(visible),
                ..Default::default()
            },
        )
    }

    /// Flip a hotspot's visibility and return the new state.
    pub fn toggle_hotspot_visibility(&self, project_id: &str, scene_id: &str, hotspot_id: &str) -> Result<bool> {
        self.update(project_id, |project, _| {
            let hotspot = project.scene_mut(scene_id)?.hotspot_mut(hotspot_id)?;
            hotspot.is_visible = !hotspot.is_visible;
            Ok(hotspot.is_visible)
        })
    }

    /// Show or hide every hotspot in a scene.
    pub fn set_all_hotspots_visibility(&self, project_id: &str, scene_id: &str, visible: bool) -> Result<Scene> {
        self.update(project_id, |project, _| {
            let scene = project.scene_mut(scene_id)?;
            scene.hotspots.iter_mut().for_each(|h| h.is_visible = visible);
            Ok(scene.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::super::NewScene;
    use crate::error::StoreError;
    use crate::models::{HotspotDraft, HotspotKind, HotspotUpdate, SpherePosition, Transition};

    fn setup(fx: &Fixture) -> (String, String, String) {
        let project = fx.store.create_project("Tour", "", None).unwrap();
        let a = fx
            .store
            .add_scene(&project.id, NewScene::upload("A", fx.upload("a.jpg", b"a")))
            .unwrap();
        let b = fx
            .store
            .add_scene(&project.id, NewScene::upload("B", fx.upload("b.jpg", b"b")))
            .unwrap();
        (project.id, a.id, b.id)
    }

    fn link(target: &str, yaw: f64) -> HotspotDraft {
        HotspotDraft::new(
            HotspotKind::Scene {
                target_scene_id: target.to_string(),
                transition: Some(Transition::Slide),
            },
            SpherePosition::new(yaw, 0.0),
        )
    }

    #[test]
    fn test_add_assigns_unique_ids_and_normalizes_position() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        let h1 = fx.store.add_hotspot(&project_id, &a, link(&b, 200.0)).unwrap();
        let h2 = fx.store.add_hotspot(&project_id, &a, link(&b, 10.0)).unwrap();

        assert_ne!(h1.id, h2.id);
        assert!(h1.id.starts_with("hotspot_"));
        assert_eq!(h1.position.yaw, -160.0);

        let project = fx.store.load(&project_id).unwrap();
        assert_eq!(project.scene(&a).unwrap().hotspots.len(), 2);
    }

    #[test]
    fn test_update_preserves_id() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        let h = fx.store.add_hotspot(&project_id, &a, link(&b, 0.0)).unwrap();

        let updated = fx
            .store
            .update_hotspot(
                &project_id,
                &a,
                &h.id,
                HotspotUpdate {
                    kind: Some(HotspotKind::Url {
                        url: "https://example.com".into(),
                        open_in_new_tab: Some(true),
                    }),
                    position: Some(SpherePosition::new(45.0, 120.0)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, h.id);
        assert_eq!(updated.kind.label(), "url");
        assert_eq!(updated.position.pitch, 90.0);
    }

    #[test]
    fn test_delete_all_only_touches_target_scene() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        for yaw in [0.0, 30.0, 60.0] {
            fx.store.add_hotspot(&project_id, &a, link(&b, yaw)).unwrap();
        }
        fx.store.add_hotspot(&project_id, &b, link(&a, 0.0)).unwrap();

        let scene = fx.store.delete_all_hotspots(&project_id, &a).unwrap();
        assert!(scene.hotspots.is_empty());

        let project = fx.store.load(&project_id).unwrap();
        assert!(project.scene(&a).unwrap().hotspots.is_empty());
        assert_eq!(project.scene(&b).unwrap().hotspots.len(), 1);
    }

    #[test]
    fn test_delete_single_hotspot() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        let keep = fx.store.add_hotspot(&project_id, &a, link(&b, 0.0)).unwrap();
        let gone = fx.store.add_hotspot(&project_id, &a, link(&b, 90.0)).unwrap();

        let scene = fx.store.delete_hotspot(&project_id, &a, &gone.id).unwrap();
        let ids: Vec<_> = scene.hotspots.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec![keep.id.as_str()]);
    }

    #[test]
    fn test_toggle_visibility_twice_restores_state() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        let h = fx.store.add_hotspot(&project_id, &a, link(&b, 0.0)).unwrap();
        assert!(h.is_visible);

        assert!(!fx.store.toggle_hotspot_visibility(&project_id, &a, &h.id).unwrap());
        assert!(fx.store.toggle_hotspot_visibility(&project_id, &a, &h.id).unwrap());

        let project = fx.store.load(&project_id).unwrap();
        assert!(project.scene(&a).unwrap().hotspot(&h.id).unwrap().is_visible);
    }

    #[test]
    fn test_set_all_visibility() {
        let fx = Fixture::new();
        let (project_id, a, b) = setup(&fx);
        fx.store.add_hotspot(&project_id, &a, link(&b, 0.0)).unwrap();
        fx.store.add_hotspot(&project_id, &a, link(&b, 1.0)).unwrap();

        let scene = fx.store.set_all_hotspots_visibility(&project_id, &a, false).unwrap();
        assert!(scene.hotspots.iter().all(|h| !h.is_visible));
    }

    #[test]
    fn test_missing_hotspot_is_not_found() {
        let fx = Fixture::new();
        let (project_id, a, _) = setup(&fx);
        let err = fx.store.set_hotspot_visibility(&project_id, &a, "hotspot_nope", false).unwrap_err();
        assert!(matches!(err, StoreError::HotspotNotFound(_)));

        let err = fx.store.delete_all_hotspots(&project_id, "scene_nope").unwrap_err();
        assert!(matches!(err, StoreError::SceneNotFound(_)));
    }
}
