// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene operations.

use super::{ProjectStore, SCENES_DIR, THUMBNAILS_DIR};
use crate::error::{IoContext, Result};
use crate::io::media;
use crate::models::{MediaType, Scene, SceneMetadata, SceneUpdate, SphereCorrection};
use crate::util::{fs as fsutil, geometry, ids};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// A scene to be added to a project.
#[derive(Debug, Clone)]
pub struct NewScene {
    pub name: String,
    pub source: PathBuf,
    /// Copy `source` into the project's `scenes/` folder. When false the
    /// scene references `source` in place.
    pub copy_into_project: bool,
}

impl NewScene {
    pub fn upload(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            copy_into_project: true,
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A file copied into the project for a pending update. It is deleted
/// again when dropped, unless the update was saved and `keep` was called.
#[derive(Debug)]
struct StagedFile {
    path: PathBuf,
    kept: bool,
}

impl StagedFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.kept {
            fsutil::remove_file_best_effort(&self.path, "unsaved copy");
        }
    }
}

/// Copy an external file into `<project>/<sub>/<prefix>_<token><ext>`.
fn copy_into(project_dir: &Path, sub: &str, prefix: &str, source: &Path) -> Result<StagedFile> {
    let dir = project_dir.join(sub);
    fsutil::ensure_dir(&dir)?;
    let file_name = format!(
        "{}{}",
        ids::prefixed(prefix),
        fsutil::dotted_extension(source)
    );
    let dest = dir.join(file_name);
    fs::copy(source, &dest).at(source)?;
    Ok(StagedFile { path: dest, kept: false })
}

fn file_metadata(path: &Path) -> Option<SceneMetadata> {
    match fs::metadata(path) {
        Ok(meta) => Some(SceneMetadata {
            file_size: Some(meta.len()),
            date_added: Some(Utc::now()),
        }),
        Err(e) => {
            log::warn!("Could not get file metadata for {}: {}", path.display(), e);
            None
        }
    }
}

/// Delete a media file the project owns, unless another scene still uses it.
fn remove_owned_media(project_dir: &Path, path: &str, scenes: &[Scene], what: &str) {
    let still_used = scenes
        .iter()
        .any(|s| s.media_path == path || s.thumbnail.as_deref() == Some(path));
    if still_used {
        return;
    }
    let path = Path::new(path);
    if path.starts_with(project_dir) {
        fsutil::remove_file_best_effort(path, what);
    } else {
        log::info!("Leaving external {} in place: {}", what, path.display());
    }
}

impl ProjectStore {
    /// Add a scene. The first scene in a project becomes featured.
    pub fn add_scene(&self, project_id: &str, new_scene: NewScene) -> Result<Scene> {
        let mut staged = None;
        let added = self.update(project_id, |project, project_dir| {
            let media_path = if new_scene.copy_into_project {
                let copy = copy_into(project_dir, SCENES_DIR, "scene", &new_scene.source)?;
                let path = copy.path().to_path_buf();
                staged = Some(copy);
                path
            } else {
                new_scene.source.clone()
            };

            let id = ids::unique_id(ids::scene_id, |id| project.scenes.iter().any(|s| s.id == id));
            let mut scene = Scene::new(id, new_scene.name, path_string(&media_path));
            scene.metadata = file_metadata(&media_path);
            if scene.media_type == MediaType::Image {
                media::warn_if_not_panorama(&media_path);
            }

            project.push_scene(scene);
            let added = project.scenes[project.scenes.len() - 1].clone();
            log::info!("Added scene {} to {}", added.id, project.id);
            Ok(added)
        })?;
        if let Some(copy) = staged {
            copy.keep();
        }
        Ok(added)
    }

    /// Remove a scene. Media files the project owns are deleted afterwards
    /// on a best-effort basis.
    pub fn delete_scene(&self, project_id: &str, scene_id: &str) -> Result<()> {
        let (removed, remaining, project_dir) = self.update(project_id, |project, project_dir| {
            let removed = project.remove_scene(scene_id)?;
            Ok((removed, project.scenes.clone(), project_dir.to_path_buf()))
        })?;

        remove_owned_media(&project_dir, &removed.media_path, &remaining, "scene media");
        if let Some(thumb) = removed.thumbnail.as_deref() {
            remove_owned_media(&project_dir, thumb, &remaining, "thumbnail");
        }
        log::info!("Deleted scene {} from {}", scene_id, project_id);
        Ok(())
    }

    /// Apply a partial update to one scene.
    pub fn update_scene(&self, project_id: &str, scene_id: &str, update: SceneUpdate) -> Result<Scene> {
        self.update(project_id, |project, _| {
            let scene = project.scene_mut(scene_id)?;
            scene.apply(update);
            Ok(scene.clone())
        })
    }

    pub fn rename_scene(&self, project_id: &str, scene_id: &str, new_name: &str) -> Result<Scene> {
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                name: Some(new_name.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn set_scene_visibility(&self, project_id: &str, scene_id: &str, visible: bool) -> Result<Scene> {
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                is_visible: Some(visible),
                ..Default::default()
            },
        )
    }

    /// Set or clear GPS coordinates (`[longitude, latitude]`).
    pub fn set_scene_coordinates(
        &self,
        project_id: &str,
        scene_id: &str,
        coordinates: Option<[f64; 2]>,
    ) -> Result<Scene> {
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                coordinates: Some(coordinates),
                ..Default::default()
            },
        )
    }

    /// Set or clear the compass bearing, wrapped into [0, 360).
    pub fn set_scene_bearing(&self, project_id: &str, scene_id: &str, bearing: Option<f64>) -> Result<Scene> {
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                bearing: Some(bearing.map(geometry::wrap_bearing)),
                ..Default::default()
            },
        )
    }

    pub fn set_sphere_correction(
        &self,
        project_id: &str,
        scene_id: &str,
        correction: Option<SphereCorrection>,
    ) -> Result<Scene> {
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                sphere_correction: Some(correction),
                ..Default::default()
            },
        )
    }

    pub fn set_scene_comment(&self, project_id: &str, scene_id: &str, comment: Option<String>) -> Result<Scene> {
        let comment = comment.filter(|c| !c.trim().is_empty());
        self.update_scene(
            project_id,
            scene_id,
            SceneUpdate {
                comment: Some(comment),
                ..Default::default()
            },
        )
    }

    /// Mark a scene as featured (clearing every other scene) or unmark it.
    pub fn set_featured_scene(&self, project_id: &str, scene_id: &str, featured: bool) -> Result<()> {
        self.update(project_id, |project, _| project.set_featured(scene_id, featured))
    }

    /// Swap the media behind a scene. The old thumbnail no longer matches
    /// and is dropped. The old media file is deleted only when the new one
    /// was copied in and nothing else references the old one.
    pub fn replace_scene_media(
        &self,
        project_id: &str,
        scene_id: &str,
        source: &Path,
        copy_into_project: bool,
    ) -> Result<Scene> {
        let mut staged = None;
        let (scene, old_media, old_thumb, scenes, project_dir) =
            self.update(project_id, |project, project_dir| {
                project.scene(scene_id)?;
                let media_path = if copy_into_project {
                    let copy = copy_into(project_dir, SCENES_DIR, "scene", source)?;
                    let path = copy.path().to_path_buf();
                    staged = Some(copy);
                    path
                } else {
                    source.to_path_buf()
                };

                let scene = project.scene_mut(scene_id)?;
                let old_media = std::mem::replace(&mut scene.media_path, path_string(&media_path));
                let old_thumb = scene.thumbnail.take();
                scene.media_type = MediaType::from_path(&media_path);
                scene.metadata = file_metadata(&media_path);
                let scene = scene.clone();
                Ok((scene, old_media, old_thumb, project.scenes.clone(), project_dir.to_path_buf()))
            })?;
        if let Some(copy) = staged {
            copy.keep();
        }

        if let Some(thumb) = old_thumb.as_deref() {
            remove_owned_media(&project_dir, thumb, &scenes, "old thumbnail");
        }
        if copy_into_project && old_media != scene.media_path {
            remove_owned_media(&project_dir, &old_media, &scenes, "old scene media");
        }
        Ok(scene)
    }

    /// Copy an image into `thumbnails/` and use it as the scene thumbnail.
    pub fn set_scene_thumbnail(&self, project_id: &str, scene_id: &str, source: &Path) -> Result<Scene> {
        let mut staged = None;
        let (scene, old_thumb, scenes, project_dir) = self.update(project_id, |project, project_dir| {
            project.scene(scene_id)?;
            let copy = copy_into(project_dir, THUMBNAILS_DIR, "thumb", source)?;
            let scene = project.scene_mut(scene_id)?;
            let old_thumb = scene.thumbnail.replace(path_string(copy.path()));
            staged = Some(copy);
            let scene = scene.clone();
            Ok((scene, old_thumb, project.scenes.clone(), project_dir.to_path_buf()))
        })?;
        if let Some(copy) = staged {
            copy.keep();
        }

        if let Some(thumb) = old_thumb.as_deref() {
            remove_owned_media(&project_dir, thumb, &scenes, "old thumbnail");
        }
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::error::StoreError;
    use crate::models::{HotspotDraft, HotspotKind, MapPoint, SpherePosition};

    fn project_with_scenes(fx: &Fixture, n: usize) -> (String, Vec<Scene>) {
        let project = fx.store.create_project("Tour", "", None).unwrap();
        let scenes = (0..n)
            .map(|i| {
                let upload = fx.upload(&format!("pano{i}.jpg"), b"jpeg bytes");
                fx.store
                    .add_scene(&project.id, NewScene::upload(format!("Room {i}"), upload))
                    .unwrap()
            })
            .collect();
        (project.id, scenes)
    }

    #[test]
    fn test_add_scene_copies_upload() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 1);
        let scene = &scenes[0];

        let media = Path::new(&scene.media_path);
        assert!(media.starts_with(fx.store.project_path(&project_id).join("scenes")));
        assert!(media.file_name().unwrap().to_string_lossy().starts_with("scene_"));
        assert_eq!(fs::read(media).unwrap(), b"jpeg bytes");
        assert_eq!(scene.metadata.as_ref().unwrap().file_size, Some(10));
        assert!(scene.is_featured);
        assert!(scene.is_visible);
    }

    #[test]
    fn test_add_scene_in_place_and_video_detection() {
        let fx = Fixture::new();
        let project = fx.store.create_project("Tour", "", None).unwrap();
        let video = fx.upload("walk.mp4", b"video");
        let scene = fx
            .store
            .add_scene(
                &project.id,
                NewScene {
                    name: "Walk".into(),
                    source: video.clone(),
                    copy_into_project: false,
                },
            )
            .unwrap();
        assert_eq!(scene.media_path, video.to_string_lossy());
        assert_eq!(scene.media_type, MediaType::Video);
    }

    #[test]
    fn test_delete_featured_scene_promotes_first() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 3);
        fx.store.set_featured_scene(&project_id, &scenes[1].id, true).unwrap();

        fx.store.delete_scene(&project_id, &scenes[1].id).unwrap();

        let project = fx.store.load(&project_id).unwrap();
        assert_eq!(project.scenes.len(), 2);
        assert!(project.scenes[0].is_featured);
        assert_eq!(project.scenes.iter().filter(|s| s.is_featured).count(), 1);
        assert!(!Path::new(&scenes[1].media_path).exists());
    }

    #[test]
    fn test_delete_drops_markers_and_links_to_scene() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 2);
        let (hall, kitchen) = (scenes[0].id.as_str(), scenes[1].id.as_str());

        let link = |target: &str| {
            HotspotDraft::new(
                HotspotKind::Scene {
                    target_scene_id: target.to_string(),
                    transition: None,
                },
                SpherePosition::new(10.0, 0.0),
            )
        };
        fx.store.add_hotspot(&project_id, hall, link(kitchen)).unwrap();
        let info = HotspotDraft::new(
            HotspotKind::Info {
                title: "Stove".into(),
                content: String::new(),
                image_url: None,
            },
            SpherePosition::new(0.0, 0.0),
        );
        fx.store.add_hotspot(&project_id, hall, info).unwrap();
        fx.store.add_hotspot(&project_id, kitchen, link(hall)).unwrap();
        fx.store.add_map_marker(&project_id, hall, MapPoint { x: 0.1, y: 0.1 }, None).unwrap();
        fx.store.add_map_marker(&project_id, kitchen, MapPoint { x: 0.9, y: 0.9 }, None).unwrap();

        fx.store.delete_scene(&project_id, kitchen).unwrap();

        let project = fx.store.load(&project_id).unwrap();
        let remaining = &project.scenes[0];
        assert_eq!(remaining.hotspots.len(), 1);
        assert_eq!(remaining.hotspots[0].kind.label(), "info");
        let markers = project.map_config.unwrap().markers;
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].scene_id, hall);
    }

    #[test]
    fn test_staged_copy_removed_unless_kept() {
        let fx = Fixture::new();
        let project_dir = fx.dir.path().join("projects").join("prj_staged");
        let source = fx.upload("pano.jpg", b"jpeg bytes");

        let dropped = copy_into(&project_dir, SCENES_DIR, "scene", &source).unwrap();
        let dropped_path = dropped.path().to_path_buf();
        assert!(dropped_path.exists());
        drop(dropped);
        assert!(!dropped_path.exists());

        let kept = copy_into(&project_dir, SCENES_DIR, "scene", &source).unwrap();
        let kept_path = kept.path().to_path_buf();
        kept.keep();
        assert_eq!(fs::read(&kept_path).unwrap(), b"jpeg bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_save_removes_copied_media() {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        let (project_id, _) = project_with_scenes(&fx, 1);
        let project_dir = fx.store.project_path(&project_id);
        let scenes_dir = project_dir.join(SCENES_DIR);
        let before = fs::read_dir(&scenes_dir).unwrap().count();

        // A read-only project folder makes the project.json write fail
        fs::set_permissions(&project_dir, fs::Permissions::from_mode(0o555)).unwrap();
        let writable = fs::write(project_dir.join("write_check"), b"").is_ok();
        let result = fx
            .store
            .add_scene(&project_id, NewScene::upload("Attic", fx.upload("attic.jpg", b"a")));
        fs::set_permissions(&project_dir, fs::Permissions::from_mode(0o755)).unwrap();
        if writable {
            // Permissions are not enforced for this user
            return;
        }

        assert!(result.is_err());
        assert_eq!(fs::read_dir(&scenes_dir).unwrap().count(), before);
        assert_eq!(fx.store.load(&project_id).unwrap().scenes.len(), 1);
    }

    #[test]
    fn test_delete_keeps_external_media() {
        let fx = Fixture::new();
        let project = fx.store.create_project("Tour", "", None).unwrap();
        let external = fx.upload("keep.jpg", b"x");
        let scene = fx
            .store
            .add_scene(
                &project.id,
                NewScene {
                    name: "Ext".into(),
                    source: external.clone(),
                    copy_into_project: false,
                },
            )
            .unwrap();
        fx.store.delete_scene(&project.id, &scene.id).unwrap();
        assert!(external.exists());
    }

    #[test]
    fn test_delete_tolerates_missing_media() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 2);
        fs::remove_file(&scenes[0].media_path).unwrap();
        fx.store.delete_scene(&project_id, &scenes[0].id).unwrap();
        assert_eq!(fx.store.load(&project_id).unwrap().scenes.len(), 1);
    }

    #[test]
    fn test_featured_toggles_keep_single_flag() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 4);
        for idx in [2, 0, 3, 3, 1] {
            fx.store.set_featured_scene(&project_id, &scenes[idx].id, true).unwrap();
            let project = fx.store.load(&project_id).unwrap();
            assert_eq!(project.scenes.iter().filter(|s| s.is_featured).count(), 1);
        }
        fx.store.set_featured_scene(&project_id, &scenes[1].id, false).unwrap();
        let project = fx.store.load(&project_id).unwrap();
        assert!(project.scenes.iter().all(|s| !s.is_featured));
    }

    #[test]
    fn test_unknown_scene_leaves_document_untouched() {
        let fx = Fixture::new();
        let (project_id, _) = project_with_scenes(&fx, 1);
        let before = fx.project_json(&project_id);

        let err = fx.store.rename_scene(&project_id, "scene_missing", "x").unwrap_err();
        assert!(matches!(err, StoreError::SceneNotFound(_)));
        assert_eq!(fx.project_json(&project_id), before);
    }

    #[test]
    fn test_scene_field_updates() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 1);
        let id = &scenes[0].id;

        fx.store.rename_scene(&project_id, id, "Kitchen").unwrap();
        fx.store.set_scene_coordinates(&project_id, id, Some([13.4, 52.5])).unwrap();
        fx.store.set_scene_bearing(&project_id, id, Some(-90.0)).unwrap();
        fx.store.set_scene_visibility(&project_id, id, false).unwrap();
        fx.store.set_scene_comment(&project_id, id, Some("  ".into())).unwrap();
        fx.store
            .set_sphere_correction(
                &project_id,
                id,
                Some(SphereCorrection { pan: Some(5.0), tilt: None, roll: Some(-1.0) }),
            )
            .unwrap();

        let scene = fx.store.load(&project_id).unwrap().scenes.remove(0);
        assert_eq!(scene.name, "Kitchen");
        assert_eq!(scene.coordinates, Some([13.4, 52.5]));
        assert_eq!(scene.bearing, Some(270.0));
        assert!(!scene.is_visible);
        assert_eq!(scene.comment, None);
        assert_eq!(scene.sphere_correction.unwrap().roll, Some(-1.0));
    }

    #[test]
    fn test_replace_media_drops_old_files() {
        let fx = Fixture::new();
        let (project_id, scenes) = project_with_scenes(&fx, 1);
        let id = &scenes[0].id;
        let thumb_source = fx.upload("thumb.jpg", b"t");
        let with_thumb = fx.store.set_scene_thumbnail(&project_id, id, &thumb_source).unwrap();
        let old_thumb = with_thumb.thumbnail.clone().unwrap();
        assert!(Path::new(&old_thumb).exists());

        let replacement = fx.upload("new.mp4", b"new video");
        let scene = fx.store.replace_scene_media(&project_id, id, &replacement, true).unwrap();

        assert_eq!(scene.media_type, MediaType::Video);
        assert!(scene.thumbnail.is_none());
        assert!(!Path::new(&old_thumb).exists());
        assert!(!Path::new(&scenes[0].media_path).exists());
        assert_eq!(fs::read(&scene.media_path).unwrap(), b"new video");
    }
}
