// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Standalone web bundle export.
//!
//! Builds a static site in a temporary directory (viewer template, copied
//! media under `assets/`, and a rewritten `data/project.json` whose paths
//! are all relative) and zips it. The temporary directory is removed
//! whether or not the export succeeds.

use super::archive;
use super::progress::{Progress, ProgressReporter};
use crate::error::{IoContext, Result};
use crate::io::serialization;
use crate::models::{HotspotKind, MediaType, Project};
use crate::store::ProjectStore;
use crate::util::fs as fsutil;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

struct TemplateFile {
    path: &'static str,
    contents: &'static str,
    executable: bool,
}

const TEMPLATE_FILES: &[TemplateFile] = &[
    TemplateFile {
        path: "index.html",
        contents: include_str!("../../templates/web/index.html"),
        executable: false,
    },
    TemplateFile {
        path: "css/styles.css",
        contents: include_str!("../../templates/web/css/styles.css"),
        executable: false,
    },
    TemplateFile {
        path: "js/app.js",
        contents: include_str!("../../templates/web/js/app.js"),
        executable: false,
    },
    TemplateFile {
        path: "README.md",
        contents: include_str!("../../templates/web/README.md"),
        executable: false,
    },
    TemplateFile {
        path: "Start Project.bat",
        contents: include_str!("../../templates/web/launchers/start_project.bat"),
        executable: false,
    },
    TemplateFile {
        path: "linux_start.sh",
        contents: include_str!("../../templates/web/launchers/linux_start.sh"),
        executable: true,
    },
];

const ASSETS_DIR: &str = "assets";
const RELATIVE_ASSETS: &str = "./assets";

/// Outcome of a successful web export.
#[derive(Debug, Clone)]
pub struct WebExportSummary {
    pub zip_path: PathBuf,
    pub scene_count: usize,
    pub bytes: u64,
}

/// Suggested file name for a project's web bundle.
pub fn default_file_name(project_name: &str) -> String {
    format!("{}.zip", fsutil::sanitize_file_stem(project_name))
}

/// Export a project as a zipped static web bundle at `dest_zip`.
pub fn export_web(
    store: &ProjectStore,
    project_id: &str,
    dest_zip: &Path,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<WebExportSummary> {
    export_web_in(store, project_id, dest_zip, &std::env::temp_dir(), on_progress)
}

/// Like [`export_web`], staging the bundle under `scratch_root`.
pub fn export_web_in(
    store: &ProjectStore,
    project_id: &str,
    dest_zip: &Path,
    scratch_root: &Path,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<WebExportSummary> {
    let project = store.load(project_id)?;
    let mut progress = ProgressReporter::new(on_progress);
    progress.report(5.0, "Preparing export...");

    let work = tempfile::Builder::new()
        .prefix("web-export-")
        .tempdir_in(scratch_root)
        .at(scratch_root)?;

    let result = build_bundle(&project, work.path(), dest_zip, &mut progress);

    progress.report(98.0, "Cleaning up...");
    let work_path = work.path().to_path_buf();
    if let Err(e) = work.close() {
        log::warn!("Could not remove export directory {}: {}", work_path.display(), e);
    }

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            if dest_zip.exists() {
                fsutil::remove_file_best_effort(dest_zip, "partial export archive");
            }
            log::error!("Web export of {} failed: {}", project_id, e);
            return Err(e);
        }
    };

    progress.report(100.0, "Complete!");
    log::info!("Exported {} as web bundle to {}", project.name, dest_zip.display());
    Ok(WebExportSummary {
        zip_path: dest_zip.to_path_buf(),
        scene_count: project.scenes.len(),
        bytes,
    })
}

fn build_bundle(
    project: &Project,
    export_dir: &Path,
    dest_zip: &Path,
    progress: &mut ProgressReporter<'_>,
) -> Result<u64> {
    write_template_files(export_dir)?;
    progress.report(10.0, "Copying template files...");

    let transformed = transform_project(project, export_dir, progress)?;

    progress.report(75.0, "Generating project.json...");
    let data_dir = export_dir.join("data");
    fsutil::ensure_dir(&data_dir)?;
    serialization::write_json_atomic(&transformed, &data_dir.join("project.json"))?;

    progress.report(80.0, "Creating ZIP file...");
    let bytes = archive::zip_directory(export_dir, dest_zip, &mut |done, total| {
        progress.report_fraction(80.0, 95.0, done, total, "Creating ZIP file...");
    })?;
    progress.report(95.0, "ZIP file created");
    Ok(bytes)
}

fn write_template_files(export_dir: &Path) -> Result<()> {
    for file in TEMPLATE_FILES {
        let dest = export_dir.join(file.path);
        if let Some(parent) = dest.parent() {
            fsutil::ensure_dir(parent)?;
        }
        fs::write(&dest, file.contents).at(&dest)?;
        if file.executable {
            make_executable(&dest)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).at(path)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// True for references a browser can load as-is.
fn is_web_reference(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    ["http://", "https://", "data:", "./", "../"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Copy `source` to `assets/<relative>` and return the `./assets/...` path.
fn copy_asset(source: &Path, export_dir: &Path, relative: &str) -> Result<String> {
    let dest = export_dir.join(ASSETS_DIR).join(relative);
    if let Some(parent) = dest.parent() {
        fsutil::ensure_dir(parent)?;
    }
    fs::copy(source, &dest).at(source)?;
    Ok(format!("{}/{}", RELATIVE_ASSETS, relative))
}

/// Copy media and rewrite every stored path to a `./assets/...` reference.
fn transform_project(
    project: &Project,
    export_dir: &Path,
    progress: &mut ProgressReporter<'_>,
) -> Result<Project> {
    let mut out = project.clone();
    let total = out.scenes.len() as u64;
    fsutil::ensure_dir(&export_dir.join(ASSETS_DIR).join("thumbnails"))?;

    // Scene media, 20-50%
    let mut copied_media: Vec<Option<PathBuf>> = Vec::with_capacity(out.scenes.len());
    for (index, scene) in out.scenes.iter_mut().enumerate() {
        let n = index + 1;
        progress.report_fraction(20.0, 50.0, n as u64, total, format!("Copying scene images {}/{}...", n, total));

        let source = PathBuf::from(&scene.media_path);
        let relative = format!("scene-{}{}", n, fsutil::dotted_extension(&source));
        if source.is_file() {
            scene.media_path = copy_asset(&source, export_dir, &relative)?;
            copied_media.push(Some(export_dir.join(ASSETS_DIR).join(&relative)));
        } else {
            log::warn!("[Export] Scene media not found: {}", source.display());
            scene.media_path = format!("{}/{}", RELATIVE_ASSETS, relative);
            copied_media.push(None);
        }
    }

    // Thumbnails, 50-70%
    for (index, scene) in out.scenes.iter_mut().enumerate() {
        let n = index + 1;
        progress.report_fraction(50.0, 70.0, n as u64, total, format!("Copying thumbnails {}/{}...", n, total));

        let own_thumb = scene
            .thumbnail
            .as_deref()
            .map(PathBuf::from)
            .filter(|p| p.is_file());
        let fallback = match scene.media_type {
            MediaType::Image => copied_media[index].clone(),
            MediaType::Video => None,
        };
        scene.thumbnail = match own_thumb.or(fallback) {
            Some(source) => {
                let relative = format!("thumbnails/scene-{}-thumb{}", n, fsutil::dotted_extension(&source));
                match copy_asset(&source, export_dir, &relative) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("Failed to copy thumbnail for scene {}: {}", n, e);
                        None
                    }
                }
            }
            None => None,
        };

        for (k, hotspot) in scene.hotspots.iter_mut().enumerate() {
            if let HotspotKind::Info { image_url, .. } = &mut hotspot.kind {
                *image_url = rewrite_info_image(image_url.take(), export_dir, n, k + 1)?;
            }
        }
    }

    if let Some(config) = out.map_config.as_mut() {
        config.image_path = match config.image_path.take() {
            Some(path) if Path::new(&path).is_file() => {
                let source = PathBuf::from(&path);
                Some(copy_asset(&source, export_dir, &format!("map{}", fsutil::dotted_extension(&source)))?)
            }
            Some(path) => {
                log::warn!("[Export] Map image not found: {}", path);
                None
            }
            None => None,
        };
    }

    out.updated_at = Utc::now();
    Ok(out)
}

fn rewrite_info_image(
    image_url: Option<String>,
    export_dir: &Path,
    scene_n: usize,
    hotspot_n: usize,
) -> Result<Option<String>> {
    let Some(url) = image_url else {
        return Ok(None);
    };
    if is_web_reference(&url) {
        return Ok(Some(url));
    }
    let source = PathBuf::from(&url);
    if !source.is_file() {
        log::warn!("[Export] Info hotspot image not found: {}", url);
        return Ok(None);
    }
    let relative = format!(
        "info/scene-{}-hotspot-{}{}",
        scene_n,
        hotspot_n,
        fsutil::dotted_extension(&source)
    );
    copy_asset(&source, export_dir, &relative).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{HotspotDraft, MapPoint, SpherePosition};
    use crate::store::NewScene;
    use std::io::Read;

    struct Setup {
        dir: tempfile::TempDir,
        store: ProjectStore,
        project_id: String,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::for_workspace(&dir.path().join("ws"));
        let project = store.create_project("Old Mill", "Riverside", Some("tourism")).unwrap();

        let uploads = dir.path().join("uploads");
        fs::create_dir_all(&uploads).unwrap();
        for (name, file) in [("Wheel", "wheel.jpg"), ("Loft", "loft.png"), ("Walk", "walk.mp4")] {
            let path = uploads.join(file);
            fs::write(&path, file.as_bytes()).unwrap();
            store.add_scene(&project.id, NewScene::upload(name, &path)).unwrap();
        }

        let scenes = store.load(&project.id).unwrap().scenes;
        let thumb = uploads.join("wheel_thumb.jpg");
        fs::write(&thumb, b"thumb").unwrap();
        store.set_scene_thumbnail(&project.id, &scenes[0].id, &thumb).unwrap();

        let info_image = uploads.join("plaque.jpg");
        fs::write(&info_image, b"plaque").unwrap();
        store
            .add_hotspot(
                &project.id,
                &scenes[0].id,
                HotspotDraft::new(
                    HotspotKind::Info {
                        title: "Plaque".into(),
                        content: "Built 1820".into(),
                        image_url: Some(info_image.to_string_lossy().into_owned()),
                    },
                    SpherePosition::new(10.0, 0.0),
                ),
            )
            .unwrap();

        let plan = uploads.join("plan.png");
        fs::write(&plan, b"plan").unwrap();
        store.upload_map_image(&project.id, &plan).unwrap();
        store
            .add_map_marker(&project.id, &scenes[1].id, MapPoint { x: 0.3, y: 0.3 }, None)
            .unwrap();

        Setup {
            dir,
            store,
            project_id: project.id,
        }
    }

    fn read_entry(zip_path: &Path, name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(fs::File::open(zip_path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_bundle_has_relative_paths_only() {
        let s = setup();
        let dest = s.dir.path().join("mill.zip");
        let mut events = Vec::new();
        let summary = export_web(&s.store, &s.project_id, &dest, &mut |p| events.push(p)).unwrap();
        assert_eq!(summary.scene_count, 3);

        let data: Project = serde_json::from_slice(&read_entry(&dest, "data/project.json")).unwrap();
        for scene in &data.scenes {
            assert!(scene.media_path.starts_with("./assets/"), "{}", scene.media_path);
            if let Some(thumb) = &scene.thumbnail {
                assert!(thumb.starts_with("./assets/thumbnails/"), "{}", thumb);
            }
        }
        assert_eq!(data.scenes[0].media_path, "./assets/scene-1.jpg");
        assert_eq!(data.scenes[0].thumbnail.as_deref(), Some("./assets/thumbnails/scene-1-thumb.jpg"));
        // Image media doubles as a thumbnail, video does not
        assert_eq!(data.scenes[1].thumbnail.as_deref(), Some("./assets/thumbnails/scene-2-thumb.png"));
        assert_eq!(data.scenes[2].thumbnail, None);

        match &data.scenes[0].hotspots[0].kind {
            HotspotKind::Info { image_url, .. } => {
                assert_eq!(image_url.as_deref(), Some("./assets/info/scene-1-hotspot-1.jpg"))
            }
            other => panic!("unexpected hotspot {:?}", other),
        }
        let map = data.map_config.unwrap();
        assert_eq!(map.image_path.as_deref(), Some("./assets/map.png"));
        assert_eq!(map.markers.len(), 1);

        assert_eq!(read_entry(&dest, "assets/scene-1.jpg"), b"wheel.jpg");
        assert_eq!(read_entry(&dest, "assets/thumbnails/scene-1-thumb.jpg"), b"thumb");
        assert!(!read_entry(&dest, "index.html").is_empty());
        assert!(!read_entry(&dest, "linux_start.sh").is_empty());
        assert!(!read_entry(&dest, "Start Project.bat").is_empty());
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let s = setup();
        let dest = s.dir.path().join("mill.zip");
        let mut events = Vec::new();
        export_web(&s.store, &s.project_id, &dest, &mut |p| events.push(p)).unwrap();

        assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(events.first().unwrap().percent, 5);
        let last = events.last().unwrap();
        assert!(last.is_complete());
        assert_eq!(last.message, "Complete!");
        assert!(events.iter().any(|p| p.message.starts_with("Copying thumbnails")));
    }

    #[test]
    fn test_missing_media_is_skipped() {
        let s = setup();
        let project = s.store.load(&s.project_id).unwrap();
        fs::remove_file(&project.scenes[1].media_path).unwrap();

        let dest = s.dir.path().join("mill.zip");
        export_web(&s.store, &s.project_id, &dest, &mut |_| {}).unwrap();
        let data: Project = serde_json::from_slice(&read_entry(&dest, "data/project.json")).unwrap();
        assert_eq!(data.scenes[1].media_path, "./assets/scene-2.png");
        assert_eq!(data.scenes[1].thumbnail, None);
    }

    #[test]
    fn test_failed_export_cleans_up() {
        let s = setup();
        let scratch = s.dir.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let dest = s.dir.path().join("no_such_dir").join("mill.zip");

        let err = export_web_in(&s.store, &s.project_id, &dest, &scratch, &mut |_| {}).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_successful_export_cleans_up() {
        let s = setup();
        let scratch = s.dir.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let dest = s.dir.path().join("mill.zip");

        export_web_in(&s.store, &s.project_id, &dest, &scratch, &mut |_| {}).unwrap();
        assert!(dest.is_file());
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_project() {
        let s = setup();
        let dest = s.dir.path().join("x.zip");
        let err = export_web(&s.store, "prj_missing", &dest, &mut |_| {}).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_web_references_are_kept() {
        assert!(is_web_reference("https://example.com/a.jpg"));
        assert!(is_web_reference("./assets/a.jpg"));
        assert!(!is_web_reference("/home/me/a.jpg"));
        assert!(!is_web_reference("C:\\pics\\a.jpg"));
    }
}
