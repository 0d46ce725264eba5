// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app keeps a working copy of the open project for the widgets to
//! edit. Every committed edit goes through the `ProjectStore` and the
//! working copy is then reloaded from disk. Exports, imports and image
//! decoding run on background threads and report back over channels.

use crate::ui::{canvas, gallery, map, properties, scenes, settings as settings_ui, toolbar};
use panotour::export::{backup, web, Progress};
use panotour::io::media::{self, LoadedImage};
use panotour::models::{
    HotspotDraft, HotspotKind, MarkerUpdate, MediaType, Project, ProjectEntry, ProjectUpdate, SpherePosition,
};
use panotour::settings::{AppSettings, Category};
use panotour::store::NewScene;
use panotour::util::fs::{self as fsutil, FileInfo};
use panotour::ProjectStore;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// Current hotspot tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    SceneLink,
    Info,
    Url,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "avi"];

/// A texture decoded on a background thread, keyed by source path.
struct TextureSlot {
    name: &'static str,
    key: Option<String>,
    texture: Option<egui::TextureHandle>,
    size: Option<(u32, u32)>,
    loader: Option<Receiver<Result<LoadedImage, String>>>,
}

impl TextureSlot {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            key: None,
            texture: None,
            size: None,
            loader: None,
        }
    }

    /// Start loading `path` unless it is already loaded or loading.
    fn request(&mut self, path: &str) {
        if self.key.as_deref() == Some(path) {
            return;
        }
        self.key = Some(path.to_string());
        self.texture = None;
        self.size = None;

        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        let path = PathBuf::from(path);
        std::thread::spawn(move || {
            let result = media::load_image(&path, media::PREVIEW_MAX_EDGE).map_err(|e| format!("{:#}", e));
            if let Ok(img) = &result {
                log::info!("Loaded preview: {} ({}x{})", path.display(), img.width, img.height);
            }
            // The slot may have moved on to another image
            let _ = sender.send(result);
        });
    }

    fn clear(&mut self) {
        self.key = None;
        self.texture = None;
        self.size = None;
        self.loader = None;
    }

    fn is_loading(&self) -> bool {
        self.loader.is_some()
    }

    fn poll(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.loader else {
            return;
        };
        match receiver.try_recv() {
            Ok(Ok(loaded)) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                self.texture = Some(ctx.load_texture(self.name, color_image, egui::TextureOptions::LINEAR));
                self.size = Some((loaded.width, loaded.height));
                self.loader = None;
            }
            Ok(Err(e)) => {
                log::error!("Failed to load {}: {}", self.name, e);
                self.loader = None;
            }
            Err(TryRecvError::Empty) => ctx.request_repaint(),
            Err(TryRecvError::Disconnected) => self.loader = None,
        }
    }
}

enum JobEvent {
    Progress(Progress),
    Finished(Result<String, String>),
}

/// A long-running export or import.
struct Job {
    title: String,
    progress: Progress,
    events: Receiver<JobEvent>,
}

struct NewProjectForm {
    name: String,
    description: String,
    category: Option<String>,
}

struct PendingDelete {
    project_id: String,
    name: String,
    bytes: u64,
}

/// Main application state.
pub struct TourApp {
    settings: AppSettings,
    store: Arc<ProjectStore>,
    projects: Vec<ProjectEntry>,
    category_filter: Option<String>,

    /// Working copy of the open project
    project: Option<Project>,
    selected_scene: Option<String>,
    selected_hotspot: Option<String>,
    selected_marker: Option<String>,
    current_tool: Tool,
    show_map: bool,
    media_info: Option<(String, FileInfo)>,

    preview: TextureSlot,
    map_image: TextureSlot,
    job: Option<Job>,

    show_settings: bool,
    new_category: String,
    new_project: Option<NewProjectForm>,
    pending_delete: Option<PendingDelete>,

    /// Last result or error, shown in the status bar
    status: Option<String>,
}

impl TourApp {
    pub fn new(settings: AppSettings) -> Self {
        let store = Arc::new(ProjectStore::for_workspace(&settings.workspace_path));
        let mut app = Self {
            settings,
            store,
            projects: Vec::new(),
            category_filter: None,
            project: None,
            selected_scene: None,
            selected_hotspot: None,
            selected_marker: None,
            current_tool: Tool::Select,
            show_map: false,
            media_info: None,
            preview: TextureSlot::new("scene_preview"),
            map_image: TextureSlot::new("map_image"),
            job: None,
            show_settings: false,
            new_category: String::new(),
            new_project: None,
            pending_delete: None,
            status: None,
        };
        app.refresh_projects();
        app
    }

    fn report_error(&mut self, what: &str, err: impl Display) {
        log::error!("{} failed: {}", what, err);
        self.status = Some(format!("{} failed: {}", what, err));
    }

    fn refresh_projects(&mut self) {
        match self.store.list_projects() {
            Ok(projects) => self.projects = projects,
            Err(e) => self.report_error("Listing projects", e),
        }
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            self.report_error("Saving settings", e);
        }
    }

    fn categories(&self) -> Vec<Category> {
        self.settings.categories()
    }

    fn project_name(&self, project_id: &str) -> String {
        self.projects
            .iter()
            .find(|e| e.project.id == project_id)
            .map(|e| e.project.name.clone())
            .unwrap_or_else(|| project_id.to_string())
    }

    fn open_project(&mut self, project_id: &str) {
        match self.store.load(project_id) {
            Ok(project) => {
                log::info!("Opened project {} ({} scenes)", project.name, project.scenes.len());
                self.selected_scene = project.entry_scene().map(|s| s.id.clone());
                self.project = Some(project);
                self.selected_hotspot = None;
                self.selected_marker = None;
                self.current_tool = Tool::Select;
                self.preview.clear();
                self.map_image.clear();
            }
            Err(e) => self.report_error("Opening project", e),
        }
    }

    fn close_project(&mut self) {
        self.project = None;
        self.selected_scene = None;
        self.selected_hotspot = None;
        self.selected_marker = None;
        self.show_map = false;
        self.media_info = None;
        self.preview.clear();
        self.map_image.clear();
        self.refresh_projects();
    }

    /// Re-read the open project and drop selections that no longer exist.
    fn reload_project(&mut self) {
        let Some(id) = self.project.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        let project = match self.store.load(&id) {
            Ok(project) => project,
            Err(e) => {
                self.report_error("Reloading project", e);
                self.close_project();
                return;
            }
        };

        let scene = self
            .selected_scene
            .as_deref()
            .and_then(|sid| project.scene(sid).ok())
            .or_else(|| project.entry_scene());
        self.selected_scene = scene.map(|s| s.id.clone());
        if let (Some(scene), Some(hid)) = (scene, self.selected_hotspot.as_deref()) {
            if scene.hotspot(hid).is_err() {
                self.selected_hotspot = None;
            }
        } else {
            self.selected_hotspot = None;
        }
        let markers = project.map_config.as_ref().map(|c| c.markers.as_slice()).unwrap_or_default();
        if let Some(mid) = self.selected_marker.as_deref() {
            if !markers.iter().any(|m| m.id == mid) {
                self.selected_marker = None;
            }
        }
        self.project = Some(project);
    }

    /// Run a store operation against the open project and reload it.
    fn mutate<T>(&mut self, what: &str, op: impl FnOnce(&ProjectStore, &str) -> panotour::Result<T>) -> Option<T> {
        let id = self.project.as_ref()?.id.clone();
        let result = op(&self.store, &id);
        let out = match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report_error(what, e);
                None
            }
        };
        self.reload_project();
        out
    }

    fn start_job(
        &mut self,
        ctx: &egui::Context,
        title: impl Into<String>,
        work: impl FnOnce(&ProjectStore, &mut dyn FnMut(Progress)) -> panotour::Result<String> + Send + 'static,
    ) {
        if self.job.is_some() {
            self.status = Some("Another operation is still running".to_string());
            return;
        }
        let title = title.into();
        let (sender, receiver) = channel();
        let store = Arc::clone(&self.store);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let progress_sender = sender.clone();
            let repaint = ctx.clone();
            let mut on_progress = move |progress: Progress| {
                let _ = progress_sender.send(JobEvent::Progress(progress));
                repaint.request_repaint();
            };
            let result = work(&*store, &mut on_progress).map_err(|e| e.to_string());
            let _ = sender.send(JobEvent::Finished(result));
            ctx.request_repaint();
        });

        log::info!("Started: {}", title);
        self.job = Some(Job {
            title,
            progress: Progress {
                percent: 0,
                message: "Starting...".to_string(),
            },
            events: receiver,
        });
    }

    fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let finished = loop {
            match job.events.try_recv() {
                Ok(JobEvent::Progress(progress)) => job.progress = progress,
                Ok(JobEvent::Finished(result)) => break Some(result),
                Err(TryRecvError::Empty) => break None,
                Err(TryRecvError::Disconnected) => break Some(Err("worker stopped unexpectedly".to_string())),
            }
        };

        if let Some(result) = finished {
            let title = job.title.clone();
            self.job = None;
            match result {
                Ok(message) => {
                    log::info!("{}", message);
                    self.status = Some(message);
                }
                Err(e) => self.report_error(&title, e),
            }
            self.refresh_projects();
        }
    }

    fn export_web(&mut self, ctx: &egui::Context, project_id: String) {
        let name = self.project_name(&project_id);
        let Some(dest) = rfd::FileDialog::new()
            .add_filter("ZIP archive", &["zip"])
            .set_file_name(web::default_file_name(&name))
            .save_file()
        else {
            return;
        };
        self.start_job(ctx, format!("Exporting {}", name), move |store, on_progress| {
            web::export_web(store, &project_id, &dest, on_progress).map(|summary| {
                format!(
                    "Web bundle with {} scenes saved to {}",
                    summary.scene_count,
                    summary.zip_path.display()
                )
            })
        });
    }

    fn export_backup(&mut self, ctx: &egui::Context, project_id: String) {
        let name = self.project_name(&project_id);
        let Some(dest) = rfd::FileDialog::new()
            .add_filter("ZIP archive", &["zip"])
            .set_file_name(backup::default_file_name(&name))
            .save_file()
        else {
            return;
        };
        self.start_job(ctx, format!("Backing up {}", name), move |store, on_progress| {
            backup::export_backup(store, &project_id, &dest, on_progress).map(|bytes| {
                format!(
                    "Backup saved to {} ({:.1} MB)",
                    dest.display(),
                    bytes as f64 / (1024.0 * 1024.0)
                )
            })
        });
    }

    fn import_backup(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new().add_filter("ZIP archive", &["zip"]).pick_file() else {
            return;
        };
        self.start_job(ctx, "Importing backup", move |store, on_progress| {
            on_progress(Progress {
                percent: 10,
                message: "Extracting...".to_string(),
            });
            let project = backup::import_backup(store, &path)?;
            on_progress(Progress {
                percent: 100,
                message: "Completed".to_string(),
            });
            Ok(format!("Imported {}", project.name))
        });
    }

    fn switch_workspace(&mut self, path: &Path) {
        match self.settings.switch_workspace(path) {
            Ok(info) => {
                self.store = Arc::new(ProjectStore::for_workspace(&info.path));
                self.persist_settings();
                self.close_project();
                self.status = Some(format!(
                    "Workspace {} ({} projects)",
                    info.path.display(),
                    info.project_count
                ));
            }
            Err(e) => self.report_error("Switching workspace", e),
        }
    }

    fn add_scenes(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Panoramas and 360° videos", &[IMAGE_EXTENSIONS, VIDEO_EXTENSIONS].concat())
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("Videos", VIDEO_EXTENSIONS)
            .pick_files()
        else {
            return;
        };

        let mut last = None;
        for path in paths {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Scene".to_string());
            if let Some(scene) = self.mutate("Adding scene", |store, id| store.add_scene(id, NewScene::upload(name, &path))) {
                last = Some(scene.id);
            }
        }
        if let Some(id) = last {
            self.selected_scene = Some(id);
            self.selected_hotspot = None;
        }
    }

    fn place_hotspot(&mut self, position: SpherePosition) {
        let Some(scene_id) = self.selected_scene.clone() else {
            return;
        };
        let mut tooltip = None;
        let kind = match self.current_tool {
            Tool::Select => return,
            Tool::SceneLink => {
                let target = self
                    .project
                    .as_ref()
                    .and_then(|p| p.scenes.iter().find(|s| s.id != scene_id))
                    .map(|s| (s.id.clone(), s.name.clone()));
                let Some((target_scene_id, target_name)) = target else {
                    self.status = Some("Add another scene before linking scenes".to_string());
                    return;
                };
                tooltip = Some(format!("Go to {}", target_name));
                HotspotKind::Scene {
                    target_scene_id,
                    transition: None,
                }
            }
            Tool::Info => HotspotKind::Info {
                title: "Information".to_string(),
                content: String::new(),
                image_url: None,
            },
            Tool::Url => HotspotKind::Url {
                url: "https://".to_string(),
                open_in_new_tab: Some(true),
            },
        };

        let mut draft = HotspotDraft::new(kind, position);
        if let Some(tooltip) = tooltip {
            draft = draft.with_tooltip(tooltip);
        }
        if let Some(hotspot) = self.mutate("Adding hotspot", |store, id| store.add_hotspot(id, &scene_id, draft)) {
            log::info!(
                "Placed {} hotspot at yaw {:.1}, pitch {:.1}",
                hotspot.kind.label(),
                hotspot.position.yaw,
                hotspot.position.pitch
            );
            self.selected_hotspot = Some(hotspot.id);
        }
    }

    fn handle_properties(&mut self, action: properties::PropertiesAction) {
        use properties::PropertiesAction as A;
        let scene_id = self.selected_scene.clone().unwrap_or_default();
        let scene_id = scene_id.as_str();

        match action {
            A::None => {}
            A::RenameProject(name) => {
                self.mutate("Renaming project", |s, id| s.rename_project(id, &name));
            }
            A::SetDescription(description) => {
                self.mutate("Updating description", |s, id| s.update_project_description(id, &description));
            }
            A::SetCategory(category) => {
                let update = ProjectUpdate {
                    category: Some(category),
                    ..Default::default()
                };
                self.mutate("Updating category", |s, id| s.update_project(id, update));
            }
            A::SetViewerSettings(settings) => {
                self.mutate("Updating viewer settings", |s, id| s.update_viewer_settings(id, settings));
            }
            A::RenameScene(name) => {
                self.mutate("Renaming scene", |s, id| s.rename_scene(id, scene_id, &name));
            }
            A::SetSceneVisible(visible) => {
                self.mutate("Updating scene", |s, id| s.set_scene_visibility(id, scene_id, visible));
            }
            A::SetFeatured(featured) => {
                self.mutate("Updating featured scene", |s, id| s.set_featured_scene(id, scene_id, featured));
            }
            A::SetComment(comment) => {
                self.mutate("Saving comment", |s, id| s.set_scene_comment(id, scene_id, comment));
            }
            A::SetBearing(bearing) => {
                self.mutate("Saving bearing", |s, id| s.set_scene_bearing(id, scene_id, bearing));
            }
            A::SetCoordinates(coordinates) => {
                self.mutate("Saving coordinates", |s, id| s.set_scene_coordinates(id, scene_id, coordinates));
            }
            A::SetSphereCorrection(correction) => {
                self.mutate("Saving sphere correction", |s, id| s.set_sphere_correction(id, scene_id, correction));
            }
            A::PickThumbnail => {
                if let Some(path) = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS).pick_file() {
                    self.mutate("Setting thumbnail", |s, id| s.set_scene_thumbnail(id, scene_id, &path));
                }
            }
            A::ReplaceMedia => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Panoramas and 360° videos", &[IMAGE_EXTENSIONS, VIDEO_EXTENSIONS].concat())
                    .pick_file()
                {
                    self.mutate("Replacing media", |s, id| s.replace_scene_media(id, scene_id, &path, true));
                }
            }
            A::DeleteScene => {
                self.selected_hotspot = None;
                self.mutate("Deleting scene", |s, id| s.delete_scene(id, scene_id));
            }
            A::SelectHotspot(hotspot_id) => self.selected_hotspot = Some(hotspot_id),
            A::UpdateHotspot(hotspot_id, update) => {
                self.mutate("Updating hotspot", |s, id| s.update_hotspot(id, scene_id, &hotspot_id, update));
            }
            A::ToggleHotspot(hotspot_id) => {
                self.mutate("Toggling hotspot", |s, id| s.toggle_hotspot_visibility(id, scene_id, &hotspot_id));
            }
            A::DeleteHotspot(hotspot_id) => {
                self.mutate("Deleting hotspot", |s, id| s.delete_hotspot(id, scene_id, &hotspot_id));
            }
            A::DeleteAllHotspots => {
                self.mutate("Deleting hotspots", |s, id| s.delete_all_hotspots(id, scene_id));
            }
            A::SetAllHotspotsVisible(visible) => {
                self.mutate("Updating hotspots", |s, id| s.set_all_hotspots_visibility(id, scene_id, visible));
            }
        }
    }

    fn handle_map(&mut self, action: map::MapAction) {
        use map::MapAction as A;
        match action {
            A::None => {}
            A::UploadImage => {
                if let Some(path) = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS).pick_file() {
                    self.mutate("Uploading map", |s, id| s.upload_map_image(id, &path));
                    self.map_image.clear();
                }
            }
            A::Clear => {
                self.mutate("Clearing map", |s, id| s.clear_map(id));
                self.map_image.clear();
            }
            A::SetVisible(visible) => {
                self.mutate("Updating map", |s, id| s.set_map_visibility(id, visible));
            }
            A::AddMarker(scene_id, position) => {
                if let Some(marker) =
                    self.mutate("Placing marker", |s, id| s.add_map_marker(id, &scene_id, position, None))
                {
                    self.selected_marker = Some(marker.id);
                }
            }
            A::MoveMarker(marker_id, position) => {
                let update = MarkerUpdate {
                    position: Some(position),
                    ..Default::default()
                };
                self.mutate("Moving marker", |s, id| s.update_map_marker(id, &marker_id, update));
                self.selected_marker = None;
            }
            A::RelabelMarker(marker_id, label) => {
                let update = MarkerUpdate {
                    label: Some(label),
                    ..Default::default()
                };
                self.mutate("Renaming marker", |s, id| s.update_map_marker(id, &marker_id, update));
            }
            A::DeleteMarker(marker_id) => {
                self.mutate("Deleting marker", |s, id| s.delete_map_marker(id, &marker_id));
            }
            A::SelectMarker(marker_id) => self.selected_marker = marker_id,
        }
    }

    fn handle_gallery(&mut self, ctx: &egui::Context, action: gallery::GalleryAction) {
        use gallery::GalleryAction as A;
        match action {
            A::None => {}
            A::Open(id) => self.open_project(&id),
            A::NewProject => {
                self.new_project = Some(NewProjectForm {
                    name: String::new(),
                    description: String::new(),
                    category: None,
                })
            }
            A::ImportBackup => self.import_backup(ctx),
            A::ExportWeb(id) => self.export_web(ctx, id),
            A::ExportBackup(id) => self.export_backup(ctx, id),
            A::OpenFolder(id) => {
                if let Err(e) = fsutil::open_in_file_manager(&self.store.project_path(&id)) {
                    self.report_error("Opening folder", e);
                }
            }
            A::Delete(id) => {
                let bytes = fsutil::dir_size(&self.store.project_path(&id)).unwrap_or(0);
                self.pending_delete = Some(PendingDelete {
                    name: self.project_name(&id),
                    project_id: id,
                    bytes,
                });
            }
            A::SetViewMode(mode) => {
                self.settings.gallery_view_mode = mode;
                self.persist_settings();
            }
        }
    }

    fn handle_settings(&mut self, action: settings_ui::SettingsAction) {
        use settings_ui::SettingsAction as A;
        match action {
            A::None => {}
            A::PickWorkspace => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Select Workspace Directory")
                    .set_directory(&self.settings.workspace_path)
                    .pick_folder()
                {
                    self.switch_workspace(&path);
                }
            }
            A::SwitchWorkspace(path) => self.switch_workspace(&path),
            A::SetPhotoCompression(enabled) => {
                self.settings.photo_compression_enabled = enabled;
                self.persist_settings();
            }
            A::SetCompression(update) => {
                self.settings.set_compression(update);
                self.persist_settings();
            }
            A::AddCategory(label) => match self.settings.add_custom_category(&label) {
                Ok(category) => {
                    log::info!("Added category {}", category.id);
                    self.persist_settings();
                }
                Err(e) => self.report_error("Adding category", e),
            },
            A::RemoveCategory(category_id) => {
                match self.store.category_usage(&category_id) {
                    Ok(0) => {}
                    Ok(_) => match self.store.recategorize_projects(&category_id, "other") {
                        Ok(moved) => self.status = Some(format!("Moved {} projects to Other", moved)),
                        Err(e) => self.report_error("Recategorizing projects", e),
                    },
                    Err(e) => self.report_error("Counting category usage", e),
                }
                self.settings.remove_custom_category(&category_id);
                self.persist_settings();
                self.refresh_projects();
                self.reload_project();
            }
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        let categories = self.categories();

        if let Some(form) = self.new_project.as_mut() {
            let mut open = true;
            let mut create = false;
            egui::Window::new("New Project")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Name:");
                        ui.text_edit_singleline(&mut form.name);
                    });
                    ui.label("Description:");
                    ui.text_edit_multiline(&mut form.description);
                    egui::ComboBox::from_label("Category")
                        .selected_text(
                            form.category
                                .as_deref()
                                .and_then(|id| categories.iter().find(|c| c.id == id))
                                .map(|c| c.label.as_str())
                                .unwrap_or("None"),
                        )
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut form.category, None, "None");
                            for category in &categories {
                                ui.selectable_value(&mut form.category, Some(category.id.clone()), &category.label);
                            }
                        });
                    ui.add_space(8.0);
                    create = ui
                        .add_enabled(!form.name.trim().is_empty(), egui::Button::new("Create"))
                        .clicked();
                });

            if create {
                let (name, description, category) =
                    (form.name.trim().to_string(), form.description.clone(), form.category.clone());
                self.new_project = None;
                match self.store.create_project(&name, &description, category.as_deref()) {
                    Ok(project) => {
                        self.refresh_projects();
                        self.open_project(&project.id);
                    }
                    Err(e) => self.report_error("Creating project", e),
                }
            } else if !open {
                self.new_project = None;
            }
        }

        if let Some(pending) = self.pending_delete.as_ref() {
            let mut decision = None;
            egui::Window::new("Delete Project")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Delete \"{}\" and all of its media ({:.1} MB)? This cannot be undone.",
                        pending.name,
                        pending.bytes as f64 / (1024.0 * 1024.0)
                    ));
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            decision = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            decision = Some(false);
                        }
                    });
                });

            if let Some(confirmed) = decision {
                let project_id = pending.project_id.clone();
                self.pending_delete = None;
                if confirmed {
                    match self.store.delete_project(&project_id) {
                        Ok(()) => self.status = Some("Project deleted".to_string()),
                        Err(e) => self.report_error("Deleting project", e),
                    }
                    self.refresh_projects();
                }
            }
        }

        if self.show_settings {
            let mut open = true;
            let project_count = self.projects.len();
            let action = settings_ui::show(ctx, &mut open, &mut self.settings, &mut self.new_category, project_count);
            self.show_settings = open;
            self.handle_settings(action);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Project...").clicked() {
                        self.handle_gallery(ctx, gallery::GalleryAction::NewProject);
                        ui.close_menu();
                    }
                    if ui.button("Import Backup...").clicked() {
                        self.import_backup(ctx);
                        ui.close_menu();
                    }
                    ui.separator();

                    let open_id = self.project.as_ref().map(|p| p.id.clone());
                    if ui
                        .add_enabled(open_id.is_some(), egui::Button::new("Export Web Bundle..."))
                        .clicked()
                    {
                        if let Some(id) = open_id.clone() {
                            self.export_web(ctx, id);
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(open_id.is_some(), egui::Button::new("Export Backup..."))
                        .clicked()
                    {
                        if let Some(id) = open_id.clone() {
                            self.export_backup(ctx, id);
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(open_id.is_some(), egui::Button::new("Open Project Folder"))
                        .clicked()
                    {
                        if let Some(id) = open_id {
                            self.handle_gallery(ctx, gallery::GalleryAction::OpenFolder(id));
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.project.is_some(), egui::Button::new("Close Project"))
                        .clicked()
                    {
                        self.close_project();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        self.show_settings = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.status = Some(format!("Panotour {}", env!("CARGO_PKG_VERSION")));
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.job {
                Some(job) => {
                    ui.spinner();
                    ui.label(&job.title);
                    ui.add(
                        egui::ProgressBar::new(job.progress.percent as f32 / 100.0)
                            .text(format!("{}% {}", job.progress.percent, job.progress.message))
                            .desired_width(320.0),
                    );
                }
                None => {
                    ui.label(self.status.as_deref().unwrap_or("Ready"));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(self.settings.workspace_path.display().to_string()).weak());
                    });
                }
            });
        });
    }

    fn editor(&mut self, ctx: &egui::Context) {
        let Some(project_name) = self.project.as_ref().map(|p| p.name.clone()) else {
            return;
        };

        // Keep the preview and file info in step with the selected scene
        let selected = self
            .project
            .as_ref()
            .zip(self.selected_scene.as_deref())
            .and_then(|(p, sid)| p.scene(sid).ok())
            .map(|s| (s.media_path.clone(), s.media_type));
        match &selected {
            Some((path, MediaType::Image)) => self.preview.request(path),
            _ => self.preview.clear(),
        }
        if let Some((path, _)) = &selected {
            if self.media_info.as_ref().map(|(p, _)| p != path).unwrap_or(true) {
                self.media_info = fsutil::file_info(Path::new(path)).ok().map(|info| (path.clone(), info));
            }
        }
        if self.show_map {
            let map_path = self
                .project
                .as_ref()
                .and_then(|p| p.map_config.as_ref())
                .and_then(|c| c.image_path.clone());
            match map_path {
                Some(path) => self.map_image.request(&path),
                None => self.map_image.clear(),
            }
        }

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &project_name, &mut self.current_tool, &mut self.show_map))
            .inner;
        if let toolbar::ToolbarAction::BackToGallery = toolbar_action {
            self.close_project();
            return;
        }

        let scenes_action = egui::SidePanel::left("scenes")
            .default_width(220.0)
            .show(ctx, |ui| match self.project.as_ref() {
                Some(project) => scenes::show(ui, project, self.selected_scene.as_deref()),
                None => scenes::ScenesAction::None,
            })
            .inner;
        match scenes_action {
            scenes::ScenesAction::None => {}
            scenes::ScenesAction::Select(id) => {
                self.selected_scene = Some(id);
                self.selected_hotspot = None;
            }
            scenes::ScenesAction::AddScenes => self.add_scenes(),
            scenes::ScenesAction::SetFeatured(id) => {
                self.mutate("Updating featured scene", |s, pid| s.set_featured_scene(pid, &id, true));
            }
        }

        let categories = self.categories();
        let media_info = self
            .media_info
            .as_ref()
            .filter(|(path, _)| selected.as_ref().map(|(p, _)| p == path).unwrap_or(false))
            .map(|(_, info)| info.clone());
        let properties_action = egui::SidePanel::right("properties")
            .default_width(300.0)
            .show(ctx, |ui| match self.project.as_mut() {
                Some(project) => properties::show(
                    ui,
                    project,
                    &categories,
                    self.selected_scene.as_deref(),
                    self.selected_hotspot.as_deref(),
                    media_info.as_ref(),
                ),
                None => properties::PropertiesAction::None,
            })
            .inner;
        self.handle_properties(properties_action);

        if self.show_map {
            let mut open = true;
            let map_action = match self.project.as_mut() {
                Some(project) => {
                    let mut config = project.map_config.clone().unwrap_or_default();
                    let action = map::show(
                        ctx,
                        &mut open,
                        project,
                        &mut config,
                        self.selected_scene.as_deref(),
                        self.selected_marker.as_deref(),
                        self.map_image.texture.as_ref(),
                        self.map_image.size,
                    );
                    if project.map_config.is_some() {
                        project.map_config = Some(config);
                    }
                    action
                }
                None => map::MapAction::None,
            };
            self.show_map = open;
            self.handle_map(map_action);
        }

        // Escape drops back to selection, Delete removes the selected hotspot
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.current_tool = Tool::Select;
            self.selected_hotspot = None;
        }
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            if let Some(hotspot_id) = self.selected_hotspot.clone() {
                self.handle_properties(properties::PropertiesAction::DeleteHotspot(hotspot_id));
            }
        }

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let scene = self
                    .project
                    .as_ref()
                    .zip(self.selected_scene.as_deref())
                    .and_then(|(p, sid)| p.scene(sid).ok());
                canvas::show(
                    ui,
                    scene,
                    self.current_tool,
                    self.preview.texture.as_ref(),
                    self.preview.size,
                    self.selected_hotspot.as_deref(),
                    self.preview.is_loading(),
                )
            })
            .inner;
        match canvas_action {
            canvas::CanvasAction::None => {}
            canvas::CanvasAction::PlaceHotspot(position) => self.place_hotspot(position),
            canvas::CanvasAction::SelectHotspot(id) => self.selected_hotspot = Some(id),
            canvas::CanvasAction::Deselect => self.selected_hotspot = None,
        }
    }
}

impl eframe::App for TourApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.preview.poll(ctx);
        self.map_image.poll(ctx);
        self.poll_job();

        self.menu_bar(ctx);
        self.status_bar(ctx);

        if self.project.is_some() {
            self.editor(ctx);
        } else {
            let categories = self.categories();
            let view_mode = self.settings.gallery_view_mode;
            let action = egui::CentralPanel::default()
                .show(ctx, |ui| {
                    gallery::show(ui, &self.projects, &categories, view_mode, &mut self.category_filter)
                })
                .inner;
            self.handle_gallery(ctx, action);
        }

        self.show_dialogs(ctx);
    }
}
