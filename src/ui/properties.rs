// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel for the open project, the selected scene and its
//! hotspots.
//!
//! Widgets edit the app's working copy of the project directly; an action
//! is returned once an edit is committed (focus lost, drag released or a
//! toggle clicked) so the app can persist it.

use panotour::models::{
    HotspotKind, HotspotUpdate, Project, SphereCorrection, SpherePosition, Transition, ViewerSettings,
};
use panotour::settings::Category;
use panotour::util::fs::FileInfo;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    RenameProject(String),
    SetDescription(String),
    SetCategory(Option<String>),
    SetViewerSettings(ViewerSettings),
    RenameScene(String),
    SetSceneVisible(bool),
    SetFeatured(bool),
    SetComment(Option<String>),
    SetBearing(Option<f64>),
    SetCoordinates(Option<[f64; 2]>),
    SetSphereCorrection(Option<SphereCorrection>),
    PickThumbnail,
    ReplaceMedia,
    DeleteScene,
    SelectHotspot(String),
    UpdateHotspot(String, HotspotUpdate),
    ToggleHotspot(String),
    DeleteHotspot(String),
    DeleteAllHotspots,
    SetAllHotspotsVisible(bool),
}

fn committed(response: &egui::Response) -> bool {
    response.lost_focus() || response.drag_stopped()
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    project: &mut Project,
    categories: &[Category],
    selected_scene: Option<&str>,
    selected_hotspot: Option<&str>,
    media_info: Option<&FileInfo>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::CollapsingHeader::new("Project")
            .default_open(selected_scene.is_none())
            .show(ui, |ui| project_section(ui, project, categories, &mut action));

        ui.separator();

        let scene_names: Vec<(String, String)> = project
            .scenes
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        let Some(scene) = selected_scene.and_then(|id| project.scenes.iter_mut().find(|s| s.id == id)) else {
            ui.label(egui::RichText::new("Select a scene to edit it").weak());
            return;
        };

        ui.heading("Scene");
        ui.horizontal(|ui| {
            ui.label("Name:");
            if ui.text_edit_singleline(&mut scene.name).lost_focus() {
                action = PropertiesAction::RenameScene(scene.name.clone());
            }
        });
        if ui.checkbox(&mut scene.is_visible, "Visible in tour").clicked() {
            action = PropertiesAction::SetSceneVisible(scene.is_visible);
        }
        if ui.checkbox(&mut scene.is_featured, "Featured (tour start)").clicked() {
            action = PropertiesAction::SetFeatured(scene.is_featured);
        }

        ui.label("Comment:");
        let mut comment = scene.comment.clone().unwrap_or_default();
        let response = ui.text_edit_multiline(&mut comment);
        if response.changed() {
            scene.comment = Some(comment);
        }
        if response.lost_focus() {
            action = PropertiesAction::SetComment(scene.comment.clone());
        }

        orientation_section(ui, scene, &mut action);

        ui.separator();
        ui.label(egui::RichText::new(&scene.media_path).small().weak());
        if let Some(info) = media_info {
            ui.label(format!("{:.1} MB", info.size as f64 / (1024.0 * 1024.0)));
        }
        ui.horizontal(|ui| {
            if ui.button("Replace Media...").clicked() {
                action = PropertiesAction::ReplaceMedia;
            }
            if ui.button("Set Thumbnail...").clicked() {
                action = PropertiesAction::PickThumbnail;
            }
        });
        if ui
            .button(egui::RichText::new("🗑 Delete Scene").color(egui::Color32::LIGHT_RED))
            .clicked()
        {
            action = PropertiesAction::DeleteScene;
        }

        ui.separator();
        ui.heading(format!("Hotspots ({})", scene.hotspots.len()));
        if !scene.hotspots.is_empty() {
            ui.horizontal(|ui| {
                if ui.small_button("Show all").clicked() {
                    action = PropertiesAction::SetAllHotspotsVisible(true);
                }
                if ui.small_button("Hide all").clicked() {
                    action = PropertiesAction::SetAllHotspotsVisible(false);
                }
                if ui.small_button("Delete all").clicked() {
                    action = PropertiesAction::DeleteAllHotspots;
                }
            });
        }

        for hotspot in &scene.hotspots {
            ui.horizontal(|ui| {
                let eye = if hotspot.is_visible { "👁" } else { "—" };
                if ui.small_button(eye).clicked() {
                    action = PropertiesAction::ToggleHotspot(hotspot.id.clone());
                }
                let label = hotspot.tooltip.clone().unwrap_or_else(|| hotspot.kind.label().to_string());
                if ui
                    .selectable_label(selected_hotspot == Some(hotspot.id.as_str()), label)
                    .clicked()
                {
                    action = PropertiesAction::SelectHotspot(hotspot.id.clone());
                }
                if ui.small_button("🗑").clicked() {
                    action = PropertiesAction::DeleteHotspot(hotspot.id.clone());
                }
            });
        }

        let current_scene_id = scene.id.clone();
        if let Some(hotspot) = selected_hotspot.and_then(|id| scene.hotspots.iter_mut().find(|h| h.id == id)) {
            ui.separator();
            ui.heading("Hotspot");
            let id = hotspot.id.clone();
            let mut update = HotspotUpdate::default();

            ui.horizontal(|ui| {
                ui.label("Tooltip:");
                let mut tooltip = hotspot.tooltip.clone().unwrap_or_default();
                let response = ui.text_edit_singleline(&mut tooltip);
                if response.changed() {
                    hotspot.tooltip = Some(tooltip.clone()).filter(|t| !t.is_empty());
                }
                if response.lost_focus() {
                    update.tooltip = Some(hotspot.tooltip.clone());
                }
            });

            let mut position: SpherePosition = hotspot.position;
            ui.horizontal(|ui| {
                ui.label("Yaw:");
                let yaw = ui.add(egui::DragValue::new(&mut position.yaw).speed(0.5).suffix("°"));
                ui.label("Pitch:");
                let pitch = ui.add(egui::DragValue::new(&mut position.pitch).speed(0.5).suffix("°"));
                hotspot.position = position;
                if committed(&yaw) || committed(&pitch) {
                    update.position = Some(position);
                }
            });

            if kind_editor(ui, &mut hotspot.kind, &scene_names, &current_scene_id) {
                update.kind = Some(hotspot.kind.clone());
            }

            if update != HotspotUpdate::default() {
                action = PropertiesAction::UpdateHotspot(id, update);
            }
        }
    });

    action
}

fn project_section(ui: &mut egui::Ui, project: &mut Project, categories: &[Category], action: &mut PropertiesAction) {
    ui.horizontal(|ui| {
        ui.label("Name:");
        if ui.text_edit_singleline(&mut project.name).lost_focus() {
            *action = PropertiesAction::RenameProject(project.name.clone());
        }
    });
    ui.label("Description:");
    if ui.text_edit_multiline(&mut project.description).lost_focus() {
        *action = PropertiesAction::SetDescription(project.description.clone());
    }

    let selected = project
        .category
        .as_deref()
        .and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.label.clone())
        .unwrap_or_else(|| "None".to_string());
    let before = project.category.clone();
    egui::ComboBox::from_label("Category")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut project.category, None, "None");
            for category in categories {
                ui.selectable_value(&mut project.category, Some(category.id.clone()), &category.label);
            }
        });
    if project.category != before {
        *action = PropertiesAction::SetCategory(project.category.clone());
    }

    let settings = &mut project.settings;
    let rotate = ui.checkbox(&mut settings.auto_rotate, "Auto-rotate");
    let fov = ui
        .horizontal(|ui| {
            ui.label("Initial FOV:");
            ui.add(egui::DragValue::new(&mut settings.initial_fov).speed(0.5).suffix("°"))
        })
        .inner;
    settings.initial_fov = settings.initial_fov.clamp(30.0, 120.0);
    if rotate.clicked() || committed(&fov) {
        *action = PropertiesAction::SetViewerSettings(*settings);
    }
}

fn orientation_section(ui: &mut egui::Ui, scene: &mut panotour::models::Scene, action: &mut PropertiesAction) {
    egui::CollapsingHeader::new("Orientation & location").show(ui, |ui| {
        let mut has_bearing = scene.bearing.is_some();
        ui.horizontal(|ui| {
            if ui.checkbox(&mut has_bearing, "Bearing").clicked() {
                scene.bearing = has_bearing.then_some(0.0);
                *action = PropertiesAction::SetBearing(scene.bearing);
            }
            if let Some(bearing) = scene.bearing.as_mut() {
                let response = ui.add(egui::DragValue::new(bearing).speed(1.0).suffix("°"));
                if committed(&response) {
                    *action = PropertiesAction::SetBearing(Some(*bearing));
                }
            }
        });

        let mut has_coordinates = scene.coordinates.is_some();
        ui.horizontal(|ui| {
            if ui.checkbox(&mut has_coordinates, "GPS").clicked() {
                scene.coordinates = has_coordinates.then_some([0.0, 0.0]);
                *action = PropertiesAction::SetCoordinates(scene.coordinates);
            }
            if let Some(coordinates) = scene.coordinates.as_mut() {
                ui.label("Lon");
                let lon = ui.add(egui::DragValue::new(&mut coordinates[0]).speed(0.0001));
                ui.label("Lat");
                let lat = ui.add(egui::DragValue::new(&mut coordinates[1]).speed(0.0001));
                coordinates[0] = coordinates[0].clamp(-180.0, 180.0);
                coordinates[1] = coordinates[1].clamp(-90.0, 90.0);
                if committed(&lon) || committed(&lat) {
                    *action = PropertiesAction::SetCoordinates(Some(*coordinates));
                }
            }
        });

        ui.label("Sphere correction:");
        let mut correction = scene.sphere_correction.unwrap_or_default();
        let mut commit = false;
        ui.horizontal(|ui| {
            for (label, value) in [
                ("Pan", &mut correction.pan),
                ("Tilt", &mut correction.tilt),
                ("Roll", &mut correction.roll),
            ] {
                ui.label(label);
                let mut degrees = value.unwrap_or(0.0);
                let response = ui.add(egui::DragValue::new(&mut degrees).speed(0.5).suffix("°"));
                if response.changed() {
                    *value = Some(degrees);
                }
                commit |= committed(&response);
            }
        });
        if correction != SphereCorrection::default() {
            scene.sphere_correction = Some(correction);
        }
        let reset = ui.small_button("Reset correction").clicked();
        if reset {
            scene.sphere_correction = None;
        }
        if commit || reset {
            *action = PropertiesAction::SetSphereCorrection(scene.sphere_correction);
        }
    });
}

/// Edit the type-specific fields. Returns true once an edit is committed.
fn kind_editor(ui: &mut egui::Ui, kind: &mut HotspotKind, scene_names: &[(String, String)], current_scene: &str) -> bool {
    let mut commit = false;
    match kind {
        HotspotKind::Scene {
            target_scene_id,
            transition,
        } => {
            let target_name = scene_names
                .iter()
                .find(|(id, _)| id == target_scene_id)
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "Choose a scene".to_string());
            let before = target_scene_id.clone();
            egui::ComboBox::from_label("Target scene")
                .selected_text(target_name)
                .show_ui(ui, |ui| {
                    for (id, name) in scene_names.iter().filter(|(id, _)| id != current_scene) {
                        ui.selectable_value(target_scene_id, id.clone(), name);
                    }
                });
            commit |= *target_scene_id != before;

            let before = *transition;
            egui::ComboBox::from_label("Transition")
                .selected_text(match transition {
                    Some(Transition::Fade) | None => "Fade",
                    Some(Transition::Slide) => "Slide",
                    Some(Transition::None) => "None",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(transition, Some(Transition::Fade), "Fade");
                    ui.selectable_value(transition, Some(Transition::Slide), "Slide");
                    ui.selectable_value(transition, Some(Transition::None), "None");
                });
            commit |= *transition != before;
        }
        HotspotKind::Info {
            title,
            content,
            image_url,
        } => {
            ui.horizontal(|ui| {
                ui.label("Title:");
                commit |= ui.text_edit_singleline(title).lost_focus();
            });
            ui.label("Content:");
            commit |= ui.text_edit_multiline(content).lost_focus();
            ui.horizontal(|ui| {
                ui.label("Image:");
                let mut url = image_url.clone().unwrap_or_default();
                let response = ui.text_edit_singleline(&mut url);
                if response.changed() {
                    *image_url = Some(url).filter(|u| !u.trim().is_empty());
                }
                commit |= response.lost_focus();
                if ui.small_button("…").on_hover_text("Choose an image file").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif"])
                        .pick_file()
                    {
                        *image_url = Some(path.to_string_lossy().into_owned());
                        commit = true;
                    }
                }
            });
        }
        HotspotKind::Url { url, open_in_new_tab } => {
            ui.horizontal(|ui| {
                ui.label("URL:");
                commit |= ui.text_edit_singleline(url).lost_focus();
            });
            let mut new_tab = open_in_new_tab.unwrap_or(true);
            if ui.checkbox(&mut new_tab, "Open in new tab").clicked() {
                *open_in_new_tab = Some(new_tab);
                commit = true;
            }
        }
    }
    commit
}
