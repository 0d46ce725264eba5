// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor-plan window: the map image with one marker per placed scene.

use panotour::models::{MapConfig, MapPoint, Project};
use panotour::util::geometry;

pub enum MapAction {
    None,
    UploadImage,
    Clear,
    SetVisible(bool),
    AddMarker(String, MapPoint),
    MoveMarker(String, MapPoint),
    RelabelMarker(String, Option<String>),
    DeleteMarker(String),
    SelectMarker(Option<String>),
}

const MARKER_RADIUS: f32 = 6.0;

/// Display the floor-plan window while `open` is set.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ctx: &egui::Context,
    open: &mut bool,
    project: &Project,
    config: &mut MapConfig,
    selected_scene: Option<&str>,
    selected_marker: Option<&str>,
    texture: Option<&egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
) -> MapAction {
    let mut action = MapAction::None;

    egui::Window::new("🗺 Floor Plan")
        .open(open)
        .default_size([520.0, 460.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Upload Image...").clicked() {
                    action = MapAction::UploadImage;
                }
                if ui.checkbox(&mut config.visible, "Show in tour").clicked() {
                    action = MapAction::SetVisible(config.visible);
                }
                if ui.button("Clear Map").clicked() {
                    action = MapAction::Clear;
                }
            });
            ui.separator();

            match (texture, image_size) {
                (Some(texture), Some((w, h))) => {
                    let width = ui.available_width();
                    let height = width * h as f32 / w as f32;
                    let (rect, response) =
                        ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::click());
                    let painter = ui.painter_at(rect);
                    painter.image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );

                    let (display_w, display_h) = (rect.width() as u32, rect.height() as u32);
                    for marker in &config.markers {
                        let (x, y) = geometry::denormalize_coordinates(&marker.position, display_w, display_h);
                        let pos = rect.min + egui::vec2(x as f32, y as f32);
                        let selected = selected_marker == Some(marker.id.as_str());
                        let color = if selected {
                            egui::Color32::from_rgb(255, 120, 60)
                        } else {
                            egui::Color32::from_rgb(80, 170, 255)
                        };
                        painter.circle_filled(pos, MARKER_RADIUS, color);
                        painter.circle_stroke(pos, MARKER_RADIUS, egui::Stroke::new(1.0, egui::Color32::BLACK));
                        let name = marker
                            .label
                            .clone()
                            .or_else(|| project.scene(&marker.scene_id).ok().map(|s| s.name.clone()))
                            .unwrap_or_default();
                        painter.text(
                            pos + egui::vec2(MARKER_RADIUS + 3.0, 0.0),
                            egui::Align2::LEFT_CENTER,
                            name,
                            egui::FontId::proportional(12.0),
                            egui::Color32::BLACK,
                        );
                    }

                    if response.clicked() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            let local = pos - rect.min;
                            let point =
                                geometry::normalize_coordinates(local.x as f64, local.y as f64, display_w, display_h);
                            action = match (selected_marker, selected_scene) {
                                (Some(marker), _) => MapAction::MoveMarker(marker.to_string(), point),
                                (None, Some(scene)) => MapAction::AddMarker(scene.to_string(), point),
                                (None, None) => MapAction::None,
                            };
                        }
                    }
                    ui.label(
                        egui::RichText::new(if selected_marker.is_some() {
                            "Click to move the selected marker"
                        } else {
                            "Click to place the selected scene"
                        })
                        .weak(),
                    );
                }
                _ if config.image_path.is_some() => {
                    ui.spinner();
                }
                _ => {
                    ui.label("Upload a floor plan image to place scenes on it.");
                }
            }

            ui.separator();
            for marker in &mut config.markers {
                ui.horizontal(|ui| {
                    let scene_name = project
                        .scene(&marker.scene_id)
                        .map(|s| s.name.as_str())
                        .unwrap_or("(missing scene)");
                    let selected = selected_marker == Some(marker.id.as_str());
                    if ui.selectable_label(selected, scene_name).clicked() {
                        action = MapAction::SelectMarker((!selected).then(|| marker.id.clone()));
                    }
                    let mut label = marker.label.clone().unwrap_or_default();
                    let response = ui.add(egui::TextEdit::singleline(&mut label).hint_text("Label").desired_width(120.0));
                    if response.changed() {
                        marker.label = Some(label).filter(|l| !l.trim().is_empty());
                    }
                    if response.lost_focus() {
                        action = MapAction::RelabelMarker(marker.id.clone(), marker.label.clone());
                    }
                    if ui.small_button("🗑").clicked() {
                        action = MapAction::DeleteMarker(marker.id.clone());
                    }
                });
            }
        });

    action
}
