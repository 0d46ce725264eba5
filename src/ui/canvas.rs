// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Equirectangular preview of the selected scene.
//!
//! The whole panorama is drawn flat; hotspots are placed and shown at
//! their yaw/pitch positions mapped onto the image.

use crate::app::Tool;
use panotour::models::{HotspotKind, MapPoint, MediaType, Scene, SpherePosition};
use panotour::util::geometry;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    PlaceHotspot(SpherePosition),
    SelectHotspot(String),
    Deselect,
}

const HOTSPOT_RADIUS: f32 = 7.0;

fn hotspot_color(kind: &HotspotKind) -> egui::Color32 {
    match kind {
        HotspotKind::Scene { .. } => egui::Color32::from_rgb(80, 170, 255),
        HotspotKind::Info { .. } => egui::Color32::from_rgb(255, 200, 60),
        HotspotKind::Url { .. } => egui::Color32::from_rgb(120, 220, 120),
    }
}

fn to_screen(rect: &egui::Rect, point: &MapPoint) -> egui::Pos2 {
    egui::pos2(
        rect.min.x + point.x as f32 * rect.width(),
        rect.min.y + point.y as f32 * rect.height(),
    )
}

/// Display the preview and handle clicks.
pub fn show(
    ui: &mut egui::Ui,
    scene: Option<&Scene>,
    current_tool: Tool,
    image_texture: Option<&egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    selected_hotspot: Option<&str>,
    loading: bool,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available_size = ui.available_size() - egui::vec2(0.0, 24.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let Some(scene) = scene else {
            centered_message(ui, "Add a scene to begin building the tour", "Scenes → Add Scenes...");
            return;
        };

        // Videos are never decoded; fall back to a blank 2:1 surface
        let (img_width, img_height) = image_size.unwrap_or((2, 1));
        let available = ui.available_size();
        let img_aspect = img_width as f32 / img_height as f32;
        let (display_width, display_height) = if img_aspect > available.x / available.y {
            (available.x, available.x / img_aspect)
        } else {
            (available.y * img_aspect, available.y)
        };
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min
                + egui::vec2(
                    (available.x - display_width) / 2.0,
                    (available.y - display_height) / 2.0,
                ),
            egui::vec2(display_width, display_height),
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click());
        let painter = ui.painter_at(image_rect);

        match image_texture {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                painter.rect_filled(image_rect, 0.0, egui::Color32::from_gray(25));
                let text = match (scene.media_type, loading) {
                    (_, true) => "Loading preview...",
                    (MediaType::Video, _) => "Video scene: no preview",
                    (MediaType::Image, _) => "Preview unavailable",
                };
                painter.text(
                    image_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_gray(180),
                );
            }
        }

        // Horizon and forward guides
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(40));
        painter.hline(image_rect.x_range(), image_rect.center().y, stroke);
        painter.vline(image_rect.center().x, image_rect.y_range(), stroke);

        let mut hovered_hotspot = None;
        let pointer = response.hover_pos();
        for hotspot in &scene.hotspots {
            let pos = to_screen(&image_rect, &geometry::sphere_to_equirect(&hotspot.position));
            let mut color = hotspot_color(&hotspot.kind);
            if !hotspot.is_visible {
                color = color.gamma_multiply(0.35);
            }
            painter.circle_filled(pos, HOTSPOT_RADIUS, color);
            let ring = if selected_hotspot == Some(hotspot.id.as_str()) {
                egui::Stroke::new(3.0, egui::Color32::WHITE)
            } else {
                egui::Stroke::new(1.0, egui::Color32::BLACK)
            };
            painter.circle_stroke(pos, HOTSPOT_RADIUS, ring);

            if pointer.map(|p| p.distance(pos) <= HOTSPOT_RADIUS + 2.0).unwrap_or(false) {
                hovered_hotspot = Some(hotspot);
            }
        }

        if let Some(hotspot) = hovered_hotspot {
            if let Some(tooltip) = hotspot.tooltip.as_deref() {
                painter.text(
                    to_screen(&image_rect, &geometry::sphere_to_equirect(&hotspot.position))
                        + egui::vec2(0.0, -HOTSPOT_RADIUS - 4.0),
                    egui::Align2::CENTER_BOTTOM,
                    tooltip,
                    egui::FontId::proportional(13.0),
                    egui::Color32::WHITE,
                );
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                action = match (hovered_hotspot, current_tool) {
                    (Some(hotspot), _) => CanvasAction::SelectHotspot(hotspot.id.clone()),
                    (None, Tool::Select) => CanvasAction::Deselect,
                    (None, _) => {
                        let point = MapPoint {
                            x: ((pos.x - image_rect.min.x) / display_width) as f64,
                            y: ((pos.y - image_rect.min.y) / display_height) as f64,
                        };
                        CanvasAction::PlaceHotspot(geometry::equirect_to_sphere(&point))
                    }
                };
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label(format!("Current tool: {:?}", current_tool));
        ui.separator();
        match scene {
            Some(scene) => {
                ui.label(format!("{} · {} hotspots", scene.name, scene.hotspots.len()));
                if let Some((w, h)) = image_size {
                    ui.separator();
                    ui.label(format!("Preview {}×{}", w, h));
                }
            }
            None => {
                ui.label("No scene selected");
            }
        }
    });

    action
}

fn centered_message(ui: &mut egui::Ui, message: &str, hint: &str) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new(message)
                    .size(16.0)
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(egui::RichText::new(hint).weak().color(egui::Color32::from_gray(130)));
        });
    });
}
