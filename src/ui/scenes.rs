// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene list for the open project.

use panotour::models::{MediaType, Project};

pub enum ScenesAction {
    None,
    Select(String),
    AddScenes,
    SetFeatured(String),
}

pub fn show(ui: &mut egui::Ui, project: &Project, selected_scene: Option<&str>) -> ScenesAction {
    let mut action = ScenesAction::None;

    ui.horizontal(|ui| {
        ui.heading("Scenes");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("➕ Add").on_hover_text("Add panoramas or 360° videos").clicked() {
                action = ScenesAction::AddScenes;
            }
        });
    });
    ui.separator();

    if project.scenes.is_empty() {
        ui.label(egui::RichText::new("No scenes yet").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for scene in &project.scenes {
            ui.horizontal(|ui| {
                let star = if scene.is_featured { "★" } else { "☆" };
                if ui
                    .selectable_label(false, star)
                    .on_hover_text("Start the tour with this scene")
                    .clicked()
                    && !scene.is_featured
                {
                    action = ScenesAction::SetFeatured(scene.id.clone());
                }

                let icon = match scene.media_type {
                    MediaType::Image => "🖼",
                    MediaType::Video => "🎬",
                };
                let mut text = egui::RichText::new(format!("{} {}", icon, scene.name));
                if !scene.is_visible {
                    text = text.weak().italics();
                }
                if ui
                    .selectable_label(selected_scene == Some(scene.id.as_str()), text)
                    .clicked()
                {
                    action = ScenesAction::Select(scene.id.clone());
                }
                if !scene.hotspots.is_empty() {
                    ui.label(egui::RichText::new(format!("{}", scene.hotspots.len())).small().weak());
                }
            });
        }
    });

    action
}
