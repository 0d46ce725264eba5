// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings window: workspace, image options and custom categories.

use panotour::settings::{AppSettings, CompressionUpdate, BUILTIN_CATEGORIES};
use std::path::PathBuf;

pub enum SettingsAction {
    None,
    PickWorkspace,
    SwitchWorkspace(PathBuf),
    SetPhotoCompression(bool),
    SetCompression(CompressionUpdate),
    AddCategory(String),
    RemoveCategory(String),
}

pub fn show(
    ctx: &egui::Context,
    open: &mut bool,
    settings: &mut AppSettings,
    new_category: &mut String,
    project_count: usize,
) -> SettingsAction {
    let mut action = SettingsAction::None;

    egui::Window::new("⚙ Settings")
        .open(open)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.heading("Workspace");
            ui.label(settings.workspace_path.display().to_string());
            ui.label(egui::RichText::new(format!("{} projects", project_count)).weak());
            if ui.button("Change Workspace...").clicked() {
                action = SettingsAction::PickWorkspace;
            }
            let recent: Vec<PathBuf> = settings
                .recent_workspaces
                .iter()
                .filter(|p| **p != settings.workspace_path)
                .cloned()
                .collect();
            if !recent.is_empty() {
                ui.label("Recent:");
                for path in recent {
                    if ui.link(path.display().to_string()).clicked() {
                        action = SettingsAction::SwitchWorkspace(path);
                    }
                }
            }

            ui.separator();
            ui.heading("Images");
            if ui
                .checkbox(&mut settings.photo_compression_enabled, "Photo compression")
                .clicked()
            {
                action = SettingsAction::SetPhotoCompression(settings.photo_compression_enabled);
            }
            ui.add_enabled_ui(settings.photo_compression_enabled, |ui| {
                let mut update = CompressionUpdate::default();
                ui.horizontal(|ui| {
                    ui.label("Quality:");
                    let mut quality = settings.compression_quality;
                    if ui.add(egui::Slider::new(&mut quality, 1..=100)).drag_stopped() {
                        update.quality = Some(quality);
                    }
                    settings.compression_quality = quality;
                });
                ui.horizontal(|ui| {
                    ui.label("Max size:");
                    let w = ui.add(egui::DragValue::new(&mut settings.max_image_width).speed(16.0));
                    ui.label("×");
                    let h = ui.add(egui::DragValue::new(&mut settings.max_image_height).speed(16.0));
                    if w.drag_stopped() || w.lost_focus() {
                        update.max_width = Some(settings.max_image_width);
                    }
                    if h.drag_stopped() || h.lost_focus() {
                        update.max_height = Some(settings.max_image_height);
                    }
                });
                if update != CompressionUpdate::default() {
                    action = SettingsAction::SetCompression(update);
                }
            });

            ui.separator();
            ui.heading("Categories");
            ui.label(
                egui::RichText::new(
                    BUILTIN_CATEGORIES
                        .iter()
                        .map(|(_, label)| *label)
                        .collect::<Vec<_>>()
                        .join(", "),
                )
                .weak(),
            );
            for category in &settings.custom_categories {
                ui.horizontal(|ui| {
                    ui.label(&category.label);
                    if ui.small_button("🗑").clicked() {
                        action = SettingsAction::RemoveCategory(category.id.clone());
                    }
                });
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(new_category);
                if ui.button("Add").clicked() && !new_category.trim().is_empty() {
                    action = SettingsAction::AddCategory(std::mem::take(new_category));
                }
            });
        });

    action
}
