// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project gallery shown when no project is open.

use panotour::models::ProjectEntry;
use panotour::settings::{Category, GalleryViewMode};

/// Result of gallery interaction.
pub enum GalleryAction {
    None,
    Open(String),
    NewProject,
    ImportBackup,
    ExportWeb(String),
    ExportBackup(String),
    OpenFolder(String),
    Delete(String),
    SetViewMode(GalleryViewMode),
}

fn category_label<'a>(categories: &'a [Category], id: Option<&'a str>) -> &'a str {
    match id {
        Some(id) => categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.label.as_str())
            .unwrap_or(id),
        None => "Uncategorized",
    }
}

/// Display every project in the workspace.
pub fn show(
    ui: &mut egui::Ui,
    projects: &[ProjectEntry],
    categories: &[Category],
    view_mode: GalleryViewMode,
    filter: &mut Option<String>,
) -> GalleryAction {
    let mut action = GalleryAction::None;

    ui.horizontal(|ui| {
        ui.heading("Projects");
        ui.separator();
        if ui.button("➕ New Project").clicked() {
            action = GalleryAction::NewProject;
        }
        if ui.button("📥 Import Backup...").clicked() {
            action = GalleryAction::ImportBackup;
        }
        ui.separator();

        egui::ComboBox::from_id_source("category_filter")
            .selected_text(match filter.as_deref() {
                Some(id) => category_label(categories, Some(id)),
                None => "All categories",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(filter, None, "All categories");
                for category in categories {
                    ui.selectable_value(filter, Some(category.id.clone()), &category.label);
                }
            });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.selectable_label(view_mode == GalleryViewMode::List, "☰ List").clicked() {
                action = GalleryAction::SetViewMode(GalleryViewMode::List);
            }
            if ui.selectable_label(view_mode == GalleryViewMode::Grid, "▦ Grid").clicked() {
                action = GalleryAction::SetViewMode(GalleryViewMode::Grid);
            }
        });
    });
    ui.separator();

    let visible: Vec<&ProjectEntry> = projects
        .iter()
        .filter(|e| filter.is_none() || e.project.category == *filter)
        .collect();

    if visible.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("No projects yet. Create one to start building a tour.")
                    .color(egui::Color32::from_gray(160)),
            );
        });
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| match view_mode {
        GalleryViewMode::Grid => {
            let columns = ((ui.available_width() / 260.0).floor() as usize).max(1);
            egui::Grid::new("project_grid")
                .spacing([12.0, 12.0])
                .show(ui, |ui| {
                    for (i, entry) in visible.iter().enumerate() {
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.set_width(236.0);
                            project_card(ui, entry, categories, &mut action);
                        });
                        if (i + 1) % columns == 0 {
                            ui.end_row();
                        }
                    }
                });
        }
        GalleryViewMode::List => {
            for entry in &visible {
                ui.horizontal(|ui| {
                    project_summary(ui, entry, categories);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        project_buttons(ui, entry, &mut action);
                    });
                });
                ui.separator();
            }
        }
    });

    action
}

fn project_card(ui: &mut egui::Ui, entry: &ProjectEntry, categories: &[Category], action: &mut GalleryAction) {
    ui.vertical(|ui| {
        project_summary(ui, entry, categories);
        if !entry.project.description.is_empty() {
            ui.label(egui::RichText::new(&entry.project.description).weak());
        }
        ui.horizontal_wrapped(|ui| project_buttons(ui, entry, action));
    });
}

fn project_summary(ui: &mut egui::Ui, entry: &ProjectEntry, categories: &[Category]) {
    let project = &entry.project;
    ui.vertical(|ui| {
        ui.label(egui::RichText::new(&project.name).strong().size(16.0));
        ui.label(format!(
            "{} · {} scenes · {} hotspots",
            category_label(categories, project.category.as_deref()),
            project.scenes.len(),
            project.hotspot_count()
        ));
        ui.label(
            egui::RichText::new(format!("Updated {}", project.updated_at.format("%Y-%m-%d %H:%M")))
                .small()
                .weak(),
        );
    });
}

fn project_buttons(ui: &mut egui::Ui, entry: &ProjectEntry, action: &mut GalleryAction) {
    let id = &entry.project.id;
    if ui.button("Open").clicked() {
        *action = GalleryAction::Open(id.clone());
    }
    ui.menu_button("⋯", |ui| {
        if ui.button("Export Web Bundle...").clicked() {
            *action = GalleryAction::ExportWeb(id.clone());
            ui.close_menu();
        }
        if ui.button("Export Backup...").clicked() {
            *action = GalleryAction::ExportBackup(id.clone());
            ui.close_menu();
        }
        if ui.button("Open Folder").clicked() {
            *action = GalleryAction::OpenFolder(id.clone());
            ui.close_menu();
        }
        ui.separator();
        if ui.button("🗑 Delete").clicked() {
            *action = GalleryAction::Delete(id.clone());
            ui.close_menu();
        }
    });
}
