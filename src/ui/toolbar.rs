// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor toolbar and hotspot tool selection.

use crate::app::Tool;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    BackToGallery,
}

/// Display the editor toolbar.
pub fn show(ui: &mut egui::Ui, project_name: &str, current_tool: &mut Tool, show_map: &mut bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("⬅ Projects").clicked() {
            action = ToolbarAction::BackToGallery;
        }
        ui.label(egui::RichText::new(project_name).strong());

        ui.separator();
        ui.label("Tools:");

        if ui.selectable_label(*current_tool == Tool::Select, "⬆ Select").clicked() {
            *current_tool = Tool::Select;
        }
        if ui.selectable_label(*current_tool == Tool::SceneLink, "➡ Scene Link").clicked() {
            *current_tool = Tool::SceneLink;
        }
        if ui.selectable_label(*current_tool == Tool::Info, "ℹ Info").clicked() {
            *current_tool = Tool::Info;
        }
        if ui.selectable_label(*current_tool == Tool::Url, "🔗 Link").clicked() {
            *current_tool = Tool::Url;
        }

        ui.separator();
        ui.toggle_value(show_map, "🗺 Map");

        ui.separator();
        let tool_text = match current_tool {
            Tool::Select => "Click a hotspot to select it",
            Tool::SceneLink => "Click the panorama to place a link to another scene",
            Tool::Info => "Click the panorama to place an information point",
            Tool::Url => "Click the panorama to place a web link",
        };
        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
