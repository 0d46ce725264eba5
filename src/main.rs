// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PANOTOUR - 360° panorama tour authoring
//!
//! A cross-platform desktop editor for building interactive tours out of
//! equirectangular panoramas, hotspots and floor-plan maps.

mod app;
mod ui;

use anyhow::Result;
use app::TourApp;
use panotour::settings::AppSettings;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = AppSettings::load();
    log::info!("Workspace: {}", settings.workspace_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Panotour"),
        ..Default::default()
    };

    eframe::run_native(
        "Panotour",
        options,
        Box::new(|_cc| Ok(Box::new(TourApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
