// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PANOTOUR - 360° panorama tour authoring
//!
//! Project storage, scene/hotspot/map editing, web bundle export and zip
//! backups for interactive panorama tours. The desktop editor in `main.rs`
//! is a thin egui front end over this library.

pub mod error;
pub mod export;
pub mod io;
pub mod models;
pub mod settings;
pub mod store;
pub mod util;

pub use error::{Result, StoreError};
pub use store::ProjectStore;
