// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Export pipelines: standalone web bundles and project backups.

pub mod archive;
pub mod backup;
pub mod progress;
pub mod web;

pub use backup::{export_backup, import_backup};
pub use progress::Progress;
pub use web::{export_web, WebExportSummary};
