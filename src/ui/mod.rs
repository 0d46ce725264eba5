// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Panotour editor.

pub mod canvas;
pub mod gallery;
pub mod map;
pub mod properties;
pub mod scenes;
pub mod settings;
pub mod toolbar;
