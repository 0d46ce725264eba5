// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Small helpers: geometry, identifiers and filesystem plumbing.

pub mod fs;
pub mod geometry;
pub mod ids;
