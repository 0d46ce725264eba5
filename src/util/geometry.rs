// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides conversions between pixel coordinates, normalized
//! image coordinates and yaw/pitch angles on an equirectangular panorama.

use crate::models::{MapPoint, SpherePosition};

/// Convert pixel coordinates to normalized coordinates (0.0 to 1.0).
pub fn normalize_coordinates(pixel_x: f64, pixel_y: f64, width: u32, height: u32) -> MapPoint {
    MapPoint {
        x: (pixel_x / width as f64).clamp(0.0, 1.0),
        y: (pixel_y / height as f64).clamp(0.0, 1.0),
    }
}

/// Convert normalized coordinates to pixel coordinates.
pub fn denormalize_coordinates(point: &MapPoint, width: u32, height: u32) -> (f64, f64) {
    (point.x * width as f64, point.y * height as f64)
}

/// Wrap a yaw angle into (-180, 180].
pub fn wrap_yaw(yaw: f64) -> f64 {
    let wrapped = (yaw + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Clamp a pitch angle to [-90, 90].
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-90.0, 90.0)
}

/// Wrap a bearing into [0, 360).
pub fn wrap_bearing(bearing: f64) -> f64 {
    bearing.rem_euclid(360.0)
}

/// Map a normalized point on an equirectangular image to a sphere position.
/// The image centre faces yaw 0, the top edge is pitch +90.
pub fn equirect_to_sphere(point: &MapPoint) -> SpherePosition {
    SpherePosition {
        yaw: wrap_yaw((point.x - 0.5) * 360.0),
        pitch: clamp_pitch((0.5 - point.y) * 180.0),
    }
}

/// Inverse of [`equirect_to_sphere`].
pub fn sphere_to_equirect(position: &SpherePosition) -> MapPoint {
    MapPoint {
        x: wrap_yaw(position.yaw) / 360.0 + 0.5,
        y: 0.5 - clamp_pitch(position.pitch) / 180.0,
    }
}
