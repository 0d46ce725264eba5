// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module probes panorama files and decodes images into RGBA pixel
//! buffers suitable for display in egui. Video scenes are stored and
//! exported as-is; they are never decoded here.

use anyhow::{Context, Result};
use std::path::Path;

/// Longest edge of a decoded preview. Full equirectangular panoramas are
/// commonly 8k or larger and would exceed GPU texture limits.
pub const PREVIEW_MAX_EDGE: u32 = 4096;

/// Accepted aspect-ratio drift for an equirectangular image (2:1).
const EQUIRECT_TOLERANCE: f64 = 0.02;

/// A decoded image ready for texture upload.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub pixels: Vec<u8>,
}

/// Decode an image, downscaling it to fit within `max_edge`.
pub fn load_image(path: &Path, max_edge: u32) -> Result<LoadedImage> {
    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let img = if img.width() > max_edge || img.height() > max_edge {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Read image dimensions from the file header without decoding pixels.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Whether the dimensions describe a 2:1 equirectangular panorama.
pub fn is_equirectangular(width: u32, height: u32) -> bool {
    if height == 0 {
        return false;
    }
    let ratio = width as f64 / height as f64;
    (ratio - 2.0).abs() <= 2.0 * EQUIRECT_TOLERANCE
}

/// Check that a newly added image looks like a panorama. Problems are
/// logged; the scene is still accepted.
pub fn warn_if_not_panorama(path: &Path) {
    match probe_dimensions(path) {
        Ok((w, h)) if !is_equirectangular(w, h) => {
            log::warn!(
                "{} is {}x{}, not a 2:1 equirectangular panorama",
                path.display(),
                w,
                h
            );
        }
        Ok(_) => {}
        Err(e) => log::warn!("Could not probe image: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equirectangular_ratio() {
        assert!(is_equirectangular(8192, 4096));
        assert!(is_equirectangular(6000, 3010));
        assert!(!is_equirectangular(4000, 3000));
        assert!(!is_equirectangular(100, 0));
    }

    #[test]
    fn test_load_image_downscales_large_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pano.png");
        image::RgbaImage::new(64, 32).save(&path).unwrap();

        let loaded = load_image(&path, 16).unwrap();
        assert_eq!((loaded.width, loaded.height), (16, 8));
        assert_eq!(loaded.pixels.len(), 16 * 8 * 4);

        assert_eq!(probe_dimensions(&path).unwrap(), (64, 32));
    }
}
