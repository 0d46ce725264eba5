// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Random identifiers for projects, scenes, hotspots and markers.

use uuid::Uuid;

/// Eight lowercase hex characters from a v4 UUID.
pub fn short_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(8);
    token
}

/// `<prefix>_<token>`, e.g. `scene_1a2b3c4d`.
pub fn prefixed(prefix: &str) -> String {
    format!("{}_{}", prefix, short_token())
}

pub fn project_id() -> String {
    prefixed("prj")
}

pub fn scene_id() -> String {
    prefixed("scene")
}

pub fn hotspot_id() -> String {
    prefixed("hotspot")
}

pub fn marker_id() -> String {
    prefixed("marker")
}

/// Generate an id with `make` that is not already taken.
pub fn unique_id(make: fn() -> String, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = make();
        if !taken(&id) {
            return id;
        }
    }
}
