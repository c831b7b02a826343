// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defaults loaded from environment variables.
//!
//! Command line flags override these.

use bim2gltf_geometry::NormalMode;

/// Environment-level converter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Normal generation (`BIM2GLTF_NORMALS`: `placeholder` or `face`).
    pub normals: NormalMode,
    /// Embed the buffer as a data URI (`BIM2GLTF_EMBED`).
    pub embed: bool,
    /// Write `<stem>.zip` next to the output (`BIM2GLTF_ZIP`).
    pub zip: bool,
    /// Worker threads for mesh building (`BIM2GLTF_THREADS`).
    pub threads: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            normals: lookup("BIM2GLTF_NORMALS")
                .and_then(|v| parse_normals(&v))
                .unwrap_or_default(),
            embed: lookup("BIM2GLTF_EMBED")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            zip: lookup("BIM2GLTF_ZIP")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            threads: lookup("BIM2GLTF_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_normals(value: &str) -> Option<NormalMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "placeholder" => Some(NormalMode::Placeholder),
        "face" => Some(NormalMode::Face),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
