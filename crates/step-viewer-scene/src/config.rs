// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Invalid `#rrggbb` color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid color '{0}', expected #rrggbb")]
pub struct ColorParseError(pub String);

/// 8-bit RGB color, serialized as `#rrggbb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Slide transition tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Horizontal offset pieces slide to and from
    pub slide_distance: f32,
    /// Per-frame lerp factor of the incoming piece
    pub incoming_lerp: f32,
    /// Base per-frame lerp factor of the outgoing piece
    pub outgoing_lerp: f32,
    /// Outgoing piece accelerates once this far from center
    pub acceleration_start: f32,
    /// Extra lerp factor per unit of distance past `acceleration_start`
    pub acceleration_per_unit: f32,
    /// Outgoing piece starts fading this far from center
    pub fade_start: f32,
    /// Distance over which the outgoing piece fades to transparent
    pub fade_distance: f32,
    /// Per-frame smoothing applied to opacity
    pub opacity_smoothing: f32,
    /// A piece has arrived when this close to its target
    pub arrival_epsilon: f32,
    /// Forced end of a transition (ms)
    pub safety_timeout_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            slide_distance: 30.0,
            incoming_lerp: 0.1,
            outgoing_lerp: 0.15,
            acceleration_start: 10.0,
            acceleration_per_unit: 0.01,
            fade_start: 2.0,
            fade_distance: 30.0,
            opacity_smoothing: 0.1,
            arrival_epsilon: 0.1,
            safety_timeout_ms: 2_000,
        }
    }
}

/// Pick highlight colors
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Material color with nothing selected
    pub default_color: Color,
    /// Material color while an entity is selected
    pub selected_color: Color,
    /// Marker color for a selected face
    pub face_marker_color: Color,
    /// Marker color for any other selected entity
    pub edge_marker_color: Color,
    /// Color of the pick point indicator
    pub indicator_color: Color,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_color: Color::rgb(0xff, 0x9a, 0x4d),
            selected_color: Color::rgb(0x4d, 0x9a, 0xff),
            face_marker_color: Color::rgb(0x4d, 0x9a, 0xff),
            edge_marker_color: Color::rgb(0xff, 0x4d, 0x9a),
            indicator_color: Color::rgb(0x00, 0xff, 0x00),
        }
    }
}

/// How pieces are placed in the scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Uniform scale applied to every piece
    pub model_scale: f32,
    /// Rotation about the vertical axis (radians)
    pub model_rotation_y: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            model_scale: 0.4,
            model_rotation_y: std::f32::consts::FRAC_PI_6,
        }
    }
}

/// Complete viewer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Piece files in display order
    pub pieces: Vec<String>,
    pub transition: TransitionConfig,
    pub selection: SelectionConfig,
    pub display: DisplayConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            pieces: (1..=5).map(|i| format!("/assets/Part{}.stp", i)).collect(),
            transition: TransitionConfig::default(),
            selection: SelectionConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
