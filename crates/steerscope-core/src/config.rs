//! Display configuration shared by every front end.
//!
//! Only affects how projections are shown; derivation never reads it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::Side;

/// Decimal places used for next-token probabilities unless overridden.
pub const DEFAULT_PROBABILITY_PRECISION: usize = 4;

/// Upper bound on requested precision; beyond this f64 output is noise.
pub const MAX_PROBABILITY_PRECISION: usize = 17;

/// Color set for one pane, as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: String,
    pub light: String,
    pub medium: String,
    pub border: String,
}

impl Theme {
    /// Blue palette for the baseline pane.
    pub fn baseline() -> Self {
        Self {
            primary: "#3b82f6".into(),
            light: "#dbeafe".into(),
            medium: "#60a5fa".into(),
            border: "#bfdbfe".into(),
        }
    }

    /// Green palette for the steered pane.
    pub fn steered() -> Self {
        Self {
            primary: "#22c55e".into(),
            light: "#dcfce7".into(),
            medium: "#4ade80".into(),
            border: "#bbf7d0".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub probability_precision: usize,
    pub baseline: Theme,
    pub steered: Theme,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            probability_precision: DEFAULT_PROBABILITY_PRECISION,
            baseline: Theme::baseline(),
            steered: Theme::steered(),
        }
    }
}

impl DisplayConfig {
    pub fn theme(&self, side: Side) -> &Theme {
        match side {
            Side::Baseline => &self.baseline,
            Side::Steered => &self.steered,
        }
    }

    /// Set precision, clamped to [`MAX_PROBABILITY_PRECISION`].
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.probability_precision = precision.min(MAX_PROBABILITY_PRECISION);
        self
    }

    pub fn format_probability(&self, probability: f64) -> String {
        format_probability(probability, self.probability_precision)
    }
}

/// Fixed-decimal rendering, e.g. `0.7` at precision 4 is `"0.7000"`.
pub fn format_probability(probability: f64, precision: usize) -> String {
    format!("{probability:.precision$}")
}

/// Load a display config from a JSON file. Missing fields take defaults.
pub fn load_display_config(path: &Path) -> std::io::Result<DisplayConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str::<DisplayConfig>(&raw).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("failed to parse display config JSON: {e}"),
        )
    })?;
    let precision = config.probability_precision;
    Ok(config.with_precision(precision))
}

/// Parse `#rrggbb` (leading `#` optional) into RGB components.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
