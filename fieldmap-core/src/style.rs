//! Density-derived visual encoding for province boundaries.
//!
//! Stroke weight and fill opacity scale linearly with a province's
//! engineer density relative to the densest province; fill color comes
//! from a fixed region palette. Provinces with no records at all get a
//! distinct neutral treatment so "no data" never reads as "low data".

use crate::types::ProvinceAggregate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interpolation bounds for stroke weight and fill opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleBounds {
    pub min_weight: f32,
    pub max_weight: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
}

impl Default for StyleBounds {
    fn default() -> Self {
        Self {
            min_weight: 1.5,
            max_weight: 6.0,
            min_opacity: 0.4,
            max_opacity: 0.9,
        }
    }
}

/// Visual parameters for painting one province boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceStyle {
    pub fill_color: String,
    pub stroke_weight: f32,
    pub fill_opacity: f32,
}

/// Fixed region→fill-color table plus the neutral "no data" color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPalette {
    colors: HashMap<String, String>,
    neutral: String,
}

impl Default for RegionPalette {
    fn default() -> Self {
        let mut colors = HashMap::new();
        for &(region, color) in BUILTIN_REGION_COLORS {
            colors.insert(region.to_string(), color.to_string());
        }
        Self {
            colors,
            neutral: NEUTRAL_COLOR.to_string(),
        }
    }
}

impl RegionPalette {
    pub fn color_for(&self, region: &str) -> &str {
        self.colors
            .get(region)
            .map(String::as_str)
            .unwrap_or(&self.neutral)
    }

    pub fn neutral(&self) -> &str {
        &self.neutral
    }

    pub fn with_color<S: Into<String>>(mut self, region: S, color: S) -> Self {
        self.colors.insert(region.into(), color.into());
        self
    }

    pub fn with_neutral<S: Into<String>>(mut self, color: S) -> Self {
        self.neutral = color.into();
        self
    }
}

const NEUTRAL_COLOR: &str = "#9e9e9e";

const BUILTIN_REGION_COLORS: &[(&str, &str)] = &[
    ("Sumatera", "#e53935"),
    ("Jawa", "#2a6fef"),
    ("Kalimantan", "#43a047"),
    ("Sulawesi", "#fb8c00"),
    ("Bali Nusra", "#8e24aa"),
    ("Indonesia Timur", "#00897b"),
];

/// Engineer density of a province relative to the densest one, in [0, 1].
pub fn density_ratio(count: u32, max_count: u32) -> f32 {
    (count as f32 / max_count.max(1) as f32).clamp(0.0, 1.0)
}

/// Visual parameters for one province given the frame-wide maximum count.
///
/// Deterministic and monotonic: equal ratios always yield equal outputs,
/// and a denser province never gets a lighter stroke or lower opacity.
pub fn style_for(
    aggregate: &ProvinceAggregate,
    max_count: u32,
    bounds: &StyleBounds,
    palette: &RegionPalette,
) -> ProvinceStyle {
    if aggregate.total_count() == 0 {
        return ProvinceStyle {
            fill_color: palette.neutral().to_string(),
            stroke_weight: bounds.min_weight,
            fill_opacity: bounds.min_opacity,
        };
    }

    let ratio = density_ratio(aggregate.engineer_count, max_count);
    ProvinceStyle {
        fill_color: palette.color_for(&aggregate.region).to_string(),
        stroke_weight: bounds.min_weight + ratio * (bounds.max_weight - bounds.min_weight),
        fill_opacity: bounds.min_opacity + ratio * (bounds.max_opacity - bounds.min_opacity),
    }
}
