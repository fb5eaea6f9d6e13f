//! Engine configuration.
//!
//! Supports loading configuration from fieldmap.toml files, with working
//! defaults for every field so an empty file (or no file) is valid.

use crate::alias::{AliasEntry, AliasTable, ProvinceEntry};
use crate::controller::RecomputeController;
use crate::style::{RegionPalette, StyleBounds};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub recompute: RecomputeConfig,

    #[serde(default)]
    pub alias: AliasConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Stroke weight painted on the sparsest province
    #[serde(default = "default_min_weight")]
    pub min_weight: f32,

    /// Stroke weight painted on the densest province
    #[serde(default = "default_max_weight")]
    pub max_weight: f32,

    /// Fill opacity of the sparsest province
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f32,

    /// Fill opacity of the densest province
    #[serde(default = "default_max_opacity")]
    pub max_opacity: f32,

    /// Fill color for provinces with no data at all
    #[serde(default = "default_neutral_color")]
    pub neutral_color: String,

    /// Region color overrides merged over the builtin palette
    #[serde(default)]
    pub region_colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeConfig {
    /// Quiescence window before an aggregation run, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Additional canonical provinces merged over the builtin table
    #[serde(default)]
    pub provinces: Vec<ProvinceEntry>,

    /// Additional label→province aliases merged over the builtin table
    #[serde(default)]
    pub entries: Vec<AliasEntry>,
}

// Default value functions
fn default_min_weight() -> f32 { 1.5 }
fn default_max_weight() -> f32 { 6.0 }
fn default_min_opacity() -> f32 { 0.4 }
fn default_max_opacity() -> f32 { 0.9 }
fn default_neutral_color() -> String { "#9e9e9e".to_string() }
fn default_debounce_ms() -> u64 { 300 }

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
            min_opacity: default_min_opacity(),
            max_opacity: default_max_opacity(),
            neutral_color: default_neutral_color(),
            region_colors: HashMap::new(),
        }
    }
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            recompute: RecomputeConfig::default(),
            alias: AliasConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find fieldmap.toml in current directory
                let default_path = PathBuf::from("fieldmap.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: fieldmap.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config)
            .expect("Failed to serialize default configuration")
    }

    /// Reject bound orderings the style mapper cannot interpolate over.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.style.min_weight <= self.style.max_weight,
            "style.min_weight must not exceed style.max_weight"
        );
        anyhow::ensure!(
            self.style.min_opacity <= self.style.max_opacity,
            "style.min_opacity must not exceed style.max_opacity"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.style.min_opacity)
                && (0.0..=1.0).contains(&self.style.max_opacity),
            "opacities must lie within [0, 1]"
        );
        Ok(())
    }

    pub fn style_bounds(&self) -> StyleBounds {
        StyleBounds {
            min_weight: self.style.min_weight,
            max_weight: self.style.max_weight,
            min_opacity: self.style.min_opacity,
            max_opacity: self.style.max_opacity,
        }
    }

    pub fn palette(&self) -> RegionPalette {
        let mut palette = RegionPalette::default().with_neutral(self.style.neutral_color.clone());
        for (region, color) in &self.style.region_colors {
            palette = palette.with_color(region.clone(), color.clone());
        }
        palette
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.recompute.debounce_ms)
    }

    /// Assemble the configured alias table: builtin plus this file's
    /// province registrations and alias entries.
    pub fn alias_table(&self) -> Result<AliasTable> {
        let mut table = AliasTable::builtin();
        for province in &self.alias.provinces {
            table = table.with_province(province.name.clone(), province.region.clone());
        }
        table
            .with_entries(&self.alias.entries)
            .context("Invalid alias configuration")
    }

    /// Build a recomputation controller from this configuration.
    pub fn build_controller(&self) -> Result<RecomputeController> {
        self.validate()?;
        Ok(RecomputeController::new(self.alias_table()?)
            .with_debounce(self.debounce())
            .with_style_bounds(self.style_bounds())
            .with_palette(self.palette()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.style.min_weight, 1.5);
        assert_eq!(config.style.max_weight, 6.0);
        assert_eq!(config.recompute.debounce_ms, 300);
        assert!(config.alias.entries.is_empty());
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let config = EngineConfig::default();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = EngineConfig::load_from_file(temp_file.path())?;

        assert_eq!(config.style.min_weight, loaded_config.style.min_weight);
        assert_eq!(config.style.neutral_color, loaded_config.style.neutral_color);
        assert_eq!(config.recompute.debounce_ms, loaded_config.recompute.debounce_ms);

        Ok(())
    }

    #[test]
    fn test_example_toml_generation() {
        let example = EngineConfig::example_toml();
        assert!(example.contains("[style]"));
        assert!(example.contains("[recompute]"));
        assert!(example.contains("[alias]"));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() -> Result<()> {
        let config: EngineConfig = toml::from_str(
            r#"
            [recompute]
            debounce_ms = 150
        "#,
        )?;
        assert_eq!(config.recompute.debounce_ms, 150);
        assert_eq!(config.style.min_weight, 1.5);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = EngineConfig::default();
        config.style.min_weight = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_palette_overrides_from_config() {
        let mut config = EngineConfig::default();
        config
            .style
            .region_colors
            .insert("Jawa".to_string(), "#112233".to_string());
        config.style.neutral_color = "#000000".to_string();

        let palette = config.palette();
        assert_eq!(palette.color_for("Jawa"), "#112233");
        assert_eq!(palette.neutral(), "#000000");
    }

    #[test]
    fn test_configured_aliases_resolve() -> Result<()> {
        let config: EngineConfig = toml::from_str(
            r#"
            [[alias.entries]]
            label = "Kota Wisata"
            province = "JAWA BARAT"
        "#,
        )?;
        let table = config.alias_table()?;
        assert_eq!(table.resolve("kota wisata"), "JAWA BARAT");
        Ok(())
    }

    #[test]
    fn test_build_controller_from_config() -> Result<()> {
        let config = EngineConfig::default();
        let controller = config.build_controller()?;
        assert_eq!(controller.generation(), 0);
        Ok(())
    }
}
