//! Canonicalization of free-text area labels to province keys.
//!
//! Field records carry hand-entered area labels ("Jakarta Selatan",
//! "D.I Aceh", "Surabaya 1") that must be folded onto canonical province
//! keys before aggregation. The table is immutable configuration, built
//! once at startup; reloading it is an explicit operation that triggers a
//! full recomputation.

use crate::types::{ProvinceKey, RegionKey, UNKNOWN_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading an alias table from disk.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("Failed to read alias table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse alias table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid alias entry: {0}")]
    Invalid(String),
}

pub type AliasResult<T> = Result<T, AliasError>;

/// Normalize a free-text area label for table lookup.
///
/// Uppercases, strips internal punctuation, collapses whitespace runs,
/// and unifies the "Daerah Istimewa" / "D.I." special-region spellings on
/// a single `DI` token. Idempotent: normalizing an already-normalized
/// label is a no-op.
pub fn normalize_label(raw: &str) -> String {
    let mut upper = raw.trim().to_uppercase();
    upper.retain(|c| !matches!(c, '.' | ',' | '\''));
    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");

    for prefix in ["DAERAH ISTIMEWA ", "D I "] {
        if let Some(rest) = collapsed.strip_prefix(prefix) {
            return format!("DI {}", rest);
        }
    }
    collapsed
}

/// One label→province pair as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub label: String,
    pub province: String,
}

/// One canonical province registration as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceEntry {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Default, Deserialize)]
struct AliasTableFile {
    #[serde(default)]
    provinces: Vec<ProvinceEntry>,
    #[serde(default)]
    entries: Vec<AliasEntry>,
}

/// Immutable many-to-one mapping from normalized area labels to canonical
/// province keys, with each canonical province's operational region.
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, ProvinceKey>,
    regions: HashMap<ProvinceKey, RegionKey>,
}

impl AliasTable {
    /// An empty table. Every label resolves to itself.
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
            regions: HashMap::new(),
        }
    }

    /// The builtin table covering the Indonesian provinces and the area
    /// labels that show up in field records.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for &(name, region) in BUILTIN_PROVINCES {
            table.insert_province(name, region);
        }
        for &(label, province) in BUILTIN_ALIASES {
            table.insert_alias(label, province);
        }
        table
    }

    /// Load the builtin table with additional provinces and aliases merged
    /// from a TOML file.
    pub fn load_from_file(path: &Path) -> AliasResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: AliasTableFile = toml::from_str(&content)?;

        let mut table = Self::builtin();
        table.merge_provinces(&file.provinces)?;
        table.merge_entries(&file.entries)?;
        log::info!(
            "Loaded alias table from {} ({} aliases, {} provinces)",
            path.display(),
            table.aliases.len(),
            table.regions.len()
        );
        Ok(table)
    }

    /// Merge additional label→province pairs over this table.
    pub fn with_entries(mut self, entries: &[AliasEntry]) -> AliasResult<Self> {
        self.merge_entries(entries)?;
        Ok(self)
    }

    /// Register a canonical province and its operational region.
    pub fn with_province<S: Into<String>>(mut self, name: S, region: S) -> Self {
        let name = name.into();
        let region = region.into();
        self.insert_province(&name, &region);
        self
    }

    /// Resolve a raw area label to its canonical province key.
    ///
    /// Total over all strings: an unmatched label becomes its own province
    /// (trimmed, case preserved) so no record is ever dropped, and an empty
    /// label lands in the reserved `Unknown` bucket.
    pub fn resolve(&self, raw: &str) -> ProvinceKey {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return UNKNOWN_KEY.to_string();
        }
        match self.aliases.get(&normalize_label(trimmed)) {
            Some(key) => key.clone(),
            None => trimmed.to_string(),
        }
    }

    /// Operational region of a canonical province, if registered.
    pub fn region_of(&self, province: &str) -> Option<&str> {
        self.regions.get(province).map(String::as_str)
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn province_count(&self) -> usize {
        self.regions.len()
    }

    fn insert_province(&mut self, name: &str, region: &str) {
        // a canonical name must also resolve to itself
        self.aliases
            .insert(normalize_label(name), name.to_string());
        self.regions.insert(name.to_string(), region.to_string());
    }

    fn insert_alias(&mut self, label: &str, province: &str) {
        self.aliases
            .insert(normalize_label(label), province.to_string());
    }

    fn merge_provinces(&mut self, provinces: &[ProvinceEntry]) -> AliasResult<()> {
        for entry in provinces {
            if entry.name.trim().is_empty() || entry.region.trim().is_empty() {
                return Err(AliasError::Invalid(format!(
                    "province registration must name both province and region, got {:?}/{:?}",
                    entry.name, entry.region
                )));
            }
            self.insert_province(entry.name.trim(), entry.region.trim());
        }
        Ok(())
    }

    fn merge_entries(&mut self, entries: &[AliasEntry]) -> AliasResult<()> {
        for entry in entries {
            if entry.label.trim().is_empty() || entry.province.trim().is_empty() {
                return Err(AliasError::Invalid(format!(
                    "alias entry must name both label and province, got {:?}/{:?}",
                    entry.label, entry.province
                )));
            }
            self.insert_alias(entry.label.trim(), entry.province.trim());
        }
        Ok(())
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Canonical provinces and their operational regions.
const BUILTIN_PROVINCES: &[(&str, &str)] = &[
    ("DI ACEH", "Sumatera"),
    ("SUMATERA UTARA", "Sumatera"),
    ("SUMATERA BARAT", "Sumatera"),
    ("RIAU", "Sumatera"),
    ("KEPULAUAN RIAU", "Sumatera"),
    ("JAMBI", "Sumatera"),
    ("SUMATERA SELATAN", "Sumatera"),
    ("BENGKULU", "Sumatera"),
    ("LAMPUNG", "Sumatera"),
    ("KEPULAUAN BANGKA BELITUNG", "Sumatera"),
    ("DKI JAKARTA", "Jawa"),
    ("BANTEN", "Jawa"),
    ("JAWA BARAT", "Jawa"),
    ("JAWA TENGAH", "Jawa"),
    ("DI YOGYAKARTA", "Jawa"),
    ("JAWA TIMUR", "Jawa"),
    ("KALIMANTAN BARAT", "Kalimantan"),
    ("KALIMANTAN TENGAH", "Kalimantan"),
    ("KALIMANTAN SELATAN", "Kalimantan"),
    ("KALIMANTAN TIMUR", "Kalimantan"),
    ("KALIMANTAN UTARA", "Kalimantan"),
    ("SULAWESI UTARA", "Sulawesi"),
    ("GORONTALO", "Sulawesi"),
    ("SULAWESI TENGAH", "Sulawesi"),
    ("SULAWESI BARAT", "Sulawesi"),
    ("SULAWESI SELATAN", "Sulawesi"),
    ("SULAWESI TENGGARA", "Sulawesi"),
    ("BALI", "Bali Nusra"),
    ("NUSA TENGGARA BARAT", "Bali Nusra"),
    ("NUSA TENGGARA TIMUR", "Bali Nusra"),
    ("MALUKU", "Indonesia Timur"),
    ("MALUKU UTARA", "Indonesia Timur"),
    ("PAPUA", "Indonesia Timur"),
    ("PAPUA BARAT", "Indonesia Timur"),
];

/// Area labels observed in field records, mapped to canonical provinces.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("ACEH", "DI ACEH"),
    ("BANDA ACEH", "DI ACEH"),
    ("NANGGROE ACEH DARUSSALAM", "DI ACEH"),
    ("NAD", "DI ACEH"),
    ("MEDAN", "SUMATERA UTARA"),
    ("PADANG", "SUMATERA BARAT"),
    ("PEKANBARU", "RIAU"),
    ("BATAM", "KEPULAUAN RIAU"),
    ("TANJUNG PINANG", "KEPULAUAN RIAU"),
    ("PALEMBANG", "SUMATERA SELATAN"),
    ("BANDAR LAMPUNG", "LAMPUNG"),
    ("PANGKAL PINANG", "KEPULAUAN BANGKA BELITUNG"),
    ("BANGKA BELITUNG", "KEPULAUAN BANGKA BELITUNG"),
    ("JAKARTA", "DKI JAKARTA"),
    ("JAKARTA PUSAT", "DKI JAKARTA"),
    ("JAKARTA SELATAN", "DKI JAKARTA"),
    ("JAKARTA BARAT", "DKI JAKARTA"),
    ("JAKARTA TIMUR", "DKI JAKARTA"),
    ("JAKARTA UTARA", "DKI JAKARTA"),
    ("TANGERANG", "BANTEN"),
    ("SERANG", "BANTEN"),
    ("CILEGON", "BANTEN"),
    ("BANDUNG", "JAWA BARAT"),
    ("BEKASI", "JAWA BARAT"),
    ("BOGOR", "JAWA BARAT"),
    ("DEPOK", "JAWA BARAT"),
    ("KARAWANG", "JAWA BARAT"),
    ("CIREBON", "JAWA BARAT"),
    ("SEMARANG", "JAWA TENGAH"),
    ("SURAKARTA", "JAWA TENGAH"),
    ("SOLO", "JAWA TENGAH"),
    ("PURWOKERTO", "JAWA TENGAH"),
    ("YOGYAKARTA", "DI YOGYAKARTA"),
    ("JOGJA", "DI YOGYAKARTA"),
    ("JOGJAKARTA", "DI YOGYAKARTA"),
    ("SURABAYA", "JAWA TIMUR"),
    ("SURABAYA 1", "JAWA TIMUR"),
    ("SURABAYA 2", "JAWA TIMUR"),
    ("MALANG", "JAWA TIMUR"),
    ("SIDOARJO", "JAWA TIMUR"),
    ("GRESIK", "JAWA TIMUR"),
    ("KEDIRI", "JAWA TIMUR"),
    ("PONTIANAK", "KALIMANTAN BARAT"),
    ("PALANGKA RAYA", "KALIMANTAN TENGAH"),
    ("BANJARMASIN", "KALIMANTAN SELATAN"),
    ("BALIKPAPAN", "KALIMANTAN TIMUR"),
    ("SAMARINDA", "KALIMANTAN TIMUR"),
    ("TARAKAN", "KALIMANTAN UTARA"),
    ("MANADO", "SULAWESI UTARA"),
    ("PALU", "SULAWESI TENGAH"),
    ("MAKASSAR", "SULAWESI SELATAN"),
    ("UJUNG PANDANG", "SULAWESI SELATAN"),
    ("KENDARI", "SULAWESI TENGGARA"),
    ("DENPASAR", "BALI"),
    ("MATARAM", "NUSA TENGGARA BARAT"),
    ("LOMBOK", "NUSA TENGGARA BARAT"),
    ("KUPANG", "NUSA TENGGARA TIMUR"),
    ("AMBON", "MALUKU"),
    ("TERNATE", "MALUKU UTARA"),
    ("JAYAPURA", "PAPUA"),
    ("SORONG", "PAPUA BARAT"),
    ("MANOKWARI", "PAPUA BARAT"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_label("Jakarta Selatan"), "JAKARTA SELATAN");
        assert_eq!(normalize_label("  bandung,  "), "BANDUNG");
        assert_eq!(normalize_label("D.I. Yogyakarta"), "DI YOGYAKARTA");
    }

    #[test]
    fn test_normalize_unifies_special_region_spellings() {
        assert_eq!(normalize_label("DI. ACEH"), "DI ACEH");
        assert_eq!(normalize_label("D.I ACEH"), "DI ACEH");
        assert_eq!(normalize_label("D. I. ACEH"), "DI ACEH");
        assert_eq!(normalize_label("DAERAH ISTIMEWA ACEH"), "DI ACEH");
        assert_eq!(normalize_label("Daerah Istimewa Yogyakarta"), "DI YOGYAKARTA");
    }

    #[test]
    fn test_alias_equivalence() {
        let table = AliasTable::builtin();
        let a = table.resolve("DI. ACEH");
        let b = table.resolve("D.I ACEH");
        let c = table.resolve("DAERAH ISTIMEWA ACEH");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a, "DI ACEH");
    }

    #[test]
    fn test_city_labels_resolve_to_provinces() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve("Jakarta Pusat"), "DKI JAKARTA");
        assert_eq!(table.resolve("Jakarta Selatan"), "DKI JAKARTA");
        assert_eq!(table.resolve("Surabaya"), "JAWA TIMUR");
        assert_eq!(table.resolve("surabaya 1"), "JAWA TIMUR");
    }

    #[test]
    fn test_unresolved_label_becomes_its_own_province() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve("  Atlantis Utara "), "Atlantis Utara");
    }

    #[test]
    fn test_empty_label_resolves_to_unknown() {
        let table = AliasTable::builtin();
        assert_eq!(table.resolve(""), UNKNOWN_KEY);
        assert_eq!(table.resolve("   "), UNKNOWN_KEY);
    }

    #[test]
    fn test_region_lookup() {
        let table = AliasTable::builtin();
        assert_eq!(table.region_of("DKI JAKARTA"), Some("Jawa"));
        assert_eq!(table.region_of("DI ACEH"), Some("Sumatera"));
        assert_eq!(table.region_of("Atlantis Utara"), None);
    }

    #[test]
    fn test_merged_entries_override_builtin() {
        let table = AliasTable::builtin()
            .with_entries(&[AliasEntry {
                label: "Surabaya 3".to_string(),
                province: "JAWA TIMUR".to_string(),
            }])
            .unwrap();
        assert_eq!(table.resolve("SURABAYA 3"), "JAWA TIMUR");
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let result = AliasTable::builtin().with_entries(&[AliasEntry {
            label: "  ".to_string(),
            province: "JAWA TIMUR".to_string(),
        }]);
        assert!(matches!(result, Err(AliasError::Invalid(_))));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_label(&raw);
            let twice = normalize_label(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_resolve_is_total(raw in "\\PC{0,40}") {
            let table = AliasTable::builtin();
            let key = table.resolve(&raw);
            prop_assert!(!key.is_empty());
        }
    }
}
