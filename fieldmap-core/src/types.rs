use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type ProvinceKey = String;
pub type RegionKey = String;

/// Reserved bucket for records whose label or region cannot be resolved.
pub const UNKNOWN_KEY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// A coordinate is usable only when both components are finite and
    /// inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Engineer,
    Machine,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Engineer => write!(f, "engineer"),
            ResourceKind::Machine => write!(f, "machine"),
        }
    }
}

/// A field engineer as delivered by the data-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineerRecord {
    pub id: String,
    pub area_group: String,
    pub region: String,
    pub vendor: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// An installed machine as delivered by the data-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub area_group: String,
    pub customer: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Unified input to the aggregator. Both resource populations are folded
/// through this one shape so the aggregation path stays single.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub kind: ResourceKind,
    pub raw_label: String,
    pub region_label: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationRecord {
    pub fn new<S: Into<String>>(kind: ResourceKind, raw_label: S) -> Self {
        Self {
            kind,
            raw_label: raw_label.into(),
            region_label: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region_label = region.into();
        self
    }

    pub fn with_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lng);
        self
    }

    /// Coordinate of the record, if both components are present and valid.
    /// Malformed values count as absent, never as errors.
    pub fn coordinate(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                let point = LatLng::new(lat, lng);
                if point.is_valid() {
                    Some(point)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl From<EngineerRecord> for LocationRecord {
    fn from(record: EngineerRecord) -> Self {
        Self {
            kind: ResourceKind::Engineer,
            raw_label: record.area_group,
            region_label: record.region,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

impl From<MachineRecord> for LocationRecord {
    fn from(record: MachineRecord) -> Self {
        Self {
            kind: ResourceKind::Machine,
            raw_label: record.area_group,
            region_label: String::new(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

/// Per-province summary of both resource populations.
///
/// Rebuilt wholesale on every recomputation; never mutated across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceAggregate {
    pub province_key: ProvinceKey,
    pub region: RegionKey,
    pub contributing_labels: BTreeSet<String>,
    pub engineer_count: u32,
    pub machine_count: u32,
    pub lat_sum: f64,
    pub lng_sum: f64,
    pub valid_coord_count: u32,
}

impl ProvinceAggregate {
    pub fn new(province_key: ProvinceKey, region: RegionKey) -> Self {
        Self {
            province_key,
            region,
            contributing_labels: BTreeSet::new(),
            engineer_count: 0,
            machine_count: 0,
            lat_sum: 0.0,
            lng_sum: 0.0,
            valid_coord_count: 0,
        }
    }

    pub fn total_count(&self) -> u32 {
        self.engineer_count + self.machine_count
    }

    pub fn record_coordinate(&mut self, point: LatLng) {
        self.lat_sum += point.lat;
        self.lng_sum += point.lng;
        self.valid_coord_count += 1;
    }

    /// Mean position of the contributing coordinates. Undefined (None)
    /// when no record carried a usable coordinate.
    pub fn centroid(&self) -> Option<LatLng> {
        if self.valid_coord_count == 0 {
            return None;
        }
        let n = self.valid_coord_count as f64;
        Some(LatLng::new(self.lat_sum / n, self.lng_sum / n))
    }
}

/// Region-level rollup derived from the province aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region_key: RegionKey,
    /// Distinct raw area labels across the region, not distinct provinces.
    pub distinct_area_label_count: usize,
    pub engineer_count: u32,
    pub machine_count: u32,
    /// Member provinces, densest first.
    pub provinces: Vec<ProvinceAggregate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_requires_both_components() {
        let record = LocationRecord::new(ResourceKind::Engineer, "Surabaya");
        assert_eq!(record.coordinate(), None);

        let record = LocationRecord {
            latitude: Some(-7.25),
            ..record
        };
        assert_eq!(record.coordinate(), None);

        let record = LocationRecord {
            longitude: Some(112.75),
            ..record
        };
        assert_eq!(record.coordinate(), Some(LatLng::new(-7.25, 112.75)));
    }

    #[test]
    fn test_malformed_coordinates_are_absent() {
        let nan = LocationRecord::new(ResourceKind::Machine, "Medan").with_coordinate(f64::NAN, 98.67);
        assert_eq!(nan.coordinate(), None);

        let out_of_range = LocationRecord::new(ResourceKind::Machine, "Medan").with_coordinate(120.0, 98.67);
        assert_eq!(out_of_range.coordinate(), None);
    }

    #[test]
    fn test_centroid_undefined_without_coordinates() {
        let aggregate = ProvinceAggregate::new("DKI JAKARTA".to_string(), "Jawa".to_string());
        assert_eq!(aggregate.centroid(), None);
    }

    #[test]
    fn test_centroid_is_mean_of_recorded_points() {
        let mut aggregate = ProvinceAggregate::new("DKI JAKARTA".to_string(), "Jawa".to_string());
        aggregate.record_coordinate(LatLng::new(-6.1, 106.8));
        aggregate.record_coordinate(LatLng::new(-6.3, 107.0));

        let centroid = aggregate.centroid().unwrap();
        assert!((centroid.lat - -6.2).abs() < 1e-9);
        assert!((centroid.lng - 106.9).abs() < 1e-9);
    }

    #[test]
    fn test_engineer_record_conversion() {
        let engineer = EngineerRecord {
            id: "ENG-042".to_string(),
            area_group: "Jakarta Selatan".to_string(),
            region: "Jawa".to_string(),
            vendor: Some("PT Sinar".to_string()),
            latitude: Some(-6.26),
            longitude: Some(106.81),
        };

        let record: LocationRecord = engineer.into();
        assert_eq!(record.kind, ResourceKind::Engineer);
        assert_eq!(record.raw_label, "Jakarta Selatan");
        assert_eq!(record.region_label, "Jawa");
        assert!(record.coordinate().is_some());
    }
}
