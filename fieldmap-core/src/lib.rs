//! FieldMap Core Library
//!
//! Geospatial aggregation and viewport projection for field-service
//! operations maps: canonicalizes free-text area labels, folds engineer
//! and machine records into province and region aggregates, derives
//! density-based boundary styling, and projects off-screen markers onto
//! the viewport edge. Rendering and data loading are external
//! collaborators consumed through plain data contracts.

pub mod types;
pub mod alias;
pub mod aggregate;
pub mod style;
pub mod viewport;
pub mod edge;
pub mod controller;
pub mod config;

// Re-export commonly used types and functions
pub use types::{
    EngineerRecord, LatLng, LocationRecord, MachineRecord, PixelPoint, ProvinceAggregate,
    RegionAggregate, ResourceKind, UNKNOWN_KEY,
};
pub use alias::{normalize_label, AliasEntry, AliasError, AliasTable};
pub use aggregate::{
    aggregate_records, build_region_aggregates, max_engineer_count, AggregateBuilder,
};
pub use style::{density_ratio, style_for, ProvinceStyle, RegionPalette, StyleBounds};
pub use viewport::{GeoBounds, LinearProjection, MapProjection, Viewport};
pub use edge::{project_to_edge, EdgeProjection};
pub use controller::{
    ControllerState, FramePublisher, MapFrame, MarkerIndicator, ProvinceTooltip, ProvinceView,
    RecomputeController, RegionSummary, DEFAULT_DEBOUNCE,
};
pub use config::EngineConfig;

/// Version information for the FieldMap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
