//! Debounced recomputation over immutable input snapshots.
//!
//! Input changes (records, alias table, style, viewport) never trigger
//! work directly; they schedule a recomputation behind a quiescence
//! window. Each run owns a snapshot of its inputs, builds a fresh
//! [`MapFrame`], and publishes it only if no newer generation has been
//! scheduled meanwhile; stale results are dropped, never interleaved.
//!
//! Time is injected by the caller, so the state machine is deterministic
//! and testable without sleeping.

use crate::aggregate::{aggregate_records, build_region_aggregates, max_engineer_count};
use crate::alias::AliasTable;
use crate::edge::{project_to_edge, EdgeProjection};
use crate::style::{style_for, ProvinceStyle, RegionPalette, StyleBounds};
use crate::types::{LatLng, LocationRecord, ProvinceAggregate, ProvinceKey, RegionKey};
use crate::viewport::{MapProjection, Viewport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default quiescence window before an expensive recomputation runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Plain-data tooltip content for one province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceTooltip {
    pub region: RegionKey,
    pub engineer_count: u32,
    pub machine_count: u32,
    pub contributing_labels: Vec<String>,
}

/// Everything the rendering layer needs to paint one province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceView {
    pub province_key: ProvinceKey,
    pub style: ProvinceStyle,
    pub centroid: Option<LatLng>,
    pub tooltip: ProvinceTooltip,
}

/// Legend row for one operational region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region_key: RegionKey,
    pub province_count: usize,
    pub distinct_area_label_count: usize,
    pub engineer_count: u32,
    pub machine_count: u32,
}

/// One published generation of derived map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub generation: u64,
    pub record_count: usize,
    /// Province views, densest first.
    pub provinces: Vec<ProvinceView>,
    /// Region legend rows in key order.
    pub regions: Vec<RegionSummary>,
}

/// Sink for published frames, implemented by the rendering collaborator.
pub trait FramePublisher {
    fn publish(&mut self, frame: &MapFrame);
}

/// An edge projection tagged with the viewport generation it was computed
/// against. Callers discard indicators whose generation has been
/// superseded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerIndicator {
    pub viewport_generation: u64,
    pub edge: EdgeProjection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Scheduled,
    Computing,
}

/// Reactive glue above the aggregation and projection pipelines.
pub struct RecomputeController {
    state: ControllerState,
    debounce: Duration,
    deadline: Option<Instant>,
    generation: u64,
    viewport_generation: u64,
    records: Arc<Vec<LocationRecord>>,
    aliases: Arc<AliasTable>,
    bounds: StyleBounds,
    palette: RegionPalette,
    viewport: Option<Viewport>,
}

impl RecomputeController {
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            state: ControllerState::Idle,
            debounce: DEFAULT_DEBOUNCE,
            deadline: None,
            generation: 0,
            viewport_generation: 0,
            records: Arc::new(Vec::new()),
            aliases: Arc::new(aliases),
            bounds: StyleBounds::default(),
            palette: RegionPalette::default(),
            viewport: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_style_bounds(mut self, bounds: StyleBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_palette(mut self, palette: RegionPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport_generation(&self) -> u64 {
        self.viewport_generation
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Replace the record set and schedule a recomputation.
    pub fn set_records(&mut self, records: Vec<LocationRecord>, now: Instant) {
        self.records = Arc::new(records);
        self.schedule(now);
    }

    /// Swap in a freshly loaded alias table and schedule a full
    /// recomputation. Reloading is always explicit; the table is never
    /// mutated in place.
    pub fn reload_aliases(&mut self, aliases: AliasTable, now: Instant) {
        self.aliases = Arc::new(aliases);
        self.schedule(now);
    }

    pub fn set_style_bounds(&mut self, bounds: StyleBounds, now: Instant) {
        self.bounds = bounds;
        self.schedule(now);
    }

    pub fn set_palette(&mut self, palette: RegionPalette, now: Instant) {
        self.palette = palette;
        self.schedule(now);
    }

    /// Install a new viewport snapshot. Supersedes all indicators computed
    /// against earlier viewports and schedules a recomputation.
    pub fn set_viewport(&mut self, viewport: Viewport, now: Instant) {
        self.viewport = Some(viewport);
        self.viewport_generation += 1;
        self.schedule(now);
    }

    /// Project one marker against the current viewport. Cheap enough to
    /// call per frame; the returned indicator carries the viewport
    /// generation so stale results can be discarded.
    pub fn project_marker<P: MapProjection>(
        &self,
        projection: &P,
        target: LatLng,
    ) -> Option<MarkerIndicator> {
        let viewport = self.viewport.as_ref()?;
        Some(MarkerIndicator {
            viewport_generation: self.viewport_generation,
            edge: project_to_edge(viewport, projection, target),
        })
    }

    pub fn indicator_is_current(&self, indicator: &MarkerIndicator) -> bool {
        indicator.viewport_generation == self.viewport_generation
    }

    /// Drive the state machine. Publishes at most one frame, and only
    /// when the debounce window has elapsed with no further changes.
    /// Returns true when a frame was published.
    pub fn poll(&mut self, now: Instant, publisher: &mut dyn FramePublisher) -> bool {
        if self.state != ControllerState::Scheduled {
            return false;
        }
        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => return false,
        };
        if now < deadline {
            return false;
        }

        // snapshot the inputs this generation will run against
        let generation = self.generation;
        let records = Arc::clone(&self.records);
        let aliases = Arc::clone(&self.aliases);
        self.state = ControllerState::Computing;

        let frame = compute_frame(generation, &records, &aliases, &self.bounds, &self.palette);

        // a change that arrived during the run wins; its own deadline is
        // already ticking and this frame is stale
        if self.generation != generation {
            return false;
        }

        log::info!(
            "Publishing map frame generation {} ({} records, {} provinces)",
            frame.generation,
            frame.record_count,
            frame.provinces.len()
        );
        publisher.publish(&frame);
        self.deadline = None;
        self.state = ControllerState::Idle;
        true
    }

    fn schedule(&mut self, now: Instant) {
        self.generation += 1;
        self.deadline = Some(now + self.debounce);
        self.state = ControllerState::Scheduled;
        log::debug!("Recomputation scheduled, generation {}", self.generation);
    }
}

/// Run the full derivation pipeline against one input snapshot.
fn compute_frame(
    generation: u64,
    records: &[LocationRecord],
    aliases: &AliasTable,
    bounds: &StyleBounds,
    palette: &RegionPalette,
) -> MapFrame {
    let provinces = aggregate_records(records, aliases);
    let max_count = max_engineer_count(&provinces);
    let regions = build_region_aggregates(&provinces);

    let mut ordered: Vec<&ProvinceAggregate> = provinces.values().collect();
    ordered.sort_by(|a, b| {
        b.total_count()
            .cmp(&a.total_count())
            .then_with(|| a.province_key.cmp(&b.province_key))
    });

    let views = ordered
        .into_iter()
        .map(|aggregate| ProvinceView {
            province_key: aggregate.province_key.clone(),
            style: style_for(aggregate, max_count, bounds, palette),
            centroid: aggregate.centroid(),
            tooltip: ProvinceTooltip {
                region: aggregate.region.clone(),
                engineer_count: aggregate.engineer_count,
                machine_count: aggregate.machine_count,
                contributing_labels: aggregate.contributing_labels.iter().cloned().collect(),
            },
        })
        .collect();

    let summaries = regions
        .iter()
        .map(|region| RegionSummary {
            region_key: region.region_key.clone(),
            province_count: region.provinces.len(),
            distinct_area_label_count: region.distinct_area_label_count,
            engineer_count: region.engineer_count,
            machine_count: region.machine_count,
        })
        .collect();

    MapFrame {
        generation,
        record_count: records.len(),
        provinces: views,
        regions: summaries,
    }
}
