//! Hierarchical aggregation of location records into province- and
//! region-level summaries.
//!
//! Aggregates are value objects rebuilt wholesale on every run: the
//! builder accumulates into a fresh map and is consumed by [`AggregateBuilder::build`],
//! so no aggregate state survives across recomputations.

use crate::alias::AliasTable;
use crate::types::{
    LocationRecord, ProvinceAggregate, ProvinceKey, RegionAggregate, ResourceKind, UNKNOWN_KEY,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Accumulates records into per-province buckets for one recomputation run.
pub struct AggregateBuilder<'a> {
    aliases: &'a AliasTable,
    provinces: HashMap<ProvinceKey, ProvinceAggregate>,
}

impl<'a> AggregateBuilder<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self {
            aliases,
            provinces: HashMap::new(),
        }
    }

    /// Fold one record into its province bucket.
    ///
    /// Every record lands in exactly one bucket: labels the alias table
    /// cannot resolve become singleton provinces of themselves.
    pub fn add_record(&mut self, record: &LocationRecord) {
        let province_key = self.aliases.resolve(&record.raw_label);
        let region = self.region_for(&province_key, record);

        let bucket = self
            .provinces
            .entry(province_key.clone())
            .or_insert_with(|| ProvinceAggregate::new(province_key, region));

        match record.kind {
            ResourceKind::Engineer => bucket.engineer_count += 1,
            ResourceKind::Machine => bucket.machine_count += 1,
        }

        if let Some(point) = record.coordinate() {
            bucket.record_coordinate(point);
        }

        bucket
            .contributing_labels
            .insert(record.raw_label.trim().to_string());
    }

    pub fn add_records<'b, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'b LocationRecord>,
    {
        for record in records {
            self.add_record(record);
        }
    }

    /// Consume the builder and yield the finished province map.
    pub fn build(self) -> HashMap<ProvinceKey, ProvinceAggregate> {
        self.provinces
    }

    /// Region bucket for a province: the alias table's registration wins,
    /// then the record's own region label, then the reserved bucket.
    fn region_for(&self, province_key: &str, record: &LocationRecord) -> String {
        if let Some(region) = self.aliases.region_of(province_key) {
            return region.to_string();
        }
        let label = record.region_label.trim();
        if label.is_empty() {
            UNKNOWN_KEY.to_string()
        } else {
            label.to_string()
        }
    }
}

/// Aggregate a full record set into province buckets.
pub fn aggregate_records(
    records: &[LocationRecord],
    aliases: &AliasTable,
) -> HashMap<ProvinceKey, ProvinceAggregate> {
    let mut builder = AggregateBuilder::new(aliases);
    builder.add_records(records.iter());
    let provinces = builder.build();
    log::debug!(
        "Aggregated {} records into {} provinces",
        records.len(),
        provinces.len()
    );
    provinces
}

/// Derive the region level from finished province aggregates.
///
/// Regions are keyed on the provinces' `region` field; the distinct-label
/// count is the union of raw labels across the region, not a province
/// count. Regions come back in key order, provinces within a region
/// densest first.
pub fn build_region_aggregates(
    provinces: &HashMap<ProvinceKey, ProvinceAggregate>,
) -> Vec<RegionAggregate> {
    let mut grouped: BTreeMap<&str, Vec<&ProvinceAggregate>> = BTreeMap::new();
    for aggregate in provinces.values() {
        grouped
            .entry(aggregate.region.as_str())
            .or_default()
            .push(aggregate);
    }

    grouped
        .into_iter()
        .map(|(region_key, mut members)| {
            members.sort_by(|a, b| {
                b.total_count()
                    .cmp(&a.total_count())
                    .then_with(|| a.province_key.cmp(&b.province_key))
            });

            let labels: BTreeSet<&str> = members
                .iter()
                .flat_map(|p| p.contributing_labels.iter().map(String::as_str))
                .collect();

            RegionAggregate {
                region_key: region_key.to_string(),
                distinct_area_label_count: labels.len(),
                engineer_count: members.iter().map(|p| p.engineer_count).sum(),
                machine_count: members.iter().map(|p| p.machine_count).sum(),
                provinces: members.into_iter().cloned().collect(),
            }
        })
        .collect()
}

/// Largest engineer count across all provinces, the normalization point
/// for density styling.
pub fn max_engineer_count(provinces: &HashMap<ProvinceKey, ProvinceAggregate>) -> u32 {
    provinces
        .values()
        .map(|p| p.engineer_count)
        .max()
        .unwrap_or(0)
}
