//! Per-session state: the projected records of one load plus lazily derived
//! views over them. Owned by the caller; there is no shared cache.
use crate::projection::{DisplayRecord, project_batch};
use crate::venue_key::{VenueGroup, group_by_venue};
use crate::window::{DateWindow, SearchCriteria, SpatialPredicate, filter, filter_by_criteria};
use crate::{GeoBounds, GeoPoint};
use log::info;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct DiscoverySession {
    records: Vec<DisplayRecord>,
    skipped: usize,
    venue_groups: Option<Vec<VenueGroup>>,
}

impl DiscoverySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session contents with a freshly projected batch.
    pub fn load(&mut self, raw: &Value) {
        let batch = project_batch(raw);
        info!(
            "loaded {} matches ({} skipped)",
            batch.records.len(),
            batch.skipped
        );
        self.records = batch.records;
        self.skipped = batch.skipped;
        self.venue_groups = None;
    }

    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Venue pins over every loaded record, computed once per load.
    pub fn venue_groups(&mut self) -> &[VenueGroup] {
        let records = &self.records;
        self.venue_groups.get_or_insert_with(|| group_by_venue(records))
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Vec<&DisplayRecord> {
        filter_by_criteria(&self.records, criteria)
    }

    pub fn in_view(&self, window: &DateWindow, spatial: Option<&SpatialPredicate>) -> Vec<&DisplayRecord> {
        filter(&self.records, window, spatial)
    }

    /// Bounds around every venue with a known location.
    pub fn extent(&self) -> Option<GeoBounds> {
        let points: Vec<GeoPoint> = self
            .records
            .iter()
            .filter_map(|r| r.fixture.venue.coordinates)
            .collect();
        GeoBounds::enclosing(&points)
    }
}
