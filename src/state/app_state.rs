use crate::app::MenuItem;
use match_discovery::MapRegion;
use match_discovery::projection::DisplayRecord;
use match_discovery::session::DiscoverySession;
use match_discovery::tracker::RegionTracker;
use match_discovery::venue_key::VenueGroup;
use match_discovery::window::DateWindow;
use std::time::Duration;

/// Shown until a batch with at least one located venue arrives.
pub const EUROPE: MapRegion = MapRegion {
    center_lat: 50.0,
    center_lng: 10.0,
    lat_span: 30.0,
    lng_span: 50.0,
};

// ---------------------------------------------------------------------------
// Match list state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchListState {
    /// Matches inside the date window (and the settled viewport when the
    /// spatial filter is on), in input order.
    pub visible: Vec<DisplayRecord>,
    /// Venue pins over `visible`.
    pub pins: Vec<VenueGroup>,
    pub selected: usize,
    pub scroll_offset: u16,
}

impl MatchListState {
    /// Swap in a new result set, keeping the selection on the same match when
    /// it is still visible.
    pub fn replace(&mut self, visible: Vec<DisplayRecord>, pins: Vec<VenueGroup>) {
        let selected_id = self.selected_record().map(|r| r.id.clone());
        self.visible = visible;
        self.pins = pins;
        self.selected = selected_id
            .and_then(|id| self.visible.iter().position(|r| r.id == id))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    pub fn selected_record(&self) -> Option<&DisplayRecord> {
        self.visible.get(self.selected)
    }

    pub fn select_next(&mut self) {
        let max = self.visible.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn unlocated_count(&self) -> usize {
        self.visible
            .iter()
            .filter(|r| r.fixture.venue.coordinates.is_none())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Top-level state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub session: DiscoverySession,
    pub tracker: RegionTracker,
    pub window: DateWindow,
    /// Restrict the list to the settled viewport.
    pub spatial_filter: bool,
    pub list: MatchListState,
    /// Where the loaded records came from (file path or "demo data").
    pub source_label: Option<String>,
    /// The settled viewport crosses the antimeridian or a pole.
    pub unsupported_viewport: bool,
}

impl AppState {
    pub fn new(window: DateWindow, settle_after: Duration) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            last_error: None,
            session: DiscoverySession::new(),
            tracker: RegionTracker::new(EUROPE, settle_after),
            window,
            spatial_filter: true,
            list: MatchListState::default(),
            source_label: None,
            unsupported_viewport: false,
        }
    }
}
