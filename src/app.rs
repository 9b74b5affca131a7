use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, EUROPE};
use log::{debug, info};
use match_discovery::MapRegion;
use match_discovery::bounds::region_from_bounds;
use match_discovery::projection::DisplayRecord;
use match_discovery::tracker::RegionTracker;
use match_discovery::venue_key::group_by_venue;
use match_discovery::window::SpatialPredicate;
use serde_json::Value;
use tokio::time::Instant;

/// Fraction of the visible span moved by one pan key press.
pub const PAN_STEP: f64 = 0.25;
pub const ZOOM_IN: f64 = 0.5;
pub const ZOOM_OUT: f64 = 2.0;
/// Days moved by one window shift.
pub const WINDOW_STEP_DAYS: i64 = 7;

/// Margin added around the loaded venues, as a fraction of their extent.
const EXTENT_PADDING: f64 = 0.2;
/// Smallest initial span, in degrees. Keeps a single venue from producing a
/// zero-sized viewport.
const MIN_INITIAL_SPAN: f64 = 2.0;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    Venues,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let app = Self::with_settings(AppSettings::load());

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            state: AppState::new(settings.window, settings.settle_after),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Loader response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_matches_loaded(&mut self, raw: &Value, source: String) {
        self.state.last_error = None;
        self.state.session.load(raw);
        info!("matches from {source}: {} loaded", self.state.session.records().len());
        self.state.source_label = Some(source);

        let initial = self
            .state
            .session
            .extent()
            .and_then(|extent| region_from_bounds(&extent))
            .map(padded)
            .unwrap_or(EUROPE);
        debug!("initial viewport {initial:?}");
        self.state.tracker = RegionTracker::new(initial, self.settings.settle_after);
        self.refresh_visible();
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Viewport: every change goes through the tracker
    // -----------------------------------------------------------------------

    pub fn pan(&mut self, lat_fraction: f64, lng_fraction: f64) {
        let next = self.state.tracker.current_region().pan(lat_fraction, lng_fraction);
        self.state.tracker.set_region(next, Instant::now());
    }

    pub fn zoom(&mut self, factor: f64) {
        let next = self.state.tracker.current_region().zoom(factor);
        self.state.tracker.set_region(next, Instant::now());
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.state.tracker.deadline()
    }

    /// Commit the pending viewport if it is due. Returns true when the
    /// visible matches were recomputed.
    pub fn on_settle_tick(&mut self, now: Instant) -> bool {
        match self.state.tracker.poll(now) {
            Some(region) => {
                debug!("viewport settled at {region:?}");
                self.refresh_visible();
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Filters
    // -----------------------------------------------------------------------

    pub fn shift_window(&mut self, days: i64) {
        self.state.window = self.state.window.shift_days(days);
        self.refresh_visible();
    }

    pub fn toggle_spatial_filter(&mut self) {
        self.state.spatial_filter = !self.state.spatial_filter;
        self.refresh_visible();
    }

    /// Re-run the window filter against the settled viewport.
    pub fn refresh_visible(&mut self) {
        let settled = self.state.tracker.settled_bounds();
        self.state.unsupported_viewport = settled.is_none();

        let predicate = match (self.state.spatial_filter, settled) {
            (false, _) => None,
            (true, Some(bounds)) => Some(SpatialPredicate::Within(bounds)),
            (true, None) => {
                debug!("viewport has no plain bounding box; showing nothing");
                self.state.list.replace(Vec::new(), Vec::new());
                return;
            }
        };

        let visible: Vec<DisplayRecord> = self
            .state
            .session
            .in_view(&self.state.window, predicate.as_ref())
            .into_iter()
            .cloned()
            .collect();
        let pins = group_by_venue(visible.iter());
        debug!("{} matches at {} venues in view", visible.len(), pins.len());
        self.state.list.replace(visible, pins);
    }

    // -----------------------------------------------------------------------
    // List navigation
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        self.state.list.select_next();
    }

    pub fn select_prev(&mut self) {
        self.state.list.select_prev();
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

fn padded(region: MapRegion) -> MapRegion {
    let grow = |span: f64| (span * (1.0 + EXTENT_PADDING)).max(MIN_INITIAL_SPAN);
    MapRegion {
        lat_span: grow(region.lat_span),
        lng_span: grow(region.lng_span),
        ..region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_discovery::window::DateWindow;
    use serde_json::json;
    use std::time::Duration;

    fn app() -> App {
        App::with_settings(AppSettings {
            full_screen: false,
            log_level: None,
            matches_path: None,
            window: DateWindow::parse("2025-11-01", "2025-11-30").unwrap(),
            settle_after: Duration::from_millis(300),
        })
    }

    fn raw() -> Value {
        json!([
            {
                "fixture": {"id": 1, "date": "2025-11-02T20:00:00Z",
                            "venue": {"name": "Parc des Princes", "coordinates": [2.253056, 48.841389]}},
                "teams": {"home": {"name": "PSG"}, "away": {"name": "Lyon"}}
            },
            {
                "matchId": 2, "homeTeam": "PSG", "awayTeam": "Lille", "kickoff": "2025-11-20T20:00:00Z",
                "venue": {"name": "Parc des Princes", "coordinates": {"lat": 48.841389, "lng": 2.253056}}
            },
            {
                "matchId": 3, "homeTeam": "Atlético", "awayTeam": "Sevilla", "kickoff": "2025-11-09T18:30:00Z",
                "venue": {"name": "Metropolitano", "coordinates": {"lat": 40.436111, "lng": -3.599444}}
            },
            {"matchId": 4, "homeTeam": "Somewhere", "awayTeam": "FC", "kickoff": "2025-11-10T18:00:00Z"},
            {"matchId": 5, "homeTeam": "Late", "awayTeam": "FC", "kickoff": "2025-12-10T18:00:00Z",
             "venue": {"name": "Metropolitano", "coordinates": {"lat": 40.436111, "lng": -3.599444}}}
        ])
    }

    fn visible_ids(app: &App) -> Vec<&str> {
        app.state.list.visible.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn load_frames_every_located_venue() {
        let mut app = app();
        app.on_matches_loaded(&raw(), "test".into());

        assert_eq!(app.state.source_label.as_deref(), Some("test"));
        assert!(!app.state.tracker.has_moved());
        assert_eq!(visible_ids(&app), vec!["1", "2", "3"]);
        assert_eq!(app.state.list.pins.len(), 2);
        assert_eq!(app.state.list.pins[0].match_ids, vec!["1", "2"]);
    }

    #[test]
    fn load_without_coordinates_falls_back_to_europe() {
        let mut app = app();
        app.on_matches_loaded(
            &json!([{"matchId": 9, "homeTeam": "A", "awayTeam": "B", "kickoff": "2025-11-05T12:00:00Z"}]),
            "test".into(),
        );
        assert!(app.state.tracker.settled_region().approx_eq(&EUROPE));
        assert!(visible_ids(&app).is_empty());

        app.toggle_spatial_filter();
        assert_eq!(visible_ids(&app), vec!["9"]);
    }

    #[test]
    fn panning_only_applies_once_settled() {
        let mut app = app();
        app.on_matches_loaded(&raw(), "test".into());
        let before = visible_ids(&app).len();

        for _ in 0..8 {
            app.pan(0.0, PAN_STEP);
        }
        assert!(app.settle_deadline().is_some());
        assert!(app.state.tracker.has_moved());
        assert_eq!(visible_ids(&app).len(), before);

        assert!(app.on_settle_tick(Instant::now() + Duration::from_secs(1)));
        assert!(app.settle_deadline().is_none());
        assert!(visible_ids(&app).is_empty());
        assert!(!app.on_settle_tick(Instant::now() + Duration::from_secs(2)));
    }

    #[test]
    fn zooming_out_past_the_poles_is_flagged() {
        let mut app = app();
        app.on_matches_loaded(&raw(), "test".into());
        for _ in 0..6 {
            app.zoom(ZOOM_OUT);
        }
        assert!(app.on_settle_tick(Instant::now() + Duration::from_secs(1)));
        assert!(app.state.unsupported_viewport);
        assert!(app.state.list.visible.is_empty());

        app.toggle_spatial_filter();
        assert_eq!(visible_ids(&app), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn shifting_the_window_moves_the_list() {
        let mut app = app();
        app.on_matches_loaded(&raw(), "test".into());
        app.shift_window(WINDOW_STEP_DAYS * 2);
        assert_eq!(visible_ids(&app), vec!["2", "5"]);
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Venues);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Venues);
    }
}
