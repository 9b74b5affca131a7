//! Match window filtering: keep the matches whose kickoff day falls inside a
//! trip's date range and, optionally, whose venue satisfies a spatial
//! predicate.
use crate::coords::resolve_point;
use crate::{DiscoveryError, DiscoveryResult, Fixture, GeoBounds, GeoPoint};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

/// Radius used when search criteria name a place without one.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Closed range of calendar days, compared at UTC-midnight granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Parse both ends from `YYYY-MM-DD` or RFC 3339 strings.
    pub fn parse(from: &str, to: &str) -> DiscoveryResult<Self> {
        let day = |s: &str| {
            parse_day(s).ok_or_else(|| DiscoveryError::Validation(format!("unparseable date {s:?}")))
        };
        Ok(Self { from: day(from)?, to: day(to)? })
    }

    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.to < self.from {
            return Err(DiscoveryError::Validation(format!(
                "window ends ({}) before it starts ({})",
                self.to, self.from
            )));
        }
        Ok(())
    }

    pub fn contains(&self, kickoff: DateTime<Utc>) -> bool {
        let day = kickoff.date_naive();
        self.from <= day && day <= self.to
    }

    pub fn shift_days(&self, days: i64) -> Self {
        let delta = Duration::days(days);
        Self { from: self.from + delta, to: self.to + delta }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialPredicate {
    Within(GeoBounds),
    /// Inclusive great-circle radius.
    Radius { center: GeoPoint, radius_km: f64 },
}

impl SpatialPredicate {
    pub fn matches(&self, point: &GeoPoint) -> bool {
        match self {
            SpatialPredicate::Within(bounds) => bounds.contains(point),
            SpatialPredicate::Radius { center, radius_km } => center.distance_km(point) <= *radius_km,
        }
    }
}

/// Stable, read-only filter. An inverted window yields nothing. When a
/// spatial predicate is given, records without coordinates are dropped.
pub fn filter<'a, T: Fixture>(
    records: &'a [T],
    window: &DateWindow,
    spatial: Option<&SpatialPredicate>,
) -> Vec<&'a T> {
    if let Err(e) = window.validate() {
        debug!("{e}; returning no matches");
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| window.contains(r.kickoff()))
        .filter(|r| match spatial {
            None => true,
            Some(predicate) => r.venue().coordinates.is_some_and(|p| predicate.matches(&p)),
        })
        .collect()
}

/// Already-resolved search criteria as handed over by the search collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub location: Option<SearchLocation>,
    pub date_from: String,
    pub date_to: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLocation {
    #[serde(default)]
    pub name: Option<String>,
    /// Any coordinate shape the resolver understands.
    #[serde(default)]
    pub coordinates: Option<Value>,
    #[serde(default)]
    pub radius_km: Option<f64>,
}

impl SearchLocation {
    pub fn predicate(&self) -> Option<SpatialPredicate> {
        let center = self.coordinates.as_ref().and_then(resolve_point)?;
        let radius_km = self
            .radius_km
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(DEFAULT_RADIUS_KM);
        Some(SpatialPredicate::Radius { center, radius_km })
    }
}

pub fn filter_by_criteria<'a, T: Fixture>(records: &'a [T], criteria: &SearchCriteria) -> Vec<&'a T> {
    let window = match DateWindow::parse(&criteria.date_from, &criteria.date_to) {
        Ok(window) => window,
        Err(e) => {
            warn!("{e}; returning no matches");
            return Vec::new();
        }
    };

    let spatial = criteria.location.as_ref().and_then(|loc| {
        let predicate = loc.predicate();
        if predicate.is_none() {
            warn!(
                "search location {:?} has no usable coordinates; filtering by date only",
                loc.name.as_deref().unwrap_or("<unnamed>")
            );
        }
        predicate
    });

    filter(records, &window, spatial.as_ref())
}

/// Parse a kickoff timestamp. Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC) or a bare date (UTC midnight).
pub fn parse_kickoff(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    parse_kickoff(s).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::bounds_from_region;
    use crate::{League, MapRegion, MatchRecord, Team, Venue};
    use chrono::TimeZone;
    use serde_json::json;

    fn record(id: &str, kickoff: &str, coordinates: Option<GeoPoint>) -> MatchRecord {
        MatchRecord {
            id: id.into(),
            kickoff: parse_kickoff(kickoff).unwrap(),
            home_team: Team { name: "Home".into(), ..Default::default() },
            away_team: Team { name: "Away".into(), ..Default::default() },
            league: League { name: "Ligue 1".into(), ..Default::default() },
            venue: Venue { name: "Ground".into(), coordinates, ..Default::default() },
        }
    }

    fn ids<T: Fixture>(records: &[&T]) -> Vec<String> {
        records.iter().map(|r| r.id().to_owned()).collect()
    }

    fn paris() -> Option<GeoPoint> {
        GeoPoint::new(48.8414, 2.2530)
    }

    fn madrid() -> Option<GeoPoint> {
        GeoPoint::new(40.4531, -3.6883)
    }

    fn november() -> DateWindow {
        DateWindow::parse("2025-11-01", "2025-11-30").unwrap()
    }

    #[test]
    fn keeps_november_kickoff_and_drops_first_of_december() {
        let records = vec![
            record("in", "2025-11-15T20:00:00Z", paris()),
            record("out", "2025-12-01T00:00:00Z", paris()),
        ];
        assert_eq!(ids(&filter(&records, &november(), None)), vec!["in"]);
    }

    #[test]
    fn window_ends_are_inclusive_whatever_the_time_of_day() {
        let records = vec![
            record("first", "2025-11-01T00:00:00Z", None),
            record("last", "2025-11-30T23:59:59Z", None),
            record("before", "2025-10-31T23:59:59Z", None),
        ];
        assert_eq!(ids(&filter(&records, &november(), None)), vec!["first", "last"]);
    }

    #[test]
    fn offset_kickoffs_are_compared_in_utc() {
        // 00:30 in Paris on 1 December is still 30 November in UTC.
        let records = vec![record("late", "2025-12-01T00:30:00+01:00", None)];
        assert_eq!(ids(&filter(&records, &november(), None)), vec!["late"]);
    }

    #[test]
    fn inverted_window_yields_empty_result() {
        let records = vec![record("a", "2025-11-15T20:00:00Z", paris())];
        let inverted = DateWindow::parse("2025-11-30", "2025-11-01").unwrap();
        assert!(inverted.validate().is_err());
        assert!(filter(&records, &inverted, None).is_empty());
    }

    #[test]
    fn unparseable_dates_are_validation_errors() {
        let err = DateWindow::parse("next week", "2025-11-30").unwrap_err();
        assert!(matches!(err, DiscoveryError::Validation(_)));
    }

    #[test]
    fn unresolved_venues_kept_without_predicate_dropped_with_one() {
        let records = vec![
            record("paris", "2025-11-10T20:00:00Z", paris()),
            record("nowhere", "2025-11-11T20:00:00Z", None),
            record("madrid", "2025-11-12T20:00:00Z", madrid()),
        ];
        assert_eq!(
            ids(&filter(&records, &november(), None)),
            vec!["paris", "nowhere", "madrid"]
        );

        let france = bounds_from_region(&MapRegion {
            center_lat: 46.5,
            center_lng: 2.5,
            lat_span: 10.0,
            lng_span: 14.0,
        })
        .unwrap();
        let within = SpatialPredicate::Within(france);
        assert_eq!(ids(&filter(&records, &november(), Some(&within))), vec!["paris"]);

        let around_madrid = SpatialPredicate::Radius { center: madrid().unwrap(), radius_km: 25.0 };
        assert_eq!(ids(&filter(&records, &november(), Some(&around_madrid))), vec!["madrid"]);
    }

    #[test]
    fn filter_preserves_input_order_and_leaves_input_untouched() {
        let records = vec![
            record("c", "2025-11-20T20:00:00Z", paris()),
            record("a", "2025-11-02T20:00:00Z", paris()),
            record("b", "2025-11-10T20:00:00Z", paris()),
        ];
        let before = records.clone();
        assert_eq!(ids(&filter(&records, &november(), None)), vec!["c", "a", "b"]);
        assert_eq!(records, before);
    }

    #[test]
    fn radius_is_inclusive() {
        let center = paris().unwrap();
        let zero = SpatialPredicate::Radius { center, radius_km: 0.0 };
        assert!(zero.matches(&center));
    }

    #[test]
    fn criteria_with_location_apply_default_radius() {
        let records = vec![
            record("paris", "2025-11-10T20:00:00Z", paris()),
            record("madrid", "2025-11-12T20:00:00Z", madrid()),
            record("nowhere", "2025-11-13T20:00:00Z", None),
        ];
        let criteria: SearchCriteria = serde_json::from_value(json!({
            "location": {"name": "Paris", "coordinates": [2.3522, 48.8566]},
            "dateFrom": "2025-11-01",
            "dateTo": "2025-11-30"
        }))
        .unwrap();
        assert_eq!(ids(&filter_by_criteria(&records, &criteria)), vec!["paris"]);
    }

    #[test]
    fn criteria_location_without_coordinates_falls_back_to_dates() {
        let records = vec![
            record("paris", "2025-11-10T20:00:00Z", paris()),
            record("nowhere", "2025-11-13T20:00:00Z", None),
        ];
        let criteria: SearchCriteria = serde_json::from_value(json!({
            "location": {"name": "Somewhere"},
            "dateFrom": "2025-11-01T00:00:00Z",
            "dateTo": "2025-11-30"
        }))
        .unwrap();
        assert_eq!(ids(&filter_by_criteria(&records, &criteria)), vec!["paris", "nowhere"]);
    }

    #[test]
    fn criteria_with_bad_dates_yield_nothing() {
        let records = vec![record("paris", "2025-11-10T20:00:00Z", paris())];
        let criteria: SearchCriteria = serde_json::from_value(json!({
            "dateFrom": "soon",
            "dateTo": "2025-11-30"
        }))
        .unwrap();
        assert!(filter_by_criteria(&records, &criteria).is_empty());
    }

    #[test]
    fn kickoff_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 15, 20, 0, 0).unwrap();
        assert_eq!(parse_kickoff("2025-11-15T20:00:00Z"), Some(expected));
        assert_eq!(parse_kickoff("2025-11-15T21:00:00+01:00"), Some(expected));
        assert_eq!(parse_kickoff("2025-11-15T20:00:00"), Some(expected));
        assert_eq!(
            parse_kickoff("2025-11-15"),
            Some(Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_kickoff("15/11/2025"), None);
    }

    #[test]
    fn shifting_moves_both_ends() {
        let w = november().shift_days(7);
        assert_eq!(w.from, NaiveDate::from_ymd_opt(2025, 11, 8).unwrap());
        assert_eq!(w.to, NaiveDate::from_ymd_opt(2025, 12, 7).unwrap());
    }
}
