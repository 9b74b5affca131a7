use crate::coords;
use crate::window::parse_kickoff;
use crate::wire::{LeagueField, ProviderMatch, SavedMatch, TeamField, id_string, opt_string};
use crate::{DiscoveryError, DiscoveryResult, Fixture, League, MatchRecord, Team, Venue};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name shown for a side that the source did not fill in.
const TBD: &str = "TBD";

// ---------------------------------------------------------------------------
// Display record: the one shape the map layer renders
// ---------------------------------------------------------------------------

/// Where a projected record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrigin {
    /// Saved to a trip by the user.
    Saved,
    /// Proposed by the recommender.
    Suggested,
    #[default]
    Provider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: String,
    pub fixture: DisplayFixture,
    pub teams: DisplayTeams,
    pub league: League,
    #[serde(default)]
    pub origin: RecordOrigin,
    /// The untouched recommendation wrapper, for suggested records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFixture {
    pub id: String,
    pub date: DateTime<Utc>,
    pub venue: Venue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTeams {
    pub home: Team,
    pub away: Team,
}

impl DisplayRecord {
    fn new(record: MatchRecord, origin: RecordOrigin, recommendation: Option<Value>) -> Self {
        Self {
            fixture: DisplayFixture {
                id: record.id.clone(),
                date: record.kickoff,
                venue: record.venue,
            },
            id: record.id,
            teams: DisplayTeams { home: record.home_team, away: record.away_team },
            league: record.league,
            origin,
            recommendation,
        }
    }

    pub fn is_suggested(&self) -> bool {
        self.origin == RecordOrigin::Suggested
    }
}

impl From<&DisplayRecord> for MatchRecord {
    fn from(d: &DisplayRecord) -> Self {
        MatchRecord {
            id: d.id.clone(),
            kickoff: d.fixture.date,
            home_team: d.teams.home.clone(),
            away_team: d.teams.away.clone(),
            league: d.league.clone(),
            venue: d.fixture.venue.clone(),
        }
    }
}

impl Fixture for DisplayRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn kickoff(&self) -> DateTime<Utc> {
        self.fixture.date
    }

    fn venue(&self) -> &Venue {
        &self.fixture.venue
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Reshape one raw record into a [`DisplayRecord`].
pub fn project(input: &Value) -> DiscoveryResult<DisplayRecord> {
    let (record, origin) = decode(input)?;
    let recommendation = match origin {
        RecordOrigin::Suggested => Some(carried_recommendation(input).unwrap_or_else(|| input.clone())),
        _ => None,
    };
    Ok(DisplayRecord::new(record, origin, recommendation))
}

/// The wrapper kept on an already-projected suggested record.
fn carried_recommendation(input: &Value) -> Option<Value> {
    if input.get("match").is_some_and(Value::is_object) {
        return None;
    }
    input.get("recommendation").filter(|r| !r.is_null()).cloned()
}

/// Outcome of projecting a batch: everything that decoded, plus a count of
/// what did not.
#[derive(Debug, Clone, Default)]
pub struct BatchProjection {
    pub records: Vec<DisplayRecord>,
    pub skipped: usize,
}

/// Project every element of a JSON array. Non-arrays give an empty batch;
/// bad elements are logged and skipped.
pub fn project_batch(input: &Value) -> BatchProjection {
    let Some(items) = input.as_array() else {
        debug!("projection input is not a list; nothing to project");
        return BatchProjection::default();
    };

    let mut batch = BatchProjection { records: Vec::with_capacity(items.len()), skipped: 0 };
    for (idx, item) in items.iter().enumerate() {
        match project(item) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!("skipping record #{idx}: {e}");
                batch.skipped += 1;
            }
        }
    }
    batch
}

pub fn project_all(input: &Value) -> Vec<DisplayRecord> {
    project_batch(input).records
}

/// Decode a raw record into the canonical model.
///
/// Shapes are tried in order: recommendation wrapper (`match` object),
/// provider match (`fixture` object), saved-trip match.
pub fn decode(raw: &Value) -> DiscoveryResult<(MatchRecord, RecordOrigin)> {
    if !raw.is_object() {
        return Err(DiscoveryError::DataShape("expected a JSON object".into()));
    }

    if let Some(inner) = raw.get("match").filter(|m| m.is_object()) {
        let (mut record, _) = decode_plain(inner, resolve_id(raw))?;
        if record.venue.coordinates.is_none() {
            record.venue.coordinates = coords::resolve(raw);
        }
        return Ok((record, RecordOrigin::Suggested));
    }

    decode_plain(raw, None)
}

fn decode_plain(raw: &Value, fallback_id: Option<String>) -> DiscoveryResult<(MatchRecord, RecordOrigin)> {
    // Already-projected records carry their origin.
    let carried = raw.get("origin").and_then(|o| RecordOrigin::deserialize(o).ok());

    if raw.get("fixture").is_some_and(Value::is_object) {
        let origin = carried.unwrap_or(RecordOrigin::Provider);
        return decode_provider(raw, fallback_id).map(|r| (r, origin));
    }
    let looks_saved = ["homeTeam", "awayTeam", "matchId"]
        .iter()
        .any(|key| raw.get(*key).is_some_and(|v| !v.is_null()));
    if looks_saved {
        let origin = carried.unwrap_or(RecordOrigin::Saved);
        return decode_saved(raw, fallback_id).map(|r| (r, origin));
    }
    Err(DiscoveryError::DataShape(
        "record matches none of the known shapes (recommendation, provider, saved)".into(),
    ))
}

fn decode_provider(raw: &Value, fallback_id: Option<String>) -> DiscoveryResult<MatchRecord> {
    let wire = ProviderMatch::deserialize(raw)
        .map_err(|e| DiscoveryError::DataShape(format!("provider match: {e}")))?;
    let id = resolve_id(raw)
        .or(fallback_id)
        .ok_or_else(|| DiscoveryError::DataShape("provider match has no id".into()))?;
    let kickoff = kickoff_from([&wire.fixture.date, &wire.kickoff, &wire.date], &id)?;

    let mut venue = wire.fixture.venue.as_ref().map(venue_from).unwrap_or_default();
    venue.coordinates = coords::resolve(raw).or(venue.coordinates);

    let teams = wire.teams.unwrap_or_default();
    Ok(MatchRecord {
        id,
        kickoff,
        home_team: team_from(teams.home),
        away_team: team_from(teams.away),
        league: league_from(wire.league),
        venue,
    })
}

fn decode_saved(raw: &Value, fallback_id: Option<String>) -> DiscoveryResult<MatchRecord> {
    let wire = SavedMatch::deserialize(raw)
        .map_err(|e| DiscoveryError::DataShape(format!("saved match: {e}")))?;
    let id = resolve_id(raw)
        .or(fallback_id)
        .ok_or_else(|| DiscoveryError::DataShape("saved match has no id".into()))?;
    let kickoff = kickoff_from([&None, &wire.kickoff, &wire.date], &id)?;

    // A saved venue without a location keeps its labels and an explicit
    // `None`; it is never defaulted to (0, 0).
    let mut venue = match &wire.venue {
        Some(Value::String(name)) => Venue {
            name: name.clone(),
            city: opt_string(raw.get("city")),
            country: opt_string(raw.get("country")),
            ..Venue::default()
        },
        Some(v) => venue_from(v),
        None => Venue::default(),
    };
    venue.coordinates = coords::resolve(raw).or(venue.coordinates);

    Ok(MatchRecord {
        id,
        kickoff,
        home_team: team_from(wire.home_team),
        away_team: team_from(wire.away_team),
        league: league_from(wire.league),
        venue,
    })
}

/// `id` → `matchId` → `fixture.id`.
fn resolve_id(raw: &Value) -> Option<String> {
    let fixture_id = raw.get("fixture").and_then(|f| f.get("id"));
    [raw.get("id"), raw.get("matchId"), fixture_id]
        .into_iter()
        .flatten()
        .find_map(id_string)
}

fn kickoff_from(candidates: [&Option<String>; 3], id: &str) -> DiscoveryResult<DateTime<Utc>> {
    let Some(text) = candidates.into_iter().flatten().next() else {
        return Err(DiscoveryError::DataShape(format!("match {id} has no kickoff date")));
    };
    parse_kickoff(text)
        .ok_or_else(|| DiscoveryError::DataShape(format!("match {id} has unparseable kickoff {text:?}")))
}

fn venue_from(value: &Value) -> Venue {
    match value {
        Value::Object(_) => Venue::from_value(value),
        Value::String(name) => Venue { name: name.clone(), ..Venue::default() },
        _ => Venue::default(),
    }
}

fn team_from(field: Option<TeamField>) -> Team {
    match field {
        Some(TeamField::Name(name)) => Team { name, ..Team::default() },
        Some(TeamField::Object { id, name, logo }) => Team {
            id: id.as_ref().and_then(id_string),
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| TBD.into()),
            logo,
        },
        None => Team { name: TBD.into(), ..Team::default() },
    }
}

fn league_from(field: Option<LeagueField>) -> League {
    match field {
        Some(LeagueField::Name(name)) => League { name, ..League::default() },
        Some(LeagueField::Object { id, name, country }) => League {
            id: id.as_ref().and_then(id_string),
            name: name.unwrap_or_default(),
            country,
        },
        None => League::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;
    use crate::venue_key::venue_key;
    use chrono::TimeZone;
    use serde_json::json;

    fn provider_match() -> Value {
        json!({
            "fixture": {
                "id": 1035037,
                "date": "2025-11-15T20:00:00+00:00",
                "venue": {
                    "id": 671,
                    "name": "Parc des Princes",
                    "city": "Paris",
                    "coordinates": [2.253056, 48.841389]
                }
            },
            "teams": {
                "home": {"id": 85, "name": "Paris Saint Germain", "logo": "https://media/85.png"},
                "away": {"id": 81, "name": "Marseille"}
            },
            "league": {"id": 61, "name": "Ligue 1", "country": "France"}
        })
    }

    fn saved_match_without_coords() -> Value {
        json!({
            "matchId": "m-77",
            "homeTeam": "Arsenal",
            "awayTeam": "Chelsea",
            "league": "Premier League",
            "kickoff": "2025-11-22T15:00:00Z",
            "venue": {"name": "Emirates Stadium", "city": "London", "country": "England"}
        })
    }

    #[test]
    fn provider_match_projects_to_display_shape() {
        let d = project(&provider_match()).unwrap();
        assert_eq!(d.id, "1035037");
        assert_eq!(d.fixture.id, "1035037");
        assert_eq!(d.fixture.date, Utc.with_ymd_and_hms(2025, 11, 15, 20, 0, 0).unwrap());
        assert_eq!(d.fixture.venue.name, "Parc des Princes");
        assert_eq!(d.fixture.venue.id.as_deref(), Some("671"));
        assert_eq!(d.fixture.venue.coordinates, GeoPoint::new(48.841389, 2.253056));
        assert_eq!(d.teams.home.name, "Paris Saint Germain");
        assert_eq!(d.teams.home.id.as_deref(), Some("85"));
        assert_eq!(d.teams.away.logo, None);
        assert_eq!(d.league.country.as_deref(), Some("France"));
        assert_eq!(d.origin, RecordOrigin::Provider);
        assert!(d.recommendation.is_none());
    }

    #[test]
    fn saved_match_without_coordinates_gets_null_not_origin() {
        let d = project(&saved_match_without_coords()).unwrap();
        assert_eq!(d.id, "m-77");
        assert_eq!(d.origin, RecordOrigin::Saved);
        assert_eq!(d.fixture.venue.coordinates, None);
        assert_eq!(d.fixture.venue.city.as_deref(), Some("London"));
        assert_eq!(d.fixture.venue.country.as_deref(), Some("England"));

        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["fixture"]["venue"]["coordinates"], Value::Null);
        assert_eq!(value["fixture"]["venue"]["name"], "Emirates Stadium");
    }

    #[test]
    fn saved_match_reads_venue_data_and_string_venue() {
        let raw = json!({
            "id": "trip-1",
            "matchId": "m-1",
            "homeTeam": {"name": "Real Madrid"},
            "awayTeam": {"name": "Barcelona"},
            "date": "2025-10-26",
            "venue": "Santiago Bernabéu",
            "city": "Madrid",
            "venueData": {"coordinates": {"latitude": 40.453054, "longitude": -3.688344}}
        });
        let d = project(&raw).unwrap();
        assert_eq!(d.id, "trip-1");
        assert_eq!(d.fixture.venue.name, "Santiago Bernabéu");
        assert_eq!(d.fixture.venue.city.as_deref(), Some("Madrid"));
        assert_eq!(d.fixture.venue.coordinates, GeoPoint::new(40.453054, -3.688344));
        assert_eq!(d.league.name, "");
    }

    #[test]
    fn id_resolution_order() {
        let mut raw = provider_match();
        raw["matchId"] = json!("from-match-id");
        assert_eq!(project(&raw).unwrap().id, "from-match-id");
        raw["id"] = json!(7);
        assert_eq!(project(&raw).unwrap().id, "7");
    }

    #[test]
    fn recommendation_keeps_original_payload() {
        let wrapper = json!({
            "match": provider_match(),
            "reason": "Derby during your stay",
            "score": 0.92
        });
        let d = project(&wrapper).unwrap();
        assert!(d.is_suggested());
        assert_eq!(d.id, "1035037");
        assert_eq!(d.recommendation.as_ref(), Some(&wrapper));
        assert_eq!(d.fixture.venue.coordinates, GeoPoint::new(48.841389, 2.253056));
    }

    #[test]
    fn recommendation_wrapper_id_is_a_fallback() {
        let wrapper = json!({
            "id": "rec-1",
            "match": {
                "homeTeam": "Inter",
                "awayTeam": "Milan",
                "kickoff": "2025-11-23T19:45:00Z",
                "venue": {"name": "San Siro"}
            }
        });
        let d = project(&wrapper).unwrap();
        assert_eq!(d.id, "rec-1");
        assert_eq!(d.fixture.venue.coordinates, None);
    }

    #[test]
    fn unknown_shape_and_missing_kickoff_are_shape_errors() {
        let unknown = project(&json!({"title": "Concert"})).unwrap_err();
        assert!(matches!(unknown, DiscoveryError::DataShape(_)));
        let not_object = project(&json!("match")).unwrap_err();
        assert!(matches!(not_object, DiscoveryError::DataShape(_)));
        let no_date = project(&json!({"matchId": 3, "homeTeam": "A", "awayTeam": "B"})).unwrap_err();
        assert!(matches!(no_date, DiscoveryError::DataShape(_)));
        let bad_date = project(&json!({"fixture": {"id": 4, "date": "tomorrow"}})).unwrap_err();
        assert!(matches!(bad_date, DiscoveryError::DataShape(_)));
    }

    #[test]
    fn missing_teams_become_tbd() {
        let d = project(&json!({"fixture": {"id": 5, "date": "2025-11-01T12:00:00Z"}})).unwrap();
        assert_eq!(d.teams.home.name, "TBD");
        assert_eq!(d.teams.away.name, "TBD");
        assert_eq!(d.fixture.venue, Venue::default());
    }

    #[test]
    fn batch_skips_bad_records_and_keeps_order() {
        let input = json!([
            provider_match(),
            {"title": "Concert"},
            saved_match_without_coords(),
            42
        ]);
        let batch = project_batch(&input);
        assert_eq!(batch.skipped, 2);
        let ids: Vec<&str> = batch.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1035037", "m-77"]);
    }

    #[test]
    fn non_list_input_projects_to_empty() {
        assert!(project_all(&Value::Null).is_empty());
        assert!(project_all(&json!({"fixture": {}})).is_empty());
        assert!(project_all(&json!([])).is_empty());
    }

    #[test]
    fn display_record_round_trips_through_projection() {
        let original = project(&provider_match()).unwrap();
        let serialized = serde_json::to_value(&original).unwrap();
        let again = project(&serialized).unwrap();
        assert_eq!(again.id, original.id);
        assert_eq!(again.fixture.date, original.fixture.date);
        assert_eq!(again.fixture.venue, original.fixture.venue);
        assert_eq!(again.teams, original.teams);
        assert_eq!(again.league, original.league);
        assert_eq!(MatchRecord::from(&again), MatchRecord::from(&original));
        assert_eq!(again.origin, RecordOrigin::Provider);
    }

    #[test]
    fn saved_and_suggested_records_keep_their_origin_when_reprojected() {
        let saved = project(&saved_match_without_coords()).unwrap();
        let again = project(&serde_json::to_value(&saved).unwrap()).unwrap();
        assert_eq!(again.origin, RecordOrigin::Saved);
        assert_eq!(again.fixture.venue.coordinates, None);
        assert!(again.recommendation.is_none());
        assert_eq!(MatchRecord::from(&again), MatchRecord::from(&saved));

        let wrapper = json!({"match": provider_match(), "reason": "Derby during your stay"});
        let suggested = project(&wrapper).unwrap();
        let again = project(&serde_json::to_value(&suggested).unwrap()).unwrap();
        assert_eq!(again.origin, RecordOrigin::Suggested);
        assert_eq!(again.recommendation.as_ref(), Some(&wrapper));
        assert_eq!(MatchRecord::from(&again), MatchRecord::from(&suggested));
    }

    #[test]
    fn team_and_league_objects_without_names_still_project() {
        let raw = json!({
            "fixture": {"id": 6, "date": "2025-11-01T12:00:00Z"},
            "teams": {"home": {"id": 85}, "away": {"id": 81, "name": null}},
            "league": {"id": 61}
        });
        let d = project(&raw).unwrap();
        assert_eq!(d.teams.home.name, "TBD");
        assert_eq!(d.teams.home.id.as_deref(), Some("85"));
        assert_eq!(d.teams.away.name, "TBD");
        assert_eq!(d.league.id.as_deref(), Some("61"));
        assert_eq!(d.league.name, "");
    }

    #[test]
    fn three_shapes_of_one_stadium_group_together() {
        let provider = json!({
            "fixture": {"id": 1, "date": "2025-11-01T20:00:00Z",
                        "venue": {"name": "Allianz Arena", "coordinates": [11.624707, 48.218775]}}
        });
        let saved = json!({
            "matchId": 2, "homeTeam": "Bayern", "awayTeam": "Dortmund", "date": "2025-11-08",
            "venue": {"name": "Allianz Arena", "coordinates": {"lat": 48.2187751, "lng": 11.6247069}}
        });
        let suggested = json!({
            "match": {"matchId": 3, "homeTeam": "Bayern", "awayTeam": "Leipzig",
                      "kickoff": "2025-11-15T17:30:00Z",
                      "venue": {"name": "Allianz Arena", "coordinates": {"latitude": "48.218775", "longitude": "11.624707"}}}
        });
        let keys: Vec<_> = [provider, saved, suggested]
            .iter()
            .map(|raw| venue_key(&project(raw).unwrap().fixture.venue).unwrap())
            .collect();
        assert_eq!(keys[0], keys[1]);
        assert_eq!(keys[1], keys[2]);
    }
}
