//! Raw payload shapes: serde layouts for every record layout we accept.
//! These decode into the canonical types in lib.rs via coords.rs and projection.rs;
//! nothing outside this crate should see them.
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A coordinate axis as sent by providers: a JSON number or a numeric string.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// Every layout a single coordinate value can take.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum CoordinateShape {
    /// GeoJSON order: `[lng, lat]`, optionally followed by altitude.
    GeoJson(Vec<Numeric>),
    LatLng { lat: Numeric, lng: Numeric },
    LatitudeLongitude { latitude: Numeric, longitude: Numeric },
}

impl CoordinateShape {
    /// Returns `(lat, lng)` with the GeoJSON axis swap applied.
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        match self {
            CoordinateShape::GeoJson(position) => match position.as_slice() {
                [lng, lat, ..] => Some((lat.value()?, lng.value()?)),
                _ => None,
            },
            CoordinateShape::LatLng { lat, lng } => Some((lat.value()?, lng.value()?)),
            CoordinateShape::LatitudeLongitude { latitude, longitude } => {
                Some((latitude.value()?, longitude.value()?))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Match records
// ---------------------------------------------------------------------------

/// Teams arrive either as a bare name or as a provider object.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum TeamField {
    Name(String),
    Object {
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        logo: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum LeagueField {
    Name(String),
    Object {
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        country: Option<String>,
    },
}

/// A match the user saved to a trip. Flat layout, camelCase keys.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SavedMatch {
    pub id: Option<Value>,
    pub match_id: Option<Value>,
    pub home_team: Option<TeamField>,
    pub away_team: Option<TeamField>,
    pub league: Option<LeagueField>,
    pub kickoff: Option<String>,
    pub date: Option<String>,
    pub venue: Option<Value>,
}

/// A match straight from the sports-data provider.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMatch {
    pub id: Option<Value>,
    pub match_id: Option<Value>,
    pub fixture: ProviderFixture,
    pub teams: Option<ProviderTeams>,
    pub league: Option<LeagueField>,
    pub kickoff: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProviderFixture {
    pub id: Option<Value>,
    pub date: Option<String>,
    pub venue: Option<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProviderTeams {
    pub home: Option<TeamField>,
    pub away: Option<TeamField>,
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Identifiers may be strings or numbers; empty strings count as absent.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn opt_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
