pub mod bounds;
pub mod coords;
pub mod projection;
pub mod session;
pub mod tracker;
pub mod venue_key;
pub mod window;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The two kinds of bad input the engine recognises. Neither is fatal: batch
/// operations log the offending record and keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Malformed query input, e.g. an unparseable date or `to < from`.
    Validation(String),
    /// A record that matches none of the known payload shapes.
    DataShape(String),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::Validation(msg) => write!(f, "Validation error: {msg}"),
            DiscoveryError::DataShape(msg) => write!(f, "Data shape error: {msg}"),
        }
    }
}

impl std::error::Error for DiscoveryError {}

// ---------------------------------------------------------------------------
// Domain types: canonical model, independent of any payload layout
// ---------------------------------------------------------------------------

/// A validated (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Returns `None` unless `-90 <= lat <= 90` and `-180 <= lng <= 180`.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        (lat_ok && lng_ok).then_some(Self { lat, lng })
    }

    /// Build a point from GeoJSON axis order.
    pub fn from_lng_lat([lng, lat]: [f64; 2]) -> Option<Self> {
        Self::new(lat, lng)
    }

    /// Haversine distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = ((d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// Rectangular extent given by its two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub northeast: GeoPoint,
    pub southwest: GeoPoint,
}

/// Map viewport as centre + span, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    pub center_lat: f64,
    pub center_lng: f64,
    pub lat_span: f64,
    pub lng_span: f64,
}

impl MapRegion {
    /// Tolerance used when comparing two regions.
    pub const EPSILON: f64 = 1e-9;

    pub fn approx_eq(&self, other: &MapRegion) -> bool {
        (self.center_lat - other.center_lat).abs() <= Self::EPSILON
            && (self.center_lng - other.center_lng).abs() <= Self::EPSILON
            && (self.lat_span - other.lat_span).abs() <= Self::EPSILON
            && (self.lng_span - other.lng_span).abs() <= Self::EPSILON
    }

    /// Move the centre by a fraction of the current span on each axis.
    pub fn pan(&self, lat_fraction: f64, lng_fraction: f64) -> MapRegion {
        MapRegion {
            center_lat: self.center_lat + self.lat_span * lat_fraction,
            center_lng: self.center_lng + self.lng_span * lng_fraction,
            ..*self
        }
    }

    /// Scale both spans around the current centre. `factor < 1` zooms in.
    pub fn zoom(&self, factor: f64) -> MapRegion {
        MapRegion {
            lat_span: self.lat_span * factor,
            lng_span: self.lng_span * factor,
            ..*self
        }
    }
}

/// A physical stadium, decoded from whatever layout the source used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Always serialized, as `null` when the source carried no usable location.
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Venue {
    /// Decode a raw venue payload. Missing fields become empty/`None`;
    /// coordinates go through the resolver.
    pub fn from_value(raw: &serde_json::Value) -> Self {
        Self {
            id: raw.get("id").and_then(wire::id_string),
            name: raw
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned(),
            city: wire::opt_string(raw.get("city")),
            country: wire::opt_string(raw.get("country")),
            coordinates: coords::resolve(raw),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// One match, as read from the ingestion collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: String,
    pub kickoff: DateTime<Utc>,
    pub home_team: Team,
    pub away_team: Team,
    pub league: League,
    pub venue: Venue,
}

/// Anything with a kickoff time and a venue can be windowed and grouped.
pub trait Fixture {
    fn id(&self) -> &str;
    fn kickoff(&self) -> DateTime<Utc>;
    fn venue(&self) -> &Venue;
}

impl Fixture for MatchRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn kickoff(&self) -> DateTime<Utc> {
        self.kickoff
    }

    fn venue(&self) -> &Venue {
        &self.venue
    }
}

impl<T: Fixture> Fixture for &T {
    fn id(&self) -> &str {
        (*self).id()
    }

    fn kickoff(&self) -> DateTime<Utc> {
        (*self).kickoff()
    }

    fn venue(&self) -> &Venue {
        (*self).venue()
    }
}
