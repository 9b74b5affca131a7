//! Stable dedup keys for venues, and grouping of matches into one map pin
//! per physical stadium.
use crate::coords;
use crate::wire::id_string;
use crate::{Fixture, GeoPoint, Venue};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Decimal places kept per axis (~0.11 m at the equator).
pub const KEY_PRECISION: i32 = 6;

/// `geo:<lng>,<lat>` or `id:<identifier>`. Never stored; always recomputed
/// from the current venue data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VenueKey(String);

impl VenueKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn geo(point: &GeoPoint) -> Self {
        VenueKey(format!("geo:{:.6},{:.6}", round_axis(point.lng), round_axis(point.lat)))
    }

    fn id(identifier: &str) -> Self {
        VenueKey(format!("id:{identifier}"))
    }
}

impl fmt::Display for VenueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn round_axis(value: f64) -> f64 {
    let scale = 10f64.powi(KEY_PRECISION);
    // `+ 0.0` folds -0.0 into 0.0 so both print the same.
    (value * scale).round() / scale + 0.0
}

/// Key for a decoded venue. `None` means the venue must not be merged with
/// anything.
pub fn venue_key(venue: &Venue) -> Option<VenueKey> {
    if let Some(point) = &venue.coordinates {
        return Some(VenueKey::geo(point));
    }
    venue
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(VenueKey::id)
}

/// Key straight from a raw venue or match payload.
pub fn venue_key_raw(payload: &Value) -> Option<VenueKey> {
    if let Some(point) = coords::resolve(payload) {
        return Some(VenueKey::geo(&point));
    }
    let fixture_venue_id = payload
        .get("fixture")
        .and_then(|f| f.get("venue"))
        .and_then(|v| v.get("id"));
    let venue_id = payload.get("venue").and_then(|v| v.get("id"));
    // On a match payload the top-level `id` names the match, not the venue.
    let is_match = ["fixture", "match"]
        .iter()
        .any(|key| payload.get(*key).is_some_and(Value::is_object));
    let own_id = if is_match { None } else { payload.get("id") };

    [fixture_venue_id, venue_id, payload.get("venueId"), own_id]
        .into_iter()
        .flatten()
        .find_map(id_string)
        .map(|id| VenueKey::id(&id))
}

/// All matches played at one venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueGroup {
    pub key: Option<VenueKey>,
    /// The venue as first seen in the input.
    pub venue: Venue,
    pub match_ids: Vec<String>,
}

/// Collapse records into one group per venue key, in first-seen order.
/// Records without a key each get a group of their own.
pub fn group_by_venue<T, I>(records: I) -> Vec<VenueGroup>
where
    T: Fixture,
    I: IntoIterator<Item = T>,
{
    let mut groups: Vec<VenueGroup> = Vec::new();
    let mut index: HashMap<VenueKey, usize> = HashMap::new();

    for record in records {
        let key = venue_key(record.venue());
        if let Some(k) = &key
            && let Some(&slot) = index.get(k)
        {
            groups[slot].match_ids.push(record.id().to_owned());
            continue;
        }
        if let Some(k) = &key {
            index.insert(k.clone(), groups.len());
        }
        groups.push(VenueGroup {
            key,
            venue: record.venue().clone(),
            match_ids: vec![record.id().to_owned()],
        });
    }

    groups
}
