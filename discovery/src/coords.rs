//! Coordinate resolution: turn any venue-bearing payload into a canonical
//! [`GeoPoint`], or report that it carries no usable location.
//!
//! Lookup order:
//!   1. `venueData.coordinates`
//!   2. `coordinates`
//!   3. `fixture.venue.coordinates`
//!   4. split `lat`/`latitude` + `lng`/`longitude` fields at the top level
//!   5. the same split fields under `fixture.venue`
//!
//! A candidate that is present but unusable (wrong shape, non-numeric,
//! out of range) is skipped and the next one is tried.
use crate::GeoPoint;
use crate::wire::{CoordinateShape, Numeric};
use serde::Deserialize;
use serde_json::Value;

const COORDINATE_PATHS: [&[&str]; 3] = [
    &["venueData", "coordinates"],
    &["coordinates"],
    &["fixture", "venue", "coordinates"],
];

const SPLIT_FIELD_PARENTS: [&[&str]; 2] = [&[], &["fixture", "venue"]];

/// Resolve the location carried by `payload`. Never fails; absence is `None`.
pub fn resolve(payload: &Value) -> Option<GeoPoint> {
    COORDINATE_PATHS
        .iter()
        .filter_map(|path| lookup(payload, path))
        .find_map(resolve_point)
        .or_else(|| {
            SPLIT_FIELD_PARENTS
                .iter()
                .filter_map(|path| lookup(payload, path))
                .find_map(split_fields)
        })
}

/// Parse one coordinate value: `[lng, lat]`, `{lat, lng}` or `{latitude, longitude}`.
pub fn resolve_point(value: &Value) -> Option<GeoPoint> {
    let shape = CoordinateShape::deserialize(value).ok()?;
    let (lat, lng) = shape.lat_lng()?;
    GeoPoint::new(lat, lng)
}

fn split_fields(parent: &Value) -> Option<GeoPoint> {
    let axis = |names: [&str; 2]| {
        names
            .iter()
            .filter_map(|name| parent.get(*name))
            .find_map(|v| Numeric::deserialize(v).ok().and_then(|n| n.value()))
    };
    let lat = axis(["lat", "latitude"])?;
    let lng = axis(["lng", "longitude"])?;
    GeoPoint::new(lat, lng)
}

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |node, key| node.get(*key))
        .filter(|v| !v.is_null())
}
