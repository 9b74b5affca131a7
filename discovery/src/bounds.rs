//! Conversions between the two viewport representations (centre + span vs
//! corner pair) and point containment.
//!
//! Rectangles crossing the ±180° meridian or either pole are not supported:
//! they are reported as `None` rather than wrapped.
use crate::coords::resolve_point;
use crate::{GeoBounds, GeoPoint, MapRegion};
use serde_json::Value;

pub fn bounds_from_region(region: &MapRegion) -> Option<GeoBounds> {
    let MapRegion { center_lat, center_lng, lat_span, lng_span } = *region;
    let all_finite = [center_lat, center_lng, lat_span, lng_span]
        .iter()
        .all(|v| v.is_finite());
    if !all_finite || lat_span < 0.0 || lng_span < 0.0 {
        return None;
    }

    let half_lat = lat_span / 2.0;
    let half_lng = lng_span / 2.0;
    let northeast = GeoPoint::new(center_lat + half_lat, center_lng + half_lng)?;
    let southwest = GeoPoint::new(center_lat - half_lat, center_lng - half_lng)?;
    Some(GeoBounds { northeast, southwest })
}

pub fn region_from_bounds(bounds: &GeoBounds) -> Option<MapRegion> {
    let GeoBounds { northeast: ne, southwest: sw } = *bounds;
    if sw.lat > ne.lat || sw.lng > ne.lng {
        return None;
    }
    Some(MapRegion {
        center_lat: (ne.lat + sw.lat) / 2.0,
        center_lng: (ne.lng + sw.lng) / 2.0,
        lat_span: ne.lat - sw.lat,
        lng_span: ne.lng - sw.lng,
    })
}

/// Closed-interval containment on both axes.
pub fn contains(point: &GeoPoint, bounds: &GeoBounds) -> bool {
    let GeoBounds { northeast: ne, southwest: sw } = bounds;
    (sw.lat..=ne.lat).contains(&point.lat) && (sw.lng..=ne.lng).contains(&point.lng)
}

impl GeoBounds {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        contains(point, self)
    }

    /// Containment for a raw `[lng, lat]` or `{lat, lng}` point. Unparseable
    /// points are outside.
    pub fn contains_raw(&self, point: &Value) -> bool {
        resolve_point(point).is_some_and(|p| contains(&p, self))
    }

    /// Smallest rectangle holding every point, or `None` for no points.
    pub fn enclosing<'a, I>(points: I) -> Option<GeoBounds>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        points.into_iter().fold(None, |acc: Option<GeoBounds>, p| {
            Some(match acc {
                None => GeoBounds { northeast: *p, southwest: *p },
                Some(b) => GeoBounds {
                    northeast: GeoPoint { lat: b.northeast.lat.max(p.lat), lng: b.northeast.lng.max(p.lng) },
                    southwest: GeoPoint { lat: b.southwest.lat.min(p.lat), lng: b.southwest.lng.min(p.lng) },
                },
            })
        })
    }
}
