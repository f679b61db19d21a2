//! Geographic agreement between two events.
//!
//! Three independent signals, any one of which is enough: matching
//! location names, coordinates within a radius, or a shared location
//! entity. Events with no geographic information never match.

use crate::domain::entities::event::Event;
use crate::domain::values::entities::EntityKind;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Haversine great-circle distance in kilometres.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    // Float error can push `a` a hair past 1.0 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Lower-case, drop everything after the first comma, collapse whitespace.
/// "Berlin, Germany" and "  berlin " both become "berlin".
pub fn normalize_location(name: &str) -> String {
    let head = name.split(',').next().unwrap_or("");
    head.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy)]
pub struct GeoMatcher {
    radius_km: f64,
}

impl Default for GeoMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_KM)
    }
}

impl GeoMatcher {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn locations_match(&self, a: &Event, b: &Event) -> bool {
        names_match(a.location_name.as_deref(), b.location_name.as_deref())
            || self.coordinates_within_radius(a, b)
            || a.entity_list.shares_any(&b.entity_list, EntityKind::Locations)
    }

    fn coordinates_within_radius(&self, a: &Event, b: &Event) -> bool {
        match (a.coordinates(), b.coordinates()) {
            (Some((lat1, lon1)), Some((lat2, lon2))) => {
                distance_km(lat1, lon1, lat2, lon2) <= self.radius_km
            }
            _ => false,
        }
    }
}

fn names_match(a: Option<&str>, b: Option<&str>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    let a = normalize_location(a);
    let b = normalize_location(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}
