//! Geofence admission: the pure decision of whether an observed location
//! and time are valid for recording attendance against a fence.
//!
//! No I/O, no mutation. Everything here is deterministic given its inputs,
//! which is what makes the ledger's orchestration testable without a
//! database in the loop.

use chrono::{DateTime, Utc};

use crate::models::geofence::{self, GeofenceStatus};

/// Mean Earth radius used by the haversine computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Outcome of evaluating one observation against one fence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Inside the circle while the session window is open.
    Inside,
    /// Session is open, but the observation is beyond the radius.
    Outside { distance_m: f64 },
    /// The session window is not currently open (not started, lapsed, or
    /// manually deactivated), regardless of where the observation is.
    NotOpen,
    /// The fence is not a circle. Creation validates the type, so this is
    /// only reachable for rows written outside the service.
    UnsupportedFenceType,
}

impl Admission {
    pub fn is_admissible(&self) -> bool {
        matches!(self, Admission::Inside)
    }
}

/// Decides whether an observation at (`latitude`, `longitude`) taken at
/// `now` is admissible for `fence`.
///
/// The temporal gate comes first: a closed fence rejects with
/// [`Admission::NotOpen`] without computing any distance. Callers are
/// expected to have range-validated the coordinates already.
pub fn evaluate(
    fence: &geofence::Model,
    latitude: f64,
    longitude: f64,
    now: DateTime<Utc>,
) -> Admission {
    if !fence.fence_type.eq_ignore_ascii_case("circle") {
        return Admission::UnsupportedFenceType;
    }

    if fence.effective_status(now) != GeofenceStatus::Active {
        return Admission::NotOpen;
    }

    let distance_m = haversine_distance_m(latitude, longitude, fence.latitude, fence.longitude);
    if distance_m <= fence.radius {
        Admission::Inside
    } else {
        Admission::Outside { distance_m }
    }
}

/// Great-circle distance in metres between two (lat, lon) points, in
/// degrees, on a sphere of radius [`EARTH_RADIUS_KM`].
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const CENTER_LAT: f64 = 6.5244;
    const CENTER_LON: f64 = 3.3792;

    fn open_fence(now: DateTime<Utc>, radius: f64) -> geofence::Model {
        geofence::Model {
            id: 1,
            fence_code: "Ab3dE9".into(),
            name: "GEO101".into(),
            latitude: CENTER_LAT,
            longitude: CENTER_LON,
            radius,
            fence_type: "circle".into(),
            start_time: now - Duration::minutes(10),
            end_time: now + Duration::minutes(50),
            status: GeofenceStatus::Active,
            time_created: now - Duration::minutes(10),
            creator_matric: "ADM/01/0001".into(),
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let d1 = haversine_distance_m(CENTER_LAT, CENTER_LON, 6.6000, 3.3792);
        let d2 = haversine_distance_m(6.6000, 3.3792, CENTER_LAT, CENTER_LON);
        assert_eq!(d1, d2);
        assert_eq!(
            haversine_distance_m(CENTER_LAT, CENTER_LON, CENTER_LAT, CENTER_LON),
            0.0
        );
    }

    #[test]
    fn known_distance_lagos_north() {
        // 6.5244 -> 6.6000 along a meridian is ~0.0756 deg, about 8.4 km.
        let d = haversine_distance_m(CENTER_LAT, CENTER_LON, 6.6000, CENTER_LON);
        assert!((8_300.0..8_500.0).contains(&d), "got {d}");
    }

    #[test]
    fn point_at_center_is_inside() {
        let now = Utc::now();
        let fence = open_fence(now, 100.0);
        assert_eq!(
            evaluate(&fence, CENTER_LAT, CENTER_LON, now),
            Admission::Inside
        );
    }

    #[test]
    fn point_just_within_radius_is_inside_and_beyond_is_outside() {
        let now = Utc::now();
        let fence = open_fence(now, 100.0);

        // ~0.0008 deg of latitude is roughly 89 m
        let near = evaluate(&fence, CENTER_LAT + 0.0008, CENTER_LON, now);
        assert_eq!(near, Admission::Inside);

        // ~0.0012 deg is roughly 133 m
        let far = evaluate(&fence, CENTER_LAT + 0.0012, CENTER_LON, now);
        assert!(matches!(
            far,
            Admission::Outside { distance_m } if distance_m > 100.0
        ));
    }

    #[test]
    fn closed_window_rejects_regardless_of_distance() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.end_time = now - Duration::hours(1);

        // stored status still Active; window decides
        assert_eq!(fence.status, GeofenceStatus::Active);
        assert_eq!(evaluate(&fence, CENTER_LAT, CENTER_LON, now), Admission::NotOpen);
    }

    #[test]
    fn not_yet_started_window_rejects() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.start_time = now + Duration::minutes(5);
        fence.status = GeofenceStatus::Scheduled;

        assert_eq!(evaluate(&fence, CENTER_LAT, CENTER_LON, now), Admission::NotOpen);
    }

    #[test]
    fn scheduled_fence_opens_once_window_begins() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.status = GeofenceStatus::Scheduled;

        // Window already began; no writeback needed for admission.
        assert_eq!(
            evaluate(&fence, CENTER_LAT, CENTER_LON, now),
            Admission::Inside
        );
    }

    #[test]
    fn deactivated_fence_stays_closed_inside_its_window() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.status = GeofenceStatus::Inactive;

        assert_eq!(evaluate(&fence, CENTER_LAT, CENTER_LON, now), Admission::NotOpen);
    }

    #[test]
    fn non_circle_fence_is_unsupported() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.fence_type = "polygon".into();

        assert_eq!(
            evaluate(&fence, CENTER_LAT, CENTER_LON, now),
            Admission::UnsupportedFenceType
        );
    }

    #[test]
    fn window_start_is_inclusive_and_end_is_exclusive() {
        let now = Utc::now();
        let mut fence = open_fence(now, 100.0);
        fence.start_time = now;
        fence.end_time = now + Duration::minutes(30);
        assert_eq!(
            evaluate(&fence, CENTER_LAT, CENTER_LON, now),
            Admission::Inside
        );

        let at_end = fence.end_time;
        assert_eq!(
            evaluate(&fence, CENTER_LAT, CENTER_LON, at_end),
            Admission::NotOpen
        );
    }
}
