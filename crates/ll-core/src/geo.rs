use crate::types::{NearbyRequest, Request, RequestStatus};
use std::cmp::Ordering;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two `(latitude, longitude)` points.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Pending requests with coordinates within `max_km` of `origin`, highest
/// priority first and nearest first within a priority.
pub fn rank_nearby(origin: (f64, f64), requests: Vec<Request>, max_km: f64) -> Vec<NearbyRequest> {
    let mut nearby: Vec<NearbyRequest> = requests
        .into_iter()
        .filter(|request| request.status == RequestStatus::Pending)
        .filter_map(|request| {
            let distance_km = haversine_km(origin, request.coordinates()?);
            (distance_km <= max_km).then_some(NearbyRequest {
                request,
                distance_km,
            })
        })
        .collect();
    nearby.sort_by(|a, b| {
        b.request
            .priority
            .cmp(&a.request.priority)
            .then(a.distance_km.partial_cmp(&b.distance_km).unwrap_or(Ordering::Equal))
    });
    nearby
}
