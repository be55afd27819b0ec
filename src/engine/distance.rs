use std::sync::Arc;
use std::time::Duration;

use super::round_2dp;
use crate::{
    entities::{Coordinates, DistanceEstimate, DistanceSource},
    external::{DistanceMatrix, MatrixElement},
};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Flat average speed assumed when no road network data is available.
pub const FALLBACK_SPEED_KMH: f64 = 20.0;

/// Added to every travel time for pickup handling.
pub const PICKUP_BUFFER_MINUTES: u32 = 10;

/// Great-circle distance in kilometres, rounded to 2 decimal places.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_2dp(EARTH_RADIUS_KM * c)
}

/// Deterministic estimate used whenever the mapping service cannot answer.
pub fn fallback_estimate(pickup: Coordinates, drop: Coordinates) -> DistanceEstimate {
    let distance_km = haversine_km(pickup, drop);
    let travel_minutes = (distance_km / FALLBACK_SPEED_KMH * 60.0).floor() as u32;

    DistanceEstimate {
        distance_km,
        duration_minutes: travel_minutes + PICKUP_BUFFER_MINUTES,
        source: DistanceSource::Haversine,
    }
}

fn from_element(element: &MatrixElement) -> Option<DistanceEstimate> {
    let valid = |v: f64| v.is_finite() && v >= 0.0;
    if !valid(element.distance_meters) || !valid(element.duration_seconds) {
        return None;
    }

    let travel_minutes = (element.duration_seconds / 60.0).floor();
    if travel_minutes > f64::from(u32::MAX) {
        return None;
    }
    let duration_minutes = (travel_minutes as u32).checked_add(PICKUP_BUFFER_MINUTES)?;

    Some(DistanceEstimate {
        distance_km: element.distance_meters / 1000.0,
        duration_minutes,
        source: DistanceSource::Maps,
    })
}

/// Resolves pickup-to-drop distance, preferring the mapping service and
/// falling back to haversine. Never fails.
#[derive(Clone)]
pub struct DistanceResolver {
    maps: Option<Arc<dyn DistanceMatrix>>,
    timeout: Duration,
}

impl DistanceResolver {
    pub fn new(maps: Option<Arc<dyn DistanceMatrix>>, timeout: Duration) -> Self {
        Self { maps, timeout }
    }

    pub fn haversine_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, pickup: Coordinates, drop: Coordinates) -> DistanceEstimate {
        let maps = match &self.maps {
            Some(maps) => maps,
            None => {
                tracing::info!("mapping service not configured, using haversine");
                return fallback_estimate(pickup, drop);
            }
        };

        let lookup = maps.distance_and_duration(pickup, drop);

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(element)) if element.is_ok() => match from_element(&element) {
                Some(estimate) => {
                    tracing::info!(
                        distance_km = estimate.distance_km,
                        duration_minutes = estimate.duration_minutes,
                        "distance resolved by mapping service"
                    );
                    estimate
                }
                None => {
                    tracing::error!(?element, "malformed distance matrix element");
                    fallback_estimate(pickup, drop)
                }
            },
            Ok(Ok(element)) => {
                tracing::error!(status = %element.status, "distance matrix element not OK");
                fallback_estimate(pickup, drop)
            }
            Ok(Err(err)) => {
                tracing::error!(%err, "distance matrix lookup failed");
                fallback_estimate(pickup, drop)
            }
            Err(_) => {
                tracing::error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "distance matrix lookup timed out"
                );
                fallback_estimate(pickup, drop)
            }
        }
    }
}
