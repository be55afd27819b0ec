use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Maps,
    Haversine,
}

/// Distance and travel time between a pickup and a drop, including the
/// fixed pickup-handling buffer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceEstimate {
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub source: DistanceSource,
}
