use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{DistanceEstimate, PricingProfile};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQuote {
    pub provider: String,
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub estimated_price: f64,
    pub min_fare: f64,
    pub max_fare: f64,
    pub distance_km: f64,
    pub estimated_time_minutes: u32,
}

impl FareQuote {
    pub fn new(
        provider: &str,
        profile: &PricingProfile,
        estimated_price: f64,
        estimate: &DistanceEstimate,
    ) -> Self {
        Self {
            provider: provider.into(),
            base_fare: profile.base_fare,
            per_km_rate: profile.per_km_rate,
            estimated_price,
            min_fare: profile.min_fare,
            max_fare: profile.max_fare,
            distance_km: estimate.distance_km,
            estimated_time_minutes: estimate.duration_minutes,
        }
    }
}

/// One shared distance estimate priced against every configured provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareComparison {
    pub distance_km: f64,
    pub estimated_duration_minutes: u32,
    pub providers: BTreeMap<String, FareQuote>,
}
