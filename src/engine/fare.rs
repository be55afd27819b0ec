use std::collections::BTreeMap;
use std::sync::Arc;

use super::{round_2dp, DistanceResolver};
use crate::entities::{
    Coordinates, DistanceEstimate, FareComparison, FareQuote, PricingProfile, PricingTable,
};

/// Price scaling for the number of people a donation serves.
pub fn quantity_multiplier(serving_capacity: u32) -> f64 {
    match serving_capacity {
        0..=20 => 1.0,
        21..=30 => 1.2,
        31..=50 => 1.4,
        _ => 1.6,
    }
}

/// `(base + km * rate) * multiplier`, clamped to the profile's fare bounds
/// and rounded to 2 decimal places.
pub fn price_with(profile: &PricingProfile, distance_km: f64, serving_capacity: u32) -> f64 {
    let mut price = profile.base_fare + distance_km * profile.per_km_rate;

    if serving_capacity > 0 {
        price *= quantity_multiplier(serving_capacity);
    }

    round_2dp(price.min(profile.max_fare).max(profile.min_fare))
}

#[derive(Clone, Debug)]
pub struct FareCalculator {
    table: Arc<PricingTable>,
}

impl FareCalculator {
    pub fn new(table: Arc<PricingTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    /// Unknown providers price at zero rather than failing the whole quote.
    #[tracing::instrument(skip(self))]
    pub fn price_for(&self, provider: &str, distance_km: f64, serving_capacity: u32) -> f64 {
        let profile = match self.table.get(provider) {
            Some(profile) => profile,
            None => {
                tracing::warn!(provider, "provider not found in pricing table");
                return 0.0;
            }
        };

        let distance_km = sanitize_distance(distance_km);
        let price = price_with(profile, distance_km, serving_capacity);

        tracing::debug!(provider, price, distance_km, serving_capacity, "priced provider");

        price
    }

    /// Prices every configured provider against one shared estimate.
    pub fn compare(&self, estimate: &DistanceEstimate, serving_capacity: u32) -> FareComparison {
        let distance_km = sanitize_distance(estimate.distance_km);
        // prices use the exact distance, responses show it to 2 decimal places
        let shown = DistanceEstimate {
            distance_km: round_2dp(distance_km),
            ..*estimate
        };

        let providers: BTreeMap<String, FareQuote> = self
            .table
            .iter()
            .map(|(provider, profile)| {
                let price = price_with(profile, distance_km, serving_capacity);
                (
                    provider.to_string(),
                    FareQuote::new(provider, profile, price, &shown),
                )
            })
            .collect();

        FareComparison {
            distance_km: shown.distance_km,
            estimated_duration_minutes: shown.duration_minutes,
            providers,
        }
    }

    /// Resolves the distance once and quotes all providers from it.
    #[tracing::instrument(skip(self, resolver))]
    pub async fn price_all(
        &self,
        resolver: &DistanceResolver,
        pickup: Coordinates,
        drop: Coordinates,
        serving_capacity: u32,
    ) -> FareComparison {
        let estimate = resolver.resolve(pickup, drop).await;
        let comparison = self.compare(&estimate, serving_capacity);

        tracing::info!(
            distance_km = comparison.distance_km,
            providers = comparison.providers.len(),
            "quoted all providers"
        );

        comparison
    }
}

fn sanitize_distance(distance_km: f64) -> f64 {
    if distance_km.is_finite() && distance_km >= 0.0 {
        return distance_km;
    }

    tracing::warn!(distance_km, "invalid distance, pricing as zero");
    0.0
}
