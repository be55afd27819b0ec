use super::Engine;

use async_trait::async_trait;

use crate::{
    api::EstimateAPI,
    entities::{Coordinates, DistanceEstimate, FareComparison},
};

#[async_trait]
impl EstimateAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn resolve_distance(&self, pickup: Coordinates, drop: Coordinates) -> DistanceEstimate {
        self.resolver.resolve(pickup, drop).await
    }

    #[tracing::instrument(skip(self))]
    async fn quote_all_providers(
        &self,
        pickup: Coordinates,
        drop: Coordinates,
        serving_capacity: u32,
    ) -> FareComparison {
        self.fares
            .price_all(&self.resolver, pickup, drop, serving_capacity)
            .await
    }

    fn quote_single_provider(
        &self,
        provider: &str,
        distance_km: f64,
        serving_capacity: u32,
    ) -> f64 {
        self.fares.price_for(provider, distance_km, serving_capacity)
    }
}

#[test]
fn quotes_through_engine() {
    use tokio_test::block_on;

    let engine = Engine::in_memory();
    let pickup = Coordinates::new(12.9716, 77.5946).unwrap();

    let comparison = block_on(engine.quote_all_providers(pickup, pickup, 40));
    assert_eq!(comparison.estimated_duration_minutes, 10);
    // base fare of 30 scaled 1.4x for 40 servings
    assert_eq!(comparison.providers["porter"].estimated_price, 42.0);

    assert_eq!(engine.quote_single_provider("rapido", 5.0, 0), 75.0);
    assert_eq!(engine.quote_single_provider("bicycle", 5.0, 0), 0.0);
}
