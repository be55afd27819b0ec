mod booking_api;
mod delivery_api;
pub mod distance;
mod estimate_api;
pub mod fare;
mod option_api;

pub use distance::DistanceResolver;
pub use fare::FareCalculator;

use std::sync::Arc;

use crate::{
    api::API,
    config::Config,
    db::{DeliveryStore, MemoryStore, PgStore},
    entities::PricingTable,
    error::Error,
    external::{google_maps::GoogleMaps, DistanceMatrix},
};

pub(crate) fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct Engine {
    resolver: DistanceResolver,
    fares: FareCalculator,
    store: Arc<dyn DeliveryStore>,
}

impl Engine {
    pub fn new(
        resolver: DistanceResolver,
        pricing: Arc<PricingTable>,
        store: Arc<dyn DeliveryStore>,
    ) -> Self {
        Self {
            resolver,
            fares: FareCalculator::new(pricing),
            store,
        }
    }

    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let maps = match &config.maps {
            Some(maps) => {
                let client = GoogleMaps::new(&maps.api_base, maps.api_key.clone(), maps.timeout)?;
                Some(Arc::new(client) as Arc<dyn DistanceMatrix>)
            }
            None => {
                tracing::info!("GOOGLE_MAPS_API_KEY not set, distances use the haversine fallback");
                None
            }
        };

        let pricing = match &config.pricing_table_path {
            Some(path) => PricingTable::from_json_file(path)?,
            None => PricingTable::default(),
        };

        let store: Arc<dyn DeliveryStore> = match &config.database {
            Some(db) => Arc::new(PgStore::new(&db.url, db.max_connections).await?),
            None => {
                tracing::warn!("DATABASE_URL not set, delivery orders are kept in memory");
                Arc::new(MemoryStore::new())
            }
        };

        tracing::info!(providers = pricing.len(), "pricing table loaded");

        Ok(Self::new(
            DistanceResolver::new(maps, config.maps_timeout),
            Arc::new(pricing),
            store,
        ))
    }

    /// Haversine-only engine over the built-in pricing table and an
    /// in-memory store.
    pub fn in_memory() -> Self {
        Self::new(
            DistanceResolver::haversine_only(),
            Arc::new(PricingTable::default()),
            Arc::new(MemoryStore::new()),
        )
    }
}

impl API for Engine {}

#[test]
fn rounds_to_cents() {
    assert_eq!(round_2dp(126.00000000000001), 126.0);
    assert_eq!(round_2dp(58.3333), 58.33);
    assert_eq!(round_2dp(0.0), 0.0);
}

#[test]
fn engine_from_default_config() {
    use tokio_test::block_on;

    let config = Config::from_lookup(|_| None).unwrap();
    let engine = block_on(Engine::from_config(&config)).unwrap();

    let here = crate::entities::Coordinates::new(12.9716, 77.5946).unwrap();
    let estimate = block_on(engine.resolver.resolve(here, here));
    assert_eq!(estimate.source, crate::entities::DistanceSource::Haversine);
    assert_eq!(engine.fares.table().len(), 5);
}
