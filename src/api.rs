use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entities::{
    BookingPreparation, BookingRequest, Coordinates, DeliveryOption, DeliveryOrder,
    DeliveryRecord, DeliveryStatus, DeliveryStatusView, DistanceEstimate, FareComparison,
    LocationData, OrderRequest,
};
use crate::error::Error;

/// Price estimation. Mapping failures degrade to the haversine estimate
/// instead of surfacing as errors.
#[async_trait]
pub trait EstimateAPI {
    async fn resolve_distance(&self, pickup: Coordinates, drop: Coordinates) -> DistanceEstimate;

    async fn quote_all_providers(
        &self,
        pickup: Coordinates,
        drop: Coordinates,
        serving_capacity: u32,
    ) -> FareComparison;

    fn quote_single_provider(&self, provider: &str, distance_km: f64, serving_capacity: u32)
        -> f64;
}

pub trait OptionAPI {
    fn list_options(&self) -> BTreeMap<String, DeliveryOption>;
    fn find_option(&self, id: &str) -> Result<DeliveryOption, Error>;
}

pub trait BookingAPI {
    fn prepare_booking(
        &self,
        provider: &str,
        pickup: &LocationData,
        drop: &LocationData,
        is_mobile: bool,
    ) -> BookingPreparation;
}

#[async_trait]
pub trait DeliveryAPI {
    async fn create_order(&self, request: OrderRequest) -> Result<DeliveryOrder, Error>;
    async fn record_booking(&self, request: BookingRequest) -> Result<DeliveryRecord, Error>;
    async fn update_status(
        &self,
        donation_id: &str,
        status: DeliveryStatus,
    ) -> Result<DeliveryRecord, Error>;
    async fn find_status(&self, donation_id: &str) -> Result<DeliveryStatusView, Error>;
}

pub trait API: EstimateAPI + OptionAPI + BookingAPI + DeliveryAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
