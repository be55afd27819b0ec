use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{BookingPreparation, BookingRequest, DeliveryStatus, LocationData};
use crate::server::{json_body, success, Reply};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareParams {
    provider: String,
    pickup_address: String,
    #[serde(default)]
    pickup_lat: f64,
    #[serde(default)]
    pickup_lng: f64,
    #[serde(default)]
    pickup_city: String,
    #[serde(default)]
    pickup_postal_code: String,
    drop_address: String,
    #[serde(default)]
    drop_lat: f64,
    #[serde(default)]
    drop_lng: f64,
    #[serde(default)]
    drop_city: String,
    #[serde(default)]
    drop_postal_code: String,
    #[serde(default)]
    is_mobile: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordParams {
    donation_id: String,
    provider: String,
    estimated_price: f64,
    #[serde(default)]
    distance: f64,
    estimated_duration_minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recorded {
    donation_id: String,
    status: DeliveryStatus,
}

pub async fn prepare(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<PrepareParams>, JsonRejection>,
) -> Reply<BookingPreparation> {
    let params = json_body(body)?;

    let pickup = LocationData {
        latitude: params.pickup_lat,
        longitude: params.pickup_lng,
        address: params.pickup_address,
        city: params.pickup_city,
        postal_code: params.pickup_postal_code,
    };
    let drop = LocationData {
        latitude: params.drop_lat,
        longitude: params.drop_lng,
        address: params.drop_address,
        city: params.drop_city,
        postal_code: params.drop_postal_code,
    };

    let booking = api.prepare_booking(&params.provider, &pickup, &drop, params.is_mobile);

    Ok(success(booking))
}

pub async fn record(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<RecordParams>, JsonRejection>,
) -> Reply<Recorded> {
    let params = json_body(body)?;

    let record = api
        .record_booking(BookingRequest {
            donation_id: params.donation_id,
            provider: params.provider,
            estimated_price: params.estimated_price,
            distance_km: params.distance,
            estimated_duration_minutes: params.estimated_duration_minutes,
        })
        .await?;

    Ok(success(Recorded {
        donation_id: record.donation_id,
        status: record.status,
    }))
}
