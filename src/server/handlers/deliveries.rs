use axum::extract::{rejection::JsonRejection, Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::{Coordinates, DeliveryStatus, DeliveryStatusView, OrderRequest};
use crate::error::{invalid_input_error_with, Error};
use crate::server::{json_body, success, Reply};

#[derive(Serialize, Deserialize)]
pub struct CreateOrderParams {
    #[serde(default)]
    donation_id: String,
    pickup_lat: Option<f64>,
    pickup_lng: Option<f64>,
    dropoff_lat: Option<f64>,
    dropoff_lng: Option<f64>,
    ngo_id: Option<String>,
    #[serde(default)]
    ngo_name: String,
    #[serde(default)]
    ngo_phone: String,
    #[serde(default)]
    donor_name: String,
    #[serde(default)]
    donor_phone: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: DeliveryStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    order_id: Uuid,
    status: DeliveryStatus,
}

/// Both halves of a coordinate pair, or neither.
fn optional_point(
    name: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, Error> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude).map(Some),
        (None, None) => Ok(None),
        _ => Err(invalid_input_error_with(format!(
            "{} needs both latitude and longitude",
            name
        ))),
    }
}

pub async fn create_order(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<CreateOrderParams>, JsonRejection>,
) -> Reply<Created> {
    let params = json_body(body)?;

    let request = OrderRequest {
        pickup: optional_point("pickup", params.pickup_lat, params.pickup_lng)?,
        dropoff: optional_point("dropoff", params.dropoff_lat, params.dropoff_lng)?,
        donation_id: params.donation_id,
        ngo_id: params.ngo_id,
        ngo_name: params.ngo_name,
        ngo_phone: params.ngo_phone,
        donor_name: params.donor_name,
        donor_phone: params.donor_phone,
    };

    let order = api.create_order(request).await?;

    Ok(success(Created {
        order_id: order.id,
        status: order.status,
    }))
}

pub async fn find_status(
    Extension(api): Extension<DynAPI>,
    Path(donation_id): Path<String>,
) -> Reply<DeliveryStatusView> {
    let view = api.find_status(&donation_id).await?;

    Ok(success(view))
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    Path(donation_id): Path<String>,
    body: Result<Json<UpdateStatusParams>, JsonRejection>,
) -> Reply<DeliveryStatusView> {
    let params = json_body(body)?;

    let record = api.update_status(&donation_id, params.status).await?;

    Ok(success(record.into()))
}

#[test]
fn half_a_point_is_rejected() {
    assert_eq!(optional_point("pickup", None, None).unwrap(), None);
    assert!(optional_point("pickup", Some(12.0), Some(77.0)).unwrap().is_some());

    let err = optional_point("dropoff", Some(12.0), None).unwrap_err();
    assert_eq!(err.message, "dropoff needs both latitude and longitude");
}
