use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{Coordinates, DistanceEstimate, FareComparison};
use crate::error::{invalid_input_error_with, Error};
use crate::server::{json_body, success, Reply};

#[derive(Serialize, Deserialize)]
pub struct QuoteParams {
    pickup_lat: Option<f64>,
    pickup_lng: Option<f64>,
    dropoff_lat: Option<f64>,
    dropoff_lng: Option<f64>,
    #[serde(default)]
    serving_capacity: Option<u32>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateParams {
    pickup_lat: Option<f64>,
    pickup_lng: Option<f64>,
    drop_lat: Option<f64>,
    drop_lng: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct DistanceParams {
    pickup: Coordinates,
    drop: Coordinates,
}

/// Resolves the named fields in order, reporting every missing one at once.
fn required<const N: usize>(fields: [(&str, Option<f64>); N]) -> Result<[f64; N], Error> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(invalid_input_error_with(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(fields.map(|(_, value)| value.unwrap_or_default()))
}

pub async fn quote(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<QuoteParams>, JsonRejection>,
) -> Reply<FareComparison> {
    let params = json_body(body)?;

    let [pickup_lat, pickup_lng, dropoff_lat, dropoff_lng] = required([
        ("pickup_lat", params.pickup_lat),
        ("pickup_lng", params.pickup_lng),
        ("dropoff_lat", params.dropoff_lat),
        ("dropoff_lng", params.dropoff_lng),
    ])?;

    let pickup = Coordinates::new(pickup_lat, pickup_lng)?;
    let dropoff = Coordinates::new(dropoff_lat, dropoff_lng)?;

    let comparison = api
        .quote_all_providers(pickup, dropoff, params.serving_capacity.unwrap_or(0))
        .await;

    Ok(success(comparison))
}

pub async fn estimate_price(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<EstimateParams>, JsonRejection>,
) -> Reply<FareComparison> {
    let params = json_body(body)?;

    let [pickup_lat, pickup_lng, drop_lat, drop_lng] = required([
        ("pickupLat", params.pickup_lat),
        ("pickupLng", params.pickup_lng),
        ("dropLat", params.drop_lat),
        ("dropLng", params.drop_lng),
    ])?;

    let pickup = Coordinates::new(pickup_lat, pickup_lng)?;
    let drop = Coordinates::new(drop_lat, drop_lng)?;

    Ok(success(api.quote_all_providers(pickup, drop, 0).await))
}

pub async fn distance(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<DistanceParams>, JsonRejection>,
) -> Reply<DistanceEstimate> {
    let params = json_body(body)?;

    let pickup = Coordinates::new(params.pickup.latitude, params.pickup.longitude)?;
    let drop = Coordinates::new(params.drop.latitude, params.drop.longitude)?;

    Ok(success(api.resolve_distance(pickup, drop).await))
}

#[test]
fn required_reports_all_missing_fields() {
    let err = required([("a", Some(1.0)), ("b", None), ("c", None)]).unwrap_err();
    assert_eq!(err.message, "Missing required fields: b, c");

    assert_eq!(required([("a", Some(1.0)), ("b", Some(2.0))]).unwrap(), [1.0, 2.0]);
}
