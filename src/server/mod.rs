mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::server::handlers::{bookings, deliveries, health, options, quotes};
use crate::{
    api::{DynAPI, API},
    error::{invalid_input_error_with, unexpected_error, Error},
};

#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    data: T,
}

pub type Reply<T> = Result<Json<Success<T>>, Error>;

pub fn success<T: Serialize>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

/// Malformed or mistyped JSON bodies are client errors.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(params)| params).map_err(|rejection| {
        invalid_input_error_with(format!("Invalid request body: {}", rejection))
    })
}

pub fn router(api: DynAPI) -> Router {
    let delivery = Router::new()
        .route("/health", get(health::check))
        .route("/options", get(options::list))
        .route("/options/:id", get(options::find))
        .route("/quote", post(quotes::quote))
        .route("/estimate-price", post(quotes::estimate_price))
        .route("/distance", post(quotes::distance))
        .route("/prepare-booking", post(bookings::prepare))
        .route("/book", post(bookings::record))
        .route("/order", post(deliveries::create_order))
        .route(
            "/status/:donation_id",
            get(deliveries::find_status).patch(deliveries::update_status),
        );

    Router::new()
        .nest("/api/delivery", delivery)
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| unexpected_error(format!("server error: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::engine::Engine;

    fn app() -> Router {
        router(Arc::new(Engine::in_memory()) as DynAPI)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (status, body) = call(&app(), Method::GET, "/api/delivery/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "delivery");
    }

    #[tokio::test]
    async fn quote_same_point_uses_fallback() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/quote",
            Some(json!({
                "pickup_lat": 12.9716,
                "pickup_lng": 77.5946,
                "dropoff_lat": 12.9716,
                "dropoff_lng": 77.5946
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["distanceKm"], 0.0);
        assert_eq!(body["data"]["estimatedDurationMinutes"], 10);
        assert_eq!(body["data"]["providers"]["porter"]["estimatedPrice"], 30.0);
        assert_eq!(body["data"]["providers"]["porter"]["maxFare"], 500.0);
        assert_eq!(body["data"]["providers"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn quote_applies_serving_capacity() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/quote",
            Some(json!({
                "pickup_lat": 12.9716,
                "pickup_lng": 77.5946,
                "dropoff_lat": 12.9716,
                "dropoff_lng": 77.5946,
                "serving_capacity": 60
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["providers"]["rapido"]["estimatedPrice"], 40.0);
    }

    #[tokio::test]
    async fn quote_lists_missing_fields() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/quote",
            Some(json!({ "pickup_lat": 12.9716, "dropoff_lng": 77.5946 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Missing required fields: pickup_lng, dropoff_lat"
        );
    }

    #[tokio::test]
    async fn quote_rejects_out_of_range_latitude() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/quote",
            Some(json!({
                "pickup_lat": 91.0,
                "pickup_lng": 77.5946,
                "dropoff_lat": 12.9716,
                "dropoff_lng": 77.5946
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Latitude must be between -90 and 90");
    }

    #[tokio::test]
    async fn quote_rejects_non_numeric_capacity() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/quote",
            Some(json!({
                "pickup_lat": 12.9716,
                "pickup_lng": 77.5946,
                "dropoff_lat": 12.9716,
                "dropoff_lng": 77.5946,
                "serving_capacity": "lots"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 101);
    }

    #[tokio::test]
    async fn estimate_price_accepts_camel_case() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/estimate-price",
            Some(json!({
                "pickupLat": 12.9716,
                "pickupLng": 77.5946,
                "dropLat": 12.9352,
                "dropLng": 77.6245
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let distance = body["data"]["distanceKm"].as_f64().unwrap();
        assert!(distance > 5.0 && distance < 5.3);
        assert_eq!(body["data"]["providers"]["dunzo"]["distanceKm"], body["data"]["distanceKm"]);
    }

    #[tokio::test]
    async fn options_can_be_listed_and_found() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/api/delivery/options", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["porter"]["name"], "Porter");

        let (status, body) = call(&app, Method::GET, "/api/delivery/options/rapido", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["description"], "Bike delivery service");

        let (status, _) = call(&app, Method::GET, "/api/delivery/options/ola", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prepare_booking_returns_redirect_and_addresses() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/prepare-booking",
            Some(json!({
                "provider": "porter",
                "pickupAddress": "Community Kitchen",
                "pickupCity": "Bengaluru",
                "dropAddress": "Hope Shelter",
                "isMobile": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["redirectUrl"], "porter://");
        assert_eq!(
            body["data"]["addresses"]["fullText"],
            "PICKUP: Community Kitchen, Bengaluru\n\nDROP: Hope Shelter"
        );
    }

    #[tokio::test]
    async fn order_book_and_track() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/delivery/order",
            Some(json!({
                "donation_id": "donation-9",
                "pickup_lat": 12.9716,
                "pickup_lng": 77.5946,
                "ngo_name": "Hope Shelter"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "pending");
        assert!(body["data"]["orderId"].is_string());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/delivery/book",
            Some(json!({
                "donationId": "donation-9",
                "provider": "dunzo",
                "estimatedPrice": 100.0,
                "distance": 5.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "booked");

        let (status, _) = call(
            &app,
            Method::PATCH,
            "/api/delivery/status/donation-9",
            Some(json!({ "status": "in_progress" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/api/delivery/status/donation-9", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["method"], "dunzo");
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["statusBadge"]["label"], "On the way");
        assert_eq!(body["data"]["timeline"][2]["status"], "in_progress");
    }

    #[tokio::test]
    async fn order_without_donation_is_rejected() {
        let (status, body) = call(
            &app(),
            Method::POST,
            "/api/delivery/order",
            Some(json!({ "ngo_name": "Hope Shelter" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "donation_id required");
    }

    #[tokio::test]
    async fn unknown_donation_status_is_not_found() {
        let (status, body) = call(&app(), Method::GET, "/api/delivery/status/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Donation not found");
    }
}
