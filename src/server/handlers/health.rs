use axum::extract::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub async fn check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "delivery",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
