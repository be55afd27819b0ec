use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DistanceMatrix, MatrixElement};
use crate::{
    entities::Coordinates,
    error::{invalid_input_error, upstream_error, upstream_error_with, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Value {
    value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Element {
    status: String,
    distance: Option<Value>,
    duration: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Row {
    elements: Vec<Element>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    rows: Vec<Row>,
    error_message: Option<String>,
}

/// Google Distance Matrix API client.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl GoogleMaps {
    /// `api_base` is a host such as `maps.googleapis.com`; a value that
    /// already carries a scheme is used as is.
    pub fn new(api_base: &str, key: String, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let base_url = if api_base.starts_with("http://") || api_base.starts_with("https://") {
            api_base.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", api_base.trim_end_matches('/'))
        };

        Ok(Self {
            client,
            base_url,
            key,
        })
    }
}

#[async_trait]
impl DistanceMatrix for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn distance_and_duration(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<MatrixElement, Error> {
        let origin: String = origin.into();
        let destination: String = destination.into();
        let url = format!("{}/maps/api/distancematrix/json", self.base_url);

        let res = self
            .client
            .get(url)
            .query(&[("key", self.key.as_str())])
            .query(&[("origins", origin)])
            .query(&[("destinations", destination)])
            .query(&[("mode", "driving")])
            .query(&[("units", "metric")])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response = res.json().await?;

        if data.status != "OK" {
            return Err(upstream_error_with(format!(
                "distance matrix status {}: {}",
                data.status,
                data.error_message.unwrap_or_default()
            )));
        }

        let element = data
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(upstream_error)?;

        Ok(MatrixElement {
            status: element.status,
            distance_meters: element.distance.map_or(0.0, |d| d.value),
            duration_seconds: element.duration.map_or(0.0, |d| d.value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleMaps {
        GoogleMaps::new(&server.uri(), "test-key".into(), Duration::from_secs(2)).unwrap()
    }

    fn points() -> (Coordinates, Coordinates) {
        (
            Coordinates::new(12.9716, 77.5946).unwrap(),
            Coordinates::new(12.9352, 77.6245).unwrap(),
        )
    }

    #[tokio::test]
    async fn parses_ok_element() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/distancematrix/json"))
            .and(query_param("mode", "driving"))
            .and(query_param("origins", "12.9716,77.5946"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "rows": [{"elements": [{
                    "status": "OK",
                    "distance": {"value": 6400, "text": "6.4 km"},
                    "duration": {"value": 1260, "text": "21 mins"}
                }]}]
            })))
            .mount(&server)
            .await;

        let (a, b) = points();
        let element = client(&server).distance_and_duration(a, b).await.unwrap();

        assert!(element.is_ok());
        assert_eq!(element.distance_meters, 6400.0);
        assert_eq!(element.duration_seconds, 1260.0);
    }

    #[tokio::test]
    async fn passes_through_element_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]
            })))
            .mount(&server)
            .await;

        let (a, b) = points();
        let element = client(&server).distance_and_duration(a, b).await.unwrap();

        assert!(!element.is_ok());
        assert_eq!(element.status, "ZERO_RESULTS");
        assert_eq!(element.distance_meters, 0.0);
    }

    #[tokio::test]
    async fn request_denied_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "rows": []
            })))
            .mount(&server)
            .await;

        let (a, b) = points();
        let err = client(&server).distance_and_duration(a, b).await.unwrap_err();

        assert_eq!(err.code, 4);
        assert!(err.message.contains("REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn server_error_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (a, b) = points();
        let err = client(&server).distance_and_duration(a, b).await.unwrap_err();

        assert_eq!(err, upstream_error());
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let (a, b) = points();
        assert!(client(&server).distance_and_duration(a, b).await.is_err());
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_key() {
        let maps = GoogleMaps::new(
            "http://127.0.0.1:1",
            "SECRET-KEY-123".into(),
            Duration::from_secs(2),
        )
        .unwrap();

        let (a, b) = points();
        let err = maps.distance_and_duration(a, b).await.unwrap_err();

        assert_eq!(err.code, 3);
        assert!(!err.message.contains("SECRET-KEY-123"), "{}", err.message);
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn decode_errors_do_not_leak_the_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let (a, b) = points();
        let err = client(&server).distance_and_duration(a, b).await.unwrap_err();

        assert!(!err.message.contains("key="), "{}", err.message);
    }
}
