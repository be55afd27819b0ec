use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_invalid_input_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 104
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        config_error(format!("io error: {}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            104 => (StatusCode::NOT_FOUND, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "success": false,
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: 100,
        message: "invalid state".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn invalid_input_error_with<S: Into<String>>(message: S) -> Error {
    Error {
        code: 101,
        message: message.into(),
    }
}

pub fn not_found_error<S: Into<String>>(message: S) -> Error {
    Error {
        code: 104,
        message: message.into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn config_error<S: Into<String>>(message: S) -> Error {
    Error {
        code: 1,
        message: message.into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: format!("reqwest error: {}", err.without_url()),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn upstream_error_with<S: Into<String>>(message: S) -> Error {
    Error {
        code: 4,
        message: message.into(),
    }
}

pub fn unexpected_error<S: Into<String>>(message: S) -> Error {
    Error {
        code: 5,
        message: message.into(),
    }
}

pub fn serialization_error(err: serde_json::Error) -> Error {
    Error {
        code: 6,
        message: format!("serialization error: {}", err),
    }
}

#[test]
fn internal_errors_hide_their_message() {
    use axum::http::StatusCode;

    let response = upstream_error_with("maps quota exhausted").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = invalid_input_error_with("Latitude must be between -90 and 90").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = not_found_error("Donation not found").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = invalid_state_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
