use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Operator-facing failures raised while building route tables or generating
/// the OpenAPI document. These abort startup or the generation command, they
/// are never produced on the request path.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("route table error: {0}")]
    Routing(String),
    #[error("schema file is not in sync with the current code")]
    SchemaOutOfSync,
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Per-field detail attached to a validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub code: Option<String>,
}

/// Client-facing API failure.
///
/// Serializes to the payload shape API consumers expect: a list of error
/// messages, plus a `field_errors` map for validation failures.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    errors: Vec<String>,
    field_errors: Option<BTreeMap<String, FieldError>>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// A 400 response enumerating one or more validation failures.
    pub fn validation(
        errors: Vec<String>,
        field_errors: BTreeMap<String, FieldError>,
    ) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            errors,
            field_errors: Some(field_errors),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::validation(vec![message.into()], BTreeMap::new())
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            errors: vec!["The resource you tried to access does not exist".to_string()],
            field_errors: None,
        }
    }

    /// An error whose message is intended for the client, with a caller
    /// chosen status code.
    pub fn public(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![message.into()],
            field_errors: None,
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            errors: vec!["Internal server error".to_string()],
            field_errors: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(
            "errors".to_string(),
            Value::Array(self.errors.into_iter().map(Value::String).collect()),
        );
        if let Some(field_errors) = self.field_errors {
            // serialization of a string-keyed map cannot fail
            let value = serde_json::to_value(field_errors).unwrap_or(Value::Null);
            body.insert("field_errors".to_string(), value);
        }
        (self.status, Json(Value::Object(body))).into_response()
    }
}
