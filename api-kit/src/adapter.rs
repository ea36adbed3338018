//! The request adapter: maps an incoming request's query parameters and JSON
//! body onto an endpoint's declared parameters, producing either a fully
//! decoded argument set or a structured 400 failure.

use std::collections::{BTreeMap, HashMap};

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, Path};
use axum::http::{Method, Request};
use serde_json::Value;

use crate::endpoint::{ApiEndpoint, ApiRequest, SerializeByAlias};
use crate::error::{ApiError, ApiResult, FieldError};
use crate::param::ParamValue;

/// Verbs that may carry a request body.
fn can_have_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PATCH | Method::PUT)
}

pub(crate) async fn decode(
    endpoint: &ApiEndpoint,
    req: Request<Body>,
) -> ApiResult<ApiRequest> {
    let (mut parts, body) = req.into_parts();

    let alias_override = parts
        .extensions
        .get::<SerializeByAlias>()
        .map(|flag| flag.0);

    // Path parameters are handed through as raw strings; their syntax is
    // owned by the routing layer.
    let path_params: BTreeMap<String, String> =
        match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await {
            Ok(Path(params)) => params.into_iter().collect(),
            Err(_) => BTreeMap::new(),
        };

    let query = parse_query_params(endpoint, parts.uri.query().unwrap_or(""))?;

    let mut decoded_body = None;
    if endpoint.body_validator().is_some() && can_have_body(&parts.method) {
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| ApiError::bad_request("Invalid JSON"))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|_| ApiError::bad_request("Invalid JSON"))?;
        if let Some(validator) = endpoint.body_validator() {
            validator(&value)?;
        }
        decoded_body = Some(value);
    }

    Ok(ApiRequest {
        path_params,
        query,
        body: decoded_body,
        alias_override,
    })
}

/// Reads the declared query parameters out of the raw query string and
/// coerces them to their declared types. All failures are collected into a
/// single 400 response enumerating every offending parameter.
fn parse_query_params(
    endpoint: &ApiEndpoint,
    raw_query: &str,
) -> ApiResult<BTreeMap<String, ParamValue>> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(raw_query).unwrap_or_default();
    let mut by_name: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in pairs {
        // repeated parameters: last value wins
        by_name.insert(name, value);
    }

    let mut validated = BTreeMap::new();
    let mut errors = Vec::new();
    let mut field_errors = BTreeMap::new();

    for spec in &endpoint.meta().query_params {
        let wire = spec.wire_name();
        match by_name.get(&wire) {
            None => {
                if spec.required {
                    errors.push(format!("Query parameter {wire} must be specified"));
                    field_errors.insert(
                        wire,
                        FieldError {
                            message: "must be specified".to_string(),
                            code: Some("required".to_string()),
                        },
                    );
                }
            }
            Some(raw) => match spec.ty.coerce(raw, &wire) {
                Ok(value) => {
                    validated.insert(spec.name.clone(), value);
                }
                Err(message) => {
                    errors.push(message.clone());
                    field_errors.insert(
                        wire,
                        FieldError {
                            message,
                            code: Some("invalid".to_string()),
                        },
                    );
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(ApiError::validation(errors, field_errors))
    }
}
