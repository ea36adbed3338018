//! The response encoder: serializes a handler's return value into an HTTP
//! response, honoring the endpoint's response status and alias map.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::endpoint::EndpointMeta;

pub(crate) fn encode(payload: Option<Value>, meta: &EndpointMeta, alias_enabled: bool) -> Response {
    let Some(mut value) = payload else {
        return StatusCode::NO_CONTENT.into_response();
    };
    if alias_enabled && !meta.aliases.is_empty() {
        apply_aliases(&mut value, &meta.aliases);
    }
    (meta.response_status, Json(value)).into_response()
}

/// Renames object keys according to the endpoint's alias map. Applied
/// recursively so aliased models nested in lists or objects are renamed too.
fn apply_aliases(value: &mut Value, aliases: &BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            let entries = std::mem::take(map);
            for (key, mut inner) in entries {
                apply_aliases(&mut inner, aliases);
                let key = aliases.get(&key).cloned().unwrap_or(key);
                map.insert(key, inner);
            }
        }
        Value::Array(items) => {
            for item in items {
                apply_aliases(item, aliases);
            }
        }
        _ => {}
    }
}
