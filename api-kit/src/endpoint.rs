use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use utoipa::openapi::{RefOr, Schema};
use utoipa::PartialSchema;

use crate::error::{ApiError, ApiResult, FieldError};
use crate::param::{ParamType, ParamValue, QueryParam};
use crate::{adapter, encoder};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type ErasedHandler =
    Arc<dyn Fn(ApiRequest) -> BoxFuture<'static, ApiResult<Option<Value>>> + Send + Sync>;

pub(crate) type BodyValidator = Arc<dyn Fn(&Value) -> ApiResult<()> + Send + Sync>;

/// Request-scoped serialize-by-alias override.
///
/// Insert it into the request extensions (for example with
/// `axum::Extension`) to force alias serialization on or off for a single
/// call. It takes precedence over both the endpoint's own override and the
/// process-wide default.
#[derive(Debug, Clone, Copy)]
pub struct SerializeByAlias(pub bool);

/// Everything the request adapter decoded for one call: validated query
/// parameters, the validated JSON body, and the raw path parameters handed
/// through from the routing layer. Built fresh per request and dropped when
/// the handler returns.
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) path_params: BTreeMap<String, String>,
    pub(crate) query: BTreeMap<String, ParamValue>,
    pub(crate) body: Option<Value>,
    pub(crate) alias_override: Option<bool>,
}

impl ApiRequest {
    /// Raw path parameter, exactly as the router captured it.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.query.get(name).and_then(ParamValue::as_int)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(ParamValue::as_str)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.query.get(name).and_then(ParamValue::as_bool)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.query.get(name).and_then(ParamValue::as_date)
    }

    /// Deserializes the decoded request body into the declared type.
    ///
    /// The adapter has already validated the payload against the type
    /// declared on the endpoint, so this only fails when the requested type
    /// differs from the declared one, which is a programming error.
    pub fn body<B: DeserializeOwned>(&self) -> ApiResult<B> {
        let value = self.body.clone().ok_or_else(ApiError::internal)?;
        serde_json::from_value(value).map_err(|error| {
            tracing::error!(%error, "request body does not match the declared body type");
            ApiError::internal()
        })
    }
}

/// JSON schema captured for a declared body or response type.
#[derive(Clone)]
pub struct PayloadSchema {
    pub(crate) schema: RefOr<Schema>,
}

impl PayloadSchema {
    pub fn of<T: PartialSchema>() -> Self {
        Self { schema: T::schema() }
    }
}

/// The declared shape of an endpoint, preserved so the OpenAPI introspector
/// can reconstruct it without the handler.
#[derive(Clone)]
pub struct EndpointMeta {
    pub method: Method,
    pub operation_id: String,
    pub description: String,
    pub query_params: Vec<QueryParam>,
    pub tags: Vec<String>,
    pub response_status: StatusCode,
    pub in_schema: bool,
    pub serialize_by_alias: Option<bool>,
    pub aliases: BTreeMap<String, String>,
    pub(crate) body: Option<PayloadSchema>,
    pub(crate) response: Option<PayloadSchema>,
}

/// One API endpoint: an immutable declaration plus a type-erased handler.
/// Built once at startup through [`EndpointBuilder`].
#[derive(Clone)]
pub struct ApiEndpoint {
    pub(crate) meta: EndpointMeta,
    pub(crate) body_validator: Option<BodyValidator>,
    pub(crate) handler: ErasedHandler,
}

impl std::fmt::Debug for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEndpoint")
            .field("method", &self.meta.method)
            .field("operation_id", &self.meta.operation_id)
            .finish()
    }
}

impl ApiEndpoint {
    pub fn get(operation_id: &str) -> EndpointBuilder {
        EndpointBuilder::new(Method::GET, operation_id)
    }

    pub fn post(operation_id: &str) -> EndpointBuilder {
        EndpointBuilder::new(Method::POST, operation_id)
    }

    pub fn put(operation_id: &str) -> EndpointBuilder {
        EndpointBuilder::new(Method::PUT, operation_id)
    }

    pub fn patch(operation_id: &str) -> EndpointBuilder {
        EndpointBuilder::new(Method::PATCH, operation_id)
    }

    pub fn delete(operation_id: &str) -> EndpointBuilder {
        EndpointBuilder::new(Method::DELETE, operation_id)
    }

    pub fn method(&self) -> &Method {
        &self.meta.method
    }

    pub fn meta(&self) -> &EndpointMeta {
        &self.meta
    }

    pub(crate) fn body_validator(&self) -> Option<&BodyValidator> {
        self.body_validator.as_ref()
    }

    /// Runs the full request pipeline: decode, invoke, encode.
    pub(crate) async fn call(&self, req: Request<Body>, alias_default: bool) -> Response {
        let decoded = match adapter::decode(self, req).await {
            Ok(decoded) => decoded,
            Err(error) => return error.into_response(),
        };
        let alias_enabled = decoded
            .alias_override
            .or(self.meta.serialize_by_alias)
            .unwrap_or(alias_default);
        match (self.handler)(decoded).await {
            Ok(payload) => encoder::encode(payload, &self.meta, alias_enabled),
            Err(error) => error.into_response(),
        }
    }
}

/// Builder for [`ApiEndpoint`]. The declaration mirrors what the handler
/// expects; the adapter enforces it before the handler runs.
pub struct EndpointBuilder {
    meta: EndpointMeta,
    body_validator: Option<BodyValidator>,
}

impl EndpointBuilder {
    fn new(method: Method, operation_id: &str) -> Self {
        Self {
            meta: EndpointMeta {
                method,
                operation_id: operation_id.to_string(),
                description: String::new(),
                query_params: Vec::new(),
                tags: Vec::new(),
                response_status: StatusCode::OK,
                in_schema: true,
                serialize_by_alias: None,
                aliases: BTreeMap::new(),
                body: None,
                response: None,
            },
            body_validator: None,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.meta.description = text.to_string();
        self
    }

    /// Declares a required query parameter.
    pub fn query_param(mut self, name: &str, ty: ParamType) -> Self {
        self.meta.query_params.push(QueryParam::required(name, ty));
        self
    }

    /// Declares an optional query parameter; absent values are simply
    /// missing from the decoded request.
    pub fn optional_query_param(mut self, name: &str, ty: ParamType) -> Self {
        self.meta.query_params.push(QueryParam::optional(name, ty));
        self
    }

    /// Adds a classification tag, used for grouping operations and for
    /// include/exclude filtering at generation time.
    pub fn tag(mut self, tag: &str) -> Self {
        self.meta.tags.push(tag.to_string());
        self
    }

    pub fn response_status(mut self, status: StatusCode) -> Self {
        self.meta.response_status = status;
        self
    }

    /// Leaves the endpoint out of the generated OpenAPI document.
    pub fn exclude_from_schema(mut self) -> Self {
        self.meta.in_schema = false;
        self
    }

    /// Per-endpoint serialize-by-alias override. A request-scoped
    /// [`SerializeByAlias`] extension still wins over this.
    pub fn serialize_by_alias(mut self, enabled: bool) -> Self {
        self.meta.serialize_by_alias = Some(enabled);
        self
    }

    /// Maps a field name to the name it gets on the wire when alias
    /// serialization is enabled.
    pub fn alias(mut self, field: &str, wire: &str) -> Self {
        self.meta
            .aliases
            .insert(field.to_string(), wire.to_string());
        self
    }

    /// Declares the JSON body type. The payload is parsed and validated
    /// against `B` before the handler runs; the handler retrieves it with
    /// [`ApiRequest::body`].
    pub fn body<B>(mut self) -> Self
    where
        B: DeserializeOwned + PartialSchema + 'static,
    {
        self.meta.body = Some(PayloadSchema::of::<B>());
        self.body_validator = Some(Arc::new(|value: &Value| {
            serde_json::from_value::<B>(value.clone())
                .map(drop)
                .map_err(|error| {
                    let mut field_errors = BTreeMap::new();
                    field_errors.insert(
                        "body".to_string(),
                        FieldError {
                            message: error.to_string(),
                            code: None,
                        },
                    );
                    ApiError::validation(vec![format!("body: {error}")], field_errors)
                })
        }));
        self
    }

    /// Finishes the endpoint with a handler returning a JSON payload. The
    /// return type doubles as the declared response schema.
    pub fn handler<F, Fut, R>(mut self, f: F) -> ApiEndpoint
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<R>> + Send + 'static,
        R: Serialize + PartialSchema + Send + 'static,
    {
        self.meta.response = Some(PayloadSchema::of::<R>());
        let handler: ErasedHandler = Arc::new(move |req| {
            let fut = f(req);
            Box::pin(async move {
                let value = fut.await?;
                let json = serde_json::to_value(&value).map_err(|error| {
                    tracing::error!(%error, "failed to serialize response payload");
                    ApiError::internal()
                })?;
                Ok(Some(json))
            })
        });
        ApiEndpoint {
            meta: self.meta,
            body_validator: self.body_validator,
            handler,
        }
    }

    /// Finishes the endpoint with a handler that produces no payload; the
    /// response is 204 No Content with an empty body.
    pub fn empty_handler<F, Fut>(mut self, f: F) -> ApiEndpoint
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<()>> + Send + 'static,
    {
        self.meta.response = None;
        self.meta.response_status = StatusCode::NO_CONTENT;
        let handler: ErasedHandler = Arc::new(move |req| {
            let fut = f(req);
            Box::pin(async move {
                fut.await?;
                Ok(None)
            })
        });
        ApiEndpoint {
            meta: self.meta,
            body_validator: self.body_validator,
            handler,
        }
    }
}
