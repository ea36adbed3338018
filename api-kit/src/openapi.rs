//! The schema introspector: walks a route table and emits an OpenAPI
//! document, delegating schema synthesis to `utoipa`.
//!
//! Generation is deterministic for a fixed table and configuration: paths
//! and components are sorted maps and operations follow declaration order,
//! so repeated runs produce byte-identical output.

use axum::http::Method;
use utoipa::openapi::path::{OperationBuilder, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, SchemaFormat, Type};
use utoipa::openapi::server::ServerBuilder;
use utoipa::openapi::{
    self, ComponentsBuilder, ContentBuilder, RefOr, Required, ResponseBuilder,
    ResponsesBuilder, Schema,
};

use crate::config::{ApiConfig, TagFilter};
use crate::endpoint::ApiEndpoint;
use crate::error::{Error, Result};
use crate::param::ParamType;
use crate::routes::{PathKind, ResolvedRoute, RouteTable, RouteTarget};
use crate::SchemaRegistration;

/// Entrypoint for generating an API spec from a route table.
pub fn generate_api_spec(table: &RouteTable, config: &ApiConfig) -> Result<openapi::OpenApi> {
    let filter = config.tag_filter()?;

    let mut doc = openapi::OpenApiBuilder::new()
        .info(
            openapi::InfoBuilder::new()
                .title(config.title.clone())
                .version(config.version.clone())
                .build(),
        )
        .paths(openapi::Paths::new())
        .build();

    if !config.servers.is_empty() {
        let servers = config
            .servers
            .iter()
            .map(|url| ServerBuilder::new().url(url.clone()).build())
            .collect();
        doc.servers = Some(servers);
    }

    let mut operation_count = 0usize;
    for resolved in table.resolve()? {
        match &resolved.target {
            RouteTarget::Endpoint(endpoint) => {
                let operation_id = resolved
                    .name
                    .clone()
                    .unwrap_or_else(|| endpoint.meta().operation_id.clone());
                operation_count +=
                    add_operation(&mut doc, &resolved, endpoint, operation_id, &filter)?;
            }
            RouteTarget::Methods(methods) => {
                for (method, endpoint) in methods.entries() {
                    let operation_id = match &resolved.name {
                        Some(name) => {
                            format!("{}-{}", method.as_str().to_ascii_lowercase(), name)
                        }
                        None => endpoint.meta().operation_id.clone(),
                    };
                    operation_count +=
                        add_operation(&mut doc, &resolved, endpoint, operation_id, &filter)?;
                }
            }
            RouteTarget::Include(_) => unreachable!("includes are flattened by resolve"),
        }
    }

    doc.components = Some(registered_components());

    tracing::info!(
        paths = doc.paths.paths.len(),
        operations = operation_count,
        "generated OpenAPI document"
    );
    Ok(doc)
}

/// Generates the spec and serializes it to pretty-printed JSON.
pub fn spec_json(table: &RouteTable, config: &ApiConfig) -> Result<String> {
    let spec = generate_api_spec(table, config)?;
    Ok(spec.to_pretty_json()?)
}

fn add_operation(
    doc: &mut openapi::OpenApi,
    resolved: &ResolvedRoute,
    endpoint: &ApiEndpoint,
    operation_id: String,
    filter: &TagFilter,
) -> Result<usize> {
    let meta = endpoint.meta();
    if !meta.in_schema {
        tracing::debug!(%operation_id, "endpoint excluded from schema");
        return Ok(0);
    }
    if !filter.allows(&meta.tags) {
        tracing::debug!(%operation_id, "endpoint filtered out by tag configuration");
        return Ok(0);
    }

    let mut operation = OperationBuilder::new()
        .operation_id(Some(operation_id))
        .description(Some(meta.description.clone()));
    for tag in &meta.tags {
        operation = operation.tag(tag);
    }

    for param in &resolved.path_params {
        operation = operation.parameter(
            ParameterBuilder::new()
                .name(param.name.clone())
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .schema(Some(path_kind_schema(param.kind)))
                .build(),
        );
    }
    for spec in &meta.query_params {
        operation = operation.parameter(
            ParameterBuilder::new()
                .name(spec.wire_name())
                .parameter_in(ParameterIn::Query)
                .required(if spec.required {
                    Required::True
                } else {
                    Required::False
                })
                .schema(Some(param_type_schema(spec.ty)))
                .build(),
        );
    }

    if let Some(body) = &meta.body {
        operation = operation.request_body(Some(
            RequestBodyBuilder::new()
                .required(Some(Required::True))
                .content(
                    "application/json",
                    ContentBuilder::new().schema(Some(body.schema.clone())).build(),
                )
                .build(),
        ));
    }

    let mut response = ResponseBuilder::new().description("");
    if let Some(schema) = &meta.response {
        response = response.content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(schema.schema.clone()))
                .build(),
        );
    }
    operation = operation.responses(
        ResponsesBuilder::new()
            .response(meta.response_status.as_u16().to_string(), response.build())
            .build(),
    );

    let operation = operation.build();
    let path_item = doc.paths.paths.entry(resolved.path.clone()).or_default();
    set_operation(path_item, &meta.method, operation, &resolved.path)?;
    Ok(1)
}

fn set_operation(
    path_item: &mut openapi::PathItem,
    method: &Method,
    operation: openapi::path::Operation,
    path: &str,
) -> Result<()> {
    let slot = match *method {
        Method::GET => &mut path_item.get,
        Method::POST => &mut path_item.post,
        Method::PUT => &mut path_item.put,
        Method::PATCH => &mut path_item.patch,
        Method::DELETE => &mut path_item.delete,
        Method::HEAD => &mut path_item.head,
        Method::OPTIONS => &mut path_item.options,
        Method::TRACE => &mut path_item.trace,
        _ => {
            return Err(Error::Routing(format!(
                "unsupported HTTP method {method} at {path}"
            )))
        }
    };
    if slot.is_some() {
        tracing::warn!(%method, %path, "duplicate operation replaces an earlier one");
    }
    *slot = Some(operation);
    Ok(())
}

fn param_type_schema(ty: ParamType) -> RefOr<Schema> {
    let object = match ty {
        ParamType::Str => ObjectBuilder::new().schema_type(Type::String),
        ParamType::Int => ObjectBuilder::new().schema_type(Type::Integer),
        ParamType::Bool => ObjectBuilder::new().schema_type(Type::Boolean),
        ParamType::Date => ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Date))),
    };
    RefOr::T(Schema::Object(object.build()))
}

fn path_kind_schema(kind: PathKind) -> RefOr<Schema> {
    let object = match kind {
        PathKind::Int => ObjectBuilder::new().schema_type(Type::Integer),
        PathKind::Str | PathKind::Slug => ObjectBuilder::new().schema_type(Type::String),
    };
    RefOr::T(Schema::Object(object.build()))
}

/// Collects every DTO schema registered with `register_schema!` into the
/// `components/schemas` section, sorted by name.
fn registered_components() -> openapi::Components {
    let mut schemas: Vec<(String, RefOr<Schema>)> = Vec::new();
    for registration in inventory::iter::<SchemaRegistration> {
        schemas.extend((registration.schema_provider)());
    }
    schemas.sort_by(|a, b| a.0.cmp(&b.0));
    schemas.dedup_by(|a, b| a.0 == b.0);
    ComponentsBuilder::new().schemas_from_iter(schemas).build()
}
