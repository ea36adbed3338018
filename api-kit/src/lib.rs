//! # api-kit
//!
//! A thin, typed endpoint layer on top of `axum`. Endpoints are declared
//! through a builder composed with a plain async handler function; the
//! declaration drives query/body decoding, response encoding and code-first
//! OpenAPI generation via `utoipa`.

pub mod adapter;
pub mod config;
pub mod encoder;
pub mod endpoint;
pub mod error;
pub mod method_router;
pub mod openapi;
pub mod param;
pub mod routes;
pub mod schema_file;

// Re-export key dependencies so that the registration macro can use them.
pub use inventory;
pub use utoipa;

pub use config::{ApiConfig, TagFilter};
pub use endpoint::{ApiEndpoint, ApiRequest, EndpointBuilder, SerializeByAlias};
pub use error::{ApiError, ApiResult, Error, FieldError, Result};
pub use method_router::MethodRouter;
pub use param::{ParamType, ParamValue, QueryParam};
pub use routes::{RouteTable, RouteTarget};
pub use schema_file::SchemaCommand;

/// A named DTO schema contributed to `components/schemas` of the generated
/// document. Registered through [`register_schema!`] and discovered via
/// `inventory` when the document is built.
pub struct SchemaRegistration {
    pub name: &'static str,
    pub schema_provider:
        fn() -> Vec<(String, utoipa::openapi::RefOr<utoipa::openapi::Schema>)>,
}

inventory::collect!(SchemaRegistration);

/// Registers a `utoipa::ToSchema` type (and every named schema nested in it)
/// with the schema registry.
///
/// ```ignore
/// #[derive(serde::Serialize, utoipa::ToSchema)]
/// struct Note { id: i64, title: String }
///
/// api_kit::register_schema!(Note);
/// ```
#[macro_export]
macro_rules! register_schema {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::SchemaRegistration {
                name: stringify!($ty),
                schema_provider: || {
                    let mut schemas = Vec::new();
                    <$ty as $crate::utoipa::ToSchema>::schemas(&mut schemas);
                    schemas.push((
                        <$ty as $crate::utoipa::ToSchema>::name().into_owned(),
                        <$ty as $crate::utoipa::PartialSchema>::schema(),
                    ));
                    schemas
                },
            }
        }
    };
}
