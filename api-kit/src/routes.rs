//! The explicit route table: the registry endpoints are mounted in, walked
//! both by the axum router builder and by the OpenAPI introspector.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, on, MethodFilter};
use axum::Router;

use crate::config::ApiConfig;
use crate::endpoint::ApiEndpoint;
use crate::error::{Error, Result};
use crate::method_router::MethodRouter;

/// What a path pattern points at.
#[derive(Clone, Debug)]
pub enum RouteTarget {
    Endpoint(ApiEndpoint),
    Methods(MethodRouter),
    Include(RouteTable),
}

#[derive(Clone, Debug)]
struct Route {
    pattern: String,
    name: Option<String>,
    target: RouteTarget,
}

/// Converter kinds allowed in typed path patterns like `/notes/{id:int}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Int,
    Str,
    Slug,
}

#[derive(Debug, Clone)]
pub struct PathParam {
    pub name: String,
    pub kind: PathKind,
}

/// A route entry with its full path evaluated through every enclosing
/// include.
pub(crate) struct ResolvedRoute {
    /// Path with typed suffixes stripped, e.g. `/notes/{id}`. This is both
    /// the axum mount point and the OpenAPI path.
    pub path: String,
    pub path_params: Vec<PathParam>,
    pub name: Option<String>,
    pub target: RouteTarget,
}

/// Ordered mapping from URL path patterns to endpoints, method routers or
/// nested tables.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, pattern: &str, endpoint: ApiEndpoint) -> Self {
        self.push(pattern, None, RouteTarget::Endpoint(endpoint))
    }

    /// Adds an endpoint under a route name; the name becomes the operation
    /// id in the generated document.
    pub fn named_route(self, pattern: &str, name: &str, endpoint: ApiEndpoint) -> Self {
        self.push(pattern, Some(name), RouteTarget::Endpoint(endpoint))
    }

    pub fn methods(self, pattern: &str, router: MethodRouter) -> Self {
        self.push(pattern, None, RouteTarget::Methods(router))
    }

    pub fn named_methods(self, pattern: &str, name: &str, router: MethodRouter) -> Self {
        self.push(pattern, Some(name), RouteTarget::Methods(router))
    }

    /// Mounts a nested table under a path prefix.
    pub fn include(self, prefix: &str, table: RouteTable) -> Self {
        self.push(prefix, None, RouteTarget::Include(table))
    }

    fn push(mut self, pattern: &str, name: Option<&str>, target: RouteTarget) -> Self {
        self.routes.push(Route {
            pattern: pattern.to_string(),
            name: name.map(String::from),
            target,
        });
        self
    }

    /// Flattens nested tables into full paths, depth first in declaration
    /// order. Read-only and deterministic; shared by `into_router` and the
    /// OpenAPI introspector.
    pub(crate) fn resolve(&self) -> Result<Vec<ResolvedRoute>> {
        let mut resolved = Vec::new();
        self.resolve_into("/", &mut resolved)?;
        Ok(resolved)
    }

    fn resolve_into(&self, prefix: &str, out: &mut Vec<ResolvedRoute>) -> Result<()> {
        for route in &self.routes {
            let typed_path = join_paths(prefix, &route.pattern);
            match &route.target {
                RouteTarget::Include(table) => table.resolve_into(&typed_path, out)?,
                target => {
                    let (path, path_params) = parse_typed_path(&typed_path)?;
                    out.push(ResolvedRoute {
                        path,
                        path_params,
                        name: route.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds the axum router for this table. The serialize-by-alias default
    /// comes from the configuration; request-scoped overrides still win.
    pub fn into_router(self, config: &ApiConfig) -> Result<Router> {
        let alias_default = config.serialize_by_alias;
        let mut router = Router::new();
        for resolved in self.resolve()? {
            match resolved.target {
                RouteTarget::Endpoint(endpoint) => {
                    let filter = method_filter(endpoint.method())?;
                    let route_handler = move |req: Request<Body>| {
                        let endpoint = endpoint.clone();
                        async move { endpoint.call(req, alias_default).await }
                    };
                    router = router.route(&resolved.path, on(filter, route_handler));
                }
                RouteTarget::Methods(methods) => {
                    let route_handler = move |req: Request<Body>| {
                        let methods = methods.clone();
                        async move {
                            let method = req.method().clone();
                            match methods.endpoint_for(&method) {
                                Some(endpoint) => endpoint.call(req, alias_default).await,
                                None => (
                                    StatusCode::METHOD_NOT_ALLOWED,
                                    [(header::ALLOW, methods.allow_header())],
                                )
                                    .into_response(),
                            }
                        }
                    };
                    router = router.route(&resolved.path, any(route_handler));
                }
                RouteTarget::Include(_) => unreachable!("includes are flattened by resolve"),
            }
        }
        Ok(router)
    }
}

fn method_filter(method: &Method) -> Result<MethodFilter> {
    match *method {
        Method::GET => Ok(MethodFilter::GET),
        Method::POST => Ok(MethodFilter::POST),
        Method::PUT => Ok(MethodFilter::PUT),
        Method::PATCH => Ok(MethodFilter::PATCH),
        Method::DELETE => Ok(MethodFilter::DELETE),
        Method::HEAD => Ok(MethodFilter::HEAD),
        Method::OPTIONS => Ok(MethodFilter::OPTIONS),
        Method::TRACE => Ok(MethodFilter::TRACE),
        _ => Err(Error::Routing(format!("unsupported HTTP method: {method}"))),
    }
}

fn join_paths(prefix: &str, pattern: &str) -> String {
    let trimmed = pattern.trim_start_matches('/');
    if trimmed.is_empty() {
        return prefix.to_string();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), trimmed)
}

/// Parses a typed path like `/notes/{id:int}/publish` into its plain form
/// (`/notes/{id}/publish`) plus the declared path parameters.
fn parse_typed_path(path: &str) -> Result<(String, Vec<PathParam>)> {
    let mut params = Vec::new();
    let mut plain = String::new();
    for (index, segment) in path.split('/').enumerate() {
        if index > 0 {
            plain.push('/');
        }
        let inner = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'));
        let Some(inner) = inner else {
            plain.push_str(segment);
            continue;
        };
        let (name, kind) = match inner.split_once(':') {
            Some((name, kind)) => (name, kind),
            None => (inner, "str"),
        };
        let kind = match kind {
            "int" => PathKind::Int,
            "str" => PathKind::Str,
            "slug" => PathKind::Slug,
            other => {
                return Err(Error::Routing(format!(
                    "unknown path parameter kind `{other}` in `{path}`"
                )))
            }
        };
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Routing(format!(
                "invalid path parameter name `{name}` in `{path}`"
            )));
        }
        params.push(PathParam {
            name: name.to_string(),
            kind,
        });
        plain.push('{');
        plain.push_str(name);
        plain.push('}');
    }
    Ok((plain, params))
}
