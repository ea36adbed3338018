//! Verb-to-endpoint dispatch for a single URL. Lets each HTTP method on a
//! path have a plain standalone endpoint instead of branching inside one
//! handler.

use axum::http::Method;

use crate::endpoint::ApiEndpoint;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct MethodRouter {
    endpoints: Vec<(Method, ApiEndpoint)>,
}

impl MethodRouter {
    pub fn builder() -> MethodRouterBuilder {
        MethodRouterBuilder {
            endpoints: Vec::new(),
        }
    }

    pub(crate) fn endpoint_for(&self, method: &Method) -> Option<&ApiEndpoint> {
        self.endpoints
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, endpoint)| endpoint)
    }

    pub(crate) fn entries(&self) -> &[(Method, ApiEndpoint)] {
        &self.endpoints
    }

    /// Value for the `Allow` header on a 405 response.
    pub(crate) fn allow_header(&self) -> String {
        let mut verbs: Vec<&str> = self.endpoints.iter().map(|(m, _)| m.as_str()).collect();
        verbs.sort_unstable();
        verbs.join(", ")
    }
}

pub struct MethodRouterBuilder {
    endpoints: Vec<(Method, ApiEndpoint)>,
}

impl MethodRouterBuilder {
    /// Adds an endpoint under the verb it was declared with.
    pub fn route(mut self, endpoint: ApiEndpoint) -> Self {
        self.endpoints
            .push((endpoint.method().clone(), endpoint));
        self
    }

    pub fn build(self) -> Result<MethodRouter> {
        if self.endpoints.is_empty() {
            return Err(Error::Routing("method router has no endpoints".to_string()));
        }
        for (index, (method, _)) in self.endpoints.iter().enumerate() {
            if self.endpoints[..index].iter().any(|(m, _)| m == method) {
                return Err(Error::Routing(format!(
                    "method router has more than one endpoint for {method}"
                )));
            }
        }
        Ok(MethodRouter {
            endpoints: self.endpoints,
        })
    }
}
