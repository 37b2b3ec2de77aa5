//! Per-resource-type policy
//!
//! Choices the core deliberately does not hard-code: the scope prefix that
//! binds tokens to a resource, whether a missing resource is transient (404)
//! or permanent (410), and the advertised method set for OPTIONS.

use http::Method;

/// Configuration for one resource type behind the state machine.
#[derive(Debug, Clone)]
pub struct ResourcePolicy {
    scope: String,
    gone_when_missing: bool,
    allowed_methods: Vec<Method>,
}

impl ResourcePolicy {
    /// Policy with the given scope prefix (e.g. `/fortune/v1`), transient
    /// not-found, and the default method set.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            gone_when_missing: false,
            allowed_methods: vec![
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ],
        }
    }

    /// Report missing resources as permanent (410 Gone) instead of 404.
    pub fn gone_when_missing(mut self, gone: bool) -> Self {
        self.gone_when_missing = gone;
        self
    }

    /// Restrict the advertised and accepted method set.
    pub fn allowed_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = methods.into_iter().collect();
        self
    }

    /// The scope key for one resource id: `{scope}/{id}`.
    ///
    /// This is what binds a version token to a single resource; the same
    /// counter encodes differently under different ids.
    pub fn scope_for(&self, id: &str) -> String {
        format!("{}/{}", self.scope, id)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_gone_when_missing(&self) -> bool {
        self.gone_when_missing
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    pub fn methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Comma-separated method list for the `Allow` header.
    pub fn allow_header(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
