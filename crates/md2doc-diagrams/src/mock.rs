//! Scripted transport for testing.
//!
//! Provides [`MockTransport`] for exercising provider chains without network
//! access.

use std::sync::RwLock;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Scripted outcome for requests whose URL starts with a prefix.
#[derive(Debug, Clone)]
struct Route {
    prefix: String,
    outcome: Result<HttpResponse, TransportError>,
}

/// Mock transport for testing.
///
/// Requests are matched against routes by URL prefix, first match wins.
/// Unmatched requests fail with a transport error. Every request is recorded.
///
/// # Example
///
/// ```ignore
/// use md2doc_diagrams::MockTransport;
///
/// let transport = MockTransport::new()
///     .with_response("https://kroki.io/", 200, png_bytes)
///     .with_error("https://mermaid.ink/", "connection refused");
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    requests: RwLock<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests under `prefix` with `status` and `body`.
    #[must_use]
    pub fn with_response(
        mut self,
        prefix: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes.push(Route {
            prefix: prefix.into(),
            outcome: Ok(HttpResponse::new(status, body)),
        });
        self
    }

    /// Fail requests under `prefix` with a transport error.
    #[must_use]
    pub fn with_error(mut self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.push(Route {
            prefix: prefix.into(),
            outcome: Err(TransportError::Request(message.into())),
        });
        self
    }

    /// Requests sent so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.read().unwrap().clone()
    }

    /// URLs of requests sent so far, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.write().unwrap().push(request.clone());
        self.routes
            .iter()
            .find(|route| request.url.starts_with(&route.prefix))
            .map_or_else(
                || Err(TransportError::Request(format!("no route for {}", request.url))),
                |route| route.outcome.clone(),
            )
    }
}
