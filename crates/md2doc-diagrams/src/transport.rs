//! HTTP transport seam.
//!
//! Providers build [`HttpRequest`] values and hand them to an
//! [`HttpTransport`]. Non-2xx statuses are returned as responses, not
//! errors, so each provider can map status codes itself.

use std::borrow::Cow;
use std::time::Duration;

use ureq::Agent;

/// HTTP method used by diagram providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// GET request without a body.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// POST request with a `Content-Type` header.
    #[must_use]
    pub fn post(url: impl Into<String>, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_owned(), content_type.to_owned())],
            body: body.into(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value matching `name`, case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// HTTP response: status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Transport failure: the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Sends HTTP requests on behalf of diagram providers.
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connection, timeout or body read failures.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Create an HTTP agent with an optional global timeout.
///
/// Status codes are never turned into errors.
#[must_use]
pub fn create_agent(timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`HttpTransport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_slice())
            }
        };

        let response = result.map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_vec()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_sets_content_type() {
        let request = HttpRequest::post("https://kroki.io/mermaid/png", "text/plain", "graph TD");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("content-type"), Some("text/plain"));
        assert_eq!(request.body, b"graph TD");
    }

    #[test]
    fn test_header_lookup_missing() {
        let request = HttpRequest::get("https://mermaid.ink/img/x").header("Accept", "image/*");
        assert_eq!(request.header_value("Accept"), Some("image/*"));
        assert_eq!(request.header_value("Authorization"), None);
    }

    #[test]
    fn test_response_text_is_lossy() {
        let response = HttpResponse::new(400, vec![b'b', b'a', b'd', 0xFF]);
        assert_eq!(response.text(), "bad\u{FFFD}");
    }
}
