//! Remote mermaid rendering providers.
//!
//! Each provider knows its own request shape and status-code mapping.
//! Responses are only accepted when the body decodes as an image header.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use md2doc_config::{DiagramProvider, ProviderConfig, Theme};
use serde::Serialize;

use crate::consts::{
    ERROR_BODY_LIMIT, KROKI_DIAGRAM_TYPE, MAX_URL_LENGTH, MERMAID_CHART_URL, MERMAID_INK_URL,
    MERMAID_INK_WIDTH,
};
use crate::probe::{ImageInfo, probe_image};
use crate::theme::apply_theme;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A remote rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Kroki server (`POST {base_url}/mermaid/png`).
    Kroki { base_url: String },
    /// mermaid.ink public service, source encoded into the URL.
    MermaidInk,
    /// MermaidChart API with a bearer token.
    MermaidChart { api_key: String },
    /// User-supplied endpoint taking `{code, theme}` JSON.
    Custom { url: String },
}

/// Single provider failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("mermaid syntax error: {0}")]
    Syntax(String),
    #[error("diagram too large for URL encoding ({0} characters)")]
    TooLarge(usize),
    #[error("diagram too long (HTTP 414)")]
    TooLong,
    #[error("invalid API key (HTTP 401)")]
    InvalidApiKey,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid image data: {0}")]
    InvalidImage(String),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Image bytes returned by a provider, with their probed header.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub info: ImageInfo,
}

#[derive(Serialize)]
struct ChartRequest<'a> {
    code: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<&'static str>,
}

#[derive(Serialize)]
struct CustomRequest<'a> {
    code: &'a str,
    theme: &'a str,
}

impl Provider {
    /// Short provider name used in logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kroki { .. } => "kroki",
            Self::MermaidInk => "mermaid.ink",
            Self::MermaidChart { .. } => "mermaidchart",
            Self::Custom { .. } => "custom",
        }
    }

    /// Whether the service receives the theme as an init directive.
    fn injects_theme(&self) -> bool {
        matches!(self, Self::Kroki { .. } | Self::MermaidInk)
    }

    /// Build the HTTP request for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::TooLarge`] when a mermaid.ink URL would exceed
    /// the service limit, or [`ProviderError::Encode`] if the JSON body fails.
    pub fn request(&self, source: &str, theme: Theme) -> Result<HttpRequest, ProviderError> {
        let code = if self.injects_theme() {
            apply_theme(source, theme)
        } else {
            source.into()
        };

        match self {
            Self::Kroki { base_url } => {
                let url = format!(
                    "{}/{KROKI_DIAGRAM_TYPE}/png",
                    base_url.trim_end_matches('/')
                );
                Ok(HttpRequest::post(url, "text/plain", code.as_bytes()))
            }
            Self::MermaidInk => {
                let encoded = BASE64_STANDARD.encode(code.as_bytes());
                let url = format!(
                    "{MERMAID_INK_URL}/img/{encoded}?theme={theme}&width={MERMAID_INK_WIDTH}"
                );
                if url.len() > MAX_URL_LENGTH {
                    return Err(ProviderError::TooLarge(url.len()));
                }
                Ok(HttpRequest::get(url))
            }
            Self::MermaidChart { api_key } => {
                let body = serde_json::to_vec(&ChartRequest {
                    code: &code,
                    format: "png",
                    theme: (!theme.is_neutral()).then(|| theme.as_str()),
                })?;
                Ok(
                    HttpRequest::post(MERMAID_CHART_URL, "application/json", body)
                        .header("Authorization", format!("Bearer {api_key}")),
                )
            }
            Self::Custom { url } => {
                let body = serde_json::to_vec(&CustomRequest {
                    code: &code,
                    theme: theme.as_str(),
                })?;
                Ok(HttpRequest::post(url.as_str(), "application/json", body))
            }
        }
    }

    /// Map a response status to the image body or a provider error.
    fn check_status(&self, response: HttpResponse) -> Result<Vec<u8>, ProviderError> {
        match (self, response.status) {
            (_, 200) => Ok(response.body),
            (Self::Kroki { .. }, 400) => Err(ProviderError::Syntax(truncate_body(&response))),
            (Self::MermaidInk, 414) => Err(ProviderError::TooLong),
            (Self::MermaidChart { .. }, 401) => Err(ProviderError::InvalidApiKey),
            (_, status) => Err(ProviderError::Http {
                status,
                body: truncate_body(&response),
            }),
        }
    }

    /// Render `source` through this provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the request cannot be built or sent,
    /// the service answers with a non-200 status, or the body is not an image.
    pub fn fetch(
        &self,
        transport: &dyn HttpTransport,
        source: &str,
        theme: Theme,
    ) -> Result<FetchedImage, ProviderError> {
        let request = self.request(source, theme)?;
        let response = transport.send(&request)?;
        let data = self.check_status(response)?;
        let info = probe_image(&data).map_err(ProviderError::InvalidImage)?;
        Ok(FetchedImage { data, info })
    }
}

/// Ordered provider chain for `config`.
///
/// A credentialed provider goes first when its key is set; Kroki and
/// mermaid.ink always follow.
#[must_use]
pub fn provider_chain(config: &ProviderConfig) -> Vec<Provider> {
    let mut chain = Vec::with_capacity(3);

    if let Some(credential) = config.credential() {
        match config.provider {
            DiagramProvider::MermaidChart => chain.push(Provider::MermaidChart {
                api_key: credential.to_owned(),
            }),
            DiagramProvider::Custom => chain.push(Provider::Custom {
                url: credential.to_owned(),
            }),
            DiagramProvider::MermaidInk | DiagramProvider::Kroki => {}
        }
    }

    chain.push(Provider::Kroki {
        base_url: config.kroki_url.clone(),
    });
    chain.push(Provider::MermaidInk);
    chain
}

/// Response body as text, cut to the error length limit.
fn truncate_body(response: &HttpResponse) -> String {
    let text = response.text();
    let text = text.trim();
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockTransport;
    use crate::probe::tests::encoded_image;

    fn kroki() -> Provider {
        Provider::Kroki {
            base_url: "https://kroki.io/".to_owned(),
        }
    }

    fn body_json(request: &HttpRequest) -> serde_json::Value {
        serde_json::from_slice(&request.body).unwrap()
    }

    #[test]
    fn test_kroki_request() {
        let request = kroki().request("graph TD\nA-->B", Theme::Dark).unwrap();
        assert_eq!(request.url, "https://kroki.io/mermaid/png");
        assert_eq!(request.header_value("Content-Type"), Some("text/plain"));
        assert_eq!(
            String::from_utf8(request.body).unwrap(),
            "%%{init: {'theme':'dark'}}%%\ngraph TD\nA-->B"
        );
    }

    #[test]
    fn test_mermaid_ink_request() {
        let request = Provider::MermaidInk
            .request("graph TD", Theme::Neutral)
            .unwrap();
        let encoded = BASE64_STANDARD.encode("graph TD");
        assert_eq!(
            request.url,
            format!("https://mermaid.ink/img/{encoded}?theme=neutral&width=800")
        );
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_mermaid_ink_rejects_long_url_without_sending() {
        let source = "graph TD\n".to_owned() + &"A-->B\n".repeat(1500);
        let transport = MockTransport::new();
        let err = Provider::MermaidInk
            .fetch(&transport, &source, Theme::Neutral)
            .unwrap_err();
        assert!(matches!(err, ProviderError::TooLarge(len) if len > MAX_URL_LENGTH));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_mermaid_chart_request() {
        let provider = Provider::MermaidChart {
            api_key: "secret".to_owned(),
        };
        let request = provider.request("graph TD", Theme::Dark).unwrap();
        assert_eq!(request.url, "https://api.mermaidchart.com/diagrams");
        assert_eq!(request.header_value("Authorization"), Some("Bearer secret"));
        assert_eq!(
            body_json(&request),
            serde_json::json!({"code": "graph TD", "format": "png", "theme": "dark"})
        );
    }

    #[test]
    fn test_mermaid_chart_omits_neutral_theme() {
        let provider = Provider::MermaidChart {
            api_key: "secret".to_owned(),
        };
        let request = provider.request("graph TD", Theme::Neutral).unwrap();
        assert_eq!(
            body_json(&request),
            serde_json::json!({"code": "graph TD", "format": "png"})
        );
    }

    #[test]
    fn test_custom_request_keeps_source_unthemed() {
        let provider = Provider::Custom {
            url: "https://render.example.com/mermaid".to_owned(),
        };
        let request = provider.request("graph TD", Theme::Forest).unwrap();
        assert_eq!(request.url, "https://render.example.com/mermaid");
        assert_eq!(
            body_json(&request),
            serde_json::json!({"code": "graph TD", "theme": "forest"})
        );
    }

    #[test]
    fn test_kroki_syntax_error_is_truncated() {
        let transport = MockTransport::new().with_response(
            "https://kroki.io/",
            400,
            format!("Syntax error in graph: {}", "x".repeat(300)),
        );
        let err = kroki().fetch(&transport, "graph", Theme::Neutral).unwrap_err();
        let ProviderError::Syntax(message) = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert_eq!(message.chars().count(), ERROR_BODY_LIMIT + 3);
        assert!(message.starts_with("Syntax error in graph: "));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_status_mapping() {
        let transport = MockTransport::new()
            .with_response("https://mermaid.ink/", 414, "URI Too Long")
            .with_response("https://api.mermaidchart.com/", 401, "unauthorized")
            .with_response("https://render.example.com/", 503, "down");

        let err = Provider::MermaidInk
            .fetch(&transport, "graph TD", Theme::Neutral)
            .unwrap_err();
        assert!(matches!(err, ProviderError::TooLong));

        let chart = Provider::MermaidChart {
            api_key: "k".to_owned(),
        };
        let err = chart.fetch(&transport, "graph TD", Theme::Neutral).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidApiKey));

        let custom = Provider::Custom {
            url: "https://render.example.com/x".to_owned(),
        };
        let err = custom.fetch(&transport, "graph TD", Theme::Neutral).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: down");
    }

    #[test]
    fn test_non_image_body_is_failure() {
        let transport = MockTransport::new().with_response("https://kroki.io/", 200, "<html>");
        let err = kroki().fetch(&transport, "graph TD", Theme::Neutral).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImage(_)));
    }

    #[test]
    fn test_fetch_returns_image() {
        let png = encoded_image(30, 10, ImageFormat::Png);
        let transport = MockTransport::new().with_response("https://kroki.io/", 200, png.clone());
        let image = kroki().fetch(&transport, "graph TD", Theme::Neutral).unwrap();
        assert_eq!(image.data, png);
        assert_eq!((image.info.width, image.info.height), (30, 10));
    }

    #[test]
    fn test_transport_error_propagates() {
        let transport = MockTransport::new().with_error("https://kroki.io/", "connection refused");
        let err = kroki().fetch(&transport, "graph TD", Theme::Neutral).unwrap_err();
        assert_eq!(err.to_string(), "request failed: connection refused");
    }

    #[test]
    fn test_chain_without_credential() {
        let config = ProviderConfig {
            provider: DiagramProvider::MermaidChart,
            ..ProviderConfig::default()
        };
        let names: Vec<_> = provider_chain(&config).iter().map(Provider::name).collect();
        assert_eq!(names, vec!["kroki", "mermaid.ink"]);
    }

    #[test]
    fn test_chain_with_credential() {
        let config = ProviderConfig {
            provider: DiagramProvider::Custom,
            api_key: "https://render.example.com".to_owned(),
            ..ProviderConfig::default()
        };
        assert_eq!(
            provider_chain(&config),
            vec![
                Provider::Custom {
                    url: "https://render.example.com".to_owned()
                },
                Provider::Kroki {
                    base_url: "https://kroki.io".to_owned()
                },
                Provider::MermaidInk,
            ]
        );
    }

    #[test]
    fn test_chain_ignores_key_for_uncredentialed_provider() {
        let config = ProviderConfig {
            provider: DiagramProvider::Kroki,
            api_key: "unused".to_owned(),
            ..ProviderConfig::default()
        };
        assert_eq!(provider_chain(&config).len(), 2);
    }
}
