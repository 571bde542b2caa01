//! Diagram rendering through the provider chain.

use std::fmt::Write as _;
use std::sync::Arc;

use md2doc_config::ProviderConfig;
use md2doc_parser::{Block, Image};

use crate::consts::{MAX_IMAGE_WIDTH, MERMAID_LIVE_URL};
use crate::probe::fit_to_width;
use crate::provider::{Provider, provider_chain};
use crate::transport::{HttpTransport, UreqTransport};

/// Outcome of one provider attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub name: &'static str,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

/// Successfully rendered diagram.
#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    /// Image sized to the page width, with no alternate text set.
    pub image: Image,
    /// Name of the provider that produced the image.
    pub provider: &'static str,
    /// Attempts made, the last one successful.
    pub attempts: Vec<ProviderAttempt>,
}

/// Every provider in the chain failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("all diagram providers failed: {}", self.diagnostic())]
pub struct RenderFailure {
    pub attempts: Vec<ProviderAttempt>,
}

impl RenderFailure {
    /// Per-provider failures as `name: message`, joined with `; `.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut out = String::new();
        for attempt in &self.attempts {
            if !out.is_empty() {
                out.push_str("; ");
            }
            let message = attempt.error_message.as_deref().unwrap_or("unknown error");
            let _ = write!(out, "{}: {message}", attempt.name);
        }
        out
    }

    /// Code block shown in place of the diagram.
    ///
    /// Carries the diagnostic and a pointer to the live editor in mermaid
    /// comments above the original source.
    #[must_use]
    pub fn fallback_block(&self, source: &str) -> Block {
        let content = format!(
            "%% Error: {}\n%% Fallback: Please check diagram syntax at {MERMAID_LIVE_URL}\n\n{source}",
            self.diagnostic()
        );
        Block::code("mermaid", &content)
    }
}

/// Renders mermaid sources to images.
///
/// Providers are tried strictly in order; the first image wins.
pub struct DiagramRenderer {
    transport: Arc<dyn HttpTransport>,
    max_width: u32,
}

impl DiagramRenderer {
    /// Create a renderer sending requests through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            max_width: MAX_IMAGE_WIDTH,
        }
    }

    /// Create a renderer with a real HTTP transport honoring the config timeout.
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(Arc::new(UreqTransport::new(config.timeout)))
    }

    /// Set the maximum display width in pixels.
    #[must_use]
    pub fn max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Render `source` with the chain built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] listing every attempt if no provider
    /// produced an image.
    pub fn render(
        &self,
        source: &str,
        config: &ProviderConfig,
    ) -> Result<RenderedDiagram, RenderFailure> {
        self.render_with(&provider_chain(config), source, config)
    }

    /// Render `source` with an explicit provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] if every provider fails.
    pub fn render_with(
        &self,
        chain: &[Provider],
        source: &str,
        config: &ProviderConfig,
    ) -> Result<RenderedDiagram, RenderFailure> {
        let mut attempts = Vec::with_capacity(chain.len());

        for provider in chain {
            let name = provider.name();
            tracing::info!(provider = name, "Trying diagram provider");

            match provider.fetch(self.transport.as_ref(), source, config.theme) {
                Ok(fetched) => {
                    let (width, height) =
                        fit_to_width(fetched.info.width, fetched.info.height, self.max_width);
                    tracing::info!(provider = name, width, height, "Diagram rendered");
                    attempts.push(ProviderAttempt {
                        name,
                        succeeded: true,
                        error_message: None,
                    });
                    return Ok(RenderedDiagram {
                        image: Image {
                            data: fetched.data,
                            content_type: fetched.info.content_type.to_owned(),
                            width,
                            height,
                            source_code: source.to_owned(),
                            alt_description: None,
                            alt_title: None,
                        },
                        provider: name,
                        attempts,
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "Diagram provider failed");
                    attempts.push(ProviderAttempt {
                        name,
                        succeeded: false,
                        error_message: Some(e.to_string()),
                    });
                }
            }
        }

        Err(RenderFailure { attempts })
    }
}
