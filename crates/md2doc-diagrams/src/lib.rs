//! Mermaid diagram rendering for md2doc.
//!
//! Diagrams are rendered remotely by an ordered chain of providers:
//! - a credentialed provider (MermaidChart or a custom endpoint) when a key is set
//! - Kroki
//! - mermaid.ink
//!
//! The first provider returning a valid image wins. When all fail,
//! [`RenderFailure::fallback_block`] produces a mermaid code block carrying
//! the diagnostic.
//!
//! HTTP goes through the [`HttpTransport`] trait; [`UreqTransport`] is the
//! real implementation and [`MockTransport`] (behind the `mock` feature)
//! scripts responses for tests.

mod consts;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod probe;
mod provider;
mod renderer;
mod theme;
mod transport;

pub use consts::MAX_IMAGE_WIDTH;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use probe::{ImageInfo, fit_to_width, probe_image};
pub use provider::{FetchedImage, Provider, ProviderError, provider_chain};
pub use renderer::{DiagramRenderer, ProviderAttempt, RenderFailure, RenderedDiagram};
pub use theme::apply_theme;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, TransportError, UreqTransport, create_agent,
};
