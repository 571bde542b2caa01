//! Internal constants for diagram rendering.

/// Kroki diagram type for mermaid sources.
pub const KROKI_DIAGRAM_TYPE: &str = "mermaid";

/// mermaid.ink service base URL.
pub const MERMAID_INK_URL: &str = "https://mermaid.ink";

/// Width requested from mermaid.ink.
pub const MERMAID_INK_WIDTH: u32 = 800;

/// mermaid.ink rejects longer URLs; fail before sending.
pub const MAX_URL_LENGTH: usize = 8000;

/// MermaidChart diagram rendering endpoint.
pub const MERMAID_CHART_URL: &str = "https://api.mermaidchart.com/diagrams";

/// Public editor suggested when every provider fails.
pub const MERMAID_LIVE_URL: &str = "https://mermaid.live";

/// Usable page width in pixels; wider images are scaled down.
pub const MAX_IMAGE_WIDTH: u32 = 600;

/// Maximum characters of a response body kept in error messages.
pub const ERROR_BODY_LIMIT: usize = 200;
