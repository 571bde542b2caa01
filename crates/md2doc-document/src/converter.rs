//! Markdown to document conversion.

use md2doc_config::ProviderConfig;
use md2doc_diagrams::DiagramRenderer;
use md2doc_parser::{Block, parse_markdown};
use serde::Serialize;

use crate::retention::retain_source;
use crate::sink::{DocumentSink, SinkError};

const EMPTY_INPUT: &str = "No markdown text provided";
const SUCCESS: &str = "Document formatted successfully!";

/// Counts gathered during one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Blocks handed to the sink, including captions and fallback blocks.
    pub blocks_inserted: usize,
    pub diagrams_rendered: usize,
    pub diagrams_failed: usize,
}

/// Outcome of a conversion, always returned, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    pub message: String,
    pub report: ConversionReport,
}

impl ConversionResult {
    fn failure(message: String, report: ConversionReport) -> Self {
        Self {
            success: false,
            message,
            report,
        }
    }
}

/// Converts markdown into blocks inserted into a [`DocumentSink`].
pub struct Converter {
    renderer: DiagramRenderer,
    config: ProviderConfig,
}

impl Converter {
    /// Create a converter with settings read once for its lifetime.
    #[must_use]
    pub fn new(renderer: DiagramRenderer, config: ProviderConfig) -> Self {
        Self { renderer, config }
    }

    /// Create a converter using a real HTTP transport.
    #[must_use]
    pub fn from_config(config: ProviderConfig) -> Self {
        Self::new(DiagramRenderer::from_config(&config), config)
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Convert `markdown` and insert the result into `sink` from `start_index`.
    ///
    /// Blank input is rejected before parsing. A sink error stops the
    /// conversion; blocks inserted before it stay in place.
    pub fn convert<S: DocumentSink + ?Sized>(
        &self,
        markdown: &str,
        sink: &mut S,
        start_index: usize,
    ) -> ConversionResult {
        let mut report = ConversionReport::default();

        if markdown.trim().is_empty() {
            return ConversionResult::failure(EMPTY_INPUT.to_owned(), report);
        }

        match self.insert_all(markdown, sink, start_index, &mut report) {
            Ok(()) => {
                tracing::info!(
                    blocks = report.blocks_inserted,
                    diagrams = report.diagrams_rendered,
                    failed = report.diagrams_failed,
                    "Conversion complete"
                );
                ConversionResult {
                    success: true,
                    message: SUCCESS.to_owned(),
                    report,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Conversion aborted");
                ConversionResult::failure(format!("Error: {e}"), report)
            }
        }
    }

    fn insert_all<S: DocumentSink + ?Sized>(
        &self,
        markdown: &str,
        sink: &mut S,
        start_index: usize,
        report: &mut ConversionReport,
    ) -> Result<(), SinkError> {
        let blocks = parse_markdown(markdown);
        tracing::debug!(blocks = blocks.len(), "Parsed markdown");

        let mut index = start_index;
        for block in blocks {
            let Block::Mermaid { source } = block else {
                index = sink.insert_block(index, &block)?;
                report.blocks_inserted += 1;
                continue;
            };

            let rendered = match self.renderer.render(&source, &self.config) {
                Ok(diagram) => {
                    report.diagrams_rendered += 1;
                    retain_source(diagram.image, self.config.code_retention, sink)
                }
                Err(failure) => {
                    tracing::warn!(diagnostic = %failure.diagnostic(), "Diagram left as source");
                    report.diagrams_failed += 1;
                    vec![failure.fallback_block(&source)]
                }
            };

            for block in &rendered {
                index = sink.insert_block(index, block)?;
                report.blocks_inserted += 1;
            }
        }

        Ok(())
    }
}
