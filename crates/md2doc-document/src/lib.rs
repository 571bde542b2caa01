//! Document sinks and the markdown conversion entry point.
//!
//! [`Converter`] parses markdown, renders mermaid diagrams and inserts the
//! resulting blocks into any [`DocumentSink`], advancing by the index each
//! insertion returns. [`MemoryDocument`] is the bundled sink: an element arena
//! that can be inspected, exported as HTML or serialized to JSON.
//!
//! # Example
//!
//! ```no_run
//! use md2doc_config::ProviderConfig;
//! use md2doc_document::{Converter, MemoryDocument};
//!
//! let converter = Converter::from_config(ProviderConfig::default());
//! let mut doc = MemoryDocument::new();
//! let result = converter.convert("# Hello\n\nWorld", &mut doc, 0);
//! assert!(result.success);
//! println!("{}", doc.to_html());
//! ```

mod converter;
mod html;
mod memory;
mod retention;
mod selection;
mod sink;

pub use converter::{ConversionReport, ConversionResult, Converter};
pub use memory::{Comment, Element, MemoryDocument};
pub use retention::{ALT_TITLE, COMMENT_ANCHOR, retain_source};
pub use selection::{Selection, SelectionError};
pub use sink::{DocumentSink, SinkError};
