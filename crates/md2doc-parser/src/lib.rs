//! Markdown to document blocks.
//!
//! This crate turns markdown text into an ordered sequence of [`Block`]s:
//! - [`decode_entities`] normalizes HTML-escaped input
//! - [`BlockParser`] scans lines into typed blocks
//! - [`format_inline`] splits a text run into styled and linked [`Segment`]s
//!
//! Only the constructs the block parser enumerates are supported; this is
//! not a `CommonMark` implementation.
//!
//! # Example
//!
//! ```
//! use md2doc_parser::{Block, parse_markdown};
//!
//! let blocks = parse_markdown("# Title\n\n```mermaid\ngraph TD; A--&gt;B\n```");
//! assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
//! assert_eq!(
//!     blocks[1],
//!     Block::Mermaid { source: "graph TD; A-->B".to_owned() }
//! );
//! ```

mod block;
mod entities;
mod inline;
mod parser;

pub use block::{Alignment, Block, Image, InlineRun, ListItem, Segment, Style, StyleSet};
pub use entities::decode_entities;
pub use inline::format_inline;
pub use parser::{BlockParser, parse_blocks};

/// Decode entities, then parse blocks.
pub fn parse_markdown(text: &str) -> Vec<Block> {
    parse_blocks(&decode_entities(text))
}
