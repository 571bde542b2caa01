//! In-memory document: an ordered element arena with document-level comments.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use md2doc_parser::{Alignment, Block, Image, InlineRun};
use serde::{Serialize, Serializer};

use crate::html::render_html;
use crate::selection::{Selection, SelectionError};
use crate::sink::{DocumentSink, SinkError};

/// One positional element of a [`MemoryDocument`].
///
/// Lists are flattened: each item is its own element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Heading {
        level: u8,
        text: InlineRun,
    },
    Paragraph {
        text: InlineRun,
    },
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    Table {
        rows: Vec<Vec<InlineRun>>,
        alignments: Vec<Alignment>,
    },
    Blockquote {
        text: InlineRun,
    },
    ListItem {
        level: usize,
        ordered: bool,
        text: InlineRun,
    },
    HorizontalRule,
    Image(#[serde(serialize_with = "serialize_image")] Image),
    Caption {
        text: String,
    },
}

/// Document-level annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub content: String,
    /// Text the annotation is associated with.
    pub anchor: String,
}

/// Document held in memory.
///
/// Insertion at an index shifts later elements, like inserting into a live
/// document body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    comments: Vec<Comment>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Describe the element at `index` for selection inspection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NothingSelected`] when `index` is out of range
    /// and [`SelectionError::UnsupportedElement`] for anything other than an
    /// image or a code block.
    pub fn inspect(&self, index: usize) -> Result<Selection, SelectionError> {
        self.elements
            .get(index)
            .ok_or(SelectionError::NothingSelected)
            .and_then(Selection::from_element)
    }

    /// Serialize the document to pretty-printed JSON with base64 image data.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the document as an HTML fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        render_html(&self.elements)
    }
}

impl DocumentSink for MemoryDocument {
    fn insert_block(&mut self, index: usize, block: &Block) -> Result<usize, SinkError> {
        if index > self.elements.len() {
            return Err(SinkError::IndexOutOfRange {
                index,
                len: self.elements.len(),
            });
        }

        let inserted = match block {
            Block::List { items, ordered } => items
                .iter()
                .map(|item| Element::ListItem {
                    level: item.level,
                    ordered: *ordered,
                    text: item.text.clone(),
                })
                .collect(),
            other => vec![
                Element::from_block(other).ok_or(SinkError::UnsupportedBlock(other.kind()))?,
            ],
        };

        let count = inserted.len();
        self.elements.splice(index..index, inserted);
        Ok(index + count)
    }

    fn add_comment(&mut self, content: &str, anchor: &str) -> Result<(), SinkError> {
        self.comments.push(Comment {
            content: content.to_owned(),
            anchor: anchor.to_owned(),
        });
        Ok(())
    }
}

impl Element {
    /// Single element for `block`; `None` for lists and unrendered diagrams.
    fn from_block(block: &Block) -> Option<Self> {
        let element = match block.clone() {
            Block::Heading { level, text } => Self::Heading { level, text },
            Block::Paragraph { text } => Self::Paragraph { text },
            Block::CodeBlock { language, lines } => Self::CodeBlock { language, lines },
            Block::Table { rows, alignments } => Self::Table { rows, alignments },
            Block::Blockquote { text } => Self::Blockquote { text },
            Block::HorizontalRule => Self::HorizontalRule,
            Block::Image(image) => Self::Image(image),
            Block::Caption { text } => Self::Caption { text },
            Block::List { .. } | Block::Mermaid { .. } => return None,
        };
        Some(element)
    }
}

/// Image payload with its bytes as base64 and no source code.
#[derive(Serialize)]
struct EncodedImage<'a> {
    content_type: &'a str,
    width: u32,
    height: u32,
    alt_description: Option<&'a str>,
    alt_title: Option<&'a str>,
    data: String,
}

fn serialize_image<S: Serializer>(image: &Image, serializer: S) -> Result<S::Ok, S::Error> {
    EncodedImage {
        content_type: &image.content_type,
        width: image.width,
        height: image.height,
        alt_description: image.alt_description.as_deref(),
        alt_title: image.alt_title.as_deref(),
        data: BASE64_STANDARD.encode(&image.data),
    }
    .serialize(serializer)
}
