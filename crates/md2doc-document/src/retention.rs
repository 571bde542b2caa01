//! Keeping diagram source next to the rendered image.

use md2doc_config::CodeRetention;
use md2doc_parser::{Block, Image};

use crate::sink::DocumentSink;

/// Alt title set on images carrying their source.
pub const ALT_TITLE: &str = "Mermaid Source Code";

/// Anchor text for source comments.
pub const COMMENT_ANCHOR: &str = "Mermaid Diagram";

const CAPTION_PREFIX: &str = "📊 Source: ";
const CAPTION_PREVIEW_CHARS: usize = 200;

/// Apply `mode` to a rendered diagram and return the blocks to insert.
///
/// `comment` mode annotates `sink` directly and falls back to `alt` when the
/// sink cannot take the annotation.
pub fn retain_source<S: DocumentSink + ?Sized>(
    mut image: Image,
    mode: CodeRetention,
    sink: &mut S,
) -> Vec<Block> {
    match mode {
        CodeRetention::Alt => {
            set_alt(&mut image);
            vec![Block::Image(image)]
        }
        CodeRetention::Caption => {
            let text = caption_text(&image.source_code);
            vec![Block::Image(image), Block::Caption { text }]
        }
        CodeRetention::Comment => {
            if let Err(e) = sink.add_comment(&comment_text(&image.source_code), COMMENT_ANCHOR) {
                tracing::warn!(error = %e, "Could not attach source comment, using alt text");
                set_alt(&mut image);
            }
            vec![Block::Image(image)]
        }
        CodeRetention::None => {
            image.source_code.clear();
            vec![Block::Image(image)]
        }
    }
}

fn set_alt(image: &mut Image) {
    image.alt_description = Some(image.source_code.clone());
    image.alt_title = Some(ALT_TITLE.to_owned());
}

/// Single-line preview of `source`, cut to the preview length.
fn caption_text(source: &str) -> String {
    let mut preview: String = source.chars().take(CAPTION_PREVIEW_CHARS).collect();
    if source.chars().nth(CAPTION_PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    format!("{CAPTION_PREFIX}{}", preview.replace('\n', " "))
}

fn comment_text(source: &str) -> String {
    format!(
        "\u{1f9dc}\u{200d}\u{2640}\u{fe0f} Mermaid Source Code:\n\n{source}\n\n---\nYou can copy this code to edit the diagram."
    )
}
