//! Line-oriented block parser.
//!
//! A single forward cursor walks the lines. At each position the current line
//! is matched against block starts in fixed priority order (fence, table,
//! heading, rule, blockquote, list, paragraph) and a maximal run of lines is
//! consumed for the matched block. The cursor never moves backwards.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Alignment, Block, ListItem};
use crate::inline::format_inline;

static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(\w*)").expect("invalid fence regex"));

static TABLE_ROW_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").expect("invalid table row regex"));

static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("invalid heading regex"));

static RULE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-{3,}|\*{3,}|_{3,})$").expect("invalid rule regex"));

static BLOCKQUOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*>\s?(.*)$").expect("invalid blockquote regex"));

static LIST_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.*)$").expect("invalid list item regex")
});

/// Diagram language tag, compared case-insensitively.
const MERMAID_TAG: &str = "mermaid";

/// Parse markdown text into blocks, in document order.
///
/// The text is used as given; decode entities first with
/// [`decode_entities`](crate::decode_entities) when it may contain them.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    BlockParser::new(text).collect()
}

/// Streaming block parser.
///
/// Yields one [`Block`] per matched construct. Blank lines produce nothing.
///
/// # Example
///
/// ```
/// use md2doc_parser::{Block, BlockParser};
///
/// let blocks: Vec<Block> = BlockParser::new("# Title\n\n---\n").collect();
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1], Block::HorizontalRule);
/// ```
pub struct BlockParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> BlockParser<'a> {
    /// Create a parser over the lines of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Fenced code or diagram. An unterminated fence runs to end of input.
    fn parse_fence(&mut self, language: &str) -> Block {
        self.pos += 1;
        let start = self.pos;
        while let Some(line) = self.current() {
            if FENCE_PATTERN.is_match(line) {
                break;
            }
            self.pos += 1;
        }
        let lines = &self.lines[start..self.pos];
        // Skip the closing fence, if any
        if self.pos < self.lines.len() {
            self.pos += 1;
        }

        if language.eq_ignore_ascii_case(MERMAID_TAG) {
            Block::Mermaid {
                source: lines.join("\n"),
            }
        } else {
            Block::CodeBlock {
                language: language.to_owned(),
                lines: lines.iter().map(|&l| l.to_owned()).collect(),
            }
        }
    }

    /// Pipe table. Returns `None` when the run held only alignment rows.
    fn parse_table(&mut self) -> Option<Block> {
        let mut rows = Vec::new();
        let mut alignments = Vec::new();

        while let Some(line) = self.current() {
            if !TABLE_ROW_PATTERN.is_match(line) {
                break;
            }
            let trimmed = line.trim();
            if is_alignment_row(trimmed) {
                // Last separator wins
                alignments = parse_alignments(trimmed);
            } else {
                rows.push(split_row(trimmed));
            }
            self.pos += 1;
        }

        if rows.is_empty() {
            return None;
        }

        Some(Block::Table {
            rows: rows
                .into_iter()
                .map(|cells| cells.into_iter().map(format_inline).collect())
                .collect(),
            alignments,
        })
    }

    /// Consecutive `>` lines, newline-joined into one quote.
    fn parse_blockquote(&mut self) -> Block {
        let mut quote_lines = Vec::new();
        while let Some(line) = self.current() {
            let Some(caps) = BLOCKQUOTE_PATTERN.captures(line) else {
                break;
            };
            quote_lines.push(caps.get(1).map_or("", |m| m.as_str()));
            self.pos += 1;
        }
        Block::Blockquote {
            text: format_inline(&quote_lines.join("\n")),
        }
    }

    /// A contiguous run of list items with soft-wrapped continuation lines.
    fn parse_list(&mut self) -> Block {
        let mut items: Vec<(usize, String)> = Vec::new();
        let mut baseline = None;
        let mut ordered = false;

        while let Some(line) = self.current() {
            let Some(caps) = LIST_ITEM_PATTERN.captures(line) else {
                break;
            };
            let indent = caps[1].chars().count();
            let base = *baseline.get_or_insert_with(|| {
                ordered = caps[2].ends_with('.');
                indent
            });
            let level = indent.saturating_sub(base) / 2;
            let mut text = caps[3].to_owned();
            self.pos += 1;

            while let Some(next) = self.current() {
                if starts_block(next) {
                    break;
                }
                text.push(' ');
                text.push_str(next.trim());
                self.pos += 1;
            }

            items.push((level, text));
        }

        Block::List {
            items: items
                .into_iter()
                .map(|(level, text)| ListItem {
                    level,
                    text: format_inline(&text),
                })
                .collect(),
            ordered,
        }
    }
}

impl Iterator for BlockParser<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        while let Some(line) = self.current() {
            if let Some(caps) = FENCE_PATTERN.captures(line) {
                let language = caps.get(1).map_or("", |m| m.as_str());
                return Some(self.parse_fence(language));
            }

            if TABLE_ROW_PATTERN.is_match(line) {
                match self.parse_table() {
                    Some(table) => return Some(table),
                    None => continue,
                }
            }

            if let Some(caps) = HEADING_PATTERN.captures(line) {
                self.pos += 1;
                let level = u8::try_from(caps[1].len()).unwrap_or(6);
                return Some(Block::Heading {
                    level,
                    text: format_inline(caps[2].trim_end()),
                });
            }

            if is_rule(line) {
                self.pos += 1;
                return Some(Block::HorizontalRule);
            }

            if BLOCKQUOTE_PATTERN.is_match(line) {
                return Some(self.parse_blockquote());
            }

            if LIST_ITEM_PATTERN.is_match(line) {
                return Some(self.parse_list());
            }

            self.pos += 1;
            let text = line.trim();
            if !text.is_empty() {
                return Some(Block::Paragraph {
                    text: format_inline(text),
                });
            }
        }
        None
    }
}

/// Whether `line` opens a block that ends a list item's continuation.
fn starts_block(line: &str) -> bool {
    line.trim().is_empty()
        || FENCE_PATTERN.is_match(line)
        || TABLE_ROW_PATTERN.is_match(line)
        || BLOCKQUOTE_PATTERN.is_match(line)
        || HEADING_PATTERN.is_match(line)
        || is_rule(line)
        || LIST_ITEM_PATTERN.is_match(line)
}

/// Three or more of the same `-`, `*` or `_`. Trailing whitespace is ignored.
fn is_rule(line: &str) -> bool {
    RULE_PATTERN.is_match(line.trim_end())
}

/// A table row made only of colons, dashes and whitespace once pipes are removed.
fn is_alignment_row(trimmed: &str) -> bool {
    let content = trimmed.replace('|', "");
    let content = content.trim();
    !content.is_empty()
        && content
            .chars()
            .all(|c| c == ':' || c == '-' || c.is_whitespace())
}

fn parse_alignments(trimmed: &str) -> Vec<Alignment> {
    trimmed
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            if cell.starts_with(':') && cell.ends_with(':') {
                Alignment::Center
            } else if cell.ends_with(':') {
                Alignment::Right
            } else {
                Alignment::Left
            }
        })
        .collect()
}

/// Split a row into trimmed cells, dropping the boundary pipes.
fn split_row(trimmed: &str) -> Vec<&str> {
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(str::trim).collect()
}
