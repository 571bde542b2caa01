//! Inline formatting: link extraction followed by style toggling.
//!
//! Emphasis markers are toggles, not delimiter pairs. Each marker flips its
//! style in a running [`StyleSet`] and every literal run is emitted with a
//! snapshot of that set. Unbalanced markers leave the style on until the end
//! of the span.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{InlineRun, Segment, Style, StyleSet};

/// `[text](url)` with no nested brackets or parentheses.
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("invalid link regex"));

/// Marker recognized by the style tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    BoldItalic,
    Bold,
    Strike,
    Italic,
    Code,
}

impl Marker {
    /// Match a marker at the start of `rest`. Returns the marker and its byte length.
    ///
    /// `escaped` is true when the previous character is a backslash; it only
    /// suppresses single `*`/`_` italic markers.
    fn at(rest: &str, escaped: bool) -> Option<(Self, usize)> {
        if rest.starts_with("***") || rest.starts_with("___") {
            Some((Self::BoldItalic, 3))
        } else if rest.starts_with("**") || rest.starts_with("__") {
            Some((Self::Bold, 2))
        } else if rest.starts_with("~~") {
            Some((Self::Strike, 2))
        } else if (rest.starts_with('*') || rest.starts_with('_')) && !escaped {
            Some((Self::Italic, 1))
        } else if rest.starts_with('`') {
            Some((Self::Code, 1))
        } else {
            None
        }
    }

    fn apply(self, active: &mut StyleSet) {
        match self {
            Self::BoldItalic => {
                // Bold and italic flip together: both off if both were on
                if active.contains(Style::Bold) && active.contains(Style::Italic) {
                    active.remove(Style::Bold);
                    active.remove(Style::Italic);
                } else {
                    active.insert(Style::Bold);
                    active.insert(Style::Italic);
                }
            }
            Self::Bold => active.toggle(Style::Bold),
            Self::Strike => active.toggle(Style::Strike),
            Self::Italic => active.toggle(Style::Italic),
            Self::Code => active.toggle(Style::Code),
        }
    }
}

/// Format a text run into styled and linked segments.
///
/// Links are extracted first; the text between them is tokenized for style
/// markers with a fresh style state per span. Link text is kept verbatim.
pub fn format_inline(text: &str) -> InlineRun {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in LINK_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokenize_styles(&text[last..whole.start()], &mut segments);
        }
        segments.push(Segment::Link {
            text: caps[1].to_owned(),
            url: caps[2].to_owned(),
            styles: StyleSet::EMPTY,
        });
        last = whole.end();
    }

    if last < text.len() {
        tokenize_styles(&text[last..], &mut segments);
    }

    InlineRun(segments)
}

/// Tokenize a plain span, appending styled text segments.
fn tokenize_styles(span: &str, out: &mut Vec<Segment>) {
    let mut active = StyleSet::EMPTY;
    let mut current = String::new();
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while pos < span.len() {
        let rest = &span[pos..];
        if let Some((marker, len)) = Marker::at(rest, prev == Some('\\')) {
            flush(&mut current, active, out);
            marker.apply(&mut active);
            // Markers are ASCII; the last byte is the previous char
            prev = rest[..len].chars().last();
            pos += len;
        } else if let Some(ch) = rest.chars().next() {
            current.push(ch);
            prev = Some(ch);
            pos += ch.len_utf8();
        }
    }

    flush(&mut current, active, out);
}

fn flush(current: &mut String, styles: StyleSet, out: &mut Vec<Segment>) {
    if !current.is_empty() {
        out.push(Segment::Text {
            text: std::mem::take(current),
            styles,
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(s: &str, styles: &[Style]) -> Segment {
        Segment::Text {
            text: s.to_owned(),
            styles: StyleSet::of(styles),
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(format_inline("hello").0, vec![text("hello", &[])]);
    }

    #[test]
    fn test_empty_text() {
        assert!(format_inline("").is_empty());
    }

    #[test]
    fn test_bold_toggles_twice_back_to_plain() {
        assert_eq!(
            format_inline("**bold** plain **bold again**").0,
            vec![
                text("bold", &[Style::Bold]),
                text(" plain ", &[]),
                text("bold again", &[Style::Bold]),
            ]
        );
    }

    #[test]
    fn test_overlapping_italic_and_bold() {
        assert_eq!(
            format_inline("*italic **bolditalic** still italic*").0,
            vec![
                text("italic ", &[Style::Italic]),
                text("bolditalic", &[Style::Italic, Style::Bold]),
                text(" still italic", &[Style::Italic]),
            ]
        );
    }

    #[test]
    fn test_bold_italic_marker() {
        assert_eq!(
            format_inline("***both*** none ___again___").0,
            vec![
                text("both", &[Style::Bold, Style::Italic]),
                text(" none ", &[]),
                text("again", &[Style::Bold, Style::Italic]),
            ]
        );
    }

    #[test]
    fn test_bold_italic_closes_nested_pair() {
        assert_eq!(
            format_inline("**a *b*** c").0,
            vec![
                text("a ", &[Style::Bold]),
                text("b", &[Style::Bold, Style::Italic]),
                text(" c", &[]),
            ]
        );
    }

    #[test]
    fn test_strike_and_code() {
        assert_eq!(
            format_inline("~~gone~~ and `code`").0,
            vec![
                text("gone", &[Style::Strike]),
                text(" and ", &[]),
                text("code", &[Style::Code]),
            ]
        );
    }

    #[test]
    fn test_unbalanced_marker_sticks() {
        assert_eq!(
            format_inline("a **b c").0,
            vec![text("a ", &[]), text("b c", &[Style::Bold])]
        );
    }

    #[test]
    fn test_escaped_asterisk_is_literal() {
        assert_eq!(
            format_inline(r"2 \* 3").0,
            vec![text(r"2 \* 3", &[])]
        );
    }

    #[test]
    fn test_underscore_in_identifier_toggles() {
        assert_eq!(
            format_inline("snake_case_name").0,
            vec![
                text("snake", &[]),
                text("case", &[Style::Italic]),
                text("name", &[]),
            ]
        );
    }

    #[test]
    fn test_link_extraction() {
        assert_eq!(
            format_inline("see [the docs](https://example.com/a_b) now").0,
            vec![
                text("see ", &[]),
                Segment::Link {
                    text: "the docs".to_owned(),
                    url: "https://example.com/a_b".to_owned(),
                    styles: StyleSet::EMPTY,
                },
                text(" now", &[]),
            ]
        );
    }

    #[test]
    fn test_style_state_resets_after_link() {
        assert_eq!(
            format_inline("**open [x](u) after").0,
            vec![
                text("open ", &[Style::Bold]),
                Segment::Link {
                    text: "x".to_owned(),
                    url: "u".to_owned(),
                    styles: StyleSet::EMPTY,
                },
                text(" after", &[]),
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            format_inline("héllo *wörld*").0,
            vec![text("héllo ", &[]), text("wörld", &[Style::Italic])]
        );
    }
}
