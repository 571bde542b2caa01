//! HTML entity decoding for pasted markdown.
//!
//! Markdown copied out of web pages and chat tools often arrives with HTML
//! entities in it, sometimes encoded twice. Decoding happens once, before
//! block parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Regex pattern for matching decimal numeric character references.
static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([0-9]+);").expect("invalid numeric entity regex"));

/// Named and hex entities replaced in the first pass, in order.
///
/// `&amp;` goes first so `&amp;lt;` collapses to `<` within a single pass.
const FIRST_PASS: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&#x2F;", "/"),
    ("&#x27;", "'"),
];

/// Entities handled by the bounded second pass.
const SECOND_PASS: &[(&str, &str)] = &[("&amp;", "&"), ("&lt;", "<"), ("&gt;", ">")];

/// Decode HTML entities in `text`.
///
/// Replaces `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#39;`, `&nbsp;`, `&#x2F;`,
/// `&#x27;` and any decimal `&#N;` reference. If encoded `&`, `<` or `>`
/// remain afterwards, exactly one more pass limited to those three runs.
/// Deeper encodings are left as they are.
///
/// Numeric references that do not name a valid Unicode scalar value are
/// kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut decoded = replace_all(text, FIRST_PASS);
    decoded = NUMERIC_PATTERN
        .replace_all(&decoded, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned();

    if SECOND_PASS.iter().any(|(entity, _)| decoded.contains(entity)) {
        decoded = replace_all(&decoded, SECOND_PASS);
    }

    decoded
}

fn replace_all(text: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .fold(text.to_owned(), |acc, (entity, literal)| {
            if acc.contains(entity) {
                acc.replace(entity, literal)
            } else {
                acc
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        assert_eq!(decode_entities("Hello World"), "Hello World");
    }

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(
            decode_entities("a &lt; b &amp;&amp; c &gt; d &quot;q&quot;"),
            "a < b && c > d \"q\""
        );
    }

    #[test]
    fn test_decode_apostrophes_and_slash() {
        assert_eq!(decode_entities("it&#39;s &#x27;x&#x27; a&#x2F;b"), "it's 'x' a/b");
    }

    #[test]
    fn test_nbsp_becomes_plain_space() {
        assert_eq!(decode_entities("Hello&nbsp;World"), "Hello World");
    }

    #[test]
    fn test_decode_numeric_reference() {
        assert_eq!(decode_entities("&#65;&#9731;"), "A\u{2603}");
    }

    #[test]
    fn test_invalid_numeric_reference_kept() {
        assert_eq!(decode_entities("&#55296;"), "&#55296;");
    }

    #[test]
    fn test_double_encoded_arrow() {
        // Mermaid edges pasted from HTML: "--&amp;gt;" is "-->" encoded twice
        assert_eq!(decode_entities("A --&amp;gt; B"), "A --> B");
    }

    #[test]
    fn test_triple_encoded_ampersand_gets_one_extra_pass() {
        assert_eq!(decode_entities("&amp;amp;lt;"), "<");
        assert_eq!(decode_entities("&amp;amp;amp;amp;"), "&amp;amp;");
    }

    #[test]
    fn test_unknown_entities_preserved() {
        assert_eq!(decode_entities("&copy; &unknown;"), "&copy; &unknown;");
    }

    #[test]
    fn test_decode_is_idempotent_once_fully_decoded() {
        let once = decode_entities("x &lt;= y &amp;&amp; &quot;z&quot; &#33;");
        assert_eq!(once, "x <= y && \"z\" !");
        assert_eq!(decode_entities(&once), once);
    }
}
