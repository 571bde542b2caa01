//! Mermaid theme directive injection.

use std::borrow::Cow;
use std::sync::LazyLock;

use md2doc_config::Theme;
use regex::Regex;

/// Leading `%%{init: ...}%%` directive, with its trailing line break.
static INIT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*%%\{\s*init\s*:.*?\}%%[ \t]*\r?\n?").expect("invalid init directive regex")
});

/// Prefix `source` with a theme init directive.
///
/// Neutral themes leave the source untouched. Otherwise an existing leading
/// init directive is replaced so the diagram carries exactly one.
pub fn apply_theme(source: &str, theme: Theme) -> Cow<'_, str> {
    if theme.is_neutral() {
        return Cow::Borrowed(source);
    }

    let body = INIT_DIRECTIVE
        .find(source)
        .map_or(source, |m| &source[m.end()..]);

    Cow::Owned(format!("%%{{init: {{'theme':'{theme}'}}}}%%\n{body}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_neutral_theme_is_untouched() {
        let source = "graph TD\n  A-->B";
        assert!(matches!(apply_theme(source, Theme::Neutral), Cow::Borrowed(_)));
        assert_eq!(apply_theme(source, Theme::Default), source);
    }

    #[test]
    fn test_dark_theme_prepends_directive() {
        assert_eq!(
            apply_theme("graph TD\n  A-->B", Theme::Dark),
            "%%{init: {'theme':'dark'}}%%\ngraph TD\n  A-->B"
        );
    }

    #[test]
    fn test_existing_directive_is_replaced() {
        let source = "%%{init: {'theme':'forest', 'flowchart': {'curve':'basis'}}}%%\ngraph LR\n  A-->B";
        assert_eq!(
            apply_theme(source, Theme::Base),
            "%%{init: {'theme':'base'}}%%\ngraph LR\n  A-->B"
        );
    }

    #[test]
    fn test_directive_later_in_source_is_kept() {
        let source = "graph LR\n%%{init: {'theme':'forest'}}%%";
        assert_eq!(
            apply_theme(source, Theme::Forest),
            format!("%%{{init: {{'theme':'forest'}}}}%%\n{source}")
        );
    }
}
