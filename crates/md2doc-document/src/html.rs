//! HTML export for in-memory documents.
//!
//! Produces a plain HTML5 fragment:
//! - `<pre><code>` for code blocks
//! - centered `<img>` with a data URI for diagrams
//! - nested `<ul>`/`<ol>` for list items, grouped by level

use std::fmt::Write;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use md2doc_parser::{Alignment, Image, InlineRun, Segment, Style};

use crate::memory::Element;

/// Render `elements` as an HTML fragment, one top-level element per line.
pub(crate) fn render_html(elements: &[Element]) -> String {
    let mut out = String::new();
    let mut lists = ListStack::default();

    for element in elements {
        if let Element::ListItem {
            level,
            ordered,
            text,
        } = element
        {
            lists.item(*level, *ordered, text, &mut out);
            continue;
        }
        lists.close_all(&mut out);

        match element {
            Element::Heading { level, text } => {
                let _ = writeln!(out, "<h{level}>{}</h{level}>", inline(text));
            }
            Element::Paragraph { text } => {
                let _ = writeln!(out, "<p>{}</p>", inline(text));
            }
            Element::CodeBlock { language, lines } => code_block(language, lines, &mut out),
            Element::Table { rows, alignments } => table(rows, alignments, &mut out),
            Element::Blockquote { text } => {
                let _ = writeln!(
                    out,
                    "<blockquote><p>{}</p></blockquote>",
                    inline(text).replace('\n', "<br>")
                );
            }
            Element::HorizontalRule => out.push_str("<hr>\n"),
            Element::Image(image) => self::image(image, &mut out),
            Element::Caption { text } => {
                let _ = writeln!(out, r#"<p class="caption">{}</p>"#, escape_html(text));
            }
            Element::ListItem { .. } => {}
        }
    }

    lists.close_all(&mut out);
    out
}

/// Open list tags, innermost last. Each open list has an open `<li>`.
#[derive(Default)]
struct ListStack {
    open: Vec<&'static str>,
}

impl ListStack {
    fn item(&mut self, level: usize, ordered: bool, text: &InlineRun, out: &mut String) {
        let depth = level + 1;
        let tag = if ordered { "ol" } else { "ul" };

        while self.open.len() > depth {
            self.close_one(out);
        }
        if self.open.len() == depth {
            if self.open.last() == Some(&tag) {
                out.push_str("</li>\n");
            } else {
                // Ordered and unordered items at one level are separate lists
                self.close_one(out);
            }
        }

        while self.open.len() < depth {
            let _ = writeln!(out, "<{tag}>");
            self.open.push(tag);
            // Skipped levels get an empty item to hold the nested list
            if self.open.len() < depth {
                out.push_str("<li>\n");
            }
        }

        let _ = write!(out, "<li>{}", inline(text));
    }

    fn close_one(&mut self, out: &mut String) {
        if let Some(tag) = self.open.pop() {
            let _ = writeln!(out, "</li>\n</{tag}>");
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.close_one(out);
        }
    }
}

fn code_block(language: &str, lines: &[String], out: &mut String) {
    let content = escape_html(&lines.join("\n"));
    if language.is_empty() {
        let _ = writeln!(out, "<pre><code>{content}</code></pre>");
    } else {
        let _ = writeln!(
            out,
            r#"<pre><code class="language-{}">{content}</code></pre>"#,
            escape_html(language)
        );
    }
}

fn table(rows: &[Vec<InlineRun>], alignments: &[Alignment], out: &mut String) {
    out.push_str("<table>\n");
    for (i, row) in rows.iter().enumerate() {
        let cell_tag = if i == 0 { "th" } else { "td" };
        if i == 0 {
            out.push_str("<thead>\n");
        } else if i == 1 {
            out.push_str("<tbody>\n");
        }

        out.push_str("<tr>");
        for (col, cell) in row.iter().enumerate() {
            let style = match alignments.get(col).copied().unwrap_or_default() {
                Alignment::Left => "",
                Alignment::Center => r#" style="text-align: center""#,
                Alignment::Right => r#" style="text-align: right""#,
            };
            let _ = write!(out, "<{cell_tag}{style}>{}</{cell_tag}>", inline(cell));
        }
        out.push_str("</tr>\n");

        if i == 0 {
            out.push_str("</thead>\n");
        }
    }
    if rows.len() > 1 {
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n");
}

fn image(image: &Image, out: &mut String) {
    let title_attr = image
        .alt_title
        .as_deref()
        .map(|title| format!(r#" title="{}""#, escape_html(title)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        r#"<p style="text-align: center"><img src="data:{};base64,{}" width="{}" height="{}"{title_attr} alt="{}"></p>"#,
        image.content_type,
        BASE64_STANDARD.encode(&image.data),
        image.width,
        image.height,
        escape_html(image.alt_description.as_deref().unwrap_or_default()),
    );
}

/// Render inline segments with nested style tags.
fn inline(run: &InlineRun) -> String {
    let mut out = String::new();
    for segment in run.segments() {
        let styles: Vec<&str> = segment.styles().iter().map(style_tag).collect();
        for tag in &styles {
            let _ = write!(out, "<{tag}>");
        }
        match segment {
            Segment::Text { text, .. } => out.push_str(&escape_html(text)),
            Segment::Link { text, url, .. } => {
                let _ = write!(
                    out,
                    r#"<a href="{}">{}</a>"#,
                    escape_html(url),
                    escape_html(text)
                );
            }
        }
        for tag in styles.iter().rev() {
            let _ = write!(out, "</{tag}>");
        }
    }
    out
}

fn style_tag(style: Style) -> &'static str {
    match style {
        Style::Bold => "strong",
        Style::Italic => "em",
        Style::Strike => "del",
        Style::Code => "code",
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
