//! Block and inline data model.

use std::fmt;

/// Inline text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Style {
    Bold,
    Italic,
    Strike,
    Code,
}

impl Style {
    /// All styles, in bit order.
    pub const ALL: [Self; 4] = [Self::Bold, Self::Italic, Self::Strike, Self::Code];

    const fn bit(self) -> u8 {
        match self {
            Self::Bold => 1,
            Self::Italic => 1 << 1,
            Self::Strike => 1 << 2,
            Self::Code => 1 << 3,
        }
    }
}

/// Set of active inline styles, stored as a bit set.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleSet(u8);

impl StyleSet {
    /// Empty style set.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list of styles.
    #[must_use]
    pub fn of(styles: &[Style]) -> Self {
        styles.iter().fold(Self::EMPTY, |set, &s| set.with(s))
    }

    /// Copy of this set with `style` added.
    #[must_use]
    pub const fn with(self, style: Style) -> Self {
        Self(self.0 | style.bit())
    }

    #[must_use]
    pub const fn contains(self, style: Style) -> bool {
        self.0 & style.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, style: Style) {
        self.0 |= style.bit();
    }

    pub fn remove(&mut self, style: Style) {
        self.0 &= !style.bit();
    }

    /// Flip `style`: add it if absent, remove it if present.
    pub fn toggle(&mut self, style: Style) {
        self.0 ^= style.bit();
    }

    /// Iterate over contained styles in a fixed order.
    pub fn iter(self) -> impl Iterator<Item = Style> {
        Style::ALL.into_iter().filter(move |&s| self.contains(s))
    }
}

impl fmt::Debug for StyleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StyleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// A styled piece of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Segment {
    /// Plain or styled text.
    Text { text: String, styles: StyleSet },
    /// Hyperlink.
    Link {
        text: String,
        url: String,
        styles: StyleSet,
    },
}

impl Segment {
    /// Visible text of the segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Link { text, .. } => text,
        }
    }

    /// Styles applied to the segment.
    #[must_use]
    pub fn styles(&self) -> StyleSet {
        match self {
            Self::Text { styles, .. } | Self::Link { styles, .. } => *styles,
        }
    }
}

/// Ordered sequence of inline segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InlineRun(pub Vec<Segment>);

impl InlineRun {
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenated visible text without markup.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.0.iter().map(Segment::text).collect()
    }
}

/// Table column alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// One entry of a list block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ListItem {
    /// Nesting level relative to the first item of the run.
    pub level: usize,
    pub text: InlineRun,
}

/// Rendered diagram image.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Image {
    /// Encoded image bytes as returned by the provider.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
    /// MIME type sniffed from the image header.
    pub content_type: String,
    /// Display width.
    pub width: u32,
    /// Display height.
    pub height: u32,
    /// Original diagram source.
    pub source_code: String,
    /// Accessible alternate description.
    pub alt_description: Option<String>,
    /// Accessible alternate title.
    pub alt_title: Option<String>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("data", &format_args!("{} bytes", self.data.len()))
            .field("content_type", &self.content_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alt_title", &self.alt_title)
            .finish_non_exhaustive()
    }
}

/// A block of document content, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
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
    /// Diagram source awaiting rendering.
    Mermaid {
        source: String,
    },
    Table {
        rows: Vec<Vec<InlineRun>>,
        alignments: Vec<Alignment>,
    },
    Blockquote {
        text: InlineRun,
    },
    List {
        items: Vec<ListItem>,
        ordered: bool,
    },
    HorizontalRule,
    Image(Image),
    /// De-emphasized single-line paragraph following an image.
    Caption {
        text: String,
    },
}

impl Block {
    /// Code block whose lines are taken from newline-separated `content`.
    #[must_use]
    pub fn code(language: impl Into<String>, content: &str) -> Self {
        Self::CodeBlock {
            language: language.into(),
            lines: content.split('\n').map(str::to_owned).collect(),
        }
    }

    /// Short name of the block kind, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::CodeBlock { .. } => "code_block",
            Self::Mermaid { .. } => "mermaid",
            Self::Table { .. } => "table",
            Self::Blockquote { .. } => "blockquote",
            Self::List { .. } => "list",
            Self::HorizontalRule => "horizontal_rule",
            Self::Image(_) => "image",
            Self::Caption { .. } => "caption",
        }
    }
}
