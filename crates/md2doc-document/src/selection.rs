//! Read-only inspection of a selected document element.

use serde::Serialize;

use crate::memory::Element;

const NO_SOURCE: &str = "No source code stored";
const DEFAULT_TITLE: &str = "Mermaid Diagram";

/// Metadata about a selected image or code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Image {
        /// Stored diagram source, or a placeholder when none is stored.
        alt_description: String,
        alt_title: String,
        has_source: bool,
    },
    CodeBlock {
        content: String,
        language: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No element selected")]
    NothingSelected,
    #[error("Selected element is not an image or code block")]
    UnsupportedElement,
}

impl Selection {
    /// Inspect `element`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnsupportedElement`] unless the element is an
    /// image or a code block.
    pub fn from_element(element: &Element) -> Result<Self, SelectionError> {
        match element {
            Element::Image(image) => {
                let description = image.alt_description.as_deref().filter(|d| !d.is_empty());
                Ok(Self::Image {
                    alt_description: description.unwrap_or(NO_SOURCE).to_owned(),
                    alt_title: image
                        .alt_title
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .unwrap_or(DEFAULT_TITLE)
                        .to_owned(),
                    has_source: description.is_some(),
                })
            }
            Element::CodeBlock { language, lines } => Ok(Self::CodeBlock {
                content: lines.join("\n"),
                language: language.clone(),
            }),
            _ => Err(SelectionError::UnsupportedElement),
        }
    }
}
