//! Document sink abstraction.

use md2doc_parser::Block;

/// Error materializing content into a document.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("insertion index {index} out of range (document has {len} elements)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{0} blocks cannot be inserted into this document")]
    UnsupportedBlock(&'static str),
    #[error("document annotations are not supported")]
    Unsupported,
    #[error("{0}")]
    Host(String),
}

/// Target document accepting blocks at positional indexes.
///
/// Insertion at `index` places content before whatever currently sits there.
/// The returned index is the position right after the inserted content and is
/// where the next block goes: one past for single blocks, one per item for
/// lists.
pub trait DocumentSink {
    /// Insert `block` at `index` and return the next free index.
    fn insert_block(&mut self, index: usize, block: &Block) -> Result<usize, SinkError>;

    /// Attach a document-level annotation.
    ///
    /// Sinks without annotation support keep the default, which returns
    /// [`SinkError::Unsupported`].
    fn add_comment(&mut self, content: &str, anchor: &str) -> Result<(), SinkError> {
        let _ = (content, anchor);
        Err(SinkError::Unsupported)
    }
}
