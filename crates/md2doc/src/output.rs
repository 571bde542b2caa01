//! Status messages for the md2doc CLI.
//!
//! Converted documents go to stdout; everything printed here goes to
//! stderr so piping `md2doc convert` output stays clean.

use console::{Style, Term};

/// Writes conversion and settings status lines to stderr.
pub(crate) struct Output {
    term: Term,
    done: Style,
    degraded: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            degraded: Style::new().yellow(),
            failed: Style::new().red(),
        }
    }

    /// Plain status line, e.g. the path a document was written to.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg, None);
    }

    /// Conversion or settings update finished.
    pub(crate) fn success(&self, msg: &str) {
        self.line(msg, Some(&self.done));
    }

    /// Finished, but with diagrams kept as source or nothing to do.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(msg, Some(&self.degraded));
    }

    /// Command failed.
    pub(crate) fn error(&self, msg: &str) {
        self.line(msg, Some(&self.failed));
    }

    // Write errors on stderr are ignored.
    fn line(&self, msg: &str, style: Option<&Style>) {
        let _ = self.term.write_line(&styled(msg, style));
    }
}

fn styled(msg: &str, style: Option<&Style>) -> String {
    match style {
        Some(style) => style.apply_to(msg).to_string(),
        None => msg.to_owned(),
    }
}
