//! `md2doc parse` command implementation.

use std::path::PathBuf;

use clap::Args;
use md2doc_parser::parse_markdown;

use super::{read_input, write_output};
use crate::error::CliError;

/// Arguments for the parse command.
#[derive(Args)]
pub(crate) struct ParseArgs {
    /// Markdown file to parse, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Write the JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ParseArgs {
    /// Execute the parse command. No diagrams are rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let markdown = read_input(&self.input)?;
        let blocks = parse_markdown(&markdown);
        tracing::debug!(blocks = blocks.len(), "Parsed markdown");
        write_output(self.output.as_ref(), &serde_json::to_string_pretty(&blocks)?)
    }
}
