//! `md2doc inspect` command implementation.

use std::path::PathBuf;

use clap::Args;
use md2doc_document::{Converter, MemoryDocument, Selection, SelectionError};
use serde_json::{Value, json};

use super::{RenderArgs, load_config, read_input, write_output};
use crate::error::CliError;

/// Arguments for the inspect command.
#[derive(Args)]
pub(crate) struct InspectArgs {
    /// Markdown file to convert, or `-` for stdin.
    input: PathBuf,

    /// Element index to inspect.
    index: usize,

    /// Path to settings file (default: ~/.md2doc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    diagrams: RenderArgs,
}

impl InspectArgs {
    /// Execute the inspect command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = load_config(self.config.as_deref(), &self.diagrams.cli_settings())?;
        let markdown = read_input(&self.input)?;

        let mut doc = MemoryDocument::new();
        let result = Converter::from_config(config).convert(&markdown, &mut doc, 0);
        if !result.success {
            return Err(CliError::Conversion(result.message));
        }

        let report = selection_report(doc.inspect(self.index))?;
        write_output(None, &serde_json::to_string_pretty(&report)?)
    }
}

/// Inspection result as `{success, ...}` JSON.
fn selection_report(selection: Result<Selection, SelectionError>) -> Result<Value, CliError> {
    Ok(match selection {
        Ok(selection) => {
            let mut value = serde_json::to_value(selection)?;
            if let Value::Object(map) = &mut value {
                map.insert("success".to_owned(), Value::Bool(true));
            }
            value
        }
        Err(e) => json!({ "success": false, "message": e.to_string() }),
    })
}
