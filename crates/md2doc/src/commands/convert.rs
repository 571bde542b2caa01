//! `md2doc convert` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use md2doc_document::{Converter, MemoryDocument};

use super::{RenderArgs, load_config, read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Output format for converted documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Html,
    Json,
}

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Path to settings file (default: ~/.md2doc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    diagrams: RenderArgs,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = load_config(self.config.as_deref(), &self.diagrams.cli_settings())?;
        let markdown = read_input(&self.input)?;

        let converter = Converter::from_config(config);
        let mut doc = MemoryDocument::new();
        let result = converter.convert(&markdown, &mut doc, 0);

        if !result.success {
            return Err(CliError::Conversion(result.message));
        }

        let rendered = match self.format {
            OutputFormat::Html => doc.to_html(),
            OutputFormat::Json => doc.to_json()?,
        };
        write_output(self.output.as_ref(), &rendered)?;

        output.success(&result.message);
        if result.report.diagrams_failed > 0 {
            output.warning(&format!(
                "{} diagram(s) could not be rendered and were kept as source",
                result.report.diagrams_failed
            ));
        }
        if let Some(path) = &self.output {
            output.info(&format!("Wrote {}", path.display()));
        }

        Ok(())
    }
}
