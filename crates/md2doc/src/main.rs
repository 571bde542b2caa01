//! md2doc CLI - Markdown to formatted document converter.
//!
//! Provides commands for:
//! - `convert`: Convert markdown to an HTML or JSON document
//! - `parse`: Print the parsed block sequence as JSON
//! - `inspect`: Describe a converted element (image alt text or code block)
//! - `settings show` / `settings set`: Read or update diagram settings

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, InspectArgs, ParseArgs, SettingsCommand};
use output::Output;

/// md2doc - Markdown to formatted document converter.
#[derive(Parser)]
#[command(name = "md2doc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown, rendering mermaid diagrams.
    Convert(ConvertArgs),
    /// Parse markdown into blocks without rendering.
    Parse(ParseArgs),
    /// Convert markdown and inspect the element at an index.
    Inspect(InspectArgs),
    /// Diagram settings commands.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Parse(args) => args.execute(),
        Commands::Inspect(args) => args.execute(),
        Commands::Settings(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
