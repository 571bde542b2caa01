//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod inspect;
pub(crate) mod parse;
pub(crate) mod settings;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use md2doc_config::{
    CliSettings, CodeRetention, DiagramProvider, FileSettingsStore, ProviderConfig,
    SettingsStore, Theme,
};

use crate::error::CliError;

pub(crate) use convert::ConvertArgs;
pub(crate) use inspect::InspectArgs;
pub(crate) use parse::ParseArgs;
pub(crate) use settings::SettingsCommand;

/// Settings file used when `--config` is not given.
pub(crate) const DEFAULT_SETTINGS_PATH: &str = "~/.md2doc.toml";

/// Diagram settings overrides shared by commands.
#[derive(Args, Debug, Default)]
pub(crate) struct DiagramArgs {
    /// Diagram provider (mermaid.ink, mermaidchart, custom, kroki).
    #[arg(long)]
    provider: Option<DiagramProvider>,

    /// Mermaid theme (neutral, default, dark, forest, base).
    #[arg(long)]
    theme: Option<Theme>,

    /// How to keep diagram source (alt, caption, comment, none).
    #[arg(long)]
    retention: Option<CodeRetention>,

    /// Kroki server URL.
    #[arg(long)]
    kroki_url: Option<String>,
}

impl DiagramArgs {
    pub(crate) fn cli_settings(&self, api_key: Option<String>) -> CliSettings {
        CliSettings {
            provider: self.provider,
            api_key,
            theme: self.theme,
            code_retention: self.retention,
            kroki_url: self.kroki_url.clone(),
        }
    }
}

/// Overrides for commands that render diagrams.
///
/// The API key may come from `MD2DOC_API_KEY`.
#[derive(Args, Debug, Default)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    diagrams: DiagramArgs,

    /// MermaidChart API key or custom endpoint URL.
    #[arg(long, env = "MD2DOC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl RenderArgs {
    pub(crate) fn cli_settings(&self) -> CliSettings {
        self.diagrams.cli_settings(self.api_key.clone())
    }
}

/// Settings store for `--config` or the default path.
pub(crate) fn settings_store(config: Option<&Path>) -> FileSettingsStore {
    FileSettingsStore::new(config.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_PATH)))
}

/// Read settings once and apply command-line overrides.
pub(crate) fn load_config(
    config: Option<&Path>,
    overrides: &CliSettings,
) -> Result<ProviderConfig, CliError> {
    let mut settings = settings_store(config).get()?;
    settings.apply_cli_settings(overrides);
    settings.validate()?;
    Ok(settings)
}

/// Read markdown from a file, or stdin for `-`.
pub(crate) fn read_input(input: &Path) -> Result<String, CliError> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Write `content` to a file, or stdout when no path is given.
pub(crate) fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("md2doc.toml");
        std::fs::write(&path, "[diagrams]\ntheme = \"dark\"\n").unwrap();

        let overrides = CliSettings {
            code_retention: Some(CodeRetention::Caption),
            ..CliSettings::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();

        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.code_retention, CodeRetention::Caption);
    }

    #[test]
    fn test_load_config_rejects_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let overrides = CliSettings {
            kroki_url: Some("ftp://kroki".to_owned()),
            ..CliSettings::default()
        };
        let err = load_config(Some(&path), &overrides).unwrap_err();

        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");

        write_output(Some(&path), "<p>x</p>\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>x</p>\n");
    }
}
