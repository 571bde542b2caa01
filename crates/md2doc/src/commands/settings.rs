//! `md2doc settings` command implementations.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use md2doc_config::{DiagramProvider, ProviderConfig, SettingsStore};

use super::{DiagramArgs, settings_store, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Settings subcommands.
#[derive(Subcommand)]
pub(crate) enum SettingsCommand {
    /// Print the current settings as TOML.
    Show(ShowArgs),
    /// Update and save settings.
    Set(SetArgs),
}

impl SettingsCommand {
    /// Execute the settings subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Show(args) => args.execute(),
            Self::Set(args) => args.execute(),
        }
    }
}

/// Arguments for `settings show`.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Path to settings file (default: ~/.md2doc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ShowArgs {
    fn execute(self) -> Result<(), CliError> {
        let settings = settings_store(self.config.as_deref()).get()?;
        write_output(None, &masked(settings).to_toml()?)
    }
}

/// Arguments for `settings set`.
#[derive(Args)]
pub(crate) struct SetArgs {
    /// Path to settings file (default: ~/.md2doc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    diagrams: DiagramArgs,

    /// MermaidChart API key or custom endpoint URL, stored as given.
    #[arg(long)]
    api_key: Option<String>,
}

impl SetArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let overrides = self.diagrams.cli_settings(self.api_key);
        if overrides.is_empty() {
            output.warning("Nothing to change; pass at least one setting flag.");
            return Ok(());
        }

        let store = settings_store(self.config.as_deref());
        store.update(&overrides)?;

        output.success(&format!("Settings saved to {}", store.path().display()));
        Ok(())
    }
}

/// Hide a bearer token; custom endpoint URLs are shown as they are.
fn masked(mut settings: ProviderConfig) -> ProviderConfig {
    if settings.provider == DiagramProvider::MermaidChart && !settings.api_key.is_empty() {
        settings.api_key = "********".to_owned();
    }
    settings
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use md2doc_config::{FileSettingsStore, Theme};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct SetCli {
        #[command(flatten)]
        args: SetArgs,
    }

    #[test]
    fn test_masked_hides_token() {
        let settings = ProviderConfig {
            provider: DiagramProvider::MermaidChart,
            api_key: "secret".to_owned(),
            ..ProviderConfig::default()
        };
        assert_eq!(masked(settings).api_key, "********");
    }

    #[test]
    fn test_masked_keeps_custom_url() {
        let settings = ProviderConfig {
            provider: DiagramProvider::Custom,
            api_key: "https://render.example.com".to_owned(),
            ..ProviderConfig::default()
        };
        assert_eq!(masked(settings).api_key, "https://render.example.com");
    }

    #[test]
    fn test_set_writes_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("md2doc.toml");
        let args = SetArgs {
            config: Some(path.clone()),
            diagrams: DiagramArgs {
                provider: Some(DiagramProvider::Kroki),
                ..DiagramArgs::default()
            },
            api_key: None,
        };

        args.execute().unwrap();

        let saved = FileSettingsStore::new(&path).get().unwrap();
        assert_eq!(saved.provider, DiagramProvider::Kroki);
    }

    #[test]
    fn test_set_keeps_api_key_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("md2doc.toml");
        std::fs::write(
            &path,
            "[diagrams]\nprovider = \"mermaidchart\"\napi_key = \"${MD2DOC_SET_TEST_TOKEN:-fallback}\"\n",
        )
        .unwrap();
        let args = SetArgs {
            config: Some(path.clone()),
            diagrams: DiagramArgs {
                theme: Some(Theme::Dark),
                ..DiagramArgs::default()
            },
            api_key: None,
        };

        args.execute().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"api_key = "${MD2DOC_SET_TEST_TOKEN:-fallback}""#));
        assert!(content.contains(r#"theme = "dark""#));
    }

    #[test]
    fn test_set_ignores_api_key_env() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MD2DOC_API_KEY", "env-token");
        }
        let cli = SetCli::try_parse_from(["md2doc", "--theme", "dark"]).unwrap();
        unsafe {
            std::env::remove_var("MD2DOC_API_KEY");
        }

        assert_eq!(cli.args.api_key, None);
        assert_eq!(cli.args.diagrams.cli_settings(None).theme, Some(Theme::Dark));
    }
}
