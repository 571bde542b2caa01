//! Settings persistence.
//!
//! [`SettingsStore`] is the boundary to wherever user-level settings live.
//! The core reads it once at the start of a conversion and never again.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::{CliSettings, ConfigError, ProviderConfig, SettingsFile};

/// Source and sink of persisted provider settings.
pub trait SettingsStore {
    /// Read the current settings.
    fn get(&self) -> Result<ProviderConfig, ConfigError>;

    /// Persist new settings.
    fn set(&self, settings: &ProviderConfig) -> Result<(), ConfigError>;

    /// Apply overrides to the stored settings and persist them.
    ///
    /// Returns the resolved settings after the update.
    fn update(&self, overrides: &CliSettings) -> Result<ProviderConfig, ConfigError> {
        let mut settings = self.get()?;
        settings.apply_cli_settings(overrides);
        self.set(&settings)?;
        Ok(settings)
    }
}

/// TOML file backed settings store.
///
/// A missing file reads as default settings; `set` creates it.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Create a store for the given path.
    ///
    /// A leading `~` is expanded to the user's home directory.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::tilde(&raw).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self) -> Result<ProviderConfig, ConfigError> {
        if !self.path.exists() {
            return Ok(ProviderConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        ProviderConfig::from_toml(&content)
    }

    fn set(&self, settings: &ProviderConfig) -> Result<(), ConfigError> {
        settings.validate()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, settings.to_toml()?)?;
        Ok(())
    }

    /// Rewrites only the overridden keys; `${VAR}` references elsewhere in
    /// the file are written back unexpanded.
    fn update(&self, overrides: &CliSettings) -> Result<ProviderConfig, ConfigError> {
        let content = if self.path.exists() {
            Some(std::fs::read_to_string(&self.path)?)
        } else {
            None
        };
        let (text, settings) = SettingsFile::update(content.as_deref(), overrides)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)?;
        Ok(settings)
    }
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<ProviderConfig>,
}

impl MemorySettingsStore {
    /// Create a store holding the given settings.
    #[must_use]
    pub fn new(settings: ProviderConfig) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Result<ProviderConfig, ConfigError> {
        let guard = self
            .settings
            .read()
            .map_err(|_| ConfigError::Validation("settings lock poisoned".to_owned()))?;
        Ok(guard.clone())
    }

    fn set(&self, settings: &ProviderConfig) -> Result<(), ConfigError> {
        settings.validate()?;
        let mut guard = self
            .settings
            .write()
            .map_err(|_| ConfigError::Validation("settings lock poisoned".to_owned()))?;
        *guard = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::{CodeRetention, DiagramProvider, Theme};

    #[test]
    fn test_missing_file_reads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("md2doc.toml"));

        assert_eq!(store.get().unwrap(), ProviderConfig::default());
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("md2doc.toml"));
        let settings = ProviderConfig {
            provider: DiagramProvider::MermaidChart,
            api_key: "token".to_owned(),
            theme: Theme::Dark,
            code_retention: CodeRetention::None,
            ..Default::default()
        };

        store.set(&settings).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.get().unwrap(), settings);
    }

    #[test]
    fn test_set_rejects_invalid_settings() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("md2doc.toml"));
        let settings = ProviderConfig {
            provider: DiagramProvider::Custom,
            api_key: "not-a-url".to_owned(),
            ..Default::default()
        };

        assert!(store.set(&settings).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_get_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md2doc.toml");
        std::fs::write(&path, "[diagrams\nprovider = ").unwrap();

        let err = FileSettingsStore::new(&path).get().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_update_keeps_env_references() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MD2DOC_STORE_TEST_TOKEN", "s3cr3t-token");
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md2doc.toml");
        std::fs::write(
            &path,
            "[diagrams]\nprovider = \"mermaidchart\"\napi_key = \"${MD2DOC_STORE_TEST_TOKEN}\"\n",
        )
        .unwrap();
        let store = FileSettingsStore::new(&path);

        let updated = store
            .update(&CliSettings {
                theme: Some(Theme::Dark),
                ..CliSettings::default()
            })
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"api_key = "${MD2DOC_STORE_TEST_TOKEN}""#));
        assert!(!content.contains("s3cr3t-token"));
        assert!(content.contains(r#"theme = "dark""#));
        assert_eq!(updated.api_key, "s3cr3t-token");
        assert_eq!(store.get().unwrap().theme, Theme::Dark);
        unsafe {
            std::env::remove_var("MD2DOC_STORE_TEST_TOKEN");
        }
    }

    #[test]
    fn test_update_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("md2doc.toml"));

        store
            .update(&CliSettings {
                code_retention: Some(CodeRetention::Caption),
                ..CliSettings::default()
            })
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains(r#"code_retention = "caption""#));
        assert!(!content.contains("api_key"));
    }

    #[test]
    fn test_update_rejects_invalid_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md2doc.toml");
        std::fs::write(&path, "[diagrams]\ntheme = \"forest\"\n").unwrap();
        let store = FileSettingsStore::new(&path);

        let result = store.update(&CliSettings {
            kroki_url: Some("kroki.internal".to_owned()),
            ..CliSettings::default()
        });

        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[diagrams]\ntheme = \"forest\"\n"
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySettingsStore::default();
        assert_eq!(store.get().unwrap().theme, Theme::Neutral);

        let settings = ProviderConfig {
            theme: Theme::Base,
            ..Default::default()
        };
        store.set(&settings).unwrap();
        assert_eq!(store.get().unwrap().theme, Theme::Base);
    }
}
