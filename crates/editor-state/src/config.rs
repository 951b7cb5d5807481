//! Session settings for opening documents, stored as YAML.

use serde::{Deserialize, Serialize};

/// Page and history limits applied to every document of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bytes per page requested from the source.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pages kept by each document's page cache.
    #[serde(default = "default_page_cache_capacity")]
    pub page_cache_capacity: usize,

    #[serde(default = "default_undo_maximum_count")]
    pub undo_maximum_count: usize,

    /// Captured payload bytes the undo history may retain.
    #[serde(default = "default_undo_maximum_size")]
    pub undo_maximum_size: u64,
}

fn default_page_size() -> usize {
    paged_data::PAGE_SIZE
}

fn default_page_cache_capacity() -> usize {
    paged_data::cache::DEFAULT_CAPACITY
}

fn default_undo_maximum_count() -> usize {
    editor_core::history::DEFAULT_MAXIMUM_COUNT
}

fn default_undo_maximum_size() -> u64 {
    editor_core::history::DEFAULT_MAXIMUM_SIZE
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_cache_capacity: default_page_cache_capacity(),
            undo_maximum_count: default_undo_maximum_count(),
            undo_maximum_size: default_undo_maximum_size(),
        }
    }
}

impl SessionConfig {
    /// # Errors
    ///
    /// `DocumentError::Config` if the text is not a valid config.
    pub fn from_yaml_str(text: &str) -> crate::errors::DocumentResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// # Errors
    ///
    /// `DocumentError::Config` if the config cannot be serialized.
    pub fn to_yaml_string(&self) -> crate::errors::DocumentResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// # Errors
    ///
    /// - `DocumentError::Io` if the file cannot be read.
    /// - `DocumentError::Config` if it does not parse.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::errors::DocumentResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&content)?;

        tracing::info!("Loaded session config from {}", path.as_ref().display());

        Ok(config)
    }

    /// Like [`SessionConfig::load`], but any failure falls back to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Session config not found at {}, using defaults", path.display());

            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load session config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Writes the config, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// `DocumentError::Io` or `DocumentError::Config`.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::errors::DocumentResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_yaml_string()?)?;
        tracing::info!("Saved session config to {}", path.display());

        Ok(())
    }
}
