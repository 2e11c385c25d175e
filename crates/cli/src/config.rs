use std::path::PathBuf;

use clipgen_core::error::CoreError;
use clipgen_provider::client::{ProviderConfig, DEFAULT_API_BASE_URL};

use crate::cli::expand_tilde;

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Generation service API key. Only required by commands that call it.
    pub api_key: Option<String>,
    /// Base URL of the generation service.
    pub api_base_url: String,
    /// Preset catalog file. `None` selects the bundled catalog.
    pub presets_path: Option<PathBuf>,
    /// Home directory used for `~` expansion.
    pub home_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                                             |
    /// |------------------------|-----------------------------------------------------|
    /// | `GOOGLE_API_KEY`       | none                                                |
    /// | `CLIPGEN_API_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta`  |
    /// | `CLIPGEN_PRESETS_PATH` | bundled catalog                                     |
    /// | `HOME`                 | none (no `~` expansion)                             |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let home_dir = non_empty("HOME").map(PathBuf::from);
        let presets_path = non_empty("CLIPGEN_PRESETS_PATH")
            .map(|p| expand_tilde(&p, home_dir.as_ref()));

        Self {
            api_key: non_empty("GOOGLE_API_KEY"),
            api_base_url: non_empty("CLIPGEN_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            presets_path,
            home_dir,
        }
    }

    /// Provider settings, failing with `MISSING_API_KEY` when no key is set.
    pub fn provider_config(&self) -> Result<ProviderConfig, CoreError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CoreError::validation(
                "MISSING_API_KEY",
                "Missing GOOGLE_API_KEY. Set it in the environment or a .env file.",
            )
        })?;
        Ok(ProviderConfig::new(api_key).with_base_url(self.api_base_url.clone()))
    }

    pub fn expand_path(&self, raw: &str) -> PathBuf {
        expand_tilde(raw, self.home_dir.as_ref())
    }
}
