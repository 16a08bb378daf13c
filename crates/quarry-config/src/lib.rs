//! # quarry-config
//!
//! Layered configuration loading for Quarry using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUARRY_*` prefix, `__` as separator)
//! 2. An explicit file passed by the caller (e.g. `quarry --config`)
//! 3. Project-level `.quarry/config.toml`
//! 4. User-level `~/.config/quarry/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QUARRY_UPLOAD__BUCKET` -> `upload.bucket`,
//! `QUARRY_PROCESS__COLD_START` -> `process.cold_start`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use quarry_config::QuarryConfig;
//!
//! let config = QuarryConfig::load_with_dotenv().expect("config");
//!
//! if config.upload.is_configured() {
//!     println!("uploading to {}", config.upload.bucket);
//! }
//! ```

mod coordination;
mod error;
mod mappings;
mod output;
mod paths;
mod preprocessing;
mod process;
mod s3;
mod transfer;

pub use coordination::CoordinationConfig;
pub use error::ConfigError;
pub use mappings::{DEFAULT_MAPPINGS_FILE, MappingsConfig};
pub use output::OutputConfig;
pub use paths::PathsConfig;
pub use preprocessing::PreprocessingConfig;
pub use process::ProcessConfig;
pub use s3::S3Config;
pub use transfer::{DownloadConfig, UploadConfig};

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuarryConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub mappings: MappingsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub s3: S3Config,
}

impl QuarryConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with an explicit TOML file layered above the
    /// global and project files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if `path` does not exist, or
    /// [`ConfigError::Figment`] on parse errors.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let _ = dotenvy::dotenv();
        Self::extract(Self::figment_with(Some(path)))
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    /// Build the provider chain, optionally including an explicit file.
    pub fn figment_with(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".quarry/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("QUARRY_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let mut config: Self = figment.extract()?;
        config.normalize();
        Ok(config)
    }

    /// Degrade inconsistent settings instead of failing the job.
    fn normalize(&mut self) {
        if self.upload.enabled && self.upload.bucket.is_empty() {
            tracing::warn!("upload is enabled but no upload bucket is configured, disabling upload");
            self.upload.enabled = false;
        }
        if self.process.cold_start && self.process.detect_last_update_only {
            tracing::warn!(
                "process.cold_start has no effect while process.detect_last_update_only is set"
            );
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quarry").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = QuarryConfig::default();
        assert!(config.upload.is_configured());
        assert!(config.download.enabled);
        assert!(!config.coordination.is_configured());
        assert!(!config.process.cold_start);
        assert_eq!(config.output.format, "trig");
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = QuarryConfig::figment();
        let config: QuarryConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.process.lines, -1);
        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/output"));
        assert_eq!(
            config.mappings.literal_conversion_mode,
            "validateAndFallbackToPlaceholder"
        );
    }

    #[test]
    fn normalize_disables_upload_without_bucket() {
        let mut config = QuarryConfig::default();
        config.upload.bucket.clear();
        config.normalize();
        assert!(!config.upload.enabled);
    }
}
