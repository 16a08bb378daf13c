//! Mapping configuration location and literal handling.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name appended when `location` names a directory.
pub const DEFAULT_MAPPINGS_FILE: &str = "mappings.json";

fn default_location() -> String {
    String::from("mappings/")
}

fn default_literal_conversion_mode() -> String {
    String::from("validateAndFallbackToPlaceholder")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingsConfig {
    /// Mapping configuration document, or a directory (trailing `/`) containing
    /// `mappings.json`.
    #[serde(default = "default_location")]
    pub location: String,

    /// One of `noValidation`, `validateAndFail`, `validateAndFallbackToString`,
    /// `validateAndFallbackToPlaceholder`.
    #[serde(default = "default_literal_conversion_mode")]
    pub literal_conversion_mode: String,
}

impl Default for MappingsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            literal_conversion_mode: default_literal_conversion_mode(),
        }
    }
}

impl MappingsConfig {
    /// Path of the mapping configuration document.
    pub fn config_file(&self) -> PathBuf {
        if self.location.is_empty() {
            PathBuf::from(DEFAULT_MAPPINGS_FILE)
        } else if self.location.ends_with('/') {
            PathBuf::from(format!("{}{DEFAULT_MAPPINGS_FILE}", self.location))
        } else {
            PathBuf::from(&self.location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_location_appends_default_file() {
        let config = MappingsConfig::default();
        assert_eq!(config.config_file(), PathBuf::from("mappings/mappings.json"));
    }

    #[test]
    fn file_location_is_used_as_is() {
        let config = MappingsConfig {
            location: "conf/custom.json".to_string(),
            ..MappingsConfig::default()
        };
        assert_eq!(config.config_file(), PathBuf::from("conf/custom.json"));
    }
}
