//! Line preprocessing toggles.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreprocessingConfig {
    /// Wrap each record as `{"list":[record]}`.
    #[serde(default = "default_true")]
    pub list: bool,

    /// Copy parent identity fields into nested objects.
    #[serde(default = "default_true")]
    pub parent: bool,

    /// Add `__index` to array elements.
    #[serde(default = "default_true")]
    pub index: bool,

    /// Log every line before and after preprocessing at debug level.
    #[serde(default)]
    pub log: bool,

    #[serde(default = "default_true")]
    pub skip_enabled: bool,

    /// Lines fully matching this regular expression are skipped.
    #[serde(default)]
    pub skip_pattern: String,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            list: true,
            parent: true,
            index: true,
            log: false,
            skip_enabled: true,
            skip_pattern: String::new(),
        }
    }
}

impl PreprocessingConfig {
    /// The skip pattern, when skipping is enabled and a pattern is set.
    pub fn active_skip_pattern(&self) -> Option<&str> {
        (self.skip_enabled && !self.skip_pattern.is_empty()).then_some(self.skip_pattern.as_str())
    }
}
