//! Run-mode settings.

use serde::{Deserialize, Serialize};

const fn default_lines() -> i64 {
    -1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessConfig {
    /// Maximum lines processed per file; negative means unlimited.
    #[serde(default = "default_lines")]
    pub lines: i64,

    /// Full reprocessing: keep only the newest version of each record.
    #[serde(default)]
    pub cold_start: bool,

    /// Only record versions in the coordination store; produce no output.
    #[serde(default)]
    pub detect_last_update_only: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            lines: default_lines(),
            cold_start: false,
            detect_last_update_only: false,
        }
    }
}

impl ProcessConfig {
    /// Line limit, if any.
    pub fn line_limit(&self) -> Option<u64> {
        u64::try_from(self.lines).ok()
    }
}
