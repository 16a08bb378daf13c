//! Download and upload toggles.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

fn default_bucket() -> String {
    String::from("output-bucket")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Fetch sources missing from the input directory from object storage.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Remove downloaded sources once their task is done.
    #[serde(default = "default_true")]
    pub delete: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delete: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bucket receiving outputs and deletion lists.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Remove local outputs after upload (and partial outputs after a failure).
    #[serde(default = "default_true")]
    pub delete: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bucket: default_bucket(),
            delete: true,
        }
    }
}

impl UploadConfig {
    /// Check if uploads can actually happen (enabled with a bucket).
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.bucket.is_empty()
    }
}
