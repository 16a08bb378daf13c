//! Local working directories.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_input_dir() -> PathBuf {
    PathBuf::from("/tmp/input")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/tmp/download")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/tmp/output")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Sources found here are used in place of a download.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Target directory for downloaded sources.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Target directory for generated RDF and deletion lists.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            download_dir: default_download_dir(),
            output_dir: default_output_dir(),
        }
    }
}
