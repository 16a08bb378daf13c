//! S3-compatible object storage credentials.

use serde::{Deserialize, Serialize};

fn default_region() -> String {
    String::from("us-east-1")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Config {
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (MinIO, R2, localstack). Empty uses AWS.
    #[serde(default)]
    pub endpoint: String,

    /// Empty means credentials come from the standard AWS environment.
    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Permit plain HTTP endpoints.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            allow_http: false,
        }
    }
}

impl S3Config {
    /// Check if static credentials are present.
    pub fn has_static_credentials(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}
