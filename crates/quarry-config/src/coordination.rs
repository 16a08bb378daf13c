//! Coordination store (libSQL) configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoordinationConfig {
    /// Local database path, `:memory:`, or a `libsql://` / `https://` remote URL.
    #[serde(default)]
    pub url: String,

    /// Auth token for remote databases.
    #[serde(default)]
    pub auth_token: String,
}

impl CoordinationConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// Whether `url` points at a remote database.
    pub fn is_remote(&self) -> bool {
        ["libsql://", "https://", "http://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls() {
        let local = CoordinationConfig {
            url: "/var/lib/quarry/markers.db".to_string(),
            ..CoordinationConfig::default()
        };
        assert!(local.is_configured());
        assert!(!local.is_remote());

        let remote = CoordinationConfig {
            url: "libsql://markers.turso.io".to_string(),
            auth_token: "tok".to_string(),
        };
        assert!(remote.is_remote());

        assert!(!CoordinationConfig::default().is_configured());
    }
}
