use std::path::Path;

use anyhow::Context;
use quarry_config::QuarryConfig;
use quarry_convert::{BatchWorker, FileConversionOrchestrator};
use quarry_mapping::{MappingRegistry, RmlEngine};
use quarry_reconcile::{CoordinationStore, ReconcileError, RunMode, UpdateResolver};
use quarry_storage::ObjectStorage;

/// Load configuration, with `.env` support, plus an optional explicit file.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<QuarryConfig> {
    let config = match explicit {
        Some(path) => QuarryConfig::load_from(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => QuarryConfig::load_with_dotenv().context("failed to load configuration")?,
    };
    Ok(config)
}

/// Mapping registry named by the configuration. Never fails: unusable
/// configurations yield an empty registry.
pub fn load_registry(config: &QuarryConfig) -> MappingRegistry {
    let location = config.mappings.config_file();
    let registry = MappingRegistry::load(&location, &RmlEngine);
    if registry.is_empty() {
        tracing::warn!(location = %location.display(), "no mappings loaded");
    }
    registry
}

/// Resolver over the coordination store, when one is configured.
pub async fn open_resolver(config: &QuarryConfig) -> Result<Option<UpdateResolver>, ReconcileError> {
    if !config.coordination.is_configured() {
        return Ok(None);
    }
    let store =
        CoordinationStore::open(&config.coordination.url, &config.coordination.auth_token).await?;
    let mode = RunMode::from_flags(
        config.process.detect_last_update_only,
        config.process.cold_start,
    );
    tracing::debug!(mode = mode.as_str(), "coordination store ready");
    Ok(Some(UpdateResolver::new(store, mode, config.upload.bucket.clone())))
}

/// Assemble the worker: mappings, storage clients and coordination are
/// resolved once per process.
///
/// An unreachable coordination store does not stop the job: files that need
/// it fail with a temporary result, everything else converts.
pub async fn build_worker(config: QuarryConfig) -> BatchWorker {
    let registry = load_registry(&config);
    let storage = ObjectStorage::new(config.s3.clone());
    let orchestrator = match open_resolver(&config).await {
        Ok(resolver) => FileConversionOrchestrator::new(config, registry, storage, resolver),
        Err(error) => {
            tracing::warn!(%error, "coordination store unavailable, reconciled files will fail");
            FileConversionOrchestrator::new(config, registry, storage, None)
                .with_coordination_failure(&error)
        }
    };
    BatchWorker::new(orchestrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_coordination_opens_nothing() {
        let config = QuarryConfig::default();
        assert!(open_resolver(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_coordination_still_builds_worker() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = QuarryConfig::default();
        config.mappings.location = dir.path().join("mappings.json").display().to_string();
        config.coordination.url = dir.path().join("missing/markers.db").display().to_string();

        assert!(open_resolver(&config).await.is_err());
        let worker = build_worker(config).await;
        assert_eq!(worker.stats().files(), 0);
    }
}
