use std::path::Path;

use anyhow::Context;
use quarry_core::JobLog;
use tokio::io::AsyncReadExt;

use crate::bootstrap;
use crate::cli::{GlobalFlags, RunArgs};
use crate::output::output;

/// Handle `quarry run`.
pub async fn handle(args: &RunArgs, config: quarry_config::QuarryConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = read_request(args.request.as_deref()).await?;
    let mut worker = bootstrap::build_worker(config).await;

    let (response, log) = worker.handle_json(&request).await;
    if let Some(path) = &args.job_log {
        persist_job_log(path, &log)?;
    }
    tracing::info!(stats = %worker.stats(), "job finished");
    output(&response, flags)
}

async fn read_request(path: Option<&Path>) -> anyhow::Result<String> {
    match path.filter(|path| path.as_os_str() != "-") {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read request {}", path.display())),
        None => {
            let mut request = String::new();
            tokio::io::stdin()
                .read_to_string(&mut request)
                .await
                .context("failed to read request from stdin")?;
            Ok(request)
        }
    }
}

fn persist_job_log(path: &Path, log: &JobLog) -> anyhow::Result<()> {
    serde_jsonlines::append_json_lines(path, log.entries())
        .with_context(|| format!("failed to write job log {}", path.display()))
}
