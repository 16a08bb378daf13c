//! Answering batch job invocations.

use std::time::Instant;

use quarry_core::{BatchRequest, BatchResponse, BatchTask, JobLog, TaskResult};

use crate::orchestrator::FileConversionOrchestrator;
use crate::stats::ConversionStats;

/// Statistics are logged after every this many files.
pub const STATS_INTERVAL: u64 = 100;

/// Processes the tasks of a job strictly one after another.
pub struct BatchWorker {
    orchestrator: FileConversionOrchestrator,
    stats: ConversionStats,
}

impl BatchWorker {
    #[must_use]
    pub fn new(orchestrator: FileConversionOrchestrator) -> Self {
        Self {
            orchestrator,
            stats: ConversionStats::new(),
        }
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &FileConversionOrchestrator {
        &self.orchestrator
    }

    #[must_use]
    pub const fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Parse and process a request document.
    ///
    /// A malformed request is logged and answered with a placeholder
    /// response; the returned log belongs to the job.
    pub async fn handle_json(&mut self, json: &str) -> (BatchResponse, JobLog) {
        match BatchRequest::from_json(json) {
            Ok(request) => {
                let log = JobLog::new(job_id(&request));
                let response = self.handle(&request, &log).await;
                (response, log)
            }
            Err(error) => {
                let log = JobLog::new("unknown");
                log.error(format!("could not parse batch request: {error}"));
                (BatchResponse::placeholder(), log)
            }
        }
    }

    /// Process every task of `request`. Never fails: each task gets a result.
    pub async fn handle(&mut self, request: &BatchRequest, log: &JobLog) -> BatchResponse {
        let mut response = BatchResponse::for_request(request);
        log.info(format!("processing {} tasks", request.tasks.len()));

        for task in &request.tasks {
            let result = self.run_task(task, log).await;
            response.results.push(result);
        }

        log.info(format!("finished job: {}", self.stats.summary()));
        response
    }

    async fn run_task(&mut self, task: &BatchTask, log: &JobLog) -> TaskResult {
        let started = Instant::now();
        let outcome = self.orchestrator.convert(task, log, &mut self.stats).await;
        self.stats.add_file(started.elapsed());
        if self.stats.files() % STATS_INTERVAL == 0 {
            tracing::info!(stats = %self.stats, "conversion progress");
        }

        let key = &task.source_location;
        match outcome {
            Ok(report) => {
                let message = report.message();
                log.info(format!("converted {key} with mapping {}: {message}", report.mapping));
                TaskResult::succeeded(&task.task_id, message)
            }
            Err(error) => {
                let code = error.result_code();
                log.error(format!("failed to convert {key}: {error}"));
                TaskResult::failed(&task.task_id, code, format!("Failed: {error}"))
            }
        }
    }
}

fn job_id(request: &BatchRequest) -> String {
    [&request.job.id, &request.invocation_id]
        .into_iter()
        .find(|id| !id.is_empty())
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}
