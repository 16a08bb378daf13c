//! Batch job request/response envelope.
//!
//! A job invocation carries a list of file tasks and is answered with one
//! result per task. Field names follow the batch-operations wire format
//! (`camelCase`); the S3 batch names (`s3Key`, `s3VersionId`, `s3BucketArn`)
//! are accepted as aliases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Current envelope schema version.
pub const SCHEMA_VERSION: &str = "1.0";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

// ---------------------------------------------------------------------------
// ResultCode
// ---------------------------------------------------------------------------

/// Per-task verdict reported back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Succeeded,
    /// The scheduler may retry the task.
    TemporaryFailure,
    /// Retrying will not help.
    PermanentFailure,
}

impl ResultCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::TemporaryFailure => "TemporaryFailure",
            Self::PermanentFailure => "PermanentFailure",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    #[serde(default)]
    pub id: String,
}

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub task_id: String,

    /// Object key (or path) of the source file.
    #[serde(alias = "s3Key")]
    pub source_location: String,

    /// Sortable version of the source, used as the reconciliation marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,

    /// Object store version id of the source, used only to download it.
    /// These ids are opaque and do not order deliveries.
    #[serde(default, alias = "s3VersionId", skip_serializing_if = "Option::is_none")]
    pub object_version: Option<String>,

    /// Bucket name or bucket ARN holding the source.
    #[serde(default, alias = "s3BucketArn", skip_serializing_if = "Option::is_none")]
    pub source_bucket: Option<String>,
}

impl BatchTask {
    /// Version marker for this task: the explicit `sourceVersion`, else the
    /// source location. The object version never takes part.
    #[must_use]
    pub fn version_marker(&self) -> &str {
        self.source_version
            .as_deref()
            .filter(|version| !version.is_empty())
            .unwrap_or(&self.source_location)
    }

    /// Object version to download, if one was given.
    #[must_use]
    pub fn object_version(&self) -> Option<&str> {
        self.object_version.as_deref().filter(|version| !version.is_empty())
    }

    /// Bucket name derived from `source_bucket`.
    ///
    /// An ARN like `arn:aws:s3:::my-bucket` yields `my-bucket`; a plain bucket
    /// name passes through unchanged.
    #[must_use]
    pub fn bucket_name(&self) -> Option<&str> {
        self.source_bucket
            .as_deref()
            .map(|arn| arn.rsplit(':').next().unwrap_or(arn))
            .filter(|bucket| !bucket.is_empty())
    }
}

/// A job invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub invocation_id: String,

    #[serde(default = "default_schema_version")]
    pub invocation_schema_version: String,

    #[serde(default)]
    pub job: BatchJob,

    #[serde(default)]
    pub tasks: Vec<BatchTask>,
}

impl BatchRequest {
    /// Parse a request document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub result_code: ResultCode,
    pub result_message: String,
}

impl TaskResult {
    #[must_use]
    pub fn succeeded(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            result_code: ResultCode::Succeeded,
            result_message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(
        task_id: impl Into<String>,
        code: ResultCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            result_code: code,
            result_message: message.into(),
        }
    }
}

/// The answer to a job invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub invocation_id: String,
    pub invocation_schema_version: String,
    /// Result code applied to tasks without an entry in `results`.
    pub treat_missing_keys_as: ResultCode,
    pub results: Vec<TaskResult>,
}

impl BatchResponse {
    /// An empty response for `request`, results to be pushed by the caller.
    #[must_use]
    pub fn for_request(request: &BatchRequest) -> Self {
        Self {
            invocation_id: request.invocation_id.clone(),
            invocation_schema_version: request.invocation_schema_version.clone(),
            treat_missing_keys_as: ResultCode::TemporaryFailure,
            results: Vec::with_capacity(request.tasks.len()),
        }
    }

    /// Response used when the request itself could not be understood.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            invocation_id: String::new(),
            invocation_schema_version: SCHEMA_VERSION.to_string(),
            treat_missing_keys_as: ResultCode::TemporaryFailure,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_request_with_s3_aliases() {
        let json = r#"{
            "invocationId": "inv-1",
            "invocationSchemaVersion": "1.0",
            "job": { "id": "job-7" },
            "tasks": [
                { "taskId": "t1", "s3Key": "pubs/0001/records_1.jsonl.gz",
                  "s3BucketArn": "arn:aws:s3:::source-bucket" },
                { "taskId": "t2", "sourceLocation": "authors/a.jsonl", "sourceVersion": "run-002" }
            ]
        }"#;

        let request = BatchRequest::from_json(json).unwrap();
        assert_eq!(request.job.id, "job-7");
        assert_eq!(request.tasks.len(), 2);

        let first = &request.tasks[0];
        assert_eq!(first.source_location, "pubs/0001/records_1.jsonl.gz");
        assert_eq!(first.bucket_name(), Some("source-bucket"));
        assert_eq!(first.version_marker(), "pubs/0001/records_1.jsonl.gz");

        let second = &request.tasks[1];
        assert_eq!(second.bucket_name(), None);
        assert_eq!(second.version_marker(), "run-002");
    }

    #[test]
    fn s3_version_id_is_not_the_marker() {
        let json = r#"{"tasks": [
            { "taskId": "t1", "s3Key": "pubs/run-0002/records.jsonl",
              "s3VersionId": "3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrH" },
            { "taskId": "t2", "s3Key": "pubs/run-0003/records.jsonl",
              "s3VersionId": "3HL4kq", "sourceVersion": "0003" }
        ]}"#;

        let request = BatchRequest::from_json(json).unwrap();
        let first = &request.tasks[0];
        assert_eq!(first.version_marker(), "pubs/run-0002/records.jsonl");
        assert_eq!(first.object_version(), Some("3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrH"));

        let second = &request.tasks[1];
        assert_eq!(second.version_marker(), "0003");
        assert_eq!(second.object_version(), Some("3HL4kq"));
    }

    #[test]
    fn plain_bucket_name_passes_through() {
        let task = BatchTask {
            task_id: "t".to_string(),
            source_location: "k".to_string(),
            source_version: Some(String::new()),
            object_version: None,
            source_bucket: Some("plain".to_string()),
        };
        assert_eq!(task.bucket_name(), Some("plain"));
        assert_eq!(task.version_marker(), "k");
    }

    #[test]
    fn response_serializes_camel_case() {
        let request = BatchRequest::from_json(r#"{"invocationId": "inv-1", "tasks": []}"#).unwrap();
        let mut response = BatchResponse::for_request(&request);
        response.results.push(TaskResult::failed(
            "t1",
            ResultCode::PermanentFailure,
            "no matching mapping found",
        ));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["invocationId"], "inv-1");
        assert_eq!(value["treatMissingKeysAs"], "TemporaryFailure");
        assert_eq!(value["results"][0]["resultCode"], "PermanentFailure");
        assert_eq!(value["results"][0]["resultMessage"], "no matching mapping found");
    }

    #[test]
    fn placeholder_has_no_results() {
        let response = BatchResponse::placeholder();
        assert!(response.results.is_empty());
        assert_eq!(response.treat_missing_keys_as, ResultCode::TemporaryFailure);
    }
}
