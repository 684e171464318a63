//! The remote job service as seen by the workflows.
//!
//! [`crate::client::Client`] is the HTTP implementation; tests substitute an
//! in-memory one.

use super::job::{DuplicatePolicy, JobInfo, JobRecord, TransferFormat, UuidPolicy};
use super::outcome::{DeleteResponse, ImportResponse};
use super::selection::{JobFilter, JobSelection};
use anyhow::{Context, Result};
use std::collections::VecDeque;

/// Parameters of a single import call.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub project: String,
    pub body: Vec<u8>,
    pub format: TransferFormat,
    pub duplicate: DuplicatePolicy,
    pub uuids: UuidPolicy,
}

#[allow(async_fn_in_trait)]
pub trait JobService {
    async fn list_jobs(&self, project: &str, filter: &JobFilter) -> Result<Vec<JobRecord>>;

    async fn list_jobs_by_ids(&self, project: &str, ids: &[String]) -> Result<Vec<JobRecord>>;

    async fn get_job_info(&self, id: &str) -> Result<JobInfo>;

    async fn delete_jobs(&self, ids: &[String]) -> Result<DeleteResponse>;

    async fn import_jobs(&self, request: ImportRequest) -> Result<ImportResponse>;

    /// Fetches definitions as an undecoded document.
    async fn export_jobs(
        &self,
        project: &str,
        selection: &JobSelection,
        format: TransferFormat,
    ) -> Result<RawBody>;
}

/// An undecoded response body plus its declared content type.
pub struct RawBody {
    content_type: Option<String>,
    source: BodySource,
}

enum BodySource {
    Response(reqwest::Response),
    Buffered(VecDeque<Vec<u8>>),
}

impl RawBody {
    pub fn from_response(response: reqwest::Response) -> Self {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Self {
            content_type,
            source: BodySource::Response(response),
        }
    }

    /// A body already held in memory, delivered chunk by chunk.
    pub fn from_chunks(content_type: Option<&str>, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            source: BodySource::Buffered(chunks.into()),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Next chunk of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        match &mut self.source {
            BodySource::Response(response) => Ok(response
                .chunk()
                .await
                .context("Failed to read export response body")?
                .map(|bytes| bytes.to_vec())),
            BodySource::Buffered(chunks) => Ok(chunks.pop_front()),
        }
    }
}

impl std::fmt::Debug for RawBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBody")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
