//! In-memory job service for workflow tests.

use crate::core::job::{JobInfo, JobRecord, TransferFormat};
use crate::core::outcome::{DeleteResponse, ImportResponse};
use crate::core::selection::{JobFilter, JobSelection};
use crate::core::service::{ImportRequest, JobService, RawBody};
use crate::error::JobsError;
use anyhow::Result;
use std::cell::RefCell;

#[derive(Default)]
pub struct FakeService {
    pub jobs: Vec<JobRecord>,
    pub info: Option<JobInfo>,
    pub delete_response: DeleteResponse,
    pub import_response: ImportResponse,
    /// Content type and body returned by exports.
    pub export: Option<(String, Vec<u8>)>,
    pub(crate) calls: RefCell<Vec<String>>,
    pub(crate) imported: RefCell<Option<ImportRequest>>,
}

impl FakeService {
    pub fn with_jobs(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn imported(&self) -> Option<ImportRequest> {
        self.imported.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

pub fn job(id: &str, group: Option<&str>, name: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        name: name.to_string(),
        group: group.map(str::to_string),
        project: "ops".to_string(),
        ..Default::default()
    }
}

impl JobService for FakeService {
    async fn list_jobs(&self, project: &str, filter: &JobFilter) -> Result<Vec<JobRecord>> {
        self.record(format!(
            "list_jobs {project} name={} group={}",
            filter.name.as_deref().unwrap_or("-"),
            filter.group.as_deref().unwrap_or("-"),
        ));
        Ok(self.jobs.clone())
    }

    async fn list_jobs_by_ids(&self, project: &str, ids: &[String]) -> Result<Vec<JobRecord>> {
        self.record(format!("list_jobs_by_ids {project} {}", ids.join(",")));
        Ok(ids
            .iter()
            .filter_map(|id| self.jobs.iter().find(|job| &job.id == id).cloned())
            .collect())
    }

    async fn get_job_info(&self, id: &str) -> Result<JobInfo> {
        self.record(format!("get_job_info {id}"));
        self.info.clone().ok_or_else(|| {
            JobsError::Service {
                status: 404,
                message: format!("Job ID does not exist: {id}"),
            }
            .into()
        })
    }

    async fn delete_jobs(&self, ids: &[String]) -> Result<DeleteResponse> {
        self.record(format!("delete_jobs {}", ids.join(",")));
        Ok(self.delete_response.clone())
    }

    async fn import_jobs(&self, request: ImportRequest) -> Result<ImportResponse> {
        self.record(format!(
            "import_jobs {} format={} dupe={} uuid={}",
            request.project, request.format, request.duplicate, request.uuids
        ));
        *self.imported.borrow_mut() = Some(request);
        Ok(self.import_response.clone())
    }

    async fn export_jobs(
        &self,
        project: &str,
        selection: &JobSelection,
        format: TransferFormat,
    ) -> Result<RawBody> {
        let target = match selection {
            JobSelection::Ids(ids) => ids.join(","),
            JobSelection::Filter(filter) => format!(
                "name={} group={}",
                filter.name.as_deref().unwrap_or("-"),
                filter.group.as_deref().unwrap_or("-"),
            ),
        };
        self.record(format!("export_jobs {project} {target} format={format}"));
        let (content_type, body) = self.export.clone().unwrap_or_default();
        // Split in two to exercise chunked copying.
        let mid = body.len() / 2;
        Ok(RawBody::from_chunks(
            Some(content_type.as_str()),
            vec![body[..mid].to_vec(), body[mid..].to_vec()],
        ))
    }
}
