use crate::config::Config;
use crate::core::job::{JobInfo, JobRecord, TransferFormat};
use crate::core::outcome::{DeleteResponse, ImportResponse};
use crate::core::selection::{JobFilter, JobSelection};
use crate::core::service::{ImportRequest, JobService, RawBody};
use crate::error::JobsError;
use anyhow::{anyhow, Context};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use std::sync::Once;

const AUTH_TOKEN_HEADER: &str = "X-Rundeck-Auth-Token";
const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
    base_url: Url,
    token: Option<String>,
}

#[derive(Serialize)]
struct BulkDelete<'a> {
    ids: &'a [String],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Client {
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        install_crypto_provider();

        let base = config.server.url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{base}/api/{}/", config.server.version))
            .with_context(|| format!("Invalid server url: {}", config.server.url))?;
        let client = ReqwestClient::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            token: config.server.token.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Server url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, accept: &str) -> RequestBuilder {
        let builder = self.client.request(method, url).header(ACCEPT, accept);
        match &self.token {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> anyhow::Result<Response> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request"))?;
        check_status(response).await
    }
}

/// Installs the process-wide rustls provider once; later calls are no-ops.
fn install_crypto_provider() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Another component may have installed one already.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Turns a non-success response into [`JobsError::Service`].
async fn check_status(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text.trim().to_string()
            }
        });
    Err(JobsError::Service {
        status: status.as_u16(),
        message,
    }
    .into())
}

fn filter_query(filter: &JobFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(name) = &filter.name {
        query.push(("jobFilter", name.clone()));
    }
    if let Some(group) = &filter.group {
        query.push(("groupPath", group.clone()));
    }
    query
}

impl JobService for Client {
    async fn list_jobs(&self, project: &str, filter: &JobFilter) -> anyhow::Result<Vec<JobRecord>> {
        tracing::debug!(project, ?filter, "Listing jobs");
        let url = self.url(&["project", project, "jobs"])?;
        let builder = self
            .request(Method::GET, url, JSON)
            .query(&filter_query(filter));
        self.send(builder, "list jobs")
            .await?
            .json()
            .await
            .context("Failed to decode job list")
    }

    async fn list_jobs_by_ids(
        &self,
        project: &str,
        ids: &[String],
    ) -> anyhow::Result<Vec<JobRecord>> {
        tracing::debug!(project, ?ids, "Listing jobs by id");
        let url = self.url(&["project", project, "jobs"])?;
        let builder = self
            .request(Method::GET, url, JSON)
            .query(&[("idlist", ids.join(","))]);
        self.send(builder, "list jobs")
            .await?
            .json()
            .await
            .context("Failed to decode job list")
    }

    async fn get_job_info(&self, id: &str) -> anyhow::Result<JobInfo> {
        tracing::debug!(id, "Getting job info");
        let url = self.url(&["job", id, "info"])?;
        self.send(self.request(Method::GET, url, JSON), "job info")
            .await?
            .json()
            .await
            .context("Failed to decode job info")
    }

    async fn delete_jobs(&self, ids: &[String]) -> anyhow::Result<DeleteResponse> {
        tracing::debug!(count = ids.len(), "Deleting jobs");
        let url = self.url(&["jobs", "delete"])?;
        let builder = self
            .request(Method::POST, url, JSON)
            .json(&BulkDelete { ids });
        self.send(builder, "delete jobs")
            .await?
            .json()
            .await
            .context("Failed to decode delete response")
    }

    async fn import_jobs(&self, request: ImportRequest) -> anyhow::Result<ImportResponse> {
        tracing::debug!(
            project = %request.project,
            format = %request.format,
            duplicate = %request.duplicate,
            uuids = %request.uuids,
            bytes = request.body.len(),
            "Importing jobs"
        );
        let url = self.url(&["project", &request.project, "jobs", "import"])?;
        let builder = self
            .request(Method::POST, url, JSON)
            .query(&[
                ("fileformat", request.format.as_ref()),
                ("dupeOption", request.duplicate.as_ref()),
                ("uuidOption", request.uuids.as_ref()),
            ])
            .header(CONTENT_TYPE, request.format.content_type())
            .body(request.body);
        self.send(builder, "import jobs")
            .await?
            .json()
            .await
            .context("Failed to decode import response")
    }

    async fn export_jobs(
        &self,
        project: &str,
        selection: &JobSelection,
        format: TransferFormat,
    ) -> anyhow::Result<RawBody> {
        tracing::debug!(project, ?selection, %format, "Exporting jobs");
        let url = self.url(&["project", project, "jobs", "export"])?;
        let mut query = vec![("format", format.to_string())];
        match selection {
            JobSelection::Ids(ids) => query.push(("idlist", ids.join(","))),
            JobSelection::Filter(filter) => query.extend(filter_query(filter)),
        }
        let builder = self
            .request(Method::GET, url, format.content_type())
            .query(&query);
        let response = self.send(builder, "export jobs").await?;
        Ok(RawBody::from_response(response))
    }
}
