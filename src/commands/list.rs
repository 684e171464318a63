use super::require_project;
use crate::core::job::TransferFormat;
use crate::core::selection::JobSelection;
use crate::core::service::JobService;
use crate::core::transfer::{ensure_compatible, write_body, Destination};
use crate::error::JobsError;
use crate::output::{render_records, Output, RecordStyle};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub project: Option<String>,
    /// Comma-separated job ids; excludes `job` and `group`.
    pub idlist: Option<String>,
    /// Job name filter, or `group/name`.
    pub job: Option<String>,
    /// Group path filter.
    pub group: Option<String>,
    /// Download definitions here instead of listing; `-` is stdout.
    pub file: Option<PathBuf>,
    pub format: Option<TransferFormat>,
    /// `%field%` template for each listed job.
    pub outformat: Option<String>,
    pub verbose: bool,
}

impl ListOptions {
    pub fn project(&self) -> Result<&str, JobsError> {
        require_project(self.project.as_deref())
    }

    pub fn selection(&self) -> Result<JobSelection, JobsError> {
        JobSelection::from_flags(
            self.idlist.as_deref(),
            self.job.as_deref(),
            self.group.as_deref(),
        )
    }

    pub fn validate(&self) -> Result<(), JobsError> {
        self.project()?;
        self.selection()?;
        Ok(())
    }

    fn record_style(&self) -> RecordStyle {
        RecordStyle::new(self.verbose, self.outformat.as_deref())
    }
}

/// Lists matching jobs, or downloads their definitions when a file is given.
pub async fn handle_list<S, O>(service: &S, options: &ListOptions, output: &mut O) -> Result<bool>
where
    S: JobService,
    O: Output + ?Sized,
{
    options.validate()?;
    let project = options.project()?;
    let selection = options.selection()?;

    match &options.file {
        Some(path) => {
            export_definitions(service, project, &selection, options, path, output).await?;
        }
        None => {
            let jobs = match &selection {
                JobSelection::Ids(ids) => service.list_jobs_by_ids(project, ids).await,
                JobSelection::Filter(filter) => service.list_jobs(project, filter).await,
            }
            .context("Failed to list jobs")?;

            if options.outformat.is_none() {
                output.info(&format!("{} Jobs in project {}", jobs.len(), project));
            }
            render_records(&options.record_style(), &jobs, output);
        }
    }

    Ok(true)
}

async fn export_definitions<S, O>(
    service: &S,
    project: &str,
    selection: &JobSelection,
    options: &ListOptions,
    path: &std::path::Path,
    output: &mut O,
) -> Result<()>
where
    S: JobService,
    O: Output + ?Sized,
{
    let mut body = service
        .export_jobs(project, selection, options.format.unwrap_or_default())
        .await
        .context("Failed to export jobs")?;
    ensure_compatible(options.format, body.content_type())?;

    let content_type = body.content_type().unwrap_or_default().to_string();
    let destination = Destination::from_path(path);
    let total = write_body(&mut body, &destination, output).await?;
    tracing::debug!(total, %destination, "Export written");

    if options.outformat.is_none() {
        output.info(&format!(
            "Wrote {total} bytes of {content_type} to {destination}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{job, FakeService};
    use crate::output::{BufferedOutput, Channel};

    fn options() -> ListOptions {
        ListOptions {
            project: Some("ops".to_string()),
            ..Default::default()
        }
    }

    fn exporting(content_type: &str, body: &str) -> FakeService {
        FakeService {
            export: Some((content_type.to_string(), body.as_bytes().to_vec())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lists_by_filter_with_count_header() {
        let service = FakeService::with_jobs(vec![
            job("1", Some("db"), "backup"),
            job("2", None, "report"),
        ]);
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            job: Some("db/backup".to_string()),
            ..options()
        };

        assert!(handle_list(&service, &options, &mut output).await.unwrap());

        assert_eq!(service.calls(), ["list_jobs ops name=backup group=db"]);
        assert_eq!(output.messages(Channel::Info), ["2 Jobs in project ops"]);
        assert_eq!(output.lines(), ["1 db/backup (ops)", "2 report (ops)"]);
    }

    #[tokio::test]
    async fn lists_by_id_list() {
        let service = FakeService::with_jobs(vec![job("1", None, "a"), job("2", None, "b")]);
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            idlist: Some("2, 1".to_string()),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert_eq!(service.calls(), ["list_jobs_by_ids ops 2,1"]);
        assert_eq!(output.lines(), ["2 b (ops)", "1 a (ops)"]);
    }

    #[tokio::test]
    async fn custom_format_suppresses_count_header() {
        let service = FakeService::with_jobs(vec![job("1", Some("db"), "backup")]);
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            outformat: Some("%id%,%name%".to_string()),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert!(output.messages(Channel::Info).is_empty());
        assert_eq!(output.lines(), ["1,backup"]);
    }

    #[tokio::test]
    async fn verbose_lists_field_maps() {
        let service = FakeService::with_jobs(vec![job("1", Some("db"), "backup")]);
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            verbose: true,
            outformat: Some("%id%".to_string()),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert_eq!(output.records().len(), 1);
        assert_eq!(output.records()[0]["group"], "db");
        assert!(output.lines().is_empty());
    }

    #[tokio::test]
    async fn export_to_stdout_reports_bytes() {
        let service = exporting("application/xml", "<joblist/>");
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            idlist: Some("j1".to_string()),
            file: Some(PathBuf::from("-")),
            format: Some(TransferFormat::Xml),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert_eq!(service.calls(), ["export_jobs ops j1 format=xml"]);
        assert_eq!(output.raw_bytes(), b"<joblist/>");
        assert_eq!(
            output.messages(Channel::Info),
            ["Wrote 10 bytes of application/xml to stdout"]
        );
    }

    #[tokio::test]
    async fn export_with_custom_format_stays_quiet() {
        let service = exporting("application/xml", "<joblist/>");
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            idlist: Some("j1".to_string()),
            file: Some(PathBuf::from("-")),
            format: Some(TransferFormat::Xml),
            outformat: Some("%id%".to_string()),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert_eq!(output.raw_bytes(), b"<joblist/>");
        assert!(output.messages(Channel::Info).is_empty());
    }

    #[tokio::test]
    async fn export_to_file_overwrites_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.yaml");
        std::fs::write(&path, "old").unwrap();
        let service = exporting("text/yaml;charset=utf-8", "- id: j1\n");
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            group: Some("db".to_string()),
            file: Some(path.clone()),
            format: Some(TransferFormat::Yaml),
            ..options()
        };

        handle_list(&service, &options, &mut output).await.unwrap();

        assert_eq!(service.calls(), ["export_jobs ops name=- group=db format=yaml"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- id: j1\n");
        assert!(output.raw_bytes().is_empty());
        assert_eq!(
            output.messages(Channel::Info),
            [format!(
                "Wrote 9 bytes of text/yaml;charset=utf-8 to file {}",
                path.display()
            )]
        );
    }

    #[tokio::test]
    async fn yaml_request_with_xml_response_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.yaml");
        let service = exporting("application/xml", "<joblist/>");
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            idlist: Some("j1".to_string()),
            file: Some(path.clone()),
            format: Some(TransferFormat::Yaml),
            ..options()
        };

        let err = handle_list(&service, &options, &mut output)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<JobsError>(),
            Some(JobsError::UnexpectedContentType { .. })
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unspecified_format_accepts_xml() {
        let service = exporting("application/xml", "<joblist/>");
        let mut output = BufferedOutput::default();
        let options = ListOptions {
            file: Some(PathBuf::from("-")),
            ..options()
        };

        assert!(handle_list(&service, &options, &mut output).await.unwrap());
        assert_eq!(service.calls(), ["export_jobs ops name=- group=- format=xml"]);
    }
}
