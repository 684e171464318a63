use super::require_project;
use crate::core::job::{DuplicatePolicy, JobLoadItem, TransferFormat, UuidPolicy};
use crate::core::outcome::{ImportOutcome, ImportStatus};
use crate::core::service::{ImportRequest, JobService};
use crate::error::JobsError;
use crate::output::{render_records, Output, RecordStyle};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub project: Option<String>,
    pub file: Option<PathBuf>,
    /// Inferred from the file extension when absent.
    pub format: Option<TransferFormat>,
    pub duplicate: DuplicatePolicy,
    pub remove_uuids: bool,
    pub verbose: bool,
}

impl LoadOptions {
    pub fn validate(&self) -> Result<(), JobsError> {
        require_project(self.project.as_deref())?;
        let file = self.input_file()?;
        if !file.is_file() {
            return Err(unreadable(file));
        }
        Ok(())
    }

    fn input_file(&self) -> Result<&Path, JobsError> {
        self.file
            .as_deref()
            .ok_or_else(|| JobsError::input("-f is required"))
    }

    pub fn transfer_format(&self) -> TransferFormat {
        self.format.unwrap_or_else(|| {
            self.file
                .as_deref()
                .map(TransferFormat::from_path)
                .unwrap_or_default()
        })
    }
}

fn unreadable(path: &Path) -> JobsError {
    JobsError::input(format!(
        "File is not readable or does not exist: {}",
        path.display()
    ))
}

/// Uploads a definitions file and reports each outcome partition.
///
/// Succeeds unless some definition failed to load.
pub async fn handle_load<S, O>(service: &S, options: &LoadOptions, output: &mut O) -> Result<bool>
where
    S: JobService,
    O: Output + ?Sized,
{
    options.validate()?;
    let project = require_project(options.project.as_deref())?;
    let path = options.input_file()?;
    let body = tokio::fs::read(path).await.map_err(|e| {
        tracing::debug!("Reading {} failed: {e}", path.display());
        unreadable(path)
    })?;

    let request = ImportRequest {
        project: project.to_string(),
        body,
        format: options.transfer_format(),
        duplicate: options.duplicate,
        uuids: UuidPolicy::from_remove_flag(options.remove_uuids),
    };
    let response = service
        .import_jobs(request)
        .await
        .with_context(|| format!("Failed to load jobs from {}", path.display()))?;
    let outcome = ImportOutcome::classify(response);

    let style = RecordStyle::new(options.verbose, None);
    for status in ImportStatus::iter() {
        print_partition(outcome.partition(status), status, &style, output);
    }

    Ok(outcome.is_success())
}

fn print_partition<O: Output + ?Sized>(
    items: &[JobLoadItem],
    status: ImportStatus,
    style: &RecordStyle,
    output: &mut O,
) {
    if items.is_empty() {
        return;
    }
    let header = format!("{} Jobs {status}:", items.len());
    match status {
        ImportStatus::Succeeded => output.info(&header),
        ImportStatus::Skipped => output.warning(&header),
        ImportStatus::Failed => output.error(&header),
    }
    render_records(style, items, output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeService;
    use crate::core::outcome::ImportResponse;
    use crate::error::as_input_error;
    use crate::output::{BufferedOutput, Channel};

    fn item(index: u32, name: &str, error: Option<&str>) -> JobLoadItem {
        JobLoadItem {
            index: Some(index),
            id: Some(format!("id-{index}")),
            name: Some(name.to_string()),
            group: Some("db".to_string()),
            project: Some("ops".to_string()),
            error: error.map(str::to_string),
            ..Default::default()
        }
    }

    fn definitions_file(name: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, "<joblist><job><name>backup</name></job></joblist>").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn single_success_prints_only_succeeded_section() {
        let (_dir, path) = definitions_file("jobs.xml");
        let service = FakeService {
            import_response: ImportResponse {
                succeeded: Some(vec![item(1, "backup", None)]),
                skipped: Some(vec![]),
                failed: Some(vec![]),
            },
            ..Default::default()
        };
        let mut output = BufferedOutput::default();
        let options = LoadOptions {
            project: Some("ops".to_string()),
            file: Some(path),
            ..Default::default()
        };

        assert!(handle_load(&service, &options, &mut output).await.unwrap());

        assert_eq!(
            service.calls(),
            ["import_jobs ops format=xml dupe=update uuid=preserve"]
        );
        assert_eq!(output.messages(Channel::Info), ["1 Jobs Succeeded:"]);
        assert!(output.messages(Channel::Warning).is_empty());
        assert!(output.messages(Channel::Error).is_empty());
        assert_eq!(output.lines(), ["id-1 db/backup"]);

        let imported = service.imported().unwrap();
        assert_eq!(imported.body, b"<joblist><job><name>backup</name></job></joblist>");
    }

    #[tokio::test]
    async fn failures_make_the_load_fail() {
        let (_dir, path) = definitions_file("jobs.yml");
        let service = FakeService {
            import_response: ImportResponse {
                succeeded: Some(vec![item(1, "backup", None)]),
                skipped: Some(vec![item(2, "report", None)]),
                failed: Some(vec![item(3, "broken", Some("Invalid schedule"))]),
            },
            ..Default::default()
        };
        let mut output = BufferedOutput::default();
        let options = LoadOptions {
            project: Some("ops".to_string()),
            file: Some(path),
            duplicate: DuplicatePolicy::Skip,
            remove_uuids: true,
            ..Default::default()
        };

        assert!(!handle_load(&service, &options, &mut output).await.unwrap());

        assert_eq!(
            service.calls(),
            ["import_jobs ops format=yaml dupe=skip uuid=remove"]
        );
        assert_eq!(output.messages(Channel::Warning), ["1 Jobs Skipped:"]);
        assert_eq!(output.messages(Channel::Error), ["1 Jobs Failed:"]);
        assert_eq!(
            output.lines(),
            [
                "id-1 db/backup",
                "id-2 db/report",
                "id-3 db/broken : Invalid schedule"
            ]
        );
    }

    #[tokio::test]
    async fn verbose_renders_records() {
        let (_dir, path) = definitions_file("jobs.xml");
        let service = FakeService {
            import_response: ImportResponse {
                succeeded: Some(vec![item(1, "backup", None)]),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut output = BufferedOutput::default();
        let options = LoadOptions {
            project: Some("ops".to_string()),
            file: Some(path),
            format: Some(TransferFormat::Yaml),
            verbose: true,
            ..Default::default()
        };

        assert!(handle_load(&service, &options, &mut output).await.unwrap());
        assert_eq!(service.imported().unwrap().format, TransferFormat::Yaml);
        assert_eq!(output.records()[0]["index"], "1");
        assert!(output.lines().is_empty());
    }

    #[tokio::test]
    async fn missing_file_flag_is_an_input_error() {
        let service = FakeService::default();
        let mut output = BufferedOutput::default();
        let options = LoadOptions {
            project: Some("ops".to_string()),
            ..Default::default()
        };

        let err = handle_load(&service, &options, &mut output)
            .await
            .unwrap_err();

        assert_eq!(as_input_error(&err), Some("-f is required"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn directory_is_not_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = FakeService::default();
        let mut output = BufferedOutput::default();
        let options = LoadOptions {
            project: Some("ops".to_string()),
            file: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let err = handle_load(&service, &options, &mut output)
            .await
            .unwrap_err();

        assert!(as_input_error(&err)
            .unwrap()
            .starts_with("File is not readable or does not exist"));
        assert!(service.calls().is_empty());
    }
}
