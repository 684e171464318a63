use super::list::{handle_list, ListOptions};
use crate::core::job::JobView;
use crate::core::outcome::DeleteOutcome;
use crate::core::selection::resolve_job_ids;
use crate::core::service::JobService;
use crate::error::JobsError;
use crate::output::Output;
use crate::prompt::Prompt;
use anyhow::{Context, Result};

/// The only answer that lets an unconfirmed purge go ahead.
const AFFIRMATIVE: &str = "y";

#[derive(Debug, Clone, Default)]
pub struct PurgeOptions {
    /// Selection, plus an optional file to save the definitions to first.
    pub list: ListOptions,
    /// Skip the interactive confirmation.
    pub confirm: bool,
}

impl PurgeOptions {
    pub fn validate(&self) -> Result<(), JobsError> {
        self.list.validate()
    }
}

/// Deletes the selected jobs, optionally exporting them first.
///
/// Declining the confirmation or any failed deletion returns `Ok(false)`.
pub async fn handle_purge<S, O, P>(
    service: &S,
    options: &PurgeOptions,
    output: &mut O,
    prompt: &mut P,
) -> Result<bool>
where
    S: JobService,
    O: Output + ?Sized,
    P: Prompt + ?Sized,
{
    options.validate()?;
    let project = options.list.project()?;
    let selection = options.list.selection()?;
    let ids = resolve_job_ids(service, project, &selection).await?;

    if options.list.file.is_some() {
        handle_list(service, &options.list, output)
            .await
            .context("Failed to save job definitions before deleting")?;
    }

    if !options.confirm {
        let answer = prompt
            .read_line(&format!("Really delete {} Jobs? (y/N)", ids.len()))
            .context("Failed to read confirmation")?;
        if answer.trim_end_matches(['\r', '\n']) != AFFIRMATIVE {
            output.warning(&format!("Not deleting {} jobs", ids.len()));
            return Ok(false);
        }
    }

    let response = service
        .delete_jobs(&ids)
        .await
        .context("Failed to delete jobs")?;
    let outcome = DeleteOutcome::classify(response);

    if outcome.all_successful() {
        output.info(&format!("{} Jobs were deleted", outcome.request_count()));
        return Ok(true);
    }

    output.error(&format!("Failed to delete {} Jobs", outcome.failed().len()));
    let failures: Vec<String> = outcome.failed().iter().map(JobView::basic_string).collect();
    output.lines(&failures);
    Ok(false)
}
