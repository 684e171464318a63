use crate::core::service::JobService;
use crate::error::JobsError;
use crate::output::{render_records, Output, RecordStyle};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct InfoOptions {
    pub id: String,
    pub outformat: Option<String>,
    pub verbose: bool,
}

impl InfoOptions {
    pub fn validate(&self) -> Result<(), JobsError> {
        if self.id.trim().is_empty() {
            return Err(JobsError::input("a job id is required (-i)"));
        }
        Ok(())
    }
}

/// Shows a single job, rendered like one entry of `list`.
pub async fn handle_info<S, O>(service: &S, options: &InfoOptions, output: &mut O) -> Result<bool>
where
    S: JobService,
    O: Output + ?Sized,
{
    options.validate()?;
    let info = service
        .get_job_info(options.id.trim())
        .await
        .with_context(|| format!("Failed to get info for job {}", options.id))?;

    let style = RecordStyle::new(options.verbose, options.outformat.as_deref());
    render_records(&style, std::slice::from_ref(&info), output);
    Ok(true)
}
