//! Subcommand workflows over a [`JobService`].
//!
//! Each subcommand takes a plain options struct, validated before any remote
//! call, and reports through an [`Output`] sink. `Ok(false)` is a reported
//! failure (declined confirmation, failed deletions or imports), not an error.

pub mod info;
pub mod list;
pub mod load;
pub mod purge;

#[cfg(test)]
pub(crate) mod testing;

use crate::core::service::JobService;
use crate::error::JobsError;
use crate::output::Output;
use crate::prompt::Prompt;
use anyhow::Result;

pub use info::InfoOptions;
pub use list::ListOptions;
pub use load::LoadOptions;
pub use purge::PurgeOptions;

#[derive(Debug, Clone)]
pub enum JobsCommand {
    List(ListOptions),
    Info(InfoOptions),
    Load(LoadOptions),
    Purge(PurgeOptions),
}

impl JobsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            JobsCommand::List(_) => "list",
            JobsCommand::Info(_) => "info",
            JobsCommand::Load(_) => "load",
            JobsCommand::Purge(_) => "purge",
        }
    }

    pub fn validate(&self) -> Result<(), JobsError> {
        match self {
            JobsCommand::List(options) => options.validate(),
            JobsCommand::Info(options) => options.validate(),
            JobsCommand::Load(options) => options.validate(),
            JobsCommand::Purge(options) => options.validate(),
        }
    }
}

pub async fn dispatch<S, O, P>(
    command: &JobsCommand,
    service: &S,
    output: &mut O,
    prompt: &mut P,
) -> Result<bool>
where
    S: JobService,
    O: Output + ?Sized,
    P: Prompt + ?Sized,
{
    command.validate()?;
    tracing::debug!(command = command.name(), "Dispatching");

    match command {
        JobsCommand::List(options) => list::handle_list(service, options, output).await,
        JobsCommand::Info(options) => info::handle_info(service, options, output).await,
        JobsCommand::Load(options) => load::handle_load(service, options, output).await,
        JobsCommand::Purge(options) => {
            purge::handle_purge(service, options, output, prompt).await
        }
    }
}

/// The project from flags or configuration; required by project-scoped commands.
pub(crate) fn require_project(project: Option<&str>) -> Result<&str, JobsError> {
    project.filter(|p| !p.trim().is_empty()).ok_or_else(|| {
        JobsError::input("a project is required (use --project or set RDJOBS_PROJECT)")
    })
}
