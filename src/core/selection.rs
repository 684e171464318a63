use super::job::split_job_name_parts;
use super::service::JobService;
use crate::error::JobsError;
use anyhow::{Context, Result};

/// Name/group filter applied by the service. Both parts absent means "every job".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub name: Option<String>,
    pub group: Option<String>,
}

impl JobFilter {
    /// Builds a filter from the `--job`/`--group` flags.
    ///
    /// A `group/name` job filter without an explicit group is split into both parts.
    pub fn new(name: Option<&str>, group: Option<&str>) -> Self {
        let name = name.filter(|n| !n.is_empty());
        let group = group.filter(|g| !g.is_empty());
        match (name, group) {
            (Some(job), None) if job.contains('/') => {
                let (group, name) = split_job_name_parts(job);
                Self {
                    name: (!name.is_empty()).then_some(name),
                    group,
                }
            }
            (name, group) => Self {
                name: name.map(str::to_string),
                group: group.map(str::to_string),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.group.is_none()
    }
}

/// Which jobs a command targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSelection {
    /// Explicit identifiers, in the order given.
    Ids(Vec<String>),
    Filter(JobFilter),
}

impl JobSelection {
    /// Builds the selection from raw flags. An id-list excludes both filters.
    pub fn from_flags(
        idlist: Option<&str>,
        job: Option<&str>,
        group: Option<&str>,
    ) -> Result<Self, JobsError> {
        match idlist {
            Some(_) if job.is_some() || group.is_some() => Err(JobsError::input(
                "--idlist cannot be combined with --job or --group",
            )),
            Some(idlist) => Ok(JobSelection::Ids(split_id_list(idlist))),
            None => Ok(JobSelection::Filter(JobFilter::new(job, group))),
        }
    }
}

/// Splits a comma-separated id list, trimming whitespace around each entry.
///
/// Entries are kept as written, empty ones included; a blank list has none.
///
/// # Examples
///
/// ```
/// use rdjobs::core::selection::split_id_list;
///
/// assert_eq!(split_id_list("a, b ,c"), vec!["a", "b", "c"]);
/// assert_eq!(split_id_list("a,,b"), vec!["a", "", "b"]);
/// assert!(split_id_list(" ").is_empty());
/// ```
pub fn split_id_list(idlist: &str) -> Vec<String> {
    if idlist.trim().is_empty() {
        return Vec::new();
    }
    idlist.split(',').map(|id| id.trim().to_string()).collect()
}

/// Resolves a selection to concrete job identifiers.
///
/// Explicit ids are returned as-is without contacting the service. A filter
/// must name a job or a group; matching ids come back in server order.
pub async fn resolve_job_ids<S: JobService>(
    service: &S,
    project: &str,
    selection: &JobSelection,
) -> Result<Vec<String>> {
    match selection {
        JobSelection::Ids(ids) => Ok(ids.clone()),
        JobSelection::Filter(filter) if filter.is_empty() => Err(JobsError::input(
            "must specify an id-list (-i), or job/group filter (-j/-g)",
        )
        .into()),
        JobSelection::Filter(filter) => {
            tracing::debug!(project, ?filter, "Resolving job ids by filter");
            let jobs = service
                .list_jobs(project, filter)
                .await
                .context("Failed to list jobs for selection")?;
            Ok(jobs.into_iter().map(|job| job.id).collect())
        }
    }
}
