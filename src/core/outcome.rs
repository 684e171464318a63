//! Reconciles bulk import and delete responses into disjoint partitions.

use super::job::{DeletedJob, JobLoadItem};
use serde::Deserialize;
use std::collections::HashSet;
use strum::{Display, EnumIter};

/// Raw bulk delete response. Lists may be `null` on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    #[serde(default)]
    pub request_count: Option<usize>,
    #[serde(default, rename = "allsuccessful")]
    pub all_successful: Option<bool>,
    #[serde(default)]
    pub succeeded: Option<Vec<DeletedJob>>,
    #[serde(default)]
    pub failed: Option<Vec<DeletedJob>>,
}

/// Raw import response. Lists may be `null` on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub succeeded: Option<Vec<JobLoadItem>>,
    #[serde(default)]
    pub skipped: Option<Vec<JobLoadItem>>,
    #[serde(default)]
    pub failed: Option<Vec<JobLoadItem>>,
}

/// Result of a bulk delete. Success is derived from the failed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    request_count: usize,
    failed: Vec<DeletedJob>,
}

impl DeleteOutcome {
    pub fn classify(response: DeleteResponse) -> Self {
        let succeeded = response.succeeded.map_or(0, |jobs| jobs.len());
        let failed = response.failed.unwrap_or_default();
        if let Some(flag) = response.all_successful {
            if flag != failed.is_empty() {
                tracing::warn!(
                    allsuccessful = flag,
                    failed = failed.len(),
                    "Delete response flag disagrees with its failed list"
                );
            }
        }
        let request_count = response
            .request_count
            .unwrap_or(succeeded + failed.len());
        Self {
            request_count,
            failed,
        }
    }

    pub fn all_successful(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn request_count(&self) -> usize {
        self.request_count
    }

    pub fn failed(&self) -> &[DeletedJob] {
        &self.failed
    }
}

/// Partition an imported definition landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ImportStatus {
    Succeeded,
    Skipped,
    Failed,
}

/// Result of an import, with every definition in exactly one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    succeeded: Vec<JobLoadItem>,
    skipped: Vec<JobLoadItem>,
    failed: Vec<JobLoadItem>,
}

#[derive(Hash, PartialEq, Eq)]
enum ItemKey {
    Index(u32),
    Id(String),
}

fn item_key(item: &JobLoadItem) -> Option<ItemKey> {
    item.index
        .map(ItemKey::Index)
        .or_else(|| item.id.clone().map(ItemKey::Id))
}

impl ImportOutcome {
    /// Splits the response into disjoint partitions.
    ///
    /// A definition reported under several statuses (same index, or same id
    /// when the index is absent) keeps only the most severe one.
    pub fn classify(response: ImportResponse) -> Self {
        let succeeded = response.succeeded.unwrap_or_default();
        let skipped = response.skipped.unwrap_or_default();
        let failed = response.failed.unwrap_or_default();

        let mut seen = HashSet::new();
        let failed = retain_unseen(failed, &mut seen, ImportStatus::Failed);
        let skipped = retain_unseen(skipped, &mut seen, ImportStatus::Skipped);
        let succeeded = retain_unseen(succeeded, &mut seen, ImportStatus::Succeeded);

        Self {
            succeeded,
            skipped,
            failed,
        }
    }

    pub fn partition(&self, status: ImportStatus) -> &[JobLoadItem] {
        match status {
            ImportStatus::Succeeded => &self.succeeded,
            ImportStatus::Skipped => &self.skipped,
            ImportStatus::Failed => &self.failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

fn retain_unseen(
    items: Vec<JobLoadItem>,
    seen: &mut HashSet<ItemKey>,
    status: ImportStatus,
) -> Vec<JobLoadItem> {
    items
        .into_iter()
        .filter(|item| {
            let Some(key) = item_key(item) else {
                return true;
            };
            let first = seen.insert(key);
            if !first {
                tracing::warn!(%status, ?item, "Dropping duplicate import entry");
            }
            first
        })
        .collect()
}
