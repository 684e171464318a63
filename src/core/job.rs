use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use strum::{AsRefStr, Display, EnumString};

/// Flat field view of a record, used by verbose output and `%field%` templates.
pub type FieldMap = BTreeMap<&'static str, String>;

/// Anything the output formatter can render.
pub trait JobView {
    /// One-line summary used by the default output mode.
    fn basic_string(&self) -> String;
    /// Full key/value view used by verbose output and custom templates.
    fn field_map(&self) -> FieldMap;
}

/// Serialization used when moving job definitions between client and server.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    AsRefStr,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransferFormat {
    #[default]
    Xml,
    Yaml,
}

impl TransferFormat {
    /// Content type declared on request bodies of this format.
    pub fn content_type(self) -> &'static str {
        match self {
            TransferFormat::Xml => "application/xml",
            TransferFormat::Yaml => "application/yaml",
        }
    }

    /// Infers the format from a definition file's extension, falling back to XML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => TransferFormat::Yaml,
            _ => TransferFormat::Xml,
        }
    }
}

/// How the service treats a loaded definition that matches an existing job.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    AsRefStr,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DuplicatePolicy {
    Skip,
    Create,
    #[default]
    Update,
}

/// Whether loaded definitions keep their unique identifiers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum UuidPolicy {
    Remove,
    #[default]
    Preserve,
}

impl UuidPolicy {
    pub fn from_remove_flag(remove_uuids: bool) -> Self {
        if remove_uuids {
            UuidPolicy::Remove
        } else {
            UuidPolicy::Preserve
        }
    }
}

/// A job definition as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}

impl JobRecord {
    /// `group/name`, or just `name` for ungrouped jobs.
    pub fn qualified_name(&self) -> String {
        qualified_name(self.group.as_deref(), &self.name)
    }
}

impl JobView for JobRecord {
    fn basic_string(&self) -> String {
        if self.project.is_empty() {
            format!("{} {}", self.id, self.qualified_name())
        } else {
            format!("{} {} ({})", self.id, self.qualified_name(), self.project)
        }
    }

    fn field_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("id", self.id.clone());
        map.insert("name", self.name.clone());
        map.insert("group", self.group.clone().unwrap_or_default());
        map.insert("project", self.project.clone());
        insert_opt(&mut map, "description", &self.description);
        insert_opt(&mut map, "href", &self.href);
        insert_opt(&mut map, "permalink", &self.permalink);
        map
    }
}

/// Detailed job record returned by the single-job info call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    #[serde(flatten)]
    pub job: JobRecord,
    #[serde(default)]
    pub scheduled: Option<bool>,
    #[serde(default)]
    pub schedule_enabled: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Milliseconds.
    #[serde(default)]
    pub average_duration: Option<u64>,
    #[serde(default)]
    pub next_scheduled_execution: Option<String>,
    #[serde(default, rename = "serverNodeUUID")]
    pub server_node_uuid: Option<String>,
}

impl JobView for JobInfo {
    fn basic_string(&self) -> String {
        self.job.basic_string()
    }

    fn field_map(&self) -> FieldMap {
        let mut map = self.job.field_map();
        insert_opt(&mut map, "scheduled", &self.scheduled);
        insert_opt(&mut map, "scheduleEnabled", &self.schedule_enabled);
        insert_opt(&mut map, "enabled", &self.enabled);
        insert_opt(&mut map, "averageDuration", &self.average_duration);
        insert_opt(
            &mut map,
            "nextScheduledExecution",
            &self.next_scheduled_execution,
        );
        insert_opt(&mut map, "serverNodeUUID", &self.server_node_uuid);
        map
    }
}

/// One entry of an import response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLoadItem {
    /// 1-based position of the definition in the submitted document.
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobView for JobLoadItem {
    fn basic_string(&self) -> String {
        let mut line = format!(
            "{} {}",
            self.id.as_deref().unwrap_or("?"),
            qualified_name(self.group.as_deref(), self.name.as_deref().unwrap_or(""))
        );
        if let Some(error) = &self.error {
            line.push_str(" : ");
            line.push_str(error);
        }
        line
    }

    fn field_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        insert_opt(&mut map, "index", &self.index);
        insert_opt(&mut map, "id", &self.id);
        insert_opt(&mut map, "name", &self.name);
        insert_opt(&mut map, "group", &self.group);
        insert_opt(&mut map, "project", &self.project);
        insert_opt(&mut map, "href", &self.href);
        insert_opt(&mut map, "permalink", &self.permalink);
        insert_opt(&mut map, "error", &self.error);
        map
    }
}

/// One entry of a bulk delete response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedJob {
    pub id: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JobView for DeletedJob {
    fn basic_string(&self) -> String {
        match (&self.error_code, &self.message) {
            (Some(code), Some(message)) => format!("* {}: [{}] {}", self.id, code, message),
            (None, Some(message)) => format!("* {}: {}", self.id, message),
            (Some(code), None) => format!("* {}: [{}]", self.id, code),
            (None, None) => format!("* {}", self.id),
        }
    }

    fn field_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("id", self.id.clone());
        insert_opt(&mut map, "errorCode", &self.error_code);
        insert_opt(&mut map, "message", &self.message);
        map
    }
}

fn qualified_name(group: Option<&str>, name: &str) -> String {
    match group.filter(|g| !g.is_empty()) {
        Some(group) => format!("{group}/{name}"),
        None => name.to_string(),
    }
}

fn insert_opt<T: ToString>(map: &mut FieldMap, key: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        map.insert(key, value.to_string());
    }
}

/// Splits `group/path/name` into its group and name parts.
///
/// The split happens at the last `/`; a blank group becomes `None`.
///
/// # Examples
///
/// ```
/// use rdjobs::core::job::split_job_name_parts;
///
/// assert_eq!(split_job_name_parts("build"), (None, "build".to_string()));
/// assert_eq!(
///     split_job_name_parts("ops/nightly/build"),
///     (Some("ops/nightly".to_string()), "build".to_string())
/// );
/// assert_eq!(split_job_name_parts("/build"), (None, "build".to_string()));
/// ```
pub fn split_job_name_parts(job: &str) -> (Option<String>, String) {
    match job.rsplit_once('/') {
        None => (None, job.to_string()),
        Some((group, name)) => {
            let group = (!group.trim().is_empty()).then(|| group.to_string());
            (group, name.to_string())
        }
    }
}
