//! Content negotiation and byte streaming for exported definitions.

use super::job::TransferFormat;
use super::service::RawBody;
use crate::error::JobsError;
use crate::output::Output;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const YAML_MEDIA_TYPES: &[&str] = &[
    "application/yaml",
    "text/yaml",
    "application/x-yaml",
    "text/x-yaml",
];
const XML_MEDIA_TYPES: &[&str] = &["application/xml", "text/xml"];

/// Media type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a body declared as `content_type` carries the requested format.
///
/// YAML must be declared as a YAML media type; anything else, including no
/// explicit format, must be declared as XML.
pub fn accepts(requested: Option<TransferFormat>, content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let media = essence(content_type);
    let family = match requested {
        Some(TransferFormat::Yaml) => YAML_MEDIA_TYPES,
        Some(TransferFormat::Xml) | None => XML_MEDIA_TYPES,
    };
    family.contains(&media.as_str())
}

pub fn ensure_compatible(
    requested: Option<TransferFormat>,
    content_type: Option<&str>,
) -> Result<(), JobsError> {
    if accepts(requested, content_type) {
        return Ok(());
    }
    Err(JobsError::UnexpectedContentType {
        requested: requested.unwrap_or_default(),
        content_type: content_type.unwrap_or("<none>").to_string(),
    })
}

/// Where exported bytes go. A file named `-` means standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn from_path(path: &Path) -> Self {
        if path.file_name().is_some_and(|name| name == "-") {
            Destination::Stdout
        } else {
            Destination::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("stdout"),
            Destination::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Copies the body verbatim to `destination`, returning the byte count.
///
/// Files are truncated first. The handle is closed on every exit path.
pub async fn write_body<O: Output + ?Sized>(
    body: &mut RawBody,
    destination: &Destination,
    output: &mut O,
) -> Result<u64> {
    match destination {
        Destination::Stdout => {
            let mut total = 0u64;
            while let Some(chunk) = body.chunk().await? {
                output
                    .raw(&chunk)
                    .context("Failed to write export to stdout")?;
                total += chunk.len() as u64;
            }
            Ok(total)
        }
        Destination::File(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut total = 0u64;
            while let Some(chunk) = body.chunk().await? {
                file.write_all(&chunk)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                total += chunk.len() as u64;
            }
            file.flush()
                .await
                .with_context(|| format!("Failed to flush {}", path.display()))?;
            Ok(total)
        }
    }
}
