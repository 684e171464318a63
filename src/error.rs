use crate::core::job::TransferFormat;

/// Failures that callers classify rather than just report.
///
/// Everything else (transport failures, file I/O) travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, thiserror::Error)]
pub enum JobsError {
    /// Bad or missing flags, unreadable files, invalid selection combinations.
    /// Always raised before any remote call is made.
    #[error("{0}")]
    Input(String),

    /// The service answered with a body whose media type does not match the
    /// requested transfer format.
    #[error("Unexpected response format: {content_type} (requested {requested})")]
    UnexpectedContentType {
        requested: TransferFormat,
        content_type: String,
    },

    /// Non-success HTTP status from the job service.
    #[error("Job service returned {status}: {message}")]
    Service { status: u16, message: String },
}

impl JobsError {
    pub fn input(message: impl Into<String>) -> Self {
        JobsError::Input(message.into())
    }
}

/// Returns the input error in `err`'s chain, if any.
pub fn as_input_error(err: &anyhow::Error) -> Option<&str> {
    err.chain().find_map(|cause| match cause.downcast_ref::<JobsError>() {
        Some(JobsError::Input(message)) => Some(message.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn input_error_is_found_through_context() {
        let err = Err::<(), _>(JobsError::input("-f is required"))
            .context("loading jobs")
            .unwrap_err();
        assert_eq!(as_input_error(&err), Some("-f is required"));
    }

    #[test]
    fn service_error_is_not_an_input_error() {
        let err = anyhow::Error::new(JobsError::Service {
            status: 404,
            message: "Job not found".to_string(),
        });
        assert_eq!(as_input_error(&err), None);
        assert_eq!(err.to_string(), "Job service returned 404: Job not found");
    }
}
