use std::path::PathBuf;
use thiserror::Error;

/// Message returned to callers whenever the pipeline itself misbehaves.
pub const PIPELINE_FAILURE_MESSAGE: &str = "something went wrong, error log saved";

#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid selections: expected a name line and a pages line per selection, got {lines} line(s)")]
    MalformedSpec { lines: usize },

    #[error("invalid number '{token}' in {line}")]
    InvalidPageToken { token: String, line: String },

    #[error("out of bounds page {page} in {line} (document has {total} pages)")]
    PageOutOfRange { page: i64, line: String, total: u32 },

    #[error("duplicate page {page} in {line}")]
    DuplicatePage { page: u32, line: String },

    #[error("{limit} output page limit exceeded: {total}")]
    OutputLimitExceeded { total: usize, limit: usize },

    #[error("extraction pipeline failed, output saved to {}", log_path.display())]
    PipelineFailure { log_path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    /// True for errors caused by the submitted selections rather than the pipeline.
    pub fn is_validation(&self) -> bool {
        !matches!(self, JobError::PipelineFailure { .. } | JobError::Io(_))
    }

    /// The message that may be shown to an untrusted client.
    ///
    /// Validation errors carry the offending value inline. Pipeline and I/O
    /// failures collapse to a generic message so tool output and internal
    /// paths never leak.
    pub fn user_message(&self) -> String {
        match self {
            JobError::PipelineFailure { .. } => PIPELINE_FAILURE_MESSAGE.to_string(),
            JobError::Io(_) => "something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}
