use thiserror::Error;

/// Per-job errors raised inside the processing pipeline.
///
/// Every variant converges to the same log-and-continue policy at the queue
/// consumer boundary; the variants exist so skipped jobs are distinguishable
/// in logs by failure class.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extract error: {0}")]
    Extract(String),

    #[error("directory lookup error: {0}")]
    Directory(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("send error: {0}")]
    Send(#[from] reqwest::Error),
}

impl PipelineError {
    /// Stable classification label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Extract(_) => "extract",
            PipelineError::Directory(_) => "directory",
            PipelineError::Store(_) => "store",
            PipelineError::Send(_) => "send",
        }
    }
}
