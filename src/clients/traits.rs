use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("http error: {0}")]
    Http(String),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("image error: {0}")]
    Image(String),
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.to_string())
    }
}

/// Inference capability shared by the model under test and the judge.
///
/// Returns completions in backend order; an empty vector is a valid
/// answer and means the backend produced nothing usable.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn infer(
        &self,
        prompt: &str,
        image: Option<&Path>,
        max_new_tokens: Option<u32>,
    ) -> Result<Vec<String>, ModelError>;

    /// Short identifier used in logs and reports
    fn name(&self) -> &str;
}
