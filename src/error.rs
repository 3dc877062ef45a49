use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unable to read directory {path:?}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("unable to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("unable to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("an API key is required; pass --api-key or set ANTHROPIC_API_KEY")]
    MissingApiKey,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchServiceError {
    #[error("batch creation failed: {0}")]
    Create(String),
    #[error("status query for batch {batch_id} failed: {reason}")]
    Retrieve { batch_id: String, reason: String },
    #[error("results download for batch {batch_id} failed: {reason}")]
    Results { batch_id: String, reason: String },
}
