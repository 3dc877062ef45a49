use llmapi::{BatchRequest, BatchResult, LLMClient, MessageBatch};
use reqwest::Client;

use crate::error::BatchServiceError;

/// The remote batch system: submit a group of requests, poll one job, fetch its outcomes.
#[async_trait::async_trait]
pub trait BatchService: Send + Sync {
    async fn create(&self, requests: &[BatchRequest]) -> Result<MessageBatch, BatchServiceError>;

    async fn retrieve(&self, batch_id: &str) -> Result<MessageBatch, BatchServiceError>;

    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResult>, BatchServiceError>;
}

pub struct AnthropicBatchService {
    http_client: Client,
    client: LLMClient,
}

impl AnthropicBatchService {
    pub fn new(client: LLMClient) -> Self {
        Self {
            http_client: Client::new(),
            client,
        }
    }

    pub fn client(&self) -> &LLMClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl BatchService for AnthropicBatchService {
    async fn create(&self, requests: &[BatchRequest]) -> Result<MessageBatch, BatchServiceError> {
        llmapi::create_batch(&self.http_client, &self.client, requests)
            .await
            .map_err(|err| BatchServiceError::Create(format!("{err:#}")))
    }

    async fn retrieve(&self, batch_id: &str) -> Result<MessageBatch, BatchServiceError> {
        llmapi::retrieve_batch(&self.http_client, &self.client, batch_id)
            .await
            .map_err(|err| BatchServiceError::Retrieve {
                batch_id: batch_id.to_string(),
                reason: format!("{err:#}"),
            })
    }

    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResult>, BatchServiceError> {
        llmapi::batch_results(&self.http_client, &self.client, batch_id)
            .await
            .map_err(|err| BatchServiceError::Results {
                batch_id: batch_id.to_string(),
                reason: format!("{err:#}"),
            })
    }
}
