#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use geobatch_lib::{BatchService, BatchServiceError};
use llmapi::{
    BatchOutcome, BatchRequest, BatchResult, LLMClient, MessageBatch, MessageParams,
    ProcessingStatus, RequestCounts,
};

pub const RESPONSE_TEXT: &str = "Latitude: 48.8584 Longitude: 2.2945";

pub fn test_client() -> LLMClient {
    LLMClient::new("test-key", "http://localhost:0/v1", "claude-test", 500)
}

pub fn request(custom_id: &str) -> BatchRequest {
    BatchRequest {
        custom_id: custom_id.to_string(),
        params: MessageParams {
            model: "claude-test".to_string(),
            max_tokens: 500,
            messages: Vec::new(),
            system: None,
        },
    }
}

pub fn requests(count: usize) -> Vec<BatchRequest> {
    (0..count).map(|i| request(&format!("req_{i}"))).collect()
}

pub fn write_images(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), format!("bytes of {name}")).unwrap();
    }
}

#[derive(Default)]
struct FakeState {
    create_calls: usize,
    submitted: HashMap<String, Vec<String>>,
    statuses: HashMap<String, ProcessingStatus>,
    results: HashMap<String, Vec<BatchResult>>,
    retrieve_calls: Vec<String>,
}

/// In-memory batch service. Every created job reports `ended` and answers
/// each request with `RESPONSE_TEXT` unless told otherwise.
#[derive(Default)]
pub struct FakeBatchService {
    state: Mutex<FakeState>,
    failing_creates: HashSet<usize>,
    failing_retrieves: HashSet<String>,
    failing_results: HashSet<String>,
}

impl FakeBatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based create calls that should fail.
    pub fn failing_create_calls(mut self, calls: &[usize]) -> Self {
        self.failing_creates.extend(calls.iter().copied());
        self
    }

    pub fn failing_retrieve(mut self, batch_id: &str) -> Self {
        self.failing_retrieves.insert(batch_id.to_string());
        self
    }

    pub fn failing_results(mut self, batch_id: &str) -> Self {
        self.failing_results.insert(batch_id.to_string());
        self
    }

    pub fn with_status(self, batch_id: &str, status: ProcessingStatus) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(batch_id.to_string(), status);
        self
    }

    pub fn with_results(self, batch_id: &str, results: Vec<BatchResult>) -> Self {
        self.state
            .lock()
            .unwrap()
            .results
            .insert(batch_id.to_string(), results);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn submitted_ids(&self, batch_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .submitted
            .get(batch_id)
            .cloned()
            .unwrap_or_default()
    }

    fn counts_for(state: &FakeState, batch_id: &str, status: &ProcessingStatus) -> RequestCounts {
        let total = state
            .submitted
            .get(batch_id)
            .map(Vec::len)
            .or_else(|| state.results.get(batch_id).map(Vec::len))
            .unwrap_or(0) as u64;

        if status.is_terminal() {
            RequestCounts {
                succeeded: total,
                ..RequestCounts::default()
            }
        } else {
            RequestCounts {
                processing: total,
                ..RequestCounts::default()
            }
        }
    }
}

#[async_trait::async_trait]
impl BatchService for FakeBatchService {
    async fn create(&self, requests: &[BatchRequest]) -> Result<MessageBatch, BatchServiceError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if self.failing_creates.contains(&state.create_calls) {
            return Err(BatchServiceError::Create("payload too large".to_string()));
        }

        let batch_id = format!("msgbatch_{:02}", state.create_calls);
        state.submitted.insert(
            batch_id.clone(),
            requests.iter().map(|r| r.custom_id.clone()).collect(),
        );

        Ok(MessageBatch {
            id: batch_id,
            processing_status: ProcessingStatus::InProgress,
            request_counts: RequestCounts {
                processing: requests.len() as u64,
                ..RequestCounts::default()
            },
        })
    }

    async fn retrieve(&self, batch_id: &str) -> Result<MessageBatch, BatchServiceError> {
        let mut state = self.state.lock().unwrap();
        state.retrieve_calls.push(batch_id.to_string());
        if self.failing_retrieves.contains(batch_id) {
            return Err(BatchServiceError::Retrieve {
                batch_id: batch_id.to_string(),
                reason: "connection reset".to_string(),
            });
        }

        let status = state
            .statuses
            .get(batch_id)
            .cloned()
            .unwrap_or(ProcessingStatus::Ended);
        let request_counts = Self::counts_for(&state, batch_id, &status);

        Ok(MessageBatch {
            id: batch_id.to_string(),
            processing_status: status,
            request_counts,
        })
    }

    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResult>, BatchServiceError> {
        if self.failing_results.contains(batch_id) {
            return Err(BatchServiceError::Results {
                batch_id: batch_id.to_string(),
                reason: "stream interrupted".to_string(),
            });
        }

        let state = self.state.lock().unwrap();
        if let Some(results) = state.results.get(batch_id) {
            return Ok(results.clone());
        }

        Ok(state
            .submitted
            .get(batch_id)
            .map(|ids| {
                ids.iter()
                    .map(|id| BatchResult {
                        custom_id: id.clone(),
                        outcome: BatchOutcome::Message {
                            texts: vec![RESPONSE_TEXT.to_string()],
                        },
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
