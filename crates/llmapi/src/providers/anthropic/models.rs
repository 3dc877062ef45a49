use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicMessageBatch {
    pub id: String,
    pub processing_status: String,
    #[serde(default)]
    pub request_counts: AnthropicRequestCounts,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnthropicRequestCounts {
    pub processing: u64,
    pub succeeded: u64,
    pub errored: u64,
    pub canceled: u64,
    pub expired: u64,
}

/// One line of the results JSONL stream. `result` stays untyped until it is
/// classified, so unexpected result shapes survive as raw text.
#[derive(Debug, Deserialize)]
pub struct AnthropicBatchResultLine {
    pub custom_id: String,
    #[serde(default)]
    pub result: Value,
}
