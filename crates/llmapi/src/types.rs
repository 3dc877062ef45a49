use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::utils;

#[derive(Clone, Debug)]
pub enum LLMMessageType {
    TEXT(String),
    IMAGE {
        data_b64: String,
        file_path: Option<String>,
    },
}
impl LLMMessageType {
    pub fn text(text: impl Into<String>) -> Self {
        LLMMessageType::TEXT(text.into())
    }
    /// Image content whose media type is detected from `file_name` when the request is built.
    pub fn image_named(data_b64: impl Into<String>, file_name: impl Into<String>) -> Self {
        LLMMessageType::IMAGE {
            data_b64: data_b64.into(),
            file_path: Some(file_name.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LLMUserType {
    Human,
    AI,
    System,
}
impl LLMUserType {
    pub fn from_str(role_str: &str) -> Option<Self> {
        match role_str.trim().to_lowercase().as_str() {
            "user" | "human" => Some(LLMUserType::Human),
            "model" | "ai" | "assistant" => Some(LLMUserType::AI),
            "system" => Some(LLMUserType::System),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LLMMessage {
    pub id: String,
    pub role: LLMUserType,
    pub content: Vec<LLMMessageType>,
    pub created_at: i64,
}

impl LLMMessage {
    pub fn new(id: Option<String>, role: &str, content: Vec<LLMMessageType>) -> Self {
        let id = id.unwrap_or_else(|| utils::current_timestamp_millis().to_string());
        Self {
            id,
            role: LLMUserType::from_str(role).unwrap_or(LLMUserType::Human),
            content,
            created_at: utils::current_timestamp_millis() as i64,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LLMClient {
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
    pub(crate) default_model: String,
    pub(crate) max_tokens: u32,
}

impl LLMClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_model.into(),
            max_tokens,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// One entry of a message batch: the caller's correlation id plus the Messages API parameters.
#[derive(Clone, Debug, Serialize)]
pub struct BatchRequest {
    pub custom_id: String,
    pub params: MessageParams,
}

#[derive(Clone, Debug, Serialize)]
pub struct MessageParams {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessingStatus {
    InProgress,
    Canceling,
    Ended,
    Other(String),
}

impl ProcessingStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "in_progress" => ProcessingStatus::InProgress,
            "canceling" => ProcessingStatus::Canceling,
            "ended" => ProcessingStatus::Ended,
            other => ProcessingStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Ended)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::InProgress => f.write_str("in_progress"),
            ProcessingStatus::Canceling => f.write_str("canceling"),
            ProcessingStatus::Ended => f.write_str("ended"),
            ProcessingStatus::Other(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub processing: u64,
    pub succeeded: u64,
    pub errored: u64,
    pub canceled: u64,
    pub expired: u64,
}

impl RequestCounts {
    /// Requests that finished without a message.
    pub fn failed(&self) -> u64 {
        self.errored + self.canceled + self.expired
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBatch {
    pub id: String,
    pub processing_status: ProcessingStatus,
    pub request_counts: RequestCounts,
}

/// Per-request outcome, decided once when the results stream is decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    Message { texts: Vec<String> },
    Error { kind: String, message: String },
    Unknown { raw: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchResult {
    pub custom_id: String,
    pub outcome: BatchOutcome,
}
