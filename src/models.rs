use std::collections::BTreeMap;

use llmapi::{BatchOutcome, BatchResult};
use serde::{Deserialize, Serialize};

/// Generated request identifier -> original file name.
pub type FilenameMapping = BTreeMap<String, String>;

/// One submitted chunk, as persisted in the job manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTrackingRecord {
    pub batch_id: String,
    pub chunk_num: usize,
    pub request_count: usize,
    pub start_index: usize,
    pub end_index: usize,
}

/// One line of the results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub custom_id: String,
    #[serde(default)]
    pub result: ResultOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultOutcome {
    Message {
        #[serde(default)]
        content: Vec<TextContent>,
    },
    Error {
        #[serde(default)]
        error: ErrorDetail,
    },
    Unknown {
        #[serde(default)]
        raw_result: String,
    },
    /// Any other `type`, or no `result` at all. Never written by the collector.
    #[default]
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type", default = "text_kind")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl TextContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: text_kind(),
            text: text.into(),
        }
    }
}

fn text_kind() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl From<BatchResult> for ResultRecord {
    fn from(value: BatchResult) -> Self {
        let result = match value.outcome {
            BatchOutcome::Message { texts } => ResultOutcome::Message {
                content: texts.into_iter().map(TextContent::text).collect(),
            },
            BatchOutcome::Error { kind, message } => ResultOutcome::Error {
                error: ErrorDetail { kind, message },
            },
            BatchOutcome::Unknown { raw } => ResultOutcome::Unknown { raw_result: raw },
        };

        Self {
            custom_id: value.custom_id,
            result,
        }
    }
}

/// A model response joined back to the image it was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateEntry {
    pub filename: String,
    pub response: String,
    pub custom_id: String,
}
