pub mod providers;
pub mod types;
pub mod utils;

pub use providers::anthropic::{batch_results, build_batch_request, create_batch, retrieve_batch};
pub use types::{
    BatchOutcome, BatchRequest, BatchResult, LLMClient, LLMMessage, LLMMessageType, LLMUserType,
    MessageBatch, MessageParams, ProcessingStatus, RequestCounts,
};
