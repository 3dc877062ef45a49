mod api;
mod batches;
mod models;

pub use api::{build_batch_request, convert_messages_to_anthropic};
pub use batches::{batch_results, create_batch, retrieve_batch};
