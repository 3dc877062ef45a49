use std::time::Duration;

use llmapi::BatchRequest;
use tracing::{error, info};

use crate::batch_service::BatchService;
use crate::constants::MAX_CUSTOM_ID_LEN;
use crate::models::BatchTrackingRecord;

/// Submits `requests` as consecutive chunks of at most `chunk_size`, waiting
/// `delay` between submissions. A chunk the service rejects is logged and
/// dropped; the records returned cover only the chunks that were accepted.
pub async fn submit_batch_chunks(
    service: &dyn BatchService,
    requests: &[BatchRequest],
    chunk_size: usize,
    delay: Duration,
) -> Vec<BatchTrackingRecord> {
    let chunk_size = chunk_size.max(1);
    let total_chunks = requests.len().div_ceil(chunk_size);
    info!(
        total_requests = requests.len(),
        chunk_size, total_chunks, "splitting requests into chunks"
    );

    let mut records = Vec::with_capacity(total_chunks);

    for (chunk_index, chunk) in requests.chunks(chunk_size).enumerate() {
        if chunk_index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let chunk_num = chunk_index + 1;
        let start_index = chunk_index * chunk_size;
        info!(
            chunk_num,
            total_chunks,
            requests = chunk.len(),
            max_custom_id_len = longest_custom_id(chunk),
            "submitting chunk"
        );

        match service.create(chunk).await {
            Ok(batch) => {
                info!(
                    chunk_num,
                    batch_id = %batch.id,
                    status = %batch.processing_status,
                    "chunk submitted"
                );
                records.push(BatchTrackingRecord {
                    batch_id: batch.id,
                    chunk_num,
                    request_count: chunk.len(),
                    start_index,
                    end_index: start_index + chunk.len() - 1,
                });
            }
            Err(err) => {
                error!(chunk_num, error = %err, "error creating chunk, skipping");
            }
        }
    }

    records
}

pub fn longest_custom_id(requests: &[BatchRequest]) -> usize {
    requests
        .iter()
        .map(|request| request.custom_id.len())
        .max()
        .unwrap_or(0)
}

/// Identifiers the batch API would reject for length.
pub fn oversized_custom_ids(requests: &[BatchRequest]) -> Vec<&str> {
    requests
        .iter()
        .map(|request| request.custom_id.as_str())
        .filter(|id| id.len() > MAX_CUSTOM_ID_LEN)
        .collect()
}
