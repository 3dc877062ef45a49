use std::path::Path;

use tracing::{error, info, warn};

use crate::batch_service::BatchService;
use crate::fs_utils::write_file_atomically;
use crate::models::{BatchTrackingRecord, ResultRecord};

/// Downloads the outcomes of every ended job into `output_file`, one JSON
/// record per line. Jobs still running are skipped. Nothing is written when
/// no outcome was downloaded; otherwise the file is replaced in one piece.
///
/// Returns whether a results file was written.
pub async fn download_all_results(
    service: &dyn BatchService,
    records: &[BatchTrackingRecord],
    output_file: &Path,
) -> bool {
    let mut all_results: Vec<ResultRecord> = Vec::new();

    for record in records {
        let chunk_num = record.chunk_num;
        let batch = match service.retrieve(&record.batch_id).await {
            Ok(batch) => batch,
            Err(err) => {
                error!(chunk_num, error = %err, "error downloading chunk");
                continue;
            }
        };

        if !batch.processing_status.is_terminal() {
            warn!(chunk_num, status = %batch.processing_status, "chunk not ready yet");
            continue;
        }

        match service.results(&record.batch_id).await {
            Ok(results) => {
                info!(chunk_num, count = results.len(), "downloaded chunk results");
                all_results.extend(results.into_iter().map(ResultRecord::from));
            }
            Err(err) => error!(chunk_num, error = %err, "error downloading chunk"),
        }
    }

    if all_results.is_empty() {
        warn!("no results to save");
        return false;
    }

    let contents = match encode_jsonl(&all_results) {
        Ok(contents) => contents,
        Err(err) => {
            error!(error = %err, "unable to encode results");
            return false;
        }
    };

    match write_file_atomically(output_file, &contents).await {
        Ok(()) => {
            info!(
                path = %output_file.display(),
                total = all_results.len(),
                "all results saved"
            );
            true
        }
        Err(err) => {
            error!(error = %err, "unable to save results");
            false
        }
    }
}

fn encode_jsonl(records: &[ResultRecord]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buffer, record)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}
