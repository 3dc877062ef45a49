use std::path::Path;

use tracing::{debug, warn};

use crate::error::WorkflowError;
use crate::fs_utils::{read_json, read_to_string};
use crate::models::{CoordinateEntry, FilenameMapping, ResultOutcome, ResultRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRequest {
    pub filename: String,
    pub custom_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResults {
    /// In results-log order.
    pub coordinates: Vec<CoordinateEntry>,
    pub failures: Vec<FailedRequest>,
    pub malformed_lines: usize,
}

/// Reads the identifier -> filename table. A missing or unreadable table is
/// not fatal: identifiers then stand in for filenames.
pub async fn load_filename_mapping(mapping_file: &Path) -> FilenameMapping {
    match read_json::<FilenameMapping>(mapping_file).await {
        Ok(mapping) => mapping,
        Err(err) => {
            warn!(error = %err, "could not load filename mapping, using custom_id as filename");
            FilenameMapping::new()
        }
    }
}

pub async fn parse_results(
    results_file: &Path,
    mapping_file: &Path,
) -> Result<ParsedResults, WorkflowError> {
    let mapping = load_filename_mapping(mapping_file).await;
    let contents = read_to_string(results_file).await?;

    let parsed = parse_results_log(&contents, &mapping);
    debug!(
        parsed = parsed.coordinates.len(),
        failed = parsed.failures.len(),
        malformed = parsed.malformed_lines,
        "results log parsed"
    );
    Ok(parsed)
}

pub fn parse_results_log(contents: &str, mapping: &FilenameMapping) -> ParsedResults {
    let mut parsed = ParsedResults::default();

    for (line_num, line) in contents.lines().enumerate().map(|(i, line)| (i + 1, line)) {
        if line.trim().is_empty() {
            continue;
        }

        let record: ResultRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                warn!(line_num, error = %err, "error parsing line, skipping");
                parsed.malformed_lines += 1;
                continue;
            }
        };

        let filename = mapping
            .get(&record.custom_id)
            .cloned()
            .unwrap_or_else(|| record.custom_id.clone());

        match record.result {
            ResultOutcome::Message { content } => {
                let Some(text) = content.into_iter().next().map(|item| item.text) else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }
                parsed.coordinates.push(CoordinateEntry {
                    filename,
                    response: text,
                    custom_id: record.custom_id,
                });
            }
            ResultOutcome::Error { error } => {
                let message = if error.message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    error.message
                };
                warn!(file = %filename, error = %message, "inference failed for image");
                parsed.failures.push(FailedRequest {
                    filename,
                    custom_id: record.custom_id,
                    message,
                });
            }
            ResultOutcome::Unknown { .. } | ResultOutcome::Unrecognized => {}
        }
    }

    parsed
}
