use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};

use crate::types::{
    BatchOutcome, BatchRequest, BatchResult, LLMClient, MessageBatch, ProcessingStatus,
    RequestCounts,
};

use super::models::{AnthropicBatchResultLine, AnthropicMessageBatch, AnthropicResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub async fn create_batch(
    http_client: &Client,
    client: &LLMClient,
    requests: &[BatchRequest],
) -> Result<MessageBatch> {
    let url = batches_url(client);
    let payload = json!({ "requests": requests });

    let response_text = with_anthropic_headers(http_client.post(url), client)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .context("Anthropic batch create request failed")?
        .error_for_status()
        .context("Anthropic batch create returned non-success status")?
        .text()
        .await
        .context("Failed to read Anthropic batch create response body")?;

    decode_message_batch(&response_text)
}

pub async fn retrieve_batch(
    http_client: &Client,
    client: &LLMClient,
    batch_id: &str,
) -> Result<MessageBatch> {
    let url = format!("{}/{}", batches_url(client), batch_id);

    let response_text = with_anthropic_headers(http_client.get(url), client)
        .send()
        .await
        .with_context(|| format!("Anthropic batch retrieve request failed for {batch_id}"))?
        .error_for_status()
        .with_context(|| format!("Anthropic batch retrieve returned non-success status for {batch_id}"))?
        .text()
        .await
        .context("Failed to read Anthropic batch retrieve response body")?;

    decode_message_batch(&response_text)
}

pub async fn batch_results(
    http_client: &Client,
    client: &LLMClient,
    batch_id: &str,
) -> Result<Vec<BatchResult>> {
    let url = format!("{}/{}/results", batches_url(client), batch_id);

    let body = with_anthropic_headers(http_client.get(url), client)
        .send()
        .await
        .with_context(|| format!("Anthropic batch results request failed for {batch_id}"))?
        .error_for_status()
        .with_context(|| format!("Anthropic batch results returned non-success status for {batch_id}"))?
        .text()
        .await
        .context("Failed to read Anthropic batch results body")?;

    Ok(body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_result_line)
        .collect())
}

fn batches_url(client: &LLMClient) -> String {
    format!("{}/messages/batches", client.endpoint().trim_end_matches('/'))
}

fn with_anthropic_headers(builder: RequestBuilder, client: &LLMClient) -> RequestBuilder {
    builder
        .header("x-api-key", client.api_key())
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("accept", "application/json")
}

fn decode_message_batch(response_text: &str) -> Result<MessageBatch> {
    let batch: AnthropicMessageBatch = serde_json::from_str(response_text)
        .with_context(|| format!("Failed to decode Anthropic batch JSON: {response_text}"))?;

    let counts = batch.request_counts;
    Ok(MessageBatch {
        id: batch.id,
        processing_status: ProcessingStatus::from_wire(&batch.processing_status),
        request_counts: RequestCounts {
            processing: counts.processing,
            succeeded: counts.succeeded,
            errored: counts.errored,
            canceled: counts.canceled,
            expired: counts.expired,
        },
    })
}

fn decode_result_line(line: &str) -> BatchResult {
    match serde_json::from_str::<AnthropicBatchResultLine>(line) {
        Ok(parsed) => BatchResult {
            custom_id: parsed.custom_id,
            outcome: classify_result(parsed.result),
        },
        // Without a custom_id there is nothing to correlate; keep the raw line.
        Err(_) => BatchResult {
            custom_id: String::new(),
            outcome: BatchOutcome::Unknown {
                raw: line.to_string(),
            },
        },
    }
}

fn classify_result(result: Value) -> BatchOutcome {
    match result.get("type").and_then(Value::as_str) {
        Some("succeeded") => {
            let message = result.get("message").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<AnthropicResponse>(message) {
                Ok(response) => BatchOutcome::Message {
                    texts: response
                        .content
                        .into_iter()
                        .filter(|part| part.kind == "text")
                        .filter_map(|part| part.text)
                        .collect(),
                },
                Err(_) => BatchOutcome::Unknown {
                    raw: result.to_string(),
                },
            }
        }
        Some("errored") => {
            // The error object wraps the API error: {"type": "error", "error": {type, message}}.
            let envelope = result.get("error");
            let detail = envelope
                .and_then(|error| error.get("error"))
                .or(envelope)
                .unwrap_or(&Value::Null);

            BatchOutcome::Error {
                kind: detail
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                message: detail
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| detail.to_string()),
            }
        }
        _ => BatchOutcome::Unknown {
            raw: result.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_line_keeps_only_text_blocks() {
        let line = r#"{"custom_id":"geo_0_aa","result":{"type":"succeeded","message":{"id":"msg_1","role":"assistant","content":[{"type":"text","text":"Latitude: 48.8584 Longitude: 2.2945"},{"type":"tool_use","id":"t"}]}}}"#;

        let result = decode_result_line(line);

        assert_eq!(result.custom_id, "geo_0_aa");
        assert_eq!(
            result.outcome,
            BatchOutcome::Message {
                texts: vec!["Latitude: 48.8584 Longitude: 2.2945".to_string()]
            }
        );
    }

    #[test]
    fn errored_line_unwraps_the_api_error() {
        let line = r#"{"custom_id":"geo_1_bb","result":{"type":"errored","error":{"type":"error","error":{"type":"invalid_request_error","message":"image too large"}}}}"#;

        let result = decode_result_line(line);

        assert_eq!(
            result.outcome,
            BatchOutcome::Error {
                kind: "invalid_request_error".to_string(),
                message: "image too large".to_string()
            }
        );
    }

    #[test]
    fn expired_line_is_unknown_with_raw_result() {
        let result = decode_result_line(r#"{"custom_id":"geo_2_cc","result":{"type":"expired"}}"#);

        assert_eq!(result.custom_id, "geo_2_cc");
        assert_eq!(
            result.outcome,
            BatchOutcome::Unknown {
                raw: r#"{"type":"expired"}"#.to_string()
            }
        );
    }

    #[test]
    fn undecodable_line_is_unknown_with_the_line_itself() {
        let result = decode_result_line("not json");

        assert_eq!(result.custom_id, "");
        assert_eq!(
            result.outcome,
            BatchOutcome::Unknown {
                raw: "not json".to_string()
            }
        );
    }
}
