use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::error::WorkflowError;
use crate::fs_utils::read_to_string;

/// Shape of one results-log line, for eyeballing what the collector wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub line_num: usize,
    pub custom_id: Option<String>,
    pub result_keys: Vec<String>,
    pub raw: Value,
}

pub async fn inspect_results(
    results_file: &Path,
    num_lines: usize,
) -> Result<Vec<ResultSummary>, WorkflowError> {
    let contents = read_to_string(results_file).await?;
    let mut summaries = Vec::new();

    for (index, line) in contents.lines().take(num_lines).enumerate() {
        let line_num = index + 1;
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(line_num, error = %err, "line is not valid JSON");
                continue;
            }
        };

        let custom_id = raw
            .get("custom_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let result_keys: Vec<String> = raw
            .get("result")
            .and_then(Value::as_object)
            .map(|result| result.keys().cloned().collect())
            .unwrap_or_default();

        summaries.push(ResultSummary {
            line_num,
            custom_id,
            result_keys,
            raw,
        });
    }

    Ok(summaries)
}

impl ResultSummary {
    pub fn render(&self) -> String {
        let pretty = serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string());
        format!(
            "Result {}:\n  Custom ID: {}\n  Result keys: {:?}\n  Full result: {}\n",
            self.line_num,
            self.custom_id.as_deref().unwrap_or("N/A"),
            self.result_keys,
            pretty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summarizes_only_the_requested_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"custom_id":"geo_0_aa","result":{"type":"message","content":[]}}"#,
                "\n",
                "garbage\n",
                r#"{"custom_id":"geo_2_cc","result":{"type":"unknown","raw_result":"x"}}"#,
                "\n",
                r#"{"custom_id":"geo_3_dd","result":{}}"#,
                "\n"
            ),
        )
        .unwrap();

        let summaries = inspect_results(&path, 3).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].custom_id.as_deref(), Some("geo_0_aa"));
        let mut keys = summaries[0].result_keys.clone();
        keys.sort();
        assert_eq!(keys, vec!["content", "type"]);
        assert_eq!(summaries[1].line_num, 3);
        assert!(summaries[1].render().contains("Custom ID: geo_2_cc"));
    }
}
