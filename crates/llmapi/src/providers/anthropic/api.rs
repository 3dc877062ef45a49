use serde_json::{Value, json};

use crate::types::{BatchRequest, LLMClient, LLMMessage, LLMMessageType, LLMUserType, MessageParams};
use crate::utils::detect_mime_type;

pub fn build_batch_request(
    client: &LLMClient,
    custom_id: impl Into<String>,
    messages: Vec<LLMMessage>,
) -> BatchRequest {
    let (anthropic_messages, system) = convert_messages_to_anthropic(messages);

    BatchRequest {
        custom_id: custom_id.into(),
        params: MessageParams {
            model: client.default_model().to_string(),
            max_tokens: client.max_tokens(),
            messages: anthropic_messages,
            system,
        },
    }
}

pub fn convert_messages_to_anthropic(messages: Vec<LLMMessage>) -> (Vec<Value>, Option<String>) {
    let mut system_segments = Vec::new();
    let mut converted = Vec::new();

    for message in messages {
        match message.role {
            LLMUserType::System => {
                let text = extract_text_from_message_content(message.content);
                if !text.is_empty() {
                    system_segments.push(text);
                }
            }
            role => {
                let role_str = match role {
                    LLMUserType::Human => "user",
                    LLMUserType::AI => "assistant",
                    LLMUserType::System => unreachable!("Handled above"),
                };

                let content = convert_message_content_to_anthropic(message.content);
                converted.push(json!({
                    "role": role_str,
                    "content": content
                }));
            }
        }
    }

    let system_prompt = if system_segments.is_empty() {
        None
    } else {
        Some(system_segments.join("\n"))
    };

    (converted, system_prompt)
}

fn extract_text_from_message_content(content: Vec<LLMMessageType>) -> String {
    let mut texts = Vec::new();
    for item in content {
        if let LLMMessageType::TEXT(text) = item {
            texts.push(text);
        }
    }
    texts.join("\n")
}

fn convert_message_content_to_anthropic(content: Vec<LLMMessageType>) -> Vec<Value> {
    let mut parts = Vec::new();

    for item in content {
        match item {
            LLMMessageType::TEXT(text) => parts.push(json!({
                "type": "text",
                "text": text
            })),
            LLMMessageType::IMAGE {
                data_b64,
                file_path,
            } => {
                let mime = file_path
                    .as_deref()
                    .map(detect_mime_type)
                    .unwrap_or_else(|| "image/png".to_string());
                parts.push(json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": mime,
                        "data": data_b64
                    }
                }));
            }
        }
    }

    if parts.is_empty() {
        parts.push(json!({
            "type": "text",
            "text": ""
        }));
    }

    parts
}
