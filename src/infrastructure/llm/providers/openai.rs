//! OpenAI-compatible chat-completions with function calling

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Provider, ProviderConfig};
use crate::domain::error::LlmError;
use crate::domain::types::{ConversationEntry, ModelReply, ToolCallRequest, ToolDescriptor};

/// OpenAI API request format
#[derive(Debug, Serialize)]
pub(crate) struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAIToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Map<String, Value>,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

fn function_kind() -> String {
    "function".to_string()
}

impl OpenAIMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

fn to_message(entry: &ConversationEntry) -> OpenAIMessage {
    match entry {
        ConversationEntry::User(text) => OpenAIMessage::text("user", text.as_str()),
        ConversationEntry::Assistant { text, tool_calls } => OpenAIMessage {
            role: "assistant".to_string(),
            content: text.clone(),
            tool_calls: tool_calls
                .iter()
                .map(|call| OpenAIToolCall {
                    id: call.id.clone(),
                    kind: function_kind(),
                    function: OpenAIFunctionCall {
                        name: call.name.clone(),
                        arguments: Value::Object(call.arguments.clone()).to_string(),
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        ConversationEntry::ToolResult { call_id, result } => OpenAIMessage {
            tool_call_id: Some(call_id.clone()),
            ..OpenAIMessage::text("tool", result.to_wire().to_string())
        },
    }
}

fn to_tool(descriptor: &ToolDescriptor) -> OpenAITool {
    OpenAITool {
        kind: "function",
        function: OpenAIFunction {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            parameters: descriptor.input_schema(),
        },
    }
}

/// Tools and `tool_choice` are sent only when a catalog is given.
pub(crate) fn build_request(
    config: &ProviderConfig,
    history: &[ConversationEntry],
    tools: Option<&[ToolDescriptor]>,
) -> OpenAIRequest {
    let tools: Option<Vec<OpenAITool>> = tools
        .filter(|t| !t.is_empty())
        .map(|t| t.iter().map(to_tool).collect());
    OpenAIRequest {
        model: config.model.clone(),
        messages: history.iter().map(to_message).collect(),
        tool_choice: tools.as_ref().map(|_| "auto"),
        tools,
        temperature: config.temperature,
    }
}

/// Turn the first choice's message into a `ModelReply`.
/// Tool call arguments that do not decode to a JSON object are a protocol error.
pub(crate) fn parse_reply(provider: Provider, message: OpenAIMessage) -> Result<ModelReply, LlmError> {
    let mut calls = Vec::with_capacity(message.tool_calls.len());
    for call in message.tool_calls {
        let raw = call.function.arguments.trim();
        let arguments = if raw.is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    return Err(LlmError::new(
                        provider.as_str(),
                        format!(
                            "Malformed arguments for tool call '{}': {raw}",
                            call.function.name
                        ),
                    ));
                }
            }
        };
        calls.push(ToolCallRequest {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    Ok(ModelReply {
        text: message.content.filter(|c| !c.is_empty()),
        tool_calls: calls,
    })
}

/// Execute a chat request using an OpenAI-compatible API
pub async fn chat(
    http: &Client,
    provider: Provider,
    config: &ProviderConfig,
    history: &[ConversationEntry],
    tools: Option<&[ToolDescriptor]>,
) -> Result<ModelReply, LlmError> {
    let name = provider.as_str();
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    let request = build_request(config, history, tools);

    let mut request_builder = http
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&request);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| LlmError::new(name, format!("HTTP request failed: {e}")))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        if let Ok(error_json) = serde_json::from_str::<Value>(&error_text)
            && let Some(error_msg) = error_json
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        {
            return Err(LlmError::new(name, error_msg));
        }

        return Err(LlmError::new(name, format!("HTTP {status}: {error_text}")));
    }

    let parsed: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| LlmError::new(name, format!("Failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::new(name, "No choices in response"))?;

    parse_reply(provider, choice.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ParamSpec, ParamType, ToolCallResult};
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: "sk-test".into(),
            base_url: Provider::OpenAI.default_base_url().into(),
            model: "gpt-4o".into(),
            timeout: None,
            temperature: None,
        }
    }

    fn catalog() -> Vec<ToolDescriptor> {
        vec![ToolDescriptor {
            name: "read_file".into(),
            description: "Read a file".into(),
            params: vec![ParamSpec::required("path", ParamType::String, "Path")],
        }]
    }

    fn history() -> Vec<ConversationEntry> {
        let mut arguments = Map::new();
        arguments.insert("path".into(), json!("hello.txt"));
        vec![
            ConversationEntry::User("read hello.txt".into()),
            ConversationEntry::Assistant {
                text: None,
                tool_calls: vec![ToolCallRequest {
                    id: "call_1".into(),
                    name: "read_file".into(),
                    arguments,
                }],
            },
            ConversationEntry::ToolResult {
                call_id: "call_1".into(),
                result: ToolCallResult::Success("hi".into()),
            },
        ]
    }

    #[test]
    fn test_first_request_carries_tools() {
        let tools = catalog();
        let body = serde_json::to_value(build_request(&config(), &history()[..1], Some(&tools)))
            .unwrap();
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "read_file");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"],
            json!(["path"])
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_follow_up_omits_tools() {
        let body = serde_json::to_value(build_request(&config(), &history(), None)).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], Value::Null);
        assert_eq!(messages[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            messages[1]["tool_calls"][0]["function"]["arguments"],
            r#"{"path":"hello.txt"}"#
        );
        assert_eq!(messages[2]["role"], "tool");
        assert_eq!(messages[2]["tool_call_id"], "call_1");
        assert_eq!(messages[2]["content"], r#"{"result":"hi"}"#);
    }

    #[test]
    fn test_parse_tool_calls() {
        let message: OpenAIMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_9",
                "type": "function",
                "function": { "name": "list_directory", "arguments": "{\"path\": \".\"}" }
            }]
        }))
        .unwrap();
        let reply = parse_reply(Provider::OpenAI, message).unwrap();
        assert_eq!(reply.text, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "call_9");
        assert_eq!(reply.tool_calls[0].arguments["path"], ".");
    }

    #[test]
    fn test_empty_arguments_are_an_empty_object() {
        let message: OpenAIMessage = serde_json::from_value(json!({
            "role": "assistant",
            "tool_calls": [{
                "id": "call_1",
                "function": { "name": "list_directory", "arguments": "" }
            }]
        }))
        .unwrap();
        let reply = parse_reply(Provider::OpenAI, message).unwrap();
        assert!(reply.tool_calls[0].arguments.is_empty());
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let message: OpenAIMessage = serde_json::from_value(json!({
            "role": "assistant",
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "read_file", "arguments": "[1, 2]" }
            }]
        }))
        .unwrap();
        let err = parse_reply(Provider::Groq, message).unwrap_err();
        assert_eq!(err.provider, "groq");
        assert!(err.message.contains("read_file"));
    }

    #[test]
    fn test_plain_text_reply() {
        let message: OpenAIMessage =
            serde_json::from_value(json!({ "role": "assistant", "content": "Done." })).unwrap();
        assert_eq!(
            parse_reply(Provider::OpenAI, message).unwrap(),
            ModelReply::text("Done.")
        );
    }
}
