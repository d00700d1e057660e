//! # Domain Types
//!
//! Data structures shared by the tool gateway and the orchestration loop:
//! tool descriptors, tool calls and their results, and conversation entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Argument mapping of a single tool call.
pub type Arguments = Map<String, Value>;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParamType::String),
            "boolean" => Some(ParamType::Boolean),
            _ => None,
        }
    }

    /// Whether `value` has this JSON type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

/// One entry of a tool's parameter schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub required: bool,
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: Some(description.to_string()),
        }
    }

    pub fn optional(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Name, description and parameter schema of one tool.
///
/// The full set advertised by a gateway is the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    /// JSON-schema shaped parameter spec: `{type, properties, required}`.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for param in &self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::from(param.kind.as_str()));
            if let Some(desc) = &param.description {
                prop.insert("description".into(), Value::from(desc.as_str()));
            }
            properties.insert(param.name.clone(), Value::Object(prop));
        }
        let required: Vec<Value> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| Value::from(p.name.as_str()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), Value::from("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), Value::Array(required));
        schema
    }

    /// Rebuilds a descriptor from an advertised JSON schema.
    /// Properties with a type this gateway does not know are treated as strings.
    pub fn from_schema(name: &str, description: &str, schema: &Map<String, Value>) -> Self {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let params = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| {
                props
                    .iter()
                    .map(|(param_name, prop)| ParamSpec {
                        name: param_name.clone(),
                        kind: prop
                            .get("type")
                            .and_then(|t| t.as_str())
                            .and_then(ParamType::from_str)
                            .unwrap_or(ParamType::String),
                        required: required.contains(&param_name.as_str()),
                        description: prop
                            .get("description")
                            .and_then(|d| d.as_str())
                            .map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Correlates the request with its result message.
    pub id: String,
    pub name: String,
    pub arguments: Arguments,
}

/// Outcome of one tool invocation. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallResult {
    Success(String),
    Failure(String),
}

impl ToolCallResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ToolCallResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolCallResult::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            ToolCallResult::Success(text) | ToolCallResult::Failure(text) => text,
        }
    }

    /// Shape handed back to the model: `{"result": ..}` or `{"error": ..}`.
    pub fn to_wire(&self) -> Value {
        match self {
            ToolCallResult::Success(text) => json!({ "result": text }),
            ToolCallResult::Failure(message) => json!({ "error": message }),
        }
    }
}

/// A tool call as reported back to the caller of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Arguments,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEntry {
    User(String),
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    ToolResult {
        call_id: String,
        result: ToolCallResult,
    },
}

/// What the model returned for one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }
}

/// Result of one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub answer: String,
    pub calls: Vec<ToolInvocation>,
}
