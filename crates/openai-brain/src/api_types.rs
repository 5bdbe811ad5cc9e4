//! OpenAI API request and response types.

use harmonia_core::{PromptMessage, ResponseSchema, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured output format.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    /// Always "json_schema"
    #[serde(rename = "type")]
    pub format_type: String,
    /// Schema definition
    pub json_schema: JsonSchemaFormat,
}

/// JSON schema definition inside a response format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    /// Schema name
    pub name: String,
    /// The schema
    pub schema: Value,
    /// Enforce the schema exactly
    pub strict: bool,
}

impl From<ResponseSchema> for ResponseFormat {
    fn from(schema: ResponseSchema) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: schema.name,
                schema: schema.schema,
                strict: true,
            },
        }
    }
}

/// A function tool definition.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionTool {
    /// Always "function"
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionSpec,
}

/// Function definition.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<ToolSpec> for FunctionTool {
    fn from(tool: ToolSpec) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: tool.name,
                description: tool.description,
                parameters: tool.parameters,
            },
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<PromptMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Structured output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Tools to make available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionTool>>,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response ID
    #[serde(default)]
    pub id: String,
    /// Model used
    #[serde(default)]
    pub model: String,
    /// Response choices
    pub choices: Vec<Choice>,
    /// Token usage
    pub usage: Option<Usage>,
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Content (null when the model only called tools or refused)
    pub content: Option<String>,
    /// Refusal text, if the model declined
    #[serde(default)]
    pub refusal: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}
