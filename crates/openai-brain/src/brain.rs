//! OpenAiBrain implementation using the chat-completions API.

use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, FunctionTool, ResponseFormat,
};
use crate::config::OpenAiBrainConfig;

/// A brain that calls an OpenAI-compatible chat-completions endpoint.
///
/// The brain is stateless: callers send the whole conversation each time.
pub struct OpenAiBrain {
    client: Client,
    config: OpenAiBrainConfig,
}

impl OpenAiBrain {
    /// Create a new OpenAiBrain with the given configuration.
    pub fn new(config: OpenAiBrainConfig) -> Result<Self, BrainError> {
        if config.api_key.trim().is_empty() {
            return Err(BrainError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| {
                BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!("OpenAiBrain initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create an OpenAiBrain from environment variables.
    ///
    /// See [`OpenAiBrainConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(OpenAiBrainConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiBrainConfig {
        &self.config
    }

    /// Translate a completion request into the wire request.
    fn build_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.into_iter().map(FunctionTool::from).collect())
        };

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: request.messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: request.response_schema.map(ResponseFormat::from),
            tools,
        }
    }

    /// Make a chat completion request to the API.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BrainError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url.trim_end_matches('/'));

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            structured = request.response_format.is_some(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(BrainError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }
}

/// Pull the generated text out of a completion.
fn extract_content(completion: ChatCompletionResponse) -> Result<String, BrainError> {
    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| BrainError::ProcessingFailed("response had no choices".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Err(BrainError::ProcessingFailed(format!("model refused: {}", refusal)));
    }

    message
        .content
        .ok_or_else(|| BrainError::ProcessingFailed("response had no content".to_string()))
}

#[async_trait]
impl Brain for OpenAiBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        let completion = self.chat_completion(self.build_request(request)).await?;

        debug!(
            id = %completion.id,
            model = %completion.model,
            finish_reason = ?completion.choices.first().and_then(|c| c.finish_reason.as_deref()),
            "Received chat completion"
        );

        // Log usage if available
        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        extract_content(completion)
    }

    fn name(&self) -> &str {
        "OpenAiBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia_core::{PromptMessage, ResponseSchema, ToolSpec};
    use serde_json::json;

    fn brain() -> OpenAiBrain {
        let config = OpenAiBrainConfig::builder()
            .api_key("test-key")
            .model("gpt-test")
            .build();
        OpenAiBrain::new(config).unwrap()
    }

    fn completion(body: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let result = OpenAiBrain::new(OpenAiBrainConfig::default());
        assert!(matches!(result, Err(BrainError::Configuration(_))));
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(brain().name(), "OpenAiBrain");
    }

    #[test]
    fn test_build_plain_request() {
        let request = CompletionRequest::with_system("be nice").message(PromptMessage::user("hi"));
        let wire = serde_json::to_value(brain().build_request(request)).unwrap();

        assert_eq!(wire["model"], "gpt-test");
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["content"], "hi");
        assert!(wire.get("response_format").is_none());
        assert!(wire.get("tools").is_none());
    }

    #[test]
    fn test_build_structured_request_with_tools() {
        let request = CompletionRequest::default()
            .message(PromptMessage::user("route me"))
            .response_schema(ResponseSchema {
                name: "route".to_string(),
                schema: json!({"type": "object"}),
            })
            .tools(vec![ToolSpec {
                name: "lookup_recipe".to_string(),
                description: "Find a recipe".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            }]);
        let wire = serde_json::to_value(brain().build_request(request)).unwrap();

        assert_eq!(wire["response_format"]["json_schema"]["name"], "route");
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "lookup_recipe");
    }

    #[test]
    fn test_extract_content() {
        let ok = completion(json!({
            "choices": [{"message": {"content": "hello"}, "finish_reason": "stop"}]
        }));
        assert_eq!(extract_content(ok).unwrap(), "hello");

        let empty = completion(json!({"choices": []}));
        assert!(extract_content(empty).is_err());

        let refused = completion(json!({
            "choices": [{"message": {"content": null, "refusal": "no"}, "finish_reason": "stop"}]
        }));
        let err = extract_content(refused).unwrap_err();
        assert!(err.to_string().contains("model refused"));
    }
}
