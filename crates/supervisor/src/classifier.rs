//! Next-actor classification.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use harmonia_core::{hash_prompt, load_prompt_file, Brain, BrainError, CompletionRequest, Message};
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use crate::decision::AllowedLabels;

/// Default path for the supervisor prompt file.
pub const DEFAULT_SUPERVISOR_PROMPT_FILE: &str = "SUPERVISOR_PROMPT.md";

/// Placeholder replaced by the comma-separated worker labels.
pub const MEMBERS_PLACEHOLDER: &str = "{members}";

/// Default supervisor system prompt (fallback if no override is found).
pub const DEFAULT_SUPERVISOR_SYSTEM_PROMPT: &str = r#"You are a supervisor tasked with managing a conversation between the following workers: {members}.

Use chat for simple conversation, greetings and general questions.
Use chef for cooking, recipes, meal plans and nutrition.
Use trainer for exercise, workouts and training plans.
Use mental_coach for motivation, stress, sleep and mindset.

Given the conversation so far, respond with the worker to act next. Each worker will perform a task and respond with its results. When the user's latest message has been answered, respond with FINISH.

Respond with JSON only: {"next": "<worker or FINISH>"}"#;

/// Load the supervisor system prompt template.
///
/// Priority:
/// 1. `SUPERVISOR_SYSTEM_PROMPT` env var (if set)
/// 2. Contents of prompt file (`SUPERVISOR_PROMPT_FILE` or default `SUPERVISOR_PROMPT.md`)
/// 3. Embedded default prompt
pub fn load_supervisor_prompt() -> String {
    if let Ok(prompt) = env::var("SUPERVISOR_SYSTEM_PROMPT") {
        info!("Using supervisor prompt from SUPERVISOR_SYSTEM_PROMPT env var");
        return prompt;
    }

    let prompt_file = env::var("SUPERVISOR_PROMPT_FILE")
        .unwrap_or_else(|_| DEFAULT_SUPERVISOR_PROMPT_FILE.to_string());

    if let Some(prompt) = load_prompt_file(&prompt_file) {
        info!("Loaded supervisor prompt from {}", prompt_file);
        return prompt;
    }

    info!("Using embedded default supervisor prompt");
    DEFAULT_SUPERVISOR_SYSTEM_PROMPT.to_string()
}

/// Decides which actor should act next.
///
/// Implementations return the raw label they chose; the supervisor checks
/// it against `allowed` and treats anything else as a contract violation.
/// Classification must not touch the conversation.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Pick the next label for this conversation.
    async fn classify(
        &self,
        conversation: &[Message],
        allowed: &AllowedLabels,
    ) -> Result<String, BrainError>;

    /// Get a human-readable name for this classifier.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct RouteReply {
    next: String,
}

/// Classifier backed by a language model with structured output.
pub struct LlmClassifier {
    brain: Arc<dyn Brain>,
    prompt_template: String,
    prompt_hash: String,
}

impl LlmClassifier {
    /// Create a classifier using the prompt from [`load_supervisor_prompt`].
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self::with_prompt(brain, load_supervisor_prompt())
    }

    /// Create a classifier with an explicit prompt template.
    ///
    /// `{members}` in the template is replaced with the worker labels.
    pub fn with_prompt(brain: Arc<dyn Brain>, prompt_template: impl Into<String>) -> Self {
        let prompt_template = prompt_template.into();
        let prompt_hash = hash_prompt(&prompt_template);
        info!("Supervisor prompt fingerprint: {}", prompt_hash);

        Self {
            brain,
            prompt_template,
            prompt_hash,
        }
    }

    /// Get the prompt template fingerprint.
    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    /// Render the system prompt for one routing step.
    pub fn system_prompt(&self, allowed: &AllowedLabels) -> String {
        let members: Vec<&str> = allowed.actors().iter().map(|a| a.label()).collect();
        self.prompt_template
            .replace(MEMBERS_PLACEHOLDER, &members.join(", "))
    }

    /// Read the chosen label out of the model's reply.
    ///
    /// Accepts `{"next": ...}` (optionally fenced or followed by junk) or a
    /// bare single-word label. The label itself is returned untouched.
    fn parse_label(response: &str) -> Result<String, BrainError> {
        let trimmed = response.trim();

        if let Ok(reply) = serde_json::from_str::<RouteReply>(Self::extract_json(trimmed)) {
            return Ok(reply.next);
        }

        let bare = trimmed.trim_matches(|c| c == '"' || c == '\'' || c == '`');
        if !bare.is_empty() && !bare.contains(char::is_whitespace) && !bare.contains('{') {
            return Ok(bare.to_string());
        }

        Err(BrainError::ProcessingFailed(format!(
            "could not read a routing label from: {}",
            trimmed
        )))
    }

    /// Extract JSON from a response that may contain markdown or other text.
    fn extract_json(response: &str) -> &str {
        let trimmed = response.trim();

        if trimmed.starts_with('{') {
            return Self::extract_balanced_json(trimmed);
        }

        // Fenced block, with or without a language tag
        if let Some(start) = trimmed.find("```") {
            let after_backticks = &trimmed[start + 3..];
            let json_start = after_backticks.find('\n').map(|i| i + 1).unwrap_or(0);
            if let Some(end) = after_backticks[json_start..].find("```") {
                let extracted = after_backticks[json_start..json_start + end].trim();
                return Self::extract_balanced_json(extracted);
            }
        }

        if let Some(start) = trimmed.find('{') {
            return Self::extract_balanced_json(&trimmed[start..]);
        }

        trimmed
    }

    /// Extract a balanced JSON object from a string that starts with '{'.
    ///
    /// Models sometimes add trailing characters like extra braces:
    /// `{"next": "chef"}}` -> `{"next": "chef"}`
    fn extract_balanced_json(s: &str) -> &str {
        if !s.starts_with('{') {
            return s;
        }

        let mut depth = 0;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, ch) in s.char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return &s[..=i];
                    }
                }
                _ => {}
            }
        }

        s
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        conversation: &[Message],
        allowed: &AllowedLabels,
    ) -> Result<String, BrainError> {
        let request = CompletionRequest::with_system(self.system_prompt(allowed))
            .messages(conversation.iter().map(Message::to_prompt))
            .response_schema(allowed.schema());

        trace!(
            messages = conversation.len(),
            allowed = %allowed,
            "CLASSIFIER_INPUT"
        );

        let response = self.brain.complete(request).await?;
        trace!(raw_response = %response, "CLASSIFIER_RAW_RESPONSE");

        match Self::parse_label(&response) {
            Ok(label) => {
                debug!("Classifier chose: {}", label);
                Ok(label)
            }
            Err(e) => {
                warn!(error = %e, raw_response = %response, "CLASSIFIER_PARSE_FAILED");
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "LlmClassifier"
    }
}
