//! OpenAI-compatible chat-completions generator.
//!
//! Works with OpenAI's API and any compatible endpoint. A bounded
//! call time is part of the contract: no response within the
//! configured timeout is the same failure as an error response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use usher_core::{
    config::GenerationConfig,
    context::{ApiMessage, GenerationContext},
    error::UsherError,
    traits::Generator,
};

/// OpenAI-compatible generator.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    /// Create from config values.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Build chat-API messages from context (system as a message role).
fn build_chat_messages(system: &str, api_messages: &[ApiMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(api_messages.len() + 1);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    for m in api_messages {
        messages.push(ChatMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        });
    }
    messages
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    /// End-user attribution on the provider side.
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        // Basic check: try to list models.
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }

    async fn generate(
        &self,
        context: &GenerationContext,
        user_id: &str,
    ) -> Result<String, UsherError> {
        let (system, api_messages) = context.to_api_messages();
        let messages = build_chat_messages(&system, &api_messages);
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            user: Some(user_id.to_string()),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={}", self.model);

        let request = async {
            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await
                .map_err(|e| UsherError::Generation(format!("openai request failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(UsherError::Generation(format!(
                    "openai returned {status}: {text}"
                )));
            }

            let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| {
                UsherError::Generation(format!("openai: failed to parse response: {e}"))
            })?;

            parsed
                .choices
                .as_ref()
                .and_then(|c| c.first())
                .and_then(|c| c.message.as_ref())
                .map(|m| m.content.trim().to_string())
                .ok_or_else(|| UsherError::Generation("openai: empty response".to_string()))
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(UsherError::Generation(format!(
                "openai: no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GenerationConfig {
        GenerationConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn generator_name_and_configured() {
        let generator = OpenAiGenerator::from_config(&test_config());
        assert_eq!(generator.name(), "openai");
        assert!(generator.is_configured());

        let mut config = test_config();
        config.api_key = String::new();
        assert!(!OpenAiGenerator::from_config(&config).is_configured());
    }

    #[test]
    fn system_context_becomes_the_first_message() {
        let api_msgs = vec![
            ApiMessage {
                role: "user".into(),
                content: "Hi".into(),
            },
            ApiMessage {
                role: "assistant".into(),
                content: "Hello!".into(),
            },
        ];
        let messages = build_chat_messages("Be helpful.", &api_msgs);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "Be helpful.");
    }

    #[test]
    fn empty_system_context_is_omitted() {
        let api_msgs = vec![ApiMessage {
            role: "user".into(),
            content: "2+2?".into(),
        }];
        let messages = build_chat_messages("", &api_msgs);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
