//! Conversation context handed to the generation collaborator.

use serde::{Deserialize, Serialize};

/// One prior conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// A role/content pair in the wire shape chat APIs expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

/// Everything a generator needs to produce one reply.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// System context for the bound business. Empty for general chat.
    pub system: String,
    /// Prior turns, oldest first.
    pub history: Vec<ContextEntry>,
    /// The message being answered.
    pub text: String,
}

impl GenerationContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            system: String::new(),
            history: Vec::new(),
            text: text.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_history(mut self, history: Vec<ContextEntry>) -> Self {
        self.history = history;
        self
    }

    /// Flatten into `(system, messages)` with the current text
    /// appended as the final user turn.
    pub fn to_api_messages(&self) -> (String, Vec<ApiMessage>) {
        let mut messages: Vec<ApiMessage> = self
            .history
            .iter()
            .map(|entry| ApiMessage {
                role: entry.role.clone(),
                content: entry.content.clone(),
            })
            .collect();

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.text.clone(),
        });

        (self.system.clone(), messages)
    }
}
