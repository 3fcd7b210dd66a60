use serde::{Deserialize, Serialize};

/// Transports accept at most this many reply buttons per message.
pub const MAX_BUTTONS: usize = 3;

/// A classified inbound webhook event.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    /// Delivery/read receipt. Acknowledged and dropped without touching state.
    StatusUpdate { status: String },
    /// A button or list selection.
    Interactive(InteractiveResponse),
    /// An ordinary user text message.
    Text(TextMessage),
}

/// Which interactive element produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveKind {
    Button,
    List,
}

/// A button or list reply extracted from an interactive payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveResponse {
    pub kind: InteractiveKind,
    /// Selection identifier chosen by whoever built the buttons/list.
    pub id: String,
    /// Human-readable label of the selected element.
    pub title: String,
    /// Sender identifier, transport prefix and all.
    pub from: String,
}

/// A user text message extracted from a webhook payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessage {
    /// Provider message id, or a synthesized UUID when the payload
    /// carried none (such messages cannot be deduplicated).
    pub id: String,
    /// Sender identifier, transport prefix and all.
    pub from: String,
    /// Recipient identifier when present.
    pub to: Option<String>,
    /// Message body; empty when the payload carried none.
    pub body: String,
    /// True when the payload had no body field at all. Some transports
    /// send body-less events that are not status updates.
    pub body_missing: bool,
}

/// Conversation role of a stored turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// An interactive reply button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

impl Button {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
