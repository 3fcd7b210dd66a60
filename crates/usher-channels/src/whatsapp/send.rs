//! Payload construction and failure categorization for the Cloud API.

use serde_json::{json, Value};
use usher_core::event::Button;

/// Cloud API caps button titles at 20 characters.
const MAX_BUTTON_TITLE: usize = 20;

/// Reason categories a failed send is logged under. Sends are never
/// retried automatically; recovery is the operator-triggered restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SendFailureKind {
    RateLimited,
    InvalidRecipient,
    Unauthenticated,
    RecipientOptOut,
    Other,
}

impl SendFailureKind {
    pub(super) fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate-limited",
            Self::InvalidRecipient => "invalid-recipient",
            Self::Unauthenticated => "unauthenticated",
            Self::RecipientOptOut => "opt-out",
            Self::Other => "other",
        }
    }
}

/// Map an HTTP rejection to a reason category. The body, when it
/// parses, carries a graph error code that is more precise than the
/// status line.
pub(super) fn categorize(status: reqwest::StatusCode, body: &str) -> SendFailureKind {
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.get("code")).and_then(Value::as_i64));

    match code {
        Some(130429) => return SendFailureKind::RateLimited,
        Some(131026) | Some(131030) => return SendFailureKind::InvalidRecipient,
        Some(131050) => return SendFailureKind::RecipientOptOut,
        Some(190) => return SendFailureKind::Unauthenticated,
        _ => {}
    }

    match status.as_u16() {
        429 => SendFailureKind::RateLimited,
        401 | 403 => SendFailureKind::Unauthenticated,
        404 => SendFailureKind::InvalidRecipient,
        _ => SendFailureKind::Other,
    }
}

/// Plain text message body.
pub(super) fn text_payload(recipient: &str, text: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": recipient,
        "type": "text",
        "text": { "preview_url": false, "body": text }
    })
}

/// Interactive button message body. Titles are clipped to the API
/// limit; callers already capped the button count.
pub(super) fn interactive_payload(recipient: &str, text: &str, buttons: &[Button]) -> Value {
    let buttons: Vec<Value> = buttons
        .iter()
        .map(|b| {
            json!({
                "type": "reply",
                "reply": {
                    "id": b.id,
                    "title": clip_title(&b.title)
                }
            })
        })
        .collect();

    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": recipient,
        "type": "interactive",
        "interactive": {
            "type": "button",
            "body": { "text": text },
            "action": { "buttons": buttons }
        }
    })
}

fn clip_title(title: &str) -> String {
    title.chars().take(MAX_BUTTON_TITLE).collect()
}

/// Split a long message into chunks the API accepts, preferring line
/// boundaries. Counts characters, not bytes.
pub(super) fn split_text(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let mut buf = String::new();
            let mut buf_len = 0;
            for ch in line.chars() {
                buf.push(ch);
                buf_len += 1;
                if buf_len == limit {
                    chunks.push(std::mem::take(&mut buf));
                    buf_len = 0;
                }
            }
            current = buf;
            current_len = buf_len;
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
