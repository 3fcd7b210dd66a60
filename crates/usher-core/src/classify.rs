//! Webhook payload classification.
//!
//! Inbound payloads are loosely typed and field presence varies by
//! provider and event kind. The classifier inspects a raw JSON value
//! and produces a typed event, or `None` for payloads that cannot be
//! processed. Callers acknowledge the webhook either way.

use crate::event::{InteractiveKind, InteractiveResponse, TextMessage, WebhookEvent};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

// Field aliases, checked in order. Transports disagree on casing.
const SENDER_FIELDS: &[&str] = &["From", "from", "sender"];
const RECIPIENT_FIELDS: &[&str] = &["To", "to", "recipient"];
const BODY_FIELDS: &[&str] = &["Body", "body", "text"];
const MESSAGE_ID_FIELDS: &[&str] = &["MessageSid", "SmsMessageSid", "message_id", "id"];
const STATUS_FIELDS: &[&str] = &["MessageStatus", "SmsStatus", "status"];
const BUTTON_ID_FIELDS: &[&str] = &["ButtonPayload", "button_id"];
const BUTTON_TITLE_FIELDS: &[&str] = &["ButtonText", "button_title"];
const LIST_ID_FIELDS: &[&str] = &["ListId", "list_id"];
const LIST_TITLE_FIELDS: &[&str] = &["ListTitle", "list_title"];

/// Classify a raw webhook payload into a typed event.
///
/// Returns `None` when the payload is unprocessable: no recognizable
/// sender, or an error envelope whose original request cannot be
/// recovered.
pub fn classify(payload: &Value) -> Option<WebhookEvent> {
    // Provider error envelopes wrap the request that failed; classify
    // the embedded original instead of the envelope.
    if payload.get("error").is_some() || payload.get("ErrorCode").is_some() {
        return unwrap_error_envelope(payload);
    }

    classify_event(payload)
}

fn classify_event(payload: &Value) -> Option<WebhookEvent> {
    // Status updates carry a delivery status and no body. A payload
    // with both is a message that happens to mention status.
    if let Some(status) = first_str(payload, STATUS_FIELDS) {
        if first_str(payload, BODY_FIELDS).is_none() {
            return Some(WebhookEvent::StatusUpdate {
                status: status.to_string(),
            });
        }
    }

    let from = first_str(payload, SENDER_FIELDS);

    // Button and list selections need a sender to route the reply.
    if let Some(id) = first_str(payload, BUTTON_ID_FIELDS) {
        let from = sender_or_drop(from, "button reply")?;
        let title = first_str(payload, BUTTON_TITLE_FIELDS).unwrap_or(id);
        return Some(WebhookEvent::Interactive(InteractiveResponse {
            kind: InteractiveKind::Button,
            id: id.to_string(),
            title: title.to_string(),
            from: from.to_string(),
        }));
    }
    if let Some(id) = first_str(payload, LIST_ID_FIELDS) {
        let from = sender_or_drop(from, "list reply")?;
        let title = first_str(payload, LIST_TITLE_FIELDS).unwrap_or(id);
        return Some(WebhookEvent::Interactive(InteractiveResponse {
            kind: InteractiveKind::List,
            id: id.to_string(),
            title: title.to_string(),
            from: from.to_string(),
        }));
    }

    // Everything else with a sender is a text message.
    let from = sender_or_drop(from, "message")?;
    let (body, body_missing) = match first_str(payload, BODY_FIELDS) {
        Some(b) => (b.to_string(), false),
        None => (String::new(), true),
    };
    let id = first_str(payload, MESSAGE_ID_FIELDS)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Some(WebhookEvent::Text(TextMessage {
        id,
        from: from.to_string(),
        to: first_str(payload, RECIPIENT_FIELDS).map(str::to_string),
        body,
        body_missing,
    }))
}

/// Unwrap a provider error envelope and classify the embedded original
/// request. Envelopes without a recoverable original, or nested
/// envelopes, are unprocessable.
fn unwrap_error_envelope(payload: &Value) -> Option<WebhookEvent> {
    let original = payload
        .get("original")
        .or_else(|| payload.get("Payload"))
        .or_else(|| payload.get("error").and_then(|e| e.get("original")))?;

    if original.get("error").is_some() || original.get("ErrorCode").is_some() {
        debug!("nested error envelope, dropping");
        return None;
    }
    classify_event(original)
}

fn sender_or_drop<'a>(from: Option<&'a str>, what: &str) -> Option<&'a str> {
    if from.is_none() {
        debug!("{what} payload has no sender, dropping");
    }
    from
}

fn first_str<'a>(payload: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|f| payload.get(*f).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_update_without_body() {
        let event = classify(&json!({
            "MessageStatus": "delivered",
            "MessageSid": "SM123",
            "To": "whatsapp:+972501111111"
        }));
        assert_eq!(
            event,
            Some(WebhookEvent::StatusUpdate {
                status: "delivered".to_string()
            })
        );
    }

    #[test]
    fn status_field_with_body_is_a_text_message() {
        let event = classify(&json!({
            "status": "weird",
            "Body": "what is my order status",
            "From": "whatsapp:+972501111111"
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => {
                assert_eq!(msg.body, "what is my order status");
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn button_reply() {
        let event = classify(&json!({
            "ButtonPayload": "biz_42",
            "ButtonText": "Dana's Bakery",
            "From": "whatsapp:+972501111111"
        }));
        match event {
            Some(WebhookEvent::Interactive(resp)) => {
                assert_eq!(resp.kind, InteractiveKind::Button);
                assert_eq!(resp.id, "biz_42");
                assert_eq!(resp.title, "Dana's Bakery");
                assert_eq!(resp.from, "whatsapp:+972501111111");
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn list_reply_falls_back_to_id_as_title() {
        let event = classify(&json!({
            "ListId": "biz_7",
            "From": "whatsapp:+972501111111"
        }));
        match event {
            Some(WebhookEvent::Interactive(resp)) => {
                assert_eq!(resp.kind, InteractiveKind::List);
                assert_eq!(resp.title, "biz_7");
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn interactive_without_sender_is_unprocessable() {
        let event = classify(&json!({ "ButtonPayload": "biz_42" }));
        assert_eq!(event, None);
    }

    #[test]
    fn text_message_full_fields() {
        let event = classify(&json!({
            "From": "whatsapp:+972501111111",
            "To": "whatsapp:+972509999999",
            "Body": "hello",
            "MessageSid": "SM42"
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => {
                assert_eq!(msg.id, "SM42");
                assert_eq!(msg.from, "whatsapp:+972501111111");
                assert_eq!(msg.to.as_deref(), Some("whatsapp:+972509999999"));
                assert_eq!(msg.body, "hello");
                assert!(!msg.body_missing);
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn missing_body_is_flagged_not_dropped() {
        let event = classify(&json!({
            "From": "whatsapp:+972501111111",
            "MessageSid": "SM43"
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => {
                assert!(msg.body_missing);
                assert_eq!(msg.body, "");
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn missing_sender_is_unprocessable() {
        let event = classify(&json!({ "Body": "hello", "MessageSid": "SM44" }));
        assert_eq!(event, None);
    }

    #[test]
    fn missing_message_id_gets_synthesized() {
        let event = classify(&json!({
            "From": "whatsapp:+972501111111",
            "Body": "hello"
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => {
                assert!(!msg.id.is_empty());
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn error_envelope_unwraps_original() {
        let event = classify(&json!({
            "error": { "code": 63016, "message": "failed to deliver" },
            "original": {
                "From": "whatsapp:+972501111111",
                "Body": "hello",
                "MessageSid": "SM45"
            }
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => assert_eq!(msg.id, "SM45"),
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn error_envelope_without_original_is_unprocessable() {
        let event = classify(&json!({
            "error": { "code": 63016, "message": "failed to deliver" }
        }));
        assert_eq!(event, None);
    }

    #[test]
    fn nested_error_envelope_is_unprocessable() {
        let event = classify(&json!({
            "error": { "code": 1 },
            "original": { "error": { "code": 2 } }
        }));
        assert_eq!(event, None);
    }

    #[test]
    fn non_object_payload_is_unprocessable() {
        assert_eq!(classify(&json!("garbage")), None);
        assert_eq!(classify(&json!([1, 2, 3])), None);
        assert_eq!(classify(&json!(null)), None);
    }

    #[test]
    fn lowercase_field_aliases_work() {
        let event = classify(&json!({
            "from": "+972501111111",
            "body": "shalom",
            "id": "m-1"
        }));
        match event {
            Some(WebhookEvent::Text(msg)) => {
                assert_eq!(msg.id, "m-1");
                assert_eq!(msg.body, "shalom");
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }
}
