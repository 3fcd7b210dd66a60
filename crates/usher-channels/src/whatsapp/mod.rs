//! WhatsApp Cloud API transport.
//!
//! Stateless JSON client against the graph `/{phone_number_id}/messages`
//! endpoint. With no credentials configured the transport degrades to
//! a log-only mock that reports success, so the rest of the engine
//! (session history included) behaves as if delivery happened.

mod send;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use usher_core::{
    config::TransportConfig,
    error::UsherError,
    event::{Button, MAX_BUTTONS},
    sanitize::normalize_user_id,
    traits::Transport,
};

use send::{categorize, interactive_payload, split_text, text_payload};

/// Upper bound on a single WhatsApp text body, in characters.
const MAX_TEXT_LEN: usize = 4096;

/// WhatsApp Cloud API client.
pub struct WhatsAppTransport {
    client: RwLock<reqwest::Client>,
    base_url: String,
    phone_number_id: String,
    access_token: String,
    sender_id: String,
}

impl WhatsAppTransport {
    /// Create from config values.
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            client: RwLock::new(reqwest::Client::new()),
            base_url: config.base_url.clone(),
            phone_number_id: config.phone_number_id.clone(),
            access_token: config.access_token.clone(),
            sender_id: config.sender_id.clone(),
        }
    }

    /// Sends addressed to our own number are acknowledged without
    /// hitting the wire; the transport would otherwise echo forever.
    fn is_self_send(&self, user_id: &str) -> bool {
        !self.sender_id.is_empty()
            && normalize_user_id(user_id) == normalize_user_id(&self.sender_id)
    }

    async fn post_payload(
        &self,
        user_id: &str,
        payload: serde_json::Value,
        kind: &str,
    ) -> Result<(), UsherError> {
        if !self.is_configured() {
            info!(user = %normalize_user_id(user_id), kind, "mock mode, send logged only");
            return Ok(());
        }

        let url = format!(
            "{}/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.phone_number_id
        );
        debug!("whatsapp: POST {url} kind={kind}");

        let client = self.client.read().await.clone();
        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| UsherError::Transport(format!("send failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let reason = categorize(status, &body);
            warn!(
                user = %normalize_user_id(user_id),
                reason = reason.as_str(),
                %status,
                "send rejected"
            );
            return Err(UsherError::Transport(format!(
                "send rejected ({}): {status}",
                reason.as_str()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, user_id: &str, text: &str) -> Result<(), UsherError> {
        if self.is_self_send(user_id) {
            info!("skipping send to our own number");
            return Ok(());
        }

        let recipient = normalize_user_id(user_id);
        for chunk in split_text(text, MAX_TEXT_LEN) {
            self.post_payload(user_id, text_payload(&recipient, &chunk), "text")
                .await?;
        }
        Ok(())
    }

    async fn send_interactive(
        &self,
        user_id: &str,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), UsherError> {
        if self.is_self_send(user_id) {
            info!("skipping interactive send to our own number");
            return Ok(());
        }
        if buttons.is_empty() {
            return self.send(user_id, text).await;
        }

        let buttons = if buttons.len() > MAX_BUTTONS {
            warn!(
                given = buttons.len(),
                kept = MAX_BUTTONS,
                "too many buttons, truncating"
            );
            &buttons[..MAX_BUTTONS]
        } else {
            buttons
        };

        let recipient = normalize_user_id(user_id);
        self.post_payload(
            user_id,
            interactive_payload(&recipient, text, buttons),
            "interactive",
        )
        .await
    }

    async fn restart(&self) -> Result<(), UsherError> {
        *self.client.write().await = reqwest::Client::new();
        info!("whatsapp client rebuilt");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.access_token.is_empty() && !self.phone_number_id.is_empty()
    }
}
