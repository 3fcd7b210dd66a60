//! Trait seams for the engine's external collaborators.

use crate::business::Business;
use crate::context::GenerationContext;
use crate::error::UsherError;
use crate::event::Button;
use async_trait::async_trait;

/// Outbound messaging transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (e.g. "whatsapp").
    fn name(&self) -> &str;

    /// Deliver a plain text message.
    async fn send(&self, user_id: &str, text: &str) -> Result<(), UsherError>;

    /// Deliver a text message with up to three reply buttons.
    async fn send_interactive(
        &self,
        user_id: &str,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), UsherError>;

    /// Human-triggered recovery: rebuild the underlying client.
    async fn restart(&self) -> Result<(), UsherError> {
        Ok(())
    }

    /// Whether real credentials are configured. False means the
    /// transport is in log-only mock mode.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Text-generation collaborator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generator name (e.g. "openai").
    fn name(&self) -> &str;

    /// Whether a key is configured at all. Gates optional work such
    /// as the post-binding introduction.
    fn is_configured(&self) -> bool;

    /// Check if the backend is reachable and authenticated.
    async fn is_available(&self) -> bool;

    /// Produce a reply for the given context. `user_id` travels along
    /// for per-user attribution on the provider side.
    async fn generate(
        &self,
        context: &GenerationContext,
        user_id: &str,
    ) -> Result<String, UsherError>;
}

/// Read-only business directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// All businesses, in stable listing order.
    async fn list(&self) -> Result<Vec<Business>, UsherError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Business>, UsherError>;

    async fn get_by_phone(&self, phone: &str) -> Result<Option<Business>, UsherError>;
}
