//! Per-user conversation sessions.
//!
//! Sessions hold the bound business, ordered message history, and the
//! pagination cursor while the user browses the business list. They
//! are created on first contact and live for the process lifetime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use usher_core::context::ContextEntry;
use usher_core::event::Role;
use usher_core::sanitize::normalize_user_id;

/// Sentinel business id for general chat: bound, but with no
/// business-specific context applied.
pub const GENERAL_CHAT_ID: &str = "general-chat";

/// Pagination cursor, present only while the user browses the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
}

/// One stored conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-user conversational and navigational state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Bound business id; empty when unbound, [`GENERAL_CHAT_ID`] in
    /// general chat.
    pub business_id: String,
    pub business_phone: String,
    /// Conversation turns in order. Order is significant.
    pub messages: Vec<MessageTurn>,
    pub last_activity: DateTime<Utc>,
    pub navigation: Option<Navigation>,
}

/// In-memory session store keyed by normalized user identifier.
///
/// All mutation goes through the methods here; callers never touch a
/// session structurally. Rebinding to a different business clears the
/// message history; the caller is expected to purge that user's
/// cached replies alongside (the reply cache lives next door in
/// [`crate::IdempotencyCache`]).
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        info!("session store initialized");
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a session, if one exists. Counts as activity.
    pub async fn get(&self, user_id: &str) -> Option<Session> {
        let key = normalize_user_id(user_id);
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(&key)?;
        session.last_activity = Utc::now();
        Some(session.clone())
    }

    /// Bind a user to a business (or the general-chat sentinel),
    /// creating the session if needed. Binding to a *different*
    /// non-empty business id clears the message history; browsing
    /// state always ends. Returns whether history was cleared.
    pub async fn bind(&self, user_id: &str, business_id: &str, business_phone: &str) -> bool {
        let key = normalize_user_id(user_id);
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(key.clone()).or_default();

        let rebound = !session.business_id.is_empty() && session.business_id != business_id;
        if rebound {
            debug!(
                user = %key,
                from = %session.business_id,
                to = %business_id,
                cleared = session.messages.len(),
                "rebinding, clearing history"
            );
            session.messages.clear();
        }

        session.business_id = business_id.to_string();
        session.business_phone = business_phone.to_string();
        session.navigation = None;
        session.last_activity = Utc::now();
        rebound
    }

    /// Append a conversation turn. Log-only no-op when the user has no
    /// session yet; a session is created by `bind` or by entering the
    /// browsing flow, never by appending.
    pub async fn append_message(&self, user_id: &str, role: Role, content: &str) {
        let key = normalize_user_id(user_id);
        let mut sessions = self.inner.lock().await;
        match sessions.get_mut(&key) {
            Some(session) => {
                session.messages.push(MessageTurn {
                    role,
                    content: content.to_string(),
                    timestamp: Utc::now(),
                });
                session.last_activity = Utc::now();
            }
            None => {
                debug!(user = %key, role = role.as_str(), "append without session, dropping");
            }
        }
    }

    /// Ordered history for generation context. Empty when absent.
    pub async fn history(&self, user_id: &str) -> Vec<ContextEntry> {
        let key = normalize_user_id(user_id);
        let mut sessions = self.inner.lock().await;
        match sessions.get_mut(&key) {
            Some(session) => {
                session.last_activity = Utc::now();
                session
                    .messages
                    .iter()
                    .map(|turn| ContextEntry {
                        role: turn.role.as_str().to_string(),
                        content: turn.content.clone(),
                    })
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// Enter or update browsing state, creating the session if needed.
    pub async fn set_navigation(
        &self,
        user_id: &str,
        page: usize,
        page_size: usize,
        total_count: usize,
    ) {
        let key = normalize_user_id(user_id);
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(key).or_default();
        session.navigation = Some(Navigation {
            page,
            page_size,
            total_count,
        });
        session.last_activity = Utc::now();
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Release the store. Sessions are process-lifetime state, so this
    /// only reports what is being dropped.
    pub async fn close(&self) {
        let mut sessions = self.inner.lock().await;
        info!(sessions = sessions.len(), "session store closed");
        sessions.clear();
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_absent_returns_none() {
        let store = SessionStore::new();
        assert!(store.get("972501111111").await.is_none());
    }

    #[tokio::test]
    async fn bind_creates_and_get_returns() {
        let store = SessionStore::new();
        let cleared = store.bind("972501111111", "biz-1", "+97231234567").await;
        assert!(!cleared);

        let session = store.get("972501111111").await.unwrap();
        assert_eq!(session.business_id, "biz-1");
        assert_eq!(session.business_phone, "+97231234567");
        assert!(session.messages.is_empty());
        assert!(session.navigation.is_none());
    }

    #[tokio::test]
    async fn user_id_prefixes_collapse_to_one_session() {
        let store = SessionStore::new();
        store.bind("whatsapp:+972501111111", "biz-1", "").await;

        let session = store.get("972501111111").await.unwrap();
        assert_eq!(session.business_id, "biz-1");
        assert_eq!(store.count().await, 1);

        store.append_message("+972501111111", Role::User, "hi").await;
        assert_eq!(store.history("whatsapp:972501111111").await.len(), 1);
    }

    #[tokio::test]
    async fn append_without_session_is_a_noop() {
        let store = SessionStore::new();
        store.append_message("972501111111", Role::User, "hi").await;
        assert!(store.get("972501111111").await.is_none());
        assert!(store.history("972501111111").await.is_empty());
    }

    #[tokio::test]
    async fn history_keeps_conversational_order() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        store
            .append_message("972501111111", Role::User, "when do you open?")
            .await;
        store
            .append_message("972501111111", Role::Assistant, "09:00")
            .await;
        store
            .append_message("972501111111", Role::User, "and close?")
            .await;

        let history = store.history("972501111111").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");
        assert_eq!(history[2].content, "and close?");
    }

    #[tokio::test]
    async fn rebinding_to_a_different_business_clears_history() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        store.append_message("972501111111", Role::User, "hi").await;
        store
            .append_message("972501111111", Role::Assistant, "hello")
            .await;

        let cleared = store.bind("972501111111", "biz-2", "").await;
        assert!(cleared);
        assert!(store.history("972501111111").await.is_empty());
        assert_eq!(
            store.get("972501111111").await.unwrap().business_id,
            "biz-2"
        );
    }

    #[tokio::test]
    async fn rebinding_to_the_same_business_keeps_history() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        store.append_message("972501111111", Role::User, "hi").await;

        let cleared = store.bind("972501111111", "biz-1", "").await;
        assert!(!cleared);
        assert_eq!(store.history("972501111111").await.len(), 1);
    }

    #[tokio::test]
    async fn general_chat_is_a_distinct_binding() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        store.append_message("972501111111", Role::User, "hi").await;

        let cleared = store.bind("972501111111", GENERAL_CHAT_ID, "").await;
        assert!(cleared);
        assert!(store.history("972501111111").await.is_empty());
    }

    #[tokio::test]
    async fn binding_ends_browsing() {
        let store = SessionStore::new();
        store.set_navigation("972501111111", 2, 5, 12).await;
        assert_eq!(
            store.get("972501111111").await.unwrap().navigation,
            Some(Navigation {
                page: 2,
                page_size: 5,
                total_count: 12
            })
        );

        store.bind("972501111111", "biz-1", "").await;
        assert!(store.get("972501111111").await.unwrap().navigation.is_none());
    }

    #[tokio::test]
    async fn activity_timestamp_moves_forward() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        let first = store.get("972501111111").await.unwrap().last_activity;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append_message("972501111111", Role::User, "hi").await;
        let second = store.get("972501111111").await.unwrap().last_activity;
        assert!(second > first);
    }

    #[tokio::test]
    async fn close_drops_everything() {
        let store = SessionStore::new();
        store.bind("972501111111", "biz-1", "").await;
        store.close().await;
        assert_eq!(store.count().await, 0);
    }
}
