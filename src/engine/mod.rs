//! The conversation engine: webhook intake, per-user serialized
//! processing, selection flow, and reply orchestration.

mod keywords;
mod keywords_data;
mod orchestrator;
mod pipeline;
mod selection;
mod sweep;


use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use usher_core::classify::classify;
use usher_core::config::Config;
use usher_core::event::{Button, WebhookEvent};
use usher_core::sanitize::normalize_user_id;
use usher_core::traits::{Directory, Generator, Transport};
use usher_sessions::{IdempotencyCache, SessionStore};

use crate::api;

/// Everything one running engine owns. Collaborators arrive injected
/// so tests can swap any of them.
pub struct Engine {
    pub(crate) cfg: Config,
    pub(crate) store: Arc<SessionStore>,
    pub(crate) dedup: Arc<IdempotencyCache>,
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) generator: Arc<dyn Generator>,
    /// Users with an event in flight, each with a buffer of events
    /// that arrived while they were busy. Guarantees per-user order;
    /// distinct users process in parallel.
    active_users: Mutex<HashMap<String, Vec<WebhookEvent>>>,
}

impl Engine {
    pub fn new(
        cfg: Config,
        store: Arc<SessionStore>,
        dedup: Arc<IdempotencyCache>,
        directory: Arc<dyn Directory>,
        transport: Arc<dyn Transport>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            cfg,
            store,
            dedup,
            directory,
            transport,
            generator,
            active_users: Mutex::new(HashMap::new()),
        }
    }

    /// Run until shutdown: serve the HTTP surface, sweep the caches,
    /// and process queued webhook payloads.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<serde_json::Value>(self.cfg.engine.queue_capacity);

        let api_state = api::ApiState::new(
            tx,
            self.store.clone(),
            self.transport.clone(),
            self.cfg.api.admin_key.clone(),
        );
        let api_host = self.cfg.api.host.clone();
        let api_port = self.cfg.api.port;
        let api_handle = tokio::spawn(async move {
            api::serve(&api_host, api_port, api_state).await;
        });

        // Cache eviction runs on its own schedule, never on the
        // message path.
        let sweep_handle = tokio::spawn(sweep::run(
            self.dedup.clone(),
            Duration::from_secs(self.cfg.engine.sweep_interval_secs),
        ));

        info!(
            transport = self.transport.name(),
            generator = self.generator.name(),
            "engine running"
        );

        loop {
            tokio::select! {
                Some(payload) = rx.recv() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.handle_payload(payload).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&api_handle, &sweep_handle).await;
        Ok(())
    }

    /// Classify one raw webhook payload and route it. Unclassifiable
    /// payloads are logged and dropped; the webhook already answered
    /// 200.
    pub(crate) async fn handle_payload(self: Arc<Self>, payload: serde_json::Value) {
        let Some(event) = classify(&payload) else {
            warn!("unclassifiable webhook payload, dropping");
            return;
        };
        match event {
            // Status updates carry no sender and touch no state.
            WebhookEvent::StatusUpdate { .. } => pipeline::handle_event(&self, event).await,
            event => self.dispatch_event(event).await,
        }
    }

    /// Process an event, serializing per user: while a user has an
    /// event in flight, later ones buffer and run in arrival order.
    pub(crate) async fn dispatch_event(self: Arc<Self>, event: WebhookEvent) {
        let Some(sender) = event_sender(&event) else {
            pipeline::handle_event(&self, event).await;
            return;
        };
        let sender_key = normalize_user_id(sender);

        {
            let mut active = self.active_users.lock().await;
            if let Some(buffer) = active.get_mut(&sender_key) {
                debug!(user = %sender_key, "user busy, buffering event");
                buffer.push(event);
                return;
            }
            active.insert(sender_key.clone(), Vec::new());
        }

        pipeline::handle_event(&self, event).await;

        // Drain whatever arrived for this user while we were busy.
        loop {
            let next = {
                let mut active = self.active_users.lock().await;
                match active.get_mut(&sender_key) {
                    Some(buffer) if !buffer.is_empty() => Some(buffer.remove(0)),
                    _ => {
                        active.remove(&sender_key);
                        None
                    }
                }
            };
            match next {
                Some(buffered) => pipeline::handle_event(&self, buffered).await,
                None => break,
            }
        }
    }

    /// Send text, logging instead of failing. Delivery problems are
    /// the transport's to report (by reason); the engine never retries.
    pub(crate) async fn send(&self, user_id: &str, text: &str) {
        if let Err(err) = self.transport.send(user_id, text).await {
            warn!(user = %user_id, error = %err, "send failed");
        }
    }

    /// Send text with reply buttons, logging instead of failing.
    pub(crate) async fn send_interactive(&self, user_id: &str, text: &str, buttons: &[Button]) {
        if let Err(err) = self.transport.send_interactive(user_id, text, buttons).await {
            warn!(user = %user_id, error = %err, "interactive send failed");
        }
    }

    async fn shutdown(
        &self,
        api_handle: &tokio::task::JoinHandle<()>,
        sweep_handle: &tokio::task::JoinHandle<()>,
    ) {
        info!("shutting down");
        api_handle.abort();
        sweep_handle.abort();
        self.dedup.close().await;
        self.store.close().await;
    }
}

fn event_sender(event: &WebhookEvent) -> Option<&str> {
    match event {
        WebhookEvent::StatusUpdate { .. } => None,
        WebhookEvent::Interactive(response) => Some(&response.from),
        WebhookEvent::Text(message) => Some(&message.from),
    }
}
