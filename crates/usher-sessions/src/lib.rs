//! # usher-sessions
//!
//! In-memory per-user conversation state and time-windowed idempotency
//! caches for the Usher engine. Both stores have an explicit
//! `new`/`close` lifecycle and are injected into the engine rather
//! than living as process globals.

pub mod dedup;
pub mod store;

pub use dedup::IdempotencyCache;
pub use store::{Navigation, Session, SessionStore, GENERAL_CHAT_ID};
