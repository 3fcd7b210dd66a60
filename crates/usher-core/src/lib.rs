//! # usher-core
//!
//! Core types, traits, configuration, and error handling for the Usher
//! conversation engine.

pub mod business;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod prompt;
pub mod sanitize;
pub mod traits;

pub use config::shellexpand;
pub use error::UsherError;
