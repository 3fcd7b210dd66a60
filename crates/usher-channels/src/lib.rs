//! # usher-channels
//!
//! Outbound messaging transports for Usher.

pub mod whatsapp;

pub use whatsapp::WhatsAppTransport;
