//! # usher-directory
//!
//! Read-only business directory implementations: an HTTP client for a
//! remote directory service, and a static in-memory directory fed
//! from configuration.

pub mod http;
pub mod static_dir;

pub use http::HttpDirectory;
pub use static_dir::StaticDirectory;
