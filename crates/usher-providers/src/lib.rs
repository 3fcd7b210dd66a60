//! # usher-providers
//!
//! Text-generation collaborator implementations for Usher.

pub mod openai;

pub use openai::OpenAiGenerator;
