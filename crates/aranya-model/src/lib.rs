//! Aranya Model: the Prompt-Model Client
//!
//! Each call renders a named prompt over a validated input, issues exactly
//! one request to the model backend, and parses the reply into the declared
//! output type. Retries are the caller's concern.

pub mod backend;
pub mod client;
pub mod gemini;
pub mod mock;
pub mod output;

pub use backend::{ModelBackend, ModelError, ModelRequest};
pub use client::PromptModelClient;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use mock::ScriptedBackend;
