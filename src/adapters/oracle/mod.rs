//! Oracle Adapters - Inference Endpoint Clients
//!
//! Implements the `Oracle` port against an OpenAI-compatible
//! chat-completions HTTP endpoint.

pub mod openai;

pub use openai::{InferenceClient, InferenceClientConfig};
