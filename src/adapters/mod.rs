//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, file I/O) and hosts the inbound
//! HTTP surface. Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `http`: axum routes for the public API and health probes
//! - `oracle`: OpenAI-compatible chat-completions client
//! - `persistence`: atomic JSON key/value store for ledger state

pub mod http;
pub mod oracle;
pub mod persistence;
