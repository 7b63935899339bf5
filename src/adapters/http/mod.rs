//! HTTP Adapter - Public API and Health Probes
//!
//! Inbound edge of the service: axum routes that hand requests to the
//! ledger actor. Routing only — all semantics live in the usecases layer.

pub mod routes;

pub use routes::{router, AppState};
