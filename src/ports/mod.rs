//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `Oracle`: the external text-to-decision inference call
//! - `LedgerRepository`: durable portfolio/history persistence

pub mod oracle;
pub mod repository;
