//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces. The single use case
//! here is the ledger actor: the one stateful unit that owns the
//! portfolio and history and serializes every mutation against them.

pub mod actor;

pub use actor::{ChatOutcome, LedgerActor, LedgerSnapshot};
