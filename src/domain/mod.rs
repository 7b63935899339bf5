//! Domain layer - Core brokerage logic and models.
//!
//! Pure ledger semantics for the simulated brokerage: portfolio state,
//! decision parsing, trade application, and the bounded audit history.
//! No external dependencies allowed here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod decision;
pub mod history;
pub mod ledger;
pub mod portfolio;
pub mod prompt;

// Re-export core types for convenience
pub use decision::{Decision, ParseError, TradeAction};
pub use history::{History, LogEntry, TradeStatus, HISTORY_CAPACITY};
pub use portfolio::Portfolio;
