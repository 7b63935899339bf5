//! Repository Port - Ledger Persistence Interface
//!
//! Durable key/value persistence for exactly two entries: the portfolio
//! and the trade history. Loaded once at startup (before the first request
//! is served) and saved after every mutation.

use async_trait::async_trait;

use crate::domain::history::History;
use crate::domain::portfolio::Portfolio;

/// Durable key for the portfolio record.
pub const PORTFOLIO_KEY: &str = "portfolio";

/// Durable key for the history record.
pub const HISTORY_KEY: &str = "history";

/// Trait for ledger persistence providers.
///
/// The two entries are versioned together conceptually: `save` persists
/// both, and `load` returns a matched pair (with defaults substituted per
/// key when nothing is stored yet).
#[async_trait]
pub trait LedgerRepository: Send + Sync + 'static {
    /// Load the persisted ledger state, or defaults on first run.
    async fn load(&self) -> anyhow::Result<(Portfolio, History)>;

    /// Durably persist both entries. The final step of every mutation;
    /// a failure here means the mutation must not be considered committed.
    async fn save(&self, portfolio: &Portfolio, history: &History) -> anyhow::Result<()>;

    /// Check if the store is usable (directory exists, writable).
    async fn is_healthy(&self) -> bool;
}
