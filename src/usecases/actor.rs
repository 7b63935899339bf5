//! Ledger Actor - Single-writer Owner of Portfolio and History
//!
//! At most one mutation is in flight at a time: the mutate path locks the
//! authoritative state for the entire build-prompt → infer → parse → apply
//! → persist section, because the oracle's reply depends on the portfolio
//! snapshot embedded in its prompt and that snapshot must not go stale
//! mid-decision.
//!
//! Reads are served from a separate "last committed" snapshot that is only
//! replaced after a successful save, so `/api/state` never waits on an
//! in-flight inference call and never observes a half-applied mutation.
//! A failed save leaves both copies untouched — the pre-mutation state
//! stays authoritative and the request surfaces the IO error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use crate::domain::decision::{self, Decision};
use crate::domain::history::{History, LogEntry, TradeStatus};
use crate::domain::ledger;
use crate::domain::portfolio::Portfolio;
use crate::domain::prompt;
use crate::ports::oracle::Oracle;
use crate::ports::repository::LedgerRepository;

/// Read-only view of the last durably committed ledger state.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LedgerSnapshot {
    pub portfolio: Portfolio,
    pub history: History,
}

/// Result of one chat-driven trade request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatOutcome {
    /// Human-readable summary returned to the chat client.
    pub agent_reply: String,
    /// The audit entry produced by this request.
    pub trade_details: LogEntry,
    /// Portfolio after the request committed.
    pub new_portfolio: Portfolio,
}

/// The single logical actor owning the ledger.
pub struct LedgerActor<R: LedgerRepository, O: Oracle> {
    repo: Arc<R>,
    oracle: Arc<O>,
    /// Authoritative state; the lock spans the whole mutate path.
    state: Mutex<LedgerSnapshot>,
    /// Last committed state, for lock-free-ish reads.
    committed: RwLock<LedgerSnapshot>,
}

impl<R: LedgerRepository, O: Oracle> LedgerActor<R, O> {
    /// Load durable state and construct the actor.
    ///
    /// This is the initialization barrier: callers must await it before
    /// serving any request, so a restart never serves defaults while
    /// durable state exists.
    pub async fn init(repo: Arc<R>, oracle: Arc<O>) -> Result<Self> {
        let (portfolio, history) = repo
            .load()
            .await
            .context("failed to load persisted ledger state")?;

        info!(
            cash = %portfolio.cash,
            positions = portfolio.holdings.len(),
            history_len = history.len(),
            "Ledger state loaded"
        );

        let snapshot = LedgerSnapshot { portfolio, history };
        Ok(Self {
            repo,
            oracle,
            state: Mutex::new(snapshot.clone()),
            committed: RwLock::new(snapshot),
        })
    }

    /// Handle one chat message: consult the oracle against the current
    /// snapshot, apply the resulting decision, persist, and commit.
    ///
    /// Oracle and parse failures degrade to a logged HOLD fallback and the
    /// request still succeeds; only a persistence failure errors out, and
    /// in that case nothing is committed.
    #[instrument(skip(self, message))]
    pub async fn chat(&self, message: &str) -> Result<ChatOutcome> {
        let mut guard = self.state.lock().await;

        let system = prompt::system_prompt(&guard.portfolio);
        let decision = match self.oracle.complete(&system, message).await {
            Ok(raw) => match decision::parse(&raw) {
                Ok(d) => d,
                Err(e) => {
                    warn!(error = %e, raw_len = raw.len(), "Oracle output rejected");
                    Decision::fallback(format!("oracle output rejected: {e}"))
                }
            },
            Err(e) => {
                warn!(error = %e, "Inference call failed");
                Decision::fallback(format!("inference failed: {e}"))
            }
        };

        // Build the candidate state off to the side; install only after
        // a durable save, so a failed save cannot leave memory ahead of disk.
        let (new_portfolio, entry) = ledger::apply(&decision, &guard.portfolio, Utc::now());
        let mut new_history = guard.history.clone();
        new_history.push(entry.clone());

        self.repo
            .save(&new_portfolio, &new_history)
            .await
            .context("failed to persist ledger state")?;

        guard.portfolio = new_portfolio.clone();
        guard.history = new_history;
        *self.committed.write().await = guard.clone();

        info!(
            ticker = %entry.ticker,
            action = %entry.action,
            quantity = entry.quantity,
            status = %entry.status,
            cash = %new_portfolio.cash,
            "Trade applied"
        );

        Ok(ChatOutcome {
            agent_reply: agent_reply(&entry),
            trade_details: entry,
            new_portfolio,
        })
    }

    /// Restore defaults, clear history, persist immediately. Idempotent.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<LedgerSnapshot> {
        let mut guard = self.state.lock().await;

        let fresh = LedgerSnapshot::default();
        self.repo
            .save(&fresh.portfolio, &fresh.history)
            .await
            .context("failed to persist reset state")?;

        *guard = fresh.clone();
        *self.committed.write().await = fresh.clone();

        info!(cash = %fresh.portfolio.cash, "Ledger reset to defaults");
        Ok(fresh)
    }

    /// Last committed state. Never blocks on an in-flight mutation.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.committed.read().await.clone()
    }

    /// True when both collaborator ports report themselves usable.
    /// Feeds the readiness probe.
    pub async fn is_healthy(&self) -> bool {
        self.repo.is_healthy().await && self.oracle.is_healthy().await
    }
}

/// Render the chat reply for one audit entry.
fn agent_reply(entry: &LogEntry) -> String {
    let summary = match entry.status {
        TradeStatus::Executed if entry.ticker == decision::ERROR_TICKER => {
            "I couldn't derive a trade from that, so I'm holding.".to_string()
        }
        TradeStatus::Executed if entry.quantity == 0 || entry.ticker == decision::NO_TICKER => {
            "Holding — no trade this time.".to_string()
        }
        TradeStatus::Executed => format!(
            "{} {} {} at an estimated ${} per share.",
            entry.action, entry.quantity, entry.ticker, entry.price_estimate
        ),
        TradeStatus::InsufficientFunds => format!(
            "Wanted to {} {} {} but there isn't enough cash.",
            entry.action, entry.quantity, entry.ticker
        ),
        TradeStatus::InsufficientHoldings => format!(
            "Wanted to {} {} {} but you don't hold that many shares.",
            entry.action, entry.quantity, entry.ticker
        ),
    };

    if entry.reason.is_empty() {
        summary
    } else {
        format!("{summary} Reasoning: {}", entry.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::TradeAction;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn entry(status: TradeStatus, ticker: &str, quantity: u64) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            ticker: ticker.to_string(),
            action: TradeAction::Buy,
            quantity,
            price_estimate: dec!(100),
            reason: String::new(),
            status,
        }
    }

    #[test]
    fn test_reply_for_executed_trade() {
        let reply = agent_reply(&entry(TradeStatus::Executed, "AAPL", 10));
        assert!(reply.contains("BUY 10 AAPL"));
    }

    #[test]
    fn test_reply_for_error_fallback() {
        let reply = agent_reply(&entry(TradeStatus::Executed, "ERROR", 0));
        assert!(reply.contains("holding"));
    }

    #[test]
    fn test_reply_for_insufficient_funds() {
        let reply = agent_reply(&entry(TradeStatus::InsufficientFunds, "AAPL", 10));
        assert!(reply.contains("enough cash"));
    }

    #[test]
    fn test_reply_appends_reason() {
        let mut e = entry(TradeStatus::Executed, "AAPL", 1);
        e.reason = "strong earnings".to_string();
        assert!(agent_reply(&e).contains("strong earnings"));
    }
}
