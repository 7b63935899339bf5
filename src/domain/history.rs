//! Trade history — bounded, newest-first audit trail.
//!
//! The history records every decision's effect on the portfolio but is
//! never replayed to reconstruct it; the portfolio is the canonical state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decision::{Decision, TradeAction};

/// Maximum retained log entries; the oldest is evicted on overflow.
pub const HISTORY_CAPACITY: usize = 50;

/// Final disposition of one applied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    #[serde(rename = "EXECUTED")]
    Executed,
    #[serde(rename = "FAILED-INSUFFICIENT-FUNDS")]
    InsufficientFunds,
    #[serde(rename = "FAILED-INSUFFICIENT-HOLDINGS")]
    InsufficientHoldings,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executed => write!(f, "EXECUTED"),
            Self::InsufficientFunds => write!(f, "FAILED-INSUFFICIENT-FUNDS"),
            Self::InsufficientHoldings => write!(f, "FAILED-INSUFFICIENT-HOLDINGS"),
        }
    }
}

/// One decision's audit record: the decision fields plus timestamp and
/// final status. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry ID for log correlation.
    pub id: Uuid,
    /// When the decision was applied.
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub action: TradeAction,
    pub quantity: u64,
    pub price_estimate: Decimal,
    pub reason: String,
    pub status: TradeStatus,
}

impl LogEntry {
    /// Decorate a consumed decision with its outcome.
    pub fn record(decision: &Decision, status: TradeStatus, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: at,
            ticker: decision.ticker.clone(),
            action: decision.action,
            quantity: decision.quantity,
            price_estimate: decision.price_estimate,
            reason: decision.reason.clone(),
            status,
        }
    }
}

/// Newest-first sequence of log entries, bounded at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<LogEntry>,
}

impl History {
    /// Prepend an entry, evicting the oldest past capacity.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Entries newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(ticker: &str) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            ticker: ticker.to_string(),
            action: TradeAction::Buy,
            quantity: 1,
            price_estimate: dec!(10),
            reason: String::new(),
            status: TradeStatus::Executed,
        }
    }

    #[test]
    fn test_push_is_newest_first() {
        let mut h = History::default();
        h.push(entry("A"));
        h.push(entry("B"));
        assert_eq!(h.latest().unwrap().ticker, "B");
        let tickers: Vec<_> = h.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "A"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::default();
        for i in 0..60 {
            h.push(entry(&format!("T{i}")));
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        // Newest first, oldest ten evicted.
        assert_eq!(h.latest().unwrap().ticker, "T59");
        assert_eq!(h.iter().last().unwrap().ticker, "T10");
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TradeStatus::InsufficientFunds).unwrap();
        assert_eq!(json, "\"FAILED-INSUFFICIENT-FUNDS\"");
        let json = serde_json::to_string(&TradeStatus::Executed).unwrap();
        assert_eq!(json, "\"EXECUTED\"");
    }
}
