//! Portfolio — the authoritative ledger record.
//!
//! Holds the cash balance and per-ticker share counts mutated only by
//! [`crate::domain::ledger::apply`]. Cash uses `Decimal` so boundary
//! comparisons (cost exactly equal to cash, one cent over) are exact.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Cash balance a fresh (or reset) account starts with, in USD.
pub const STARTING_CASH: Decimal = dec!(100000);

/// The authoritative account state: cash plus whole-share holdings.
///
/// Invariants, enforced by the ledger transitions:
/// - `cash >= 0` in every reachable state
/// - every holding quantity is strictly positive (a ticker whose
///   quantity reaches zero is removed from the map)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash in USD.
    pub cash: Decimal,
    /// Shares held, keyed by uppercase ticker symbol.
    pub holdings: BTreeMap<String, u64>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            cash: STARTING_CASH,
            holdings: BTreeMap::new(),
        }
    }
}

impl Portfolio {
    /// Shares held for `ticker`, zero if absent.
    pub fn quantity_of(&self, ticker: &str) -> u64 {
        self.holdings.get(ticker).copied().unwrap_or(0)
    }

    /// True when every documented invariant holds. Used by tests.
    pub fn invariants_hold(&self) -> bool {
        self.cash >= Decimal::ZERO && self.holdings.values().all(|&q| q > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_portfolio() {
        let p = Portfolio::default();
        assert_eq!(p.cash, dec!(100000));
        assert!(p.holdings.is_empty());
        assert!(p.invariants_hold());
    }

    #[test]
    fn test_quantity_of_missing_ticker_is_zero() {
        let p = Portfolio::default();
        assert_eq!(p.quantity_of("AAPL"), 0);
    }

    #[test]
    fn test_invariants_reject_zero_quantity_key() {
        let mut p = Portfolio::default();
        p.holdings.insert("AAPL".to_string(), 0);
        assert!(!p.invariants_hold());
    }

    #[test]
    fn test_invariants_reject_negative_cash() {
        let mut p = Portfolio::default();
        p.cash = dec!(-0.01);
        assert!(!p.invariants_hold());
    }
}
