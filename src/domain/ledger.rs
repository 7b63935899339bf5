//! Ledger state machine — applies a validated decision to the portfolio.
//!
//! Pure function over value types: no persistence, no clock access (the
//! timestamp is passed in), so every transition is testable in isolation.
//! Financial invariants live here and nowhere else: cash never goes
//! negative, holdings never go negative, a sold-out ticker's key is removed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::decision::{Decision, TradeAction, NO_TICKER};
use super::history::{LogEntry, TradeStatus};
use super::portfolio::Portfolio;

/// Apply one decision, producing the updated portfolio and its audit entry.
///
/// The input portfolio is untouched; callers decide when (and whether) to
/// install and persist the result. Exactly one `LogEntry` per call — failed
/// and no-op trades are logged too.
pub fn apply(
    decision: &Decision,
    portfolio: &Portfolio,
    at: DateTime<Utc>,
) -> (Portfolio, LogEntry) {
    // "NONE" means the oracle declined to trade; an ambiguous extraction
    // must never mutate funds, whatever the action verb says.
    if decision.ticker == NO_TICKER || decision.action == TradeAction::Hold {
        return (
            portfolio.clone(),
            LogEntry::record(decision, TradeStatus::Executed, at),
        );
    }

    let mut next = portfolio.clone();
    // Checked: the parser bounds quantity and price, but the ledger must
    // stay panic-free even for decisions constructed elsewhere. An
    // overflowed notional can never execute.
    let notional = Decimal::from(decision.quantity).checked_mul(decision.price_estimate);

    let status = match (decision.action, notional) {
        (TradeAction::Buy, Some(cost)) if next.cash >= cost => {
            let total = next
                .quantity_of(&decision.ticker)
                .checked_add(decision.quantity);
            match total {
                Some(total) => {
                    next.cash -= cost;
                    // A zero-share BUY executes as a no-op without
                    // creating a zero-quantity key.
                    if total > 0 {
                        next.holdings.insert(decision.ticker.clone(), total);
                    }
                    TradeStatus::Executed
                }
                None => TradeStatus::InsufficientFunds,
            }
        }
        (TradeAction::Buy, _) => TradeStatus::InsufficientFunds,
        (TradeAction::Sell, Some(credit)) => {
            let held = next.quantity_of(&decision.ticker);
            match next.cash.checked_add(credit) {
                Some(cash) if held >= decision.quantity => {
                    next.cash = cash;
                    let remaining = held - decision.quantity;
                    if remaining == 0 {
                        next.holdings.remove(&decision.ticker);
                    } else {
                        next.holdings.insert(decision.ticker.clone(), remaining);
                    }
                    TradeStatus::Executed
                }
                _ => TradeStatus::InsufficientHoldings,
            }
        }
        (TradeAction::Sell, None) => TradeStatus::InsufficientHoldings,
        (TradeAction::Hold, _) => unreachable!("handled by the no-op guard above"),
    };

    (next, LogEntry::record(decision, status, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn decision(ticker: &str, action: TradeAction, quantity: u64, price: Decimal) -> Decision {
        Decision {
            ticker: ticker.to_string(),
            action,
            quantity,
            price_estimate: price,
            reason: String::new(),
        }
    }

    #[test]
    fn test_buy_debits_cash_and_credits_holdings() {
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Buy, 10, dec!(100));
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert_eq!(next.cash, dec!(99000));
        assert_eq!(next.quantity_of("AAPL"), 10);
    }

    #[test]
    fn test_buy_exact_cash_boundary_succeeds() {
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Buy, 10, dec!(10000));
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert_eq!(next.cash, Decimal::ZERO);
    }

    #[test]
    fn test_buy_one_cent_over_fails() {
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Buy, 1, dec!(100000.01));
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::InsufficientFunds);
        assert_eq!(next, p);
    }

    #[test]
    fn test_sell_more_than_held_fails() {
        let p = Portfolio::default();
        let buy = decision("AAPL", TradeAction::Buy, 10, dec!(100));
        let (p, _) = apply(&buy, &p, Utc::now());
        let sell = decision("AAPL", TradeAction::Sell, 15, dec!(100));
        let (next, entry) = apply(&sell, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::InsufficientHoldings);
        assert_eq!(next, p);
    }

    #[test]
    fn test_sell_full_position_removes_key() {
        let p = Portfolio::default();
        let (p, _) = apply(&decision("AAPL", TradeAction::Buy, 10, dec!(100)), &p, Utc::now());
        let (next, entry) =
            apply(&decision("AAPL", TradeAction::Sell, 10, dec!(100)), &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert!(!next.holdings.contains_key("AAPL"));
        assert_eq!(next.cash, dec!(100000));
    }

    #[test]
    fn test_sell_partial_position_keeps_remainder() {
        let p = Portfolio::default();
        let (p, _) = apply(&decision("AAPL", TradeAction::Buy, 10, dec!(100)), &p, Utc::now());
        let (next, _) =
            apply(&decision("AAPL", TradeAction::Sell, 4, dec!(110)), &p, Utc::now());
        assert_eq!(next.quantity_of("AAPL"), 6);
        assert_eq!(next.cash, dec!(99000) + dec!(440));
    }

    #[test]
    fn test_hold_is_logged_noop() {
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Hold, 0, Decimal::ZERO);
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert_eq!(next, p);
    }

    #[test]
    fn test_buy_of_none_ticker_is_noop() {
        let p = Portfolio::default();
        let d = decision("NONE", TradeAction::Buy, 100, dec!(50));
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert_eq!(next, p);
        assert!(next.holdings.is_empty());
    }

    #[test]
    fn test_sell_of_none_ticker_is_noop() {
        let p = Portfolio::default();
        let d = decision("NONE", TradeAction::Sell, 100, dec!(50));
        let (next, _) = apply(&d, &p, Utc::now());
        assert_eq!(next, p);
    }

    #[test]
    fn test_buy_extreme_numerics_fails_controlled() {
        // Constructed directly (not via the parser) to exercise the
        // overflow guard: a notional beyond Decimal range must not panic.
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Buy, u64::MAX, Decimal::MAX);
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::InsufficientFunds);
        assert_eq!(next, p);
    }

    #[test]
    fn test_sell_extreme_numerics_fails_controlled() {
        let mut p = Portfolio::default();
        p.holdings.insert("AAPL".to_string(), u64::MAX);
        let d = decision("AAPL", TradeAction::Sell, u64::MAX, Decimal::MAX);
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::InsufficientHoldings);
        assert_eq!(next, p);
    }

    #[test]
    fn test_buy_zero_quantity_creates_no_key() {
        let p = Portfolio::default();
        let d = decision("AAPL", TradeAction::Buy, 0, dec!(100));
        let (next, entry) = apply(&d, &p, Utc::now());
        assert_eq!(entry.status, TradeStatus::Executed);
        assert!(!next.holdings.contains_key("AAPL"));
        assert_eq!(next, p);
    }

    #[test]
    fn test_buy_then_sell_conserves_cash() {
        let p = Portfolio::default();
        let (p1, _) = apply(&decision("TSLA", TradeAction::Buy, 7, dec!(231.5)), &p, Utc::now());
        let (p2, _) =
            apply(&decision("TSLA", TradeAction::Sell, 7, dec!(231.5)), &p1, Utc::now());
        assert_eq!(p2.cash, p.cash);
        assert!(p2.holdings.is_empty());
    }

    #[test]
    fn test_repeat_buy_accumulates_position() {
        let p = Portfolio::default();
        let (p, _) = apply(&decision("AAPL", TradeAction::Buy, 3, dec!(100)), &p, Utc::now());
        let (p, _) = apply(&decision("AAPL", TradeAction::Buy, 2, dec!(100)), &p, Utc::now());
        assert_eq!(p.quantity_of("AAPL"), 5);
        assert_eq!(p.cash, dec!(99500));
    }
}
