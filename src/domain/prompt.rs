//! System prompt builder for the decision oracle.
//!
//! Deterministic render of the live portfolio snapshot plus the output
//! contract. The oracle is asked for raw JSON, but its reply is still
//! treated as untrusted input downstream — the parser validates everything.

use rust_decimal::Decimal;

use super::portfolio::Portfolio;

/// Largest fraction of cash the oracle is told to commit to a single BUY.
const MAX_POSITION_FRACTION: Decimal = rust_decimal_macros::dec!(0.20);

/// Build the system prompt embedding the current portfolio snapshot.
pub fn system_prompt(portfolio: &Portfolio) -> String {
    let holdings = if portfolio.holdings.is_empty() {
        "none".to_string()
    } else {
        portfolio
            .holdings
            .iter()
            .map(|(ticker, qty)| format!("{ticker}: {qty} shares"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let budget = portfolio.cash * MAX_POSITION_FRACTION;

    format!(
        "You are a trading assistant managing a simulated brokerage account.\n\
         Current cash: ${cash}\n\
         Current holdings: {holdings}\n\
         \n\
         Given the user's message, decide on at most one trade.\n\
         Rules:\n\
         - action must be exactly one of BUY, SELL, HOLD\n\
         - ticker must be an uppercase stock symbol, or NONE when not trading\n\
         - quantity is a whole number of shares\n\
         - never commit more than 20% of cash (${budget}) to a single BUY\n\
         - price_estimate is your best estimate of the current share price in USD\n\
         \n\
         Respond with ONLY a raw JSON object, no markdown, no commentary:\n\
         {{\"ticker\": \"...\", \"action\": \"...\", \"quantity\": 0, \
         \"price_estimate\": 0.0, \"reason\": \"...\"}}",
        cash = portfolio.cash,
        holdings = holdings,
        budget = budget,
    )
}
