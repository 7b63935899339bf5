//! Decision parsing — untrusted oracle text into a validated trade.
//!
//! The inference endpoint is asked for raw JSON but routinely wraps it in
//! markdown fences or prose. `parse` strips the wrapping and performs
//! structural validation only; fund/holding sufficiency is the ledger's job.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel ticker the oracle uses when no trade is intended.
/// Any action carrying it is treated as a no-op, whatever the verb says.
pub const NO_TICKER: &str = "NONE";

/// Sentinel ticker recorded when oracle output could not be used at all.
pub const ERROR_TICKER: &str = "ERROR";

/// Largest share count accepted from the oracle. Anything above is
/// rejected at the boundary so ledger arithmetic can never overflow.
pub const MAX_QUANTITY: u64 = 1_000_000_000;

/// Largest per-share price estimate accepted from the oracle, USD.
pub const MAX_PRICE: f64 = 1_000_000_000.0;

/// The three recognized trade verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// A validated trade instruction derived from oracle output.
///
/// Produced only by [`parse`] (or [`Decision::fallback`]); never mutated;
/// consumed exactly once by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Uppercase ticker symbol, or `"NONE"` / `"ERROR"` sentinels.
    pub ticker: String,
    /// Trade verb.
    pub action: TradeAction,
    /// Whole shares to trade.
    pub quantity: u64,
    /// Oracle's price estimate per share, USD.
    pub price_estimate: Decimal,
    /// Oracle's stated reasoning, for the audit trail.
    pub reason: String,
}

impl Decision {
    /// Safe default substituted when inference fails or its output is
    /// rejected. A guaranteed no-op: HOLD on the `"ERROR"` sentinel.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            ticker: ERROR_TICKER.to_string(),
            action: TradeAction::Hold,
            quantity: 0,
            price_estimate: Decimal::ZERO,
            reason: reason.into(),
        }
    }
}

/// Structural rejection of oracle output. Semantic checks live in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("oracle output is not valid JSON: {0}")]
    NotJson(String),
    #[error("oracle output is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
    #[error("unrecognized action `{0}`")]
    UnknownAction(String),
    #[error("field `{0}` must be a non-negative number")]
    NegativeNumber(&'static str),
    #[error("field `{0}` is implausibly large")]
    OutOfRange(&'static str),
    #[error("`quantity` must be a whole number of shares")]
    FractionalQuantity,
}

/// Parse raw oracle text into a [`Decision`].
///
/// Pure function: strips code fences, parses JSON, validates the schema.
pub fn parse(raw: &str) -> Result<Decision, ParseError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| ParseError::NotJson(e.to_string()))?;
    let obj = value.as_object().ok_or(ParseError::NotAnObject)?;

    let ticker = obj
        .get("ticker")
        .ok_or(ParseError::MissingField("ticker"))?
        .as_str()
        .ok_or(ParseError::WrongType("ticker"))?
        .trim()
        .to_uppercase();
    if ticker.is_empty() {
        return Err(ParseError::MissingField("ticker"));
    }

    let action_raw = obj
        .get("action")
        .ok_or(ParseError::MissingField("action"))?
        .as_str()
        .ok_or(ParseError::WrongType("action"))?;
    let action = match action_raw.trim().to_uppercase().as_str() {
        "BUY" => TradeAction::Buy,
        "SELL" => TradeAction::Sell,
        "HOLD" => TradeAction::Hold,
        other => return Err(ParseError::UnknownAction(other.to_string())),
    };

    let quantity = parse_quantity(
        obj.get("quantity")
            .ok_or(ParseError::MissingField("quantity"))?,
    )?;

    // Optional fields: a HOLD frequently omits both.
    let price_estimate = match obj.get("price_estimate") {
        None | Some(serde_json::Value::Null) => Decimal::ZERO,
        Some(v) => parse_price(v)?,
    };
    let reason = obj
        .get("reason")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    Ok(Decision {
        ticker,
        action,
        quantity,
        price_estimate,
        reason,
    })
}

/// Drop markdown code-fence lines (``` or ```json) wrapping the payload.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Opening fence may carry a language tag (```json, ```JSON).
    let rest = if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
        &rest[4..]
    } else {
        rest
    };
    rest.rsplit_once("```").map_or(rest, |(body, _)| body).trim()
}

fn parse_quantity(value: &serde_json::Value) -> Result<u64, ParseError> {
    if let Some(q) = value.as_u64() {
        if q > MAX_QUANTITY {
            return Err(ParseError::OutOfRange("quantity"));
        }
        return Ok(q);
    }
    let q = value.as_f64().ok_or(ParseError::WrongType("quantity"))?;
    if q < 0.0 {
        return Err(ParseError::NegativeNumber("quantity"));
    }
    // Range check before the cast: `as u64` saturates silently above u64::MAX.
    if q > MAX_QUANTITY as f64 {
        return Err(ParseError::OutOfRange("quantity"));
    }
    if q.fract() != 0.0 {
        return Err(ParseError::FractionalQuantity);
    }
    Ok(q as u64)
}

fn parse_price(value: &serde_json::Value) -> Result<Decimal, ParseError> {
    let p = value
        .as_f64()
        .ok_or(ParseError::WrongType("price_estimate"))?;
    if p < 0.0 {
        return Err(ParseError::NegativeNumber("price_estimate"));
    }
    if p > MAX_PRICE {
        return Err(ParseError::OutOfRange("price_estimate"));
    }
    Decimal::from_f64(p).ok_or(ParseError::WrongType("price_estimate"))
}
