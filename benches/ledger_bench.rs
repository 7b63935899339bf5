//! Ledger Apply Benchmarks
//!
//! Measures the pure trade-application hot path: a BUY against a
//! populated portfolio, and a full decision round through history.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use oracle_trader::domain::decision::{Decision, TradeAction};
use oracle_trader::domain::history::History;
use oracle_trader::domain::ledger;
use oracle_trader::domain::portfolio::Portfolio;
use oracle_trader::domain::prompt;

fn populated_portfolio() -> Portfolio {
    let mut p = Portfolio::default();
    for (i, ticker) in ["AAPL", "MSFT", "TSLA", "NVDA", "AMZN"].iter().enumerate() {
        p.holdings.insert((*ticker).to_string(), (i as u64 + 1) * 10);
    }
    p
}

fn bench_apply(c: &mut Criterion) {
    let portfolio = populated_portfolio();
    let decision = Decision {
        ticker: "AAPL".to_string(),
        action: TradeAction::Buy,
        quantity: 10,
        price_estimate: dec!(187.25),
        reason: String::new(),
    };

    c.bench_function("ledger_apply_buy", |b| {
        b.iter(|| {
            let (next, entry) =
                ledger::apply(black_box(&decision), black_box(&portfolio), Utc::now());
            black_box((next, entry))
        });
    });
}

fn bench_apply_with_history(c: &mut Criterion) {
    let portfolio = populated_portfolio();
    let decision = Decision {
        ticker: "MSFT".to_string(),
        action: TradeAction::Sell,
        quantity: 5,
        price_estimate: dec!(410.0),
        reason: "taking profit".to_string(),
    };

    c.bench_function("ledger_apply_and_record", |b| {
        b.iter(|| {
            let mut history = History::default();
            let (next, entry) =
                ledger::apply(black_box(&decision), black_box(&portfolio), Utc::now());
            history.push(entry);
            black_box((next, history))
        });
    });
}

fn bench_prompt_build(c: &mut Criterion) {
    let portfolio = populated_portfolio();

    c.bench_function("system_prompt_build", |b| {
        b.iter(|| black_box(prompt::system_prompt(black_box(&portfolio))));
    });
}

criterion_group!(benches, bench_apply, bench_apply_with_history, bench_prompt_build);
criterion_main!(benches);
