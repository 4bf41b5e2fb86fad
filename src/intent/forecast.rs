// src/intent/forecast.rs

//! Deterministic toy forecast shown for `price_prediction` intents.
//! Not a pricing model; no network access.

use serde::{Deserialize, Serialize};

const BASE_PRICE: f64 = 112_935.19;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub token: String,
    /// Percentage change over the horizon, two decimals.
    pub pct: f64,
    /// Target price in USD, two decimals.
    pub target: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn forecast(symbol: &str, horizon_days: u32) -> Forecast {
    let seed = (symbol.chars().count() as f64) + f64::from(horizon_days);
    let pct = round2(((seed.sin() + 1.0) * 0.5 - 0.5) * 4.0);
    let target = round2(BASE_PRICE * (1.0 + pct / 100.0));
    Forecast {
        token: symbol.to_string(),
        pct,
        target,
    }
}

pub fn forecast_all(tokens: &[String], horizon_days: u32) -> Vec<Forecast> {
    tokens.iter().map(|t| forecast(t, horizon_days)).collect()
}
