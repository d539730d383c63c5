use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one plant against the current weather window.
///
/// `water_amount_ml` is rounded to whole milliliters and zero whenever
/// `should_water` is false. `confidence` is a heuristic score in [0.1, 1.0],
/// not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub should_water: bool,
    pub water_amount_ml: f64,
    pub confidence: f64,
    pub reason: String,
    pub next_watering_date: Option<NaiveDate>,
}

/// Multiplicative adjustment factors applied to a plant's base water amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WateringFactors {
    pub seasonal: f64,
    pub weather: f64,
    pub history: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rain: f64,
}

/// First forecast day with enough rain to cover a watering.
///
/// `days_until_rain` is 1-based: 1 means tomorrow (the first forecast entry).
#[derive(Debug, Clone, PartialEq)]
pub struct RainOutlook {
    pub days_until_rain: u32,
    pub expected_mm: f64,
    pub date: NaiveDate,
}
