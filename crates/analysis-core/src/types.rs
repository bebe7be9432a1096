use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Daily close prices per ticker, chronological.
pub type PriceMap = HashMap<String, Vec<(NaiveDate, f64)>>;

/// Natural-log returns per ticker, chronological.
pub type ReturnSeries = HashMap<String, Vec<(NaiveDate, f64)>>;

/// Rebalancing cadence. Unrecognized wire values map to `Unconstrained`,
/// which skips date-range length validation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Biannual,
    Unconstrained,
}

impl Frequency {
    /// Total function from wire strings: anything outside the constrained set
    /// is the explicit pass-through variant, never an error.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "monthly" => Frequency::Monthly,
            "quarterly" => Frequency::Quarterly,
            "biannual" => Frequency::Biannual,
            _ => Frequency::Unconstrained,
        }
    }

    /// Calendar months per rebalancing period. `Unconstrained` runs at the
    /// monthly cadence downstream.
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Biannual => 6,
            Frequency::Unconstrained => 1,
        }
    }
}

/// Risk-free rate over an analysis window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskFreeRate {
    pub annual: f64,
    pub daily: f64,
}

/// One optimized position: (ticker, raw weight, formatted percentage).
/// Serializes as a three-element array to match the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry(pub String, pub f64, pub String);

/// Output of the portfolio optimizer, keyed by period-end date string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub cumulative_returns: HashMap<String, f64>,
    pub periodic_returns: HashMap<String, f64>,
    pub optimized_weights: HashMap<String, Vec<WeightEntry>>,
}

/// Output of the benchmark aggregator, keyed by month-end date string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub benchmark_cumulative_returns: HashMap<String, f64>,
    pub benchmark_returns: HashMap<String, f64>,
}

/// Successful analysis payload. Periodic returns from both engines are
/// computed upstream but intentionally absent from this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub optimized_cumulative_returns: HashMap<String, f64>,
    pub optimized_weights: HashMap<String, Vec<WeightEntry>>,
    pub benchmark_portfolio_intersection: HashMap<String, (f64, f64)>,
    pub benchmark_cumulative_returns: HashMap<String, f64>,
}

/// Domain-validity rejection, delivered inside an HTTP 200 envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    #[serde(rename = "Error Code")]
    pub code: String,
    #[serde(rename = "Error Description")]
    pub description: String,
}

impl Rejection {
    pub fn new(code: u8, description: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
        }
    }
}

/// The `/api/info` response: either a well-formed analysis report or a
/// numbered domain rejection. Both serialize under an HTTP success status;
/// untagged keeps the wire shape identical to the legacy contract.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Rejected(Rejection),
    Report(Box<AnalysisReport>),
}
