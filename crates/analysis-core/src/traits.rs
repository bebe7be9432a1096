use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AnalysisError, PriceMap, RiskFreeRate};

/// Trait for market-data providers. The request pipeline only sees this
/// contract, so tests can swap the HTTP client for an in-memory source.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily close prices for each ticker over [start, end].
    async fn pull_data(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMap, AnalysisError>;

    /// Risk-free rate observed over [start, end].
    async fn risk_free_rate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RiskFreeRate, AnalysisError>;
}
