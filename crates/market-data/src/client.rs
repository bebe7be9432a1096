use analysis_core::{AnalysisError, MarketDataSource, PriceMap, RiskFreeRate};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::rates::derive_risk_free_rate;

const BASE_URL: &str = "https://api.polygon.io";

/// Long-treasury ETF used to derive the risk-free rate for the window.
const RATE_PROXY_TICKER: &str = "TLT";

/// HTTP client for daily aggregate bars.
#[derive(Clone)]
pub struct MarketDataClient {
    api_key: String,
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregateBar>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Window start, Unix milliseconds.
    t: i64,
    /// Close price.
    c: f64,
}

impl MarketDataClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (local stub servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a request, retrying up to 3 times when the vendor rate-limits.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AnalysisError> {
        let request = builder
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!(
                "Market data 429 rate limited, waiting {}s before retry {}/3",
                wait_secs,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(AnalysisError::ApiError(
            "Rate limited by market data vendor after 3 retries".to_string(),
        ))
    }

    /// Daily closes for one ticker over [start, end], chronological.
    async fn fetch_daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AnalysisError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            ticker,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let response = self
            .send_request(self.client.get(&url).query(&[
                ("apiKey", self.api_key.as_str()),
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {} fetching {}: {}",
                response.status(),
                ticker,
                response.text().await.unwrap_or_default()
            )));
        }

        let agg: AggregateResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        Ok(agg
            .results
            .into_iter()
            .filter_map(|bar| {
                DateTime::from_timestamp_millis(bar.t).map(|ts| (ts.date_naive(), bar.c))
            })
            .collect())
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn pull_data(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMap, AnalysisError> {
        let mut prices = PriceMap::new();
        for ticker in tickers {
            if prices.contains_key(ticker) {
                continue;
            }
            let closes = self.fetch_daily_closes(ticker, start, end).await?;
            tracing::debug!("Pulled {} daily closes for {}", closes.len(), ticker);
            prices.insert(ticker.clone(), closes);
        }
        Ok(prices)
    }

    async fn risk_free_rate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RiskFreeRate, AnalysisError> {
        let closes = self
            .fetch_daily_closes(RATE_PROXY_TICKER, start, end)
            .await?;
        Ok(derive_risk_free_rate(&closes))
    }
}
