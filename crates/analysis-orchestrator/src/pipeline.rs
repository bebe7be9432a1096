use analysis_core::{
    AnalysisError, AnalysisReport, AnalysisResponse, Frequency, MarketDataSource, Rejection,
};
use chrono::NaiveDate;
use market_data::calculate_returns;
use portfolio_engine::{Benchmark, Portfolio};
use std::sync::Arc;
use validation::{validate_date_range, ValidationOutcome};

use crate::intersect::intersect_series;

/// A structurally valid analysis request: dates already parsed, benchmark
/// already normalized to a list by the transport layer.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub assets: Vec<String>,
    pub benchmark: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
    pub transaction_costs: u8,
}

/// Sequences the analytical flow for one request: date-range validation,
/// data retrieval, return computation, optimization, benchmarking, and the
/// final series intersection. Constructed once at startup and shared by
/// reference across request handlers.
pub struct RequestPipeline {
    market_data: Arc<dyn MarketDataSource>,
}

impl RequestPipeline {
    pub fn new(market_data: Arc<dyn MarketDataSource>) -> Self {
        Self { market_data }
    }

    /// Run the full flow. Domain-validity rejections come back as
    /// `Ok(AnalysisResponse::Rejected)`: they are payloads, not transport
    /// failures. Collaborator errors are not caught here; they propagate to
    /// the transport layer as server-level failures.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        // Reject before any data retrieval happens.
        if let ValidationOutcome::Rejected { code, message } =
            validate_date_range(request.frequency, request.start, request.end)
        {
            tracing::info!("Request rejected with code {}: {}", code, message);
            return Ok(AnalysisResponse::Rejected(Rejection::new(code, message)));
        }

        let asset_prices = self
            .market_data
            .pull_data(&request.assets, request.start, request.end)
            .await?;
        let benchmark_prices = self
            .market_data
            .pull_data(&request.benchmark, request.start, request.end)
            .await?;

        let rates = self
            .market_data
            .risk_free_rate(request.start, request.end)
            .await?;

        let asset_returns = calculate_returns(&asset_prices);
        let benchmark_returns = calculate_returns(&benchmark_prices);

        let output = Portfolio::new(
            request.start,
            request.end,
            asset_returns,
            rates,
            request.frequency,
            request.transaction_costs,
        )
        .optimize_portfolio()?;

        let benchmark_output =
            Benchmark::new(benchmark_returns, request.benchmark.clone()).form_returns()?;

        let intersection = intersect_series(
            &output.cumulative_returns,
            &benchmark_output.benchmark_cumulative_returns,
        );

        tracing::info!(
            "Analyzed {} assets vs {} benchmark tickers: {} periods, {} joint dates",
            request.assets.len(),
            request.benchmark.len(),
            output.cumulative_returns.len(),
            intersection.len()
        );

        // Periodic returns from both engines stay out of the response shape.
        Ok(AnalysisResponse::Report(Box::new(AnalysisReport {
            optimized_cumulative_returns: output.cumulative_returns,
            optimized_weights: output.optimized_weights,
            benchmark_portfolio_intersection: intersection,
            benchmark_cumulative_returns: benchmark_output.benchmark_cumulative_returns,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{PriceMap, RiskFreeRate};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory market data: a deterministic price walk for any ticker,
    /// counting how many pulls the pipeline performs.
    struct StaticMarketData {
        pull_count: AtomicUsize,
    }

    impl StaticMarketData {
        fn new() -> Self {
            Self {
                pull_count: AtomicUsize::new(0),
            }
        }

        fn closes(seed: f64, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, f64)> {
            let days = (end - start).num_days();
            (0..=days)
                .map(|i| start + Duration::days(i))
                .filter(|d| chrono::Datelike::weekday(d).number_from_monday() <= 5)
                .enumerate()
                .map(|(i, d)| {
                    let wiggle = 1.0 + 0.01 * ((i as f64) * 0.9 + seed).sin();
                    (d, 100.0 * wiggle + i as f64 * seed.cos().abs() * 0.1)
                })
                .collect()
        }
    }

    #[async_trait]
    impl MarketDataSource for StaticMarketData {
        async fn pull_data(
            &self,
            tickers: &[String],
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceMap, AnalysisError> {
            self.pull_count.fetch_add(1, Ordering::SeqCst);
            Ok(tickers
                .iter()
                .enumerate()
                .map(|(i, t)| (t.clone(), Self::closes(i as f64 + 0.3, start, end)))
                .collect())
        }

        async fn risk_free_rate(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<RiskFreeRate, AnalysisError> {
            Ok(RiskFreeRate {
                annual: 0.045,
                daily: 0.045 / 252.0,
            })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> AnalysisRequest {
        AnalysisRequest {
            assets: vec!["AAA".to_string(), "BBB".to_string()],
            benchmark: vec!["SPY".to_string()],
            start,
            end,
            frequency,
            transaction_costs: 0,
        }
    }

    #[tokio::test]
    async fn test_rejected_request_short_circuits_before_data_pulls() {
        let source = Arc::new(StaticMarketData::new());
        let pipeline = RequestPipeline::new(source.clone());

        // 30 days is far below the monthly minimum of 120.
        let response = pipeline
            .run(request(date(2021, 1, 1), date(2021, 1, 31), Frequency::Monthly))
            .await
            .unwrap();

        match response {
            AnalysisResponse::Rejected(rejection) => assert_eq!(rejection.code, "5"),
            AnalysisResponse::Report(_) => panic!("expected rejection"),
        }
        assert_eq!(source.pull_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inverted_range_is_code_1() {
        let pipeline = RequestPipeline::new(Arc::new(StaticMarketData::new()));
        let response = pipeline
            .run(request(date(2021, 6, 1), date(2021, 1, 1), Frequency::Quarterly))
            .await
            .unwrap();
        match response {
            AnalysisResponse::Rejected(rejection) => {
                assert_eq!(rejection.code, "1");
                assert_eq!(rejection.description, "Inverted Date Range");
            }
            AnalysisResponse::Report(_) => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_successful_monthly_run_assembles_all_fields() {
        let source = Arc::new(StaticMarketData::new());
        let pipeline = RequestPipeline::new(source.clone());

        let response = pipeline
            .run(request(date(2021, 1, 4), date(2021, 6, 30), Frequency::Monthly))
            .await
            .unwrap();

        let report = match response {
            AnalysisResponse::Report(report) => report,
            AnalysisResponse::Rejected(r) => panic!("unexpected rejection: {:?}", r),
        };

        // One pull for assets, one for the benchmark set.
        assert_eq!(source.pull_count.load(Ordering::SeqCst), 2);
        assert!(!report.optimized_cumulative_returns.is_empty());
        assert!(!report.optimized_weights.is_empty());
        assert!(!report.benchmark_cumulative_returns.is_empty());

        // Every joint date must exist in both source series with those values.
        for (key, &(portfolio_value, benchmark_value)) in
            &report.benchmark_portfolio_intersection
        {
            assert_eq!(report.optimized_cumulative_returns[key], portfolio_value);
            assert_eq!(report.benchmark_cumulative_returns[key], benchmark_value);
        }

        // The wire shape carries exactly the four contract fields.
        let json = serde_json::to_value(AnalysisResponse::Report(report)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 4);
        for field in [
            "optimized_cumulative_returns",
            "optimized_weights",
            "benchmark_portfolio_intersection",
            "benchmark_cumulative_returns",
        ] {
            assert!(object.contains_key(field), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn test_unconstrained_frequency_passes_validation() {
        let pipeline = RequestPipeline::new(Arc::new(StaticMarketData::new()));
        // 81 days would be rejected as too short under every constrained cadence.
        let response = pipeline
            .run(request(
                date(2021, 1, 4),
                date(2021, 3, 26),
                Frequency::Unconstrained,
            ))
            .await
            .unwrap();
        assert!(matches!(response, AnalysisResponse::Report(_)));
    }
}
