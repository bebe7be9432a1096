use analysis_core::{AnalysisError, BenchmarkResult, ReturnSeries};
use chrono::{Datelike, NaiveDate};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};

/// Equal-weighted benchmark aggregator. Daily log returns are averaged across
/// the benchmark tickers, then rolled up to calendar-month periods whose keys
/// are the last observation date of each month.
pub struct Benchmark {
    returns: ReturnSeries,
    tickers: Vec<String>,
}

impl Benchmark {
    pub fn new(returns: ReturnSeries, tickers: Vec<String>) -> Self {
        Self { returns, tickers }
    }

    pub fn form_returns(&self) -> Result<BenchmarkResult, AnalysisError> {
        // Duplicates collapse; order is irrelevant once averaged.
        let mut tickers: Vec<&String> = self.tickers.iter().collect();
        tickers.sort();
        tickers.dedup();

        // date -> per-ticker daily log returns observed on that date
        let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for ticker in &tickers {
            let series = self.returns.get(*ticker).ok_or_else(|| {
                AnalysisError::InsufficientData(format!("no return series for {}", ticker))
            })?;
            for &(date, log_return) in series {
                by_date.entry(date).or_default().push(log_return);
            }
        }
        if by_date.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "benchmark produced no observations".to_string(),
            ));
        }

        // Roll daily means up to calendar months; the last observation of each
        // month stamps the period key.
        let mut benchmark_returns = HashMap::new();
        let mut benchmark_cumulative_returns = HashMap::new();
        let mut cumulative = 0.0;
        let mut month_sum = 0.0;
        let mut current_month: Option<(i32, u32)> = None;
        let mut last_date_in_month: Option<NaiveDate> = None;

        let flush =
            |date: NaiveDate, sum: f64, cumulative: &mut f64, returns: &mut HashMap<String, f64>, cumulatives: &mut HashMap<String, f64>| {
                *cumulative += sum;
                let key = date.format("%Y-%m-%d").to_string();
                returns.insert(key.clone(), sum);
                cumulatives.insert(key, *cumulative);
            };

        for (&date, values) in &by_date {
            let month = (date.year(), date.month());
            if current_month.is_some() && current_month != Some(month) {
                flush(
                    last_date_in_month.unwrap(),
                    month_sum,
                    &mut cumulative,
                    &mut benchmark_returns,
                    &mut benchmark_cumulative_returns,
                );
                month_sum = 0.0;
            }
            current_month = Some(month);
            last_date_in_month = Some(date);
            month_sum += values.as_slice().mean();
        }
        flush(
            last_date_in_month.unwrap(),
            month_sum,
            &mut cumulative,
            &mut benchmark_returns,
            &mut benchmark_cumulative_returns,
        );

        Ok(BenchmarkResult {
            benchmark_cumulative_returns,
            benchmark_returns,
        })
    }
}
