use analysis_core::{
    AnalysisError, Frequency, OptimizationResult, ReturnSeries, RiskFreeRate, WeightEntry,
};
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

use crate::periods::period_end_indices;

/// Cost charged on turnover at each rebalance when transaction costs are on:
/// 10 bps on the sum of absolute weight changes.
const TRANSACTION_COST_RATE: f64 = 0.001;

/// Per-period tangency optimizer over a rebalancing schedule.
pub struct Portfolio {
    start: NaiveDate,
    end: NaiveDate,
    returns: ReturnSeries,
    rates: RiskFreeRate,
    frequency: Frequency,
    transaction_costs: u8,
}

impl Portfolio {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        returns: ReturnSeries,
        rates: RiskFreeRate,
        frequency: Frequency,
        transaction_costs: u8,
    ) -> Self {
        Self {
            start,
            end,
            returns,
            rates,
            frequency,
            transaction_costs,
        }
    }

    /// Solve weights per rebalancing period and form the dated return series.
    ///
    /// Weights are tangency weights from the expanding window of observations
    /// up to each period end, normalized so absolute weights sum to 1. Signs
    /// are preserved, so short positions are allowed. Periodic returns are the
    /// weighted sums of each period's log returns; cumulative returns are
    /// their running sums.
    pub fn optimize_portfolio(&self) -> Result<OptimizationResult, AnalysisError> {
        let mut tickers: Vec<String> = self.returns.keys().cloned().collect();
        tickers.sort();
        if tickers.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "no asset return series".to_string(),
            ));
        }

        let (dates, matrix) = self.aligned_matrix(&tickers)?;
        let ends = period_end_indices(&dates, self.start, self.frequency.months_per_period());
        if ends.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no rebalancing periods between {} and {}",
                self.start, self.end
            )));
        }

        let n_assets = tickers.len();
        let mut cumulative_returns = HashMap::new();
        let mut periodic_returns = HashMap::new();
        let mut optimized_weights = HashMap::new();

        let mut prev_weights = DVector::zeros(n_assets);
        let mut cumulative = 0.0;
        let mut period_start = 0usize;

        for &end_row in &ends {
            let window = matrix.rows(0, end_row + 1);
            let weights = tangency_weights(&window.into_owned(), self.rates.daily);

            // Sum of each asset's log returns across the period's rows.
            let mut period_sums = DVector::zeros(n_assets);
            for row in period_start..=end_row {
                for col in 0..n_assets {
                    period_sums[col] += matrix[(row, col)];
                }
            }

            let mut periodic = weights.dot(&period_sums);
            if self.transaction_costs != 0 {
                let turnover: f64 = (&weights - &prev_weights).iter().map(|w| w.abs()).sum();
                periodic -= TRANSACTION_COST_RATE * turnover;
            }
            cumulative += periodic;

            let key = dates[end_row].format("%Y-%m-%d").to_string();
            periodic_returns.insert(key.clone(), periodic);
            cumulative_returns.insert(key.clone(), cumulative);
            optimized_weights.insert(
                key,
                tickers
                    .iter()
                    .zip(weights.iter())
                    .map(|(ticker, &w)| {
                        WeightEntry(ticker.clone(), w, format!("{:.3}%", w * 100.0))
                    })
                    .collect(),
            );

            prev_weights = weights;
            period_start = end_row + 1;
        }

        tracing::debug!(
            "Optimized {} assets over {} periods",
            n_assets,
            ends.len()
        );

        Ok(OptimizationResult {
            cumulative_returns,
            periodic_returns,
            optimized_weights,
        })
    }

    /// Align all tickers on their shared observation dates and build the
    /// returns matrix (rows = dates ascending, columns = sorted tickers).
    fn aligned_matrix(
        &self,
        tickers: &[String],
    ) -> Result<(Vec<NaiveDate>, DMatrix<f64>), AnalysisError> {
        let lookups: Vec<HashMap<NaiveDate, f64>> = tickers
            .iter()
            .map(|t| self.returns[t].iter().cloned().collect())
            .collect();

        let mut dates: Vec<NaiveDate> = self.returns[&tickers[0]]
            .iter()
            .map(|&(d, _)| d)
            .filter(|d| lookups.iter().all(|l| l.contains_key(d)))
            .collect();
        dates.sort_unstable();
        dates.dedup();

        if dates.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "only {} shared return observations across {} assets",
                dates.len(),
                tickers.len()
            )));
        }

        let matrix = DMatrix::from_fn(dates.len(), tickers.len(), |row, col| {
            lookups[col][&dates[row]]
        });
        Ok((dates, matrix))
    }
}

/// Tangency weights w ∝ Σ⁻¹(μ − rf·1), normalized to unit absolute sum.
/// Degenerate windows (too few rows, singular covariance, vanishing solution)
/// fall back to equal weights.
fn tangency_weights(window: &DMatrix<f64>, rf_daily: f64) -> DVector<f64> {
    let n_assets = window.ncols();
    let n_obs = window.nrows();
    let equal = DVector::from_element(n_assets, 1.0 / n_assets as f64);
    if n_obs < 2 {
        return equal;
    }

    let means = window.row_mean().transpose();
    let mut covariance = DMatrix::zeros(n_assets, n_assets);
    for row in 0..n_obs {
        let deviation = window.row(row).transpose() - &means;
        covariance += &deviation * deviation.transpose();
    }
    covariance /= (n_obs - 1) as f64;

    let excess = means.map(|m| m - rf_daily);
    let solution = match covariance.lu().solve(&excess) {
        Some(s) => s,
        None => {
            tracing::debug!("Singular covariance window, falling back to equal weights");
            return equal;
        }
    };

    let abs_sum: f64 = solution.iter().map(|w| w.abs()).sum();
    if abs_sum < 1e-12 {
        return equal;
    }
    solution / abs_sum
}
