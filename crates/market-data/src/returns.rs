use analysis_core::{PriceMap, ReturnSeries};

/// Natural-log returns per ticker: ln(p_t / p_{t-1}) over consecutive
/// observations, stamped with the later date. Chronological order of the
/// source series is preserved; non-positive prices are skipped.
pub fn calculate_returns(prices: &PriceMap) -> ReturnSeries {
    let mut returns = ReturnSeries::new();

    for (ticker, closes) in prices {
        let series: Vec<_> = closes
            .windows(2)
            .filter_map(|w| {
                let (_, prev) = w[0];
                let (date, curr) = w[1];
                if prev > 0.0 && curr > 0.0 {
                    Some((date, (curr / prev).ln()))
                } else {
                    None
                }
            })
            .collect();
        returns.insert(ticker.clone(), series);
    }

    returns
}
