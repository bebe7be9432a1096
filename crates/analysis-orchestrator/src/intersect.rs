use std::collections::HashMap;

/// Merge two date-keyed series into the joint structure over their shared
/// keys. Each shared date maps to the ordered pair (portfolio value,
/// benchmark value). Keys present in only one input are dropped silently; an
/// empty intersection is a valid outcome. Result order is unspecified.
pub fn intersect_series(
    portfolio: &HashMap<String, f64>,
    benchmark: &HashMap<String, f64>,
) -> HashMap<String, (f64, f64)> {
    portfolio
        .iter()
        .filter_map(|(date, &portfolio_value)| {
            benchmark
                .get(date)
                .map(|&benchmark_value| (date.clone(), (portfolio_value, benchmark_value)))
        })
        .collect()
}
