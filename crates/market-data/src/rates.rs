use analysis_core::RiskFreeRate;
use chrono::NaiveDate;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const FALLBACK_ANNUAL_RATE: f64 = 0.045;

/// Derive the window's risk-free rate from a long-treasury ETF price series.
/// TLT inversely tracks yields: if TLT fell over the window, rates rose.
/// Clamped to [1%, 8%] annual; too little data falls back to 4.5%.
pub fn derive_risk_free_rate(closes: &[(NaiveDate, f64)]) -> RiskFreeRate {
    let annual = match (closes.first(), closes.last()) {
        (Some(&(_, first)), Some(&(_, last))) if closes.len() >= 2 && first > 0.0 => {
            let proxy_return = (last - first) / first;
            (FALLBACK_ANNUAL_RATE - proxy_return * 0.10).clamp(0.01, 0.08)
        }
        _ => FALLBACK_ANNUAL_RATE,
    };

    RiskFreeRate {
        annual,
        daily: annual / TRADING_DAYS_PER_YEAR,
    }
}
