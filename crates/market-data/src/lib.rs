pub mod client;
pub mod rates;
pub mod returns;

pub use client::MarketDataClient;
pub use rates::derive_risk_free_rate;
pub use returns::calculate_returns;
