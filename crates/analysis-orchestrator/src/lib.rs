pub mod intersect;
pub mod pipeline;

pub use intersect::intersect_series;
pub use pipeline::{AnalysisRequest, RequestPipeline};
