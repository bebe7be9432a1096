use analysis_core::AnalysisError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Structural/protocol failure: missing fields, wrong field types,
    /// pattern-failing dates. Surfaced as a plain 400 with no numbered code.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Collaborator failure past validation. Nothing catches these in the
    /// pipeline; they surface as server-level failures here.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Analysis(err) => {
                tracing::error!(error = ?err, "Analysis failure.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal analysis error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
