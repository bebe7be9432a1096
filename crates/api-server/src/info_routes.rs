use analysis_core::{AnalysisError, AnalysisResponse, Frequency};
use analysis_orchestrator::AnalysisRequest;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use serde_json::Value;
use validation::is_valid_date_format;

use crate::{error::AppError, AppState};

lazy_static! {
    static ref TEST_FIXTURE: Value =
        serde_json::from_str(include_str!("../fixtures/integration_sample.json"))
            .expect("integration fixture is valid JSON");
}

pub fn info_routes() -> Router<AppState> {
    Router::new()
        .route("/api/info", post(post_info))
        .route("/api/test", get(get_test))
}

/// # POST /api/info
/// Runs the full analysis flow. Structural failures are 400s; domain
/// rejections and reports both come back as HTTP 200 payloads.
async fn post_info(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = parse_request(&body)?;
    let response = state.pipeline.run(request).await?;
    Ok(Json(response))
}

/// # GET /api/test
/// Static fixture payload for client-side integration testing.
async fn get_test() -> Json<Value> {
    Json(TEST_FIXTURE.clone())
}

/// Pull a structurally valid `AnalysisRequest` out of the raw JSON body.
/// Every failure in here is the one generic bad-request class; numbered
/// error codes are reserved for domain validity, which runs later.
fn parse_request(body: &Value) -> Result<AnalysisRequest, AppError> {
    let start_raw = string_field(body, "start_date")?;
    let end_raw = string_field(body, "end_date")?;
    if !is_valid_date_format(start_raw) {
        return Err(AppError::BadRequest(format!(
            "start_date '{}' does not match YYYY-M-D",
            start_raw
        )));
    }
    if !is_valid_date_format(end_raw) {
        return Err(AppError::BadRequest(format!(
            "end_date '{}' does not match YYYY-M-D",
            end_raw
        )));
    }

    let assets = body
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::BadRequest("assets must be an array of tickers".to_string()))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::BadRequest("assets must contain only strings".to_string()))
        })
        .collect::<Result<Vec<String>, AppError>>()?;

    // A single benchmark ticker normalizes into a one-element list.
    let benchmark = match body.get("benchmark") {
        Some(Value::String(ticker)) => vec![ticker.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    AppError::BadRequest("benchmark must contain only strings".to_string())
                })
            })
            .collect::<Result<Vec<String>, AppError>>()?,
        _ => {
            return Err(AppError::BadRequest(
                "benchmark must be a ticker or an array of tickers".to_string(),
            ))
        }
    };

    let frequency = body
        .get("frequency")
        .and_then(Value::as_str)
        .map(Frequency::from_wire)
        .ok_or_else(|| AppError::BadRequest("frequency must be a string".to_string()))?;

    let transaction_costs = body
        .get("transaction_costs")
        .and_then(Value::as_u64)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| AppError::BadRequest("transaction_costs must be 0 or 1".to_string()))?;

    // The pattern gate has no month-length knowledge, so a string like
    // 2021-02-30 reaches calendar parsing and fails here as a server-level
    // error rather than a 400.
    let start = parse_calendar_date(start_raw)?;
    let end = parse_calendar_date(end_raw)?;

    Ok(AnalysisRequest {
        assets,
        benchmark,
        start,
        end,
        frequency,
        transaction_costs,
    })
}

fn string_field<'a>(body: &'a Value, field: &str) -> Result<&'a str, AppError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a string", field)))
}

fn parse_calendar_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AnalysisError::InvalidData(format!("unparseable calendar date: {}", raw)).into())
}
