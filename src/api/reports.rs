//! Report endpoints: kick off generation, poll status, download the CSV.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::AppError;
use crate::export::records_to_csv;
use crate::orchestration::{normalize_addresses, report_key};
use crate::store::ReportStatus;

const REPORT_FILENAME: &str = "thorchain-report.csv";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub wallets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub key: String,
    pub status: String,
}

/// Start (or restart) report generation for a wallet set. Returns the
/// report key immediately; generation runs in the background.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let wallets = normalize_addresses(&request.wallets)?;
    let key = report_key(&wallets);
    info!(key, wallets = wallets.len(), "report generation requested");

    let runner = state.runner.clone();
    let task_key = key.clone();
    tokio::spawn(async move {
        runner.run(&task_key, &wallets).await;
    });

    Ok(Json(GenerateResponse {
        key,
        status: ReportStatus::Generating.as_str().to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub key: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn status(
    Query(params): Query<KeyQuery>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, AppError> {
    let (status, error) = state
        .repo
        .report_status(&params.key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown report: {}", params.key)))?;

    Ok(Json(StatusResponse {
        key: params.key,
        status: status.as_str().to_string(),
        error,
    }))
}

/// Download a finished report as a CoinTracking CSV attachment.
pub async fn report(
    Query(params): Query<KeyQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let (status, error) = state
        .repo
        .report_status(&params.key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown report: {}", params.key)))?;

    match status {
        ReportStatus::Ready => {}
        ReportStatus::Generating => {
            return Err(AppError::BadRequest("report is still generating".to_string()))
        }
        ReportStatus::Failed => {
            return Err(AppError::BadRequest(format!(
                "report generation failed: {}",
                error.unwrap_or_default()
            )))
        }
    }

    let records = state.repo.load_records(&params.key).await?;
    let csv = records_to_csv(&records).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub key: String,
    pub cleared: bool,
}

pub async fn clear(
    Query(params): Query<KeyQuery>,
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, AppError> {
    let cleared = state.repo.clear_report(&params.key).await?;
    info!(key = params.key, cleared, "report cleared");
    Ok(Json(ClearResponse {
        key: params.key,
        cleared,
    }))
}
