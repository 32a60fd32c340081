//! API handlers for the jeonse server
//!
//! - `GET /health`
//! - `POST /api/analyze` (multipart: `file`, `area`, `jeonse_price`)

use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use shared_types::AnalysisReport;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "jeonse-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fields of the analyze form after validation
#[derive(Debug)]
pub struct AnalyzeForm {
    pub file: Vec<u8>,
    pub file_name: Option<String>,
    pub area: f64,
    pub jeonse_price: i64,
}

impl AnalyzeForm {
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ServerError> {
        let mut file = None;
        let mut file_name = None;
        let mut area = None;
        let mut jeonse_price = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Malformed form: {}", e)))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    file_name = field.file_name().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ServerError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                    file = Some(bytes.to_vec());
                }
                Some("area") => {
                    let text = read_text(field).await?;
                    area = Some(text.trim().parse::<f64>().map_err(|_| {
                        ServerError::InvalidRequest(format!("area must be a number, got '{}'", text))
                    })?);
                }
                Some("jeonse_price") => {
                    let text = read_text(field).await?;
                    jeonse_price = Some(text.trim().parse::<i64>().map_err(|_| {
                        ServerError::InvalidRequest(format!(
                            "jeonse_price must be an integer, got '{}'",
                            text
                        ))
                    })?);
                }
                _ => {}
            }
        }

        Ok(Self {
            file: file.ok_or_else(|| missing("file"))?,
            file_name,
            area: area.ok_or_else(|| missing("area"))?,
            jeonse_price: jeonse_price.ok_or_else(|| missing("jeonse_price"))?,
        })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ServerError> {
    field
        .text()
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("Failed to read form field: {}", e)))
}

fn missing(name: &str) -> ServerError {
    ServerError::InvalidRequest(format!("Missing form field '{}'", name))
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, ServerError> {
    let form = AnalyzeForm::from_multipart(&mut multipart).await?;
    info!(
        "Analyze request: file={}, {} bytes, area={}, jeonse_price={}",
        form.file_name.as_deref().unwrap_or("<unnamed>"),
        form.file.len(),
        form.area,
        form.jeonse_price
    );

    let pipeline = state.pipeline.clone();
    let AnalyzeForm {
        file,
        area,
        jeonse_price,
        ..
    } = form;

    // The blocking task keeps running after a timeout; its scratch file is
    // removed when it finishes.
    let result = tokio::time::timeout(
        Duration::from_millis(state.timeout_ms),
        tokio::task::spawn_blocking(move || pipeline.analyze_bytes(&file, area, jeonse_price)),
    )
    .await;

    match result {
        Ok(Ok(Ok(report))) => {
            info!(
                "Analysis complete: {} ({}), score {}",
                report.address, report.building, report.risk_score
            );
            Ok(Json(report))
        }
        Ok(Ok(Err(e))) => {
            warn!("Analysis failed: {}", e);
            Err(ServerError::from(e))
        }
        Ok(Err(join_error)) => Err(ServerError::Internal(format!(
            "Analysis task panicked: {}",
            join_error
        ))),
        Err(_timeout) => {
            warn!("Analysis exceeded {}ms", state.timeout_ms);
            Err(ServerError::Timeout(state.timeout_ms))
        }
    }
}
