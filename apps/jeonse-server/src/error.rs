//! Error types for the jeonse server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use risk_engine::AnalysisError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("주소 또는 건물명 추출 실패")]
    ExtractionFailed(String),

    #[error("법정동코드 조회 실패")]
    LawdCodeNotFound(String),

    #[error("실거래가 조회 실패")]
    TradeNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Analysis timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::ExtractionFailed(_)
            | ServerError::LawdCodeNotFound(_)
            | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::TradeNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic detail behind the fixed client-facing messages
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServerError::ExtractionFailed(detail)
            | ServerError::LawdCodeNotFound(detail)
            | ServerError::TradeNotFound(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            ServerError::LawdCodeNotFound(_) => "LAWD_CODE_NOT_FOUND",
            ServerError::TradeNotFound(_) => "TRADE_NOT_FOUND",
            ServerError::InvalidRequest(_) => "INVALID_REQUEST",
            ServerError::Upstream(_) => "UPSTREAM_ERROR",
            ServerError::Timeout(_) => "TIMEOUT",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Internal(e) => tracing::error!("Internal error: {}", e),
            other => {
                if let Some(detail) = other.detail() {
                    tracing::info!("{} ({}): {}", other, other.code(), detail);
                }
            }
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code().to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<AnalysisError> for ServerError {
    fn from(err: AnalysisError) -> Self {
        let detail = err.to_string();
        match err {
            AnalysisError::Extraction(_) => ServerError::ExtractionFailed(detail),
            AnalysisError::Lookup(_) => ServerError::LawdCodeNotFound(detail),
            AnalysisError::NoComparableTransaction { .. } => ServerError::TradeNotFound(detail),
            AnalysisError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            AnalysisError::Recognition(_) | AnalysisError::Scoring(_) | AnalysisError::Summary(_) => {
                ServerError::Upstream(detail)
            }
            AnalysisError::Io(_) => ServerError::Internal(detail),
        }
    }
}
