use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use graph::GatewayError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(GatewayError),

    #[error("Failed to fetch {what}")]
    Upstream {
        what: &'static str,
        source: GatewayError,
    },
}

impl AppError {
    pub fn fetching(what: &'static str) -> impl FnOnce(GatewayError) -> Self {
        move |e| {
            if e.is_client_error() {
                AppError::BadRequest(e)
            } else {
                warn!("Failed to fetch {what}: {e}");
                AppError::Upstream { what, source: e }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
