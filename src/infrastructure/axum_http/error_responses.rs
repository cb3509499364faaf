use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Failures of the webhook edge itself. Reconciliation failures never show up
/// here; they resolve to absence inside the workflow and the gateway still
/// gets a 200 so it does not retry a payment that already succeeded.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing webhook signature")]
    MissingSignature,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("webhook secret configuration is missing")]
    MissingSecret,
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
