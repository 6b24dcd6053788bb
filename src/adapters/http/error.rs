use crate::application::error::{PipelineError, UploadError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

/// Message returned for every pipeline failure; the cause is only logged.
pub const PIPELINE_FAILURE_MESSAGE: &str = "Couldn't process upload";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Validation(_) => StatusCode::BAD_REQUEST,
            UploadError::Auth(_) => StatusCode::UNAUTHORIZED,
            UploadError::VideoNotFound(_) => StatusCode::NOT_FOUND,
            UploadError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn log_pipeline_failure(err: &PipelineError) {
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    error!(error = %err, causes = ?causes, "upload pipeline failed");
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UploadError::Pipeline(err) => {
                log_pipeline_failure(err);
                PIPELINE_FAILURE_MESSAGE.to_string()
            }
            other => {
                info!(status = status.as_u16(), error = ?other, "upload rejected");
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
