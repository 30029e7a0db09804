// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP error mapping.
//
// Every failure that reaches a handler is already a classified
// `LabelVisionError`; this module only decides the status code. Bodies are
// always `{"detail": "<message>"}`.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use labelvision_core::LabelVisionError;
use serde_json::json;
use tracing::warn;

#[derive(Debug)]
pub struct ApiError(pub LabelVisionError);

impl From<LabelVisionError> for ApiError {
    fn from(e: LabelVisionError) -> Self {
        Self(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            LabelVisionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LabelVisionError::PrinterNotFound(_) => StatusCode::NOT_FOUND,
            LabelVisionError::VisionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            LabelVisionError::VisionApi(_) => StatusCode::BAD_GATEWAY,
            LabelVisionError::BackendUnavailable
            | LabelVisionError::Spooler(_)
            | LabelVisionError::Enumeration(_)
            | LabelVisionError::Vision(_)
            | LabelVisionError::Config(_)
            | LabelVisionError::Io(_)
            | LabelVisionError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.0.to_string() }))
    }
}

/// `JsonConfig` error handler: any body that is not a JSON object of the
/// expected shape answers 400, oversized bodies 413.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let (status, detail) = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
        }
        _ => (StatusCode::BAD_REQUEST, "Request must be JSON"),
    };
    warn!(path = req.path(), error = %err, "rejected request body");
    let response = HttpResponse::build(status).json(json!({ "detail": detail }));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: LabelVisionError) -> StatusCode {
        ApiError(e).status_code()
    }

    #[test]
    fn taxonomy_maps_deterministically() {
        assert_eq!(status(LabelVisionError::InvalidRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(LabelVisionError::PrinterNotFound("P".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(LabelVisionError::Spooler("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(LabelVisionError::Enumeration("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(LabelVisionError::VisionUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(LabelVisionError::VisionApi("x".into())), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn backend_unavailable_is_never_not_found() {
        assert_eq!(
            status(LabelVisionError::BackendUnavailable),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
