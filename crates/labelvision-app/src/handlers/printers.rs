// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use actix_web::{HttpResponse, web};
use labelvision_core::LabelVisionError;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/printers`.
///
/// A missing print subsystem is a 500. A failed query against a present one
/// degrades to an empty list so the UI stays usable.
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    info!("printer list requested");
    let enumerator = state.enumerator.clone();

    let result = match web::block(move || enumerator.list_printers()).await {
        Ok(result) => result,
        Err(e) => Err(LabelVisionError::Enumeration(e.to_string())),
    };

    match result {
        Ok(printers) => Ok(HttpResponse::Ok().json(printers)),
        Err(LabelVisionError::Enumeration(detail)) => {
            warn!(%detail, "printer enumeration failed, returning an empty list");
            Ok(HttpResponse::Ok().json(Vec::<String>::new()))
        }
        Err(e) => {
            warn!(error = %e, "printer list unavailable");
            Err(e.into())
        }
    }
}
