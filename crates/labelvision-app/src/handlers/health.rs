// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use actix_web::{HttpResponse, web};
use labelvision_core::types::PrinterBackendKind;
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub platform: &'static str,
    pub printer_lib: PrinterBackendKind,
}

/// `GET /api/health`. Always 200, whatever the backend.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    debug!("health check");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        platform: labelvision_core::host_platform(),
        printer_lib: state.enumerator.kind(),
    })
}
