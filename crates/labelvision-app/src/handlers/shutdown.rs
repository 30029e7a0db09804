// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

/// `POST /api/shutdown`. Graceful stop; in-flight requests finish first.
pub async fn shutdown(state: web::Data<AppState>) -> HttpResponse {
    let Some(handle) = state.server_handle().cloned() else {
        error!("shutdown requested but no server handle is registered");
        return HttpResponse::InternalServerError()
            .json(json!({ "detail": "Shutdown not available." }));
    };

    info!("shutdown requested via API");
    // Awaiting here would wait on this very request.
    actix_web::rt::spawn(async move {
        handle.stop(true).await;
    });
    HttpResponse::Ok().json(json!({ "message": "Server shutting down..." }))
}
