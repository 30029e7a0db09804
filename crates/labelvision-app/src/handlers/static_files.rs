// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Prebuilt web bundle, served for every path the API does not claim.
//
// Unknown paths get `index.html` so the client-side router can take over.

use std::path::{Component, Path, PathBuf};

use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{debug, warn};

use crate::state::{AppState, INDEX_FILE};

const MISSING_BUNDLE: &str = "Web application not found. Please build the frontend.";

/// The file under `root` named by `request_path`, if it exists.
///
/// Only plain path components are accepted, so `..`, absolute and prefixed
/// paths never resolve.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty()
        || !relative.components().all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    let candidate = root.join(relative);
    candidate.is_file().then_some(candidate)
}

pub async fn serve(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return HttpResponse::MethodNotAllowed().finish();
    }

    let target = resolve(&state.web_root, req.path())
        .unwrap_or_else(|| state.web_root.join(INDEX_FILE));

    match tokio::fs::read(&target).await {
        Ok(bytes) => {
            debug!(path = %target.display(), bytes = bytes.len(), "serving bundle file");
            let mime = mime_guess::from_path(&target).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(bytes)
        }
        Err(e) => {
            warn!(path = %target.display(), error = %e, "web bundle not available");
            HttpResponse::NotFound().json(json!({ "error": MISSING_BUNDLE }))
        }
    }
}
