// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `POST /api/process-image-for-label`.

use actix_web::{HttpResponse, web};
use labelvision_ai::LabelImage;
use labelvision_core::LabelVisionError;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::ApiError;
use crate::payload::{decode_base64, non_empty};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub image_data: Option<String>,
}

/// The body is taken as a `Result` so an unconfigured service answers 503
/// before the body is judged.
pub async fn process_image(
    state: web::Data<AppState>,
    body: Result<web::Json<ImageRequest>, actix_web::Error>,
) -> Result<HttpResponse, actix_web::Error> {
    info!("image processing requested");

    let Some(client) = state.vision.as_ref() else {
        error!("image processing requested but no API key is configured");
        return Err(ApiError(LabelVisionError::VisionUnavailable).into());
    };

    let encoded = non_empty(body?.into_inner().image_data).ok_or_else(|| {
        ApiError(LabelVisionError::InvalidRequest(
            "Missing 'imageData' (Base64) in request body".into(),
        ))
    })?;

    let bytes = decode_base64("imageData", &encoded).map_err(ApiError)?;
    let image = LabelImage::from_bytes(bytes).map_err(ApiError)?;
    let analysis = client.analyze(&image).await.map_err(ApiError)?;

    Ok(HttpResponse::Ok().json(analysis))
}
