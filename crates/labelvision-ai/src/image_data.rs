// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image validation and MIME detection for vision requests.

use image::ImageFormat;
use labelvision_core::error::{LabelVisionError, Result};
use tracing::{info, warn};

const INVALID_IMAGE: &str = "Invalid or unsupported image data";

/// Decoded image bytes that are known to be a readable image.
#[derive(Debug, Clone)]
pub struct LabelImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl LabelImage {
    /// Validate `bytes` by sniffing the format and fully decoding once.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|_| LabelVisionError::InvalidRequest(INVALID_IMAGE.into()))?;

        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            warn!(?format, error = %e, "image failed to decode");
            LabelVisionError::InvalidRequest(INVALID_IMAGE.into())
        })?;

        info!(
            bytes = bytes.len(),
            ?format,
            width = decoded.width(),
            height = decoded.height(),
            "decoded image for vision request"
        );
        Ok(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type announced to the vision API.
    pub fn mime_type(&self) -> &'static str {
        mime_for(self.format)
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        other => {
            warn!(format = ?other, "unusual image format, sending as image/jpeg");
            "image/jpeg"
        }
    }
}
