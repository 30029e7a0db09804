// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `POST /api/print`.

use actix_web::{HttpResponse, web};
use labelvision_core::LabelVisionError;
use labelvision_core::types::{PrintJob, build_job_name};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::ApiError;
use crate::payload::{decode_base64, missing_fields, non_empty};
use crate::services::notifier::StatusUpdate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    pub pdf_data: Option<String>,
    pub printer_name: Option<String>,
    pub label_summary: Option<String>,
    /// Client-side identifier; clients send strings or numbers.
    pub job_id: Option<Value>,
}

fn client_job_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn print(
    state: web::Data<AppState>,
    body: web::Json<PrintRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    info!("print request received");

    let (pdf_data, printer_name) =
        match (non_empty(request.pdf_data), non_empty(request.printer_name)) {
            (Some(data), Some(name)) => (data, name),
            (data, name) => {
                let mut missing = Vec::new();
                if data.is_none() {
                    missing.push("pdfData");
                }
                if name.is_none() {
                    missing.push("printerName");
                }
                let err = missing_fields(&missing);
                error!(detail = %err, "rejected print request");
                return Err(err.into());
            }
        };

    let payload = decode_base64("pdfData", &pdf_data).map_err(|e| {
        error!(detail = %e, "rejected print request");
        ApiError::from(e)
    })?;
    info!(bytes = payload.len(), "decoded PDF payload");

    let job_id = client_job_id(request.job_id.as_ref());
    let job_name = build_job_name(request.label_summary.as_deref(), job_id.as_deref());
    let job = PrintJob::new(printer_name.clone(), payload, job_name);

    let dispatcher = state.dispatcher.clone();
    let outcome = match web::block(move || dispatcher.submit(&job)).await {
        Ok(outcome) => outcome,
        Err(e) => Err(LabelVisionError::Spooler(e.to_string())),
    };

    match outcome {
        Ok(()) => {
            let message = format!("Print job sent successfully to {printer_name}");
            state
                .notifier
                .notify(StatusUpdate::success(message.clone(), job_id, &printer_name));
            Ok(HttpResponse::Ok().json(json!({ "message": message })))
        }
        Err(e) => {
            state
                .notifier
                .notify(StatusUpdate::error(e.to_string(), job_id, &printer_name));
            Err(e.into())
        }
    }
}
