// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print status callback.
//
// When a callback URL is configured, every print attempt is reported to it
// from a background task. Delivery problems are logged and never reach the
// print caller.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Body posted to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_name: Option<String>,
}

impl StatusUpdate {
    pub fn success(message: impl Into<String>, job_id: Option<String>, printer: &str) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            job_id,
            printer_name: Some(printer.to_string()),
        }
    }

    pub fn error(message: impl Into<String>, job_id: Option<String>, printer: &str) -> Self {
        Self {
            status: "error",
            ..Self::success(message, job_id, printer)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusNotifier {
    http: reqwest::Client,
    url: Option<String>,
}

impl StatusNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Fire and forget. Must be called from within the actix runtime.
    pub fn notify(&self, update: StatusUpdate) {
        let Some(url) = self.url.clone() else {
            debug!(status = update.status, "no status callback configured");
            return;
        };
        let http = self.http.clone();

        actix_web::rt::spawn(async move {
            let result = http
                .post(&url)
                .timeout(NOTIFY_TIMEOUT)
                .json(&update)
                .send()
                .await
                .and_then(|r| r.error_for_status());
            match result {
                Ok(resp) => info!(%url, status = update.status, code = %resp.status(), "status callback delivered"),
                Err(e) => error!(%url, error = %e, "status callback failed"),
            }
        });
    }
}
