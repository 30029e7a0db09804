// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared application state handed to every handler.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use actix_web::dev::ServerHandle;
use labelvision_ai::VisionClient;
use labelvision_core::AppConfig;
use labelvision_core::config::app_base_dir;
use labelvision_print::{PrintDispatcher, PrinterBackend, PrinterEnumerator};
use tracing::{error, info, warn};

use crate::services::notifier::StatusNotifier;

/// Bundle directory used when `web_root` is not configured.
pub const DEFAULT_WEB_DIR: &str = "web";

pub const INDEX_FILE: &str = "index.html";

pub struct AppState {
    pub enumerator: PrinterEnumerator,
    pub dispatcher: PrintDispatcher,
    /// `None` when no API key is configured.
    pub vision: Option<VisionClient>,
    pub notifier: StatusNotifier,
    pub web_root: PathBuf,
    server: Arc<OnceLock<ServerHandle>>,
}

impl AppState {
    /// Wire the components around an already-selected backend.
    pub fn new(backend: Arc<dyn PrinterBackend>, config: &AppConfig) -> Self {
        let vision = config.api_key().and_then(|key| match VisionClient::new(key) {
            Ok(client) => Some(client),
            Err(e) => {
                error!(error = %e, "vision client could not be created");
                None
            }
        });

        Self {
            enumerator: PrinterEnumerator::new(Arc::clone(&backend)),
            dispatcher: PrintDispatcher::new(backend),
            vision,
            notifier: StatusNotifier::new(config.status_callback_url.clone()),
            web_root: config
                .web_root
                .clone()
                .unwrap_or_else(|| app_base_dir().join(DEFAULT_WEB_DIR)),
            server: Arc::default(),
        }
    }

    /// Record the running server so `/api/shutdown` can stop it.
    pub fn register_server(&self, handle: ServerHandle) {
        if self.server.set(handle).is_err() {
            warn!("server handle already registered");
        }
    }

    pub fn server_handle(&self) -> Option<&ServerHandle> {
        self.server.get()
    }

    /// Non-fatal configuration problems, reported once at startup.
    pub fn log_startup_warnings(&self) {
        info!(
            backend = %self.enumerator.kind(),
            platform = labelvision_core::host_platform(),
            "print subsystem selected"
        );
        if !self.enumerator.kind().is_available() {
            warn!("no print subsystem available, /api/printers and /api/print will answer 500");
        }
        if self.vision.is_none() {
            warn!("GEMINI_API_KEY not set, image processing is disabled");
        }
        if !self.notifier.is_enabled() {
            info!("status callback disabled");
        }
        if !self.web_root.is_dir() {
            warn!(web_root = %self.web_root.display(), "web bundle directory not found, only the API is served");
        } else if !self.web_root.join(INDEX_FILE).is_file() {
            warn!(web_root = %self.web_root.display(), "index.html missing from web bundle");
        }
    }
}
