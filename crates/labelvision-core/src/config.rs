// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Read once at startup from `config.json`. A missing or malformed file never
// prevents startup: the service falls back to built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::Result;

/// File name looked up beside the executable when no override is given.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "LABELVISION_CONFIG";

/// Persistent service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// TCP port for the HTTP server.
    pub port: u16,
    /// Gemini API key; the vision endpoint answers 503 without one.
    pub api_key: Option<String>,
    /// Directory holding the prebuilt web bundle (`index.html` + assets).
    pub web_root: Option<PathBuf>,
    /// Optional URL notified after every print attempt.
    pub status_callback_url: Option<String>,
    /// Upper bound for JSON request bodies (base64 PDFs / images).
    pub max_payload_bytes: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5001,
            api_key: None,
            web_root: None,
            status_callback_url: None,
            max_payload_bytes: 32 * 1024 * 1024,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults.
    ///
    /// Keys absent from the file take their default value.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(crate::LabelVisionError::from)
            .and_then(|raw| serde_json::from_str::<Self>(&raw).map_err(Into::into));

        match parsed {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Apply environment-style overrides.
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BACKEND_HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }

        for key in ["BACKEND_PORT", "PORT"] {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<u16>() {
                    Ok(port) => {
                        self.port = port;
                        break;
                    }
                    Err(_) => warn!(key, value = %raw, "ignoring unparsable port override"),
                }
            }
        }

        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("NEXTJS_STATUS_URL").filter(|u| !u.is_empty()) {
            self.status_callback_url = Some(url);
        }
        if let Some(root) = lookup("LABELVISION_WEB_ROOT").filter(|r| !r.is_empty()) {
            self.web_root = Some(PathBuf::from(root));
        }
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Directory containing the running executable, or the working directory.
pub fn app_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve the config file path: `LABELVISION_CONFIG` or `config.json`
/// beside the executable.
pub fn config_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(p),
        None => app_base_dir().join(CONFIG_FILE_NAME),
    }
}
