// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for LabelVision.
//
// The `Display` text of every variant is what the HTTP layer returns as the
// `detail` string, so messages stay human-readable and never embed raw
// platform diagnostics beyond a short description.

use thiserror::Error;

/// Top-level error type for all LabelVision operations.
#[derive(Debug, Error)]
pub enum LabelVisionError {
    // -- Print errors --
    /// No usable print subsystem on this host (library missing or platform
    /// unsupported). Permanent until the process restarts.
    #[error("Printing library not available or platform not supported.")]
    BackendUnavailable,

    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Spooler/daemon failure while acquiring, starting, or writing a job.
    #[error("Error during printing process: {0}")]
    Spooler(String),

    #[error("Failed to retrieve printers: {0}")]
    Enumeration(String),

    // -- Request errors --
    #[error("{0}")]
    InvalidRequest(String),

    // -- Vision collaborator --
    #[error("AI service not configured. Check GEMINI_API_KEY.")]
    VisionUnavailable,

    #[error("AI service API error: {0}")]
    VisionApi(String),

    #[error("Failed to process image with AI: {0}")]
    Vision(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelVisionError>;
