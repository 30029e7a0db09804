// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the LabelVision print broker.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Fixed product tag prefixed to every job name shown in OS print queues.
pub const JOB_NAME_PREFIX: &str = "LabelVision - ";

/// Maximum number of characters taken from the label summary / client job id.
pub const JOB_LABEL_MAX_CHARS: usize = 30;

/// Label used when the request carries neither a summary nor a job id.
const DEFAULT_JOB_LABEL: &str = "Label";

/// Internal identifier for a print job, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which OS print subsystem this process talks to.
///
/// Selected exactly once at startup and never changed afterwards. Serializes
/// as its [`label`](Self::label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterBackendKind {
    /// No print subsystem could be bound.
    None,
    /// Windows print spooler (`winspool.drv`).
    #[serde(rename = "win32")]
    WindowsSpooler,
    /// Common Unix Printing System (`libcups`).
    Cups,
}

impl PrinterBackendKind {
    /// Short library label reported by `/api/health`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::WindowsSpooler => "win32",
            Self::Cups => "cups",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for PrinterBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower-case host OS name as reported by `/api/health`
/// (`windows`, `linux`, `darwin`, ...).
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// A single print request, consumed synchronously by the dispatcher.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: JobId,
    /// Target printer; must match an enumerated name exactly.
    pub printer_name: String,
    /// Decoded, already-final PDF bytes. Never modified before submission.
    pub payload: Vec<u8>,
    /// Display label for OS queue UIs (see [`build_job_name`]).
    pub job_name: String,
    pub created_at: DateTime<Utc>,
}

impl PrintJob {
    pub fn new(printer_name: impl Into<String>, payload: Vec<u8>, job_name: String) -> Self {
        Self {
            id: JobId::new(),
            printer_name: printer_name.into(),
            payload,
            job_name,
            created_at: Utc::now(),
        }
    }

    /// Time since the request was turned into a job.
    pub fn age(&self) -> TimeDelta {
        Utc::now() - self.created_at
    }
}

/// Build the queue display name for a job.
///
/// The summary wins over the client job id; both are trimmed and truncated to
/// [`JOB_LABEL_MAX_CHARS`] characters (not bytes, so multi-byte text never
/// splits a code point).
pub fn build_job_name(label_summary: Option<&str>, client_job_id: Option<&str>) -> String {
    let label = [label_summary, client_job_id]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_JOB_LABEL);

    let truncated: String = label.chars().take(JOB_LABEL_MAX_CHARS).collect();
    format!("{JOB_NAME_PREFIX}{truncated}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_name_prefers_summary() {
        let name = build_job_name(Some("Kitchen Drawer"), Some("job-17"));
        assert_eq!(name, "LabelVision - Kitchen Drawer");
    }

    #[test]
    fn job_name_falls_back_to_job_id_then_default() {
        assert_eq!(build_job_name(None, Some("job-17")), "LabelVision - job-17");
        assert_eq!(build_job_name(Some("   "), None), "LabelVision - Label");
        assert_eq!(build_job_name(None, None), "LabelVision - Label");
    }

    #[test]
    fn job_name_truncates_by_characters() {
        let long = "é".repeat(50);
        let name = build_job_name(Some(&long), None);
        let label = name.strip_prefix(JOB_NAME_PREFIX).expect("prefix");
        assert_eq!(label.chars().count(), JOB_LABEL_MAX_CHARS);
    }

    #[test]
    fn backend_kind_labels() {
        assert_eq!(PrinterBackendKind::None.label(), "none");
        assert_eq!(PrinterBackendKind::WindowsSpooler.label(), "win32");
        assert_eq!(PrinterBackendKind::Cups.label(), "cups");
        assert!(!PrinterBackendKind::None.is_available());
        assert!(PrinterBackendKind::Cups.is_available());
    }

    #[test]
    fn backend_kind_serializes_as_its_label() {
        for kind in [
            PrinterBackendKind::None,
            PrinterBackendKind::WindowsSpooler,
            PrinterBackendKind::Cups,
        ] {
            assert_eq!(serde_json::to_value(kind).expect("serialize"), kind.label());
        }
    }

    #[test]
    fn job_age_counts_from_creation() {
        let mut job = PrintJob::new("P", vec![1], "a".into());
        assert!(job.age() >= TimeDelta::zero());

        job.created_at -= TimeDelta::seconds(5);
        assert!(job.age() >= TimeDelta::seconds(5));
    }

    #[test]
    fn print_jobs_get_distinct_ids() {
        let a = PrintJob::new("P", vec![1], "a".into());
        let b = PrintJob::new("P", vec![1], "b".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn host_platform_is_lowercase() {
        let p = host_platform();
        assert_eq!(p, p.to_ascii_lowercase());
        assert_ne!(p, "macos");
    }
}
