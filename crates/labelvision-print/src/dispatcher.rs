// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job dispatch.
//
// The dispatcher owns no platform logic of its own. It refuses jobs up front
// when no backend is bound, records an integrity digest of the payload, and
// hands the job to the backend's lifecycle.

use std::sync::Arc;

use labelvision_core::error::{LabelVisionError, Result};
use labelvision_core::types::{PrintJob, PrinterBackendKind};
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument};

use crate::backend::PrinterBackend;

/// Submits one [`PrintJob`] at a time to the selected backend.
///
/// Calls block until the OS spooler accepts (or rejects) the job. There is no
/// timeout: a wedged spooler blocks the calling thread. Concurrent calls share
/// no mutable state.
#[derive(Clone)]
pub struct PrintDispatcher {
    backend: Arc<dyn PrinterBackend>,
}

impl PrintDispatcher {
    pub fn new(backend: Arc<dyn PrinterBackend>) -> Self {
        Self { backend }
    }

    pub fn kind(&self) -> PrinterBackendKind {
        self.backend.kind()
    }

    /// Send `job` to its printer.
    ///
    /// `Ok(())` means the job entered the OS print queue. It says nothing
    /// about whether paper came out.
    #[instrument(skip(self, job), fields(job_id = %job.id, printer = %job.printer_name, backend = %self.kind()))]
    pub fn submit(&self, job: &PrintJob) -> Result<()> {
        if !self.kind().is_available() {
            error!("print requested but no print subsystem is bound");
            return Err(LabelVisionError::BackendUnavailable);
        }

        info!(
            job_name = %job.job_name,
            bytes = job.payload.len(),
            sha256 = %payload_digest(&job.payload),
            "dispatching print job"
        );

        match self.backend.submit(job) {
            Ok(()) => {
                info!(
                    elapsed_ms = job.age().num_milliseconds(),
                    "print job accepted by the OS queue"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "print job failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for PrintDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintDispatcher")
            .field("backend", &self.kind())
            .finish()
    }
}

/// Hex SHA-256 of the payload bytes.
pub fn payload_digest(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}
