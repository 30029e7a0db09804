// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS backend (Linux / macOS).
//
// Job lifecycle per submission:
//   1. connect to the CUPS daemon (scoped to this call)
//   2. confirm the printer is in a freshly fetched destination list
//   3. write the payload unmodified to a unique spool file
//   4. hand the file to the queue with `cupsPrintFile2`
//   5. drop the spool file and the connection, whatever happened above
//
// The libcups calls themselves sit behind `CupsApi` so the state machine can
// be driven by a simulated daemon in tests.

use std::path::{Path, PathBuf};

use labelvision_core::error::{LabelVisionError, Result};
use labelvision_core::types::{PrintJob, PrinterBackendKind};
use tracing::{debug, error, info, instrument};

use crate::backend::PrinterBackend;
use crate::spool::SpoolFile;

/// Minimal surface of libcups needed for listing and printing.
///
/// Errors are plain messages; classification into the service taxonomy
/// happens in [`CupsBackend`].
pub trait CupsApi: Send + Sync {
    /// An open connection to the daemon (`http_t *` for libcups).
    type Connection;

    /// Open a connection. Fails when the daemon is unreachable.
    fn connect(&self) -> std::result::Result<Self::Connection, String>;

    /// Names of the destinations known to the daemon.
    fn printers(&self, conn: &mut Self::Connection) -> std::result::Result<Vec<String>, String>;

    /// Queue `path` on `printer`. Returns the CUPS job id.
    fn print_file(
        &self,
        conn: &mut Self::Connection,
        printer: &str,
        path: &Path,
        title: &str,
    ) -> std::result::Result<i32, String>;

    /// Close a connection obtained from [`connect`](Self::connect).
    fn disconnect(&self, conn: &mut Self::Connection);
}

/// Connection that is closed when it goes out of scope.
struct Session<'a, A: CupsApi> {
    api: &'a A,
    conn: A::Connection,
}

impl<'a, A: CupsApi> Session<'a, A> {
    fn open(api: &'a A) -> std::result::Result<Self, String> {
        let conn = api.connect()?;
        debug!("CUPS connection opened");
        Ok(Self { api, conn })
    }
}

impl<A: CupsApi> Drop for Session<'_, A> {
    fn drop(&mut self) {
        self.api.disconnect(&mut self.conn);
        debug!("CUPS connection closed");
    }
}

/// [`PrinterBackend`] over a CUPS client library.
pub struct CupsBackend<A: CupsApi> {
    api: A,
    spool_dir: PathBuf,
}

impl<A: CupsApi> CupsBackend<A> {
    /// Backend spooling into the OS temp directory.
    pub fn new(api: A) -> Self {
        Self::with_spool_dir(api, std::env::temp_dir())
    }

    pub fn with_spool_dir(api: A, spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            spool_dir: spool_dir.into(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: CupsApi> PrinterBackend for CupsBackend<A> {
    fn kind(&self) -> PrinterBackendKind {
        PrinterBackendKind::Cups
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        let mut session = Session::open(&self.api).map_err(|e| {
            LabelVisionError::Enumeration(format!("CUPS connection error (is CUPS running?): {e}"))
        })?;
        let printers = self
            .api
            .printers(&mut session.conn)
            .map_err(LabelVisionError::Enumeration)?;
        info!(count = printers.len(), printers = ?printers, "found CUPS printers");
        Ok(printers)
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, printer = %job.printer_name))]
    fn submit(&self, job: &PrintJob) -> Result<()> {
        let mut session = Session::open(&self.api).map_err(|e| {
            error!(error = %e, "cannot reach CUPS");
            LabelVisionError::Spooler(format!("cannot connect to CUPS: {e}"))
        })?;

        let printers = self
            .api
            .printers(&mut session.conn)
            .map_err(|e| LabelVisionError::Spooler(format!("cannot list CUPS printers: {e}")))?;
        if !printers.iter().any(|p| p == &job.printer_name) {
            error!(available = ?printers, "CUPS printer not found");
            return Err(LabelVisionError::PrinterNotFound(job.printer_name.clone()));
        }

        let spool = SpoolFile::create_in(&self.spool_dir, &job.payload).map_err(|e| {
            LabelVisionError::Spooler(format!("could not write spool file: {e}"))
        })?;

        info!(job_name = %job.job_name, "sending job to CUPS");
        let cups_job = self
            .api
            .print_file(&mut session.conn, &job.printer_name, spool.path(), &job.job_name)
            .map_err(|e| {
                error!(error = %e, "cupsPrintFile2 failed");
                LabelVisionError::Spooler(format!(
                    "CUPS job submission failed for {}: {e}",
                    job.printer_name
                ))
            })?;

        info!(cups_job, "CUPS job queued");
        Ok(())
    }
}
