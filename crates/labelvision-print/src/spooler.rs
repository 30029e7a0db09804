// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows print spooler backend.
//
// Job lifecycle per submission:
//   open handle -> StartDocPrinter("RAW") -> StartPage/Write/EndPage
//   -> EndDocPrinter -> ClosePrinter
//
// The printer name is validated by OpenPrinter itself (ERROR_INVALID_PRINTER_NAME).
// EndDocPrinter is attempted even when the transfer fails so no document is
// left open in the spooler, and the handle is closed on every path.

use labelvision_core::error::{LabelVisionError, Result};
use labelvision_core::types::{PrintJob, PrinterBackendKind};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::backend::PrinterBackend;

/// Win32 `ERROR_INVALID_PRINTER_NAME`.
pub const ERROR_INVALID_PRINTER_NAME: u32 = 1801;

/// Spooler datatype that passes bytes through without reinterpretation.
pub const RAW_DATATYPE: &str = "RAW";

/// A failed Win32 call: `GetLastError` code plus its description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (os error {code})")]
pub struct OsError {
    pub code: u32,
    pub message: String,
}

impl OsError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Minimal surface of `winspool.drv` (`*W` entry points).
pub trait SpoolerApi: Send + Sync {
    /// An open printer handle (`HANDLE`).
    type Handle;

    /// Local and connected printers (`EnumPrintersW`).
    fn enum_printers(&self) -> std::result::Result<Vec<String>, OsError>;

    fn open_printer(&self, name: &str) -> std::result::Result<Self::Handle, OsError>;

    /// Begin a document; returns the spooler job id.
    fn start_doc(
        &self,
        handle: &mut Self::Handle,
        doc_name: &str,
        datatype: &str,
    ) -> std::result::Result<u32, OsError>;

    fn start_page(&self, handle: &mut Self::Handle) -> std::result::Result<(), OsError>;

    /// Returns the number of bytes the spooler reports as written.
    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> std::result::Result<usize, OsError>;

    fn end_page(&self, handle: &mut Self::Handle) -> std::result::Result<(), OsError>;

    fn end_doc(&self, handle: &mut Self::Handle) -> std::result::Result<(), OsError>;

    fn close_printer(&self, handle: &mut Self::Handle) -> std::result::Result<(), OsError>;
}

/// Printer handle that is closed when it goes out of scope.
struct OpenPrinter<'a, A: SpoolerApi> {
    api: &'a A,
    handle: A::Handle,
    name: &'a str,
}

impl<'a, A: SpoolerApi> OpenPrinter<'a, A> {
    fn open(api: &'a A, name: &'a str) -> std::result::Result<Self, OsError> {
        let handle = api.open_printer(name)?;
        info!(printer = name, "opened printer handle");
        Ok(Self { api, handle, name })
    }
}

impl<A: SpoolerApi> Drop for OpenPrinter<'_, A> {
    fn drop(&mut self) {
        match self.api.close_printer(&mut self.handle) {
            Ok(()) => debug!(printer = self.name, "closed printer handle"),
            Err(e) => error!(printer = self.name, error = %e, "error closing printer handle"),
        }
    }
}

/// [`PrinterBackend`] over the Windows spooler API.
pub struct SpoolerBackend<A: SpoolerApi> {
    api: A,
}

impl<A: SpoolerApi> SpoolerBackend<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Page-level transfer of the whole payload in one `WritePrinter` call.
    fn transfer(
        &self,
        handle: &mut A::Handle,
        payload: &[u8],
        spooler_job: u32,
    ) -> std::result::Result<(), OsError> {
        self.api.start_page(handle)?;
        let written = self.api.write(handle, payload)?;
        if written != payload.len() {
            // Whether a short WritePrinter ever loses data is not established;
            // keep the job but make the mismatch visible.
            warn!(
                spooler_job,
                written,
                expected = payload.len(),
                "spooler reported a partial write, job kept"
            );
        } else {
            info!(spooler_job, written, "wrote payload to printer");
        }
        self.api.end_page(handle)?;
        Ok(())
    }
}

fn classify_open_error(printer: &str, e: OsError) -> LabelVisionError {
    if e.code == ERROR_INVALID_PRINTER_NAME {
        error!(printer, "printer not found, ensure the name is exact");
        LabelVisionError::PrinterNotFound(printer.to_string())
    } else {
        error!(printer, error = %e, "could not open printer");
        LabelVisionError::Spooler(format!("Could not open printer {printer}: {e}"))
    }
}

impl<A: SpoolerApi> PrinterBackend for SpoolerBackend<A> {
    fn kind(&self) -> PrinterBackendKind {
        PrinterBackendKind::WindowsSpooler
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        let printers = self
            .api
            .enum_printers()
            .map_err(|e| LabelVisionError::Enumeration(e.to_string()))?;
        info!(count = printers.len(), printers = ?printers, "found Windows printers");
        Ok(printers)
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, printer = %job.printer_name))]
    fn submit(&self, job: &PrintJob) -> Result<()> {
        let name = job.printer_name.as_str();
        // OpenPrinterW stops reading at the first NUL, so "Zebra\0x" would
        // open "Zebra".
        if name.contains('\0') {
            error!("printer name contains a NUL byte");
            return Err(LabelVisionError::PrinterNotFound(name.to_string()));
        }
        let mut printer =
            OpenPrinter::open(&self.api, name).map_err(|e| classify_open_error(name, e))?;

        let spooler_job = self
            .api
            .start_doc(&mut printer.handle, &job.job_name, RAW_DATATYPE)
            .map_err(|e| {
                error!(error = %e, "StartDocPrinter failed");
                LabelVisionError::Spooler(format!("Could not start print job on {name}: {e}"))
            })?;
        info!(spooler_job, job_name = %job.job_name, "started spooler job");

        if let Err(e) = self.transfer(&mut printer.handle, &job.payload, spooler_job) {
            error!(spooler_job, error = %e, "error writing data to printer");
            if let Err(cleanup) = self.api.end_doc(&mut printer.handle) {
                debug!(spooler_job, error = %cleanup, "EndDocPrinter after failed write also failed");
            }
            return Err(LabelVisionError::Spooler(format!(
                "Failed to write data to printer {name}: {e}"
            )));
        }

        self.api.end_doc(&mut printer.handle).map_err(|e| {
            error!(spooler_job, error = %e, "EndDocPrinter failed");
            LabelVisionError::Spooler(format!("Could not finish print job on {name}: {e}"))
        })?;

        info!(spooler_job, "spooler job ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimulatedSpooler, SpoolerStep};

    fn job(printer: &str) -> PrintJob {
        PrintJob::new(printer, b"%PDF-1.7 raw bytes".to_vec(), "LabelVision - Shelf".into())
    }

    #[test]
    fn submit_sends_raw_document() {
        let backend = SpoolerBackend::new(SimulatedSpooler::new(&["Zebra"]));
        backend.submit(&job("Zebra")).expect("submit");

        let spooled = backend.api().spooled();
        assert_eq!(spooled.len(), 1);
        assert_eq!(spooled[0].printer, "Zebra");
        assert_eq!(spooled[0].datatype, RAW_DATATYPE);
        assert_eq!(spooled[0].doc_name, "LabelVision - Shelf");
        assert_eq!(spooled[0].data, b"%PDF-1.7 raw bytes");
        assert_eq!(backend.api().open_handles(), 0);
        assert_eq!(backend.api().open_documents(), 0);
    }

    #[test]
    fn invalid_printer_name_is_not_found() {
        let backend = SpoolerBackend::new(SimulatedSpooler::new(&["Zebra"]));
        let err = backend.submit(&job("Nonexistent")).unwrap_err();
        assert!(matches!(err, LabelVisionError::PrinterNotFound(ref n) if n == "Nonexistent"));
        assert_eq!(backend.api().open_handles(), 0);
    }

    #[test]
    fn names_with_embedded_nul_never_reach_a_printer() {
        let backend = SpoolerBackend::new(SimulatedSpooler::new(&["Zebra"]));
        for name in ["Zebra\0junk", "Zebra\0", "\0Zebra"] {
            let err = backend.submit(&job(name)).unwrap_err();
            assert!(
                matches!(err, LabelVisionError::PrinterNotFound(ref n) if n == name),
                "{name:?}: {err}"
            );
        }
        assert!(backend.api().spooled().is_empty());
        assert_eq!(backend.api().open_handles(), 0);
    }

    #[test]
    fn other_open_failures_are_spooler_errors() {
        let api = SimulatedSpooler::new(&["Zebra"]).failing_at(SpoolerStep::Open);
        let backend = SpoolerBackend::new(api);
        assert!(matches!(
            backend.submit(&job("Zebra")),
            Err(LabelVisionError::Spooler(_))
        ));
    }

    #[test]
    fn start_doc_failure_closes_handle() {
        let api = SimulatedSpooler::new(&["Zebra"]).failing_at(SpoolerStep::StartDoc);
        let backend = SpoolerBackend::new(api);
        assert!(matches!(
            backend.submit(&job("Zebra")),
            Err(LabelVisionError::Spooler(_))
        ));
        assert_eq!(backend.api().open_handles(), 0);
        assert_eq!(backend.api().end_doc_calls(), 0);
    }

    #[test]
    fn transfer_failures_still_end_the_document() {
        for step in [SpoolerStep::StartPage, SpoolerStep::Write, SpoolerStep::EndPage] {
            let api = SimulatedSpooler::new(&["Zebra"]).failing_at(step);
            let backend = SpoolerBackend::new(api);

            let err = backend.submit(&job("Zebra")).unwrap_err();
            assert!(matches!(err, LabelVisionError::Spooler(_)), "{step:?}");
            assert!(err.to_string().contains("Failed to write data"), "{step:?}: {err}");
            assert_eq!(backend.api().end_doc_calls(), 1, "{step:?}");
            assert_eq!(backend.api().open_documents(), 0, "{step:?}");
            assert_eq!(backend.api().open_handles(), 0, "{step:?}");
            assert!(backend.api().spooled().is_empty(), "{step:?}");
        }
    }

    #[test]
    fn end_doc_failure_is_a_spooler_error() {
        let api = SimulatedSpooler::new(&["Zebra"]).failing_at(SpoolerStep::EndDoc);
        let backend = SpoolerBackend::new(api);
        assert!(matches!(
            backend.submit(&job("Zebra")),
            Err(LabelVisionError::Spooler(_))
        ));
        assert_eq!(backend.api().open_handles(), 0);
    }

    #[test]
    fn close_failure_after_acceptance_keeps_success() {
        let api = SimulatedSpooler::new(&["Zebra"]).failing_at(SpoolerStep::Close);
        let backend = SpoolerBackend::new(api);
        backend.submit(&job("Zebra")).expect("job was accepted before close");
        assert_eq!(backend.api().spooled().len(), 1);
    }

    #[test]
    fn partial_write_is_a_warning_not_a_failure() {
        let api = SimulatedSpooler::new(&["Zebra"]).with_short_write(4);
        let backend = SpoolerBackend::new(api);
        backend.submit(&job("Zebra")).expect("short write is tolerated");

        let spooled = backend.api().spooled();
        assert_eq!(spooled[0].data, b"%PDF");
        assert_eq!(backend.api().open_handles(), 0);
    }

    #[test]
    fn enumeration_failure_maps_to_enumeration_error() {
        let api = SimulatedSpooler::new(&["Zebra"]).failing_at(SpoolerStep::Enumerate);
        let backend = SpoolerBackend::new(api);
        assert!(matches!(
            backend.list_printers(),
            Err(LabelVisionError::Enumeration(_))
        ));
    }

    #[test]
    fn enumeration_is_not_cached() {
        let backend = SpoolerBackend::new(SimulatedSpooler::new(&["A"]));
        assert_eq!(backend.list_printers().expect("list"), vec!["A"]);
        backend.api().set_printers(&["A", "USB001"]);
        assert_eq!(backend.list_printers().expect("list"), vec!["A", "USB001"]);
    }
}
