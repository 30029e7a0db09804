// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated CUPS daemon and Windows spooler for tests.
//
// Both count the handles they hand out so tests can assert that every
// submission path releases what it acquired, and both can be told to fail at
// any single step of the job lifecycle.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::cups::CupsApi;
use crate::spooler::{ERROR_INVALID_PRINTER_NAME, OsError, SpoolerApi};

/// Windows `ERROR_ACCESS_DENIED`.
const ERROR_ACCESS_DENIED: u32 = 5;

/// Windows `ERROR_NOT_READY`.
const ERROR_NOT_READY: u32 = 21;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// CUPS
// ---------------------------------------------------------------------------

/// Step of the CUPS lifecycle at which [`SimulatedCups`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CupsStep {
    Connect,
    ListPrinters,
    PrintFile,
}

/// A file handed to the simulated queue, as CUPS would have read it.
#[derive(Debug, Clone)]
pub struct QueuedFile {
    pub cups_job: i32,
    pub printer: String,
    pub title: String,
    pub spool_path: PathBuf,
    pub payload: Vec<u8>,
}

/// Connection token issued by [`SimulatedCups`].
#[derive(Debug)]
pub struct SimulatedConnection {
    closed: bool,
}

/// In-memory CUPS daemon.
#[derive(Debug)]
pub struct SimulatedCups {
    printers: Mutex<Vec<String>>,
    fail_at: Option<CupsStep>,
    open: AtomicUsize,
    next_job: AtomicI32,
    queued: Mutex<Vec<QueuedFile>>,
}

impl SimulatedCups {
    pub fn new(printers: &[&str]) -> Self {
        Self {
            printers: Mutex::new(printers.iter().map(|p| p.to_string()).collect()),
            fail_at: None,
            open: AtomicUsize::new(0),
            next_job: AtomicI32::new(1),
            queued: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, step: CupsStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Replace the destination list, as if printers were plugged/unplugged.
    pub fn set_printers(&self, printers: &[&str]) {
        *lock(&self.printers) = printers.iter().map(|p| p.to_string()).collect();
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> Vec<QueuedFile> {
        lock(&self.queued).clone()
    }

    fn fails(&self, step: CupsStep) -> bool {
        self.fail_at == Some(step)
    }
}

impl CupsApi for SimulatedCups {
    type Connection = SimulatedConnection;

    fn connect(&self) -> Result<Self::Connection, String> {
        if self.fails(CupsStep::Connect) {
            return Err("Connection refused".into());
        }
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatedConnection { closed: false })
    }

    fn printers(&self, _conn: &mut Self::Connection) -> Result<Vec<String>, String> {
        if self.fails(CupsStep::ListPrinters) {
            return Err("client-error-forbidden".into());
        }
        Ok(lock(&self.printers).clone())
    }

    fn print_file(
        &self,
        _conn: &mut Self::Connection,
        printer: &str,
        path: &Path,
        title: &str,
    ) -> Result<i32, String> {
        if self.fails(CupsStep::PrintFile) {
            return Err("server-error-internal-error".into());
        }
        let payload = std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let cups_job = self.next_job.fetch_add(1, Ordering::SeqCst);
        lock(&self.queued).push(QueuedFile {
            cups_job,
            printer: printer.into(),
            title: title.into(),
            spool_path: path.to_path_buf(),
            payload,
        });
        Ok(cups_job)
    }

    fn disconnect(&self, conn: &mut Self::Connection) {
        if !conn.closed {
            conn.closed = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

// ---------------------------------------------------------------------------
// Windows spooler
// ---------------------------------------------------------------------------

/// Step of the spooler lifecycle at which [`SimulatedSpooler`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoolerStep {
    Enumerate,
    Open,
    StartDoc,
    StartPage,
    Write,
    EndPage,
    EndDoc,
    Close,
}

/// A document the simulated spooler accepted.
#[derive(Debug, Clone)]
pub struct SpooledDocument {
    pub printer: String,
    pub doc_name: String,
    pub datatype: String,
    pub data: Vec<u8>,
}

/// Printer handle issued by [`SimulatedSpooler`].
#[derive(Debug)]
pub struct SimulatedHandle {
    printer: String,
    doc: Option<SpooledDocument>,
    closed: bool,
}

/// In-memory Windows print spooler.
#[derive(Debug)]
pub struct SimulatedSpooler {
    printers: Mutex<Vec<String>>,
    fail_at: Option<SpoolerStep>,
    short_write: Option<usize>,
    open_handles: AtomicUsize,
    open_docs: AtomicUsize,
    end_doc_calls: AtomicUsize,
    spooled: Mutex<Vec<SpooledDocument>>,
}

impl SimulatedSpooler {
    pub fn new(printers: &[&str]) -> Self {
        Self {
            printers: Mutex::new(printers.iter().map(|p| p.to_string()).collect()),
            fail_at: None,
            short_write: None,
            open_handles: AtomicUsize::new(0),
            open_docs: AtomicUsize::new(0),
            end_doc_calls: AtomicUsize::new(0),
            spooled: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, step: SpoolerStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Report at most `bytes` as written by each `WritePrinter` call.
    pub fn with_short_write(mut self, bytes: usize) -> Self {
        self.short_write = Some(bytes);
        self
    }

    pub fn set_printers(&self, printers: &[&str]) {
        *lock(&self.printers) = printers.iter().map(|p| p.to_string()).collect();
    }

    /// Printer handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Documents started and not yet ended.
    pub fn open_documents(&self) -> usize {
        self.open_docs.load(Ordering::SeqCst)
    }

    pub fn end_doc_calls(&self) -> usize {
        self.end_doc_calls.load(Ordering::SeqCst)
    }

    pub fn spooled(&self) -> Vec<SpooledDocument> {
        lock(&self.spooled).clone()
    }

    fn check(&self, step: SpoolerStep) -> Result<(), OsError> {
        if self.fail_at == Some(step) {
            Err(OsError::new(ERROR_NOT_READY, format!("{step:?} failed: the device is not ready")))
        } else {
            Ok(())
        }
    }
}

impl SpoolerApi for SimulatedSpooler {
    type Handle = SimulatedHandle;

    fn enum_printers(&self) -> Result<Vec<String>, OsError> {
        self.check(SpoolerStep::Enumerate)?;
        Ok(lock(&self.printers).clone())
    }

    fn open_printer(&self, name: &str) -> Result<Self::Handle, OsError> {
        if self.fail_at == Some(SpoolerStep::Open) {
            return Err(OsError::new(ERROR_ACCESS_DENIED, "Access is denied."));
        }
        // The wide-string API reads the name only up to its first NUL.
        let name = name.split('\0').next().unwrap_or_default();
        if !lock(&self.printers).iter().any(|p| p == name) {
            return Err(OsError::new(
                ERROR_INVALID_PRINTER_NAME,
                "The printer name is invalid.",
            ));
        }
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatedHandle {
            printer: name.into(),
            doc: None,
            closed: false,
        })
    }

    fn start_doc(
        &self,
        handle: &mut Self::Handle,
        doc_name: &str,
        datatype: &str,
    ) -> Result<u32, OsError> {
        self.check(SpoolerStep::StartDoc)?;
        self.open_docs.fetch_add(1, Ordering::SeqCst);
        handle.doc = Some(SpooledDocument {
            printer: handle.printer.clone(),
            doc_name: doc_name.into(),
            datatype: datatype.into(),
            data: Vec::new(),
        });
        Ok(42)
    }

    fn start_page(&self, _handle: &mut Self::Handle) -> Result<(), OsError> {
        self.check(SpoolerStep::StartPage)
    }

    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, OsError> {
        self.check(SpoolerStep::Write)?;
        let n = self.short_write.map_or(data.len(), |max| max.min(data.len()));
        if let Some(doc) = handle.doc.as_mut() {
            doc.data.extend_from_slice(&data[..n]);
        }
        Ok(n)
    }

    fn end_page(&self, _handle: &mut Self::Handle) -> Result<(), OsError> {
        self.check(SpoolerStep::EndPage)
    }

    fn end_doc(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        self.end_doc_calls.fetch_add(1, Ordering::SeqCst);
        let doc = handle.doc.take();
        if doc.is_some() {
            self.open_docs.fetch_sub(1, Ordering::SeqCst);
        }
        self.check(SpoolerStep::EndDoc)?;
        // A failed transfer leaves the document aborted rather than queued.
        if matches!(self.fail_at, None | Some(SpoolerStep::Close)) {
            if let Some(doc) = doc {
                lock(&self.spooled).push(doc);
            }
        }
        Ok(())
    }

    fn close_printer(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        if !handle.closed {
            handle.closed = true;
            self.open_handles.fetch_sub(1, Ordering::SeqCst);
        }
        self.check(SpoolerStep::Close)
    }
}
