// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabelVision Print: selects the OS print subsystem once at startup, lists
// its printers, and submits PDF jobs through it.  Platform libraries are
// bound at runtime, so a host without CUPS or the Windows spooler still runs
// the service with printing reported as unavailable.
//
// A successful submission means the OS accepted the job into its queue.  It
// is not a guarantee that anything was physically printed.

pub mod backend;
pub mod cups;
pub mod dispatcher;
pub mod enumerator;
pub mod spool;
pub mod spooler;

mod ffi;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{PrinterBackend, UnavailableBackend, select_backend};
pub use cups::{CupsApi, CupsBackend};
pub use dispatcher::PrintDispatcher;
pub use enumerator::PrinterEnumerator;
pub use spooler::{OsError, SpoolerApi, SpoolerBackend};
