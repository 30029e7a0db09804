// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer backend abstraction and one-time platform selection.
//
// Every platform branch lives here: the rest of the crate (and the HTTP layer)
// only sees `dyn PrinterBackend`.

use std::sync::Arc;

use labelvision_core::error::{LabelVisionError, Result};
use labelvision_core::types::{PrintJob, PrinterBackendKind};
use tracing::info;

/// Capability set of an OS print subsystem.
pub trait PrinterBackend: Send + Sync {
    /// Which subsystem this is.
    fn kind(&self) -> PrinterBackendKind;

    /// Query the subsystem for printer names. Never cached.
    fn list_printers(&self) -> Result<Vec<String>>;

    /// Submit one job. `Ok` means the OS accepted it into its queue.
    fn submit(&self, job: &PrintJob) -> Result<()>;
}

/// Backend used when no print library could be bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl PrinterBackend for UnavailableBackend {
    fn kind(&self) -> PrinterBackendKind {
        PrinterBackendKind::None
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        Err(LabelVisionError::BackendUnavailable)
    }

    fn submit(&self, _job: &PrintJob) -> Result<()> {
        Err(LabelVisionError::BackendUnavailable)
    }
}

/// Detect the host platform and bind its print library.
///
/// Called once at startup; the returned backend is shared read-only for the
/// lifetime of the process. A missing library is not retried.
pub fn select_backend() -> Arc<dyn PrinterBackend> {
    info!(platform = labelvision_core::host_platform(), "detecting print subsystem");

    #[cfg(windows)]
    {
        match crate::ffi::winspool::Winspool::load() {
            Ok(api) => {
                info!("using the Windows print spooler");
                return Arc::new(crate::spooler::SpoolerBackend::new(api));
            }
            Err(e) => tracing::error!(error = %e, "winspool.drv could not be bound"),
        }
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        match crate::ffi::libcups::LibCups::load() {
            Ok(api) => {
                info!("using CUPS");
                return Arc::new(crate::cups::CupsBackend::new(api));
            }
            Err(e) => tracing::warn!(error = %e, "libcups could not be bound, printing disabled"),
        }
    }

    #[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
    tracing::warn!(
        platform = labelvision_core::host_platform(),
        "unsupported platform, printing disabled"
    );

    Arc::new(UnavailableBackend)
}
