// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer enumeration over the selected backend.

use std::sync::Arc;

use labelvision_core::error::{LabelVisionError, Result};
use labelvision_core::types::PrinterBackendKind;
use tracing::{debug, instrument};

use crate::backend::PrinterBackend;

/// Lists the printers known to the OS print subsystem.
///
/// Results are never cached: every call re-queries the backend, because USB
/// and network printers come and go between requests.
#[derive(Clone)]
pub struct PrinterEnumerator {
    backend: Arc<dyn PrinterBackend>,
}

impl PrinterEnumerator {
    pub fn new(backend: Arc<dyn PrinterBackend>) -> Self {
        Self { backend }
    }

    pub fn kind(&self) -> PrinterBackendKind {
        self.backend.kind()
    }

    /// Fails with `BackendUnavailable` or `Enumeration`; callers decide
    /// whether an enumeration failure degrades to an empty list.
    #[instrument(skip(self), fields(backend = %self.kind()))]
    pub fn list_printers(&self) -> Result<Vec<String>> {
        if !self.kind().is_available() {
            return Err(LabelVisionError::BackendUnavailable);
        }
        let printers = self.backend.list_printers()?;
        debug!(count = printers.len(), "enumeration complete");
        Ok(printers)
    }
}

impl std::fmt::Debug for PrinterEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterEnumerator")
            .field("backend", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnavailableBackend;
    use crate::cups::CupsBackend;
    use crate::testing::{CupsStep, SimulatedCups};

    #[test]
    fn unavailable_backend_is_reported() {
        let enumerator = PrinterEnumerator::new(Arc::new(UnavailableBackend));
        assert_eq!(enumerator.kind(), PrinterBackendKind::None);
        assert!(matches!(
            enumerator.list_printers(),
            Err(LabelVisionError::BackendUnavailable)
        ));
    }

    #[test]
    fn lists_backend_printers() {
        let backend = CupsBackend::new(SimulatedCups::new(&["LabelPrinter", "Office"]));
        let enumerator = PrinterEnumerator::new(Arc::new(backend));
        assert_eq!(
            enumerator.list_printers().expect("list"),
            vec!["LabelPrinter", "Office"]
        );
    }

    #[test]
    fn enumeration_errors_pass_through_classified() {
        let api = SimulatedCups::new(&["A"]).failing_at(CupsStep::ListPrinters);
        let enumerator = PrinterEnumerator::new(Arc::new(CupsBackend::new(api)));
        assert!(matches!(
            enumerator.list_printers(),
            Err(LabelVisionError::Enumeration(_))
        ));
    }
}
