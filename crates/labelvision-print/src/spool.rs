// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary spool files for backends whose API takes a path, not bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

const SPOOL_PREFIX: &str = "labelvision-";
const SPOOL_SUFFIX: &str = ".pdf";

/// A uniquely named file holding one job's payload, byte for byte.
///
/// The file is removed when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct SpoolFile {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl SpoolFile {
    /// Write `payload` unmodified to a fresh file inside `dir`.
    pub fn create_in(dir: &Path, payload: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(SPOOL_PREFIX)
            .suffix(SPOOL_SUFFIX)
            .tempfile_in(dir)?;
        file.write_all(payload)?;
        file.flush()?;

        let path = file.path().to_path_buf();
        debug!(path = %path.display(), bytes = payload.len(), "spool file created");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpoolFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => debug!(path = %self.path.display(), "spool file removed"),
                Err(e) => warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not remove spool file"
                ),
            }
        }
    }
}
