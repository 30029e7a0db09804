// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Runtime bindings to the OS print libraries.
//
// Libraries are opened with `libloading` at startup instead of being linked,
// so a host without libcups (or a stripped Windows image) still starts with
// printing reported as unavailable. A bound library stays mapped until the
// process exits.

#[cfg(any(windows, target_os = "linux", target_os = "macos"))]
use libloading::Library;
#[cfg(any(windows, target_os = "linux", target_os = "macos"))]
use thiserror::Error;

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub mod libcups;
#[cfg(windows)]
pub mod winspool;

/// Failure to bind a print library.
#[cfg(any(windows, target_os = "linux", target_os = "macos"))]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("none of {candidates:?} could be loaded: {reason}")]
    Library {
        candidates: &'static [&'static str],
        reason: String,
    },

    #[error("export '{symbol}' missing in {library}")]
    MissingExport {
        library: &'static str,
        symbol: &'static str,
    },
}

/// Open the first library in `candidates` that loads.
///
/// The handle is leaked so the library is never unloaded.
#[cfg(any(windows, target_os = "linux", target_os = "macos"))]
fn open_first(
    candidates: &'static [&'static str],
) -> Result<(&'static Library, &'static str), LoadError> {
    let mut last = None;
    for &name in candidates {
        // SAFETY: the print libraries run no initialisers with preconditions.
        match unsafe { Library::new(name) } {
            Ok(lib) => {
                tracing::debug!(library = name, "loaded print library");
                return Ok((Box::leak(Box::new(lib)), name));
            }
            Err(e) => last = Some(e),
        }
    }
    Err(LoadError::Library {
        candidates,
        reason: last.map(|e: libloading::Error| e.to_string()).unwrap_or_default(),
    })
}

/// Copy a function pointer out of `lib`.
///
/// # Safety
///
/// `T` must be the exact signature of the exported symbol.
#[cfg(any(windows, target_os = "linux", target_os = "macos"))]
unsafe fn symbol<T: Copy>(
    lib: &'static Library,
    library: &'static str,
    name: &'static str,
) -> Result<T, LoadError> {
    // SAFETY: forwarded to the caller.
    unsafe { lib.get::<T>(name.as_bytes()) }
        .map(|sym| *sym)
        .map_err(|_| LoadError::MissingExport {
            library,
            symbol: name,
        })
}
