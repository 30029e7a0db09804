// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// libcups binding.

use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::{self, NonNull};

use super::{LoadError, open_first, symbol};
use crate::cups::CupsApi;

#[cfg(target_os = "linux")]
const CANDIDATES: &[&str] = &["libcups.so.2", "libcups.so"];
#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &["libcups.2.dylib", "/usr/lib/libcups.2.dylib"];

const AF_UNSPEC: c_int = 0;
const CONNECT_TIMEOUT_MS: c_int = 30_000;

/// Highest `ipp_status_t` that still counts as success.
const IPP_STATUS_OK_CONFLICTING: c_int = 0x0002;
/// `client-error-not-found`: what CUPS-Get-Printers answers on a daemon with
/// no queues.
const IPP_STATUS_ERROR_NOT_FOUND: c_int = 0x0406;

/// `cups_dest_t`.
#[repr(C)]
struct CupsDest {
    name: *mut c_char,
    instance: *mut c_char,
    is_default: c_int,
    num_options: c_int,
    options: *mut c_void,
}

type CupsServerFn = unsafe extern "C" fn() -> *const c_char;
type IppPortFn = unsafe extern "C" fn() -> c_int;
type CupsEncryptionFn = unsafe extern "C" fn() -> c_int;
type HttpConnect2Fn = unsafe extern "C" fn(
    host: *const c_char,
    port: c_int,
    addrlist: *mut c_void,
    family: c_int,
    encryption: c_int,
    blocking: c_int,
    msec: c_int,
    cancel: *mut c_int,
) -> *mut c_void;
type HttpCloseFn = unsafe extern "C" fn(http: *mut c_void);
type CupsGetDests2Fn = unsafe extern "C" fn(http: *mut c_void, dests: *mut *mut CupsDest) -> c_int;
type CupsFreeDestsFn = unsafe extern "C" fn(num_dests: c_int, dests: *mut CupsDest);
type CupsPrintFile2Fn = unsafe extern "C" fn(
    http: *mut c_void,
    name: *const c_char,
    filename: *const c_char,
    title: *const c_char,
    num_options: c_int,
    options: *mut c_void,
) -> c_int;
type CupsLastErrorFn = unsafe extern "C" fn() -> c_int;
type CupsLastErrorStringFn = unsafe extern "C" fn() -> *const c_char;

/// An `http_t *` from `httpConnect2`.
#[derive(Debug)]
pub struct CupsConnection(NonNull<c_void>);

/// libcups, bound at runtime.
///
/// The library is never unloaded: libcups registers thread-local destructors
/// in every thread that calls into it, and those run at thread exit.
pub struct LibCups {
    cups_server: CupsServerFn,
    ipp_port: IppPortFn,
    cups_encryption: CupsEncryptionFn,
    http_connect2: HttpConnect2Fn,
    http_close: HttpCloseFn,
    get_dests2: CupsGetDests2Fn,
    free_dests: CupsFreeDestsFn,
    print_file2: CupsPrintFile2Fn,
    last_error: CupsLastErrorFn,
    last_error_string: CupsLastErrorStringFn,
}

impl LibCups {
    pub fn load() -> Result<Self, LoadError> {
        let (lib, name) = open_first(CANDIDATES)?;
        // SAFETY: signatures match the libcups 2.x headers; `lib` is never
        // unloaded.
        unsafe {
            Ok(Self {
                cups_server: symbol(lib, name, "cupsServer")?,
                ipp_port: symbol(lib, name, "ippPort")?,
                cups_encryption: symbol(lib, name, "cupsEncryption")?,
                http_connect2: symbol(lib, name, "httpConnect2")?,
                http_close: symbol(lib, name, "httpClose")?,
                get_dests2: symbol(lib, name, "cupsGetDests2")?,
                free_dests: symbol(lib, name, "cupsFreeDests")?,
                print_file2: symbol(lib, name, "cupsPrintFile2")?,
                last_error: symbol(lib, name, "cupsLastError")?,
                last_error_string: symbol(lib, name, "cupsLastErrorString")?,
            })
        }
    }

    fn last_status(&self) -> c_int {
        // SAFETY: reads the calling thread's last IPP status.
        unsafe { (self.last_error)() }
    }

    fn last_error_message(&self) -> String {
        // SAFETY: returns a pointer to thread-local storage or NULL.
        let msg = unsafe { (self.last_error_string)() };
        if msg.is_null() {
            "unknown CUPS error".into()
        } else {
            // SAFETY: non-null NUL-terminated string owned by libcups.
            unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
        }
    }
}

/// Whether a `cupsGetDests2` call that returned no destinations actually
/// failed. A daemon without queues answers `client-error-not-found`.
fn dests_request_failed(status: c_int) -> bool {
    status > IPP_STATUS_OK_CONFLICTING && status != IPP_STATUS_ERROR_NOT_FOUND
}

fn c_string(what: &str, bytes: &[u8]) -> Result<CString, String> {
    CString::new(bytes).map_err(|_| format!("{what} contains a NUL byte"))
}

impl CupsApi for LibCups {
    type Connection = CupsConnection;

    fn connect(&self) -> Result<Self::Connection, String> {
        // SAFETY: plain getters over libcups' default client settings.
        let (server, port, encryption) =
            unsafe { ((self.cups_server)(), (self.ipp_port)(), (self.cups_encryption)()) };
        // SAFETY: `server` is a valid C string or NULL (local default).
        let http = unsafe {
            (self.http_connect2)(
                server,
                port,
                ptr::null_mut(),
                AF_UNSPEC,
                encryption,
                1,
                CONNECT_TIMEOUT_MS,
                ptr::null_mut(),
            )
        };
        NonNull::new(http).map(CupsConnection).ok_or_else(|| {
            let host = if server.is_null() {
                "localhost".into()
            } else {
                // SAFETY: checked non-null above.
                unsafe { CStr::from_ptr(server) }.to_string_lossy().into_owned()
            };
            format!("could not connect to {host}:{port}: {}", self.last_error_message())
        })
    }

    fn printers(&self, conn: &mut Self::Connection) -> Result<Vec<String>, String> {
        let mut dests: *mut CupsDest = ptr::null_mut();
        // SAFETY: `conn` is an open http_t; libcups allocates `dests`.
        let count = unsafe { (self.get_dests2)(conn.0.as_ptr(), &mut dests) };
        if count <= 0 || dests.is_null() {
            // Zero is also how libcups reports a rejected request.
            let status = self.last_status();
            if dests_request_failed(status) {
                return Err(format!(
                    "{} (ipp status 0x{status:04x})",
                    self.last_error_message()
                ));
            }
            return Ok(Vec::new());
        }

        // SAFETY: libcups returned `count` contiguous entries.
        let entries = unsafe { std::slice::from_raw_parts(dests, count as usize) };
        let mut names: Vec<String> = Vec::with_capacity(entries.len());
        for dest in entries {
            if dest.name.is_null() || !dest.instance.is_null() {
                continue;
            }
            // SAFETY: non-null NUL-terminated destination name.
            let name = unsafe { CStr::from_ptr(dest.name) }.to_string_lossy().into_owned();
            if !names.contains(&name) {
                names.push(name);
            }
        }

        // SAFETY: frees exactly what cupsGetDests2 allocated.
        unsafe { (self.free_dests)(count, dests) };
        Ok(names)
    }

    fn print_file(
        &self,
        conn: &mut Self::Connection,
        printer: &str,
        path: &Path,
        title: &str,
    ) -> Result<i32, String> {
        let printer = c_string("printer name", printer.as_bytes())?;
        let file = c_string("spool path", path.as_os_str().as_bytes())?;
        let title = c_string("job name", title.as_bytes())?;

        // SAFETY: all strings outlive the call; no options are passed.
        let job = unsafe {
            (self.print_file2)(
                conn.0.as_ptr(),
                printer.as_ptr(),
                file.as_ptr(),
                title.as_ptr(),
                0,
                ptr::null_mut(),
            )
        };
        if job == 0 {
            Err(self.last_error_message())
        } else {
            Ok(job)
        }
    }

    fn disconnect(&self, conn: &mut Self::Connection) {
        // SAFETY: each connection is closed exactly once, by `Session::drop`.
        unsafe { (self.http_close)(conn.0.as_ptr()) };
    }
}
