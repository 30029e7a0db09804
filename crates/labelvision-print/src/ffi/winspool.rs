// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// winspool.drv binding (wide-character entry points).

use std::ffi::{OsStr, c_void};
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use super::{LoadError, open_first, symbol};
use crate::spooler::{OsError, SpoolerApi};

const CANDIDATES: &[&str] = &["winspool.drv"];

const PRINTER_ENUM_LOCAL: u32 = 0x0000_0002;
const PRINTER_ENUM_CONNECTIONS: u32 = 0x0000_0004;
const ERROR_INSUFFICIENT_BUFFER: i32 = 122;

type Bool = i32;
type Handle = *mut c_void;

/// `PRINTER_INFO_4W`.
#[repr(C)]
struct PrinterInfo4W {
    printer_name: *const u16,
    server_name: *const u16,
    attributes: u32,
}

/// `DOC_INFO_1W`.
#[repr(C)]
struct DocInfo1W {
    doc_name: *const u16,
    output_file: *const u16,
    datatype: *const u16,
}

type EnumPrintersWFn = unsafe extern "system" fn(
    flags: u32,
    name: *const u16,
    level: u32,
    printer_enum: *mut u8,
    cb_buf: u32,
    pcb_needed: *mut u32,
    pc_returned: *mut u32,
) -> Bool;
type OpenPrinterWFn =
    unsafe extern "system" fn(name: *const u16, handle: *mut Handle, default: *mut c_void) -> Bool;
type StartDocPrinterWFn =
    unsafe extern "system" fn(handle: Handle, level: u32, doc_info: *const DocInfo1W) -> u32;
type HandleFn = unsafe extern "system" fn(handle: Handle) -> Bool;
type WritePrinterFn = unsafe extern "system" fn(
    handle: Handle,
    buf: *const c_void,
    cb_buf: u32,
    pc_written: *mut u32,
) -> Bool;

/// An open `HANDLE` from `OpenPrinterW`.
#[derive(Debug)]
pub struct PrinterHandle(Handle);

/// winspool.drv, bound at runtime. The library is never unloaded.
pub struct Winspool {
    enum_printers: EnumPrintersWFn,
    open_printer: OpenPrinterWFn,
    start_doc: StartDocPrinterWFn,
    start_page: HandleFn,
    write_printer: WritePrinterFn,
    end_page: HandleFn,
    end_doc: HandleFn,
    close_printer: HandleFn,
}

impl Winspool {
    pub fn load() -> Result<Self, LoadError> {
        let (lib, name) = open_first(CANDIDATES)?;
        // SAFETY: signatures match winspool.h; `lib` is never unloaded.
        unsafe {
            Ok(Self {
                enum_printers: symbol(lib, name, "EnumPrintersW")?,
                open_printer: symbol(lib, name, "OpenPrinterW")?,
                start_doc: symbol(lib, name, "StartDocPrinterW")?,
                start_page: symbol(lib, name, "StartPagePrinter")?,
                write_printer: symbol(lib, name, "WritePrinter")?,
                end_page: symbol(lib, name, "EndPagePrinter")?,
                end_doc: symbol(lib, name, "EndDocPrinter")?,
                close_printer: symbol(lib, name, "ClosePrinter")?,
            })
        }
    }

    fn check(ok: Bool) -> Result<(), OsError> {
        if ok == 0 { Err(last_os_error()) } else { Ok(()) }
    }
}

fn last_os_error() -> OsError {
    let e = std::io::Error::last_os_error();
    OsError::new(e.raw_os_error().unwrap_or(0) as u32, e.to_string())
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

/// Read a NUL-terminated UTF-16 string.
///
/// # Safety
///
/// `p` must be null or point at a NUL-terminated wide string.
unsafe fn from_wide(p: *const u16) -> Option<String> {
    if p.is_null() {
        return None;
    }
    let mut len = 0;
    // SAFETY: walks to the terminator guaranteed by the caller.
    while unsafe { *p.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: `len` elements were just read.
    let units = unsafe { std::slice::from_raw_parts(p, len) };
    Some(String::from_utf16_lossy(units))
}

impl SpoolerApi for Winspool {
    type Handle = PrinterHandle;

    fn enum_printers(&self) -> Result<Vec<String>, OsError> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed = 0u32;
        let mut returned = 0u32;

        // SAFETY: size query with an empty buffer.
        let ok = unsafe {
            (self.enum_printers)(flags, ptr::null(), 4, ptr::null_mut(), 0, &mut needed, &mut returned)
        };
        if ok == 0 {
            let e = last_os_error();
            if e.code != ERROR_INSUFFICIENT_BUFFER as u32 {
                return Err(e);
            }
        }
        if needed == 0 {
            return Ok(Vec::new());
        }

        // u64 storage keeps the pointer-bearing structs aligned.
        let mut buf = vec![0u64; (needed as usize).div_ceil(8)];
        // SAFETY: `buf` holds at least `needed` bytes.
        let ok = unsafe {
            (self.enum_printers)(
                flags,
                ptr::null(),
                4,
                buf.as_mut_ptr().cast(),
                needed,
                &mut needed,
                &mut returned,
            )
        };
        Self::check(ok)?;

        // SAFETY: the spooler wrote `returned` PRINTER_INFO_4W records at the
        // start of `buf`; their strings live further into `buf`.
        let infos = unsafe {
            std::slice::from_raw_parts(buf.as_ptr().cast::<PrinterInfo4W>(), returned as usize)
        };
        Ok(infos
            .iter()
            // SAFETY: names point into `buf`, which is still alive.
            .filter_map(|info| unsafe { from_wide(info.printer_name) })
            .collect())
    }

    fn open_printer(&self, name: &str) -> Result<Self::Handle, OsError> {
        let name = wide(name);
        let mut handle: Handle = ptr::null_mut();
        // SAFETY: `name` is NUL-terminated; default access.
        let ok = unsafe { (self.open_printer)(name.as_ptr(), &mut handle, ptr::null_mut()) };
        Self::check(ok)?;
        Ok(PrinterHandle(handle))
    }

    fn start_doc(
        &self,
        handle: &mut Self::Handle,
        doc_name: &str,
        datatype: &str,
    ) -> Result<u32, OsError> {
        let doc_name = wide(doc_name);
        let datatype = wide(datatype);
        let info = DocInfo1W {
            doc_name: doc_name.as_ptr(),
            output_file: ptr::null(),
            datatype: datatype.as_ptr(),
        };
        // SAFETY: `info` and its strings outlive the call.
        let job = unsafe { (self.start_doc)(handle.0, 1, &info) };
        if job == 0 { Err(last_os_error()) } else { Ok(job) }
    }

    fn start_page(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        // SAFETY: open printer handle.
        Self::check(unsafe { (self.start_page)(handle.0) })
    }

    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, OsError> {
        let len = u32::try_from(data.len())
            .map_err(|_| OsError::new(0, format!("payload of {} bytes is too large", data.len())))?;
        let mut written = 0u32;
        // SAFETY: `data` is valid for `len` bytes.
        let ok = unsafe { (self.write_printer)(handle.0, data.as_ptr().cast(), len, &mut written) };
        Self::check(ok)?;
        Ok(written as usize)
    }

    fn end_page(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        // SAFETY: open printer handle.
        Self::check(unsafe { (self.end_page)(handle.0) })
    }

    fn end_doc(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        // SAFETY: open printer handle.
        Self::check(unsafe { (self.end_doc)(handle.0) })
    }

    fn close_printer(&self, handle: &mut Self::Handle) -> Result<(), OsError> {
        if handle.0.is_null() {
            return Ok(());
        }
        // SAFETY: open printer handle, nulled below so it is closed once.
        let ok = unsafe { (self.close_printer)(handle.0) };
        handle.0 = ptr::null_mut();
        Self::check(ok)
    }
}
