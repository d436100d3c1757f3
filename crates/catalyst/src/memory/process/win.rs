//! Win32 backend.

use std::ffi::c_void;
use std::mem;

use tracing::debug;
use windows::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, HANDLE};
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW, PROCESSENTRY32W,
    Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_OPERATION,
    PROCESS_VM_READ, PROCESS_VM_WRITE,
};

use super::{OsError, OsResult, ProcessInfo, matches_process_name};
use crate::error::{Error, Result};

/// Exit code reported by `GetExitCodeProcess` while the process runs
const STILL_ACTIVE: u32 = 259;

pub(super) struct RawProcess {
    pid: u32,
    handle: HANDLE,
}

// SAFETY: a process HANDLE is a kernel object reference; the Win32 memory
// functions used here may be called concurrently from any thread.
unsafe impl Send for RawProcess {}
unsafe impl Sync for RawProcess {}

fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

fn classify(e: windows::core::Error) -> OsError {
    if e.code() == ERROR_ACCESS_DENIED.to_hresult() {
        OsError::AccessDenied(e.message().to_string())
    } else {
        OsError::Fault(e.message().to_string())
    }
}

pub(super) fn processes() -> Result<Vec<ProcessInfo>> {
    // SAFETY: the snapshot handle is closed below on every path.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(|e| Error::AccessDenied(format!("process snapshot failed: {}", e)))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = Vec::new();
    // SAFETY: entry.dwSize is initialized as the API requires.
    let mut more = unsafe { Process32FirstW(snapshot, &mut entry) }.is_ok();
    while more {
        processes.push(ProcessInfo {
            pid: entry.th32ProcessID,
            name: wide_to_string(&entry.szExeFile),
            image: None,
        });
        // SAFETY: same snapshot and entry as above.
        more = unsafe { Process32NextW(snapshot, &mut entry) }.is_ok();
    }

    // SAFETY: snapshot is a valid handle owned by this function.
    unsafe {
        let _ = CloseHandle(snapshot);
    }

    Ok(processes)
}

pub(super) fn open(pid: u32) -> Result<RawProcess> {
    let access = PROCESS_VM_READ
        | PROCESS_VM_WRITE
        | PROCESS_VM_OPERATION
        | PROCESS_QUERY_LIMITED_INFORMATION;

    // SAFETY: OpenProcess has no memory-safety preconditions; the returned
    // handle is owned by RawProcess and closed in `close`.
    let handle = unsafe { OpenProcess(access, false, pid) }.map_err(|e| {
        if e.code() == ERROR_ACCESS_DENIED.to_hresult() {
            Error::AccessDenied(format!("OpenProcess({}) failed: {}", pid, e))
        } else {
            Error::ProcessNotFound(format!("PID {} ({})", pid, e))
        }
    })?;

    Ok(RawProcess { pid, handle })
}

impl RawProcess {
    pub(super) fn read(&self, address: u64, buffer: &mut [u8]) -> OsResult<usize> {
        let mut read = 0usize;
        // SAFETY: buffer is a valid writable region of buffer.len() bytes;
        // the remote address is only touched by the kernel.
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len(),
                Some(&mut read),
            )
        };

        match result {
            Ok(()) => Ok(read),
            // ERROR_PARTIAL_COPY still reports how much was copied
            Err(_) if read > 0 => Ok(read),
            Err(e) => Err(classify(e)),
        }
    }

    pub(super) fn write(&self, address: u64, bytes: &[u8]) -> OsResult<usize> {
        let mut written = 0usize;
        // SAFETY: bytes is a valid readable region of bytes.len() bytes.
        let result = unsafe {
            WriteProcessMemory(
                self.handle,
                address as *const c_void,
                bytes.as_ptr() as *const c_void,
                bytes.len(),
                Some(&mut written),
            )
        };

        match result {
            Ok(()) => Ok(written),
            Err(_) if written > 0 => Ok(written),
            Err(e) => Err(classify(e)),
        }
    }

    pub(super) fn module_base(&self, module_name: &str) -> Result<Option<u64>> {
        // SAFETY: the snapshot handle is closed below on every path.
        let snapshot = unsafe {
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, self.pid)
        }
        .map_err(|e| Error::AccessDenied(format!("module snapshot failed: {}", e)))?;

        let mut entry = MODULEENTRY32W {
            dwSize: mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        // SAFETY: entry.dwSize is initialized as the API requires.
        let mut more = unsafe { Module32FirstW(snapshot, &mut entry) }.is_ok();
        while more {
            let name = wide_to_string(&entry.szModule);
            if matches_process_name(&name, module_name) {
                found = Some(entry.modBaseAddr as u64);
                break;
            }
            // SAFETY: same snapshot and entry as above.
            more = unsafe { Module32NextW(snapshot, &mut entry) }.is_ok();
        }

        // SAFETY: snapshot is a valid handle owned by this function.
        unsafe {
            let _ = CloseHandle(snapshot);
        }

        Ok(found)
    }

    pub(super) fn is_alive(&self) -> bool {
        let mut code = 0u32;
        // SAFETY: the handle was opened with PROCESS_QUERY_LIMITED_INFORMATION.
        match unsafe { GetExitCodeProcess(self.handle, &mut code) } {
            Ok(()) => code == STILL_ACTIVE,
            Err(_) => false,
        }
    }

    pub(super) fn close(self) {
        debug!("Closing handle to PID {}", self.pid);
        // SAFETY: the handle is owned by self and not used after this call.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}
