//! Handles to external processes.
//!
//! `ProcessHandle` owns exactly one OS-level handle to the target and closes it
//! on [`release`](ProcessHandle::release) or drop. Reads and writes that fail
//! are classified: if the target has exited the error is
//! [`Error::ProcessTerminated`], otherwise a read/write fault or access denial.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod win;

#[cfg(target_os = "linux")]
use linux as platform;
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
use unsupported as platform;
#[cfg(target_os = "windows")]
use win as platform;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::memory::reader::{short_read, short_write};

/// A running process as seen by the process list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Executable or command name reported by the OS
    pub name: String,
    /// Image name from the command line, when it differs from `name`
    /// (e.g. a Windows executable hosted by Wine)
    pub image: Option<String>,
}

impl ProcessInfo {
    pub fn matches(&self, wanted: &str) -> bool {
        matches_process_name(&self.name, wanted)
            || self
                .image
                .as_deref()
                .is_some_and(|image| matches_process_name(image, wanted))
    }
}

/// Case-insensitive process name comparison that ignores a `.exe` suffix on
/// either side.
pub fn matches_process_name(candidate: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> String {
        let lower = name.trim().to_ascii_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stem) => stem.to_string(),
            None => lower,
        }
    }

    let wanted = stem(wanted);
    !wanted.is_empty() && stem(candidate) == wanted
}

/// List running processes
pub fn list_processes() -> Result<Vec<ProcessInfo>> {
    platform::processes()
}

/// Why an OS-level read or write failed
#[derive(Debug)]
pub(crate) enum OsError {
    AccessDenied(String),
    Fault(String),
}

/// Result of a backend read or write
pub(crate) type OsResult<T> = std::result::Result<T, OsError>;

/// Open handle to an external process
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
    /// Load address of the main executable module (0 if it could not be found)
    pub base_address: u64,
    raw: Option<platform::RawProcess>,
}

impl ProcessHandle {
    /// Find a running process by name and open it.
    ///
    /// When several processes match, the first one listed by the OS is used.
    pub fn attach(process_name: &str) -> Result<Self> {
        let info = list_processes()?
            .into_iter()
            .find(|p| p.matches(process_name))
            .ok_or_else(|| Error::ProcessNotFound(process_name.to_string()))?;

        debug!("Found {} as PID {}", process_name, info.pid);
        Self::open_with_name(info.pid, process_name.to_string())
    }

    /// Open a process by PID
    pub fn open(pid: u32) -> Result<Self> {
        let name = list_processes()?
            .into_iter()
            .find(|p| p.pid == pid)
            .map(|p| p.image.unwrap_or(p.name))
            .ok_or_else(|| Error::ProcessNotFound(format!("PID {}", pid)))?;

        Self::open_with_name(pid, name)
    }

    fn open_with_name(pid: u32, name: String) -> Result<Self> {
        let raw = platform::open(pid)?;

        let base_address = match raw.module_base(&name) {
            Ok(Some(base)) => base,
            Ok(None) => {
                debug!("Main module {} not listed for PID {}", name, pid);
                0
            }
            Err(e) => {
                warn!("Failed to list modules of PID {}: {}", pid, e);
                0
            }
        };

        info!(
            "Attached to {} (PID: {}, base: {:#x})",
            name, pid, base_address
        );

        Ok(Self {
            pid,
            name,
            base_address,
            raw: Some(raw),
        })
    }

    pub fn is_open(&self) -> bool {
        self.raw.is_some()
    }

    /// Close the OS handle. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(raw) = self.raw.take() {
            raw.close();
            info!("Released handle to {} (PID: {})", self.name, self.pid);
        }
    }

    /// Whether the target process is still running
    pub fn is_alive(&self) -> bool {
        self.raw.as_ref().is_some_and(|raw| raw.is_alive())
    }

    fn raw(&self) -> Result<&platform::RawProcess> {
        self.raw.as_ref().ok_or_else(|| {
            Error::AccessDenied(format!("handle to PID {} has been released", self.pid))
        })
    }

    /// Load address of `module_name` in the target
    pub fn module_base(&self, module_name: &str) -> Result<u64> {
        let raw = self.raw()?;
        match raw.module_base(module_name) {
            Ok(Some(base)) => Ok(base),
            Ok(None) if !raw.is_alive() => Err(self.terminated()),
            Ok(None) => Err(Error::ModuleNotFound(module_name.to_string())),
            Err(_) if !raw.is_alive() => Err(self.terminated()),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        let raw = self.raw()?;
        let size = buffer.len();

        match raw.read(address, buffer) {
            Ok(read) if read == size => Ok(()),
            Ok(_) | Err(_) if !raw.is_alive() => Err(self.terminated()),
            Ok(read) => Err(short_read(address, size, read)),
            Err(OsError::AccessDenied(message)) => Err(Error::AccessDenied(message)),
            Err(OsError::Fault(message)) => Err(Error::MemoryReadFault {
                address,
                size,
                message,
            }),
        }
    }

    pub(crate) fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        let raw = self.raw()?;
        let size = bytes.len();

        match raw.write(address, bytes) {
            Ok(written) if written == size => Ok(()),
            Ok(_) | Err(_) if !raw.is_alive() => Err(self.terminated()),
            Ok(written) => Err(short_write(address, size, written)),
            Err(OsError::AccessDenied(message)) => Err(Error::AccessDenied(message)),
            Err(OsError::Fault(message)) => Err(Error::MemoryWriteFault {
                address,
                size,
                message,
            }),
        }
    }

    fn terminated(&self) -> Error {
        Error::ProcessTerminated { pid: self.pid }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matching_ignores_case_and_exe_suffix() {
        assert!(matches_process_name(
            "MirrorsEdgeCatalyst.exe",
            "mirrorsedgecatalyst.exe"
        ));
        assert!(matches_process_name(
            "MirrorsEdgeCatalyst.exe",
            "MirrorsEdgeCatalyst"
        ));
        assert!(matches_process_name("TestTarget", "TestTarget.exe"));
        assert!(!matches_process_name("MirrorsEdge.exe", "MirrorsEdgeCatalyst.exe"));
        assert!(!matches_process_name("anything", ""));
    }

    #[test]
    fn test_process_info_matches_image_name() {
        let info = ProcessInfo {
            pid: 100,
            name: "wine64-preloader".to_string(),
            image: Some("MirrorsEdgeCatalyst.exe".to_string()),
        };
        assert!(info.matches("MirrorsEdgeCatalyst.exe"));
        assert!(info.matches("wine64-preloader"));
        assert!(!info.matches("explorer.exe"));
    }

    #[test]
    fn test_attach_unknown_name_is_not_found() {
        let result = ProcessHandle::attach("catalyst-no-such-process-7f3a91.exe");
        match result {
            Err(Error::ProcessNotFound(name)) => {
                assert_eq!(name, "catalyst-no-such-process-7f3a91.exe")
            }
            // Platforms without a backend cannot enumerate processes at all
            Err(Error::Unsupported(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
