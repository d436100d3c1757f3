use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Module not found in target process: {0}")]
    ModuleNotFound(String),

    #[error("Target process (PID {pid}) has terminated")]
    ProcessTerminated { pid: u32 },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to read {size} bytes at address {address:#x}: {message}")]
    MemoryReadFault {
        address: u64,
        size: usize,
        message: String,
    },

    #[error("Failed to write {size} bytes at address {address:#x}: {message}")]
    MemoryWriteFault {
        address: u64,
        size: usize,
        message: String,
    },

    #[error("Invalid pointer chain: {0}")]
    InvalidChain(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// The target is gone and the handle must be re-acquired with a new attach.
    pub fn is_process_gone(&self) -> bool {
        matches!(self, Error::ProcessTerminated { .. })
    }

    /// Faults a polling loop can ride out by trying again next tick
    /// (e.g. pointers that are null while a level is loading).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::MemoryReadFault { .. } | Error::MemoryWriteFault { .. }
        )
    }
}
