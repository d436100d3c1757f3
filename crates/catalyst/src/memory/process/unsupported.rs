use super::{OsError, OsResult, ProcessInfo};
use crate::error::{Error, Result};

pub(super) struct RawProcess;

fn unsupported() -> Error {
    Error::Unsupported("process memory access needs Windows or Linux".to_string())
}

pub(super) fn processes() -> Result<Vec<ProcessInfo>> {
    Err(unsupported())
}

pub(super) fn open(_pid: u32) -> Result<RawProcess> {
    Err(unsupported())
}

impl RawProcess {
    pub(super) fn read(&self, _address: u64, _buffer: &mut [u8]) -> OsResult<usize> {
        Err(OsError::AccessDenied("unsupported platform".to_string()))
    }

    pub(super) fn write(&self, _address: u64, _bytes: &[u8]) -> OsResult<usize> {
        Err(OsError::AccessDenied("unsupported platform".to_string()))
    }

    pub(super) fn module_base(&self, _module_name: &str) -> Result<Option<u64>> {
        Err(unsupported())
    }

    pub(super) fn is_alive(&self) -> bool {
        false
    }

    pub(super) fn close(self) {}
}
