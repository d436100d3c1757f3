use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::memory::ProcessHandle;

/// Size of a pointer in the 64-bit target
pub const POINTER_SIZE: usize = 8;

/// Read access to the target's address space.
///
/// Implementors only need `read_into`; everything else is built on it.
pub trait ReadMemory {
    /// Fill `buffer` with the bytes starting at `address`.
    ///
    /// Must fail rather than return a partially filled buffer.
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()>;

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.read_into(address, &mut buffer)?;
        Ok(buffer)
    }

    fn read_u8(&self, address: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_into(address, &mut buf)?;
        Ok(buf[0])
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_into(address, &mut buf)?;
        Ok(i32::from_ne_bytes(buf))
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_into(address, &mut buf)?;
        Ok(u32::from_ne_bytes(buf))
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(address, &mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_into(address, &mut buf)?;
        Ok(f32::from_ne_bytes(buf))
    }

    /// Read a pointer-sized value
    fn read_pointer(&self, address: u64) -> Result<u64> {
        self.read_u64(address)
    }

    /// Read a fixed-layout value, reinterpreting the raw bytes in native order.
    fn read_value<T: Pod>(&self, address: u64) -> Result<T>
    where
        Self: Sized,
    {
        let bytes = self.read_bytes(address, std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }
}

/// Write access to the target's address space.
pub trait WriteMemory {
    /// Write all of `bytes` at `address`; a partial write is an error.
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()>;

    fn write_value<T: Pod>(&self, address: u64, value: T) -> Result<()>
    where
        Self: Sized,
    {
        self.write_bytes(address, bytemuck::bytes_of(&value))
    }
}

/// Lookup of loaded module base addresses in the target.
pub trait ModuleLookup {
    fn module_base(&self, module_name: &str) -> Result<u64>;
}

/// Memory accessor bound to an attached process
#[derive(Clone, Copy)]
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }

    pub fn process(&self) -> &'a ProcessHandle {
        self.process
    }
}

impl ReadMemory for MemoryReader<'_> {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        self.process.read_into(address, buffer)
    }
}

impl WriteMemory for MemoryReader<'_> {
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        self.process.write_bytes(address, bytes)
    }
}

impl ModuleLookup for MemoryReader<'_> {
    fn module_base(&self, module_name: &str) -> Result<u64> {
        self.process.module_base(module_name)
    }
}

/// Build the error for a read that came back short.
pub(crate) fn short_read(address: u64, size: usize, read: usize) -> Error {
    Error::MemoryReadFault {
        address,
        size,
        message: format!("only {} of {} bytes were read", read, size),
    }
}

/// Build the error for a write that went through only partially.
pub(crate) fn short_write(address: u64, size: usize, written: usize) -> Error {
    Error::MemoryWriteFault {
        address,
        size,
        message: format!("only {} of {} bytes were written", written, size),
    }
}
