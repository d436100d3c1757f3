//! In-memory fake of a target process.
//!
//! Implements the same capability traits as [`MemoryReader`](super::MemoryReader)
//! so that chain resolution, typed I/O and the game field tables can be tested
//! without a live process.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::memory::{ModuleLookup, ReadMemory, WriteMemory};

/// Fake PID reported in `ProcessTerminated` errors
pub const MOCK_PID: u32 = 4242;

/// Sparse byte-addressed fake address space
#[derive(Debug)]
pub struct MockMemoryReader {
    bytes: RefCell<HashMap<u64, u8>>,
    modules: HashMap<String, u64>,
    alive: Cell<bool>,
    reads: Cell<usize>,
    pointer_reads: Cell<usize>,
}

impl MockMemoryReader {
    /// Number of `read_into` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Number of pointer dereferences served so far
    pub fn pointer_read_count(&self) -> usize {
        self.pointer_reads.get()
    }

    pub fn reset_counters(&self) {
        self.reads.set(0);
        self.pointer_reads.set(0);
    }

    /// Simulate the target process exiting
    pub fn terminate(&self) {
        self.alive.set(false);
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.alive.get() {
            Ok(())
        } else {
            Err(Error::ProcessTerminated { pid: MOCK_PID })
        }
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        self.ensure_alive()?;
        self.reads.set(self.reads.get() + 1);

        let bytes = self.bytes.borrow();
        for (i, slot) in buffer.iter_mut().enumerate() {
            match bytes.get(&address.wrapping_add(i as u64)) {
                Some(b) => *slot = *b,
                None => {
                    return Err(Error::MemoryReadFault {
                        address,
                        size: buffer.len(),
                        message: format!(
                            "address {:#x} is not mapped",
                            address.wrapping_add(i as u64)
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn read_pointer(&self, address: u64) -> Result<u64> {
        self.pointer_reads.set(self.pointer_reads.get() + 1);
        self.read_u64(address)
    }
}

impl WriteMemory for MockMemoryReader {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        self.ensure_alive()?;

        let mut bytes = self.bytes.borrow_mut();
        let unmapped = (0..data.len() as u64)
            .find(|i| !bytes.contains_key(&address.wrapping_add(*i)));
        if let Some(i) = unmapped {
            return Err(Error::MemoryWriteFault {
                address,
                size: data.len(),
                message: format!("address {:#x} is not mapped", address.wrapping_add(i)),
            });
        }

        for (i, b) in data.iter().enumerate() {
            bytes.insert(address.wrapping_add(i as u64), *b);
        }
        Ok(())
    }
}

impl ModuleLookup for MockMemoryReader {
    fn module_base(&self, module_name: &str) -> Result<u64> {
        self.ensure_alive()?;
        self.modules
            .get(&module_name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| Error::ModuleNotFound(module_name.to_string()))
    }
}

/// Builder for [`MockMemoryReader`]
#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    bytes: HashMap<u64, u8>,
    modules: HashMap<String, u64>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded module
    pub fn module(mut self, name: &str, base: u64) -> Self {
        self.modules.insert(name.to_ascii_lowercase(), base);
        self
    }

    /// Map `size` zeroed bytes at `address` (existing bytes are kept)
    pub fn map(mut self, address: u64, size: usize) -> Self {
        for i in 0..size as u64 {
            self.bytes.entry(address.wrapping_add(i)).or_insert(0);
        }
        self
    }

    pub fn write_bytes(mut self, address: u64, data: &[u8]) -> Self {
        for (i, b) in data.iter().enumerate() {
            self.bytes.insert(address.wrapping_add(i as u64), *b);
        }
        self
    }

    pub fn write_u8(self, address: u64, value: u8) -> Self {
        self.write_bytes(address, &[value])
    }

    pub fn write_i32(self, address: u64, value: i32) -> Self {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    pub fn write_u32(self, address: u64, value: u32) -> Self {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    pub fn write_u64(self, address: u64, value: u64) -> Self {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    pub fn write_f32(self, address: u64, value: f32) -> Self {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    /// Store a pointer-sized value
    pub fn pointer(self, address: u64, target: u64) -> Self {
        self.write_u64(address, target)
    }

    /// Lay out a chain of heap objects so that walking `base + offsets[0]`
    /// through the remaining offsets ends in a mapped field.
    ///
    /// Intermediate objects are placed at `heap`, `heap + 0x10000`, ...
    /// Returns the builder and the final field address (`field_size` bytes
    /// are mapped there).
    pub fn link_chain(
        mut self,
        base: u64,
        offsets: &[i64],
        heap: u64,
        field_size: usize,
    ) -> (Self, u64) {
        let Some((first, rest)) = offsets.split_first() else {
            return (self.map(base, field_size), base);
        };

        let mut address = base.wrapping_add_signed(*first);
        for (i, offset) in rest.iter().enumerate() {
            let object = heap + (i as u64) * 0x10000;
            self = self.pointer(address, object);
            address = object.wrapping_add_signed(*offset);
        }
        (self.map(address, field_size), address)
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            bytes: RefCell::new(self.bytes),
            modules: self.modules,
            alive: Cell::new(true),
            reads: Cell::new(0),
            pointer_reads: Cell::new(0),
        }
    }
}
