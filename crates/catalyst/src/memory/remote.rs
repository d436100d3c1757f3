use std::fmt;
use std::marker::PhantomData;

use bytemuck::Pod;

use crate::error::Result;
use crate::memory::{ModuleLookup, PointerChain, ReadMemory, WriteMemory};

/// Resolve `chain` and read a `T` at the resulting address.
pub fn read_at_chain<T, M>(memory: &M, chain: &PointerChain) -> Result<T>
where
    T: Pod,
    M: ReadMemory + ModuleLookup,
{
    let address = chain.resolve(memory)?;
    memory.read_value(address)
}

/// Resolve `chain` and write `value` at the resulting address.
pub fn write_at_chain<T, M>(memory: &M, chain: &PointerChain, value: T) -> Result<()>
where
    T: Pod,
    M: ReadMemory + WriteMemory + ModuleLookup,
{
    let address = chain.resolve(memory)?;
    memory.write_value(address, value)
}

/// A typed field at the end of a pointer chain.
///
/// Holds no address: every access walks the chain again.
pub struct RemoteValue<T> {
    chain: PointerChain,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Pod> RemoteValue<T> {
    pub fn new(chain: PointerChain) -> Self {
        Self {
            chain,
            _marker: PhantomData,
        }
    }

    pub fn chain(&self) -> &PointerChain {
        &self.chain
    }

    /// Current dynamic address of the field
    pub fn address<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<u64> {
        self.chain.resolve(memory)
    }

    pub fn read<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<T> {
        read_at_chain(memory, &self.chain)
    }

    pub fn write<M: ReadMemory + WriteMemory + ModuleLookup>(
        &self,
        memory: &M,
        value: T,
    ) -> Result<()> {
        write_at_chain(memory, &self.chain, value)
    }
}

impl<T> Clone for RemoteValue<T> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RemoteValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteValue")
            .field("type", &std::any::type_name::<T>())
            .field("chain", &self.chain.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MockMemoryBuilder;

    const BASE: u64 = 0x40_0000;

    #[test]
    fn test_static_int_read_then_write() {
        let mock = MockMemoryBuilder::new()
            .module("TestTarget.exe", BASE)
            .write_i32(BASE + 0x10, 42)
            .build();
        let chain = PointerChain::module("TestTarget.exe", [0x10]);

        assert_eq!(read_at_chain::<i32, _>(&mock, &chain).unwrap(), 42);

        write_at_chain(&mock, &chain, 7i32).unwrap();
        assert_eq!(read_at_chain::<i32, _>(&mock, &chain).unwrap(), 7);
    }

    #[test]
    fn test_chain_is_resolved_on_every_access() {
        let mock = MockMemoryBuilder::new()
            .module("TestTarget.exe", BASE)
            .pointer(BASE + 0x100, 0x9000)
            .write_u32(0x9008, 1)
            .map(0xA000, 16)
            .write_u32(0xA008, 2)
            .build();
        let value = RemoteValue::<u32>::new(PointerChain::module("TestTarget.exe", [0x100, 0x8]));

        assert_eq!(value.read(&mock).unwrap(), 1);

        // The game moved the object
        mock.write_value(BASE + 0x100, 0xA000u64).unwrap();
        assert_eq!(value.address(&mock).unwrap(), 0xA008);
        assert_eq!(value.read(&mock).unwrap(), 2);
    }

    #[test]
    fn test_null_pointer_fails_at_io_step() {
        let mock = MockMemoryBuilder::new()
            .module("TestTarget.exe", BASE)
            .pointer(BASE + 0x100, 0)
            .build();
        let value = RemoteValue::<f32>::new(PointerChain::module("TestTarget.exe", [0x100, 0x30]));

        assert_eq!(value.address(&mock).unwrap(), 0x30);
        assert!(matches!(
            value.read(&mock),
            Err(Error::MemoryReadFault { address: 0x30, .. })
        ));
        assert!(matches!(
            value.write(&mock, 1.0),
            Err(Error::MemoryWriteFault { address: 0x30, .. })
        ));
    }

    #[test]
    fn test_terminated_process() {
        let mock = MockMemoryBuilder::new()
            .module("TestTarget.exe", BASE)
            .write_i32(BASE + 0x10, 42)
            .build();
        let value = RemoteValue::<i32>::new(PointerChain::module("TestTarget.exe", [0x10]));
        mock.terminate();

        assert!(value.read(&mock).unwrap_err().is_process_gone());
        assert!(value.write(&mock, 1).unwrap_err().is_process_gone());
    }

    #[test]
    fn test_debug_shows_chain_text() {
        let value = RemoteValue::<u8>::new(PointerChain::module("a.exe", [0x4C1]));
        let text = format!("{:?}", value);
        assert!(text.contains("a.exe:0x4C1"));
        assert!(text.contains("u8"));
    }
}
