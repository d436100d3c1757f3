use crate::error::Result;
use crate::memory::layout;
use crate::memory::{ModuleLookup, ReadMemory, RemoteValue};

/// Global game state
#[derive(Debug, Clone)]
pub struct GameInfo {
    loading: RemoteValue<u8>,
}

impl GameInfo {
    pub fn new(module: &str) -> Self {
        Self {
            loading: RemoteValue::new(layout::loading_flag(module)),
        }
    }

    /// Whether a level is loading. Player fields are unreliable meanwhile.
    pub fn is_loading<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<bool> {
        Ok(self.loading.read(memory)? != 0)
    }
}
