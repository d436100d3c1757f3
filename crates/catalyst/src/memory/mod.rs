mod chain;
pub mod layout;
mod process;
mod reader;
mod remote;
mod value;

// Fake target for unit and integration tests
#[doc(hidden)]
pub mod mock;

pub use chain::{BaseAddress, PointerChain, ResolveStep};
pub use process::{ProcessHandle, ProcessInfo, list_processes, matches_process_name};
pub use reader::{MemoryReader, ModuleLookup, POINTER_SIZE, ReadMemory, WriteMemory};
pub use remote::{RemoteValue, read_at_chain, write_at_chain};
pub use value::{Value, ValueKind};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
