//! # catalyst
//!
//! Live memory access for Mirror's Edge Catalyst.
//!
//! This crate provides:
//! - Process attach and release by executable name or PID (Windows and Linux)
//! - Multi-level pointer chain resolution from a module base
//! - Typed reads and writes of plain-data values at resolved addresses
//! - Previous/current value tracking for polled quantities
//! - Game field tables (player transform, camera yaw, movement state, loading
//!   flag) and a polled telemetry panel built on top of them
//!
//! ## Example
//!
//! ```ignore
//! use catalyst::{PointerChain, ProcessHandle, MemoryReader, read_at_chain};
//!
//! let process = ProcessHandle::attach("MirrorsEdgeCatalyst.exe")?;
//! let memory = MemoryReader::new(&process);
//!
//! let chain: PointerChain = "MirrorsEdgeCatalyst.exe:0x2576FDC".parse()?;
//! let state: i32 = read_at_chain(&memory, &chain)?;
//! ```

pub mod catalyst;
pub mod config;
pub mod error;
pub mod game;
pub mod memory;
pub mod snapshot;
pub mod telemetry;

pub use catalyst::{Catalyst, CatalystConfig, CatalystConfigBuilder, run_poll_loop};
pub use config::{Config, WatchField};
pub use error::{Error, Result};
pub use game::{GameInfo, MovementState, PlayerInfo, Vec3};
pub use memory::{
    BaseAddress, MemoryReader, ModuleLookup, PointerChain, ProcessHandle, ProcessInfo,
    ReadMemory, RemoteValue, ResolveStep, Value, ValueKind, WriteMemory, list_processes,
    read_at_chain, write_at_chain,
};
pub use snapshot::ValueSnapshot;
pub use telemetry::{Field, Telemetry, TelemetryPanel};
