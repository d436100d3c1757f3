//! Attached-game context.
//!
//! [`Catalyst`] owns the process handle and the field tables for one running
//! game. It replaces process-wide state: every consumer receives the context
//! (or a [`MemoryReader`] borrowed from it) explicitly.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use catalyst::{Catalyst, CatalystConfig};
//!
//! let config = CatalystConfig::builder()
//!     .poll_interval(std::time::Duration::from_millis(50))
//!     .build();
//! let game = Catalyst::attach(config)?;
//!
//! let mut telemetry = game.telemetry(Vec::new());
//! let shutdown = AtomicBool::new(false);
//! game.run(&mut telemetry, &shutdown, |t| println!("{}", t.position.current()))?;
//! ```

mod poll_loop;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracing::debug;

use crate::config::WatchField;
use crate::error::Result;
use crate::game::{GameInfo, PlayerInfo};
use crate::memory::layout::{self, timing};
use crate::memory::{MemoryReader, ProcessHandle};
use crate::telemetry::Telemetry;

pub use poll_loop::run_poll_loop;

/// Runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct CatalystConfig {
    /// Executable name to attach to
    pub process_name: String,
    /// Module the game chains are rooted at
    pub module_name: String,
    pub poll_interval: Duration,
    /// Wait before looking for the process again after it exits
    pub reattach_delay: Duration,
}

impl Default for CatalystConfig {
    fn default() -> Self {
        Self {
            process_name: layout::MODULE_NAME.to_string(),
            module_name: layout::MODULE_NAME.to_string(),
            poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
            reattach_delay: Duration::from_millis(timing::REATTACH_DELAY_MS),
        }
    }
}

impl CatalystConfig {
    pub fn builder() -> CatalystConfigBuilder {
        CatalystConfigBuilder::default()
    }
}

/// Builder for CatalystConfig
#[derive(Debug, Clone, Default)]
pub struct CatalystConfigBuilder {
    process_name: Option<String>,
    module_name: Option<String>,
    poll_interval: Option<Duration>,
    reattach_delay: Option<Duration>,
}

impl CatalystConfigBuilder {
    pub fn process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn reattach_delay(mut self, delay: Duration) -> Self {
        self.reattach_delay = Some(delay);
        self
    }

    pub fn build(self) -> CatalystConfig {
        let default = CatalystConfig::default();
        CatalystConfig {
            process_name: self.process_name.unwrap_or(default.process_name),
            module_name: self.module_name.unwrap_or(default.module_name),
            poll_interval: self.poll_interval.unwrap_or(default.poll_interval),
            reattach_delay: self.reattach_delay.unwrap_or(default.reattach_delay),
        }
    }
}

/// A running game
#[derive(Debug)]
pub struct Catalyst {
    config: CatalystConfig,
    process: ProcessHandle,
    player: PlayerInfo,
    game: GameInfo,
}

impl Catalyst {
    /// Attach to the first process named `config.process_name`
    pub fn attach(config: CatalystConfig) -> Result<Self> {
        let process = ProcessHandle::attach(&config.process_name)?;
        Ok(Self::with_process(process, config))
    }

    /// Attach to a specific PID
    pub fn open(pid: u32, config: CatalystConfig) -> Result<Self> {
        let process = ProcessHandle::open(pid)?;
        Ok(Self::with_process(process, config))
    }

    pub fn with_process(process: ProcessHandle, config: CatalystConfig) -> Self {
        debug!(
            "Game fields rooted at {} in PID {}",
            config.module_name, process.pid
        );
        Self {
            player: PlayerInfo::new(&config.module_name),
            game: GameInfo::new(&config.module_name),
            config,
            process,
        }
    }

    pub fn config(&self) -> &CatalystConfig {
        &self.config
    }

    pub fn process(&self) -> &ProcessHandle {
        &self.process
    }

    pub fn memory(&self) -> MemoryReader<'_> {
        MemoryReader::new(&self.process)
    }

    pub fn player(&self) -> &PlayerInfo {
        &self.player
    }

    pub fn game(&self) -> &GameInfo {
        &self.game
    }

    pub fn is_alive(&self) -> bool {
        self.process.is_alive()
    }

    /// Fresh telemetry for this game's module
    pub fn telemetry(&self, watches: Vec<WatchField>) -> Telemetry {
        Telemetry::new(&self.config.module_name, watches)
    }

    /// Poll `telemetry` at the configured interval until `shutdown` is set or
    /// the game exits
    pub fn run<F: FnMut(&Telemetry)>(
        &self,
        telemetry: &mut Telemetry,
        shutdown: &AtomicBool,
        on_tick: F,
    ) -> Result<()> {
        run_poll_loop(
            &self.memory(),
            telemetry,
            self.config.poll_interval,
            shutdown,
            on_tick,
        )
    }

    /// Release the process handle
    pub fn detach(mut self) {
        self.process.release();
    }
}
