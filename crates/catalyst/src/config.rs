//! Configuration file
//!
//! A JSON file with the process to attach to, the poll timing and any extra
//! chains the user wants to watch next to the built-in telemetry.
//!
//! ```json
//! {
//!   "process_name": "MirrorsEdgeCatalyst.exe",
//!   "poll_interval_ms": 70,
//!   "watches": [
//!     { "label": "Loading", "chain": "MirrorsEdgeCatalyst.exe:0x240C2B8,0x4C1", "kind": "u8" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalyst::CatalystConfig;
use crate::error::Result;
use crate::memory::layout::{self, timing};
use crate::memory::{PointerChain, ValueKind};

/// A user-defined chain shown by the telemetry panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchField {
    pub label: String,
    pub chain: PointerChain,
    #[serde(default)]
    pub kind: ValueKind,
}

impl WatchField {
    pub fn new(label: impl Into<String>, chain: PointerChain, kind: ValueKind) -> Self {
        Self {
            label: label.into(),
            chain,
            kind,
        }
    }
}

/// On-disk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub process_name: String,
    /// Module the built-in chains are rooted at
    pub module_name: String,
    pub poll_interval_ms: u64,
    pub reattach_delay_ms: u64,
    pub watches: Vec<WatchField>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_name: layout::MODULE_NAME.to_string(),
            module_name: layout::MODULE_NAME.to_string(),
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            reattach_delay_ms: timing::REATTACH_DELAY_MS,
            watches: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        debug!(
            "Loaded config from {} ({} watches)",
            path.as_ref().display(),
            config.watches.len()
        );
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                warn!("No config at {}, using defaults", path.as_ref().display());
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Failed to load config {}: {}, using defaults",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        info!("Saved config to {}", path.as_ref().display());
        Ok(())
    }

    /// Runtime settings for [`Catalyst`](crate::Catalyst)
    pub fn catalyst_config(&self) -> CatalystConfig {
        CatalystConfig::builder()
            .process_name(&self.process_name)
            .module_name(&self.module_name)
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .reattach_delay(Duration::from_millis(self.reattach_delay_ms))
            .build()
    }
}
