//! CLI command implementations.

pub mod hexdump;
pub mod read;
pub mod resolve;
pub mod status;
pub mod teleport;
pub mod watch;
pub mod write;
pub mod yaw;

use anyhow::{Context, Result};
use catalyst::{Catalyst, Config};
use owo_colors::OwoColorize;

/// One-shot attach for the non-interactive commands
pub fn attach(config: &Config, pid: Option<u32>) -> Result<Catalyst> {
    let runtime = config.catalyst_config();
    match pid {
        Some(pid) => {
            Catalyst::open(pid, runtime).with_context(|| format!("cannot open PID {}", pid))
        }
        None => Catalyst::attach(runtime)
            .with_context(|| format!("cannot attach to {}", config.process_name)),
    }
}

/// `label: value` with a highlighted label
pub fn field_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:>12}: {}", label.cyan().bold(), value)
}
