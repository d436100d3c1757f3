//! Waiting for the game to start.

use anyhow::{Result, bail};
use catalyst::{Catalyst, CatalystConfig, Error};
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownSignal;

/// Errors that retrying cannot fix
fn is_fatal(e: &Error) -> bool {
    matches!(e, Error::Unsupported(_) | Error::AccessDenied(_))
}

/// Attach to the game, retrying every `reattach_delay` until it is running.
///
/// Returns `Ok(None)` if shutdown was signaled.
pub fn wait_for_game(
    config: &CatalystConfig,
    pid: Option<u32>,
    shutdown: &ShutdownSignal,
) -> Result<Option<Catalyst>> {
    let mut attempts = 0u32;

    loop {
        if shutdown.is_shutdown() {
            return Ok(None);
        }
        attempts += 1;

        let attempt = match pid {
            Some(pid) => Catalyst::open(pid, config.clone()),
            None => Catalyst::attach(config.clone()),
        };

        match attempt {
            Ok(game) => return Ok(Some(game)),
            Err(e) if is_fatal(&e) => bail!("Cannot attach to {}: {}", config.process_name, e),
            Err(Error::ProcessNotFound(_)) => {
                if attempts == 1 {
                    info!("Waiting for {}...", config.process_name);
                } else {
                    debug!("{} not running (attempt {})", config.process_name, attempts);
                }
            }
            Err(e) => warn!(
                "Attach failed ({}), retrying in {}s",
                e,
                config.reattach_delay.as_secs()
            ),
        }

        if shutdown.wait(config.reattach_delay) {
            return Ok(None);
        }
    }
}
