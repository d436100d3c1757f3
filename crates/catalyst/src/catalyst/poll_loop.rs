use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::memory::{ModuleLookup, ReadMemory};
use crate::telemetry::Telemetry;

/// Poll `telemetry` every `interval` until `shutdown` is set.
///
/// `on_tick` runs after every poll. Returns `Ok` when stopped through
/// `shutdown` and the error when the target goes away.
pub fn run_poll_loop<M, F>(
    memory: &M,
    telemetry: &mut Telemetry,
    interval: Duration,
    shutdown: &AtomicBool,
    mut on_tick: F,
) -> Result<()>
where
    M: ReadMemory + ModuleLookup,
    F: FnMut(&Telemetry),
{
    debug!("Starting poll loop ({}ms)", interval.as_millis());
    let mut last = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        let now = Instant::now();
        if let Err(e) = telemetry.poll(memory, now - last) {
            info!("Poll loop stopped: {}", e);
            return Err(e);
        }
        last = now;
        on_tick(telemetry);

        thread::sleep(interval);
    }

    debug!("Poll loop stopped after {} ticks", telemetry.ticks());
    Ok(())
}
