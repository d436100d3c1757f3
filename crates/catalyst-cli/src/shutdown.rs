use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::info;

/// Stop flag shared by the poll loop, the attach wait and the Ctrl-C handler.
///
/// [`wait`](Self::wait) returns as soon as the flag is raised instead of
/// sleeping out the full duration.
pub struct ShutdownSignal {
    flag: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// New signal raised by Ctrl-C
    pub fn with_ctrlc() -> anyhow::Result<Arc<Self>> {
        let signal = Arc::new(Self::new());
        let handler_signal = Arc::clone(&signal);
        ctrlc::set_handler(move || {
            info!("Interrupted, stopping...");
            handler_signal.trigger();
        })?;
        Ok(signal)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` or until triggered. Returns `true` when triggered.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let Ok(guard) = self.mutex.lock() else {
            return true;
        };
        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_shutdown())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            // Poisoned
            Err(_) => true,
        }
    }

    /// Raw flag for library loops that stop when it is set
    pub fn flag(&self) -> &AtomicBool {
        &self.flag
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_runs_out() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();

        assert!(!signal.wait(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_trigger_wakes_waiter() {
        let signal = Arc::new(ShutdownSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                (signal.wait(Duration::from_secs(10)), start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(30));
        signal.trigger();

        let (triggered, elapsed) = waiter.join().unwrap();
        assert!(triggered);
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_flag_follows_trigger() {
        let signal = ShutdownSignal::new();
        assert!(!signal.flag().load(Ordering::SeqCst));

        signal.trigger();
        assert!(signal.flag().load(Ordering::SeqCst));
        assert!(signal.wait(Duration::from_secs(10)));
    }
}
