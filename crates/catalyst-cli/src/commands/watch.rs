//! Live telemetry view.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use catalyst::{Config, Telemetry, TelemetryPanel};
use crossterm::{cursor, queue, terminal};
use owo_colors::OwoColorize;
use tracing::{info, warn};

use crate::retry::wait_for_game;
use crate::shutdown::ShutdownSignal;

/// Redraws a block of lines in place
struct Screen<W: Write> {
    out: W,
    drawn: bool,
}

impl<W: Write> Screen<W> {
    fn new(out: W) -> Self {
        Self { out, drawn: false }
    }

    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        if self.drawn {
            queue!(self.out, cursor::RestorePosition)?;
        } else {
            queue!(self.out, cursor::SavePosition)?;
            self.drawn = true;
        }
        queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown))?;

        for line in lines {
            match line.split_once(": ") {
                Some((label, value)) => writeln!(self.out, "{:>10}: {}", label.cyan(), value)?,
                None => writeln!(self.out, "{}", line.bold())?,
            }
        }
        self.out.flush()
    }

    /// Start a fresh block below the current one
    fn reset(&mut self) {
        self.drawn = false;
    }
}

pub fn run(config: &Config, pid: Option<u32>, interval: Option<u64>) -> Result<()> {
    let shutdown = ShutdownSignal::with_ctrlc()?;

    let mut runtime = config.catalyst_config();
    if let Some(ms) = interval {
        runtime.poll_interval = Duration::from_millis(ms);
    }

    let panel = TelemetryPanel::default();
    let mut screen = Screen::new(io::stdout());

    println!("Press Ctrl+C to quit");
    while !shutdown.is_shutdown() {
        let Some(game) = wait_for_game(&runtime, pid, &shutdown)? else {
            break;
        };

        let mut telemetry = game.telemetry(config.watches.clone());
        let result = game.run(&mut telemetry, shutdown.flag(), |t: &Telemetry| {
            if let Err(e) = screen.draw(&panel.render(t)) {
                warn!("Failed to draw telemetry: {}", e);
            }
        });
        screen.reset();

        match result {
            Ok(()) => break,
            Err(e) if e.is_process_gone() => {
                info!("{} exited, waiting for it to restart", runtime.process_name);
            }
            Err(e) => return Err(e.into()),
        }

        // A fixed PID will not come back
        if pid.is_some() {
            break;
        }
        if shutdown.wait(runtime.reattach_delay) {
            break;
        }
    }

    Ok(())
}
