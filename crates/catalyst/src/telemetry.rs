//! Polled player telemetry and its text panel.
//!
//! [`Telemetry::poll`] samples every field once per tick. A field whose read
//! fails keeps its previous snapshot for that tick, so a null pointer during
//! a level load does not blank the panel. Only a terminated target is
//! reported back to the caller.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::config::WatchField;
use crate::error::Result;
use crate::game::{GameInfo, MovementState, PlayerInfo, Vec3, yaw};
use crate::memory::{ModuleLookup, ReadMemory, Value};
use crate::snapshot::ValueSnapshot;

/// Latest values read from the game
pub struct Telemetry {
    player: PlayerInfo,
    game: GameInfo,
    watches: Vec<(WatchField, ValueSnapshot<Option<Value>>)>,
    has_position: bool,
    since_position: Duration,
    ticks: u64,
    pub position: ValueSnapshot<Vec3>,
    /// Units per second, derived from consecutive positions
    pub velocity: ValueSnapshot<Vec3>,
    /// Radians, `[0, 2pi)`
    pub yaw: ValueSnapshot<f32>,
    pub movement: ValueSnapshot<Option<MovementState>>,
    pub loading: ValueSnapshot<bool>,
}

impl Telemetry {
    pub fn new(module: &str, watches: Vec<WatchField>) -> Self {
        Self {
            player: PlayerInfo::new(module),
            game: GameInfo::new(module),
            watches: watches
                .into_iter()
                .map(|w| (w, ValueSnapshot::new()))
                .collect(),
            has_position: false,
            since_position: Duration::ZERO,
            ticks: 0,
            position: ValueSnapshot::new(),
            velocity: ValueSnapshot::new(),
            yaw: ValueSnapshot::new(),
            movement: ValueSnapshot::new(),
            loading: ValueSnapshot::new(),
        }
    }

    /// Number of completed polls
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// User-defined watches with their latest value (`None` until first read)
    pub fn watches(&self) -> impl Iterator<Item = (&WatchField, Option<Value>)> {
        self.watches.iter().map(|(w, s)| (w, s.current()))
    }

    /// Horizontal speed in units per second
    pub fn speed(&self) -> f32 {
        self.velocity.current().horizontal_magnitude()
    }

    /// Sample every field. `dt` is the time since the previous poll.
    ///
    /// Returns an error only when the target process is gone.
    pub fn poll<M: ReadMemory + ModuleLookup>(&mut self, memory: &M, dt: Duration) -> Result<()> {
        self.since_position += dt;

        if let Some(loading) = sample(self.game.is_loading(memory), "loading flag")? {
            self.loading.update(loading);
        }

        // Player object is torn down while loading
        if !self.loading.current() {
            self.poll_player(memory)?;
        }

        for (watch, snapshot) in &mut self.watches {
            let value = watch.kind.read_chain(memory, &watch.chain);
            if let Some(value) = sample(value, &watch.label)? {
                snapshot.update(Some(value));
            }
        }

        self.ticks += 1;
        Ok(())
    }

    fn poll_player<M: ReadMemory + ModuleLookup>(&mut self, memory: &M) -> Result<()> {
        if let Some(position) = sample(self.player.position(memory), "position")? {
            // Spans every tick since the last position, including skipped ones
            let seconds = self.since_position.as_secs_f32();
            if self.has_position && seconds > 0.0 {
                self.velocity
                    .update((position - self.position.current()) / seconds);
            }
            self.position.update(position);
            self.has_position = true;
            self.since_position = Duration::ZERO;
        }

        if let Some(angle) = sample(self.player.camera_yaw(memory), "camera yaw")? {
            self.yaw.update(angle);
        }

        if let Some(state) = sample(self.player.movement_state(memory), "movement state")? {
            self.movement.update(state);
        }

        Ok(())
    }
}

/// Turn a per-field failure into a skipped sample; a dead target aborts the tick
fn sample<T>(result: Result<T>, field: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_process_gone() => Err(e),
        Err(e) => {
            debug!("Skipping {} this tick: {}", field, e);
            Ok(None)
        }
    }
}

/// One line of the telemetry panel
pub enum Field {
    /// Fixed text
    Manual(String),
    /// `label: value`, with the value computed on every render
    Computed {
        label: String,
        value: Box<dyn Fn(&Telemetry) -> String + Send>,
    },
}

impl Field {
    pub fn manual(text: impl Into<String>) -> Self {
        Field::Manual(text.into())
    }

    pub fn computed<F>(label: impl Into<String>, value: F) -> Self
    where
        F: Fn(&Telemetry) -> String + Send + 'static,
    {
        Field::Computed {
            label: label.into(),
            value: Box::new(value),
        }
    }

    pub fn render(&self, telemetry: &Telemetry) -> String {
        match self {
            Field::Manual(text) => text.clone(),
            Field::Computed { label, value } => format!("{}: {}", label, value(telemetry)),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Manual(text) => f.debug_tuple("Manual").field(text).finish(),
            Field::Computed { label, .. } => {
                f.debug_struct("Computed").field("label", label).finish()
            }
        }
    }
}

/// Ordered list of panel lines. User watches are appended after the fields.
#[derive(Debug)]
pub struct TelemetryPanel {
    fields: Vec<Field>,
}

impl Default for TelemetryPanel {
    fn default() -> Self {
        Self::new()
            .with(Field::computed("Position", |t| format!("{:.2}", t.position.current())))
            .with(Field::computed("Velocity", |t| format!("{:.2}", t.velocity.current())))
            .with(Field::computed("Speed", |t| format!("{:.2}", t.speed())))
            .with(Field::computed("Yaw", |t| {
                format!("{:.1}°", t.yaw.current() * yaw::RAD_TO_DEG)
            }))
            .with(Field::computed("State", |t| match t.movement.current() {
                Some(state) => state.to_string(),
                None => "Unknown".to_string(),
            }))
            .with(Field::computed("Loading", |t| t.loading.current().to_string()))
    }
}

impl TelemetryPanel {
    /// Panel without any fields
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn render(&self, telemetry: &Telemetry) -> Vec<String> {
        let mut lines: Vec<String> = self.fields.iter().map(|f| f.render(telemetry)).collect();
        for (watch, value) in telemetry.watches() {
            let value = value.map_or_else(|| "-".to_string(), |v| v.to_string());
            lines.push(format!("{}: {}", watch.label, value));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fixture::GameFixture;
    use crate::memory::layout::MODULE_NAME;
    use crate::memory::{PointerChain, ValueKind};

    const TICK: Duration = Duration::from_millis(500);

    #[test]
    fn test_poll_reads_all_fields() {
        let fixture = GameFixture::new();
        fixture.set_position(Vec3::new(1.0, 2.0, 3.0));
        fixture.set_movement(2);
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());

        telemetry.poll(&fixture.memory, TICK).unwrap();

        assert_eq!(telemetry.position.current(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(telemetry.movement.current(), Some(MovementState::Airborne));
        assert!(!telemetry.loading.current());
        assert_eq!(telemetry.ticks(), 1);
        // No previous sample yet
        assert_eq!(telemetry.velocity.current(), Vec3::ZERO);
    }

    #[test]
    fn test_velocity_is_position_delta_over_time() {
        let fixture = GameFixture::new();
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());

        fixture.set_position(Vec3::new(0.0, 0.0, 0.0));
        telemetry.poll(&fixture.memory, TICK).unwrap();
        fixture.set_position(Vec3::new(3.0, 1.0, 4.0));
        telemetry.poll(&fixture.memory, TICK).unwrap();

        assert_eq!(telemetry.velocity.current(), Vec3::new(6.0, 2.0, 8.0));
        assert_eq!(telemetry.speed(), 10.0);
        assert_eq!(telemetry.position.previous(), Vec3::ZERO);
    }

    #[test]
    fn test_velocity_spans_loading_gap() {
        let fixture = GameFixture::new();
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        let tick = Duration::from_millis(100);

        fixture.set_position(Vec3::ZERO);
        telemetry.poll(&fixture.memory, tick).unwrap();

        fixture.set_loading(true);
        for _ in 0..9 {
            telemetry.poll(&fixture.memory, tick).unwrap();
        }

        fixture.set_loading(false);
        fixture.set_position(Vec3::new(10.0, 0.0, 0.0));
        telemetry.poll(&fixture.memory, tick).unwrap();

        let velocity = telemetry.velocity.current();
        assert!((velocity.x - 10.0).abs() < 1e-3, "{}", velocity);
        assert_eq!(velocity.z, 0.0);
    }

    #[test]
    fn test_velocity_spans_failed_position_reads() {
        let fixture = GameFixture::new();
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());

        fixture.set_position(Vec3::ZERO);
        telemetry.poll(&fixture.memory, TICK).unwrap();

        fixture.null_player();
        telemetry.poll(&fixture.memory, TICK).unwrap();

        fixture.restore_player();
        fixture.set_position(Vec3::new(0.0, 0.0, 4.0));
        telemetry.poll(&fixture.memory, TICK).unwrap();

        assert_eq!(telemetry.velocity.current(), Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_failed_read_keeps_previous_snapshot() {
        let fixture = GameFixture::new();
        fixture.set_position(Vec3::new(5.0, 5.0, 5.0));
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        telemetry.poll(&fixture.memory, TICK).unwrap();

        fixture.null_player();
        fixture.set_movement(19);
        telemetry.poll(&fixture.memory, TICK).unwrap();

        assert_eq!(telemetry.position.current(), Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(telemetry.movement.current(), Some(MovementState::Crouching));
        assert_eq!(telemetry.ticks(), 2);
    }

    #[test]
    fn test_player_is_skipped_while_loading() {
        let fixture = GameFixture::new();
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        fixture.set_loading(true);
        fixture.set_position(Vec3::new(1.0, 1.0, 1.0));

        telemetry.poll(&fixture.memory, TICK).unwrap();

        assert!(telemetry.loading.current());
        assert_eq!(telemetry.position.current(), Vec3::ZERO);
    }

    #[test]
    fn test_terminated_process_aborts_poll() {
        let fixture = GameFixture::new();
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        fixture.memory.terminate();

        let err = telemetry.poll(&fixture.memory, TICK).unwrap_err();
        assert!(err.is_process_gone());
        assert_eq!(telemetry.ticks(), 0);
    }

    #[test]
    fn test_watches_are_polled_and_rendered() {
        let fixture = GameFixture::new();
        fixture.set_movement(22);
        let watches = vec![
            WatchField::new(
                "Raw state",
                PointerChain::module(MODULE_NAME, [0x0257_6FDC]),
                ValueKind::I32,
            ),
            WatchField::new(
                "Nowhere",
                PointerChain::absolute(0x10, [0x0]),
                ValueKind::U8,
            ),
        ];
        let mut telemetry = Telemetry::new(MODULE_NAME, watches);
        telemetry.poll(&fixture.memory, TICK).unwrap();

        let lines = TelemetryPanel::new().render(&telemetry);
        assert_eq!(lines, vec!["Raw state: 22 (0x00000016)", "Nowhere: -"]);
    }

    #[test]
    fn test_default_panel() {
        let fixture = GameFixture::new();
        fixture.set_position(Vec3::new(1.0, 2.0, 3.0));
        fixture.set_movement(8);
        let mut telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        telemetry.poll(&fixture.memory, TICK).unwrap();

        let panel = TelemetryPanel::default();
        let lines = panel.render(&telemetry);

        assert_eq!(lines.len(), panel.len());
        assert_eq!(lines[0], "Position: (1.00, 2.00, 3.00)");
        assert!(lines.contains(&"State: Wallrun".to_string()));
        assert!(lines.contains(&"Loading: false".to_string()));
    }

    #[test]
    fn test_manual_field() {
        let telemetry = Telemetry::new(MODULE_NAME, Vec::new());
        let panel = TelemetryPanel::new()
            .with(Field::manual("-- Catalyst --"))
            .with(Field::computed("Ticks", |t| t.ticks().to_string()));

        assert_eq!(panel.render(&telemetry), vec!["-- Catalyst --", "Ticks: 0"]);
    }
}
