use anyhow::Result;
use catalyst::{Config, MovementState, Vec3, game::yaw};
use serde::Serialize;
use tracing::debug;

use super::{attach, field_line};

#[derive(Debug, Serialize)]
struct StatusReport {
    pid: u32,
    process: String,
    base_address: u64,
    loading: Option<bool>,
    movement_state: Option<MovementState>,
    position: Option<Vec3>,
    last_ground_position: Option<Vec3>,
    /// Degrees
    yaw: Option<f32>,
    facing: Option<Vec3>,
}

/// Keep going when a single field is unavailable (e.g. during a load)
fn optional<T>(result: catalyst::Result<T>, field: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_process_gone() => Err(e.into()),
        Err(e) => {
            debug!("{} unavailable: {}", field, e);
            Ok(None)
        }
    }
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unavailable".to_string(), |v| v.to_string())
}

pub fn run(config: &Config, pid: Option<u32>, json: bool) -> Result<()> {
    let game = attach(config, pid)?;
    let memory = game.memory();
    let player = game.player();

    let report = StatusReport {
        pid: game.process().pid,
        process: game.process().name.clone(),
        base_address: game.process().base_address,
        loading: optional(game.game().is_loading(&memory), "loading flag")?,
        movement_state: optional(player.movement_state(&memory), "movement state")?.flatten(),
        position: optional(player.position(&memory), "position")?,
        last_ground_position: optional(player.last_ground_position(&memory), "ground position")?,
        yaw: optional(player.camera_yaw(&memory), "yaw")?.map(|r| r * yaw::RAD_TO_DEG),
        facing: optional(player.camera_yaw_vector(&memory), "yaw vector")?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", field_line("Process", format!("{} (PID {})", report.process, report.pid)));
    println!("{}", field_line("Base", format!("{:#X}", report.base_address)));
    println!("{}", field_line("Loading", show(report.loading)));
    println!("{}", field_line("State", show(report.movement_state)));
    println!("{}", field_line("Position", show(report.position.map(|p| format!("{:.3}", p)))));
    println!(
        "{}",
        field_line("Ground", show(report.last_ground_position.map(|p| format!("{:.3}", p))))
    );
    println!("{}", field_line("Yaw", show(report.yaw.map(|d| format!("{:.2}°", d)))));
    println!("{}", field_line("Facing", show(report.facing.map(|v| format!("{:.3}", v)))));
    Ok(())
}
