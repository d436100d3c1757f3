use anyhow::Result;
use catalyst::Config;
use catalyst::game::yaw::{DEG_TO_RAD, RAD_TO_DEG};

use super::{attach, field_line};

pub fn run(config: &Config, pid: Option<u32>, degrees: f32) -> Result<()> {
    let game = attach(config, pid)?;
    let memory = game.memory();
    let player = game.player();

    let before = player.camera_yaw(&memory)? * RAD_TO_DEG;
    player.set_camera_yaw(&memory, degrees * DEG_TO_RAD)?;
    let after = player.camera_yaw(&memory)? * RAD_TO_DEG;

    println!("{}", field_line("Before", format!("{:.2}°", before)));
    println!("{}", field_line("After", format!("{:.2}°", after)));
    Ok(())
}
