use anyhow::Result;
use catalyst::{Config, Vec3};
use tracing::info;

use super::{attach, field_line};

pub fn run(config: &Config, pid: Option<u32>, target: Vec3, ground: bool) -> Result<()> {
    let game = attach(config, pid)?;
    let memory = game.memory();
    let player = game.player();

    let from = player.position(&memory)?;
    player.set_position(&memory, target)?;
    if ground {
        player.set_last_ground_position(&memory, target)?;
    }
    info!("Teleported {:.2} units", from.distance(target));

    println!("{}", field_line("From", format!("{:.3}", from)));
    println!("{}", field_line("To", format!("{:.3}", player.position(&memory)?)));
    Ok(())
}
