use anyhow::Result;
use catalyst::{Config, PointerChain, ValueKind};
use tracing::info;

use super::{attach, field_line};

pub fn run(
    config: &Config,
    pid: Option<u32>,
    chain: &PointerChain,
    text: &str,
    kind: ValueKind,
) -> Result<()> {
    let value = kind.parse(text)?;
    let game = attach(config, pid)?;
    let memory = game.memory();

    let address = chain.resolve(&memory)?;
    let before = kind.read_at(&memory, address)?;
    value.write_at(&memory, address)?;
    let after = kind.read_at(&memory, address)?;
    info!("Wrote {} to {:#X}", value, address);

    println!("{}", field_line("Address", format!("{:#X}", address)));
    println!("{}", field_line("Before", before));
    println!("{}", field_line("After", after));
    Ok(())
}
