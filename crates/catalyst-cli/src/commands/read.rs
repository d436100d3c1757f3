use anyhow::Result;
use catalyst::{Config, PointerChain, ValueKind};

use super::{attach, field_line};

pub fn run(config: &Config, pid: Option<u32>, chain: &PointerChain, kind: ValueKind) -> Result<()> {
    let game = attach(config, pid)?;
    let memory = game.memory();

    let address = chain.resolve(&memory)?;
    let value = kind.read_at(&memory, address)?;

    println!("{}", field_line("Chain", chain));
    println!("{}", field_line("Address", format!("{:#X}", address)));
    println!("{}", field_line(&kind.to_string(), value));
    Ok(())
}
