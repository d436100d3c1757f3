use anyhow::Result;
use catalyst::{Config, PointerChain, ResolveStep};
use owo_colors::OwoColorize;

use super::attach;

pub fn run(config: &Config, pid: Option<u32>, chain: &PointerChain) -> Result<()> {
    let game = attach(config, pid)?;
    let steps = chain.trace(&game.memory())?;

    println!("{}", chain.bold());
    for line in format_steps(&steps) {
        println!("{}", line);
    }
    if let Some(last) = steps.last() {
        println!("=> {}", format!("{:#X}", last.address).green().bold());
    }
    Ok(())
}

fn format_offset(offset: i64) -> String {
    if offset < 0 {
        format!("-{:#X}", offset.unsigned_abs())
    } else {
        format!("+{:#X}", offset)
    }
}

fn format_steps(steps: &[ResolveStep]) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| match (step.read_from, step.pointer) {
            (Some(from), Some(pointer)) => format!(
                "[{}] *{:#X} = {:#X} {} => {:#X}",
                i,
                from,
                pointer,
                format_offset(step.offset),
                step.address
            ),
            _ => format!("[{}] base {} => {:#X}", i, format_offset(step.offset), step.address),
        })
        .collect()
}
