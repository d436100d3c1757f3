mod commands;
mod retry;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use catalyst::{Config, PointerChain, ValueKind};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalyst")]
#[command(version, about = "Live memory tools for Mirror's Edge Catalyst")]
struct Args {
    /// JSON config file
    #[arg(short, long, global = true, default_value = "catalyst.json")]
    config: PathBuf,

    /// Attach to this PID instead of searching by name
    #[arg(long, global = true)]
    pid: Option<u32>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show live telemetry, re-attaching when the game restarts (default)
    Watch {
        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Print a one-shot snapshot of the game state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read a value at the end of a pointer chain
    Read {
        /// Chain such as "MirrorsEdgeCatalyst.exe:0x240C2B8,0x4C1"
        chain: PointerChain,
        #[arg(short = 't', long = "type", default_value = "i32")]
        kind: ValueKind,
    },
    /// Write a value at the end of a pointer chain
    #[command(allow_negative_numbers = true)]
    Write {
        chain: PointerChain,
        /// Integer (decimal or 0x hex), float, or "x,y,z" for vec3
        value: String,
        #[arg(short = 't', long = "type", default_value = "i32")]
        kind: ValueKind,
    },
    /// Show every step of a chain resolution
    Resolve { chain: PointerChain },
    /// Dump raw bytes at the end of a pointer chain
    Hexdump {
        chain: PointerChain,
        #[arg(short, long, default_value = "256")]
        size: usize,
        /// Hide the ASCII column
        #[arg(long)]
        no_ascii: bool,
    },
    /// Move the player
    #[command(allow_negative_numbers = true)]
    Teleport {
        x: f32,
        y: f32,
        z: f32,
        /// Also move the last ground position (respawn point)
        #[arg(long)]
        ground: bool,
    },
    /// Turn the camera to a yaw in degrees
    #[command(allow_negative_numbers = true)]
    Yaw { degrees: f32 },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("catalyst={}", level).parse()?)
                .add_directive(format!("catalyst_cli={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(&args.config);
    let pid = args.pid;

    match args.command.unwrap_or(Command::Watch { interval: None }) {
        Command::Watch { interval } => commands::watch::run(&config, pid, interval),
        Command::Status { json } => commands::status::run(&config, pid, json),
        Command::Read { chain, kind } => commands::read::run(&config, pid, &chain, kind),
        Command::Write { chain, value, kind } => {
            commands::write::run(&config, pid, &chain, &value, kind)
        }
        Command::Resolve { chain } => commands::resolve::run(&config, pid, &chain),
        Command::Hexdump {
            chain,
            size,
            no_ascii,
        } => commands::hexdump::run(&config, pid, &chain, size, !no_ascii),
        Command::Teleport { x, y, z, ground } => {
            commands::teleport::run(&config, pid, catalyst::Vec3::new(x, y, z), ground)
        }
        Command::Yaw { degrees } => commands::yaw::run(&config, pid, degrees),
    }
}
