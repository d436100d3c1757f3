//! Memory layout constants for Mirror's Edge Catalyst
//!
//! All chains are rooted at the main executable module, so they survive ASLR.
//! Offsets were reverse-engineered against the PC release and are only
//! meaningful for that build.

use crate::memory::PointerChain;

/// Process and main module name
pub const MODULE_NAME: &str = "MirrorsEdgeCatalyst.exe";

/// Player controller object
///
/// The game keeps two copies of the player transform, reached through
/// `0x18` and `0x20` on the last dereference. Reads use the first copy,
/// writes must update both or the game snaps back.
pub mod player {
    /// Module offset of the static pointer to the player root
    pub const ROOT: i64 = 0x0257_8A68;

    /// Dereference path from the root to the transform holder
    pub const PATH: [i64; 3] = [0x70, 0x98, 0x238];

    pub const PRIMARY: i64 = 0x18;
    pub const MIRROR: i64 = 0x20;

    /// Position (3 x f32, right-handed)
    pub const POSITION: i64 = 0x22D0;

    /// sin(yaw / 2), sign not reliable on its own
    pub const SIN_HALF_YAW: i64 = 0x22C4;

    /// cos(yaw / 2), sign not reliable on its own
    pub const COS_HALF_YAW: i64 = 0x22CC;

    /// Module offset of the movement state (i32, no dereference)
    pub const MOVEMENT_STATE: i64 = 0x0257_6FDC;
}

/// Last position where the player stood on the ground
pub mod ground {
    pub const ROOT: i64 = 0x023D_A028;
    pub const PATH: [i64; 4] = [0x20, 0x20, 0x40, 0x20];

    /// Position (3 x f32)
    pub const POSITION: i64 = 0x0;
    /// Y component of the position
    pub const Y: i64 = 0x4;
}

/// Global game state
pub mod game {
    pub const LOADING_ROOT: i64 = 0x0240_C2B8;
    /// Non-zero while a level is loading (u8)
    pub const LOADING_FLAG: i64 = 0x4C1;
}

/// Timing constants for polling
pub mod timing {
    /// Refresh interval of the telemetry poll loop (ms)
    pub const POLL_INTERVAL_MS: u64 = 70;

    /// Delay before looking for the process again after it exits (ms)
    pub const REATTACH_DELAY_MS: u64 = 5000;
}

/// Chain to a field of one copy of the player transform
pub fn player_field(module: &str, copy: i64, field: i64) -> PointerChain {
    let mut offsets = vec![player::ROOT];
    offsets.extend_from_slice(&player::PATH);
    offsets.push(copy);
    offsets.push(field);
    PointerChain::module(module, offsets)
}

/// Chain to a field of the last-ground-position object
pub fn ground_field(module: &str, field: i64) -> PointerChain {
    let mut offsets = vec![ground::ROOT];
    offsets.extend_from_slice(&ground::PATH);
    offsets.push(field);
    PointerChain::module(module, offsets)
}

pub fn movement_state(module: &str) -> PointerChain {
    PointerChain::module(module, [player::MOVEMENT_STATE])
}

pub fn loading_flag(module: &str) -> PointerChain {
    PointerChain::module(module, [game::LOADING_ROOT, game::LOADING_FLAG])
}
