//! Fake game address space shared by the game and telemetry tests

use crate::game::Vec3;
use crate::memory::layout::{self, game, ground, player};
use crate::memory::{MockMemoryBuilder, MockMemoryReader, ReadMemory, WriteMemory};

pub const MODULE_BASE: u64 = 0x1_4000_0000;
const PLAYER_ROOT: u64 = 0x10_0000;

pub struct GameFixture {
    pub memory: MockMemoryReader,
    /// Object holding the primary transform copy
    pub primary: u64,
    /// Object holding the mirror transform copy
    pub mirror: u64,
    /// Address of the last ground position
    pub ground: u64,
    pub loading: u64,
    pub movement: u64,
}

impl GameFixture {
    pub fn new() -> Self {
        let root = PLAYER_ROOT;
        let controller = 0x11_0000;
        let pawn = 0x12_0000;
        let holder = 0x13_0000;
        let primary = 0x20_0000;
        let mirror = 0x30_0000;
        let loading_object = 0x50_0000;
        let movement = MODULE_BASE + player::MOVEMENT_STATE as u64;

        let builder = MockMemoryBuilder::new()
            .module(layout::MODULE_NAME, MODULE_BASE)
            .pointer(MODULE_BASE + player::ROOT as u64, root)
            .pointer(root + player::PATH[0] as u64, controller)
            .pointer(controller + player::PATH[1] as u64, pawn)
            .pointer(pawn + player::PATH[2] as u64, holder)
            .pointer(holder + player::PRIMARY as u64, primary)
            .pointer(holder + player::MIRROR as u64, mirror)
            .map(primary + 0x22C0, 0x20)
            .map(mirror + 0x22C0, 0x20)
            .write_i32(movement, 1)
            .pointer(MODULE_BASE + game::LOADING_ROOT as u64, loading_object)
            .write_u8(loading_object + game::LOADING_FLAG as u64, 0);

        let mut offsets = vec![ground::ROOT];
        offsets.extend_from_slice(&ground::PATH);
        offsets.push(ground::POSITION);
        let (builder, ground) = builder.link_chain(MODULE_BASE, &offsets, 0x60_0000, 12);

        Self {
            memory: builder.build(),
            primary,
            mirror,
            ground,
            loading: loading_object + game::LOADING_FLAG as u64,
            movement,
        }
    }

    pub fn vec3(&self, address: u64) -> Vec3 {
        self.memory.read_value(address).unwrap()
    }

    pub fn set_vec3(&self, address: u64, value: Vec3) {
        self.memory.write_value(address, value).unwrap();
    }

    pub fn f32(&self, address: u64) -> f32 {
        self.memory.read_f32(address).unwrap()
    }

    /// Store the player position in both transform copies
    pub fn set_position(&self, value: Vec3) {
        self.set_vec3(self.primary + player::POSITION as u64, value);
        self.set_vec3(self.mirror + player::POSITION as u64, value);
    }

    pub fn set_movement(&self, raw: i32) {
        self.memory.write_value(self.movement, raw).unwrap();
    }

    pub fn set_loading(&self, loading: bool) {
        self.memory.write_value(self.loading, loading as u8).unwrap();
    }

    /// Simulate the player object being torn down (level transition)
    pub fn null_player(&self) {
        self.memory
            .write_value(MODULE_BASE + player::ROOT as u64, 0u64)
            .unwrap();
    }

    pub fn restore_player(&self) {
        self.memory
            .write_value(MODULE_BASE + player::ROOT as u64, PLAYER_ROOT)
            .unwrap();
    }
}
