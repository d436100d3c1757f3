use tracing::debug;

use crate::error::{Error, Result};
use crate::game::{MovementState, Vec3, yaw};
use crate::memory::layout::{self, ground, player};
use crate::memory::{ModuleLookup, PointerChain, ReadMemory, RemoteValue, WriteMemory};

/// Player fields of a running game.
///
/// Every accessor resolves its chain again, so the values stay correct when
/// the game reallocates the player object (level loads, respawns).
/// Setters that touch the transform update both copies the game keeps.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    position: [RemoteValue<Vec3>; 2],
    sin_half_yaw: [RemoteValue<f32>; 2],
    cos_half_yaw: [RemoteValue<f32>; 2],
    ground_position: RemoteValue<Vec3>,
    ground_y: RemoteValue<f32>,
    movement_state: RemoteValue<i32>,
}

impl PlayerInfo {
    /// Field table rooted at `module` (normally [`layout::MODULE_NAME`])
    pub fn new(module: &str) -> Self {
        Self {
            position: both_copies(module, player::POSITION),
            sin_half_yaw: both_copies(module, player::SIN_HALF_YAW),
            cos_half_yaw: both_copies(module, player::COS_HALF_YAW),
            ground_position: RemoteValue::new(layout::ground_field(module, ground::POSITION)),
            ground_y: RemoteValue::new(layout::ground_field(module, ground::Y)),
            movement_state: RemoteValue::new(layout::movement_state(module)),
        }
    }

    pub fn position_chain(&self) -> &PointerChain {
        self.position[0].chain()
    }

    pub fn position<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<Vec3> {
        self.position[0].read(memory)
    }

    pub fn set_position<M>(&self, memory: &M, position: Vec3) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        for field in &self.position {
            field.write(memory, position)?;
        }
        debug!("Player moved to {:.2}", position);
        Ok(())
    }

    /// Where the player last stood on solid ground (respawn point after a fall)
    pub fn last_ground_position<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<Vec3> {
        self.ground_position.read(memory)
    }

    pub fn set_last_ground_position<M>(&self, memory: &M, position: Vec3) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        self.ground_position.write(memory, position)
    }

    pub fn set_last_ground_y<M>(&self, memory: &M, y: f32) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        self.ground_y.write(memory, y)
    }

    fn half_yaw<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<(f32, f32)> {
        Ok((
            self.sin_half_yaw[0].read(memory)?,
            self.cos_half_yaw[0].read(memory)?,
        ))
    }

    fn set_half_yaw<M>(&self, memory: &M, (sin, cos): (f32, f32)) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        for (sin_field, cos_field) in self.sin_half_yaw.iter().zip(&self.cos_half_yaw) {
            sin_field.write(memory, sin)?;
            cos_field.write(memory, cos)?;
        }
        Ok(())
    }

    /// Camera yaw in radians, `[0, 2pi)`
    pub fn camera_yaw<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<f32> {
        let (sin, cos) = self.half_yaw(memory)?;
        Ok(yaw::decode_yaw(sin, cos))
    }

    /// Any angle is accepted; it is wrapped into `[0, 2pi)` first
    pub fn set_camera_yaw<M>(&self, memory: &M, angle: f32) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        self.set_half_yaw(memory, yaw::encode_yaw(angle))
    }

    /// Horizontal unit vector the camera faces
    pub fn camera_yaw_vector<M: ReadMemory + ModuleLookup>(&self, memory: &M) -> Result<Vec3> {
        let (sin, cos) = self.half_yaw(memory)?;
        Ok(yaw::yaw_vector(sin, cos))
    }

    pub fn set_camera_yaw_vector<M>(&self, memory: &M, direction: Vec3) -> Result<()>
    where
        M: ReadMemory + WriteMemory + ModuleLookup,
    {
        let half = yaw::half_angles_from_vector(direction).ok_or_else(|| {
            Error::InvalidValue(format!("{} has no horizontal direction", direction))
        })?;
        self.set_half_yaw(memory, half)
    }

    /// `None` when the game reports a value outside the known states
    pub fn movement_state<M: ReadMemory + ModuleLookup>(
        &self,
        memory: &M,
    ) -> Result<Option<MovementState>> {
        let raw = self.movement_state.read(memory)?;
        let state = MovementState::from_raw(raw);
        if state.is_none() {
            debug!("Unknown movement state {}", raw);
        }
        Ok(state)
    }
}

fn both_copies<T: bytemuck::Pod>(module: &str, field: i64) -> [RemoteValue<T>; 2] {
    [player::PRIMARY, player::MIRROR]
        .map(|copy| RemoteValue::new(layout::player_field(module, copy, field)))
}
