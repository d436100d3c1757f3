//! Game-specific views over the remote memory layer

mod info;
mod movement;
mod player;
mod vec3;
pub mod yaw;

#[cfg(test)]
pub(crate) mod fixture;

pub use info::GameInfo;
pub use movement::MovementState;
pub use player::PlayerInfo;
pub use vec3::Vec3;
