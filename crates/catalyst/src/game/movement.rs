use serde::Serialize;
use strum::{Display, FromRepr};

/// Player movement state as stored by the game (i32)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, FromRepr, Serialize)]
#[repr(i32)]
pub enum MovementState {
    Dead = -1,
    /// Transient value while switching between two states
    #[default]
    StateChange = 0,
    Standing = 1,
    Airborne = 2,
    Vaulting = 3,
    Wallclimb = 4,
    HorizontalBar = 5,
    VoluntarySlide = 6,
    CoilJump = 7,
    Wallrun = 8,
    MagropePullObject = 10,
    ClimbLadderOrPipe = 11,
    HorizontalBarSwing = 13,
    GoodLanding = 16,
    InvoluntarySlide = 17,
    LedgeGrab = 18,
    Crouching = 19,
    LightAttackSpecial = 20,
    Springboard = 22,
    MagropeClimb = 23,
    BadLanding = 24,
    MagropeSwing = 25,
    HeavyAttack = 26,
    LightAttack = 27,
    Zipline = 29,
    Shifting = 30,
    OpenDoor = 31,
}

impl MovementState {
    /// Map a raw value read from the game; `None` for unknown values
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::from_repr(raw)
    }

    pub fn raw(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(MovementState::from_raw(-1), Some(MovementState::Dead));
        assert_eq!(MovementState::from_raw(8), Some(MovementState::Wallrun));
        assert_eq!(MovementState::from_raw(31), Some(MovementState::OpenDoor));
        assert_eq!(MovementState::from_raw(9), None);
        assert_eq!(MovementState::from_raw(1000), None);
    }

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(MovementState::LedgeGrab.raw(), 18);
        assert_eq!(
            MovementState::from_raw(MovementState::Zipline.raw()),
            Some(MovementState::Zipline)
        );
    }

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(MovementState::HorizontalBarSwing.to_string(), "HorizontalBarSwing");
        assert_eq!(MovementState::default().to_string(), "StateChange");
    }
}
