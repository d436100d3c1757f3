//! Camera yaw conversions
//!
//! The game stores the yaw as the half-angle pair `sin(yaw / 2)` and
//! `cos(yaw / 2)`. Their signs flip as the camera turns, so the raw pair is
//! normalized here before it is turned into an angle or a direction.
//!
//! Angles are radians in `[0, 2pi)`. A yaw of 0 faces +X; yaw grows
//! clockwise when viewed from above, so the facing vector is
//! `(cos yaw, 0, -sin yaw)`.

use std::f32::consts::TAU;

use crate::game::Vec3;

pub const PI2: f32 = TAU;
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// Above this angle (240 degrees) the game stores both components negated
const NEGATED_ABOVE: f32 = 4.188_790_2;

/// Floored modulo: the result always has the sign of `b`
pub fn div_mod(a: f32, b: f32) -> f32 {
    ((a % b) + b) % b
}

/// Yaw angle from the stored half-angle pair
pub fn decode_yaw(sin_half: f32, cos_half: f32) -> f32 {
    let half = sin_half.abs().min(1.0).asin();
    if sin_half < 0.0 || cos_half < 0.0 {
        PI2 - 2.0 * half
    } else {
        2.0 * half
    }
}

/// Half-angle pair to store for `angle`; returns `(sin, cos)`
pub fn encode_yaw(angle: f32) -> (f32, f32) {
    let angle = div_mod(angle, PI2);
    let (sin, cos) = (angle / 2.0).sin_cos();
    if angle > NEGATED_ABOVE {
        (-sin, -cos)
    } else {
        (sin, cos)
    }
}

/// Horizontal unit vector the camera faces
pub fn yaw_vector(sin_half: f32, cos_half: f32) -> Vec3 {
    let (sin, cos) = if sin_half < 0.0 {
        (-sin_half, -cos_half)
    } else {
        (sin_half, cos_half)
    };
    Vec3::new(cos * cos - sin * sin, 0.0, -2.0 * sin * cos)
}

/// Half-angle pair for a facing direction; only the horizontal part of
/// `direction` is used. `None` for a vertical or zero vector.
pub fn half_angles_from_vector(direction: Vec3) -> Option<(f32, f32)> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).normalized();
    if flat == Vec3::ZERO {
        return None;
    }

    let mut sin = -(0.5 - flat.x / 2.0).max(0.0).sqrt();
    let mut cos = (0.5 + flat.x / 2.0).max(0.0).sqrt();
    if flat.z < 0.0 {
        if cos > 0.5 {
            sin = -sin;
        } else {
            cos = -cos;
        }
    }
    Some((sin, cos))
}
