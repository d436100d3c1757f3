use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Three f32 components, laid out exactly as the game stores them
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const AXIS_X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const AXIS_Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const AXIS_Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Unit vector from a pitch in `[-pi/2, pi/2]` and a yaw measured
    /// counterclockwise from the X axis (radians)
    pub fn from_angles(pitch: f32, yaw: f32) -> Self {
        Self::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
    }

    pub fn magnitude_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Length of the projection on the ground (XZ) plane
    pub fn horizontal_magnitude(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalized(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            Self::ZERO
        } else {
            self / magnitude
        }
    }

    /// Horizontal perpendicular to the right
    pub fn right(self) -> Self {
        Self::new(-self.z, 0.0, self.x)
    }

    /// Horizontal perpendicular to the left
    pub fn left(self) -> Self {
        Self::new(self.z, 0.0, -self.x)
    }

    /// Component-wise product
    pub fn scale(self, other: Vec3) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).magnitude()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vec3> for f32 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs * self
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// `(x, y, z)`; honors a precision such as `{:.2}`
impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "({:.*}, {:.*}, {:.*})", p, self.x, p, self.y, p, self.z),
            None => write!(f, "({}, {}, {})", self.x, self.y, self.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_layout_is_three_packed_floats() {
        assert_eq!(std::mem::size_of::<Vec3>(), 12);

        let v = Vec3::new(1.0, 2.0, 3.0);
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());
    }

    #[test]
    fn test_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, -1.0, 0.5);

        assert_eq!(a + b, Vec3::new(5.0, 1.0, 3.5));
        assert_eq!(a - b, Vec3::new(-3.0, 3.0, 2.5));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, 2.0 * a);
        assert_eq!(a / 2.0, Vec3::new(0.5, 1.0, 1.5));
        assert_eq!(a.dot(b), 3.5);
        assert_eq!(a.scale(b), Vec3::new(4.0, -2.0, 1.5));
    }

    #[test]
    fn test_cross_follows_right_hand_rule() {
        assert_eq!(Vec3::AXIS_X.cross(Vec3::AXIS_Y), Vec3::AXIS_Z);
        assert_eq!(Vec3::AXIS_Y.cross(Vec3::AXIS_Z), Vec3::AXIS_X);
    }

    #[test]
    fn test_normalized() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
        assert!(approx(v.normalized(), Vec3::new(0.6, 0.0, 0.8)));
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }

    #[test]
    fn test_from_angles() {
        assert!(approx(Vec3::from_angles(0.0, 0.0), Vec3::AXIS_X));
        assert!(approx(
            Vec3::from_angles(0.0, std::f32::consts::FRAC_PI_2),
            Vec3::AXIS_Z
        ));
        assert!(approx(
            Vec3::from_angles(std::f32::consts::FRAC_PI_2, 1.0),
            Vec3::AXIS_Y
        ));
    }

    #[test]
    fn test_left_and_right_are_horizontal_perpendiculars() {
        let forward = Vec3::new(1.0, 0.5, 0.0);
        assert_eq!(forward.right(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(forward.left(), -forward.right());
        assert_eq!(forward.right().dot(forward), 0.0);
    }

    #[test]
    fn test_display_precision() {
        let v = Vec3::new(1.0, 2.26, -3.5);
        assert_eq!(format!("{}", v), "(1, 2.26, -3.5)");
        assert_eq!(format!("{:.1}", v), "(1.0, 2.3, -3.5)");
    }
}
