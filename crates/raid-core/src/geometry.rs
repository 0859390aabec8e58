//! World-space positions
//!
//! The world is a large continuous square centred on the origin. `y` is
//! elevation; distance checks between events are done on the ground plane.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// The origin. Hosts report it for "no position", so it is never a valid placement.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position on the ground plane at elevation zero
    pub fn flat(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Full 3D distance
    pub fn distance(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Squared distance on the ground plane
    pub fn distance_xz_sq(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Distance on the ground plane, ignoring elevation
    pub fn distance_xz(&self, other: Vec3) -> f32 {
        self.distance_xz_sq(other).sqrt()
    }

    /// True when `other` lies within `radius` on the ground plane
    pub fn within_xz(&self, other: Vec3, radius: f32) -> bool {
        self.distance_xz_sq(other) <= radius * radius
    }

    pub fn with_y(&self, y: f32) -> Self {
        Self { y, ..*self }
    }

    pub fn offset_xz(&self, dx: f32, dz: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y,
            z: self.z + dz,
        }
    }

    /// Two positions closer than a centimetre identify the same spot
    pub fn same_spot(&self, other: Vec3) -> bool {
        self.distance_xz_sq(other) < 0.0001
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_xz_ignores_elevation() {
        let a = Vec3::new(0.0, 100.0, 0.0);
        let b = Vec3::new(3.0, -50.0, 4.0);
        assert_eq!(a.distance_xz(b), 5.0);
        assert!(a.within_xz(b, 5.0));
        assert!(!a.within_xz(b, 4.9));
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Vec3::ZERO.is_zero());
        assert!(!Vec3::flat(1.0, 0.0).is_zero());
    }
}
