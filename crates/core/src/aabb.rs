//! Integer axis-aligned boxes.

use crate::geometry::{volume, Vec3, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its near (min) and far (max) corners.
///
/// Boxes are half-open for overlap purposes: two boxes that only share a face
/// do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB3D {
    /// Near corner.
    pub min: Vec3,
    /// Far corner.
    pub max: Vec3,
}

impl AABB3D {
    /// Creates a box from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a box from a near corner and an extent.
    pub fn from_corner(min: Vec3, extent: Vec3) -> Self {
        Self {
            min,
            max: min + extent,
        }
    }

    /// Returns the extent along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the volume.
    pub fn volume(&self) -> Volume {
        volume(&self.extent())
    }

    /// Returns true if the two boxes share positive volume.
    ///
    /// Equivalent to the negation of the six-way separation disjunction.
    pub fn intersects(&self, other: &AABB3D) -> bool {
        (0..3).all(|axis| self.min[axis] < other.max[axis] && other.min[axis] < self.max[axis])
    }

    /// Returns the overlap of the two boxes, if it has positive volume.
    pub fn intersection(&self, other: &AABB3D) -> Option<AABB3D> {
        if !self.intersects(other) {
            return None;
        }
        Some(AABB3D {
            min: self.min.zip_map(&other.min, |a, b| a.max(b)),
            max: self.max.zip_map(&other.max, |a, b| a.min(b)),
        })
    }

    /// Returns the area shared by the two boxes' projections on the floor plane.
    pub fn footprint_overlap(&self, other: &AABB3D) -> u64 {
        let dx = self.max.x.min(other.max.x).saturating_sub(self.min.x.max(other.min.x));
        let dy = self.max.y.min(other.max.y).saturating_sub(self.min.y.max(other.min.y));
        dx as u64 * dy as u64
    }

    /// Returns true if the box lies inside `[0, bounds]` on every axis.
    pub fn is_within(&self, bounds: &Vec3) -> bool {
        (0..3).all(|axis| self.min[axis] <= self.max[axis] && self.max[axis] <= bounds[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(x: u32, y: u32, z: u32, side: u32) -> AABB3D {
        AABB3D::from_corner(Vec3::new(x, y, z), Vec3::new(side, side, side))
    }

    #[test]
    fn test_intersects() {
        let a = cube(0, 0, 0, 10);
        assert!(a.intersects(&cube(5, 5, 5, 10)));
        assert!(!a.intersects(&cube(10, 0, 0, 10)));
        assert!(!a.intersects(&cube(0, 10, 0, 10)));
        assert!(!a.intersects(&cube(0, 0, 10, 10)));
        assert!(a.intersects(&cube(9, 9, 9, 10)));
    }

    #[test]
    fn test_intersection() {
        let a = cube(0, 0, 0, 10);
        let b = cube(5, 5, 5, 10);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap.min, Vec3::new(5, 5, 5));
        assert_eq!(overlap.max, Vec3::new(10, 10, 10));
        assert_eq!(overlap.volume(), 125);
        assert!(a.intersection(&cube(10, 10, 10, 1)).is_none());
    }

    #[test]
    fn test_footprint_overlap() {
        let a = cube(0, 0, 0, 10);
        assert_eq!(a.footprint_overlap(&cube(5, 5, 10, 10)), 25);
        assert_eq!(a.footprint_overlap(&cube(10, 0, 10, 10)), 0);
    }

    #[test]
    fn test_is_within() {
        let bounds = Vec3::new(20, 20, 20);
        assert!(cube(10, 10, 10, 10).is_within(&bounds));
        assert!(!cube(11, 0, 0, 10).is_within(&bounds));
        assert_eq!(cube(0, 0, 0, 10).extent(), Vec3::new(10, 10, 10));
    }
}
