//! Placement representation for committed items.

use crate::aabb::AABB3D;
use crate::geometry::{volume, ItemId, Orientation, Vec3, Volume};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the placement of an item inside a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Input index of the placed item.
    pub item: ItemId,

    /// Vehicle the item is loaded into (0-based, contiguous).
    pub vehicle: usize,

    /// Chosen orientation.
    pub orientation: Orientation,

    /// Near corner (x, y, z).
    pub position: Vec3,

    /// Effective dimensions under `orientation`.
    pub extent: Vec3,
}

impl Placement {
    /// Creates a new placement.
    pub fn new(
        item: ItemId,
        vehicle: usize,
        orientation: Orientation,
        position: Vec3,
        extent: Vec3,
    ) -> Self {
        Self {
            item,
            vehicle,
            orientation,
            position,
            extent,
        }
    }

    /// Returns the x coordinate of the near corner.
    pub fn x(&self) -> u32 {
        self.position.x
    }

    /// Returns the y coordinate of the near corner.
    pub fn y(&self) -> u32 {
        self.position.y
    }

    /// Returns the z coordinate of the near corner.
    pub fn z(&self) -> u32 {
        self.position.z
    }

    /// Returns the far corner, `position + extent`.
    pub fn far_corner(&self) -> Vec3 {
        self.position + self.extent
    }

    /// Returns the occupied box.
    pub fn aabb(&self) -> AABB3D {
        AABB3D::from_corner(self.position, self.extent)
    }

    /// Returns the occupied volume.
    pub fn volume(&self) -> Volume {
        volume(&self.extent)
    }
}

/// Placement statistics for a set of placements.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementStats {
    /// Total number of placements.
    pub count: usize,
    /// Number of placements using a non-reference orientation.
    pub rotated_count: usize,
    /// Distribution of orientation indices used.
    pub orientation_distribution: BTreeMap<usize, usize>,
    /// Distribution of placements per vehicle.
    pub vehicle_distribution: BTreeMap<usize, usize>,
}

impl PlacementStats {
    /// Computes statistics from a set of placements.
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut stats = Self {
            count: placements.len(),
            ..Default::default()
        };

        for p in placements {
            if p.orientation != Orientation::Lwh {
                stats.rotated_count += 1;
            }

            *stats
                .orientation_distribution
                .entry(p.orientation.index())
                .or_insert(0) += 1;

            *stats.vehicle_distribution.entry(p.vehicle).or_insert(0) += 1;
        }

        stats
    }
}
