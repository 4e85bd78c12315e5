//! Item and vehicle geometry.
//!
//! All coordinates and dimensions are non-negative integers. Axis `x` carries an
//! item's effective length, `y` its effective width and `z` its effective height.
//! The vehicle's access opening is the face at `y = width`.

use crate::{Error, Result};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer 3-vector used for dimensions and positions.
pub type Vec3 = Vector3<u32>;

/// Stable input index of an item.
pub type ItemId = usize;

/// Largest number of items accepted in one instance.
pub const MAX_ITEMS: usize = 1000;

/// Volumes and volume sums. Wide enough for any `u32` extent times
/// [`MAX_ITEMS`] items.
pub type Volume = u128;

/// Returns the volume of an extent.
pub fn volume(extent: &Vec3) -> Volume {
    extent.x as Volume * extent.y as Volume * extent.z as Volume
}

/// One of the six axis-aligned rotations of a cuboid.
///
/// Each variant names the reference dimensions that end up on the x, y and z
/// axes, e.g. [`Orientation::Whl`] puts the reference width along x, the
/// reference height along y and the reference length along z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// (L, W, H), the reference orientation.
    #[default]
    Lwh,
    /// (L, H, W).
    Lhw,
    /// (W, L, H).
    Wlh,
    /// (W, H, L).
    Whl,
    /// (H, L, W).
    Hlw,
    /// (H, W, L).
    Hwl,
}

impl Orientation {
    /// All orientations in index order.
    pub const ALL: [Orientation; 6] = [
        Orientation::Lwh,
        Orientation::Lhw,
        Orientation::Wlh,
        Orientation::Whl,
        Orientation::Hlw,
        Orientation::Hwl,
    ];

    /// Returns the orientation index (0-5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the orientation with the given index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Reference axis placed along x, y and z.
    fn axes(self) -> [usize; 3] {
        match self {
            Orientation::Lwh => [0, 1, 2],
            Orientation::Lhw => [0, 2, 1],
            Orientation::Wlh => [1, 0, 2],
            Orientation::Whl => [1, 2, 0],
            Orientation::Hlw => [2, 0, 1],
            Orientation::Hwl => [2, 1, 0],
        }
    }

    /// Maps reference dimensions to effective (length, width, height).
    pub fn apply(self, reference: &Vec3) -> Vec3 {
        let [a, b, c] = self.axes();
        Vec3::new(reference[a], reference[b], reference[c])
    }

    /// Finds the lowest-index orientation turning `reference` into `effective`.
    pub fn from_effective(reference: &Vec3, effective: &Vec3) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.apply(reference) == *effective)
    }
}

/// A cuboid to be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Input index.
    id: ItemId,

    /// Reference dimensions (length, width, height).
    dimensions: Vec3,

    /// Delivery rank, smaller leaves the vehicle first. `None` is unconstrained.
    delivery: Option<u32>,
}

impl Item {
    /// Creates an unranked item.
    pub fn new(id: ItemId, length: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            dimensions: Vec3::new(length, width, height),
            delivery: None,
        }
    }

    /// Sets the delivery rank.
    pub fn with_delivery(mut self, rank: u32) -> Self {
        self.delivery = Some(rank);
        self
    }

    /// Returns the input index.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the reference dimensions.
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    /// Returns the delivery rank.
    pub fn delivery(&self) -> Option<u32> {
        self.delivery
    }

    /// Returns the volume, which every orientation preserves.
    pub fn volume(&self) -> Volume {
        volume(&self.dimensions)
    }

    /// Returns effective dimensions for an orientation.
    pub fn extent(&self, orientation: Orientation) -> Vec3 {
        orientation.apply(&self.dimensions)
    }

    /// Returns orientations with pairwise distinct extents, in index order.
    ///
    /// Duplicate extents (cubes, square faces) keep their lowest index only.
    pub fn distinct_orientations(&self) -> Vec<(Orientation, Vec3)> {
        let mut out: Vec<(Orientation, Vec3)> = Vec::with_capacity(6);
        for orientation in Orientation::ALL {
            let extent = self.extent(orientation);
            if !out.iter().any(|(_, e)| *e == extent) {
                out.push((orientation, extent));
            }
        }
        out
    }

    /// Validates the item.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return Err(Error::InvalidItem(format!(
                "All dimensions of item {} must be positive",
                self.id
            )));
        }

        if self.delivery == Some(0) {
            return Err(Error::InvalidItem(format!(
                "Delivery rank of item {} must be positive",
                self.id
            )));
        }

        Ok(())
    }
}

/// Interior dimensions shared by every vehicle of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleSpec {
    /// Dimensions (length, width, height).
    dimensions: Vec3,
}

impl VehicleSpec {
    /// Creates a vehicle specification.
    pub fn new(length: u32, width: u32, height: u32) -> Self {
        Self {
            dimensions: Vec3::new(length, width, height),
        }
    }

    /// Returns the dimensions.
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    /// Returns the length (x).
    pub fn length(&self) -> u32 {
        self.dimensions.x
    }

    /// Returns the width (y).
    pub fn width(&self) -> u32 {
        self.dimensions.y
    }

    /// Returns the height (z).
    pub fn height(&self) -> u32 {
        self.dimensions.z
    }

    /// Returns the interior volume.
    pub fn volume(&self) -> Volume {
        volume(&self.dimensions)
    }

    /// Returns true if an extent fits an empty vehicle.
    pub fn admits(&self, extent: &Vec3) -> bool {
        extent.x <= self.dimensions.x
            && extent.y <= self.dimensions.y
            && extent.z <= self.dimensions.z
    }

    /// Validates the vehicle.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return Err(Error::InvalidVehicle(
                "All dimensions must be positive".into(),
            ));
        }
        Ok(())
    }
}
