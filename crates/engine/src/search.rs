//! Bottom-left-back placement search.
//!
//! Candidate near corners are drawn from `{0}` and the far faces of committed
//! boxes on each axis, so the candidate count grows with the number of placed
//! boxes rather than with the vehicle volume. Candidates are scanned in
//! `(z, x, y)` order and the first one passing the overlap, accessibility and
//! support checks wins. Orientations are tried in index order.
//!
//! The search only proposes; committing is left to the caller.

use crate::access;
use crate::load::{PlacedBox, VehicleLoad};
use rayon::prelude::*;
use truckpack_core::{Item, Orientation, Vec3, VehicleSpec, AABB3D};

/// Vehicles with fewer boxes are searched on the calling thread.
const PARALLEL_THRESHOLD: usize = 16;

/// A feasible spot for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    /// Orientation chosen.
    pub orientation: Orientation,
    /// Effective dimensions under `orientation`.
    pub extent: Vec3,
    /// Near corner.
    pub position: Vec3,
}

impl Proposal {
    /// Returns the box the item would occupy.
    pub fn aabb(&self) -> AABB3D {
        AABB3D::from_corner(self.position, self.extent)
    }
}

/// Stateless placement search for one vehicle shape.
#[derive(Debug, Clone)]
pub struct PlacementSearch {
    bounds: Vec3,
    min_support: Option<f64>,
    parallel: bool,
}

impl PlacementSearch {
    /// Creates a search for vehicles shaped like `vehicle`.
    pub fn new(vehicle: &VehicleSpec) -> Self {
        Self {
            bounds: *vehicle.dimensions(),
            min_support: None,
            parallel: false,
        }
    }

    /// Requires `ratio` of an elevated base to be supported.
    pub fn with_support(mut self, ratio: Option<f64>) -> Self {
        self.min_support = ratio;
        self
    }

    /// Evaluates orientations on the rayon pool for crowded vehicles.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the support ratio in effect.
    pub fn min_support(&self) -> Option<f64> {
        self.min_support
    }

    /// Finds the first orientation, in index order, with a feasible position.
    pub fn find(&self, item: &Item, load: &VehicleLoad) -> Option<Proposal> {
        self.find_among(item, &item.distinct_orientations(), load)
    }

    /// Like [`find`](Self::find), restricted to `orientations`.
    pub fn find_among(
        &self,
        item: &Item,
        orientations: &[(Orientation, Vec3)],
        load: &VehicleLoad,
    ) -> Option<Proposal> {
        let try_orientation = |&(orientation, extent): &(Orientation, Vec3)| {
            self.position_for(item, extent, load)
                .map(|position| Proposal {
                    orientation,
                    extent,
                    position,
                })
        };

        if self.parallel && load.len() >= PARALLEL_THRESHOLD && orientations.len() > 1 {
            orientations.par_iter().find_map_first(try_orientation)
        } else {
            orientations.iter().find_map(try_orientation)
        }
    }

    /// Finds the lowest `(z, x, y)` position for one extent.
    pub fn position_for(&self, item: &Item, extent: Vec3, load: &VehicleLoad) -> Option<Vec3> {
        if (0..3).any(|axis| extent[axis] > self.bounds[axis]) {
            return None;
        }

        let placed = load.boxes();
        let xs = self.candidate_axis(placed, 0, extent.x);
        let ys = self.candidate_axis(placed, 1, extent.y);
        let zs = self.candidate_axis(placed, 2, extent.z);

        for &z in &zs {
            let layer: Vec<&PlacedBox> = placed
                .iter()
                .filter(|b| b.aabb.min.z < z + extent.z && z < b.aabb.max.z)
                .collect();

            for &x in &xs {
                let column: Vec<&PlacedBox> = layer
                    .iter()
                    .copied()
                    .filter(|b| b.aabb.min.x < x + extent.x && x < b.aabb.max.x)
                    .collect();

                for &y in &ys {
                    let candidate = AABB3D::from_corner(Vec3::new(x, y, z), extent);

                    if column.iter().any(|b| b.overlaps(&candidate)) {
                        continue;
                    }
                    if !access::admits(item.delivery(), &candidate, placed) {
                        continue;
                    }
                    if let Some(ratio) = self.min_support {
                        if load.support_ratio(&candidate) < ratio {
                            continue;
                        }
                    }

                    return Some(candidate.min);
                }
            }
        }

        None
    }

    /// Sorted, deduplicated near-corner coordinates along one axis.
    fn candidate_axis(&self, placed: &[PlacedBox], axis: usize, extent: u32) -> Vec<u32> {
        let limit = self.bounds[axis] - extent;
        let mut coords: Vec<u32> = std::iter::once(0)
            .chain(placed.iter().map(|b| b.aabb.max[axis]))
            .filter(|&c| c <= limit)
            .collect();
        coords.sort_unstable();
        coords.dedup();
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::PlacedBox;

    fn commit(load: &mut VehicleLoad, item: &Item, proposal: Proposal) {
        load.commit(PlacedBox::new(item, &proposal));
    }

    #[test]
    fn test_empty_vehicle_origin() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let search = PlacementSearch::new(&vehicle);
        let item = Item::new(0, 30, 40, 10);

        let proposal = search.find(&item, &VehicleLoad::new(0)).unwrap();
        assert_eq!(proposal.orientation, Orientation::Lwh);
        assert_eq!(proposal.position, Vec3::zeros());
    }

    #[test]
    fn test_first_orientation_wins() {
        // Only fits lying on its side.
        let vehicle = VehicleSpec::new(40, 40, 20);
        let search = PlacementSearch::new(&vehicle);
        let item = Item::new(0, 10, 10, 35);

        let proposal = search.find(&item, &VehicleLoad::new(0)).unwrap();
        assert_eq!(proposal.orientation, Orientation::Lhw);
        assert_eq!(proposal.extent, Vec3::new(10, 35, 10));
    }

    #[test]
    fn test_prefers_low_z_then_x_then_y() {
        let vehicle = VehicleSpec::new(20, 20, 20);
        let search = PlacementSearch::new(&vehicle);
        let first = Item::new(0, 10, 10, 10);
        let mut load = VehicleLoad::new(0);

        let p = search.find(&first, &load).unwrap();
        commit(&mut load, &first, p);

        // Floor candidates (x=0, y=10) beat (x=10, y=0).
        let second = Item::new(1, 10, 10, 10);
        let p = search.find(&second, &load).unwrap();
        assert_eq!(p.position, Vec3::new(0, 10, 0));
        commit(&mut load, &second, p);

        let third = Item::new(2, 10, 10, 10);
        let p = search.find(&third, &load).unwrap();
        assert_eq!(p.position, Vec3::new(10, 0, 0));
    }

    #[test]
    fn test_full_vehicle_has_no_position() {
        let vehicle = VehicleSpec::new(10, 10, 10);
        let search = PlacementSearch::new(&vehicle);
        let first = Item::new(0, 10, 10, 10);
        let mut load = VehicleLoad::new(0);
        let p = search.find(&first, &load).unwrap();
        commit(&mut load, &first, p);

        assert!(search.find(&Item::new(1, 1, 1, 1), &load).is_none());
    }

    #[test]
    fn test_accessibility_blocks_position() {
        let vehicle = VehicleSpec::new(40, 40, 20);
        let search = PlacementSearch::new(&vehicle);
        let later = Item::new(0, 10, 10, 10).with_delivery(2);
        let mut load = VehicleLoad::new(0);
        let p = search.find(&later, &load).unwrap();
        commit(&mut load, &later, p);

        // The earlier item must sit beyond the later one along y, or above it.
        let earlier = Item::new(1, 10, 10, 10).with_delivery(1);
        let p = search.find(&earlier, &load).unwrap();
        assert_eq!(p.position, Vec3::new(0, 10, 0));
        assert!(access::holds(&p.aabb(), &load.boxes()[0].aabb));
    }

    #[test]
    fn test_support_requirement() {
        let vehicle = VehicleSpec::new(20, 10, 20);
        let search = PlacementSearch::new(&vehicle).with_support(Some(0.5));
        let mut load = VehicleLoad::new(0);

        let pillar = Item::new(0, 5, 10, 10);
        let p = search.find(&pillar, &load).unwrap();
        commit(&mut load, &pillar, p);
        let slab = Item::new(1, 15, 10, 10);
        let p = search.find(&slab, &load).unwrap();
        assert_eq!(p.position, Vec3::new(5, 0, 0));
        commit(&mut load, &slab, p);

        let top = Item::new(2, 20, 10, 10);
        let p = search.find(&top, &load).unwrap();
        assert_eq!(p.position, Vec3::new(0, 0, 10));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let vehicle = VehicleSpec::new(100, 100, 100);
        let sequential = PlacementSearch::new(&vehicle);
        let parallel = PlacementSearch::new(&vehicle).with_parallel(true);
        let mut load = VehicleLoad::new(0);

        for id in 0..40 {
            let item = Item::new(id, 10 + (id as u32 % 3) * 5, 10, 20);
            let a = sequential.find(&item, &load);
            let b = parallel.find(&item, &load);
            assert_eq!(a, b);
            if let Some(p) = a {
                commit(&mut load, &item, p);
            }
        }
    }
}
