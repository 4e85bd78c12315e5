//! Committed vehicle state.
//!
//! A [`LoadPlan`] is the allocator's exclusively-owned working state: one
//! [`VehicleLoad`] per opened vehicle plus the item-to-vehicle assignment. It is
//! threaded through construction and improvement and turned into a
//! [`Solution`] once the search is done.

use crate::feasibility::volume_lower_bound;
use crate::search::Proposal;
use truckpack_core::{
    Error, Item, ItemId, Orientation, Placement, Result, Solution, Vec3, VehicleSpec,
    VehicleStats, Volume, AABB3D,
};

/// A box committed to a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedBox {
    /// Input index of the item.
    pub item: ItemId,
    /// Chosen orientation.
    pub orientation: Orientation,
    /// Occupied space.
    pub aabb: AABB3D,
    /// Delivery rank of the item.
    pub delivery: Option<u32>,
}

impl PlacedBox {
    /// Creates a placed box from a search proposal.
    pub fn new(item: &Item, proposal: &Proposal) -> Self {
        Self {
            item: item.id(),
            orientation: proposal.orientation,
            aabb: proposal.aabb(),
            delivery: item.delivery(),
        }
    }

    /// Returns the near corner.
    pub fn position(&self) -> Vec3 {
        self.aabb.min
    }

    /// Returns the far corner.
    pub fn max_corner(&self) -> Vec3 {
        self.aabb.max
    }

    /// Returns the effective extent.
    pub fn extent(&self) -> Vec3 {
        self.aabb.extent()
    }

    /// Returns the volume.
    pub fn volume(&self) -> Volume {
        self.aabb.volume()
    }

    /// Checks if this box overlaps with another box.
    pub fn overlaps(&self, other: &AABB3D) -> bool {
        self.aabb.intersects(other)
    }
}

/// One opened vehicle and the boxes committed to it, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct VehicleLoad {
    id: usize,
    placed: Vec<PlacedBox>,
    occupied_volume: Volume,
}

impl VehicleLoad {
    /// Creates an empty vehicle.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            placed: Vec::new(),
            occupied_volume: 0,
        }
    }

    /// Returns the vehicle id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the committed boxes.
    pub fn boxes(&self) -> &[PlacedBox] {
        &self.placed
    }

    /// Returns the number of committed boxes.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Returns true if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Returns the cached occupied volume.
    pub fn occupied_volume(&self) -> Volume {
        self.occupied_volume
    }

    /// Returns occupied volume over `capacity`.
    pub fn fill_ratio(&self, capacity: Volume) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        self.occupied_volume as f64 / capacity as f64
    }

    /// Commits a box.
    pub fn commit(&mut self, placed: PlacedBox) {
        self.occupied_volume += placed.volume();
        self.placed.push(placed);
    }

    /// Removes the box of `item`, keeping the order of the others.
    pub fn remove(&mut self, item: ItemId) -> Option<PlacedBox> {
        let index = self.placed.iter().position(|b| b.item == item)?;
        let placed = self.placed.remove(index);
        self.occupied_volume -= placed.volume();
        Some(placed)
    }

    /// Returns the box of `item`.
    pub fn get(&self, item: ItemId) -> Option<&PlacedBox> {
        self.placed.iter().find(|b| b.item == item)
    }

    /// Returns the share of `candidate`'s base resting on top faces at its z.
    ///
    /// The floor supports everything.
    pub fn support_ratio(&self, candidate: &AABB3D) -> f64 {
        let z = candidate.min.z;
        if z == 0 {
            return 1.0;
        }

        let extent = candidate.extent();
        let base = extent.x as u64 * extent.y as u64;
        if base == 0 {
            return 1.0;
        }

        let supported: u64 = self
            .placed
            .iter()
            .filter(|b| b.aabb.max.z == z)
            .map(|b| b.aabb.footprint_overlap(candidate))
            .sum();

        supported as f64 / base as f64
    }

    /// Returns true if every box meets the support ratio.
    pub fn is_stable(&self, min_support: Option<f64>) -> bool {
        match min_support {
            None => true,
            Some(ratio) => self
                .placed
                .iter()
                .all(|b| self.support_ratio(&b.aabb) >= ratio),
        }
    }
}

/// Working state of one construction: opened vehicles and item assignment.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    vehicle: VehicleSpec,
    loads: Vec<VehicleLoad>,
    assignment: Vec<Option<usize>>,
}

impl LoadPlan {
    /// Creates a plan with no vehicles for `item_count` items.
    pub fn new(vehicle: VehicleSpec, item_count: usize) -> Self {
        Self {
            vehicle,
            loads: Vec::new(),
            assignment: vec![None; item_count],
        }
    }

    /// Returns the shared vehicle specification.
    pub fn vehicle(&self) -> &VehicleSpec {
        &self.vehicle
    }

    /// Returns all opened vehicles, including emptied ones.
    pub fn loads(&self) -> &[VehicleLoad] {
        &self.loads
    }

    /// Returns one vehicle.
    pub fn load(&self, vehicle: usize) -> Option<&VehicleLoad> {
        self.loads.get(vehicle)
    }

    /// Opens a new vehicle and returns its id.
    pub fn open_vehicle(&mut self) -> usize {
        let id = self.loads.len();
        self.loads.push(VehicleLoad::new(id));
        id
    }

    /// Commits `item` at `proposal` in `vehicle`.
    pub fn commit(&mut self, vehicle: usize, item: &Item, proposal: &Proposal) {
        self.loads[vehicle].commit(PlacedBox::new(item, proposal));
        self.assignment[item.id()] = Some(vehicle);
    }

    /// Removes an item from its vehicle.
    pub fn remove(&mut self, item: ItemId) -> Option<(usize, PlacedBox)> {
        let vehicle = self.assignment.get(item).copied().flatten()?;
        let placed = self.loads[vehicle].remove(item)?;
        self.assignment[item] = None;
        Some((vehicle, placed))
    }

    /// Returns the vehicle an item is committed to.
    pub fn vehicle_of(&self, item: ItemId) -> Option<usize> {
        self.assignment.get(item).copied().flatten()
    }

    /// Returns the number of committed items.
    pub fn placed_count(&self) -> usize {
        self.assignment.iter().filter(|a| a.is_some()).count()
    }

    /// Returns the number of non-empty vehicles.
    pub fn vehicles_used(&self) -> usize {
        self.loads.iter().filter(|l| !l.is_empty()).count()
    }

    /// Returns the ids of non-empty vehicles.
    pub fn used_vehicle_ids(&self) -> Vec<usize> {
        self.loads
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| l.id())
            .collect()
    }

    /// Returns the sum of squared fill ratios over all vehicles.
    pub fn fill_score(&self) -> f64 {
        let capacity = self.vehicle.volume();
        self.loads
            .iter()
            .map(|l| {
                let fill = l.fill_ratio(capacity);
                fill * fill
            })
            .sum()
    }

    /// Drops empty vehicles and renumbers the rest contiguously by ascending id.
    pub fn drop_empty(&mut self) {
        let mut remap = vec![None; self.loads.len()];
        let mut kept = Vec::with_capacity(self.loads.len());

        for load in self.loads.drain(..) {
            if load.is_empty() {
                continue;
            }
            let new_id = kept.len();
            remap[load.id] = Some(new_id);
            kept.push(VehicleLoad { id: new_id, ..load });
        }

        self.loads = kept;
        for slot in &mut self.assignment {
            *slot = slot.and_then(|v| remap[v]);
        }
    }

    /// Builds the solution: placements in input order, ids renumbered contiguously.
    pub fn to_solution(&self, items: &[Item]) -> Result<Solution> {
        let mut plan = self.clone();
        plan.drop_empty();

        let mut placements = Vec::with_capacity(items.len());
        for item in items {
            let vehicle = plan.vehicle_of(item.id()).ok_or_else(|| {
                Error::Internal(format!("Item {} has no placement", item.id()))
            })?;
            let placed = plan.loads[vehicle].get(item.id()).ok_or_else(|| {
                Error::Internal(format!(
                    "Item {} is assigned to vehicle {} but not loaded",
                    item.id(),
                    vehicle
                ))
            })?;
            placements.push(Placement::new(
                item.id(),
                vehicle,
                placed.orientation,
                placed.position(),
                placed.extent(),
            ));
        }

        let capacity = plan.vehicle.volume();
        let vehicle_stats: Vec<VehicleStats> = plan
            .loads
            .iter()
            .map(|l| VehicleStats {
                vehicle: l.id(),
                item_count: l.len(),
                occupied_volume: l.occupied_volume(),
                fill_ratio: l.fill_ratio(capacity),
            })
            .collect();

        let vehicles_used = plan.loads.len();
        let total_volume: Volume = items.iter().map(Item::volume).sum();
        let utilization = if vehicles_used > 0 {
            total_volume as f64 / (vehicles_used as f64 * capacity as f64)
        } else {
            0.0
        };

        Ok(Solution {
            placements,
            vehicles_used,
            vehicle_stats,
            utilization,
            lower_bound: volume_lower_bound(items, &plan.vehicle),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn proposal(x: u32, y: u32, z: u32, extent: Vec3) -> Proposal {
        Proposal {
            orientation: Orientation::Lwh,
            extent,
            position: Vec3::new(x, y, z),
        }
    }

    #[test]
    fn test_placed_box_overlap() {
        let item = Item::new(0, 10, 10, 10);
        let a = PlacedBox::new(&item, &proposal(0, 0, 0, Vec3::new(10, 10, 10)));

        let touching = AABB3D::from_corner(Vec3::new(10, 0, 0), Vec3::new(10, 10, 10));
        let crossing = AABB3D::from_corner(Vec3::new(5, 5, 5), Vec3::new(10, 10, 10));

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert_eq!(a.max_corner(), Vec3::new(10, 10, 10));
    }

    #[test]
    fn test_vehicle_load_volume_cache() {
        let items = [Item::new(0, 10, 10, 10), Item::new(1, 20, 10, 10)];
        let mut load = VehicleLoad::new(0);
        load.commit(PlacedBox::new(&items[0], &proposal(0, 0, 0, Vec3::new(10, 10, 10))));
        load.commit(PlacedBox::new(&items[1], &proposal(10, 0, 0, Vec3::new(20, 10, 10))));

        assert_eq!(load.occupied_volume(), 3000);
        assert_relative_eq!(load.fill_ratio(6000), 0.5);

        let removed = load.remove(0).unwrap();
        assert_eq!(removed.item, 0);
        assert_eq!(load.occupied_volume(), 2000);
        assert!(load.remove(0).is_none());
    }

    #[test]
    fn test_support_ratio() {
        let base = Item::new(0, 10, 10, 10);
        let mut load = VehicleLoad::new(0);
        load.commit(PlacedBox::new(&base, &proposal(0, 0, 0, Vec3::new(10, 10, 10))));

        let on_floor = AABB3D::from_corner(Vec3::new(10, 0, 0), Vec3::new(10, 10, 10));
        let half_on_top = AABB3D::from_corner(Vec3::new(5, 0, 10), Vec3::new(10, 10, 10));
        let floating = AABB3D::from_corner(Vec3::new(0, 0, 15), Vec3::new(10, 10, 10));

        assert_relative_eq!(load.support_ratio(&on_floor), 1.0);
        assert_relative_eq!(load.support_ratio(&half_on_top), 0.5);
        assert_relative_eq!(load.support_ratio(&floating), 0.0);
    }

    #[test]
    fn test_drop_empty_renumbers() {
        let items = vec![
            Item::new(0, 10, 10, 10),
            Item::new(1, 10, 10, 10),
            Item::new(2, 10, 10, 10),
        ];
        let vehicle = VehicleSpec::new(10, 10, 10);
        let mut plan = LoadPlan::new(vehicle, items.len());

        for item in &items {
            let v = plan.open_vehicle();
            plan.commit(v, item, &proposal(0, 0, 0, Vec3::new(10, 10, 10)));
        }
        assert_eq!(plan.vehicles_used(), 3);

        plan.remove(1);
        assert_eq!(plan.vehicles_used(), 2);
        assert_eq!(plan.loads().len(), 3);

        plan.drop_empty();
        assert_eq!(plan.loads().len(), 2);
        assert_eq!(plan.vehicle_of(0), Some(0));
        assert_eq!(plan.vehicle_of(1), None);
        assert_eq!(plan.vehicle_of(2), Some(1));
        assert_eq!(plan.load(1).map(VehicleLoad::id), Some(1));
    }

    #[test]
    fn test_to_solution() {
        let items = vec![Item::new(0, 10, 10, 10), Item::new(1, 20, 10, 10)];
        let vehicle = VehicleSpec::new(30, 10, 10);
        let mut plan = LoadPlan::new(vehicle, items.len());
        let v = plan.open_vehicle();
        plan.commit(v, &items[1], &proposal(0, 0, 0, Vec3::new(20, 10, 10)));
        plan.commit(v, &items[0], &proposal(20, 0, 0, Vec3::new(10, 10, 10)));

        let solution = plan.to_solution(&items).unwrap();
        assert_eq!(solution.vehicles_used, 1);
        assert_eq!(solution.placements[0].item, 0);
        assert_eq!(solution.placements[0].far_corner(), Vec3::new(30, 10, 10));
        assert_relative_eq!(solution.utilization, 1.0);
        assert_eq!(solution.lower_bound, 1);
        assert_eq!(solution.vehicle_stats[0].item_count, 2);
    }

    #[test]
    fn test_to_solution_requires_every_item() {
        let items = vec![Item::new(0, 10, 10, 10)];
        let plan = LoadPlan::new(VehicleSpec::new(10, 10, 10), items.len());
        assert!(plan.to_solution(&items).is_err());
    }
}
