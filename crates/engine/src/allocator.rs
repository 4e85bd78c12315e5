//! Greedy vehicle allocation.
//!
//! Items are taken in a fixed order; each is committed to the first vehicle
//! (by the configured selection rule) where the placement search finds a
//! spot, and a new vehicle is opened when none does. Once the deadline passes
//! the allocator only looks at the most recently opened vehicle.

use crate::deadline::Deadline;
use crate::load::LoadPlan;
use crate::search::{PlacementSearch, Proposal};
use rand::prelude::*;
use std::cmp::Reverse;
use truckpack_core::{Error, Item, ItemId, Result, SortPolicy, VehicleSelection, VehicleSpec};

/// Returns item ids in construction order for `policy`.
pub fn sort_items(items: &[Item], policy: SortPolicy) -> Vec<ItemId> {
    let mut order: Vec<ItemId> = (0..items.len()).collect();
    match policy {
        SortPolicy::VolumeDescending => {
            order.sort_by_key(|&i| (Reverse(items[i].volume()), i));
        }
        SortPolicy::DeliveryThenVolume => {
            // Ranked before unranked, latest rank first.
            order.sort_by_key(|&i| {
                let rank = items[i].delivery();
                (
                    rank.is_none(),
                    Reverse(rank.unwrap_or(0)),
                    Reverse(items[i].volume()),
                    i,
                )
            });
        }
    }
    order
}

/// Returns a seeded random permutation of item ids.
pub fn shuffled_order(item_count: usize, seed: u64) -> Vec<ItemId> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<ItemId> = (0..item_count).collect();
    order.shuffle(&mut rng);
    order
}

/// Outcome of one greedy construction.
#[derive(Debug, Clone)]
pub struct Construction {
    /// Committed vehicles.
    pub plan: LoadPlan,
    /// Whether the deadline forced next-fit allocation.
    pub degraded: bool,
}

/// Greedy construction loop.
#[derive(Debug, Clone)]
pub struct VehicleAllocator {
    vehicle: VehicleSpec,
    search: PlacementSearch,
    selection: VehicleSelection,
}

impl VehicleAllocator {
    /// Creates an allocator.
    pub fn new(vehicle: VehicleSpec, search: PlacementSearch, selection: VehicleSelection) -> Self {
        Self {
            vehicle,
            search,
            selection,
        }
    }

    /// Returns the placement search in use.
    pub fn search(&self) -> &PlacementSearch {
        &self.search
    }

    /// Commits every item of `order`, opening vehicles on demand.
    ///
    /// Every item must fit an empty vehicle; an item that does not is reported
    /// as [`Error::SearchExhausted`].
    pub fn construct(
        &self,
        items: &[Item],
        order: &[ItemId],
        deadline: &Deadline,
    ) -> Result<Construction> {
        let mut plan = LoadPlan::new(self.vehicle.clone(), items.len());
        let mut degraded = false;

        for &id in order {
            let item = &items[id];

            if !degraded && deadline.is_expired() {
                degraded = true;
                log::warn!(
                    "Deadline reached after {} of {} items, switching to next-fit",
                    plan.placed_count(),
                    items.len()
                );
            }

            let target = if degraded {
                self.next_fit(&plan, item)
            } else {
                self.select(&plan, item)
            };

            let (vehicle, proposal) = match target {
                Some(found) => found,
                None => {
                    let vehicle = plan.open_vehicle();
                    let proposal = plan
                        .load(vehicle)
                        .and_then(|load| self.search.find(item, load))
                        .ok_or_else(|| {
                            log::error!(
                                "Item {} fits an empty vehicle on screening but not in vehicle {}",
                                id,
                                vehicle
                            );
                            Error::SearchExhausted { item: id }
                        })?;
                    log::debug!("Opened vehicle {} for item {}", vehicle, id);
                    (vehicle, proposal)
                }
            };

            plan.commit(vehicle, item, &proposal);
        }

        Ok(Construction { plan, degraded })
    }

    /// Finds a spot in an existing vehicle per the selection rule.
    fn select(&self, plan: &LoadPlan, item: &Item) -> Option<(usize, Proposal)> {
        let loads = plan.loads();
        match self.selection {
            VehicleSelection::FirstFit => loads
                .iter()
                .find_map(|load| self.search.find(item, load).map(|p| (load.id(), p))),
            VehicleSelection::BestFit => {
                let mut ranked: Vec<usize> = (0..loads.len()).collect();
                ranked.sort_by_key(|&v| (Reverse(loads[v].occupied_volume()), v));
                ranked
                    .into_iter()
                    .find_map(|v| self.search.find(item, &loads[v]).map(|p| (v, p)))
            }
        }
    }

    /// Tries the most recently opened vehicle only.
    fn next_fit(&self, plan: &LoadPlan, item: &Item) -> Option<(usize, Proposal)> {
        let load = plan.loads().last()?;
        self.search.find(item, load).map(|p| (load.id(), p))
    }
}
