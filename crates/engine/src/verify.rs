//! Independent solution checker.
//!
//! Re-derives every loading invariant from emitted boxes alone, without
//! trusting the engine's internal state. Used by the test suite and by the
//! `check` command.

use crate::feasibility::first_infeasible;
use std::collections::BTreeMap;
use thiserror::Error;
use truckpack_core::{Item, ItemId, Orientation, Solution, SolveStatus, Vec3, VehicleSpec, AABB3D};

/// A broken loading invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// An item has no box.
    #[error("item {item} has no placement")]
    Missing {
        /// Item index.
        item: ItemId,
    },

    /// An item has more than one box.
    #[error("item {item} is placed more than once")]
    Duplicate {
        /// Item index.
        item: ItemId,
    },

    /// A box names an item that does not exist.
    #[error("placement refers to unknown item {item}")]
    UnknownItem {
        /// Item index.
        item: ItemId,
    },

    /// Vehicle ids skip a number.
    #[error("vehicle {vehicle} is empty but higher ids are used")]
    NonContiguous {
        /// First unused id.
        vehicle: usize,
    },

    /// A box leaves the vehicle.
    #[error("item {item} extends beyond the vehicle")]
    OutOfBounds {
        /// Item index.
        item: ItemId,
    },

    /// A box is not a rotation of its item.
    #[error("box of item {item} is not an axis-aligned rotation of its dimensions")]
    BadOrientation {
        /// Item index.
        item: ItemId,
    },

    /// Two boxes share positive volume.
    #[error("items {a} and {b} overlap in vehicle {vehicle}")]
    Overlap {
        /// Vehicle id.
        vehicle: usize,
        /// First item.
        a: ItemId,
        /// Second item.
        b: ItemId,
    },

    /// A later delivery blocks an earlier one.
    #[error("item {earlier} is blocked by later delivery {later} in vehicle {vehicle}")]
    Blocked {
        /// Vehicle id.
        vehicle: usize,
        /// Item delivered first.
        earlier: ItemId,
        /// Item delivered later.
        later: ItemId,
    },

    /// UNSAT was reported although every item fits an empty vehicle.
    #[error("reported UNSAT but every item fits an empty vehicle")]
    FalseUnsat,

    /// SAT was reported although some item fits no orientation.
    #[error("reported SAT but item {item} fits no orientation")]
    FalseSat {
        /// Item index.
        item: ItemId,
    },
}

/// One emitted box: vehicle id plus near and far corners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRecord {
    /// Item index.
    pub item: ItemId,
    /// Vehicle id.
    pub vehicle: usize,
    /// Near corner.
    pub near: Vec3,
    /// Far corner.
    pub far: Vec3,
}

/// Outcome of a verification.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Every violation found.
    pub violations: Vec<Violation>,
    /// Vehicles referenced by the boxes.
    pub vehicles: usize,
}

impl VerificationReport {
    /// Returns true if no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Verifies a solution produced for `items`.
pub fn verify(vehicle: &VehicleSpec, items: &[Item], solution: &Solution) -> VerificationReport {
    match solution.status {
        SolveStatus::Unsat => verify_unsat(vehicle, items),
        SolveStatus::Sat => {
            let records: Vec<BoxRecord> = solution
                .placements
                .iter()
                .map(|p| BoxRecord {
                    item: p.item,
                    vehicle: p.vehicle,
                    near: p.position,
                    far: p.far_corner(),
                })
                .collect();
            verify_boxes(vehicle, items, &records)
        }
    }
}

/// Verifies an UNSAT verdict.
pub fn verify_unsat(vehicle: &VehicleSpec, items: &[Item]) -> VerificationReport {
    let violations = match first_infeasible(items, vehicle) {
        Some(_) => Vec::new(),
        None => vec![Violation::FalseUnsat],
    };
    VerificationReport {
        violations,
        vehicles: 0,
    }
}

/// Verifies a SAT verdict given as raw boxes.
pub fn verify_boxes(
    vehicle: &VehicleSpec,
    items: &[Item],
    records: &[BoxRecord],
) -> VerificationReport {
    let mut violations = Vec::new();

    if let Some(infeasible) = first_infeasible(items, vehicle) {
        violations.push(Violation::FalseSat {
            item: infeasible.item,
        });
    }

    let mut seen = vec![false; items.len()];
    let mut by_vehicle: BTreeMap<usize, Vec<(ItemId, AABB3D)>> = BTreeMap::new();

    for record in records {
        let Some(item) = items.get(record.item) else {
            violations.push(Violation::UnknownItem { item: record.item });
            continue;
        };

        if std::mem::replace(&mut seen[record.item], true) {
            violations.push(Violation::Duplicate { item: record.item });
            continue;
        }

        let extent = (0..3)
            .map(|axis| record.far[axis].checked_sub(record.near[axis]))
            .collect::<Option<Vec<u32>>>()
            .map(|e| Vec3::new(e[0], e[1], e[2]));

        let Some(extent) = extent else {
            violations.push(Violation::BadOrientation { item: record.item });
            continue;
        };

        if Orientation::from_effective(item.dimensions(), &extent).is_none() {
            violations.push(Violation::BadOrientation { item: record.item });
        }

        let aabb = AABB3D::new(record.near, record.far);
        if !aabb.is_within(vehicle.dimensions()) {
            violations.push(Violation::OutOfBounds { item: record.item });
        }

        by_vehicle
            .entry(record.vehicle)
            .or_default()
            .push((record.item, aabb));
    }

    for (item, placed) in seen.iter().enumerate() {
        if !placed {
            violations.push(Violation::Missing { item });
        }
    }

    let vehicles = by_vehicle.keys().next_back().map_or(0, |&v| v + 1);
    if let Some(gap) = (0..vehicles).find(|v| !by_vehicle.contains_key(v)) {
        violations.push(Violation::NonContiguous { vehicle: gap });
    }

    for (&vehicle, boxes) in &by_vehicle {
        for (i, (a, box_a)) in boxes.iter().enumerate() {
            for (b, box_b) in &boxes[i + 1..] {
                if box_a.intersects(box_b) {
                    violations.push(Violation::Overlap {
                        vehicle,
                        a: *a,
                        b: *b,
                    });
                }

                let ordered = match (items[*a].delivery(), items[*b].delivery()) {
                    (Some(ra), Some(rb)) if ra < rb => Some(((*a, box_a), (*b, box_b))),
                    (Some(ra), Some(rb)) if rb < ra => Some(((*b, box_b), (*a, box_a))),
                    _ => None,
                };
                if let Some(((earlier, first), (later, second))) = ordered {
                    // The earlier box must lie wholly past the later one
                    // along y, or wholly above it.
                    let reachable = first.min.y >= second.max.y || first.min.z >= second.max.z;
                    if !reachable {
                        violations.push(Violation::Blocked {
                            vehicle,
                            earlier,
                            later,
                        });
                    }
                }
            }
        }
    }

    VerificationReport {
        violations,
        vehicles,
    }
}
