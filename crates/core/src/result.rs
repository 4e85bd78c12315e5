//! Solve result representation.

use crate::geometry::{ItemId, Vec3, Volume};
use crate::placement::{Placement, PlacementStats};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveStatus {
    /// Every item has a placement.
    #[default]
    Sat,
    /// Some item fits no orientation of an empty vehicle.
    Unsat,
}

/// The first item that fits no orientation of an empty vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Infeasibility {
    /// Input index of the item.
    pub item: ItemId,
    /// Its reference dimensions.
    pub dimensions: Vec3,
}

/// Statistics for a single vehicle.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleStats {
    /// Vehicle id.
    pub vehicle: usize,
    /// Number of items loaded.
    pub item_count: usize,
    /// Total volume of loaded items.
    pub occupied_volume: Volume,
    /// Occupied volume over vehicle volume (0.0 - 1.0).
    pub fill_ratio: f64,
}

/// Result of a solve operation.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// SAT or UNSAT.
    pub status: SolveStatus,

    /// One placement per item, ordered by input index. Empty when UNSAT.
    pub placements: Vec<Placement>,

    /// Why the instance is UNSAT.
    pub infeasible: Option<Infeasibility>,

    /// Number of vehicles used.
    pub vehicles_used: usize,

    /// Per-vehicle statistics, ordered by vehicle id.
    pub vehicle_stats: Vec<VehicleStats>,

    /// Utilization ratio (0.0 - 1.0).
    /// Calculated as: total_item_volume / (vehicles_used * vehicle_volume)
    pub utilization: f64,

    /// Volume-based lower bound on the vehicle count.
    pub lower_bound: usize,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Strategy used for solving.
    pub strategy: Option<String>,

    /// Number of improvement iterations performed.
    pub improvement_iterations: Option<u64>,

    /// Whether a deadline or cancellation cut the search short.
    pub heuristic_incomplete: bool,

    /// Whether the solve was cancelled.
    pub cancelled: bool,
}

impl Solution {
    /// Creates an UNSAT result naming the offending item.
    pub fn unsat(infeasible: Infeasibility) -> Self {
        Self {
            status: SolveStatus::Unsat,
            infeasible: Some(infeasible),
            ..Default::default()
        }
    }

    /// Returns true if the instance was solved.
    pub fn is_sat(&self) -> bool {
        self.status == SolveStatus::Sat
    }

    /// Returns the placement of an item.
    pub fn placement_for(&self, item: ItemId) -> Option<&Placement> {
        self.placements
            .get(item)
            .filter(|p| p.item == item)
            .or_else(|| self.placements.iter().find(|p| p.item == item))
    }

    /// Returns the placements loaded into a vehicle.
    pub fn placements_in(&self, vehicle: usize) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.vehicle == vehicle)
    }

    /// Computes placement statistics.
    pub fn placement_stats(&self) -> PlacementStats {
        PlacementStats::from_placements(&self.placements)
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }

    /// Returns true if the vehicle count equals the volume lower bound.
    pub fn reaches_lower_bound(&self) -> bool {
        self.is_sat() && self.vehicles_used <= self.lower_bound
    }

    /// Sets the strategy name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }
}

/// Summary statistics for a solve result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// SAT or UNSAT.
    pub status: SolveStatus,
    /// Items placed.
    pub total_placed: usize,
    /// Vehicles used.
    pub vehicles_used: usize,
    /// Volume lower bound.
    pub lower_bound: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
    /// Whether the search was cut short.
    pub heuristic_incomplete: bool,
}

impl From<&Solution> for SolveSummary {
    fn from(solution: &Solution) -> Self {
        Self {
            status: solution.status,
            total_placed: solution.placements.len(),
            vehicles_used: solution.vehicles_used,
            lower_bound: solution.lower_bound,
            utilization_percent: solution.utilization * 100.0,
            time_ms: solution.computation_time_ms,
            strategy: solution
                .strategy
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            heuristic_incomplete: solution.heuristic_incomplete,
        }
    }
}
