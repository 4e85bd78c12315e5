//! Solver traits and configuration.

use crate::geometry::{Item, VehicleSpec};
use crate::result::Solution;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Optimization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Greedy bottom-left-back construction (fast, deterministic).
    #[default]
    Greedy,
    /// Greedy construction followed by a bounded improvement pass.
    LocalSearch,
    /// Several constructions from seeded orderings, each improved; best kept.
    MultiStart,
}

impl Strategy {
    /// Returns a display name.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Greedy => "Greedy",
            Strategy::LocalSearch => "LocalSearch",
            Strategy::MultiStart => "MultiStart",
        }
    }
}

/// Order in which the allocator considers items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortPolicy {
    /// Descending volume, ties by ascending input index.
    #[default]
    VolumeDescending,
    /// Latest delivery rank first, unranked items last, then descending volume.
    DeliveryThenVolume,
}

/// How the allocator picks among vehicles that admit an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VehicleSelection {
    /// Lowest vehicle id.
    #[default]
    FirstFit,
    /// Largest occupied volume, ties by lowest id.
    BestFit,
}

/// Common configuration for solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Optimization strategy.
    pub strategy: Strategy,

    /// Item ordering for construction.
    pub sort_policy: SortPolicy,

    /// Vehicle selection rule for construction.
    pub vehicle_selection: VehicleSelection,

    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Seed for every randomized component.
    pub seed: u64,

    /// Iteration budget of the improvement pass.
    pub improvement_iterations: u64,

    /// Number of constructions for multi-start.
    pub restarts: usize,

    /// Evaluate orientations and restarts on the rayon pool.
    pub parallel: bool,

    /// Minimum supported share of an item's base when it is not on the floor.
    pub min_support_ratio: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            sort_policy: SortPolicy::default(),
            vehicle_selection: VehicleSelection::default(),
            time_limit_ms: 0,
            seed: 42,
            improvement_iterations: 2000,
            restarts: 5,
            parallel: true,
            min_support_ratio: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the optimization strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the item ordering.
    pub fn with_sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    /// Sets the vehicle selection rule.
    pub fn with_vehicle_selection(mut self, selection: VehicleSelection) -> Self {
        self.vehicle_selection = selection;
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the improvement iteration budget.
    pub fn with_improvement_iterations(mut self, iterations: u64) -> Self {
        self.improvement_iterations = iterations;
        self
    }

    /// Sets the number of multi-start constructions.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Enables or disables rayon evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Requires `ratio` of an item's base to be supported.
    pub fn with_min_support(mut self, ratio: f64) -> Self {
        self.min_support_ratio = Some(ratio);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(ratio) = self.min_support_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::ConfigError(format!(
                    "Support ratio must be within [0, 1], got {ratio}"
                )));
            }
        }

        if self.restarts == 0 {
            return Err(Error::ConfigError(
                "Multi-start needs at least one restart".into(),
            ));
        }

        Ok(())
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Solve phase reported through [`ProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Feasibility pre-check finished.
    Screened,
    /// Greedy construction finished.
    Constructed,
    /// Improvement pass finished.
    Improved,
    /// Solve finished.
    Finished,
}

/// Progress information during solving.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Phase just completed.
    pub phase: Phase,
    /// Vehicles in the current best plan.
    pub vehicles: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Whether the solver is still running.
    pub running: bool,
}

/// Trait for vehicle loading solvers.
pub trait Solver {
    /// Loads `items` into vehicles shaped like `vehicle`.
    fn solve(&self, items: &[Item], vehicle: &VehicleSpec) -> Result<Solution>;

    /// Solves with a progress callback.
    fn solve_with_progress(
        &self,
        items: &[Item],
        vehicle: &VehicleSpec,
        callback: ProgressCallback,
    ) -> Result<Solution>;

    /// Cancels an ongoing solve operation.
    fn cancel(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_strategy(Strategy::MultiStart)
            .with_sort_policy(SortPolicy::DeliveryThenVolume)
            .with_vehicle_selection(VehicleSelection::BestFit)
            .with_time_limit(500)
            .with_seed(7)
            .with_restarts(0)
            .with_parallel(false);

        assert_eq!(config.strategy, Strategy::MultiStart);
        assert_eq!(config.sort_policy, SortPolicy::DeliveryThenVolume);
        assert_eq!(config.vehicle_selection, VehicleSelection::BestFit);
        assert_eq!(config.time_limit_ms, 500);
        assert_eq!(config.seed, 7);
        assert_eq!(config.restarts, 1);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::default().with_min_support(0.5).validate().is_ok());
        assert!(Config::default().with_min_support(1.5).validate().is_err());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::default().name(), "Greedy");
        assert_eq!(Strategy::LocalSearch.name(), "LocalSearch");
    }
}
