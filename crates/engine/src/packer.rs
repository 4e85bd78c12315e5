//! Vehicle loading solver.

use crate::allocator::{sort_items, VehicleAllocator};
use crate::deadline::Deadline;
use crate::feasibility::{first_infeasible, volume_lower_bound};
use crate::improvement::ImprovementPass;
use crate::load::LoadPlan;
use crate::multi_start::run_multi_start;
use crate::search::PlacementSearch;
use truckpack_core::solver::{Config, Phase, ProgressCallback, ProgressInfo, Solver, Strategy};
use truckpack_core::{Error, Item, Result, Solution, VehicleSpec, MAX_ITEMS};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Greedy bottom-left-back vehicle loader with optional improvement.
pub struct TruckPacker {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

/// Plan produced by one strategy, before conversion to a solution.
struct Search {
    plan: LoadPlan,
    iterations: Option<u64>,
    incomplete: bool,
}

impl TruckPacker {
    /// Creates a new packer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn validate(&self, items: &[Item], vehicle: &VehicleSpec) -> Result<()> {
        self.config.validate()?;
        vehicle.validate()?;

        if items.is_empty() {
            return Err(Error::InvalidItem("No items to load".into()));
        }
        if items.len() > MAX_ITEMS {
            return Err(Error::InvalidItem(format!(
                "At most {} items are supported, got {}",
                MAX_ITEMS,
                items.len()
            )));
        }

        for (index, item) in items.iter().enumerate() {
            if item.id() != index {
                return Err(Error::InvalidItem(format!(
                    "Item at position {} has id {}",
                    index,
                    item.id()
                )));
            }
            item.validate()?;
        }

        Ok(())
    }

    fn allocator(&self, vehicle: &VehicleSpec) -> VehicleAllocator {
        let search = PlacementSearch::new(vehicle)
            .with_support(self.config.min_support_ratio)
            .with_parallel(self.config.parallel);
        VehicleAllocator::new(vehicle.clone(), search, self.config.vehicle_selection)
    }

    /// Greedy construction with the configured order.
    fn greedy(
        &self,
        items: &[Item],
        allocator: &VehicleAllocator,
        deadline: &Deadline,
    ) -> Result<Search> {
        let order = sort_items(items, self.config.sort_policy);
        let construction = allocator.construct(items, &order, deadline)?;
        Ok(Search {
            plan: construction.plan,
            iterations: None,
            incomplete: construction.degraded,
        })
    }

    /// Greedy construction followed by the improvement pass.
    fn local_search(
        &self,
        items: &[Item],
        allocator: &VehicleAllocator,
        lower_bound: usize,
        deadline: &Deadline,
        report: &dyn Fn(Phase, usize),
    ) -> Result<Search> {
        let constructed = self.greedy(items, allocator, deadline)?;
        report(Phase::Constructed, constructed.plan.vehicles_used());

        let improved = ImprovementPass::new(
            self.config.improvement_iterations,
            self.config.seed,
            lower_bound,
        )
        .run(items, allocator.search(), constructed.plan, deadline);
        report(Phase::Improved, improved.plan.vehicles_used());

        Ok(Search {
            plan: improved.plan,
            iterations: Some(improved.iterations),
            incomplete: constructed.incomplete || improved.interrupted,
        })
    }

    fn multi_start(
        &self,
        items: &[Item],
        allocator: &VehicleAllocator,
        lower_bound: usize,
        deadline: &Deadline,
    ) -> Result<Search> {
        let outcome = run_multi_start(items, allocator, &self.config, lower_bound, deadline)?;
        log::debug!(
            "Multi-start: restart {} won out of {}",
            outcome.restart,
            outcome.completed
        );
        Ok(Search {
            plan: outcome.plan,
            iterations: Some(outcome.iterations),
            incomplete: outcome.incomplete,
        })
    }

    fn run(
        &self,
        items: &[Item],
        vehicle: &VehicleSpec,
        callback: Option<&ProgressCallback>,
    ) -> Result<Solution> {
        // Reset cancellation flag
        self.cancelled.store(false, Ordering::Relaxed);
        let deadline = Deadline::new(self.config.time_limit_ms, self.cancelled.clone());
        let strategy = self.config.strategy;

        let report = |phase: Phase, vehicles: usize| {
            if let Some(callback) = callback {
                callback(ProgressInfo {
                    phase,
                    vehicles,
                    elapsed_ms: deadline.elapsed_ms(),
                    running: phase != Phase::Finished,
                });
            }
        };

        self.validate(items, vehicle)?;

        if let Some(infeasible) = first_infeasible(items, vehicle) {
            log::info!(
                "Item {} ({}x{}x{}) fits no orientation of a {}x{}x{} vehicle: UNSAT",
                infeasible.item,
                infeasible.dimensions.x,
                infeasible.dimensions.y,
                infeasible.dimensions.z,
                vehicle.length(),
                vehicle.width(),
                vehicle.height()
            );
            let mut solution = Solution::unsat(infeasible).with_strategy(strategy.name());
            solution.computation_time_ms = deadline.elapsed_ms();
            report(Phase::Finished, 0);
            return Ok(solution);
        }

        let lower_bound = volume_lower_bound(items, vehicle);
        report(Phase::Screened, 0);

        let allocator = self.allocator(vehicle);
        let search = match strategy {
            Strategy::Greedy => {
                let search = self.greedy(items, &allocator, &deadline)?;
                report(Phase::Constructed, search.plan.vehicles_used());
                search
            }
            Strategy::LocalSearch => {
                self.local_search(items, &allocator, lower_bound, &deadline, &report)?
            }
            Strategy::MultiStart => self.multi_start(items, &allocator, lower_bound, &deadline)?,
        };

        let mut solution = search.plan.to_solution(items)?.with_strategy(strategy.name());
        solution.improvement_iterations = search.iterations;
        solution.cancelled = deadline.is_cancelled();
        solution.heuristic_incomplete = search.incomplete || solution.cancelled;
        solution.computation_time_ms = deadline.elapsed_ms();

        if solution.heuristic_incomplete {
            log::warn!("Search was cut short; returning the best plan found");
        }
        log::info!(
            "{}: {} items in {} vehicles (lower bound {}), utilization {}, {} ms",
            strategy.name(),
            items.len(),
            solution.vehicles_used,
            solution.lower_bound,
            solution.utilization_percent(),
            solution.computation_time_ms
        );

        report(Phase::Finished, solution.vehicles_used);
        Ok(solution)
    }
}

impl Solver for TruckPacker {
    fn solve(&self, items: &[Item], vehicle: &VehicleSpec) -> Result<Solution> {
        self.run(items, vehicle, None)
    }

    fn solve_with_progress(
        &self,
        items: &[Item],
        vehicle: &VehicleSpec,
        callback: ProgressCallback,
    ) -> Result<Solution> {
        self.run(items, vehicle, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
