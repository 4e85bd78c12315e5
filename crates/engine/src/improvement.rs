//! Simulated-annealing improvement of a constructed plan.
//!
//! # Neighborhood Operators
//!
//! - **Shift**: move one item into another vehicle, or re-place it in its own
//! - **Swap**: exchange two items between two vehicles
//! - **Rotate**: re-place an item in its own vehicle with a different orientation
//! - **Compact**: empty the least-filled vehicle into the others
//!
//! Every move re-runs the placement search, so overlap, containment,
//! accessibility and support are re-validated. No move opens a vehicle, so the
//! vehicle count never grows.

use crate::deadline::Deadline;
use crate::load::LoadPlan;
use crate::search::PlacementSearch;
use rand::prelude::*;
use std::cmp::Reverse;
use truckpack_core::{
    Item, ItemId, NeighborhoodOperator, SaConfig, SaProblem, SaRunner, SaSolution,
};

/// Weight of one vehicle in the objective; larger than any fill score.
const VEHICLE_WEIGHT: f64 = 1.0e4;

/// A candidate plan with its objective.
#[derive(Debug, Clone)]
pub struct PlanSolution {
    /// The plan.
    pub plan: LoadPlan,
    fitness: f64,
}

impl PlanSolution {
    fn new(plan: LoadPlan) -> Self {
        Self { plan, fitness: 0.0 }
    }
}

impl SaSolution for PlanSolution {
    fn objective(&self) -> f64 {
        self.fitness
    }

    fn set_objective(&mut self, value: f64) {
        self.fitness = value;
    }
}

/// Objective: fewer vehicles first, then a larger sum of squared fill ratios.
pub fn plan_fitness(plan: &LoadPlan) -> f64 {
    -(plan.vehicles_used() as f64) * VEHICLE_WEIGHT + plan.fill_score()
}

/// SA problem over load plans.
pub struct ImprovementProblem<'a> {
    items: &'a [Item],
    search: &'a PlacementSearch,
    initial: LoadPlan,
}

impl<'a> ImprovementProblem<'a> {
    /// Creates a problem starting from `initial`.
    pub fn new(items: &'a [Item], search: &'a PlacementSearch, initial: LoadPlan) -> Self {
        Self {
            items,
            search,
            initial,
        }
    }

    fn random_item<R: Rng>(&self, plan: &LoadPlan, rng: &mut R) -> Option<ItemId> {
        let used = plan.used_vehicle_ids();
        let vehicle = *used.choose(rng)?;
        let load = plan.load(vehicle)?;
        load.boxes().choose(rng).map(|b| b.item)
    }

    /// Removes `item` and checks that the boxes left behind stay supported.
    fn lift(&self, plan: &mut LoadPlan, item: ItemId) -> Option<usize> {
        let (vehicle, _) = plan.remove(item)?;
        let stable = plan
            .load(vehicle)
            .is_some_and(|load| load.is_stable(self.search.min_support()));
        stable.then_some(vehicle)
    }

    /// Places `item` into `vehicle` if the search finds a spot.
    fn place(&self, plan: &mut LoadPlan, vehicle: usize, item: ItemId) -> bool {
        let item = &self.items[item];
        match plan.load(vehicle).and_then(|load| self.search.find(item, load)) {
            Some(proposal) => {
                plan.commit(vehicle, item, &proposal);
                true
            }
            None => false,
        }
    }

    fn shift<R: Rng>(&self, solution: &PlanSolution, rng: &mut R) -> Option<PlanSolution> {
        let mut plan = solution.plan.clone();
        let item = self.random_item(&plan, rng)?;
        let source = self.lift(&mut plan, item)?;

        let targets: Vec<usize> = plan
            .used_vehicle_ids()
            .into_iter()
            .filter(|&v| v != source)
            .collect();
        let target = targets.choose(rng).copied().unwrap_or(source);

        self.place(&mut plan, target, item)
            .then(|| PlanSolution::new(plan))
    }

    fn swap<R: Rng>(&self, solution: &PlanSolution, rng: &mut R) -> Option<PlanSolution> {
        let mut plan = solution.plan.clone();
        let used = plan.used_vehicle_ids();
        if used.len() < 2 {
            return None;
        }

        let picked: Vec<usize> = used.choose_multiple(rng, 2).copied().collect();
        let (va, vb) = (picked[0], picked[1]);
        let a = plan.load(va)?.boxes().choose(rng)?.item;
        let b = plan.load(vb)?.boxes().choose(rng)?.item;

        self.lift(&mut plan, a)?;
        self.lift(&mut plan, b)?;

        (self.place(&mut plan, vb, a) && self.place(&mut plan, va, b))
            .then(|| PlanSolution::new(plan))
    }

    fn rotate<R: Rng>(&self, solution: &PlanSolution, rng: &mut R) -> Option<PlanSolution> {
        let mut plan = solution.plan.clone();
        let id = self.random_item(&plan, rng)?;
        let vehicle = plan.vehicle_of(id)?;
        let current = plan.load(vehicle)?.get(id)?.extent();

        let item = &self.items[id];
        let others: Vec<_> = item
            .distinct_orientations()
            .into_iter()
            .filter(|(_, extent)| *extent != current)
            .collect();
        if others.is_empty() {
            return None;
        }

        self.lift(&mut plan, id)?;
        let proposal = self
            .search
            .find_among(item, &others, plan.load(vehicle)?)?;
        plan.commit(vehicle, item, &proposal);
        Some(PlanSolution::new(plan))
    }

    fn compact(&self, solution: &PlanSolution) -> Option<PlanSolution> {
        let mut plan = solution.plan.clone();
        let used = plan.used_vehicle_ids();
        if used.len() < 2 {
            return None;
        }

        let source = used
            .iter()
            .copied()
            .min_by_key(|&v| (plan.load(v).map(|l| l.occupied_volume()), Reverse(v)))?;

        let mut moving: Vec<ItemId> = plan.load(source)?.boxes().iter().map(|b| b.item).collect();
        moving.sort_by_key(|&i| (Reverse(self.items[i].volume()), i));

        for &id in &moving {
            plan.remove(id)?;
        }

        for &id in &moving {
            let placed = used
                .iter()
                .filter(|&&v| v != source)
                .any(|&v| self.place(&mut plan, v, id));
            if !placed {
                return None;
            }
        }

        Some(PlanSolution::new(plan))
    }
}

impl SaProblem for ImprovementProblem<'_> {
    type Solution = PlanSolution;

    fn initial_solution(&self) -> PlanSolution {
        PlanSolution::new(self.initial.clone())
    }

    fn neighbor<R: Rng>(
        &self,
        solution: &PlanSolution,
        operator: NeighborhoodOperator,
        rng: &mut R,
    ) -> Option<PlanSolution> {
        match operator {
            NeighborhoodOperator::Shift => self.shift(solution, rng),
            NeighborhoodOperator::Swap => self.swap(solution, rng),
            NeighborhoodOperator::Rotate => self.rotate(solution, rng),
            NeighborhoodOperator::Compact => self.compact(solution),
        }
    }

    fn evaluate(&self, solution: &mut PlanSolution) {
        let fitness = plan_fitness(&solution.plan);
        solution.set_objective(fitness);
    }

    fn operator_weights(&self) -> Vec<(NeighborhoodOperator, f64)> {
        vec![
            (NeighborhoodOperator::Shift, 0.35),
            (NeighborhoodOperator::Swap, 0.20),
            (NeighborhoodOperator::Rotate, 0.25),
            (NeighborhoodOperator::Compact, 0.20),
        ]
    }

    fn on_temperature_change(
        &self,
        temperature: f64,
        iteration: u64,
        best: &PlanSolution,
        _current: &PlanSolution,
    ) {
        log::debug!(
            "Improvement iteration {}: temp={:.4}, best vehicles={}",
            iteration,
            temperature,
            best.plan.vehicles_used()
        );
    }
}

/// Result of an improvement pass.
#[derive(Debug, Clone)]
pub struct Improvement {
    /// Best plan found, empty vehicles dropped.
    pub plan: LoadPlan,
    /// Iterations performed.
    pub iterations: u64,
    /// Whether the deadline or cancellation cut the pass short.
    pub interrupted: bool,
}

/// Bounded post-construction improvement.
#[derive(Debug, Clone)]
pub struct ImprovementPass {
    iterations: u64,
    seed: u64,
    lower_bound: usize,
}

impl ImprovementPass {
    /// Creates a pass of at most `iterations` moves, stopping at `lower_bound` vehicles.
    pub fn new(iterations: u64, seed: u64, lower_bound: usize) -> Self {
        Self {
            iterations,
            seed,
            lower_bound,
        }
    }

    fn sa_config(&self, deadline: &Deadline) -> SaConfig {
        let mut config = SaConfig::default()
            .with_initial_temp(1.0)
            .with_final_temp(0.001)
            .with_cooling_rate(0.95)
            .with_iterations_per_temp(20)
            .with_max_iterations(self.iterations)
            .with_stagnation_limit((self.iterations / 10).max(50))
            .with_target_fitness(-(self.lower_bound as f64) * VEHICLE_WEIGHT);
        if let Some(remaining) = deadline.remaining() {
            config = config.with_time_limit(remaining);
        }
        config
    }

    /// Improves `plan`; returns it unchanged when no improving move is found.
    pub fn run(
        &self,
        items: &[Item],
        search: &PlacementSearch,
        plan: LoadPlan,
        deadline: &Deadline,
    ) -> Improvement {
        let before = plan.vehicles_used();

        if self.iterations == 0 || before <= self.lower_bound {
            let mut plan = plan;
            plan.drop_empty();
            return Improvement {
                plan,
                iterations: 0,
                interrupted: false,
            };
        }

        let problem = ImprovementProblem::new(items, search, plan);
        let runner = SaRunner::new(self.sa_config(deadline), problem)
            .with_cancel_flag(deadline.cancel_flag());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let result = runner.run_with_rng(&mut rng);

        let mut plan = result.best.plan;
        plan.drop_empty();

        log::debug!(
            "Improvement pass: {} -> {} vehicles in {} iterations ({} accepted)",
            before,
            plan.vehicles_used(),
            result.iterations,
            result.accepted
        );

        Improvement {
            plan,
            iterations: result.iterations,
            interrupted: result.interrupted,
        }
    }
}
