//! Simulated Annealing framework for post-construction improvement.
//!
//! The runner is generic over an [`SaProblem`]; the improvement pass of the
//! engine crate plugs load plans and their move operators into it. Runs are
//! driven by a caller-supplied RNG so a seeded generator yields repeatable
//! results.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cooling schedule types for Simulated Annealing.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoolingSchedule {
    /// Geometric cooling: T_new = T * alpha (alpha typically 0.95-0.99).
    #[default]
    Geometric,
    /// Linear cooling: T_new = T - delta.
    Linear,
    /// Adaptive cooling: adjusts based on acceptance rate.
    Adaptive,
    /// Lundy-Mees: T_new = T / (1 + beta * T).
    LundyMees,
}

/// Configuration for Simulated Annealing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SaConfig {
    /// Initial temperature.
    pub initial_temp: f64,
    /// Final (minimum) temperature.
    pub final_temp: f64,
    /// Cooling rate (alpha for Geometric, delta for Linear, beta for LundyMees).
    pub cooling_rate: f64,
    /// Number of iterations at each temperature level.
    pub iterations_per_temp: usize,
    /// Maximum total iterations (None = temperature-based stopping only).
    pub max_iterations: Option<u64>,
    /// Cooling schedule type.
    pub cooling_schedule: CoolingSchedule,
    /// Maximum time limit (None = unlimited).
    pub time_limit: Option<Duration>,
    /// Target fitness to stop early (None = run until temperature limit).
    pub target_fitness: Option<f64>,
    /// Stop after this many iterations without a new best (None = never).
    pub stagnation_limit: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temp: 100.0,
            final_temp: 0.01,
            cooling_rate: 0.95,
            iterations_per_temp: 20,
            max_iterations: Some(2000),
            cooling_schedule: CoolingSchedule::Geometric,
            time_limit: None,
            target_fitness: None,
            stagnation_limit: None,
        }
    }
}

impl SaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial temperature.
    pub fn with_initial_temp(mut self, temp: f64) -> Self {
        self.initial_temp = temp.max(0.001);
        self
    }

    /// Sets the final temperature.
    pub fn with_final_temp(mut self, temp: f64) -> Self {
        self.final_temp = temp.max(0.0001);
        self
    }

    /// Sets the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate.clamp(0.001, 0.9999);
        self
    }

    /// Sets the iterations per temperature level.
    pub fn with_iterations_per_temp(mut self, iterations: usize) -> Self {
        self.iterations_per_temp = iterations.max(1);
        self
    }

    /// Sets the maximum iterations.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Sets the cooling schedule.
    pub fn with_cooling_schedule(mut self, schedule: CoolingSchedule) -> Self {
        self.cooling_schedule = schedule;
        self
    }

    /// Sets the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Sets the target fitness.
    pub fn with_target_fitness(mut self, fitness: f64) -> Self {
        self.target_fitness = Some(fitness);
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, iterations: u64) -> Self {
        self.stagnation_limit = Some(iterations.max(1));
        self
    }
}

/// Trait for solutions in Simulated Annealing.
pub trait SaSolution: Clone + Send + Sync {
    /// Returns the objective value (fitness) of this solution.
    /// Higher values are better (maximization).
    fn objective(&self) -> f64;

    /// Sets the objective value.
    fn set_objective(&mut self, value: f64);
}

/// Neighborhood operator types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeighborhoodOperator {
    /// Move one item to another vehicle, or to a better spot in its own.
    Shift,
    /// Exchange two items between vehicles.
    Swap,
    /// Re-place an item in a different orientation.
    Rotate,
    /// Empty the least-filled vehicle into the others.
    Compact,
}

/// Trait for problem-specific SA operations.
pub trait SaProblem: Send + Sync {
    /// The solution type for this problem.
    type Solution: SaSolution;

    /// Returns the solution the search starts from.
    fn initial_solution(&self) -> Self::Solution;

    /// Generates a neighbor using the specified operator.
    ///
    /// Returns `None` when the operator finds no applicable move.
    fn neighbor<R: Rng>(
        &self,
        solution: &Self::Solution,
        operator: NeighborhoodOperator,
        rng: &mut R,
    ) -> Option<Self::Solution>;

    /// Evaluates the objective of a solution.
    fn evaluate(&self, solution: &mut Self::Solution);

    /// Returns operators with their selection weights.
    fn operator_weights(&self) -> Vec<(NeighborhoodOperator, f64)> {
        vec![
            (NeighborhoodOperator::Shift, 1.0),
            (NeighborhoodOperator::Swap, 1.0),
            (NeighborhoodOperator::Rotate, 1.0),
            (NeighborhoodOperator::Compact, 1.0),
        ]
    }

    /// Called after each temperature level.
    fn on_temperature_change(
        &self,
        _temperature: f64,
        _iteration: u64,
        _best: &Self::Solution,
        _current: &Self::Solution,
    ) {
    }
}

/// Result of a SA run.
#[derive(Debug, Clone)]
pub struct SaResult<S: SaSolution> {
    /// The best solution found.
    pub best: S,
    /// Final temperature reached.
    pub final_temperature: f64,
    /// Total iterations performed.
    pub iterations: u64,
    /// Number of accepted moves.
    pub accepted: u64,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Whether the target fitness was reached.
    pub target_reached: bool,
    /// Whether cancellation or the time limit stopped the run.
    pub interrupted: bool,
    /// Fitness history (sampled at temperature changes).
    pub history: Vec<f64>,
}

/// Simulated Annealing runner.
pub struct SaRunner<P: SaProblem> {
    config: SaConfig,
    problem: P,
    cancelled: Arc<AtomicBool>,
}

impl<P: SaProblem> SaRunner<P> {
    /// Creates a new SA runner.
    pub fn new(config: SaConfig, problem: P) -> Self {
        Self {
            config,
            problem,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares an external cancellation flag.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Returns a handle to cancel the algorithm.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Returns the problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the Simulated Annealing algorithm with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> SaResult<P::Solution> {
        let start = Instant::now();
        let mut history = Vec::new();

        let mut current = self.problem.initial_solution();
        self.problem.evaluate(&mut current);
        let mut best = current.clone();
        let mut best_fitness = best.objective();

        let mut temperature = self.config.initial_temp;
        let mut iteration = 0u64;
        let mut accepted = 0u64;
        let mut target_reached = false;
        let mut interrupted = false;
        let mut stagnation_count = 0u64;

        let weighted = self.problem.operator_weights();
        let Ok(selector) = WeightedIndex::new(weighted.iter().map(|(_, w)| *w)) else {
            return SaResult {
                best,
                final_temperature: temperature,
                iterations: 0,
                accepted: 0,
                elapsed: start.elapsed(),
                target_reached: false,
                interrupted: false,
                history: vec![best_fitness],
            };
        };

        let temp_delta = if matches!(self.config.cooling_schedule, CoolingSchedule::Linear) {
            (self.config.initial_temp - self.config.final_temp)
                / (self.config.max_iterations.unwrap_or(10000) as f64
                    / self.config.iterations_per_temp as f64)
        } else {
            0.0
        };

        // For adaptive cooling
        let mut accepted_count = 0usize;
        let mut total_count = 0usize;

        'outer: while temperature > self.config.final_temp {
            if let Some(target) = self.config.target_fitness {
                if best_fitness >= target {
                    target_reached = true;
                    break;
                }
            }

            for _ in 0..self.config.iterations_per_temp {
                if self.should_interrupt(start) {
                    interrupted = true;
                    break 'outer;
                }

                if let Some(max) = self.config.max_iterations {
                    if iteration >= max {
                        break 'outer;
                    }
                }

                if let Some(limit) = self.config.stagnation_limit {
                    if stagnation_count >= limit {
                        break 'outer;
                    }
                }

                iteration += 1;
                total_count += 1;

                let operator = weighted[selector.sample(rng)].0;

                let Some(mut neighbor) = self.problem.neighbor(&current, operator, rng) else {
                    stagnation_count += 1;
                    continue;
                };
                self.problem.evaluate(&mut neighbor);

                let delta = neighbor.objective() - current.objective();

                let accept = if delta >= 0.0 {
                    true
                } else {
                    let probability = (delta / temperature).exp();
                    rng.gen::<f64>() < probability
                };

                if accept {
                    accepted += 1;
                    accepted_count += 1;
                    current = neighbor;

                    if current.objective() > best_fitness {
                        best = current.clone();
                        best_fitness = best.objective();
                        stagnation_count = 0;
                    } else {
                        stagnation_count += 1;
                    }
                } else {
                    stagnation_count += 1;
                }

                if let Some(target) = self.config.target_fitness {
                    if best_fitness >= target {
                        target_reached = true;
                        break 'outer;
                    }
                }
            }

            history.push(best_fitness);
            self.problem
                .on_temperature_change(temperature, iteration, &best, &current);

            temperature = self.cool_down(temperature, temp_delta, accepted_count, total_count);

            accepted_count = 0;
            total_count = 0;
        }

        history.push(best_fitness);

        SaResult {
            best,
            final_temperature: temperature,
            iterations: iteration,
            accepted,
            elapsed: start.elapsed(),
            target_reached,
            interrupted,
            history,
        }
    }

    fn should_interrupt(&self, start: Instant) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        matches!(self.config.time_limit, Some(limit) if start.elapsed() > limit)
    }

    /// Apply cooling schedule.
    fn cool_down(&self, current_temp: f64, delta: f64, accepted: usize, total: usize) -> f64 {
        match self.config.cooling_schedule {
            CoolingSchedule::Geometric => current_temp * self.config.cooling_rate,
            CoolingSchedule::Linear => (current_temp - delta).max(self.config.final_temp * 0.5),
            CoolingSchedule::Adaptive => {
                let acceptance_rate = if total > 0 {
                    accepted as f64 / total as f64
                } else {
                    0.5
                };

                // High acceptance cools faster, low acceptance slower
                let adjusted_rate = if acceptance_rate > 0.5 {
                    self.config.cooling_rate * 0.95
                } else if acceptance_rate < 0.1 {
                    self.config.cooling_rate.powf(0.5)
                } else {
                    self.config.cooling_rate
                };

                current_temp * adjusted_rate
            }
            CoolingSchedule::LundyMees => {
                current_temp / (1.0 + self.config.cooling_rate * current_temp)
            }
        }
    }
}
