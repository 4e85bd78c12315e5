//! Benchmark runner: every configured strategy on every instance.

use crate::instance::Instance;
use crate::result::{BenchmarkResult, RunResult};
use std::time::Instant;
use truckpack_core::{Config, SolveStatus, Solver, Strategy};
use truckpack_engine::{verify, TruckPacker};

/// Benchmark settings.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Strategies to run.
    pub strategies: Vec<Strategy>,
    /// Per-run time limit in milliseconds, 0 for none.
    pub time_limit_ms: u64,
    /// Runs per strategy; run `k` uses seed `base.seed + k`.
    pub runs: usize,
    /// Settings shared by every run.
    pub base: Config,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            strategies: vec![Strategy::Greedy, Strategy::LocalSearch, Strategy::MultiStart],
            time_limit_ms: 0,
            runs: 1,
            base: Config::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greedy only.
    pub fn quick() -> Self {
        Self::new().with_strategies(vec![Strategy::Greedy])
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs.max(1);
        self
    }

    pub fn with_base(mut self, base: Config) -> Self {
        self.base = base;
        self
    }
}

/// Runs benchmarks and checks every solution with the verifier.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Runs every strategy on one instance.
    pub fn run_instance(&self, instance: &Instance) -> BenchmarkResult {
        let mut result = BenchmarkResult::new();
        for &strategy in &self.config.strategies {
            for run in 0..self.config.runs {
                let seed = self.config.base.seed.wrapping_add(run as u64);
                let config = self
                    .config
                    .base
                    .clone()
                    .with_strategy(strategy)
                    .with_time_limit(self.config.time_limit_ms)
                    .with_seed(seed);
                log::info!("Running {} on {} (seed {})", strategy.name(), instance.name, seed);
                result.add_run(self.run_single(instance, config));
            }
        }
        result
    }

    /// Runs every strategy on several instances.
    pub fn run_all(&self, instances: &[Instance]) -> BenchmarkResult {
        let mut all = BenchmarkResult::new();
        for instance in instances {
            for run in self.run_instance(instance).runs {
                all.add_run(run);
            }
        }
        all
    }

    fn run_single(&self, instance: &Instance, config: Config) -> RunResult {
        let strategy = config.strategy;
        let seed = config.seed;
        let start = Instant::now();
        let outcome = TruckPacker::new(config).solve(&instance.items, &instance.vehicle);
        let time_ms = start.elapsed().as_millis() as u64;

        let mut run = RunResult {
            instance: instance.name.clone(),
            strategy: strategy.name().to_string(),
            seed,
            item_count: instance.items.len(),
            status: "ERROR".into(),
            vehicles: 0,
            lower_bound: 0,
            utilization: 0.0,
            time_ms,
            verified: false,
            heuristic_incomplete: false,
            messages: Vec::new(),
        };

        match outcome {
            Ok(solution) => {
                let report = verify(&instance.vehicle, &instance.items, &solution);
                run.status = match solution.status {
                    SolveStatus::Sat => "SAT".into(),
                    SolveStatus::Unsat => "UNSAT".into(),
                };
                run.vehicles = solution.vehicles_used;
                run.lower_bound = solution.lower_bound;
                run.utilization = solution.utilization;
                run.heuristic_incomplete = solution.heuristic_incomplete;
                run.verified = report.is_valid();
                run.messages = report.violations.iter().map(ToString::to_string).collect();
            }
            Err(e) => {
                log::error!("{} failed on {}: {}", strategy.name(), instance.name, e);
                run.messages.push(e.to_string());
            }
        }
        run
    }
}
