//! Benchmark result recording.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Outcome of one solver run on one instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name.
    pub instance: String,
    /// Strategy name.
    pub strategy: String,
    /// Seed the run used.
    pub seed: u64,
    /// Number of items.
    pub item_count: usize,
    /// `SAT`, `UNSAT` or `ERROR`.
    pub status: String,
    /// Vehicles used (0 when UNSAT or on error).
    pub vehicles: usize,
    /// Volume lower bound.
    pub lower_bound: usize,
    /// Utilization ratio (0.0 - 1.0).
    pub utilization: f64,
    /// Wall-clock time in milliseconds.
    pub time_ms: u64,
    /// Whether the verifier accepted the solution.
    pub verified: bool,
    /// Whether the search was cut short.
    pub heuristic_incomplete: bool,
    /// Verifier violations or the solver error, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl RunResult {
    /// Gap to the lower bound in vehicles.
    pub fn gap(&self) -> usize {
        self.vehicles.saturating_sub(self.lower_bound)
    }
}

/// Aggregate statistics for one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub run_count: usize,
    pub total_vehicles: usize,
    pub avg_utilization: f64,
    pub avg_time_ms: u64,
    pub failures: usize,
}

/// A collection of runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub runs: Vec<RunResult>,
}

impl BenchmarkResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_run(&mut self, run: RunResult) {
        self.runs.push(run);
    }

    /// Groups runs by strategy, in strategy-name order.
    pub fn summary_by_strategy(&self) -> Vec<StrategySummary> {
        let mut groups: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for run in &self.runs {
            groups.entry(run.strategy.as_str()).or_default().push(run);
        }

        groups
            .into_iter()
            .map(|(strategy, runs)| {
                let count = runs.len();
                StrategySummary {
                    strategy: strategy.to_string(),
                    run_count: count,
                    total_vehicles: runs.iter().map(|r| r.vehicles).sum(),
                    avg_utilization: runs.iter().map(|r| r.utilization).sum::<f64>() / count as f64,
                    avg_time_ms: runs.iter().map(|r| r.time_ms).sum::<u64>() / count as u64,
                    failures: runs.iter().filter(|r| !r.verified).count(),
                }
            })
            .collect()
    }

    /// Prints one row per run.
    pub fn print_summary(&self) {
        println!(
            "{:<20} {:<12} {:>6} {:>8} {:>4} {:>8} {:>9} {:>8}",
            "instance", "strategy", "status", "vehicles", "lb", "util", "time(ms)", "verified"
        );
        println!("{:-<82}", "");
        for run in &self.runs {
            println!(
                "{:<20} {:<12} {:>6} {:>8} {:>4} {:>7.1}% {:>9} {:>8}",
                run.instance,
                run.strategy,
                run.status,
                run.vehicles,
                run.lower_bound,
                run.utilization * 100.0,
                run.time_ms,
                if run.verified { "yes" } else { "NO" }
            );
            for message in &run.messages {
                println!("    {}", message);
            }
        }
    }

    /// Writes the runs as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
