//! truckpack command-line tool.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use truckpack_cli::{
    build_config, emit_instance, emit_solution, generate, parse_instance, parse_solution,
    BenchmarkConfig, BenchmarkRunner, ConfigRequest, Dimensions, GeneratorConfig, Instance,
    InstanceInfo, League, ParsedSolution,
};
use truckpack_core::{Solution, SolveSummary, SortPolicy, Strategy, VehicleSelection};
use truckpack_engine::verify::verify_unsat;
use truckpack_engine::{verify_boxes, Solver, TruckPacker};

#[derive(Parser)]
#[command(name = "truckpack")]
#[command(about = "Load cuboid items into identical vehicles respecting delivery order")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance and print the placements
    Solve {
        /// Instance file, or '-' for stdin
        input: PathBuf,

        /// Search strategy
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Item ordering for construction
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Vehicle selection rule
        #[arg(long, value_enum)]
        selection: Option<SelectionArg>,

        /// Time limit in milliseconds (0 for none)
        #[arg(short, long)]
        time_limit: Option<u64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Improvement iterations
        #[arg(long)]
        iterations: Option<u64>,

        /// Multi-start restarts
        #[arg(long)]
        restarts: Option<usize>,

        /// Minimum supported fraction of each raised item's base
        #[arg(long)]
        support: Option<f64>,

        /// Disable parallel search
        #[arg(long)]
        sequential: bool,

        /// JSON configuration file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print a JSON report instead of the text grammar
        #[arg(long)]
        json: bool,
    },

    /// Verify a solution against its instance
    Check {
        /// Instance file
        input: PathBuf,

        /// Solution file, or '-' for stdin
        output: PathBuf,
    },

    /// Generate a random instance
    Generate {
        /// Difficulty tier
        #[arg(short, long, value_enum, default_value = "bronze")]
        league: LeagueArg,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Largest item dimensions, LxWxH
        #[arg(long)]
        max_item_dimensions: Option<Dimensions>,

        /// Largest vehicle dimensions, LxWxH
        #[arg(long)]
        max_truck_dimensions: Option<Dimensions>,
    },

    /// Benchmark strategies on one or more instances
    Bench {
        /// Instance files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Strategies to benchmark
        #[arg(short, long, value_enum, default_values_t = vec![StrategyArg::Greedy, StrategyArg::LocalSearch, StrategyArg::MultiStart])]
        strategies: Vec<StrategyArg>,

        /// Time limit per run in milliseconds (0 for none)
        #[arg(short, long, default_value = "0")]
        time_limit: u64,

        /// Runs per strategy, each with the next seed
        #[arg(short, long, default_value = "1")]
        runs: usize,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum StrategyArg {
    /// Greedy bottom-left-back construction
    Greedy,
    /// Construction plus simulated-annealing improvement
    LocalSearch,
    /// Several seeded constructions, best kept
    MultiStart,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::LocalSearch => Strategy::LocalSearch,
            StrategyArg::MultiStart => Strategy::MultiStart,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    /// Largest volume first
    Volume,
    /// Latest delivery first, then volume
    Delivery,
}

impl From<SortArg> for SortPolicy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Volume => SortPolicy::VolumeDescending,
            SortArg::Delivery => SortPolicy::DeliveryThenVolume,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SelectionArg {
    /// Lowest vehicle id
    FirstFit,
    /// Fullest vehicle
    BestFit,
}

impl From<SelectionArg> for VehicleSelection {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::FirstFit => VehicleSelection::FirstFit,
            SelectionArg::BestFit => VehicleSelection::BestFit,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LeagueArg {
    Bronze,
    Silver,
    Gold,
}

impl From<LeagueArg> for League {
    fn from(arg: LeagueArg) -> Self {
        match arg {
            LeagueArg::Bronze => League::Bronze,
            LeagueArg::Silver => League::Silver,
            LeagueArg::Gold => League::Gold,
        }
    }
}

/// JSON report printed by `solve --json`.
#[derive(Serialize)]
struct SolveReport<'a> {
    instance: InstanceInfo,
    summary: SolveSummary,
    solution: &'a Solution,
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn load_instance(path: &Path) -> anyhow::Result<Instance> {
    let text = read_text(path)?;
    let instance = parse_instance(&text).with_context(|| format!("Malformed instance {}", path.display()))?;
    Ok(match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if stem != "-" => instance.with_name(stem),
        _ => instance,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            input,
            strategy,
            sort,
            selection,
            time_limit,
            seed,
            iterations,
            restarts,
            support,
            sequential,
            config,
            json,
        } => {
            let instance = load_instance(&input)?;

            let request = match config {
                Some(path) => Some(
                    ConfigRequest::from_file(&path)
                        .with_context(|| format!("Invalid config {}", path.display()))?,
                ),
                None => None,
            };
            let mut config = build_config(request.as_ref())?;
            if let Some(strategy) = strategy {
                config.strategy = strategy.into();
            }
            if let Some(sort) = sort {
                config.sort_policy = sort.into();
            }
            if let Some(selection) = selection {
                config.vehicle_selection = selection.into();
            }
            if let Some(ms) = time_limit {
                config.time_limit_ms = ms;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(iterations) = iterations {
                config.improvement_iterations = iterations;
            }
            if let Some(restarts) = restarts {
                config.restarts = restarts;
            }
            if let Some(ratio) = support {
                config.min_support_ratio = Some(ratio);
            }
            if sequential {
                config.parallel = false;
            }
            log::debug!("Solving {} with {:?}", instance.name, config);

            let solution = TruckPacker::new(config).solve(&instance.items, &instance.vehicle)?;

            if json {
                let report = SolveReport {
                    instance: instance.info(),
                    summary: SolveSummary::from(&solution),
                    solution: &solution,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", emit_solution(&solution));
            }
        }

        Commands::Check { input, output } => {
            let instance = load_instance(&input)?;
            let text = read_text(&output)?;
            let parsed = parse_solution(&text, instance.items.len())
                .with_context(|| format!("Malformed solution {}", output.display()))?;

            let report = match &parsed {
                ParsedSolution::Unsat => verify_unsat(&instance.vehicle, &instance.items),
                ParsedSolution::Sat(records) => {
                    verify_boxes(&instance.vehicle, &instance.items, records)
                }
            };

            if !report.is_valid() {
                for violation in &report.violations {
                    println!("{}", violation);
                }
                eprintln!("{} violation(s)", report.violations.len());
                return Ok(ExitCode::FAILURE);
            }

            match parsed {
                ParsedSolution::Unsat => println!("OK: UNSAT confirmed"),
                ParsedSolution::Sat(_) => println!(
                    "OK: {} items in {} vehicles",
                    instance.items.len(),
                    report.vehicles
                ),
            }
        }

        Commands::Generate {
            league,
            seed,
            max_item_dimensions,
            max_truck_dimensions,
        } => {
            let mut config = GeneratorConfig::new(league.into(), seed);
            if let Some(max) = max_item_dimensions {
                config = config.with_max_item(max);
            }
            if let Some(max) = max_truck_dimensions {
                config = config.with_max_vehicle(max);
            }
            let instance = generate(&config)?;
            print!("{}", emit_instance(&instance));
        }

        Commands::Bench {
            inputs,
            strategies,
            time_limit,
            runs,
            output,
        } => {
            let instances = inputs
                .iter()
                .map(|path| load_instance(path))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let config = BenchmarkConfig::new()
                .with_strategies(strategies.into_iter().map(Into::into).collect())
                .with_time_limit(time_limit)
                .with_runs(runs);

            let results = BenchmarkRunner::new(config).run_all(&instances);
            results.print_summary();

            println!("\nStrategy Comparison:");
            println!("{:-<60}", "");
            for summary in results.summary_by_strategy() {
                println!(
                    "  {:<12} runs={:<3} vehicles={:<5} avg_util={:.1}% avg_time={}ms failures={}",
                    summary.strategy,
                    summary.run_count,
                    summary.total_vehicles,
                    summary.avg_utilization * 100.0,
                    summary.avg_time_ms,
                    summary.failures
                );
            }

            if let Some(path) = output {
                results.save_json(&path)?;
                println!("\nResults saved to: {}", path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
