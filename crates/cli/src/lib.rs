//! Text collaborators for the truckpack engine.
//!
//! This crate provides:
//! - A parser for the instance grammar and for emitted solutions
//! - A solution emitter
//! - A seeded instance generator with bronze, silver and gold tiers
//! - A JSON configuration layer
//! - A benchmark runner that verifies every solution

pub mod config;
pub mod emitter;
pub mod generator;
pub mod instance;
pub mod parser;
mod result;
mod runner;

pub use config::{build_config, ConfigFileError, ConfigRequest};
pub use emitter::{emit_instance, emit_solution};
pub use generator::{generate, Dimensions, GenerateError, GeneratorConfig, League};
pub use instance::{Instance, InstanceInfo};
pub use parser::{parse_file, parse_instance, parse_solution, ParseError, ParsedSolution};
pub use result::{BenchmarkResult, RunResult, StrategySummary};
pub use runner::{BenchmarkConfig, BenchmarkRunner};
