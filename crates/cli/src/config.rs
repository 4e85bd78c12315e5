//! JSON configuration file layered under command-line flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use truckpack_core::{Config, SortPolicy, Strategy, VehicleSelection};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },
}

/// Solver configuration as read from JSON. Absent fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRequest {
    /// `greedy`, `local-search` or `multi-start`.
    pub strategy: Option<String>,

    /// `volume` or `delivery`.
    pub sort_policy: Option<String>,

    /// `first-fit` or `best-fit`.
    pub vehicle_selection: Option<String>,

    /// Time limit in milliseconds, 0 for none.
    pub time_limit_ms: Option<u64>,

    pub seed: Option<u64>,

    pub improvement_iterations: Option<u64>,

    pub restarts: Option<usize>,

    pub parallel: Option<bool>,

    /// Minimum supported fraction of each raised item's base.
    pub min_support_ratio: Option<f64>,
}

/// Normalizes a user-supplied name: lowercase, no separators.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parses a strategy name.
pub fn parse_strategy(value: &str) -> Result<Strategy, ConfigFileError> {
    match normalize(value).as_str() {
        "greedy" | "blb" => Ok(Strategy::Greedy),
        "localsearch" | "local" | "sa" => Ok(Strategy::LocalSearch),
        "multistart" | "multi" => Ok(Strategy::MultiStart),
        _ => Err(ConfigFileError::UnknownValue {
            field: "strategy",
            value: value.to_string(),
        }),
    }
}

/// Parses a sort policy name.
pub fn parse_sort_policy(value: &str) -> Result<SortPolicy, ConfigFileError> {
    match normalize(value).as_str() {
        "volume" | "volumedescending" => Ok(SortPolicy::VolumeDescending),
        "delivery" | "deliverythenvolume" | "lifo" => Ok(SortPolicy::DeliveryThenVolume),
        _ => Err(ConfigFileError::UnknownValue {
            field: "sort policy",
            value: value.to_string(),
        }),
    }
}

/// Parses a vehicle selection name.
pub fn parse_vehicle_selection(value: &str) -> Result<VehicleSelection, ConfigFileError> {
    match normalize(value).as_str() {
        "firstfit" | "first" => Ok(VehicleSelection::FirstFit),
        "bestfit" | "best" => Ok(VehicleSelection::BestFit),
        _ => Err(ConfigFileError::UnknownValue {
            field: "vehicle selection",
            value: value.to_string(),
        }),
    }
}

impl ConfigRequest {
    /// Reads a request from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reads a request from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlays the present fields onto `config`.
    pub fn apply(&self, mut config: Config) -> Result<Config, ConfigFileError> {
        if let Some(strategy) = &self.strategy {
            config.strategy = parse_strategy(strategy)?;
        }
        if let Some(policy) = &self.sort_policy {
            config.sort_policy = parse_sort_policy(policy)?;
        }
        if let Some(selection) = &self.vehicle_selection {
            config.vehicle_selection = parse_vehicle_selection(selection)?;
        }
        if let Some(time_limit) = self.time_limit_ms {
            config.time_limit_ms = time_limit;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(iterations) = self.improvement_iterations {
            config.improvement_iterations = iterations;
        }
        if let Some(restarts) = self.restarts {
            config.restarts = restarts;
        }
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }
        if let Some(ratio) = self.min_support_ratio {
            config.min_support_ratio = Some(ratio);
        }
        Ok(config)
    }
}

/// Builds a config from an optional request, starting from the defaults.
pub fn build_config(request: Option<&ConfigRequest>) -> Result<Config, ConfigFileError> {
    match request {
        Some(request) => request.apply(Config::default()),
        None => Ok(Config::default()),
    }
}
