//! Error types for truckpack.

use thiserror::Error;

/// Result type alias for truckpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading vehicles.
///
/// An instance with an item that fits in no orientation is not an error: it is
/// reported as an UNSAT [`Solution`](crate::Solution).
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item provided.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Invalid vehicle provided.
    #[error("Invalid vehicle: {0}")]
    InvalidVehicle(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An individually feasible item could not be placed even in a fresh vehicle.
    #[error("Search exhausted: item {item} fits an empty vehicle but was not placed in one")]
    SearchExhausted {
        /// Input index of the item.
        item: usize,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
