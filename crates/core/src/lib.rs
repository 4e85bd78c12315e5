//! # truckpack Core
//!
//! Core types and traits for the truckpack vehicle loading engine.
//!
//! This crate holds what the engine and the command-line tools share: the item
//! and vehicle model, placements, solve results and the solver interface.
//!
//! ## Core Components
//!
//! - **Geometry**: [`Item`], [`VehicleSpec`], [`Orientation`] and the [`Vec3`] alias
//! - **Boxes**: [`AABB3D`] with half-open overlap semantics
//! - **Solver trait**: Common interface for loading algorithms
//! - **SA framework**: Simulated annealing infrastructure for the improvement pass
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod aabb;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod result;
pub mod sa;
pub mod solver;

// Re-exports
pub use aabb::AABB3D;
pub use error::{Error, Result};
pub use geometry::{volume, Item, ItemId, Orientation, Vec3, VehicleSpec, Volume, MAX_ITEMS};
pub use placement::{Placement, PlacementStats};
pub use result::{Infeasibility, SolveStatus, SolveSummary, Solution, VehicleStats};
pub use sa::{
    CoolingSchedule, NeighborhoodOperator, SaConfig, SaProblem, SaResult, SaRunner, SaSolution,
};
pub use solver::{
    Config, Phase, ProgressCallback, ProgressInfo, Solver, SortPolicy, Strategy,
    VehicleSelection,
};
