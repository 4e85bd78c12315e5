//! # truckpack Engine
//!
//! Placement and allocation engine for loading cuboid items into identical
//! vehicles.
//!
//! The solve pipeline screens every item against an empty vehicle, then a
//! greedy allocator commits items one at a time using a bottom-left-back
//! placement search that honours non-overlap, containment and delivery-order
//! accessibility. Optional strategies improve the constructed plan with
//! simulated annealing or run several seeded constructions.
//!
//! ```
//! use truckpack_engine::{Item, Solver, TruckPacker, VehicleSpec};
//!
//! let vehicle = VehicleSpec::new(40, 40, 20);
//! let items = vec![Item::new(0, 40, 20, 10), Item::new(1, 40, 20, 10)];
//!
//! let solution = TruckPacker::default_config().solve(&items, &vehicle).unwrap();
//! assert_eq!(solution.vehicles_used, 1);
//! ```

pub mod access;
pub mod allocator;
pub mod deadline;
pub mod feasibility;
pub mod improvement;
pub mod load;
pub mod multi_start;
pub mod packer;
pub mod search;
pub mod verify;

// Re-exports
pub use allocator::{sort_items, Construction, VehicleAllocator};
pub use deadline::Deadline;
pub use feasibility::{first_infeasible, volume_lower_bound};
pub use improvement::ImprovementPass;
pub use load::{LoadPlan, PlacedBox, VehicleLoad};
pub use packer::TruckPacker;
pub use search::{PlacementSearch, Proposal};
pub use verify::{verify, verify_boxes, BoxRecord, VerificationReport, Violation};
pub use truckpack_core::{
    Config, Error, Item, Orientation, Placement, Result, Solution, SolveStatus, Solver,
    SortPolicy, Strategy, Vec3, VehicleSelection, VehicleSpec,
};
