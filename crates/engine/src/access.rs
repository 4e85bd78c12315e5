//! Delivery-order accessibility constraint.
//!
//! The vehicle is unloaded through its high-y face. An item that leaves
//! earlier must not be blocked by an item that leaves later: the earlier box
//! has to lie entirely beyond the later box along y, or entirely above it.

use crate::load::PlacedBox;
use truckpack_core::AABB3D;

/// Returns true if `earlier` can be removed without displacing `later`.
///
/// `y_earlier >= y_later + extent_y(later)` or `z_earlier >= z_later + height(later)`.
pub fn holds(earlier: &AABB3D, later: &AABB3D) -> bool {
    earlier.min.y >= later.max.y || earlier.min.z >= later.max.z
}

/// Checks a pair of ranked boxes in ascending-rank order.
///
/// Unranked boxes and equal ranks impose nothing.
pub fn compatible(
    a_rank: Option<u32>,
    a: &AABB3D,
    b_rank: Option<u32>,
    b: &AABB3D,
) -> bool {
    match (a_rank, b_rank) {
        (Some(ra), Some(rb)) if ra < rb => holds(a, b),
        (Some(ra), Some(rb)) if rb < ra => holds(b, a),
        _ => true,
    }
}

/// Returns true if a candidate with `rank` at `candidate` respects every committed box.
pub fn admits(rank: Option<u32>, candidate: &AABB3D, placed: &[PlacedBox]) -> bool {
    if rank.is_none() {
        return true;
    }
    placed
        .iter()
        .all(|b| compatible(rank, candidate, b.delivery, &b.aabb))
}
