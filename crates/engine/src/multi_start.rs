//! Multi-start construction.
//!
//! Restart 0 uses the configured sort policy, restart `k > 0` a shuffle seeded
//! with `seed + k`. Each construction is improved and the plan with the fewest
//! vehicles wins, ties going to the lower restart index. Restarts run on the
//! rayon pool but each is seeded independently, so the winner does not depend
//! on the thread count.

use crate::allocator::{shuffled_order, sort_items, Construction, VehicleAllocator};
use crate::deadline::Deadline;
use crate::improvement::ImprovementPass;
use crate::load::LoadPlan;
use rayon::prelude::*;
use truckpack_core::{Config, Item, ItemId, Result};

/// Best plan over all restarts.
#[derive(Debug, Clone)]
pub struct MultiStartOutcome {
    /// Winning plan.
    pub plan: LoadPlan,
    /// Restart that produced it.
    pub restart: usize,
    /// Restarts actually run.
    pub completed: usize,
    /// Improvement iterations summed over restarts.
    pub iterations: u64,
    /// Whether the deadline skipped or cut short any restart.
    pub incomplete: bool,
}

struct RestartResult {
    restart: usize,
    plan: LoadPlan,
    iterations: u64,
    incomplete: bool,
}

/// Runs `config.restarts` constructions and keeps the best.
pub fn run_multi_start(
    items: &[Item],
    allocator: &VehicleAllocator,
    config: &Config,
    lower_bound: usize,
    deadline: &Deadline,
) -> Result<MultiStartOutcome> {
    let restarts = config.restarts.max(1);

    let run_one = |restart: usize| -> Option<Result<RestartResult>> {
        // The configured order always runs so there is a plan to return.
        if restart > 0 && deadline.is_expired() {
            return None;
        }

        let order: Vec<ItemId> = if restart == 0 {
            sort_items(items, config.sort_policy)
        } else {
            shuffled_order(items.len(), config.seed.wrapping_add(restart as u64))
        };

        Some(
            allocator
                .construct(items, &order, deadline)
                .map(|Construction { plan, degraded }| {
                    let improved = ImprovementPass::new(
                        config.improvement_iterations,
                        config.seed.wrapping_add(restart as u64),
                        lower_bound,
                    )
                    .run(items, allocator.search(), plan, deadline);

                    log::debug!(
                        "Restart {}: {} vehicles",
                        restart,
                        improved.plan.vehicles_used()
                    );

                    RestartResult {
                        restart,
                        plan: improved.plan,
                        iterations: improved.iterations,
                        incomplete: degraded || improved.interrupted,
                    }
                }),
        )
    };

    let results: Vec<Option<Result<RestartResult>>> = if config.parallel {
        (0..restarts).into_par_iter().map(run_one).collect()
    } else {
        (0..restarts).map(run_one).collect()
    };

    let skipped = results.iter().filter(|r| r.is_none()).count();
    let finished: Vec<RestartResult> = results
        .into_iter()
        .flatten()
        .collect::<Result<Vec<_>>>()?;

    let completed = finished.len();
    let iterations = finished.iter().map(|r| r.iterations).sum();
    let incomplete = skipped > 0 || finished.iter().any(|r| r.incomplete);

    let best = finished
        .into_iter()
        .min_by_key(|r| (r.plan.vehicles_used(), r.restart))
        .ok_or_else(|| truckpack_core::Error::Internal("No restart completed".into()))?;

    if skipped > 0 {
        log::warn!("Deadline skipped {} of {} restarts", skipped, restarts);
    }

    Ok(MultiStartOutcome {
        plan: best.plan,
        restart: best.restart,
        completed,
        iterations,
        incomplete,
    })
}
