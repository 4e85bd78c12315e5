//! Text output for solutions and instances.

use crate::instance::Instance;
use std::fmt::Write;
use truckpack_core::{Solution, SolveStatus};

/// Formats a solution: `SAT` plus one `v x0 y0 z0 x1 y1 z1` line per item in
/// input order, or the single line `UNSAT`.
pub fn emit_solution(solution: &Solution) -> String {
    match solution.status {
        SolveStatus::Unsat => "UNSAT\n".to_string(),
        SolveStatus::Sat => {
            let mut out = String::with_capacity(16 + solution.placements.len() * 32);
            out.push_str("SAT\n");
            for p in &solution.placements {
                let far = p.far_corner();
                // Writing to a String cannot fail.
                let _ = writeln!(
                    out,
                    "{} {} {} {} {} {} {}",
                    p.vehicle, p.position.x, p.position.y, p.position.z, far.x, far.y, far.z
                );
            }
            out
        }
    }
}

/// Formats an instance in the input grammar.
pub fn emit_instance(instance: &Instance) -> String {
    let mut out = String::new();
    let v = &instance.vehicle;
    let _ = writeln!(out, "{} {} {}", v.length(), v.width(), v.height());
    let _ = writeln!(out, "{}", instance.items.len());
    for item in &instance.items {
        let d = item.dimensions();
        let rank = item.delivery().map_or(-1, i64::from);
        let _ = writeln!(out, "{} {} {} {}", d.x, d.y, d.z, rank);
    }
    out
}
