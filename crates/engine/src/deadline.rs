//! Time budget and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline shared by every phase of one solve.
#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// Arms a deadline of `time_limit_ms` (0 = unlimited) tied to `cancelled`.
    pub fn new(time_limit_ms: u64, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            start: Instant::now(),
            limit: (time_limit_ms > 0).then(|| Duration::from_millis(time_limit_ms)),
            cancelled,
        }
    }

    /// A deadline that never expires and cannot be cancelled from outside.
    pub fn unlimited() -> Self {
        Self::new(0, Arc::new(AtomicBool::new(false)))
    }

    /// Returns true if the solve was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns true if the budget is spent or the solve was cancelled.
    pub fn is_expired(&self) -> bool {
        self.is_cancelled() || matches!(self.limit, Some(limit) if self.start.elapsed() >= limit)
    }

    /// Returns the remaining budget, `None` when unlimited.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    /// Returns the cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Returns elapsed milliseconds since the deadline was armed.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
