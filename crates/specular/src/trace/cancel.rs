//! Cooperative cancellation, polled once per expanded node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub trait CancelStatus {
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> CancelStatus for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl CancelStatus for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelStatus for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancels once the wall clock passes a fixed instant.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(pub Instant);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }
}

impl CancelStatus for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.0
    }
}
