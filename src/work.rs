//! # Simulated Work
//!
//! A CPU-burning delay used by demo task bodies to model execution cost.
//! It busy-waits rather than sleeping so the measured execution time is
//! the requested time, not the OS scheduler's idea of it.

use core::time::Duration;
use std::time::Instant;

/// Spin for approximately `target`.
pub fn spin_for(target: Duration) {
    let start = Instant::now();
    while start.elapsed() < target {
        core::hint::spin_loop();
    }
}
