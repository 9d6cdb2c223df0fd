//! # Synchronization Primitives
//!
//! The executive itself needs no locking: it is single-threaded and owns
//! its table outright. The only state shared with interrupt context is the
//! SysTick tick counter of the Cortex-M4 clock, and that is always read and
//! written through [`critical_section`].

use cortex_m::interrupt;

/// Execute a closure within a critical section (interrupts disabled).
///
/// Interrupts are disabled on entry and restored on exit. Keep the body
/// short: a SysTick that arrives meanwhile is only serviced afterwards.
///
/// # Usage
/// ```ignore
/// let ticks = sync::critical_section(|cs| TICKS.borrow(cs).get());
/// ```
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&interrupt::CriticalSection) -> R,
{
    interrupt::free(f)
}
