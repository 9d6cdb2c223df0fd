//! # Cortex-M4 Clock Port
//!
//! A [`Clock`] for bare-metal ARM Cortex-M4 targets, driven by the SysTick
//! timer.
//!
//! - SysTick fires at `TICK_HZ` and its handler bumps a 64-bit tick
//!   counter. At the default 1 kHz the counter will not wrap in any
//!   realistic uptime.
//! - `now()` reads the counter inside a critical section (a 64-bit load is
//!   not atomic on Thumb-2).
//! - `sleep_until()` parks the core with `wfi` between ticks instead of
//!   spinning.
//!
//! Resolution is one tick, so at 1 kHz execution times below a millisecond
//! measure as either 0 or 1 ms.
//!
//! ## Interrupt Priorities
//!
//! SysTick runs at the lowest priority (0xFF). Its handler is only a
//! counter increment, so it never delays other interrupts meaningfully.

use core::cell::Cell;
use core::time::Duration;

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::sync;
use crate::time::{Clock, Instant};

/// Microseconds per SysTick interrupt.
const TICK_US: u64 = 1_000_000 / TICK_HZ as u64;

/// Ticks since the clock was started. Written only by `SysTick`.
static TICKS: Mutex<Cell<u64>> = Mutex::new(Cell::new(0));

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure the SysTick timer to interrupt at `TICK_HZ` from the processor
/// clock.
pub fn configure_systick(syst: &mut SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Set SysTick to the lowest interrupt priority.
///
/// System Handler Priority Register 3 (SHPR3) at `0xE000_ED20`, bits
/// [31:24] hold the SysTick priority.
pub fn set_systick_priority() {
    unsafe {
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = core::ptr::read_volatile(shpr3);
        core::ptr::write_volatile(shpr3, val | (0xFF << 24));
    }
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

/// SysTick exception handler: advance the tick counter.
#[no_mangle]
pub extern "C" fn SysTick() {
    sync::critical_section(|cs| {
        let ticks = TICKS.borrow(cs);
        ticks.set(ticks.get() + 1);
    });
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// SysTick-backed monotonic clock. The epoch is the moment it was created.
pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Take ownership of SysTick, reset the tick counter and start the
    /// timer.
    pub fn new(mut syst: SYST) -> Self {
        sync::critical_section(|cs| TICKS.borrow(cs).set(0));
        set_systick_priority();
        configure_systick(&mut syst);
        Self { _syst: syst }
    }

    /// Raw tick count since creation.
    pub fn ticks(&self) -> u64 {
        sync::critical_section(|cs| TICKS.borrow(cs).get())
    }
}

impl Clock for SysTickClock {
    fn now(&self) -> Instant {
        Instant::from_epoch(Duration::from_micros(self.ticks() * TICK_US))
    }

    fn sleep_until(&self, deadline: Instant) {
        while self.now() < deadline {
            cortex_m::asm::wfi();
        }
    }
}
