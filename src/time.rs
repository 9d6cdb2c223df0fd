//! # Clock Abstraction
//!
//! The executive never touches a hardware or OS clock directly. Everything
//! goes through [`Clock`], which has two operations:
//!
//! - `now()`: a monotonically non-decreasing [`Instant`]
//! - `sleep_until(t)`: block until at least `t`, returning at once when `t`
//!   has already passed
//!
//! Implementations:
//!
//! | Clock | Backing | Availability |
//! |-------|---------|--------------|
//! | [`StdClock`] | `std::time::Instant` + `thread::sleep` | feature `std` |
//! | [`VirtualClock`] | shared counter, advanced by hand | always |
//! | `arch::cortex_m4::SysTickClock` | SysTick tick counter + `wfi` | feature `cortex-m4` |

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::ops::{Add, AddAssign, Sub};
use core::time::Duration;

// ---------------------------------------------------------------------------
// Instant
// ---------------------------------------------------------------------------

/// A point in time, measured as an offset from the owning clock's epoch.
///
/// Instants from different clocks are not comparable in any meaningful way,
/// but nothing prevents it. The executive only ever uses one clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(Duration);

impl Instant {
    /// The clock epoch.
    pub const EPOCH: Instant = Instant(Duration::ZERO);

    #[inline]
    pub const fn from_epoch(offset: Duration) -> Self {
        Self(offset)
    }

    #[inline]
    pub const fn since_epoch(&self) -> Duration {
        self.0
    }

    /// `|self - other|`.
    #[inline]
    pub fn abs_diff(self, other: Instant) -> Duration {
        if self >= other {
            self.0 - other.0
        } else {
            other.0 - self.0
        }
    }

    /// `self - earlier`, or zero if `earlier` is actually later.
    #[inline]
    pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    #[inline]
    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs)
    }
}

impl AddAssign<Duration> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

/// Saturating: yields zero rather than panicking on a negative span.
impl Sub<Instant> for Instant {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Instant) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// Time source and the executive's only suspension point.
pub trait Clock {
    /// Current instant. Never goes backwards.
    fn now(&self) -> Instant;

    /// Block until at least `deadline`. Must not busy-wait, and must return
    /// promptly if `deadline` is already in the past.
    fn sleep_until(&self, deadline: Instant);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Instant) {
        (**self).sleep_until(deadline)
    }
}

// ---------------------------------------------------------------------------
// Real monotonic clock
// ---------------------------------------------------------------------------

/// Monotonic OS clock. The epoch is the moment the clock was created.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Instant {
        Instant(self.origin.elapsed())
    }

    fn sleep_until(&self, deadline: Instant) {
        let target = self.origin + deadline.since_epoch();
        let now = std::time::Instant::now();
        if target > now {
            std::thread::sleep(target - now);
        }
    }
}

// ---------------------------------------------------------------------------
// Virtual clock
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct VirtualState {
    now: Duration,
    wake_latency: Duration,
    sleeps: Vec<Instant>,
}

/// Deterministic clock for tests and simulation.
///
/// Time only moves when someone moves it: [`advance`](Self::advance) from a
/// task body to model execution cost, or `sleep_until` from the executive,
/// which jumps straight to the deadline (plus an optional wake latency) and
/// records the request.
///
/// Clones share the same timeline, so a task body can hold a handle to the
/// clock the executive is reading.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.state.borrow_mut().now += by;
    }

    /// Extra delay added to every `sleep_until` wake-up that actually has to
    /// wait. Models a late OS wake-up.
    pub fn set_wake_latency(&self, latency: Duration) {
        self.state.borrow_mut().wake_latency = latency;
    }

    /// Every deadline passed to `sleep_until`, in call order.
    pub fn sleep_requests(&self) -> Vec<Instant> {
        self.state.borrow().sleeps.clone()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        Instant(self.state.borrow().now)
    }

    fn sleep_until(&self, deadline: Instant) {
        let mut state = self.state.borrow_mut();
        state.sleeps.push(deadline);
        if deadline.since_epoch() > state.now {
            state.now = deadline.since_epoch() + state.wake_latency;
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
