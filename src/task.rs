//! # Task Model
//!
//! A task is one periodic unit of work: a name, fixed timing parameters
//! ([`TaskConfig`]), a body ([`Runnable`]) and the mutable scheduling state
//! the executive keeps for it: the next release instant and cumulative
//! [`RunStats`].
//!
//! ## Release Timeline
//!
//! ```text
//!  start        start+phase   +period      +period      +period
//!    │              │            │            │            │
//!    ▼              ▼            ▼            ▼            ▼
//!    ├──────────────┼────────────┼────────────┼────────────┼───►
//!                   R0           R1           R2           R3
//! ```
//!
//! A release is never replayed late. If a task falls more than one period
//! behind, the releases it slid past are dropped and counted in
//! [`RunStats::skipped_releases`].

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::time::Duration;

use crate::error::{ExecutiveError, TaskFault};
use crate::time::Instant;

// ---------------------------------------------------------------------------
// Task body
// ---------------------------------------------------------------------------

/// The work a task performs on each release. Invoked synchronously and
/// expected to run to completion without suspending.
pub trait Runnable {
    fn run(&mut self) -> Result<(), TaskFault>;
}

impl<F> Runnable for F
where
    F: FnMut() -> Result<(), TaskFault>,
{
    #[inline]
    fn run(&mut self) -> Result<(), TaskFault> {
        self()
    }
}

/// Adapter for bodies that cannot fail. See [`infallible`].
pub struct Infallible<F>(F);

impl<F: FnMut()> Runnable for Infallible<F> {
    #[inline]
    fn run(&mut self) -> Result<(), TaskFault> {
        (self.0)();
        Ok(())
    }
}

/// Wrap a plain `FnMut()` as a [`Runnable`].
pub fn infallible<F: FnMut()>(body: F) -> Infallible<F> {
    Infallible(body)
}

// ---------------------------------------------------------------------------
// Task configuration (immutable after creation)
// ---------------------------------------------------------------------------

/// Timing parameters of a task, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    /// Time between successive releases. Must be non-zero.
    pub period: Duration,

    /// Offset from executive start to the first release. May be zero.
    pub phase: Duration,

    /// Execution budget. A run that takes strictly longer is an overrun.
    pub wcet_budget: Duration,
}

impl TaskConfig {
    pub const fn new(period: Duration, wcet_budget: Duration) -> Self {
        Self {
            period,
            phase: Duration::ZERO,
            wcet_budget,
        }
    }

    pub const fn with_phase(mut self, phase: Duration) -> Self {
        self.phase = phase;
        self
    }

    /// Fraction of the CPU this task may claim: `wcet_budget / period`.
    #[inline]
    pub fn utilization(&self) -> f64 {
        self.wcet_budget.as_secs_f64() / self.period.as_secs_f64()
    }
}

// ---------------------------------------------------------------------------
// Run statistics (mutable, updated after every run)
// ---------------------------------------------------------------------------

/// Cumulative statistics for one task. Only the executive writes these,
/// and only after the body has returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Completed executions, faulted ones included.
    pub runs: u32,

    /// Largest `|dispatch instant - scheduled release|` seen so far.
    pub worst_jitter: Duration,

    /// Largest measured body execution time seen so far.
    pub worst_exec: Duration,

    /// Runs whose execution time exceeded the WCET budget.
    pub overruns: u32,

    /// Runs whose body returned a [`TaskFault`].
    pub faults: u32,

    /// Release instants dropped by catch-up after the task fell behind.
    pub skipped_releases: u32,

    /// Sum of all measured execution times.
    pub total_exec: Duration,
}

impl RunStats {
    pub const fn new() -> Self {
        Self {
            runs: 0,
            worst_jitter: Duration::ZERO,
            worst_exec: Duration::ZERO,
            overruns: 0,
            faults: 0,
            skipped_releases: 0,
            total_exec: Duration::ZERO,
        }
    }

    /// Fold one run into the statistics. Returns `true` if it overran
    /// `budget`.
    pub fn record(&mut self, jitter: Duration, exec: Duration, budget: Duration, faulted: bool) -> bool {
        self.worst_jitter = self.worst_jitter.max(jitter);
        self.worst_exec = self.worst_exec.max(exec);
        self.total_exec += exec;

        let overran = exec > budget;
        if overran {
            self.overruns += 1;
        }
        if faulted {
            self.faults += 1;
        }
        self.runs += 1;
        overran
    }

    /// Average execution time, or zero before the first run.
    pub fn mean_exec(&self) -> Duration {
        if self.runs == 0 {
            Duration::ZERO
        } else {
            self.total_exec / self.runs
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One entry of the task table.
pub struct Task {
    name: String,
    config: TaskConfig,
    body: Box<dyn Runnable>,

    /// Instant at which the task next becomes due.
    pub(crate) next_release: Instant,

    pub(crate) stats: RunStats,
}

impl Task {
    /// Create a task. Its first release is set when the table is armed.
    ///
    /// # Errors
    /// [`ExecutiveError::ZeroPeriod`] if `config.period` is zero.
    pub fn new(
        name: impl Into<String>,
        config: TaskConfig,
        body: impl Runnable + 'static,
    ) -> Result<Self, ExecutiveError> {
        let name = name.into();
        if config.period.is_zero() {
            return Err(ExecutiveError::ZeroPeriod { task: name });
        }
        Ok(Self {
            name,
            config,
            body: Box::new(body),
            next_release: Instant::EPOCH,
            stats: RunStats::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    #[inline]
    pub fn next_release(&self) -> Instant {
        self.next_release
    }

    /// Set the first release relative to executive start.
    pub(crate) fn arm(&mut self, start: Instant) {
        self.next_release = start + self.config.phase;
    }

    /// Due once `now` has reached the scheduled release.
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_release
    }

    /// Run the body once.
    pub(crate) fn run_body(&mut self) -> Result<(), TaskFault> {
        self.body.run()
    }

    /// Move the release forward one period, then skip whole periods until
    /// it is no longer behind `now`. Skipped releases are dropped, not
    /// queued. Returns how many were dropped.
    pub(crate) fn advance_release(&mut self, now: Instant) -> u32 {
        let period = self.config.period;
        self.next_release += period;

        let mut skipped = 0;
        while self.next_release < now {
            self.next_release += period;
            skipped += 1;
        }
        self.stats.skipped_releases += skipped;
        skipped
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("next_release", &self.next_release)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn at(n: u64) -> Instant {
        Instant::from_epoch(ms(n))
    }

    fn make_task(period: u64, phase: u64) -> Task {
        Task::new(
            "t",
            TaskConfig::new(ms(period), ms(2)).with_phase(ms(phase)),
            infallible(|| {}),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = Task::new("bad", TaskConfig::new(Duration::ZERO, ms(1)), infallible(|| {}))
            .unwrap_err();
        assert_eq!(err, ExecutiveError::ZeroPeriod { task: "bad".into() });
    }

    #[test]
    fn test_arm_applies_phase() {
        let mut task = make_task(10, 3);
        task.arm(at(100));
        assert_eq!(task.next_release(), at(103));
        assert!(!task.is_due(at(102)));
        assert!(task.is_due(at(103)));
    }

    #[test]
    fn test_advance_on_time() {
        let mut task = make_task(10, 0);
        task.arm(at(0));
        assert_eq!(task.advance_release(at(0)), 0);
        assert_eq!(task.next_release(), at(10));
    }

    #[test]
    fn test_advance_drops_missed_releases() {
        let mut task = make_task(10, 0);
        task.arm(at(0));
        // Dispatched 35 ms late: releases at 10, 20 and 30 are behind
        let skipped = task.advance_release(at(35));
        assert_eq!(skipped, 3);
        assert_eq!(task.next_release(), at(40));
        assert_eq!(task.stats().skipped_releases, 3);
    }

    #[test]
    fn test_advance_lands_exactly_on_now() {
        let mut task = make_task(10, 0);
        task.arm(at(0));
        // A release equal to `now` is not behind
        assert_eq!(task.advance_release(at(20)), 1);
        assert_eq!(task.next_release(), at(20));
    }

    #[test]
    fn test_stats_record() {
        let mut stats = RunStats::new();
        assert!(!stats.record(ms(1), ms(2), ms(2), false));
        assert!(stats.record(Duration::ZERO, ms(3), ms(2), true));
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.worst_jitter, ms(1));
        assert_eq!(stats.worst_exec, ms(3));
        assert_eq!(stats.mean_exec(), Duration::from_micros(2500));
    }

    #[test]
    fn test_mean_exec_before_first_run() {
        assert_eq!(RunStats::new().mean_exec(), Duration::ZERO);
    }

    #[test]
    fn test_fallible_body() {
        let mut task = Task::new(
            "faulty",
            TaskConfig::new(ms(10), ms(1)),
            || -> Result<(), TaskFault> { Err(TaskFault::new("sensor offline")) },
        )
        .unwrap();
        assert_eq!(task.run_body(), Err(TaskFault::new("sensor offline")));
    }

    #[test]
    fn test_utilization() {
        let config = TaskConfig::new(ms(20), ms(5));
        assert!((config.utilization() - 0.25).abs() < 1e-9);
    }
}
