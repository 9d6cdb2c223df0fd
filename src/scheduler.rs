//! # Executive Loop
//!
//! The scheduling engine. Time is divided into fixed minor-cycle frames;
//! at the top of each frame every due task is run to completion, in table
//! order, and the loop then sleeps until the next frame boundary.
//!
//! ## Frame Algorithm
//!
//! On each tick:
//! 1. **Sample**: `now = clock.now()`
//! 2. **Dispatch**: for each task with `now >= next_release`:
//!    a. jitter = `|now - next_release|`, fold into `worst_jitter`
//!    b. run the body, measuring execution time with the same clock
//!    c. fold into `worst_exec`; count an overrun if over budget
//!    d. count the run (and the fault, if the body reported one)
//!    e. advance `next_release` by one period, then drop whole periods
//!       until it is no longer behind `now`
//! 3. **Pace**: `frame_anchor += minor_cycle`, `sleep_until(frame_anchor)`
//! 4. **Check slip**: a wake-up later than `frame_anchor + slip_tolerance`
//!    is logged and counted; scheduling state is untouched
//!
//! The frame anchor is a running sum, never re-derived from `now`, so
//! frames do not drift no matter how many of them run. After an overloaded
//! frame the anchor lags real time and the following frames run
//! back-to-back until it catches up.
//!
//! ```text
//!   ┌─────────┐   now >= end_time   ┌────────────┐
//!   │ Running │ ──────────────────► │ Terminated │
//!   └─────────┘                     └────────────┘
//!     ▲     │
//!     └─────┘ tick()
//! ```

use core::time::Duration;

use crate::config::ExecutiveConfig;
use crate::error::ExecutiveError;
use crate::table::TaskTable;
use crate::time::{Clock, Instant};

// ---------------------------------------------------------------------------
// Executive state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutiveState {
    /// Frames are still being dispatched.
    Running,
    /// `end_time` has passed. No further task will run.
    Terminated,
}

/// Frame-level pacing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames paced so far.
    pub frames: u64,

    /// Completed major cycles (the frame index wrapped to zero).
    pub major_cycles: u32,

    /// Wake-ups later than `frame_anchor + slip_tolerance`.
    pub overruns: u32,

    /// Largest wake-up lateness observed among the overruns.
    pub worst_slip: Duration,
}

/// Everything left once the executive terminates: the final table and
/// the frame statistics, ready for the reporter.
#[derive(Debug)]
pub struct RunSummary {
    pub config: ExecutiveConfig,
    pub table: TaskTable,
    pub frames: FrameStats,
    /// Time from start until the loop exited.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Executive
// ---------------------------------------------------------------------------

/// Cyclic executive over a task table and an injected clock.
pub struct Executive<C: Clock> {
    config: ExecutiveConfig,
    table: TaskTable,
    clock: C,

    start: Instant,
    end_time: Instant,

    /// Boundary of the frame currently being slept towards.
    frame_anchor: Instant,

    /// Position inside the major cycle, `0..frames_per_major`.
    frame_index: u32,

    frames: FrameStats,
    state: ExecutiveState,
}

impl<C: Clock> Executive<C> {
    /// Validate the configuration, arm the table and start the schedule.
    ///
    /// Executive start is the clock's `now()` at this call: every task's
    /// first release is `start + phase`, and the run ends at
    /// `start + major_cycle * major_cycle_count`.
    ///
    /// # Errors
    /// Any [`ExecutiveConfig::validate`] error, or
    /// [`ExecutiveError::EmptyTable`].
    pub fn start(
        config: ExecutiveConfig,
        mut table: TaskTable,
        clock: C,
    ) -> Result<Self, ExecutiveError> {
        config.validate()?;
        if table.is_empty() {
            return Err(ExecutiveError::EmptyTable);
        }

        check_feasibility(&config, &table);

        let start = clock.now();
        table.arm(start);

        tracing::info!(
            tasks = table.len(),
            minor_ms = config.minor_cycle.as_millis() as u64,
            major_ms = config.major_cycle.as_millis() as u64,
            major_cycles = config.major_cycle_count,
            "cyclic executive started"
        );

        Ok(Self {
            config,
            table,
            clock,
            start,
            end_time: start + config.run_length(),
            frame_anchor: start,
            frame_index: 0,
            frames: FrameStats::default(),
            state: ExecutiveState::Running,
        })
    }

    /// Run frames until `end_time`, then hand back the final state.
    pub fn run(mut self) -> RunSummary {
        while self.tick() == ExecutiveState::Running {}
        self.into_summary()
    }

    /// Execute one frame: dispatch due tasks, then pace to the next
    /// boundary. A no-op once terminated.
    pub fn tick(&mut self) -> ExecutiveState {
        if self.state == ExecutiveState::Terminated {
            return self.state;
        }

        let now = self.clock.now();
        if now >= self.end_time {
            self.terminate();
            return self.state;
        }

        self.dispatch_due(now);
        self.pace_frame();

        if self.clock.now() >= self.end_time {
            self.terminate();
        }
        self.state
    }

    /// Run every task due at `now`, in table order. Returns how many ran.
    ///
    /// Jitter is measured against the same `now` for every task in the
    /// frame, so a task late in the table does not absorb the execution
    /// time of the ones before it.
    pub fn dispatch_due(&mut self, now: Instant) -> usize {
        let mut dispatched = 0;

        for task in self.table.iter_mut() {
            if !task.is_due(now) {
                continue;
            }

            let jitter = now.abs_diff(task.next_release);

            let exec_start = self.clock.now();
            let outcome = task.run_body();
            let exec = self.clock.now() - exec_start;

            let budget = task.config().wcet_budget;
            let overran = task.stats.record(jitter, exec, budget, outcome.is_err());

            if let Err(fault) = outcome {
                tracing::warn!(task = task.name(), %fault, "task body failed");
            }
            if overran {
                tracing::debug!(
                    task = task.name(),
                    exec_us = exec.as_micros() as u64,
                    budget_us = budget.as_micros() as u64,
                    "WCET overrun"
                );
            }

            let skipped = task.advance_release(now);
            if skipped > 0 {
                tracing::debug!(task = task.name(), skipped, "dropped missed releases");
            }

            tracing::trace!(
                task = task.name(),
                jitter_us = jitter.as_micros() as u64,
                exec_us = exec.as_micros() as u64,
                "dispatched"
            );
            dispatched += 1;
        }

        dispatched
    }

    /// Advance the frame anchor by one minor cycle and sleep until it.
    fn pace_frame(&mut self) {
        self.frame_anchor += self.config.minor_cycle;
        self.frame_index = (self.frame_index + 1) % self.config.frames_per_major();
        if self.frame_index == 0 {
            self.frames.major_cycles += 1;
            tracing::debug!(major = self.frames.major_cycles, "major cycle complete");
        }

        self.clock.sleep_until(self.frame_anchor);
        self.frames.frames += 1;

        let woke = self.clock.now();
        if woke > self.frame_anchor + self.config.slip_tolerance {
            let slip = woke - self.frame_anchor;
            self.frames.overruns += 1;
            self.frames.worst_slip = self.frames.worst_slip.max(slip);
            tracing::warn!("Frame overrun: slipped by {} us", slip.as_micros());
        }
    }

    fn terminate(&mut self) {
        self.state = ExecutiveState::Terminated;
        tracing::info!(
            frames = self.frames.frames,
            frame_overruns = self.frames.overruns,
            "cyclic executive terminated"
        );
    }

    /// Consume the executive, releasing the table for reporting.
    pub fn into_summary(self) -> RunSummary {
        let elapsed = self.clock.now() - self.start;
        RunSummary {
            config: self.config,
            table: self.table,
            frames: self.frames,
            elapsed,
        }
    }

    #[inline]
    pub fn state(&self) -> ExecutiveState {
        self.state
    }

    #[inline]
    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    #[inline]
    pub fn frame_stats(&self) -> &FrameStats {
        &self.frames
    }

    #[inline]
    pub fn frame_anchor(&self) -> Instant {
        self.frame_anchor
    }

    #[inline]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start
    }

    #[inline]
    pub fn end_time(&self) -> Instant {
        self.end_time
    }
}

/// Log the table's hyperperiod and utilization and warn about
/// configurations that cannot hold their schedule. Advisory only.
fn check_feasibility(config: &ExecutiveConfig, table: &TaskTable) {
    let utilization = table.utilization();
    tracing::debug!(utilization, "task table loaded");

    if utilization > 1.0 {
        tracing::warn!(utilization, "WCET budgets exceed the CPU; overruns are certain");
    }

    match table.hyperperiod() {
        Some(hyperperiod) if config.major_cycle.as_nanos() % hyperperiod.as_nanos() != 0 => {
            tracing::warn!(
                major_us = config.major_cycle.as_micros() as u64,
                hyperperiod_us = hyperperiod.as_micros() as u64,
                "major cycle is not a multiple of the task hyperperiod"
            );
        }
        Some(_) => {}
        None => tracing::debug!("task hyperperiod does not fit in a Duration; skipping check"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
