//! # Statistics Reporter
//!
//! Renders the final state of a run. Reads the [`RunSummary`] and nothing
//! else; it never mutates it.
//!
//! ```text
//! === Report (5 majors of 100 ms) ===
//! Task SensorRead runs=50   worst_jitter=    12 us worst_exec=  1503 us overruns=0
//! Task Control    runs=25   worst_jitter=  1520 us worst_exec=  2204 us overruns=0
//! Frames: 50 paced, 0 overruns, worst slip 0 us
//! ```

use core::fmt;
use core::time::Duration;

use crate::scheduler::RunSummary;
use crate::task::Task;

/// Snapshot of one task's final statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary<'a> {
    pub name: &'a str,
    pub runs: u32,
    pub worst_jitter: Duration,
    pub worst_exec: Duration,
    pub mean_exec: Duration,
    pub overruns: u32,
    pub faults: u32,
    pub skipped_releases: u32,
}

impl<'a> From<&'a Task> for TaskSummary<'a> {
    fn from(task: &'a Task) -> Self {
        let stats = task.stats();
        Self {
            name: task.name(),
            runs: stats.runs,
            worst_jitter: stats.worst_jitter,
            worst_exec: stats.worst_exec,
            mean_exec: stats.mean_exec(),
            overruns: stats.overruns,
            faults: stats.faults,
            skipped_releases: stats.skipped_releases,
        }
    }
}

impl fmt::Display for TaskSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {:<10} runs={:<4} worst_jitter={:>6} us worst_exec={:>6} us overruns={}",
            self.name,
            self.runs,
            self.worst_jitter.as_micros(),
            self.worst_exec.as_micros(),
            self.overruns,
        )?;
        if self.faults > 0 {
            write!(f, " faults={}", self.faults)?;
        }
        if self.skipped_releases > 0 {
            write!(f, " skipped={}", self.skipped_releases)?;
        }
        Ok(())
    }
}

/// Printable report over a finished run.
pub struct Report<'a> {
    summary: &'a RunSummary,
}

impl<'a> Report<'a> {
    pub fn new(summary: &'a RunSummary) -> Self {
        Self { summary }
    }

    /// Per-task snapshots in table order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskSummary<'a>> + 'a {
        let summary: &'a RunSummary = self.summary;
        summary.table.iter().map(TaskSummary::from)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.summary.config;
        writeln!(
            f,
            "=== Report ({} majors of {} ms) ===",
            config.major_cycle_count,
            config.major_cycle.as_millis()
        )?;
        for task in self.tasks() {
            writeln!(f, "{task}")?;
        }
        let frames = &self.summary.frames;
        write!(
            f,
            "Frames: {} paced, {} overruns, worst slip {} us",
            frames.frames,
            frames.overruns,
            frames.worst_slip.as_micros()
        )
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
