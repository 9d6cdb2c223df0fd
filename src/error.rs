//! # Errors
//!
//! Construction-time failures. Once the executive is running nothing is
//! fatal: jitter, WCET overruns, frame slips and task faults are all recorded
//! as statistics instead.

use alloc::string::String;
use core::time::Duration;

/// Rejected task table or executive configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutiveError {
    #[error("task `{task}` has a zero period")]
    ZeroPeriod { task: String },

    #[error("minor cycle must be non-zero")]
    ZeroMinorCycle,

    #[error("major cycle must be non-zero")]
    ZeroMajorCycle,

    #[error("major cycle {major:?} is not a whole number of {minor:?} minor cycles")]
    MajorNotMultipleOfMinor { major: Duration, minor: Duration },

    #[error("major cycle {major:?} holds more than u32::MAX frames of {minor:?}")]
    TooManyFrames { major: Duration, minor: Duration },

    #[error("major cycle count must be at least 1")]
    ZeroMajorCycleCount,

    #[error("task table is empty")]
    EmptyTable,
}

/// Failure reported by a task body. Recorded in the task's statistics; it
/// never stops the executive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task fault: {reason}")]
pub struct TaskFault {
    reason: &'static str,
}

impl TaskFault {
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}
