//! # Cyclex Configuration
//!
//! Default timing constants and the validated [`ExecutiveConfig`] value the
//! executive is constructed from. Configuration is fixed at construction:
//! nothing here changes while the loop is running.

use core::time::Duration;

use crate::error::ExecutiveError;

/// Default minor cycle (frame length) in milliseconds.
pub const MINOR_CYCLE_MS: u64 = 10;

/// Default major cycle in milliseconds. Must be a whole number of minor
/// cycles.
pub const MAJOR_CYCLE_MS: u64 = 100;

/// Default number of major cycles to run before terminating.
pub const MAJOR_CYCLE_COUNT: u32 = 5;

/// Default wake-up slack, in milliseconds, tolerated past a frame boundary
/// before a frame overrun is reported.
pub const SLIP_TOLERANCE_MS: u64 = 1;

/// SysTick frequency in Hz for the Cortex-M4 clock port. One tick is the
/// resolution of every instant that clock reports.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Startup configuration of the executive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutiveConfig {
    /// Length of one scheduling frame.
    pub minor_cycle: Duration,

    /// Length of one major cycle. The frame index wraps after
    /// `major_cycle / minor_cycle` frames.
    pub major_cycle: Duration,

    /// Number of major cycles to run. The executive terminates once
    /// `start + major_cycle * major_cycle_count` has passed.
    pub major_cycle_count: u32,

    /// Allowed lateness of a frame wake-up before it counts as an overrun.
    pub slip_tolerance: Duration,
}

impl Default for ExecutiveConfig {
    fn default() -> Self {
        Self {
            minor_cycle: Duration::from_millis(MINOR_CYCLE_MS),
            major_cycle: Duration::from_millis(MAJOR_CYCLE_MS),
            major_cycle_count: MAJOR_CYCLE_COUNT,
            slip_tolerance: Duration::from_millis(SLIP_TOLERANCE_MS),
        }
    }
}

impl ExecutiveConfig {
    /// Build and validate a configuration in one step.
    pub fn new(
        minor_cycle: Duration,
        major_cycle: Duration,
        major_cycle_count: u32,
        slip_tolerance: Duration,
    ) -> Result<Self, ExecutiveError> {
        let config = Self {
            minor_cycle,
            major_cycle,
            major_cycle_count,
            slip_tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_minor_cycle(mut self, minor_cycle: Duration) -> Self {
        self.minor_cycle = minor_cycle;
        self
    }

    pub fn with_major_cycle(mut self, major_cycle: Duration) -> Self {
        self.major_cycle = major_cycle;
        self
    }

    pub fn with_major_cycle_count(mut self, count: u32) -> Self {
        self.major_cycle_count = count;
        self
    }

    pub fn with_slip_tolerance(mut self, slip_tolerance: Duration) -> Self {
        self.slip_tolerance = slip_tolerance;
        self
    }

    /// Check the frame geometry.
    ///
    /// # Errors
    /// - [`ExecutiveError::ZeroMinorCycle`] / [`ExecutiveError::ZeroMajorCycle`]
    /// - [`ExecutiveError::MajorNotMultipleOfMinor`] when the major cycle is
    ///   not a whole number of frames
    /// - [`ExecutiveError::TooManyFrames`] when a major cycle holds more than
    ///   `u32::MAX` frames
    /// - [`ExecutiveError::ZeroMajorCycleCount`]
    pub fn validate(&self) -> Result<(), ExecutiveError> {
        if self.minor_cycle.is_zero() {
            return Err(ExecutiveError::ZeroMinorCycle);
        }
        if self.major_cycle.is_zero() {
            return Err(ExecutiveError::ZeroMajorCycle);
        }
        if self.major_cycle.as_nanos() % self.minor_cycle.as_nanos() != 0 {
            return Err(ExecutiveError::MajorNotMultipleOfMinor {
                major: self.major_cycle,
                minor: self.minor_cycle,
            });
        }
        if self.major_cycle.as_nanos() / self.minor_cycle.as_nanos() > u128::from(u32::MAX) {
            return Err(ExecutiveError::TooManyFrames {
                major: self.major_cycle,
                minor: self.minor_cycle,
            });
        }
        if self.major_cycle_count == 0 {
            return Err(ExecutiveError::ZeroMajorCycleCount);
        }
        Ok(())
    }

    /// Number of minor frames in one major cycle. Only meaningful on a
    /// validated configuration; saturates otherwise.
    #[inline]
    pub fn frames_per_major(&self) -> u32 {
        let frames = self.major_cycle.as_nanos() / self.minor_cycle.as_nanos().max(1);
        u32::try_from(frames).unwrap_or(u32::MAX)
    }

    /// Total run length: `major_cycle * major_cycle_count`.
    #[inline]
    pub fn run_length(&self) -> Duration {
        self.major_cycle * self.major_cycle_count
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExecutiveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frames_per_major(), 10);
        assert_eq!(config.run_length(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_minor_cycle_rejected() {
        let config = ExecutiveConfig::default().with_minor_cycle(Duration::ZERO);
        assert_eq!(config.validate(), Err(ExecutiveError::ZeroMinorCycle));
    }

    #[test]
    fn test_zero_major_cycle_rejected() {
        let config = ExecutiveConfig::default().with_major_cycle(Duration::ZERO);
        assert_eq!(config.validate(), Err(ExecutiveError::ZeroMajorCycle));
    }

    #[test]
    fn test_major_must_be_whole_frames() {
        let err = ExecutiveConfig::new(
            Duration::from_millis(30),
            Duration::from_millis(100),
            1,
            Duration::from_millis(1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExecutiveError::MajorNotMultipleOfMinor {
                major: Duration::from_millis(100),
                minor: Duration::from_millis(30),
            }
        );
    }

    #[test]
    fn test_frame_count_must_fit_u32() {
        let major = Duration::from_nanos(1 << 32);
        let err = ExecutiveConfig::new(Duration::from_nanos(1), major, 1, Duration::from_millis(1))
            .unwrap_err();
        assert_eq!(
            err,
            ExecutiveError::TooManyFrames {
                major,
                minor: Duration::from_nanos(1),
            }
        );

        // One frame fewer is the largest accepted geometry
        let config = ExecutiveConfig::new(
            Duration::from_nanos(1),
            Duration::from_nanos(u64::from(u32::MAX)),
            1,
            Duration::from_millis(1),
        )
        .unwrap();
        assert_eq!(config.frames_per_major(), u32::MAX);
    }

    #[test]
    fn test_zero_major_count_rejected() {
        let config = ExecutiveConfig::default().with_major_cycle_count(0);
        assert_eq!(config.validate(), Err(ExecutiveError::ZeroMajorCycleCount));
    }
}
