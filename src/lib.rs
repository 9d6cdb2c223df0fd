//! # Cyclex: Cyclic Executive
//!
//! A time-triggered cyclic executive: a single-threaded scheduler that
//! releases a fixed table of periodic tasks at pre-computed instants and
//! accounts for how well the schedule held.
//!
//! ## Overview
//!
//! Time is cut into fixed **minor cycles** (frames). At the top of each
//! frame the executive runs every task whose release has arrived, then
//! sleeps until the next frame boundary. For every task it tracks:
//!
//! - **Release jitter**: how late the dispatch was versus the schedule
//! - **Execution time**: how long the body actually ran
//! - **WCET overruns**: runs that exceeded the task's budget
//! - **Dropped releases**: periods skipped after the task fell behind
//!
//! Frames that wake later than the slip tolerance are reported as frame
//! overruns. Nothing is ever fatal once the run has started.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │          Application / demo binary (main.rs)           │
//! ├────────────────────────────────────────────────────────┤
//! │   Executive Loop (scheduler.rs)  │  Reporter (report.rs)│
//! │   ─ start() · tick() · run()     │  ─ Report · Summary  │
//! │   ─ dispatch_due()               │                      │
//! ├──────────────────────────────────┴──────────────────────┤
//! │   Task Table (table.rs)  ·  Task / RunStats (task.rs)   │
//! ├────────────────────────────────────────────────────────┤
//! │   Clock trait (time.rs)                                 │
//! │   StdClock · VirtualClock · arch::cortex_m4::SysTickClock│
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use core::time::Duration;
//! use cyclex::{infallible, Executive, ExecutiveConfig, Task, TaskConfig, TaskTable, VirtualClock};
//!
//! let clock = VirtualClock::new();
//! let work = clock.clone();
//! let table = TaskTable::new().with(
//!     Task::new(
//!         "SensorRead",
//!         TaskConfig::new(Duration::from_millis(10), Duration::from_millis(2)),
//!         infallible(move || work.advance(Duration::from_micros(1500))),
//!     )
//!     .unwrap(),
//! );
//!
//! let summary = Executive::start(ExecutiveConfig::default(), table, clock)
//!     .unwrap()
//!     .run();
//! assert_eq!(summary.table[0].stats().runs, 50);
//! ```
//!
//! ## Features
//!
//! - `std` (default): [`StdClock`], the [`work`] spin helper, the [`logging`]
//!   subscriber setup and the `cyclex` demo binary
//! - `cortex-m4`: `arch::cortex_m4::SysTickClock` for bare-metal targets
//!   (build with `--no-default-features`; an allocator must be provided)

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod table;
pub mod task;
pub mod time;

#[cfg(feature = "std")]
pub mod logging;
#[cfg(feature = "std")]
pub mod work;

#[cfg(feature = "cortex-m4")]
pub mod arch;
#[cfg(feature = "cortex-m4")]
pub mod sync;

pub use config::ExecutiveConfig;
pub use error::{ExecutiveError, TaskFault};
pub use report::{Report, TaskSummary};
pub use scheduler::{Executive, ExecutiveState, FrameStats, RunSummary};
pub use table::TaskTable;
pub use task::{infallible, Runnable, RunStats, Task, TaskConfig};
pub use time::{Clock, Instant, VirtualClock};

#[cfg(feature = "std")]
pub use time::StdClock;
