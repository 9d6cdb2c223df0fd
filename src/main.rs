//! # Cyclex Demo
//!
//! Runs the classic three-task control table on the host for five major
//! cycles and prints the timing report.
//!
//! | Task | Period | WCET budget | Simulated work |
//! |------|--------|-------------|----------------|
//! | `SensorRead` | 10 ms | 2 ms | 1.5 ms |
//! | `Control` | 20 ms | 3 ms | 2.2 ms |
//! | `CommTx` | 50 ms | 5 ms | 3.5 ms |
//!
//! Every task fits its budget, so a quiet machine should report zero
//! overruns. Frame-overrun warnings go to stderr as
//! `[WARN] Frame overrun: slipped by <n> us`; raise verbosity with
//! `RUST_LOG=cyclex=debug`.

use std::time::Duration;

use cyclex::logging;
use cyclex::work::spin_for;
use cyclex::{infallible, Executive, ExecutiveConfig, Report, StdClock, Task, TaskConfig, TaskTable};

/// A task whose body burns `work` of CPU time.
fn spinning_task(name: &str, period_ms: u64, budget_us: u64, work_us: u64) -> anyhow::Result<Task> {
    let work = Duration::from_micros(work_us);
    let task = Task::new(
        name,
        TaskConfig::new(Duration::from_millis(period_ms), Duration::from_micros(budget_us)),
        infallible(move || spin_for(work)),
    )?;
    Ok(task)
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ExecutiveConfig::default();

    let table = TaskTable::new()
        .with(spinning_task("SensorRead", 10, 2000, 1500)?)
        .with(spinning_task("Control", 20, 3000, 2200)?)
        .with(spinning_task("CommTx", 50, 5000, 3500)?);

    println!(
        "Cyclic Executive: minor={} ms, major={} ms",
        config.minor_cycle.as_millis(),
        config.major_cycle.as_millis()
    );

    let summary = Executive::start(config, table, StdClock::new())?.run();

    println!();
    println!("{}", Report::new(&summary));
    println!("Done.");
    Ok(())
}
