//! # Task Table
//!
//! The ordered set of tasks the executive dispatches. Order is priority:
//! when several tasks are due in the same frame, the one declared first
//! runs first.
//!
//! The table is built before the run, owned exclusively by the executive
//! while it runs, and handed back read-only afterwards.

use alloc::vec::Vec;
use core::ops::Index;
use core::time::Duration;

use crate::task::Task;
use crate::time::Instant;

/// Ordered collection of [`Task`]s, indexed by declaration position.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: Vec<Task>,
}

impl TaskTable {
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append a task. Returns its index, which is also its dispatch rank.
    pub fn push(&mut self, task: Task) -> usize {
        let id = self.tasks.len();
        self.tasks.push(task);
        id
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, task: Task) -> Self {
        self.push(task);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// First task with the given name.
    pub fn find(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> core::slice::IterMut<'_, Task> {
        self.tasks.iter_mut()
    }

    /// Set every task's first release to `start + phase`.
    pub(crate) fn arm(&mut self, start: Instant) {
        for task in self.tasks.iter_mut() {
            task.arm(start);
        }
    }

    /// Least common multiple of all periods: the span after which the
    /// release pattern repeats. `None` for an empty table, or when the LCM
    /// does not fit in a `Duration` of `u64` nanoseconds.
    pub fn hyperperiod(&self) -> Option<Duration> {
        let mut periods = self.tasks.iter().map(|t| t.config().period.as_nanos());
        let first = periods.next()?;
        let lcm = periods.try_fold(first, |acc, p| (acc / gcd(acc, p)).checked_mul(p))?;
        u64::try_from(lcm).ok().map(Duration::from_nanos)
    }

    /// Total CPU demand, `Σ wcet_budget / period`. Above 1.0 the table
    /// cannot meet every budget on one core.
    pub fn utilization(&self) -> f64 {
        self.tasks.iter().map(|t| t.config().utilization()).sum()
    }
}

impl Index<usize> for TaskTable {
    type Output = Task;

    fn index(&self, id: usize) -> &Task {
        &self.tasks[id]
    }
}

impl FromIterator<Task> for TaskTable {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TaskTable {
    type Item = &'a Task;
    type IntoIter = core::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{infallible, TaskConfig};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn task(name: &str, period: u64, budget: u64) -> Task {
        Task::new(name, TaskConfig::new(ms(period), ms(budget)), infallible(|| {})).unwrap()
    }

    fn lab_table() -> TaskTable {
        TaskTable::new()
            .with(task("SensorRead", 10, 2))
            .with(task("Control", 20, 3))
            .with(task("CommTx", 50, 5))
    }

    #[test]
    fn test_push_returns_dispatch_rank() {
        let mut table = TaskTable::new();
        assert_eq!(table.push(task("a", 10, 1)), 0);
        assert_eq!(table.push(task("b", 10, 1)), 1);
        assert_eq!(table[1].name(), "b");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_find_by_name() {
        let table = lab_table();
        assert_eq!(table.find("Control").map(|t| t.config().period), Some(ms(20)));
        assert!(table.find("missing").is_none());
    }

    #[test]
    fn test_hyperperiod() {
        assert_eq!(lab_table().hyperperiod(), Some(ms(100)));
        assert_eq!(TaskTable::new().hyperperiod(), None);

        let odd = TaskTable::new().with(task("a", 15, 1)).with(task("b", 20, 1));
        assert_eq!(odd.hyperperiod(), Some(ms(60)));
    }

    fn ns_task(ns: u64) -> Task {
        Task::new("p", TaskConfig::new(Duration::from_nanos(ns), ms(1)), infallible(|| {})).unwrap()
    }

    #[test]
    fn test_hyperperiod_overflow_is_none() {
        // Pairwise coprime periods near one second: the LCM exceeds u128
        let huge: TaskTable = [1_000_000_007, 1_000_000_009, 1_000_000_021, 1_000_000_033, 1_000_000_087]
            .into_iter()
            .map(ns_task)
            .collect();
        assert_eq!(huge.hyperperiod(), None);

        // Fits in u128 but not in u64 nanoseconds
        let wide: TaskTable = [1_000_000_007, 1_000_000_009, 1_000_000_021]
            .into_iter()
            .map(ns_task)
            .collect();
        assert_eq!(wide.hyperperiod(), None);
    }

    #[test]
    fn test_utilization() {
        // 2/10 + 3/20 + 5/50 = 0.45
        assert!((lab_table().utilization() - 0.45).abs() < 1e-9);
        assert_eq!(TaskTable::new().utilization(), 0.0);
    }

    #[test]
    fn test_arm_sets_first_release() {
        let mut table = TaskTable::new().with(
            Task::new("late", TaskConfig::new(ms(10), ms(1)).with_phase(ms(4)), infallible(|| {}))
                .unwrap(),
        );
        table.arm(Instant::from_epoch(ms(50)));
        assert_eq!(table[0].next_release(), Instant::from_epoch(ms(54)));
    }

    #[test]
    fn test_collect_preserves_order() {
        let table: TaskTable = ["x", "y", "z"].iter().map(|n| task(n, 10, 1)).collect();
        let names: Vec<&str> = table.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["x", "y", "z"]);
    }
}
