use super::Instance;
use crate::error::SolutionError;
use rand::Rng;

/// Start times of all tasks of an instance, one per task and non-negative.
/// Starts and durations both fit in `i64`, so finish times fit in `u64`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule<'a> {
    instance: &'a Instance,
    starts: Vec<u64>,
}

impl<'a> Schedule<'a> {
    /// Checks the given start times against the instance.
    ///
    /// # Errors
    /// - If the number of start times differs from the number of tasks.
    /// - If a start time is negative.
    pub fn new(instance: &'a Instance, starts: &[i64]) -> Result<Self, SolutionError> {
        if starts.len() != instance.tasks_len() {
            return Err(SolutionError::Length {
                expected: instance.tasks_len(),
                found: starts.len(),
            });
        }

        let starts = starts
            .iter()
            .enumerate()
            .map(|(task, &start)| {
                u64::try_from(start).map_err(|_| SolutionError::NegativeStart { task, start })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { instance, starts })
    }

    /// Returns the instance the schedule belongs to.
    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Returns the start times in task order.
    #[must_use]
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    /// Returns the start time of a task.
    #[must_use]
    pub fn start(&self, task: usize) -> u64 {
        self.starts[task]
    }

    /// Returns the finish time of a task.
    #[must_use]
    pub fn finish(&self, task: usize) -> u64 {
        self.starts[task] + self.instance.tasks()[task].duration
    }

    /// Returns `(task, start, finish)` for every task.
    pub fn intervals(&self) -> impl Iterator<Item = (usize, u64, u64)> + '_ {
        (0..self.starts.len()).map(|task| (task, self.start(task), self.finish(task)))
    }

    /// Completion time of the last task, 0 when there are no tasks.
    #[must_use]
    pub fn makespan(&self) -> u64 {
        self.intervals()
            .map(|(_, _, finish)| finish)
            .max()
            .unwrap_or_default()
    }
}

/// Draws a start time for every task uniformly from `0..=horizon`.
/// The result is a candidate, it is usually infeasible.
pub fn random_solution(instance: &Instance, rng: &mut impl Rng) -> Vec<i64> {
    let horizon = i64::try_from(instance.horizon()).unwrap_or(i64::MAX);
    (0..instance.tasks_len())
        .map(|_| rng.gen_range(0..=horizon))
        .collect()
}
