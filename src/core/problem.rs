use crate::error::InstanceError;
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A validated task. Contains the duration, the requirement of every resource and
/// the indices of the tasks that must wait for it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Task {
    pub duration: u64,
    pub requirements: Vec<u64>,
    pub successors: Vec<usize>,
}

/// A renewable resource described by its index and constant capacity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Resource {
    pub id: usize,
    pub capacity: u64,
}

/// Unvalidated task as it comes out of a parser.
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct TaskData {
    pub duration: i64,
    pub requirements: Vec<i64>,
    pub successors: Vec<usize>,
}

/// Unvalidated instance as it comes out of a parser.
/// Converted into an [`Instance`] with [`Instance::new`].
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct InstanceData {
    pub capacities: Vec<i64>,
    pub tasks: Vec<TaskData>,
}

/// An instance of the resource-constrained project scheduling problem.
/// Immutable after construction, so it can be shared between threads by reference.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct Instance {
    capacities: Vec<u64>,
    tasks: Vec<Task>,
    predecessors: Vec<Vec<usize>>,
    order: Vec<usize>,
    horizon: u64,
}

impl Instance {
    /// Validates the given data and builds an instance.
    ///
    /// # Errors
    /// - If a capacity, duration or requirement is negative.
    /// - If a requirement vector does not have one entry per resource.
    /// - If a successor is unknown, repeated or the task itself.
    /// - If the precedence graph has a cycle.
    pub fn new(data: InstanceData) -> Result<Self, InstanceError> {
        let capacities = data
            .capacities
            .iter()
            .enumerate()
            .map(|(resource, &capacity)| {
                u64::try_from(capacity)
                    .map_err(|_| InstanceError::NegativeCapacity { resource, capacity })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = data.tasks.len();
        let mut tasks = Vec::with_capacity(count);
        for (id, task) in data.tasks.into_iter().enumerate() {
            tasks.push(validate_task(id, task, &capacities, count)?);
        }

        let predecessors = predecessors(&tasks);
        let order = topological_order(&tasks, &predecessors)?;
        let horizon = tasks
            .iter()
            .fold(0u64, |sum, task| sum.saturating_add(task.duration));

        log::debug!(
            "Instance built: {} tasks, {} resources, horizon {horizon}",
            tasks.len(),
            capacities.len()
        );

        Ok(Self {
            capacities,
            tasks,
            predecessors,
            order,
            horizon,
        })
    }

    /// Returns the tasks in index order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task with the given index.
    #[must_use]
    pub fn task(&self, id: usize) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Returns the capacities indexed by resource.
    #[must_use]
    pub fn capacities(&self) -> &[u64] {
        &self.capacities
    }

    /// Returns the resources in index order.
    pub fn resources(&self) -> impl ExactSizeIterator<Item = Resource> + '_ {
        let iter = self.capacities.iter().copied().enumerate();
        iter.map(|(id, capacity)| Resource { id, capacity })
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn tasks_len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns the number of resources.
    #[must_use]
    pub fn resources_len(&self) -> usize {
        self.capacities.len()
    }

    /// Returns the tasks that must finish before the given task starts.
    #[must_use]
    pub fn predecessors(&self, task: usize) -> &[usize] {
        self.predecessors
            .get(task)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns all precedence edges as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let iter = self.tasks.iter().enumerate();
        iter.flat_map(|(from, task)| task.successors.iter().map(move |&to| (from, to)))
    }

    /// Returns the tasks ordered so that every task comes after its predecessors.
    #[must_use]
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the sum of all durations, the makespan of running tasks one after another.
    #[must_use]
    pub const fn horizon(&self) -> u64 {
        self.horizon
    }
}

impl TryFrom<InstanceData> for Instance {
    type Error = InstanceError;

    fn try_from(data: InstanceData) -> Result<Self, Self::Error> {
        Self::new(data)
    }
}

impl From<Instance> for InstanceData {
    fn from(instance: Instance) -> Self {
        let capacities = instance.capacities.iter().map(|&c| to_signed(c)).collect();
        let tasks = instance
            .tasks
            .into_iter()
            .map(|task| TaskData {
                duration: to_signed(task.duration),
                requirements: task.requirements.iter().map(|&r| to_signed(r)).collect(),
                successors: task.successors,
            })
            .collect();
        Self { capacities, tasks }
    }
}

// Values came from `i64` during validation.
fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn validate_task(
    id: usize,
    task: TaskData,
    capacities: &[u64],
    count: usize,
) -> Result<Task, InstanceError> {
    let duration = u64::try_from(task.duration).map_err(|_| InstanceError::NegativeDuration {
        task: id,
        duration: task.duration,
    })?;

    if task.requirements.len() != capacities.len() {
        return Err(InstanceError::RequirementCount {
            task: id,
            expected: capacities.len(),
            found: task.requirements.len(),
        });
    }

    let mut requirements = Vec::with_capacity(capacities.len());
    for (resource, (&amount, &capacity)) in task.requirements.iter().zip(capacities).enumerate() {
        let amount = u64::try_from(amount).map_err(|_| InstanceError::NegativeRequirement {
            task: id,
            resource,
            amount,
        })?;
        if amount > capacity {
            log::warn!(
                "Task {id} requires {amount} of resource {resource} with capacity {capacity}, \
                 every schedule will overflow"
            );
        }
        requirements.push(amount);
    }

    let mut seen = HashSet::with_capacity(task.successors.len());
    for &successor in &task.successors {
        if successor >= count {
            return Err(InstanceError::DanglingSuccessor {
                task: id,
                successor,
            });
        }
        if successor == id {
            return Err(InstanceError::SelfLoop { task: id });
        }
        if !seen.insert(successor) {
            return Err(InstanceError::DuplicateEdge {
                task: id,
                successor,
            });
        }
    }

    Ok(Task {
        duration,
        requirements,
        successors: task.successors,
    })
}

fn predecessors(tasks: &[Task]) -> Vec<Vec<usize>> {
    let mut predecessors = vec![Vec::new(); tasks.len()];
    for (from, task) in tasks.iter().enumerate() {
        for &to in &task.successors {
            predecessors[to].push(from);
        }
    }
    predecessors
}

/// Kahn's algorithm. On failure, names a task lying on a cycle.
fn topological_order(
    tasks: &[Task],
    predecessors: &[Vec<usize>],
) -> Result<Vec<usize>, InstanceError> {
    let mut remaining: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..tasks.len()).filter(|&t| remaining[t] == 0).collect();
    let mut order = Vec::with_capacity(tasks.len());

    while let Some(task) = queue.pop_front() {
        order.push(task);
        for &next in &tasks[task].successors {
            remaining[next] -= 1;
            if remaining[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() == tasks.len() {
        return Ok(order);
    }

    // Every unordered task has an unordered predecessor, so walking backwards
    // for as many steps as there are tasks ends on a cycle.
    let Some(mut task) = (0..tasks.len()).find(|&t| remaining[t] > 0) else {
        unreachable!("Unordered task must exist")
    };
    for _ in 0..tasks.len() {
        match predecessors[task].iter().find(|&&p| remaining[p] > 0) {
            Some(&previous) => task = previous,
            None => break,
        }
    }
    Err(InstanceError::Cycle { task })
}
