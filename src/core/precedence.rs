use super::Schedule;

/// A precedence edge whose target starts before its source finishes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PrecedenceViolation {
    pub from: usize,
    pub to: usize,
    /// How long before the finish of `from` the task `to` starts.
    pub lateness: u64,
}

/// Outcome of checking every precedence edge of a schedule.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrecedenceVerdict {
    violations: Vec<PrecedenceViolation>,
}

impl PrecedenceVerdict {
    /// Returns whether every edge is respected.
    #[must_use]
    pub fn satisfied(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the number of violated edges.
    #[must_use]
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    /// Returns the violated edges in edge order.
    #[must_use]
    pub fn violations(&self) -> &[PrecedenceViolation] {
        &self.violations
    }

    /// Returns the summed lateness of all violated edges.
    #[must_use]
    pub fn total_lateness(&self) -> u64 {
        self.violations
            .iter()
            .fold(0u64, |sum, v| sum.saturating_add(v.lateness))
    }
}

fn violation(schedule: &Schedule, from: usize, to: usize) -> Option<PrecedenceViolation> {
    let finish = schedule.finish(from);
    let start = schedule.start(to);
    (start < finish).then(|| PrecedenceViolation {
        from,
        to,
        lateness: finish - start,
    })
}

/// Checks every edge `u -> v` for `start[v] >= start[u] + duration[u]`.
#[must_use]
pub fn check_precedence(schedule: &Schedule) -> PrecedenceVerdict {
    let edges = schedule.instance().edges();
    let violations = edges
        .filter_map(|(from, to)| violation(schedule, from, to))
        .collect();
    PrecedenceVerdict { violations }
}

/// Returns whether every edge is respected, stopping at the first violation.
#[must_use]
pub fn precedence_satisfied(schedule: &Schedule) -> bool {
    let mut edges = schedule.instance().edges();
    edges.all(|(from, to)| violation(schedule, from, to).is_none())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::problem::test::{task, two_tasks};
    use crate::core::{Instance, InstanceData};

    #[test]
    fn precedence_should_detect_violation() -> anyhow::Result<()> {
        let instance = two_tasks(true);
        let schedule = Schedule::new(&instance, &[0, 2])?;
        let verdict = check_precedence(&schedule);

        assert!(!verdict.satisfied());
        assert!(!precedence_satisfied(&schedule));
        assert_eq!(verdict.count(), 1);
        assert_eq!(
            verdict.violations(),
            &[PrecedenceViolation {
                from: 0,
                to: 1,
                lateness: 1
            }]
        );
        assert_eq!(verdict.total_lateness(), 1);

        Ok(())
    }

    #[test]
    fn precedence_should_accept_touching_tasks() -> anyhow::Result<()> {
        let instance = two_tasks(true);
        let schedule = Schedule::new(&instance, &[0, 3])?;

        assert!(check_precedence(&schedule).satisfied());
        assert!(precedence_satisfied(&schedule));

        Ok(())
    }

    #[test]
    fn precedence_should_count_every_edge() -> anyhow::Result<()> {
        // 0 -> {1, 2} -> 3
        let instance = Instance::new(InstanceData {
            capacities: vec![],
            tasks: vec![
                task(4, &[], &[1, 2]),
                task(2, &[], &[3]),
                task(0, &[], &[3]),
                task(1, &[], &[]),
            ],
        })?;
        let schedule = Schedule::new(&instance, &[0, 1, 3, 2])?;
        let verdict = check_precedence(&schedule);

        // 0 -> 1 late by 3, 0 -> 2 late by 1, 1 -> 3 late by 1, 2 -> 3 late by 1.
        assert_eq!(verdict.count(), 4);
        assert_eq!(verdict.total_lateness(), 6);

        Ok(())
    }

    #[test]
    fn zero_duration_task_should_still_be_ordered() -> anyhow::Result<()> {
        let instance = Instance::new(InstanceData {
            capacities: vec![],
            tasks: vec![task(0, &[], &[1]), task(1, &[], &[])],
        })?;

        assert!(check_precedence(&Schedule::new(&instance, &[5, 5])?).satisfied());
        assert_eq!(
            check_precedence(&Schedule::new(&instance, &[5, 4])?).count(),
            1
        );

        Ok(())
    }
}
