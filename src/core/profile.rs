use super::Schedule;

/// Constant demand of one resource between two consecutive breakpoints.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
    pub demand: u64,
}

/// Resource demand of a schedule over time.
///
/// Breakpoints are the sorted distinct start and finish times of the tasks with
/// positive duration. Between two consecutive breakpoints the set of active
/// tasks does not change, so the demand is stored once per resource and segment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DemandProfile {
    breakpoints: Vec<u64>,
    demand: Vec<Vec<u64>>,
}

impl DemandProfile {
    /// Sweeps over the breakpoints of the schedule, adding the requirements of a
    /// task at its start and removing them at its finish.
    #[must_use]
    pub fn build(schedule: &Schedule) -> Self {
        let instance = schedule.instance();
        let active: Vec<_> = schedule
            .intervals()
            .filter(|&(_, start, finish)| finish > start)
            .collect();

        let mut breakpoints: Vec<_> = active
            .iter()
            .flat_map(|&(_, start, finish)| [start, finish])
            .collect();
        breakpoints.sort_unstable();
        breakpoints.dedup();

        let resources = instance.resources_len();
        // Sums of `u64` requirements over fewer than 2^64 tasks fit in `u128`.
        let mut opening = vec![vec![0u128; breakpoints.len()]; resources];
        let mut closing = vec![vec![0u128; breakpoints.len()]; resources];

        for &(task, start, finish) in &active {
            let first = breakpoints.partition_point(|&b| b < start);
            let last = breakpoints.partition_point(|&b| b < finish);
            for (resource, &amount) in instance.tasks()[task].requirements.iter().enumerate() {
                opening[resource][first] += u128::from(amount);
                closing[resource][last] += u128::from(amount);
            }
        }

        let segments = breakpoints.len().saturating_sub(1);
        let demand = opening
            .iter()
            .zip(&closing)
            .map(|(opening, closing)| {
                let mut running = 0u128;
                (0..segments)
                    .map(|k| {
                        running = running - closing[k] + opening[k];
                        u64::try_from(running).unwrap_or(u64::MAX)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            breakpoints,
            demand,
        }
    }

    /// Returns the sorted distinct breakpoints.
    #[must_use]
    pub fn breakpoints(&self) -> &[u64] {
        &self.breakpoints
    }

    /// Returns the number of segments between breakpoints.
    #[must_use]
    pub fn segments_len(&self) -> usize {
        self.breakpoints.len().saturating_sub(1)
    }

    /// Returns the number of resources covered by the profile.
    #[must_use]
    pub fn resources_len(&self) -> usize {
        self.demand.len()
    }

    /// Returns the demand curve of a single resource.
    ///
    /// # Panics
    /// - If the resource does not exist.
    #[must_use]
    pub fn resource(&self, resource: usize) -> ResourceProfile<'_> {
        ResourceProfile {
            breakpoints: &self.breakpoints,
            demand: &self.demand[resource],
        }
    }

    /// Returns the demand curves of all resources in index order.
    pub fn resources(&self) -> impl Iterator<Item = ResourceProfile<'_>> {
        (0..self.demand.len()).map(move |resource| self.resource(resource))
    }
}

/// Demand curve of a single resource, borrowed from a [`DemandProfile`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceProfile<'a> {
    breakpoints: &'a [u64],
    demand: &'a [u64],
}

impl<'a> ResourceProfile<'a> {
    /// Returns the segments in time order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + 'a {
        let windows = self.breakpoints.windows(2);
        windows.zip(self.demand).map(|(window, &demand)| Segment {
            start: window[0],
            end: window[1],
            demand,
        })
    }

    /// Returns the demand at a time instant.
    #[must_use]
    pub fn demand_at(&self, time: u64) -> u64 {
        let segment = self.breakpoints.partition_point(|&b| b <= time);
        match segment.checked_sub(1) {
            Some(index) => self.demand.get(index).copied().unwrap_or_default(),
            None => 0,
        }
    }

    /// Returns the highest demand, 0 for an empty profile.
    #[must_use]
    pub fn peak(&self) -> u64 {
        self.demand.iter().copied().max().unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::problem::test::{task, two_tasks};
    use crate::core::{Instance, InstanceData};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn segments(profile: &DemandProfile, resource: usize) -> Vec<(u64, u64, u64)> {
        let segments = profile.resource(resource).segments();
        segments.map(|s| (s.start, s.end, s.demand)).collect()
    }

    #[test]
    fn profile_should_sum_overlapping_tasks() -> anyhow::Result<()> {
        let instance = two_tasks(false);
        let profile = DemandProfile::build(&Schedule::new(&instance, &[0, 0])?);

        assert_eq!(profile.breakpoints(), &[0, 2, 3]);
        assert_eq!(profile.segments_len(), 2);
        assert_eq!(segments(&profile, 0), vec![(0, 2, 6), (2, 3, 4)]);
        assert_eq!(profile.resource(0).peak(), 6);

        Ok(())
    }

    #[test]
    fn profile_should_keep_idle_gaps() -> anyhow::Result<()> {
        let instance = two_tasks(false);
        let profile = DemandProfile::build(&Schedule::new(&instance, &[0, 5])?);

        assert_eq!(segments(&profile, 0), vec![(0, 3, 4), (3, 5, 0), (5, 7, 2)]);
        assert_eq!(profile.resource(0).demand_at(0), 4);
        assert_eq!(profile.resource(0).demand_at(3), 0);
        assert_eq!(profile.resource(0).demand_at(6), 2);
        assert_eq!(profile.resource(0).demand_at(7), 0);

        Ok(())
    }

    #[test]
    fn profile_should_ignore_zero_duration_tasks() -> anyhow::Result<()> {
        let instance = Instance::new(InstanceData {
            capacities: vec![1],
            tasks: vec![task(0, &[9], &[]), task(2, &[1], &[])],
        })?;
        let profile = DemandProfile::build(&Schedule::new(&instance, &[1, 0])?);

        assert_eq!(profile.breakpoints(), &[0, 2]);
        assert_eq!(segments(&profile, 0), vec![(0, 2, 1)]);

        Ok(())
    }

    #[test]
    fn saturated_segment_should_not_lower_later_demand() -> anyhow::Result<()> {
        let huge = i64::MAX;
        let instance = Instance::new(InstanceData {
            capacities: vec![huge],
            tasks: vec![
                task(10, &[huge], &[]),
                task(10, &[huge], &[]),
                task(10, &[huge], &[]),
                task(10, &[1], &[]),
            ],
        })?;
        let profile = DemandProfile::build(&Schedule::new(&instance, &[0, 0, 0, 5])?);

        assert_eq!(
            segments(&profile, 0),
            vec![(0, 5, u64::MAX), (5, 10, u64::MAX), (10, 15, 1)]
        );
        assert_eq!(profile.resource(0).demand_at(12), 1);

        Ok(())
    }

    #[test]
    fn profile_should_be_empty_without_tasks() -> anyhow::Result<()> {
        let instance = Instance::new(InstanceData {
            capacities: vec![3, 4],
            tasks: vec![],
        })?;
        let profile = DemandProfile::build(&Schedule::new(&instance, &[])?);

        assert!(profile.breakpoints().is_empty());
        assert_eq!(profile.segments_len(), 0);
        assert_eq!(profile.resources_len(), 2);
        assert_eq!(profile.resource(1).segments().count(), 0);
        assert_eq!(profile.resource(1).peak(), 0);

        Ok(())
    }

    #[test]
    fn profile_should_match_unit_time_scan() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let tasks = (0..rng.gen_range(1..8))
                .map(|_| task(rng.gen_range(0..5), &[rng.gen_range(0..4), rng.gen_range(0..4)], &[]))
                .collect();
            let instance = Instance::new(InstanceData {
                capacities: vec![4, 4],
                tasks,
            })?;
            let starts: Vec<i64> = (0..instance.tasks_len())
                .map(|_| rng.gen_range(0..10))
                .collect();
            let schedule = Schedule::new(&instance, &starts)?;
            let profile = DemandProfile::build(&schedule);

            for (resource, curve) in profile.resources().enumerate() {
                for segment in curve.segments() {
                    assert!(segment.start < segment.end);
                    for time in segment.start..segment.end {
                        let expected: u64 = schedule
                            .intervals()
                            .filter(|&(_, start, finish)| start <= time && time < finish)
                            .map(|(t, _, _)| instance.tasks()[t].requirements[resource])
                            .sum();
                        assert_eq!(segment.demand, expected, "time {time}");
                        assert_eq!(curve.demand_at(time), expected, "time {time}");
                    }
                }
            }
        }

        Ok(())
    }
}
