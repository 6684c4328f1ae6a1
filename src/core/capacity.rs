use super::{DemandProfile, Instance};

/// A segment where a resource is used above its capacity.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Overflow {
    pub resource: usize,
    pub start: u64,
    pub end: u64,
    pub excess: u64,
}

impl Overflow {
    /// Excess multiplied by the length of the segment.
    #[must_use]
    pub const fn weighted(&self) -> u64 {
        self.excess.saturating_mul(self.end - self.start)
    }
}

/// Outcome of comparing a demand profile with resource capacities.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapacityVerdict {
    overflows: Vec<Overflow>,
}

impl CapacityVerdict {
    /// Returns whether no resource is ever overloaded.
    #[must_use]
    pub fn satisfied(&self) -> bool {
        self.overflows.is_empty()
    }

    /// Returns the overloaded segments, ordered by resource and then time.
    #[must_use]
    pub fn overflows(&self) -> &[Overflow] {
        &self.overflows
    }

    /// Returns the summed excess of all overflows weighted by their length.
    #[must_use]
    pub fn weighted_excess(&self) -> u64 {
        self.overflows
            .iter()
            .fold(0u64, |sum, overflow| sum.saturating_add(overflow.weighted()))
    }

    /// Returns the weighted excess of every resource.
    #[must_use]
    pub fn excess_by_resource(&self, resources: usize) -> Vec<u64> {
        let mut excess = vec![0u64; resources];
        for overflow in &self.overflows {
            if let Some(sum) = excess.get_mut(overflow.resource) {
                *sum = sum.saturating_add(overflow.weighted());
            }
        }
        excess
    }
}

/// Checks the demand of every resource on every segment against its capacity.
#[must_use]
pub fn check_capacity(instance: &Instance, profile: &DemandProfile) -> CapacityVerdict {
    let overflows = instance
        .resources()
        .zip(profile.resources())
        .flat_map(|(resource, curve)| {
            curve.segments().filter_map(move |segment| {
                (segment.demand > resource.capacity).then(|| Overflow {
                    resource: resource.id,
                    start: segment.start,
                    end: segment.end,
                    excess: segment.demand - resource.capacity,
                })
            })
        })
        .collect();
    CapacityVerdict { overflows }
}

/// Returns whether no resource is ever overloaded, stopping at the first overflow.
#[must_use]
pub fn capacity_satisfied(instance: &Instance, profile: &DemandProfile) -> bool {
    instance
        .resources()
        .zip(profile.resources())
        .all(|(resource, curve)| curve.peak() <= resource.capacity)
}
