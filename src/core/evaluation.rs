use super::{
    capacity_satisfied, check_capacity, check_precedence, precedence_satisfied, CapacityVerdict,
    DemandProfile, Instance, PrecedenceVerdict, Schedule,
};
use crate::cast_u64;
use crate::error::SolutionError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Penalty per violated edge and per unit of weighted capacity excess.
pub const DEFAULT_PENALTY: u64 = 1_000_000;

/// Settings of the evaluator.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub penalty: u64,
}

impl EvaluatorConfig {
    /// Creates a config with the given penalty.
    #[must_use]
    pub const fn new(penalty: u64) -> Self {
        Self { penalty }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PENALTY)
    }
}

/// Full result of evaluating one start-time vector.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Evaluation {
    pub makespan: u64,
    pub precedence: PrecedenceVerdict,
    pub capacity: CapacityVerdict,
    pub score: u64,
}

impl Evaluation {
    /// Returns whether the schedule respects every constraint.
    #[must_use]
    pub fn feasible(&self) -> bool {
        self.precedence.satisfied() && self.capacity.satisfied()
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.feasible() {
            write!(f, "feasible, makespan {}", self.makespan)
        } else {
            write!(
                f,
                "infeasible, makespan {}, {} precedence violations, capacity excess {}",
                self.makespan,
                self.precedence.count(),
                self.capacity.weighted_excess()
            )
        }
    }
}

/// Scores start-time vectors of a single instance.
///
/// The evaluator only borrows the instance and holds no mutable state, so one
/// evaluator can be shared between threads and called any number of times.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'a> {
    instance: &'a Instance,
    config: EvaluatorConfig,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator.
    #[must_use]
    pub fn new(instance: &'a Instance, config: EvaluatorConfig) -> Self {
        if config.penalty <= instance.horizon() {
            log::warn!(
                "Penalty {} does not exceed horizon {}, infeasible schedules may outscore feasible ones",
                config.penalty,
                instance.horizon()
            );
        }
        Self { instance, config }
    }

    /// Returns the evaluated instance.
    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Returns the config.
    #[must_use]
    pub const fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Checks every constraint and computes the score.
    ///
    /// A feasible schedule scores its makespan. An infeasible one scores
    /// `makespan + penalty * (violated edges + weighted capacity excess)`,
    /// saturating at `u64::MAX`.
    ///
    /// # Errors
    /// - If the start times are not one non-negative value per task.
    pub fn evaluate(&self, starts: &[i64]) -> Result<Evaluation, SolutionError> {
        let schedule = Schedule::new(self.instance, starts)?;

        let precedence = check_precedence(&schedule);
        let profile = DemandProfile::build(&schedule);
        let capacity = check_capacity(self.instance, &profile);
        let makespan = schedule.makespan();

        let violation = cast_u64(precedence.count()).saturating_add(capacity.weighted_excess());
        let score = makespan.saturating_add(self.config.penalty.saturating_mul(violation));

        let evaluation = Evaluation {
            makespan,
            precedence,
            capacity,
            score,
        };
        log::trace!("Evaluated {starts:?}: {evaluation}");
        Ok(evaluation)
    }

    /// Computes only the score, see [`Evaluator::evaluate`].
    ///
    /// # Errors
    /// - If the start times are not one non-negative value per task.
    pub fn score(&self, starts: &[i64]) -> Result<u64, SolutionError> {
        self.evaluate(starts).map(|evaluation| evaluation.score)
    }

    /// Returns whether the schedule is feasible. Precedence is checked first and
    /// the demand profile is only built when every edge holds.
    ///
    /// # Errors
    /// - If the start times are not one non-negative value per task.
    pub fn is_feasible(&self, starts: &[i64]) -> Result<bool, SolutionError> {
        let schedule = Schedule::new(self.instance, starts)?;
        if !precedence_satisfied(&schedule) {
            return Ok(false);
        }
        let profile = DemandProfile::build(&schedule);
        Ok(capacity_satisfied(self.instance, &profile))
    }
}
