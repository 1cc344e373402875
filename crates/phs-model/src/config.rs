//! Engine configuration.

use crate::params::RangePolicy;
use crate::solver::FixedPointConfig;
use serde::{Deserialize, Serialize};

/// What a core temperature solve does when it runs out of iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Abort the minute with `ConvergenceFailed`.
    #[default]
    Fail,
    /// Log a warning and keep the best estimate.
    WarnAndContinue,
}

/// Options for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Handling of parameter values outside their documented range
    pub range_policy: RangePolicy,
    /// Handling of core temperature non-convergence
    pub core_nonconvergence: NonConvergencePolicy,
    /// Clothing surface temperature iteration
    pub clothing_solver: FixedPointConfig,
    /// Core temperature iteration
    pub core_solver: FixedPointConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::PassThrough,
            core_nonconvergence: NonConvergencePolicy::Fail,
            clothing_solver: FixedPointConfig::CLOTHING,
            core_solver: FixedPointConfig::CORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SimConfig::default();
        assert_eq!(c.range_policy, RangePolicy::PassThrough);
        assert_eq!(c.core_nonconvergence, NonConvergencePolicy::Fail);
        assert_eq!(c.clothing_solver.max_iterations, 20);
        assert_eq!(c.core_solver.max_iterations, 25);
    }
}
