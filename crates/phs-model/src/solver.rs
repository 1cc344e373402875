//! Damped fixed-point iteration shared by the clothing and core temperature
//! solves.

use crate::error::ModelResult;
use phs_core::{CoreError, ensure_finite};
use serde::{Deserialize, Serialize};

/// Fixed-point iteration configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedPointConfig {
    /// Maximum number of map evaluations
    pub max_iterations: usize,
    /// Absolute tolerance on |x - g(x)| (°C)
    pub tolerance: f64,
}

impl FixedPointConfig {
    /// Clothing surface temperature solve.
    pub const CLOTHING: Self = Self {
        max_iterations: 20,
        tolerance: 0.001,
    };

    /// Core temperature solves (both algorithms).
    pub const CORE: Self = Self {
        max_iterations: 25,
        tolerance: 0.001,
    };
}

/// Result of a damped fixed-point iteration.
#[derive(Clone, Debug)]
pub struct FixedPointOutcome<A> {
    /// Last point the map was evaluated at
    pub iterate: f64,
    /// Map value at `iterate`
    pub candidate: f64,
    /// Side output of the last evaluation
    pub aux: A,
    /// Number of map evaluations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

impl<A> FixedPointOutcome<A> {
    pub fn residual(&self) -> f64 {
        (self.candidate - self.iterate).abs()
    }

    /// The point the next round would have been evaluated at.
    pub fn next_iterate(&self) -> f64 {
        0.5 * (self.iterate + self.candidate)
    }
}

/// Iterate `x <- (x + g(x)) / 2` from `x0` until `|x - g(x)| <= tolerance`.
///
/// `map` returns the candidate `g(x)` and a side output (for instance the
/// radiative coefficient evaluated at `x`). Running out of iterations is not
/// an error here: callers decide, via `converged`, whether that is fatal.
pub fn damped_fixed_point<A, F>(
    x0: f64,
    config: &FixedPointConfig,
    mut map: F,
) -> ModelResult<FixedPointOutcome<A>>
where
    F: FnMut(f64) -> ModelResult<(f64, A)>,
{
    if config.max_iterations == 0 {
        return Err(CoreError::InvalidArg {
            what: "max_iterations must be positive",
        }
        .into());
    }

    let mut x = x0;
    let mut iter = 0;
    loop {
        iter += 1;
        let (g, aux) = map(x)?;
        let g = ensure_finite(g, "fixed-point candidate")?;
        let converged = (x - g).abs() <= config.tolerance;
        if converged || iter == config.max_iterations {
            return Ok(FixedPointOutcome {
                iterate: x,
                candidate: g,
                aux,
                iterations: iter,
                converged,
            });
        }
        x = 0.5 * (x + g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_on_contraction() {
        // g(x) = cos(x) has a fixed point near 0.739085
        let out = damped_fixed_point(1.0, &FixedPointConfig::CORE, |x| Ok((x.cos(), ()))).unwrap();
        assert!(out.converged);
        assert!(out.iterations <= 25);
        assert!((out.iterate - 0.739_085).abs() < 2e-3);
    }

    #[test]
    fn immediate_convergence_counts_one_iteration() {
        let out = damped_fixed_point(2.0, &FixedPointConfig::CLOTHING, |x| Ok((x, 7))).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
        assert_eq!(out.aux, 7);
    }

    #[test]
    fn reports_non_convergence_without_error() {
        let cfg = FixedPointConfig {
            max_iterations: 3,
            tolerance: 1e-12,
        };
        let out = damped_fixed_point(0.0, &cfg, |x| Ok((x + 1.0, ()))).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 3);
        assert!((out.residual() - 1.0).abs() < 1e-12);
        assert!((out.next_iterate() - (out.iterate + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn non_finite_candidate_is_an_error() {
        let res = damped_fixed_point(0.0, &FixedPointConfig::CORE, |_| Ok((f64::NAN, ())));
        assert!(res.is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let cfg = FixedPointConfig {
            max_iterations: 0,
            tolerance: 0.001,
        };
        assert!(damped_fixed_point(0.0, &cfg, |x| Ok((x, ()))).is_err());
    }
}
