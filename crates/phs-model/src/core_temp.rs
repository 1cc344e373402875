//! Required core temperature, core temperature and rectal temperature.

use crate::config::NonConvergencePolicy;
use crate::error::{ModelError, ModelResult};
use crate::filter::ExpLag;
use crate::solver::{FixedPointConfig, damped_fixed_point};

/// Core temperature at which the skin/core mass fraction starts to drop (°C).
const T_CR_NEUTRAL: f64 = 36.8;
/// Core temperature above which the modified mass fraction stays at its floor (°C).
const T_CR_HOT: f64 = 39.0;
/// Rectal temperature limit (°C).
pub const T_RE_LIMIT: f64 = 38.0;

/// Lagged required core temperature and the heat storage it implies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequiredCore {
    /// Filtered required core temperature (°C)
    pub t_cr_req: f64,
    /// Heat storage associated with the rise of `t_cr_req` (W/m²)
    pub d_sto_req: f64,
}

impl RequiredCore {
    pub fn compute(
        prev_t_cr_req: f64,
        t_cr_req_ss: f64,
        lag: &ExpLag,
        sp_heat: f64,
        prev_sk_cr_rel: f64,
    ) -> Self {
        let t_cr_req = lag.step(prev_t_cr_req, t_cr_req_ss);
        Self {
            t_cr_req,
            d_sto_req: sp_heat * (t_cr_req - prev_t_cr_req) * (1.0 - prev_sk_cr_rel),
        }
    }
}

/// Previous-minute values the core update starts from.
#[derive(Clone, Copy, Debug)]
pub struct CoreHistory {
    pub t_cr: f64,
    pub t_sk: f64,
    pub t_bm: f64,
    pub sk_cr_rel: f64,
}

/// Result of a core temperature update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreUpdate {
    pub t_cr: f64,
    /// New skin/core mass fraction, `None` when the algorithm leaves it as is
    pub sk_cr_rel: Option<f64>,
    /// New mean body temperature, `None` when the algorithm does not track it
    pub t_bm: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Clamped linear mass fraction of the standard algorithm.
pub fn standard_mass_fraction(t_cr: f64) -> f64 {
    (0.3 - 0.09 * (t_cr - T_CR_NEUTRAL)).clamp(0.1, 0.3)
}

/// Piecewise mass fraction of the modified algorithm.
pub fn modified_mass_fraction(t_cr: f64) -> f64 {
    if t_cr < T_CR_NEUTRAL {
        0.3
    } else if t_cr > T_CR_HOT {
        0.1
    } else {
        0.3 - 0.091 * (t_cr - T_CR_NEUTRAL)
    }
}

fn check_convergence(
    update: CoreUpdate,
    residual: f64,
    what: &'static str,
    policy: NonConvergencePolicy,
) -> ModelResult<CoreUpdate> {
    if update.converged {
        return Ok(update);
    }
    match policy {
        NonConvergencePolicy::Fail => Err(ModelError::ConvergenceFailed {
            what,
            iterations: update.iterations,
            residual,
        }),
        NonConvergencePolicy::WarnAndContinue => {
            tracing::warn!(
                what,
                iterations = update.iterations,
                residual,
                t_cr = update.t_cr,
                "core temperature did not converge, using best estimate"
            );
            Ok(update)
        }
    }
}

/// Standard update: iterate the storage balance on core temperature, with the
/// mass fraction following the core temperature of the current iterate.
pub fn standard_core_temperature(
    d_storage: f64,
    sp_heat: f64,
    t_sk: f64,
    prev: &CoreHistory,
    config: &FixedPointConfig,
    policy: NonConvergencePolicy,
) -> ModelResult<CoreUpdate> {
    let outcome = damped_fixed_point(prev.t_cr, config, |t_cr_1| {
        let rel = standard_mass_fraction(t_cr_1);
        let t_cr = (d_storage / sp_heat + prev.t_sk * prev.sk_cr_rel / 2.0 - t_sk * rel / 2.0
            + prev.t_cr * (1.0 - prev.sk_cr_rel / 2.0))
            / (1.0 - rel / 2.0);
        Ok((t_cr, rel))
    })?;

    let update = CoreUpdate {
        t_cr: outcome.candidate,
        sk_cr_rel: Some(outcome.aux),
        t_bm: None,
        iterations: outcome.iterations,
        converged: outcome.converged,
    };
    check_convergence(update, outcome.residual(), "standard core temperature", policy)
}

/// Invert `t_bm = t_cr * (1 - f/2) + t_sk * f/2` for `t_cr`, with `f` the
/// piecewise mass fraction at `t_cr`. Starts from `t_bm`.
pub fn core_from_mean_body(
    t_bm: f64,
    t_sk: f64,
    config: &FixedPointConfig,
) -> ModelResult<crate::solver::FixedPointOutcome<()>> {
    damped_fixed_point(t_bm, config, |t_cr| {
        let half = modified_mass_fraction(t_cr) * 0.5;
        let t_bm_1 = t_cr * (1.0 - half) + t_sk * half;
        Ok((t_cr - (t_bm_1 - t_bm), ()))
    })
}

/// Modified update: advance the mean body temperature by the stored heat,
/// then recover the core temperature from it.
pub fn modified_core_temperature(
    d_storage: f64,
    sp_heat: f64,
    t_sk: f64,
    prev: &CoreHistory,
    config: &FixedPointConfig,
    policy: NonConvergencePolicy,
) -> ModelResult<CoreUpdate> {
    let t_bm = prev.t_bm + d_storage / sp_heat;
    let outcome = core_from_mean_body(t_bm, t_sk, config)?;
    let t_cr = if outcome.converged {
        outcome.iterate
    } else {
        outcome.next_iterate()
    };
    let update = CoreUpdate {
        t_cr,
        sk_cr_rel: None,
        t_bm: Some(t_bm),
        iterations: outcome.iterations,
        converged: outcome.converged,
    };
    check_convergence(update, outcome.residual(), "modified core temperature", policy)
}

/// One-minute rectal temperature response to core temperature.
pub fn rectal_temperature(prev_t_re: f64, t_cr: f64) -> f64 {
    prev_t_re + (2.0 * t_cr - 1.962 * prev_t_re - 1.31) / 9.0
}
