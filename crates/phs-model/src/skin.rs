//! Mean skin temperature and skin vapour pressure.

use crate::filter::ExpLag;
use crate::params::Environment;

/// Steady-state skin temperature for a nude subject (°C).
pub fn nude_equilibrium(env: &Environment, t_re: f64) -> f64 {
    7.191 + 0.064 * env.t_air + 0.061 * env.t_rad + 0.198 * env.pw_air - 0.348 * env.v_air
        + 0.616 * t_re
}

/// Steady-state skin temperature for a clothed subject (°C).
pub fn clothed_equilibrium(env: &Environment, t_re: f64) -> f64 {
    12.165 + 0.02017 * env.t_air + 0.04361 * env.t_rad + 0.19354 * env.pw_air
        - 0.25315 * env.v_air
        + 0.005346 * env.met
        + 0.51274 * t_re
}

/// Steady-state skin temperature, interpolated between nude (Icl ≤ 0.2) and
/// clothed (Icl ≥ 0.6).
pub fn equilibrium(env: &Environment, t_re: f64) -> f64 {
    let nude = nude_equilibrium(env, t_re);
    if env.icl <= 0.2 {
        return nude;
    }
    let clothed = clothed_equilibrium(env, t_re);
    if env.icl >= 0.6 {
        return clothed;
    }
    nude + 2.5 * (clothed - nude) * (env.icl - 0.2)
}

/// Saturated water vapour pressure at temperature `t` (kPa).
pub fn saturated_vapour_pressure(t: f64) -> f64 {
    0.6105 * (17.27 * t / (t + 237.3)).exp()
}

/// Skin state of one minute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinUpdate {
    pub t_sk: f64,
    pub p_sk: f64,
}

impl SkinUpdate {
    /// Lag the skin temperature towards its equilibrium at the previous
    /// rectal temperature.
    pub fn compute(env: &Environment, prev_t_sk: f64, prev_t_re: f64, lag: &ExpLag) -> Self {
        let t_sk = lag.step(prev_t_sk, equilibrium(env, prev_t_re));
        Self {
            t_sk,
            p_sk: saturated_vapour_pressure(t_sk),
        }
    }
}
