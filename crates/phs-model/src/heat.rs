//! Dry heat exchange at the clothing surface.

use crate::constants::StepConstants;
use crate::error::{ModelError, ModelResult};
use crate::params::Environment;
use crate::solver::{FixedPointConfig, damped_fixed_point};
use phs_core::units::constants::CELSIUS_TO_KELVIN;

/// Emissivity of non-reflective clothing.
const CLOTHING_EMISSIVITY: f64 = 0.97;

/// Convective coefficient and effective radiating fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convection {
    /// Dynamic convective heat transfer coefficient (W/(m²K))
    pub hc_dyn: f64,
    /// Effective radiating fraction of the clothing surface
    pub f_acl_rad: f64,
}

impl Convection {
    /// Free/forced convection from the skin-air difference, floored by the
    /// velocity driven baseline `z`.
    pub fn compute(t_sk: f64, env: &Environment, z: f64) -> Self {
        let natural = 2.38 * (t_sk - env.t_air).abs().powf(0.25);
        Self {
            hc_dyn: natural.max(z),
            f_acl_rad: (1.0 - env.f_aref) * CLOTHING_EMISSIVITY + env.f_aref * env.fr,
        }
    }
}

/// Solved clothing surface state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClothingSurface {
    /// Clothing surface temperature (°C)
    pub t_cl: f64,
    /// Radiative heat transfer coefficient at `t_cl` (W/(m²K))
    pub h_r: f64,
    pub iterations: usize,
}

fn pow4_kelvin(t_c: f64) -> f64 {
    let k = t_c + CELSIUS_TO_KELVIN;
    let k2 = k * k;
    k2 * k2
}

/// Solve the clothing heat balance for the surface temperature.
///
/// The radiative coefficient depends on the unknown temperature, so the
/// balance is iterated from `Trad + 0.1` with averaging damping. Failing to
/// converge is fatal for the minute.
pub fn solve_clothing_temperature(
    t_sk: f64,
    icl_dyn: f64,
    conv: &Convection,
    env: &Environment,
    sc: &StepConstants,
    config: &FixedPointConfig,
) -> ModelResult<ClothingSurface> {
    let t_rad_pow4 = pow4_kelvin(env.t_rad);
    let hc = conv.hc_dyn;

    let outcome = damped_fixed_point(env.t_rad + 0.1, config, |t_cl| {
        let h_r = conv.f_acl_rad * sc.f_adu_rad_aux * (pow4_kelvin(t_cl) - t_rad_pow4)
            / (t_cl - env.t_rad);
        let next = (sc.f_acl * (hc * env.t_air + h_r * env.t_rad) + t_sk / icl_dyn)
            / (sc.f_acl * (hc + h_r) + 1.0 / icl_dyn);
        Ok((next, h_r))
    })?;

    if !outcome.converged {
        return Err(ModelError::ConvergenceFailed {
            what: "clothing surface temperature",
            iterations: outcome.iterations,
            residual: outcome.residual(),
        });
    }

    Ok(ClothingSurface {
        t_cl: outcome.iterate,
        h_r: outcome.aux,
        iterations: outcome.iterations,
    })
}

/// Heat flows of one minute (W/m²).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatBalance {
    pub conv: f64,
    pub rad: f64,
    /// Evaporative heat loss required for thermal equilibrium
    pub e_req: f64,
}

impl HeatBalance {
    pub fn compute(
        env: &Environment,
        sc: &StepConstants,
        conv: &Convection,
        surface: &ClothingSurface,
        d_sto_req: f64,
    ) -> Self {
        let c = sc.f_acl * conv.hc_dyn * (surface.t_cl - env.t_air);
        let r = sc.f_acl * surface.h_r * (surface.t_cl - env.t_rad);
        let e_req = env.met - d_sto_req - env.work - sc.c_resp - sc.e_resp - c - r;
        Self {
            conv: c,
            rad: r,
            e_req,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clothing::DynamicInsulation;
    use crate::constants::SubjectConstants;
    use crate::params::{ParamId, ParameterSet};

    fn setup(set: &ParameterSet) -> (Environment, StepConstants) {
        let s = set.subject().unwrap();
        let sc = SubjectConstants::compute(&s);
        let env = set.environment().unwrap();
        let step = StepConstants::compute(&s, &sc, &env);
        (env, step)
    }

    #[test]
    fn convection_floor_is_baseline() {
        let set = ParameterSet::with_defaults();
        let (env, step) = setup(&set);
        // Skin equal to air: natural term vanishes
        let c = Convection::compute(env.t_air, &env, step.z);
        assert_eq!(c.hc_dyn, step.z);
        assert!((c.f_acl_rad - ((1.0 - 0.54) * 0.97 + 0.54 * 0.97)).abs() < 1e-12);
    }

    #[test]
    fn clothing_temperature_between_skin_and_environment() {
        let mut set = ParameterSet::with_defaults();
        set.store(ParamId::Tair, Some(25.0));
        set.store(ParamId::Trad, Some(25.0));
        let (env, step) = setup(&set);
        let t_sk = 34.0;
        let ins = DynamicInsulation::compute(env.icl, env.im_st, &step);
        let conv = Convection::compute(t_sk, &env, step.z);
        let surf = solve_clothing_temperature(
            t_sk,
            ins.icl_dyn,
            &conv,
            &env,
            &step,
            &FixedPointConfig::CLOTHING,
        )
        .unwrap();
        assert!(surf.t_cl > 25.0 && surf.t_cl < t_sk);
        assert!(surf.h_r > 0.0);
        assert!(surf.iterations <= 20);

        let hb = HeatBalance::compute(&env, &step, &conv, &surf, 0.0);
        assert!(hb.conv > 0.0);
        assert!(hb.rad > 0.0);
    }

    #[test]
    fn clothing_solve_fails_when_iteration_budget_too_small() {
        let set = ParameterSet::with_defaults();
        let (env, step) = setup(&set);
        let ins = DynamicInsulation::compute(env.icl, env.im_st, &step);
        let conv = Convection::compute(35.0, &env, step.z);
        let cfg = FixedPointConfig {
            max_iterations: 1,
            tolerance: 1e-9,
        };
        let err =
            solve_clothing_temperature(35.0, ins.icl_dyn, &conv, &env, &step, &cfg).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ConvergenceFailed {
                what: "clothing surface temperature",
                iterations: 1,
                ..
            }
        ));
    }

    #[test]
    fn required_evaporation_closes_the_balance() {
        let set = ParameterSet::with_defaults();
        let (env, step) = setup(&set);
        let conv = Convection::compute(35.0, &env, step.z);
        let surf = ClothingSurface {
            t_cl: 38.0,
            h_r: 5.0,
            iterations: 1,
        };
        let hb = HeatBalance::compute(&env, &step, &conv, &surf, 2.0);
        let total = hb.e_req + 2.0 + env.work + step.c_resp + step.e_resp + hb.conv + hb.rad;
        assert!((total - env.met).abs() < 1e-9);
    }
}
