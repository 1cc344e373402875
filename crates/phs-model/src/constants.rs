//! Derived constants: fixed for a run (subject) or for a step block (step).

use crate::filter::ExpLag;
use crate::params::{Environment, Subject};
use crate::variant::SweatCeiling;
use phs_core::units::constants::STEFAN_BOLTZMANN;

/// Quantities fixed for a whole run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubjectConstants {
    /// DuBois body surface area (m²)
    pub adu: f64,
    /// Body heat capacity per unit area (W·min/(m²·K))
    pub sp_heat: f64,
    /// Cumulative water-loss threshold, 50th percentile subject (g)
    pub sweat_max50_g: f64,
    /// Cumulative water-loss threshold, 95th percentile subject (g)
    pub sweat_max95_g: f64,
    /// Maximum skin wettedness
    pub w_max: f64,
    /// Lag of the required core temperature
    pub tcreq_lag: ExpLag,
    /// Lag of the skin temperature
    pub skin_lag: ExpLag,
    /// Lag of the predicted sweat rate
    pub sweat_lag: ExpLag,
}

impl SubjectConstants {
    pub fn compute(subject: &Subject) -> Self {
        let adu = 0.202 * subject.mass_kg.powf(0.425) * subject.height_m.powf(0.725);
        let sp_heat = 57.83 * subject.mass_kg / adu;

        let (frac50, frac95) = if subject.drink { (0.075, 0.05) } else { (0.03, 0.03) };
        let grams = subject.mass_kg * 1000.0;

        let w_max = if subject.is_acclimatized() { 1.0 } else { 0.85 };

        Self {
            adu,
            sp_heat,
            sweat_max50_g: frac50 * grams,
            sweat_max95_g: frac95 * grams,
            w_max,
            tcreq_lag: ExpLag::from_time_constant(10.0),
            skin_lag: ExpLag::from_time_constant(3.0),
            sweat_lag: ExpLag::from_time_constant(10.0),
        }
    }
}

/// Walking speed and air velocity relative to the body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub v_walk: f64,
    pub v_air_rel: f64,
}

impl Motion {
    /// Resolve walking speed and relative air velocity.
    ///
    /// - walking speed and direction given: vector combination
    /// - only walking speed given: the larger of air and walking speed
    /// - neither: walking speed estimated from the metabolic rate, the air
    ///   velocity is taken as relative velocity
    pub fn resolve(env: &Environment) -> Self {
        match (env.v_walk, env.walk_dir) {
            (Some(v_walk), Some(dir)) => Self {
                v_walk,
                v_air_rel: (env.v_air - v_walk * dir.to_radians().cos()).abs(),
            },
            (Some(v_walk), None) => Self {
                v_walk,
                v_air_rel: env.v_air.max(v_walk),
            },
            (None, _) => Self {
                v_walk: (0.0052 * (env.met - 58.0)).min(0.7),
                v_air_rel: env.v_air,
            },
        }
    }
}

/// Quantities fixed for one step block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepConstants {
    /// Fraction of body surface exchanging radiation
    pub f_adu_rad: f64,
    /// `STEFAN_BOLTZMANN * f_adu_rad`
    pub f_adu_rad_aux: f64,
    /// Sweat rate ceiling (W/m²)
    pub sw_max: f64,
    /// Steady-state required core temperature (°C)
    pub tcreq_ss: f64,
    /// Static clothing insulation (m²K/W)
    pub icl_st: f64,
    /// Clothing area factor
    pub f_acl: f64,
    /// Static boundary air layer insulation (m²K/W)
    pub ia_st: f64,
    /// Static total insulation (m²K/W)
    pub itot_st: f64,
    pub motion: Motion,
    /// Expired air temperature (°C)
    pub t_resp: f64,
    /// Respiratory convective heat loss (W/m²)
    pub c_resp: f64,
    /// Respiratory evaporative heat loss (W/m²)
    pub e_resp: f64,
    /// Baseline convective coefficient (W/(m²K))
    pub z: f64,
}

impl StepConstants {
    pub fn compute(subject: &Subject, sc: &SubjectConstants, env: &Environment) -> Self {
        let f_adu_rad = env.posture.radiating_fraction();

        let mut sw_max = match subject.variant.sweat_ceiling() {
            SweatCeiling::MetabolicLinear => ((env.met - 32.0) * sc.adu).clamp(250.0, 400.0),
            SweatCeiling::Fixed => 400.0,
        };
        if subject.is_acclimatized() {
            sw_max *= 1.25;
        }

        let icl_st = env.icl * 0.155;
        let f_acl = 1.0 + 0.3 * env.icl;
        let ia_st = 0.111;
        let itot_st = icl_st + ia_st / f_acl;

        let motion = Motion::resolve(env);

        let t_resp = 28.56 + 0.115 * env.t_air + 0.641 * env.pw_air;
        let c_resp = 0.001516 * env.met * (t_resp - env.t_air);
        let e_resp = 0.00127 * env.met * (59.34 + 0.53 * env.t_air - 11.63 * env.pw_air);

        let z = if motion.v_air_rel > 1.0 {
            8.7 * motion.v_air_rel.powf(0.6)
        } else {
            3.5 + 5.2 * motion.v_air_rel
        };

        Self {
            f_adu_rad,
            f_adu_rad_aux: STEFAN_BOLTZMANN * f_adu_rad,
            sw_max,
            tcreq_ss: 0.0036 * env.met + 36.6,
            icl_st,
            f_acl,
            ia_st,
            itot_st,
            motion,
            t_resp,
            c_resp,
            e_resp,
            z,
        }
    }
}
