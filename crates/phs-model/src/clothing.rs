//! Dynamic clothing insulation and vapour resistance.
//!
//! Static insulation values are corrected for body movement and wind with the
//! ISO 7933 empirical factors.

use crate::constants::StepConstants;

/// Relative air velocity cap for the insulation correction (m/s).
const V_REL_CAP: f64 = 3.0;
/// Walking speed cap for the insulation correction (m/s).
const V_WALK_CAP: f64 = 1.5;
/// Upper bound of the dynamic permeability index.
const IM_DYN_MAX: f64 = 0.9;
/// Lewis relation constant (K/kPa).
const LEWIS: f64 = 16.7;

/// Movement-corrected clothing properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicInsulation {
    /// Correction of intrinsic clothing insulation, in (0, 1]
    pub cor_cl: f64,
    /// Correction of boundary air layer insulation, in (0, 1]
    pub cor_ia: f64,
    /// Blended total correction
    pub cor_tot: f64,
    /// Dynamic total insulation (m²K/W)
    pub itot_dyn: f64,
    /// Dynamic intrinsic clothing insulation (m²K/W)
    pub icl_dyn: f64,
    /// Permeability correction
    pub cor_e: f64,
    /// Dynamic permeability index, at most 0.9
    pub im_dyn: f64,
    /// Dynamic evaporative resistance (m²kPa/W)
    pub rt_dyn: f64,
}

/// Correction of the intrinsic clothing insulation.
pub fn intrinsic_correction(v_air_rel: f64, v_walk: f64) -> f64 {
    let v = v_air_rel.min(V_REL_CAP);
    let w = v_walk.min(V_WALK_CAP);
    (1.044 * ((0.066 * v - 0.398) * v + (0.094 * w - 0.378) * w).exp()).min(1.0)
}

/// Correction of the boundary air layer insulation.
///
/// The velocity term deliberately uses the uncapped relative velocity.
pub fn air_layer_correction(v_air_rel: f64, v_walk: f64) -> f64 {
    let w = v_walk.min(V_WALK_CAP);
    ((0.047 * v_air_rel - 0.472) * v_air_rel + (0.117 * w - 0.342) * w)
        .exp()
        .min(1.0)
}

impl DynamicInsulation {
    pub fn compute(icl: f64, im_st: f64, sc: &StepConstants) -> Self {
        let motion = sc.motion;
        let cor_cl = intrinsic_correction(motion.v_air_rel, motion.v_walk);
        let cor_ia = air_layer_correction(motion.v_air_rel, motion.v_walk);

        // Light clothing: blend towards the air layer correction.
        let cor_tot = if icl <= 0.6 {
            ((0.6 - icl) * cor_ia + icl * cor_cl) / 0.6
        } else {
            cor_cl
        };

        let itot_dyn = sc.itot_st * cor_tot;
        let ia_dyn = cor_ia * sc.ia_st;
        let icl_dyn = itot_dyn - ia_dyn / sc.f_acl;

        let cor_e = (2.6 * cor_tot - 6.5) * cor_tot + 4.9;
        let im_dyn = (im_st * cor_e).min(IM_DYN_MAX);
        let rt_dyn = itot_dyn / im_dyn / LEWIS;

        Self {
            cor_cl,
            cor_ia,
            cor_tot,
            itot_dyn,
            icl_dyn,
            cor_e,
            im_dyn,
            rt_dyn,
        }
    }
}
