//! Required and predicted sweat rate, skin wettedness and evaporation.

use crate::filter::ExpLag;

/// Required wettedness above which the sweat ceiling is used directly.
pub const W_REQ_MAX: f64 = 1.7;

/// Inputs of the sweat computation for one minute.
#[derive(Clone, Copy, Debug)]
pub struct SweatDrive {
    /// Required evaporation (W/m²)
    pub e_req: f64,
    /// Saturated vapour pressure at skin temperature (kPa)
    pub p_sk: f64,
    /// Ambient partial vapour pressure (kPa)
    pub pw_air: f64,
    /// Dynamic evaporative resistance (m²kPa/W)
    pub rt_dyn: f64,
    /// Sweat rate ceiling (W/m²)
    pub sw_max: f64,
    /// Maximum skin wettedness
    pub w_max: f64,
}

/// Sweat response of one minute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweatResponse {
    /// Required evaporation, floored at zero (W/m²)
    pub e_req: f64,
    /// Maximum evaporative capacity, floored at zero when sweating (W/m²)
    pub e_max: f64,
    pub w_req: f64,
    /// Evaporative efficiency at the required wettedness
    pub eff_req: f64,
    pub sw_req: f64,
    pub sw_pre: f64,
    pub w_pre: f64,
    pub e_pre: f64,
}

/// Sweating efficiency at required wettedness `w`.
pub fn evaporative_efficiency(w: f64) -> f64 {
    if w > 1.0 {
        (2.0 - w) * (2.0 - w) / 2.0
    } else {
        1.0 - w * w / 2.0
    }
}

/// Predicted wettedness for capacity/sweat ratio `k`, before the `w_max` clip.
pub fn predicted_wettedness(k: f64) -> f64 {
    if k >= 0.5 {
        -k + (k * k + 2.0).sqrt()
    } else {
        1.0
    }
}

impl SweatResponse {
    pub fn compute(drive: &SweatDrive, prev_sw_pre: f64, lag: &ExpLag) -> Self {
        let mut e_req = drive.e_req;
        let mut e_max = (drive.p_sk - drive.pw_air) / drive.rt_dyn;
        let mut w_req = 0.0;
        let mut eff_req = f64::NAN;

        let sw_req = if e_req <= 0.0 {
            e_req = 0.0;
            0.0
        } else if e_max <= 0.0 {
            e_max = 0.0;
            w_req = W_REQ_MAX;
            drive.sw_max
        } else {
            w_req = e_req / e_max;
            if w_req >= W_REQ_MAX {
                w_req = W_REQ_MAX;
                drive.sw_max
            } else {
                eff_req = evaporative_efficiency(w_req);
                (e_req / eff_req).min(drive.sw_max)
            }
        };

        let mut sw_pre = lag.step(prev_sw_pre, sw_req);
        let (w_pre, e_pre) = if sw_pre <= 0.0 {
            sw_pre = 0.0;
            (0.0, 0.0)
        } else {
            let w = predicted_wettedness(e_max / sw_pre).min(drive.w_max);
            (w, w * e_max)
        };

        Self {
            e_req,
            e_max,
            w_req,
            eff_req,
            sw_req,
            sw_pre,
            w_pre,
            e_pre,
        }
    }
}
