//! Read-only projections of a run.

use crate::variant::ModelVariant;
use phs_core::units::{Mass, Temperature, Time, degc, grams, minutes};
use serde::Serialize;

/// Per-minute state for presentation and export.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Current time (min)
    pub time: u32,
    pub step_start: u32,
    pub step_end: f64,
    /// Filtered required core temperature (°C)
    pub t_cr_req: f64,
    pub t_sk: f64,
    /// Water loss this minute (g)
    pub sw_g: f64,
    /// Cumulative water loss (g)
    pub sw_tot_g: f64,
    pub t_cr: f64,
    pub t_re: f64,
    pub t_cl: f64,
    /// Water loss rate (W/m²)
    pub sw: f64,
    pub e_pre: f64,
    pub sw_req: f64,
    pub sw_max: f64,
}

impl Snapshot {
    pub fn elapsed(&self) -> Time {
        minutes(self.time as f64)
    }

    pub fn rectal_temperature(&self) -> Temperature {
        degc(self.t_re)
    }

    pub fn skin_temperature(&self) -> Temperature {
        degc(self.t_sk)
    }

    pub fn total_water_loss(&self) -> Mass {
        grams(self.sw_tot_g)
    }
}

/// End-of-block result. Markers are `None` while their limit is not reached.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResultSnapshot {
    pub time: u32,
    /// Rectal temperature (°C)
    pub t_re: f64,
    /// Cumulative water loss (g)
    pub sw_tot_g: f64,
    /// Time the rectal temperature reached 38 °C (min)
    pub d_lim_t_re: Option<u32>,
    /// Time the water loss reached the 50th percentile threshold (min)
    pub d_lim_loss_50: Option<u32>,
    /// Time the water loss reached the 95th percentile threshold (min)
    pub d_lim_loss_95: Option<u32>,
}

impl ResultSnapshot {
    pub fn rectal_temperature(&self) -> Temperature {
        degc(self.t_re)
    }

    pub fn total_water_loss(&self) -> Mass {
        grams(self.sw_tot_g)
    }

    /// Limit times with unreached markers replaced by `end`, the way
    /// reference tables report them.
    pub fn limits_or(&self, end: u32) -> [u32; 3] {
        [
            self.d_lim_t_re.unwrap_or(end),
            self.d_lim_loss_50.unwrap_or(end),
            self.d_lim_loss_95.unwrap_or(end),
        ]
    }
}

/// Every intermediate quantity of the last computed minute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Diagnostics {
    pub time: u32,
    pub variant: ModelVariant,
    pub t_cr_req_ss: f64,
    pub t_cr_req: f64,
    pub d_sto_req: f64,
    pub t_sk: f64,
    pub p_sk: f64,
    pub v_air_rel: f64,
    pub cor_cl: f64,
    pub cor_ia: f64,
    pub cor_tot: f64,
    pub itot_dyn: f64,
    pub icl_dyn: f64,
    pub cor_e: f64,
    pub rt_dyn: f64,
    pub hc_dyn: f64,
    pub f_acl_rad: f64,
    pub t_cl: f64,
    pub h_r: f64,
    pub conv: f64,
    pub rad: f64,
    pub e_req: f64,
    pub e_max: f64,
    pub w_req: f64,
    pub sw_pre: f64,
    pub w_pre: f64,
    pub e_pre: f64,
    pub sk_cr_rel: f64,
    pub t_cr: f64,
    pub t_re: f64,
    pub sw_tot: f64,
    pub sw_tot_g: f64,
    /// Clothing surface temperature iterations
    pub clothing_iterations: usize,
    /// Core temperature iterations
    pub core_iterations: usize,
}
