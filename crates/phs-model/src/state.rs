//! Mutable physiological state of one run.

/// Body temperatures and the skin/core mass fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalState {
    /// Core temperature (°C)
    pub t_cr: f64,
    /// Rectal temperature (°C)
    pub t_re: f64,
    /// Mean skin temperature (°C)
    pub t_sk: f64,
    /// Clothing surface temperature (°C), NaN before the first minute
    pub t_cl: f64,
    /// Mean body temperature (°C), advanced by the modified core algorithm
    pub t_bm: f64,
    /// Filtered required core temperature (°C)
    pub t_cr_req: f64,
    /// Fraction of body mass at the mean of skin and core temperature
    pub sk_cr_rel: f64,
}

impl ThermalState {
    /// Baseline at the start of a run.
    pub fn initial() -> Self {
        Self {
            t_cr: 36.8,
            t_re: 36.8,
            t_sk: 34.1,
            t_cl: f64::NAN,
            t_bm: 36.39488,
            t_cr_req: 36.8,
            sk_cr_rel: 0.3,
        }
    }
}

/// Shadow copies of the state at the end of the previous minute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviousMinute {
    pub t_bm: f64,
    pub t_re: f64,
    pub t_cr: f64,
    pub t_cr_req: f64,
    pub sk_cr_rel: f64,
    pub t_sk: f64,
}

impl PreviousMinute {
    pub fn capture(t: &ThermalState) -> Self {
        Self {
            t_bm: t.t_bm,
            t_re: t.t_re,
            t_cr: t.t_cr,
            t_cr_req: t.t_cr_req,
            sk_cr_rel: t.sk_cr_rel,
            t_sk: t.t_sk,
        }
    }
}

/// Sweat production and water loss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweatState {
    /// Required sweat rate (W/m²)
    pub sw_req: f64,
    /// Predicted sweat rate (W/m²)
    pub sw_pre: f64,
    /// Water loss rate this minute, sweat plus respiration (W/m²)
    pub sw: f64,
    /// Water loss this minute (g)
    pub sw_g: f64,
    /// Cumulative water loss (W·min/m²)
    pub sw_tot: f64,
    /// Cumulative water loss (g)
    pub sw_tot_g: f64,
    /// Required skin wettedness, in [0, 1.7]
    pub w_req: f64,
    /// Predicted skin wettedness, in [0, w_max]
    pub w_pre: f64,
    /// Predicted evaporative heat flow (W/m²)
    pub e_pre: f64,
}

impl SweatState {
    pub fn initial() -> Self {
        Self {
            sw_req: f64::NAN,
            sw_pre: 0.0,
            sw: f64::NAN,
            sw_g: f64::NAN,
            sw_tot: 0.0,
            sw_tot_g: 0.0,
            w_req: f64::NAN,
            w_pre: f64::NAN,
            e_pre: f64::NAN,
        }
    }
}

/// Write-once first-crossing times (minutes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitMarkers {
    /// Rectal temperature reached 38 °C
    pub rectal: Option<u32>,
    /// Water loss reached the 50th percentile threshold
    pub water_loss_50: Option<u32>,
    /// Water loss reached the 95th percentile threshold
    pub water_loss_95: Option<u32>,
}

impl LimitMarkers {
    /// Latch `time` into `slot` when `reached` and the slot is still empty.
    /// Returns true when this call set the marker.
    pub fn latch(slot: &mut Option<u32>, reached: bool, time: u32) -> bool {
        if reached && slot.is_none() {
            *slot = Some(time);
            true
        } else {
            false
        }
    }
}

/// Simulation clock in whole minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    pub now: u32,
    pub step_start: u32,
}

impl Clock {
    pub fn tick(&mut self) -> u32 {
        self.now += 1;
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_is_write_once() {
        let mut m = LimitMarkers::default();
        assert!(!LimitMarkers::latch(&mut m.rectal, false, 3));
        assert_eq!(m.rectal, None);
        assert!(LimitMarkers::latch(&mut m.rectal, true, 4));
        assert!(!LimitMarkers::latch(&mut m.rectal, true, 9));
        assert_eq!(m.rectal, Some(4));
    }

    #[test]
    fn clock_ticks_by_one() {
        let mut c = Clock::default();
        assert_eq!(c.tick(), 1);
        assert_eq!(c.tick(), 2);
        assert_eq!(c.step_start, 0);
    }

    #[test]
    fn shadow_capture_copies_state() {
        let t = ThermalState::initial();
        let p = PreviousMinute::capture(&t);
        assert_eq!(p.t_cr, 36.8);
        assert_eq!(p.t_sk, 34.1);
        assert_eq!(p.sk_cr_rel, 0.3);
    }
}
