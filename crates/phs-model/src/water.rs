//! Water loss accounting.

/// Conversion factor from W·min/m² of evaporated water to grams for a body
/// surface area `adu` (m²).
pub fn grams_per_unit(adu: f64) -> f64 {
    2.67 * adu / 1.8 / 60.0
}

/// Water loss of one minute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterLoss {
    /// Sweat plus respiratory water loss rate (W/m²)
    pub sw: f64,
    pub sw_g: f64,
    pub sw_tot: f64,
    pub sw_tot_g: f64,
}

impl WaterLoss {
    pub fn accumulate(sw_pre: f64, e_resp: f64, prev_sw_tot: f64, adu: f64) -> Self {
        let sw = sw_pre + e_resp;
        let sw_tot = prev_sw_tot + sw;
        let k = grams_per_unit(adu);
        Self {
            sw,
            sw_g: sw * k,
            sw_tot,
            sw_tot_g: sw_tot * k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate() {
        let a = WaterLoss::accumulate(200.0, 10.0, 0.0, 1.8);
        assert_eq!(a.sw, 210.0);
        assert_eq!(a.sw_tot, 210.0);
        let b = WaterLoss::accumulate(200.0, 10.0, a.sw_tot, 1.8);
        assert_eq!(b.sw_tot, 420.0);
        assert!((b.sw_tot_g - 420.0 * 2.67 / 60.0).abs() < 1e-9);
        assert!((a.sw_g - 210.0 * grams_per_unit(1.8)).abs() < 1e-12);
    }
}
