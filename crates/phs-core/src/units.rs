// phs-core/src/units.rs

use uom::si::f64::{
    Length as UomLength, Mass as UomMass, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn grams(v: f64) -> Mass {
    use uom::si::mass::gram;
    Mass::new::<gram>(v)
}

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

// Accessors back into the working units of the PHS regressions.

#[inline]
pub fn as_degc(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn as_kpa(p: Pressure) -> f64 {
    use uom::si::pressure::kilopascal;
    p.get::<kilopascal>()
}

#[inline]
pub fn as_mps(v: Velocity) -> f64 {
    use uom::si::velocity::meter_per_second;
    v.get::<meter_per_second>()
}

#[inline]
pub fn as_m(l: Length) -> f64 {
    use uom::si::length::meter;
    l.get::<meter>()
}

#[inline]
pub fn as_kg(mass: Mass) -> f64 {
    use uom::si::mass::kilogram;
    mass.get::<kilogram>()
}

#[inline]
pub fn as_grams(mass: Mass) -> f64 {
    use uom::si::mass::gram;
    mass.get::<gram>()
}

#[inline]
pub fn as_minutes(t: Time) -> f64 {
    use uom::si::time::minute;
    t.get::<minute>()
}

pub mod constants {
    /// Stefan-Boltzmann constant as used by ISO 7933 (W/m²K⁴).
    pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

    /// Offset between °C and K used by the radiation terms.
    pub const CELSIUS_TO_KELVIN: f64 = 273.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _t = degc(37.0);
        let _p = kpa(2.5);
        let _v = mps(0.3);
        let _l = m(1.8);
        let _w = kg(75.0);
        let _g = grams(6168.0);
        let _d = minutes(480.0);
    }

    #[test]
    fn accessors_round_trip_working_units() {
        assert!((as_degc(degc(36.8)) - 36.8).abs() < 1e-9);
        assert!((as_kpa(kpa(4.5)) - 4.5).abs() < 1e-12);
        assert!((as_mps(mps(1.2)) - 1.2).abs() < 1e-12);
        assert!((as_m(m(1.75)) - 1.75).abs() < 1e-12);
        assert!((as_grams(kg(75.0)) - 75_000.0).abs() < 1e-9);
        assert!((as_minutes(minutes(480.0)) - 480.0).abs() < 1e-9);
    }
}
