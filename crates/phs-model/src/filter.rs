//! Discrete first-order lag used for thermal inertia.
//!
//! Over one-minute ticks a first-order response with time constant `tau`
//! reduces to `y = y_prev * c + target * (1 - c)` with `c = exp(-1 / tau)`.

/// First-order exponential lag with a fixed one-minute decay factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpLag {
    /// Decay factor `exp(-1 / tau)`, in (0, 1)
    pub decay: f64,
}

impl ExpLag {
    /// Lag with time constant `tau_min` minutes.
    pub fn from_time_constant(tau_min: f64) -> Self {
        Self {
            decay: (-1.0 / tau_min).exp(),
        }
    }

    /// Advance one minute towards `target`.
    pub fn step(&self, previous: f64, target: f64) -> f64 {
        previous * self.decay + target * (1.0 - self.decay)
    }
}
