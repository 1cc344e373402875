//! Model variants and the algorithm choices they imply.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// ISO 7933 model variant.
///
/// - 1: ISO 7933 version 1 (metabolic-linear sweat ceiling)
/// - 2: ISO 7933 version 2 (fixed sweat ceiling)
/// - 3: as 1, with the modified core temperature prediction
/// - 4: as 2, with the modified core temperature prediction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    Iso1,
    Iso2,
    Iso1Modified,
    Iso2Modified,
}

/// How the sweat-rate ceiling is derived from the metabolic rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweatCeiling {
    /// `(Met - 32) * Adu`, clipped to [250, 400]
    MetabolicLinear,
    /// Fixed 400 W/m²
    Fixed,
}

/// Core temperature update strategy, selected once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreTempAlgorithm {
    /// Damped iteration on core temperature with a clamped linear mass fraction.
    Standard,
    /// Mean body temperature from heat storage, inverted for core temperature.
    Modified,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 4] = [
        ModelVariant::Iso1,
        ModelVariant::Iso2,
        ModelVariant::Iso1Modified,
        ModelVariant::Iso2Modified,
    ];

    /// Resolve a numeric variant code; 0 means "default" and maps to 1.
    pub fn from_code(code: i64) -> ModelResult<Self> {
        match code {
            0 | 1 => Ok(ModelVariant::Iso1),
            2 => Ok(ModelVariant::Iso2),
            3 => Ok(ModelVariant::Iso1Modified),
            4 => Ok(ModelVariant::Iso2Modified),
            other => Err(ModelError::InvalidModelVariant {
                variant: other as f64,
            }),
        }
    }

    /// Resolve the `sim_mod` parameter value. Fractional codes are rejected
    /// rather than rounded.
    pub fn from_param(value: f64) -> ModelResult<Self> {
        if value.fract() != 0.0 {
            return Err(ModelError::InvalidModelVariant { variant: value });
        }
        Self::from_code(value as i64)
    }

    pub fn code(self) -> u8 {
        match self {
            ModelVariant::Iso1 => 1,
            ModelVariant::Iso2 => 2,
            ModelVariant::Iso1Modified => 3,
            ModelVariant::Iso2Modified => 4,
        }
    }

    /// Short tag used in reference-example names.
    pub fn tag(self) -> &'static str {
        match self {
            ModelVariant::Iso1 => "s1",
            ModelVariant::Iso2 => "s2",
            ModelVariant::Iso1Modified => "s1m",
            ModelVariant::Iso2Modified => "s2m",
        }
    }

    pub fn sweat_ceiling(self) -> SweatCeiling {
        match self {
            ModelVariant::Iso1 | ModelVariant::Iso1Modified => SweatCeiling::MetabolicLinear,
            ModelVariant::Iso2 | ModelVariant::Iso2Modified => SweatCeiling::Fixed,
        }
    }

    pub fn core_algorithm(self) -> CoreTempAlgorithm {
        match self {
            ModelVariant::Iso1 | ModelVariant::Iso2 => CoreTempAlgorithm::Standard,
            ModelVariant::Iso1Modified | ModelVariant::Iso2Modified => CoreTempAlgorithm::Modified,
        }
    }
}
