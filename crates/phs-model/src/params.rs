//! Named input parameters, their documented ranges and the resolved
//! subject/environment records the constants layer consumes.

use crate::error::{ModelError, ModelResult};
use crate::variant::ModelVariant;
use phs_core::units::{Length, Mass, kg, m};
use serde::{Deserialize, Serialize};

/// Which constants group a parameter feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamLevel {
    /// Fixed for a whole run.
    Subject,
    /// May change between step blocks.
    Step,
}

/// Identifier of every bindable input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    Accl,
    Drink,
    Height,
    Mass,
    SimMod,
    Posture,
    Tair,
    PwAir,
    Trad,
    VAir,
    Met,
    Icl,
    ImSt,
    FAref,
    Fr,
    WalkDir,
    VWalk,
    Work,
    StepEnd,
}

/// Static description of one parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub level: ParamLevel,
    pub unit: &'static str,
    /// `None` for optional inputs that start unset.
    pub default: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub description: &'static str,
}

const fn spec(
    id: ParamId,
    name: &'static str,
    level: ParamLevel,
    unit: &'static str,
    default: Option<f64>,
    min: f64,
    max: f64,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        id,
        name,
        level,
        unit,
        default,
        min,
        max,
        description,
    }
}

use ParamLevel::{Step, Subject as Subj};

// Order must follow the `ParamId` discriminants.
const SPECS: [ParamSpec; 19] = [
    spec(
        ParamId::Accl,
        "accl",
        Subj,
        "%",
        Some(100.0),
        0.0,
        100.0,
        "Acclimatised subject 0 or 100",
    ),
    spec(
        ParamId::Drink,
        "drink",
        Subj,
        "",
        Some(1.0),
        0.0,
        1.0,
        "May drink freely, 0 or 1",
    ),
    spec(
        ParamId::Height,
        "height",
        Subj,
        "m",
        Some(1.8),
        1.5,
        2.4,
        "Body height",
    ),
    spec(
        ParamId::Mass,
        "mass",
        Subj,
        "kg",
        Some(75.0),
        0.0,
        120.0,
        "Body mass",
    ),
    spec(
        ParamId::SimMod,
        "sim_mod",
        Subj,
        "",
        Some(0.0),
        0.0,
        4.0,
        "Simulation model variant",
    ),
    spec(
        ParamId::Posture,
        "post",
        Step,
        "",
        Some(2.0),
        1.0,
        3.0,
        "1= sitting, 2= standing, 3= crouching",
    ),
    spec(
        ParamId::Tair,
        "Tair",
        Step,
        "C",
        Some(40.0),
        15.0,
        50.0,
        "Air temperature",
    ),
    spec(
        ParamId::PwAir,
        "Pw_air",
        Step,
        "kPa",
        Some(2.5),
        0.0,
        4.5,
        "Partial water vapour pressure",
    ),
    spec(
        ParamId::Trad,
        "Trad",
        Step,
        "C",
        Some(40.0),
        15.0,
        110.0,
        "Radiant temperature",
    ),
    spec(
        ParamId::VAir,
        "v_air",
        Step,
        "m/s",
        Some(0.3),
        0.0,
        3.0,
        "Air velocity",
    ),
    spec(
        ParamId::Met,
        "Met",
        Step,
        "W/m2",
        Some(150.0),
        100.0,
        400.0,
        "Metabolic energy production",
    ),
    spec(
        ParamId::Icl,
        "Icl",
        Step,
        "clo",
        Some(0.5),
        0.1,
        1.2,
        "Cloth static thermal insulation",
    ),
    spec(
        ParamId::ImSt,
        "im_st",
        Step,
        "",
        Some(0.38),
        0.0,
        1.0,
        "Static moisture permeability index",
    ),
    spec(
        ParamId::FAref,
        "fAref",
        Step,
        "",
        Some(0.54),
        0.0,
        1.0,
        "Fraction covered by reflective clothing",
    ),
    spec(
        ParamId::Fr,
        "Fr",
        Step,
        "",
        Some(0.97),
        0.0,
        1.0,
        "Emissivity reflective clothing",
    ),
    spec(
        ParamId::WalkDir,
        "walk_dir",
        Step,
        "degree",
        None,
        0.0,
        360.0,
        "Angle between wind and walking direction",
    ),
    spec(
        ParamId::VWalk,
        "v_walk",
        Step,
        "m/s",
        None,
        0.0,
        1.2,
        "Walking speed",
    ),
    spec(
        ParamId::Work,
        "work",
        Step,
        "W/m2",
        Some(0.0),
        0.0,
        200.0,
        "Mechanical power",
    ),
    spec(
        ParamId::StepEnd,
        "timestep",
        Step,
        "min",
        Some(30.0),
        1.0,
        480.0,
        "Time when the next step ends",
    ),
];

impl ParamId {
    pub const ALL: [ParamId; 19] = [
        ParamId::Accl,
        ParamId::Drink,
        ParamId::Height,
        ParamId::Mass,
        ParamId::SimMod,
        ParamId::Posture,
        ParamId::Tair,
        ParamId::PwAir,
        ParamId::Trad,
        ParamId::VAir,
        ParamId::Met,
        ParamId::Icl,
        ParamId::ImSt,
        ParamId::FAref,
        ParamId::Fr,
        ParamId::WalkDir,
        ParamId::VWalk,
        ParamId::Work,
        ParamId::StepEnd,
    ];

    pub fn spec(self) -> &'static ParamSpec {
        &SPECS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn level(self) -> ParamLevel {
        self.spec().level
    }

    /// Look up a parameter by its binding name. `weight` is accepted for `mass`.
    pub fn from_name(name: &str) -> ModelResult<ParamId> {
        if name == "weight" {
            return Ok(ParamId::Mass);
        }
        SPECS
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.id)
            .ok_or_else(|| ModelError::UnknownParameter {
                name: name.to_string(),
            })
    }
}

/// What to do with values outside the documented parameter range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Store the value as given.
    #[default]
    PassThrough,
    /// Clamp into `[min, max]`.
    Clamp,
    /// Refuse the value with `OutOfRange`.
    Reject,
}

impl RangePolicy {
    pub fn apply(self, spec: &ParamSpec, value: f64) -> ModelResult<f64> {
        let value = phs_core::ensure_finite(value, spec.name)?;
        match self {
            RangePolicy::PassThrough => Ok(value),
            RangePolicy::Clamp => Ok(value.clamp(spec.min, spec.max)),
            RangePolicy::Reject => {
                if value < spec.min || value > spec.max {
                    Err(ModelError::OutOfRange {
                        name: spec.name,
                        value,
                        min: spec.min,
                        max: spec.max,
                    })
                } else {
                    Ok(value)
                }
            }
        }
    }
}

/// Raw storage of every parameter value; `None` is the unset sentinel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    values: [Option<f64>; 19],
}

impl ParameterSet {
    /// Every parameter unset.
    pub fn unset() -> Self {
        Self::default()
    }

    /// Every parameter at its documented default (optional inputs unset).
    pub fn with_defaults() -> Self {
        let mut set = Self::default();
        for id in ParamId::ALL {
            set.values[id as usize] = id.spec().default;
        }
        set
    }

    pub fn get(&self, id: ParamId) -> Option<f64> {
        self.values[id as usize]
    }

    /// Store a value, normalizing the two flag-like subject inputs.
    pub fn store(&mut self, id: ParamId, value: Option<f64>) {
        let value = value.map(|v| match id {
            ParamId::Accl => {
                if v == 0.0 {
                    0.0
                } else {
                    100.0
                }
            }
            ParamId::Drink => {
                if v == 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            _ => v,
        });
        self.values[id as usize] = value;
    }

    fn require(&self, id: ParamId) -> ModelResult<f64> {
        self.get(id)
            .ok_or(ModelError::MissingParameter { name: id.name() })
    }

    /// Resolve the subject record. Fails on unset inputs or an unknown variant.
    pub fn subject(&self) -> ModelResult<Subject> {
        let variant = ModelVariant::from_param(self.require(ParamId::SimMod)?)?;
        Ok(Subject {
            accl: self.require(ParamId::Accl)?,
            drink: self.require(ParamId::Drink)? != 0.0,
            height_m: self.require(ParamId::Height)?,
            mass_kg: self.require(ParamId::Mass)?,
            variant,
        })
    }

    /// Resolve the environment record of the current step block.
    pub fn environment(&self) -> ModelResult<Environment> {
        Ok(Environment {
            posture: Posture::from_code(self.require(ParamId::Posture)?),
            t_air: self.require(ParamId::Tair)?,
            pw_air: self.require(ParamId::PwAir)?,
            t_rad: self.require(ParamId::Trad)?,
            v_air: self.require(ParamId::VAir)?,
            met: self.require(ParamId::Met)?,
            icl: self.require(ParamId::Icl)?,
            im_st: self.require(ParamId::ImSt)?,
            f_aref: self.require(ParamId::FAref)?,
            fr: self.require(ParamId::Fr)?,
            walk_dir: self.get(ParamId::WalkDir),
            v_walk: self.get(ParamId::VWalk),
            work: self.require(ParamId::Work)?,
            step_end: self.require(ParamId::StepEnd)?,
        })
    }
}

/// Working posture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Posture {
    Sitting,
    Standing,
    Crouching,
    Unrecognized,
}

impl Posture {
    /// Exact code match; anything else, fractional codes included, is
    /// unrecognized.
    pub fn from_code(code: f64) -> Self {
        if code == 1.0 {
            Posture::Sitting
        } else if code == 2.0 {
            Posture::Standing
        } else if code == 3.0 {
            Posture::Crouching
        } else {
            Posture::Unrecognized
        }
    }

    pub fn code(self) -> f64 {
        match self {
            Posture::Sitting => 1.0,
            Posture::Standing => 2.0,
            Posture::Crouching => 3.0,
            Posture::Unrecognized => 0.0,
        }
    }

    /// Fraction of the body surface exchanging radiation.
    pub fn radiating_fraction(self) -> f64 {
        match self {
            Posture::Sitting => 0.7,
            Posture::Standing => 0.77,
            Posture::Crouching => 0.67,
            Posture::Unrecognized => 0.7,
        }
    }
}

/// Subject inputs, fixed for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Subject {
    /// Acclimatization, 0 or 100 %.
    pub accl: f64,
    pub drink: bool,
    pub height_m: f64,
    pub mass_kg: f64,
    pub variant: ModelVariant,
}

impl Subject {
    pub fn is_acclimatized(&self) -> bool {
        self.accl >= 50.0
    }

    pub fn height(&self) -> Length {
        m(self.height_m)
    }

    pub fn mass(&self) -> Mass {
        kg(self.mass_kg)
    }
}

/// Environment and activity inputs of one step block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub posture: Posture,
    /// Air temperature (°C)
    pub t_air: f64,
    /// Partial water vapour pressure (kPa)
    pub pw_air: f64,
    /// Mean radiant temperature (°C)
    pub t_rad: f64,
    /// Air velocity (m/s)
    pub v_air: f64,
    /// Metabolic rate (W/m²)
    pub met: f64,
    /// Static clothing insulation (clo)
    pub icl: f64,
    pub im_st: f64,
    pub f_aref: f64,
    pub fr: f64,
    /// Angle between wind and walking direction (degree)
    pub walk_dir: Option<f64>,
    /// Walking speed (m/s)
    pub v_walk: Option<f64>,
    /// Mechanical power (W/m²)
    pub work: f64,
    /// End time of the step block (min)
    pub step_end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_follow_id_order() {
        for id in ParamId::ALL {
            assert_eq!(id.spec().id, id);
        }
    }

    #[test]
    fn name_lookup_and_alias() {
        assert_eq!(ParamId::from_name("Tair").unwrap(), ParamId::Tair);
        assert_eq!(ParamId::from_name("timestep").unwrap(), ParamId::StepEnd);
        assert_eq!(ParamId::from_name("weight").unwrap(), ParamId::Mass);
        assert!(matches!(
            ParamId::from_name("Tskin"),
            Err(ModelError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn levels() {
        assert_eq!(ParamId::Height.level(), ParamLevel::Subject);
        assert_eq!(ParamId::SimMod.level(), ParamLevel::Subject);
        assert_eq!(ParamId::Icl.level(), ParamLevel::Step);
        assert_eq!(ParamId::StepEnd.level(), ParamLevel::Step);
    }

    #[test]
    fn flag_inputs_are_normalized() {
        let mut set = ParameterSet::unset();
        set.store(ParamId::Accl, Some(50.0));
        set.store(ParamId::Drink, Some(7.0));
        assert_eq!(set.get(ParamId::Accl), Some(100.0));
        assert_eq!(set.get(ParamId::Drink), Some(1.0));
        set.store(ParamId::Accl, Some(0.0));
        assert_eq!(set.get(ParamId::Accl), Some(0.0));
    }

    #[test]
    fn range_policies() {
        let spec = ParamId::Tair.spec();
        assert_eq!(RangePolicy::PassThrough.apply(spec, 60.0).unwrap(), 60.0);
        assert_eq!(RangePolicy::Clamp.apply(spec, 60.0).unwrap(), 50.0);
        assert_eq!(RangePolicy::Clamp.apply(spec, 5.0).unwrap(), 15.0);
        assert!(matches!(
            RangePolicy::Reject.apply(spec, 60.0),
            Err(ModelError::OutOfRange { name: "Tair", .. })
        ));
        assert_eq!(RangePolicy::Reject.apply(spec, 35.0).unwrap(), 35.0);
        assert!(RangePolicy::PassThrough.apply(spec, f64::NAN).is_err());
    }

    #[test]
    fn defaults_resolve_to_records() {
        let set = ParameterSet::with_defaults();
        let subject = set.subject().unwrap();
        assert_eq!(subject.variant, ModelVariant::Iso1);
        assert!(subject.drink);
        assert!(subject.is_acclimatized());
        let env = set.environment().unwrap();
        assert_eq!(env.posture, Posture::Standing);
        assert_eq!(env.v_walk, None);
        assert_eq!(env.walk_dir, None);
    }

    #[test]
    fn unset_parameters_are_reported() {
        let set = ParameterSet::unset();
        assert!(matches!(
            set.environment(),
            Err(ModelError::MissingParameter { name: "post" })
        ));
    }

    #[test]
    fn unrecognized_posture_uses_sitting_fraction() {
        assert_eq!(Posture::from_code(7.0), Posture::Unrecognized);
        assert_eq!(Posture::from_code(2.4), Posture::Unrecognized);
        assert_eq!(Posture::from_code(2.0), Posture::Standing);
        assert_eq!(Posture::Unrecognized.radiating_fraction(), 0.7);
    }
}
