//! Scenario file schema.

use phs_model::{ParamId, SimConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub subject: SubjectDef,
    #[serde(default)]
    pub steps: Vec<StepDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SimConfig>,
}

/// Subject inputs, fixed for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubjectDef {
    /// Acclimatization (%), 0 or 100
    pub accl: f64,
    pub drink: bool,
    /// Height (m)
    pub height: f64,
    /// Body mass (kg)
    #[serde(alias = "weight")]
    pub mass: f64,
    /// Model variant 1-4
    pub model: u8,
}

impl Default for SubjectDef {
    fn default() -> Self {
        Self {
            accl: 100.0,
            drink: true,
            height: 1.8,
            mass: 75.0,
            model: 1,
        }
    }
}

impl SubjectDef {
    pub fn params(&self) -> Vec<(ParamId, f64)> {
        vec![
            (ParamId::Accl, self.accl),
            (ParamId::Drink, if self.drink { 1.0 } else { 0.0 }),
            (ParamId::Height, self.height),
            (ParamId::Mass, self.mass),
            (ParamId::SimMod, f64::from(self.model)),
        ]
    }
}

/// One step block. Unset values carry over from the previous block, or
/// start at the documented parameter defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepDef {
    /// End time of the block (min)
    pub end_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_air: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pw_air: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_rad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_air: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub met: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im_st: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_aref: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_dir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_walk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<f64>,
}

impl StepDef {
    /// Parameter assignments of this block, end time included.
    pub fn params(&self) -> Vec<(ParamId, f64)> {
        let fields = [
            (ParamId::Posture, self.posture),
            (ParamId::Tair, self.t_air),
            (ParamId::PwAir, self.pw_air),
            (ParamId::Trad, self.t_rad),
            (ParamId::VAir, self.v_air),
            (ParamId::Met, self.met),
            (ParamId::Icl, self.icl),
            (ParamId::ImSt, self.im_st),
            (ParamId::FAref, self.f_aref),
            (ParamId::Fr, self.fr),
            (ParamId::WalkDir, self.walk_dir),
            (ParamId::VWalk, self.v_walk),
            (ParamId::Work, self.work),
        ];
        let mut params: Vec<(ParamId, f64)> = fields
            .into_iter()
            .filter_map(|(id, v)| v.map(|v| (id, v)))
            .collect();
        params.push((ParamId::StepEnd, self.end_min));
        params
    }
}

/// Reference values at the end of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpectedDef {
    /// Rectal temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_re: Option<f64>,
    /// Time of the rectal temperature limit (min)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_t_re: Option<f64>,
    /// Cumulative water loss (g)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_tot_g: Option<f64>,
    /// Time of the 50th percentile water loss limit (min)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwl50: Option<f64>,
    /// Time of the 95th percentile water loss limit (min)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwl95: Option<f64>,
}
