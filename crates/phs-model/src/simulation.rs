//! Simulation lifecycle: parameter binding, lazy constants, stepping and
//! read-only projections.

use crate::config::SimConfig;
use crate::constants::{StepConstants, SubjectConstants};
use crate::error::{ModelError, ModelResult};
use crate::freshness::{ConstantsTracker, Freshness};
use crate::params::{Environment, ParamId, ParamLevel, ParameterSet, Subject};
use crate::snapshot::{Diagnostics, ResultSnapshot, Snapshot};
use crate::step::{RunState, StepInputs, advance};
use crate::variant::CoreTempAlgorithm;
use phs_core::units::{
    Length, Mass, Pressure, Temperature, Time, Velocity, as_degc, as_kg, as_kpa, as_m,
    as_minutes, as_mps,
};
use tracing::{debug, info};

/// Lifecycle phase of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    Uninitialized,
    Initialized,
    Stepping,
}

/// One isolated heat-strain run.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimConfig,
    params: ParameterSet,
    tracker: ConstantsTracker,
    subject: Option<(Subject, SubjectConstants)>,
    step: Option<(Environment, StepConstants)>,
    algorithm: CoreTempAlgorithm,
    state: RunState,
    phase: EnginePhase,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulation {
    /// Create a simulation with every parameter unset.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            params: ParameterSet::unset(),
            tracker: ConstantsTracker::new(),
            subject: None,
            step: None,
            algorithm: CoreTempAlgorithm::Standard,
            state: RunState::initial(),
            phase: EnginePhase::Uninitialized,
        }
    }

    /// Create a simulation with every parameter at its documented default.
    pub fn with_defaults(config: SimConfig) -> Self {
        let mut sim = Self::new(config);
        sim.load_defaults();
        sim
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn freshness(&self) -> (Freshness, Freshness) {
        (self.tracker.subject(), self.tracker.step())
    }

    pub fn algorithm(&self) -> CoreTempAlgorithm {
        self.algorithm
    }

    /// Current time (min).
    pub fn time(&self) -> u32 {
        self.state.clock.now
    }

    /// End of the current step block (min), NaN while unset.
    pub fn step_end(&self) -> f64 {
        self.params.get(ParamId::StepEnd).unwrap_or(f64::NAN)
    }

    /// Whether the clock has reached the end of the current step block.
    pub fn is_step_complete(&self) -> bool {
        f64::from(self.time()) >= self.step_end()
    }

    pub fn subject_constants(&self) -> Option<&SubjectConstants> {
        self.subject.as_ref().map(|(_, c)| c)
    }

    pub fn step_constants(&self) -> Option<&StepConstants> {
        self.step.as_ref().map(|(_, c)| c)
    }

    /// Clear every parameter, constant and state value.
    pub fn reset(&mut self) {
        debug!("reset simulation");
        self.params = ParameterSet::unset();
        self.tracker = ConstantsTracker::new();
        self.subject = None;
        self.step = None;
        self.algorithm = CoreTempAlgorithm::Standard;
        self.state = RunState::initial();
        self.phase = EnginePhase::Uninitialized;
    }

    /// Fill every parameter with its documented default.
    pub fn load_defaults(&mut self) {
        self.params = ParameterSet::with_defaults();
        self.tracker.subject_input_changed();
        self.tracker.step_input_changed();
    }

    pub fn param(&self, id: ParamId) -> Option<f64> {
        self.params.get(id)
    }

    /// Set a parameter through the configured range policy and mark the
    /// constants group it feeds stale.
    pub fn set_param(&mut self, id: ParamId, value: f64) -> ModelResult<()> {
        let value = self.config.range_policy.apply(id.spec(), value)?;
        self.store(id, Some(value));
        Ok(())
    }

    /// Unset an optional parameter (walking speed or direction).
    pub fn clear_param(&mut self, id: ParamId) {
        self.store(id, None);
    }

    pub fn set_param_by_name(&mut self, name: &str, value: f64) -> ModelResult<()> {
        self.set_param(ParamId::from_name(name)?, value)
    }

    /// Set height and mass from typed quantities.
    pub fn set_body_size(&mut self, height: Length, mass: Mass) -> ModelResult<()> {
        self.set_param(ParamId::Height, as_m(height))?;
        self.set_param(ParamId::Mass, as_kg(mass))
    }

    /// Set the climate of the current step block from typed quantities.
    pub fn set_climate(
        &mut self,
        t_air: Temperature,
        t_rad: Temperature,
        pw_air: Pressure,
        v_air: Velocity,
    ) -> ModelResult<()> {
        self.set_param(ParamId::Tair, as_degc(t_air))?;
        self.set_param(ParamId::Trad, as_degc(t_rad))?;
        self.set_param(ParamId::PwAir, as_kpa(pw_air))?;
        self.set_param(ParamId::VAir, as_mps(v_air))
    }

    /// Set the walking speed; the direction (degrees) stays optional.
    pub fn set_walking(&mut self, speed: Velocity, direction: Option<f64>) -> ModelResult<()> {
        self.set_param(ParamId::VWalk, as_mps(speed))?;
        match direction {
            Some(angle) => self.set_param(ParamId::WalkDir, angle),
            None => {
                self.clear_param(ParamId::WalkDir);
                Ok(())
            }
        }
    }

    /// Set the end of the current step block.
    pub fn set_step_end(&mut self, end: Time) -> ModelResult<()> {
        self.set_param(ParamId::StepEnd, as_minutes(end))
    }

    fn store(&mut self, id: ParamId, value: Option<f64>) {
        self.params.store(id, value);
        let previous = match id.level() {
            ParamLevel::Subject => self.tracker.subject_input_changed(),
            ParamLevel::Step => self.tracker.step_input_changed(),
        };
        if previous == Freshness::Clean && self.phase != EnginePhase::Uninitialized {
            debug!(param = id.name(), ?value, "parameter changed");
        }
    }

    /// Recompute the run-fixed constants, then the step constants.
    ///
    /// Subject inputs are fixed once the run is stepping: this fails with
    /// `StaleSubjectParameters` then, and only `initialize` starts over.
    pub fn recompute_subject_constants(&mut self) -> ModelResult<()> {
        if self.phase == EnginePhase::Stepping {
            return Err(ModelError::StaleSubjectParameters);
        }
        self.compute_subject_constants()
    }

    fn compute_subject_constants(&mut self) -> ModelResult<()> {
        let subject = self.params.subject()?;
        let constants = SubjectConstants::compute(&subject);
        debug!(
            variant = subject.variant.tag(),
            adu = constants.adu,
            sp_heat = constants.sp_heat,
            w_max = constants.w_max,
            "subject constants recomputed"
        );
        self.subject = Some((subject, constants));
        self.algorithm = subject.variant.core_algorithm();
        self.tracker.subject_recomputed();
        self.recompute_step_constants()
    }

    /// Recompute the constants of the current step block.
    pub fn recompute_step_constants(&mut self) -> ModelResult<()> {
        let Some((subject, sc)) = self.subject else {
            return self.compute_subject_constants();
        };
        let env = self.params.environment()?;
        let constants = StepConstants::compute(&subject, &sc, &env);
        debug!(
            sw_max = constants.sw_max,
            tcreq_ss = constants.tcreq_ss,
            v_air_rel = constants.motion.v_air_rel,
            "step constants recomputed"
        );
        self.step = Some((env, constants));
        self.tracker.step_recomputed();
        Ok(())
    }

    /// Start a new run from the baseline state.
    pub fn initialize(&mut self) -> ModelResult<()> {
        self.compute_subject_constants()?;
        let Some((subject, _)) = self.subject else {
            return Err(ModelError::NotInitialized);
        };
        self.state = RunState::initial();
        self.phase = EnginePhase::Initialized;
        debug!(
            variant = subject.variant.tag(),
            algorithm = ?self.algorithm,
            "simulation initialized"
        );
        Ok(())
    }

    /// Begin a new step block at the current time.
    pub fn mark_step_start(&mut self) {
        self.state.clock.step_start = self.state.clock.now;
        debug!(time = self.state.clock.now, "step block started");
    }

    /// Advance the run by one minute.
    pub fn advance_one_minute(&mut self) -> ModelResult<Snapshot> {
        if self.phase == EnginePhase::Uninitialized {
            return Err(ModelError::NotInitialized);
        }
        if self.tracker.subject().is_stale() {
            return Err(ModelError::StaleSubjectParameters);
        }
        if self.tracker.step().is_stale() {
            self.recompute_step_constants()?;
        }
        let (Some((subject, sc)), Some((env, step))) = (&self.subject, &self.step) else {
            return Err(ModelError::NotInitialized);
        };

        let inputs = StepInputs {
            subject,
            subject_constants: sc,
            env,
            step_constants: step,
            algorithm: self.algorithm,
            config: &self.config,
        };
        let latched = advance(&mut self.state, &inputs)?;
        self.phase = EnginePhase::Stepping;

        let now = self.state.clock.now;
        if latched.rectal {
            info!(time = now, t_re = self.state.thermal.t_re, "rectal temperature limit reached");
        }
        if latched.water_loss_50 {
            info!(
                time = now,
                sw_tot_g = self.state.sweat.sw_tot_g,
                "water loss limit (50%) reached"
            );
        }
        if latched.water_loss_95 {
            info!(
                time = now,
                sw_tot_g = self.state.sweat.sw_tot_g,
                "water loss limit (95%) reached"
            );
        }

        self.snapshot()
    }

    /// Per-minute state.
    pub fn snapshot(&self) -> ModelResult<Snapshot> {
        let Some((_, step)) = &self.step else {
            return Err(ModelError::NotInitialized);
        };
        if self.phase == EnginePhase::Uninitialized {
            return Err(ModelError::NotInitialized);
        }
        let s = &self.state;
        Ok(Snapshot {
            time: s.clock.now,
            step_start: s.clock.step_start,
            step_end: self.step_end(),
            t_cr_req: s.thermal.t_cr_req,
            t_sk: s.thermal.t_sk,
            sw_g: s.sweat.sw_g,
            sw_tot_g: s.sweat.sw_tot_g,
            t_cr: s.thermal.t_cr,
            t_re: s.thermal.t_re,
            t_cl: s.thermal.t_cl,
            sw: s.sweat.sw,
            e_pre: s.sweat.e_pre,
            sw_req: s.sweat.sw_req,
            sw_max: step.sw_max,
        })
    }

    /// End-of-block result with the limit markers.
    pub fn result_snapshot(&self) -> ModelResult<ResultSnapshot> {
        if self.phase == EnginePhase::Uninitialized {
            return Err(ModelError::NotInitialized);
        }
        let s = &self.state;
        Ok(ResultSnapshot {
            time: s.clock.now,
            t_re: s.thermal.t_re,
            sw_tot_g: s.sweat.sw_tot_g,
            d_lim_t_re: s.markers.rectal,
            d_lim_loss_50: s.markers.water_loss_50,
            d_lim_loss_95: s.markers.water_loss_95,
        })
    }

    /// Intermediate values of the last computed minute.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.state.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phs_core::units::{degc, kg, kpa, m, minutes, mps};

    #[test]
    fn new_simulation_is_unset_and_uninitialized() {
        let sim = Simulation::default();
        assert_eq!(sim.phase(), EnginePhase::Uninitialized);
        assert_eq!(sim.param(ParamId::Tair), None);
        assert!(matches!(sim.snapshot(), Err(ModelError::NotInitialized)));
    }

    #[test]
    fn initialize_requires_parameters() {
        let mut sim = Simulation::default();
        assert!(matches!(
            sim.initialize(),
            Err(ModelError::MissingParameter { .. })
        ));
    }

    #[test]
    fn parameter_changes_mark_groups_stale() {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        sim.initialize().unwrap();
        assert_eq!(sim.freshness(), (Freshness::Clean, Freshness::Clean));
        sim.set_param(ParamId::Tair, 38.0).unwrap();
        assert_eq!(sim.freshness(), (Freshness::Clean, Freshness::Stale));
        sim.set_param(ParamId::Mass, 80.0).unwrap();
        assert_eq!(sim.freshness().0, Freshness::Stale);
    }

    #[test]
    fn body_size_from_typed_quantities() {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        sim.set_body_size(m(1.7), kg(68.0)).unwrap();
        assert!((sim.param(ParamId::Height).unwrap() - 1.7).abs() < 1e-12);
        assert!((sim.param(ParamId::Mass).unwrap() - 68.0).abs() < 1e-9);
    }

    #[test]
    fn climate_and_walking_from_typed_quantities() {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        sim.initialize().unwrap();
        sim.set_climate(degc(35.0), degc(50.0), kpa(3.0), mps(0.5)).unwrap();
        assert_eq!(sim.freshness(), (Freshness::Clean, Freshness::Stale));
        assert!((sim.param(ParamId::Tair).unwrap() - 35.0).abs() < 1e-9);
        assert!((sim.param(ParamId::Trad).unwrap() - 50.0).abs() < 1e-9);
        assert!((sim.param(ParamId::PwAir).unwrap() - 3.0).abs() < 1e-12);
        assert!((sim.param(ParamId::VAir).unwrap() - 0.5).abs() < 1e-12);

        sim.set_walking(mps(1.0), Some(90.0)).unwrap();
        assert_eq!(sim.param(ParamId::WalkDir), Some(90.0));
        sim.set_walking(mps(0.8), None).unwrap();
        assert_eq!(sim.param(ParamId::WalkDir), None);
        assert!((sim.param(ParamId::VWalk).unwrap() - 0.8).abs() < 1e-12);

        sim.set_step_end(minutes(60.0)).unwrap();
        assert!((sim.step_end() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let mut sim = Simulation::default();
        assert!(matches!(
            sim.set_param_by_name("humidity", 1.0),
            Err(ModelError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn reset_clears_everything() {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        sim.initialize().unwrap();
        sim.advance_one_minute().unwrap();
        sim.reset();
        assert_eq!(sim.phase(), EnginePhase::Uninitialized);
        assert_eq!(sim.time(), 0);
        assert_eq!(sim.param(ParamId::Met), None);
        assert!(sim.diagnostics().is_none());
    }

    #[test]
    fn simulation_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Simulation>();
    }
}
