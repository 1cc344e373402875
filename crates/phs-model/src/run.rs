//! Run driver: advance a simulation to the end of its step block and keep
//! the per-minute, per-block and per-run logs.

use crate::error::ModelResult;
use crate::params::{ParamId, ParamLevel};
use crate::simulation::Simulation;
use crate::snapshot::{ResultSnapshot, Snapshot};
use serde::Serialize;
use tracing::debug;

/// Per-minute snapshots and end-of-block results.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StepLog {
    /// Skip per-minute snapshots; block results are always kept
    #[serde(skip)]
    pub disabled: bool,
    pub snapshots: Vec<Snapshot>,
    pub results: Vec<ResultSnapshot>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_snapshots() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn record(&mut self, snapshot: Snapshot) {
        if !self.disabled {
            self.snapshots.push(snapshot);
        }
    }
}

/// Callback receiving the current time before each minute.
pub type ProgressFn<'a> = dyn FnMut(u32) + 'a;

/// Advance until the clock reaches the step end. Does nothing when it
/// already has.
pub fn run_to_step_end(sim: &mut Simulation, log: &mut StepLog) -> ModelResult<()> {
    run_to_step_end_with_progress(sim, log, &mut |_| {})
}

pub fn run_to_step_end_with_progress(
    sim: &mut Simulation,
    log: &mut StepLog,
    progress: &mut ProgressFn<'_>,
) -> ModelResult<()> {
    if sim.is_step_complete() {
        return Ok(());
    }
    loop {
        progress(sim.time());
        let snapshot = sim.advance_one_minute()?;
        log.record(snapshot);
        if sim.is_step_complete() {
            break;
        }
    }
    log.results.push(sim.result_snapshot()?);
    Ok(())
}

/// Inputs and end result of one step block.
#[derive(Clone, Debug, Serialize)]
pub struct RunLogEntry {
    pub tag: String,
    /// Subject inputs at the start of the block
    pub subject: Vec<(&'static str, Option<f64>)>,
    /// Step inputs of the block
    pub step: Vec<(&'static str, Option<f64>)>,
    pub step_start: u32,
    pub result: ResultSnapshot,
}

fn inputs_at(sim: &Simulation, level: ParamLevel) -> Vec<(&'static str, Option<f64>)> {
    ParamId::ALL
        .iter()
        .filter(|id| id.level() == level)
        .map(|&id| (id.name(), sim.param(id)))
        .collect()
}

/// Sequences the step blocks of one run.
///
/// The first block initializes the simulation; later blocks continue from
/// the current state with new step inputs.
pub struct Runner<'a> {
    sim: Simulation,
    steps: StepLog,
    run_log: Vec<RunLogEntry>,
    progress: Option<Box<ProgressFn<'a>>>,
    blocks: usize,
}

impl<'a> Runner<'a> {
    /// Take ownership of a simulation whose subject inputs are already set.
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            steps: StepLog::new(),
            run_log: Vec::new(),
            progress: None,
            blocks: 0,
        }
    }

    pub fn record_snapshots(mut self, enabled: bool) -> Self {
        self.steps.disabled = !enabled;
        self
    }

    pub fn on_progress(mut self, progress: impl FnMut(u32) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Apply `inputs` and run the block to its end time.
    pub fn run_block(
        &mut self,
        tag: &str,
        inputs: &[(ParamId, f64)],
    ) -> ModelResult<ResultSnapshot> {
        for &(id, value) in inputs {
            self.sim.set_param(id, value)?;
        }

        if self.blocks == 0 {
            self.sim.initialize()?;
            self.steps.record(self.sim.snapshot()?);
        } else {
            self.sim.mark_step_start();
        }
        debug!(tag, block = self.blocks, step_end = self.sim.step_end(), "running step block");

        let step_start = self.sim.time();
        let subject = inputs_at(&self.sim, ParamLevel::Subject);
        let step = inputs_at(&self.sim, ParamLevel::Step);

        match self.progress.as_mut() {
            Some(cb) => run_to_step_end_with_progress(&mut self.sim, &mut self.steps, cb.as_mut())?,
            None => run_to_step_end(&mut self.sim, &mut self.steps)?,
        }
        self.blocks += 1;

        let result = self.sim.result_snapshot()?;
        self.run_log.push(RunLogEntry {
            tag: tag.to_string(),
            subject,
            step,
            step_start,
            result,
        });
        Ok(result)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn step_log(&self) -> &StepLog {
        &self.steps
    }

    pub fn run_log(&self) -> &[RunLogEntry] {
        &self.run_log
    }

    pub fn into_parts(self) -> (Simulation, StepLog, Vec<RunLogEntry>) {
        (self.sim, self.steps, self.run_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn sim(step_end: f64) -> Simulation {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        sim.set_param(ParamId::StepEnd, step_end).unwrap();
        sim
    }

    #[test]
    fn runs_to_step_end() {
        let mut s = sim(15.0);
        s.initialize().unwrap();
        let mut log = StepLog::new();
        run_to_step_end(&mut s, &mut log).unwrap();
        assert_eq!(s.time(), 15);
        assert_eq!(log.snapshots.len(), 15);
        assert_eq!(log.results.len(), 1);
        assert_eq!(log.results[0].time, 15);

        // Already at the end: no-op
        run_to_step_end(&mut s, &mut log).unwrap();
        assert_eq!(s.time(), 15);
        assert_eq!(log.results.len(), 1);
    }

    #[test]
    fn disabled_log_keeps_results_only() {
        let mut s = sim(5.0);
        s.initialize().unwrap();
        let mut log = StepLog::without_snapshots();
        run_to_step_end(&mut s, &mut log).unwrap();
        assert!(log.snapshots.is_empty());
        assert_eq!(log.results.len(), 1);
    }

    #[test]
    fn progress_sees_time_before_each_minute() {
        let mut seen = Vec::new();
        {
            let mut runner = Runner::new(sim(4.0)).on_progress(|t| seen.push(t));
            runner.run_block("a", &[]).unwrap();
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn runner_sequences_blocks() {
        let mut runner = Runner::new(sim(10.0));
        let first = runner.run_block("first", &[]).unwrap();
        assert_eq!(first.time, 10);
        let second = runner
            .run_block("second", &[(ParamId::StepEnd, 25.0), (ParamId::Met, 250.0)])
            .unwrap();
        assert_eq!(second.time, 25);

        let log = runner.run_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].tag, "second");
        assert_eq!(log[1].step_start, 10);
        assert!(log[1].step.contains(&("Met", Some(250.0))));
        assert_eq!(runner.simulation().snapshot().unwrap().step_start, 10);
        // Initial snapshot plus one per minute
        assert_eq!(runner.step_log().snapshots.len(), 26);
    }
}
