//! Run a scenario and compare its end result with the expected values.

use crate::ScenarioResult;
use crate::schema::{ExpectedDef, Scenario};
use crate::validate::validate_scenario;
use phs_core::{Tolerances, nearly_equal};
use phs_model::{ResultSnapshot, RunLogEntry, Runner, Simulation, StepLog};
use serde::Serialize;
use tracing::{debug, info};

/// Allowed deviation per compared column.
#[derive(Clone, Copy, Debug)]
pub struct CompareTolerances {
    /// Rectal temperature (°C)
    pub t_re: Tolerances,
    /// Cumulative water loss (g)
    pub sw_tot_g: Tolerances,
    /// Limit times (min)
    pub limit_min: Tolerances,
}

impl Default for CompareTolerances {
    fn default() -> Self {
        Self {
            t_re: Tolerances::absolute(0.1),
            sw_tot_g: Tolerances { abs: 1.0, rel: 0.005 },
            limit_min: Tolerances::absolute(1.0),
        }
    }
}

/// One compared column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnCheck {
    pub column: &'static str,
    pub simulated: f64,
    pub target: f64,
    pub pass: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub checks: Vec<ColumnCheck>,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.pass)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ColumnCheck> {
        self.checks.iter().filter(|c| !c.pass)
    }
}

/// Compare `result` with `expected`; unreached limits count as `end`.
pub fn compare(
    result: &ResultSnapshot,
    expected: &ExpectedDef,
    end: u32,
    tol: &CompareTolerances,
) -> Comparison {
    let [d_t_re, dwl50, dwl95] = result.limits_or(end);
    let columns = [
        ("Tre", result.t_re, expected.t_re, tol.t_re),
        ("D_Tre", f64::from(d_t_re), expected.d_t_re, tol.limit_min),
        ("SWtotg", result.sw_tot_g, expected.sw_tot_g, tol.sw_tot_g),
        ("Dwl50", f64::from(dwl50), expected.dwl50, tol.limit_min),
        ("Dwl95", f64::from(dwl95), expected.dwl95, tol.limit_min),
    ];
    let checks = columns
        .into_iter()
        .filter_map(|(column, simulated, target, tol)| {
            target.map(|target| ColumnCheck {
                column,
                simulated,
                target,
                pass: nearly_equal(simulated, target, tol),
            })
        })
        .collect();
    Comparison { checks }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Keep the per-minute snapshots
    pub record_snapshots: bool,
}

/// Everything a scenario run produced.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Result at the end of the last block
    pub result: ResultSnapshot,
    pub step_log: StepLog,
    pub run_log: Vec<RunLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

/// Build the simulation for `scenario` with its subject inputs applied.
pub fn prepare(scenario: &Scenario) -> ScenarioResult<Simulation> {
    let mut sim = Simulation::with_defaults(scenario.config.clone().unwrap_or_default());
    for (id, value) in scenario.subject.params() {
        sim.set_param(id, value)?;
    }
    Ok(sim)
}

pub fn run_scenario(scenario: &Scenario, opts: &RunOptions) -> ScenarioResult<ScenarioOutcome> {
    run_scenario_with_progress(scenario, opts, |_| {})
}

/// Run every step block of `scenario`, calling `progress` with the current
/// time before each minute.
pub fn run_scenario_with_progress(
    scenario: &Scenario,
    opts: &RunOptions,
    progress: impl FnMut(u32),
) -> ScenarioResult<ScenarioOutcome> {
    validate_scenario(scenario)?;
    let sim = prepare(scenario)?;
    let mut runner = Runner::new(sim)
        .record_snapshots(opts.record_snapshots)
        .on_progress(progress);

    let mut result = None;
    for (index, step) in scenario.steps.iter().enumerate() {
        let tag = if scenario.steps.len() == 1 {
            scenario.name.clone()
        } else {
            format!("{}#{}", scenario.name, index + 1)
        };
        debug!(scenario = %scenario.name, block = index, "running block");
        result = Some(runner.run_block(&tag, &step.params())?);
    }
    let result = match result {
        Some(r) => r,
        None => runner.simulation().result_snapshot()?,
    };

    let comparison = scenario
        .expected
        .as_ref()
        .map(|e| compare(&result, e, result.time, &CompareTolerances::default()));
    if let Some(c) = &comparison {
        info!(
            scenario = %scenario.name,
            passed = c.passed(),
            t_re = result.t_re,
            sw_tot_g = result.sw_tot_g,
            "scenario finished"
        );
    }

    let (_, step_log, run_log) = runner.into_parts();
    Ok(ScenarioOutcome {
        name: scenario.name.clone(),
        result,
        step_log,
        run_log,
        comparison,
    })
}
