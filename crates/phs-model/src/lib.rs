//! ISO 7933 Predicted Heat Strain engine.
//!
//! Provides:
//! - named parameters with documented ranges and a configurable range policy
//! - lazily recomputed subject and step-block constants
//! - the one-minute step engine (skin, clothing, sweat, core and rectal
//!   temperature, water loss) with write-once limit markers
//! - the `Simulation` lifecycle and read-only snapshots
//! - a run driver for multi-block runs

pub mod clothing;
pub mod config;
pub mod constants;
pub mod core_temp;
pub mod error;
pub mod heat;
pub mod params;
pub mod run;
pub mod simulation;
pub mod skin;
pub mod snapshot;
pub mod solver;
pub mod state;
pub mod step;
pub mod sweat;
pub mod variant;
pub mod water;

// Internal modules
mod filter;
mod freshness;

pub use config::{NonConvergencePolicy, SimConfig};
pub use constants::{Motion, StepConstants, SubjectConstants};
pub use error::{ModelError, ModelResult};
pub use filter::ExpLag;
pub use freshness::{ConstantsTracker, Freshness};
pub use params::{
    Environment, ParamId, ParamLevel, ParamSpec, ParameterSet, Posture, RangePolicy, Subject,
};
pub use run::{
    ProgressFn, RunLogEntry, Runner, StepLog, run_to_step_end, run_to_step_end_with_progress,
};
pub use simulation::{EnginePhase, Simulation};
pub use snapshot::{Diagnostics, ResultSnapshot, Snapshot};
pub use solver::FixedPointConfig;
pub use state::{Clock, LimitMarkers, SweatState, ThermalState};
pub use variant::{CoreTempAlgorithm, ModelVariant, SweatCeiling};
