//! phs-scenario: scenario file format, validation, the ISO 7933 reference
//! catalog and the scenario runner.

pub mod catalog;
pub mod runner;
pub mod schema;
pub mod validate;

pub use catalog::{
    ISO_DURATION_MIN, ISO_EXAMPLE_COUNT, iso_catalog, iso_example, iso_examples, iso_tag,
};
pub use runner::{
    ColumnCheck, CompareTolerances, Comparison, RunOptions, ScenarioOutcome, compare, prepare,
    run_scenario, run_scenario_with_progress,
};
pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_batch, validate_scenario};

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] phs_model::ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

pub fn load_yaml(path: &std::path::Path) -> ScenarioResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn save_yaml(path: &std::path::Path, scenario: &Scenario) -> ScenarioResult<()> {
    validate_scenario(scenario)?;
    let content = serde_yaml::to_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ScenarioResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn save_json(path: &std::path::Path, scenario: &Scenario) -> ScenarioResult<()> {
    validate_scenario(scenario)?;
    let content = serde_json::to_string_pretty(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a scenario, choosing the format from the file extension (`.json`,
/// anything else is read as YAML).
pub fn load(path: &std::path::Path) -> ScenarioResult<Scenario> {
    if is_json(path) {
        load_json(path)
    } else {
        load_yaml(path)
    }
}
