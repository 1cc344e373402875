//! Scenario validation logic.

use crate::schema::Scenario;
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Scenario {scenario} has no step blocks")]
    EmptySteps { scenario: String },

    #[error("Scenario {scenario}: step {index} ends at {end} min, not after {previous} min")]
    NonIncreasingEnd {
        scenario: String,
        index: usize,
        end: f64,
        previous: f64,
    },

    #[error("Duplicate scenario name: {name}")]
    DuplicateName { name: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", scenario.name),
            reason: "must not be empty".to_string(),
        });
    }

    if !(1..=4).contains(&scenario.subject.model) {
        return Err(ValidationError::InvalidValue {
            field: "subject.model".to_string(),
            value: scenario.subject.model.to_string(),
            reason: "expected 1, 2, 3 or 4".to_string(),
        });
    }

    if scenario.steps.is_empty() {
        return Err(ValidationError::EmptySteps {
            scenario: scenario.name.clone(),
        });
    }

    let mut previous = 0.0;
    for (index, step) in scenario.steps.iter().enumerate() {
        if !step.end_min.is_finite() || step.end_min.fract() != 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("steps[{index}].end_min"),
                value: step.end_min.to_string(),
                reason: "must be a whole number of minutes".to_string(),
            });
        }
        if step.end_min <= previous {
            return Err(ValidationError::NonIncreasingEnd {
                scenario: scenario.name.clone(),
                index,
                end: step.end_min,
                previous,
            });
        }
        for (id, value) in step.params() {
            if !value.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: format!("steps[{index}].{}", id.name()),
                    value: value.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
        previous = step.end_min;
    }

    Ok(())
}

/// Validate every scenario and reject duplicate names.
pub fn validate_batch(scenarios: &[Scenario]) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for scenario in scenarios {
        if !names.insert(scenario.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: scenario.name.clone(),
            });
        }
        validate_scenario(scenario)?;
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::schema::{StepDef, SubjectDef};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn strictly_increasing_whole_minutes_validate(
            increments in proptest::collection::vec(1u32..120, 1..6)
        ) {
            let mut end = 0u32;
            let steps = increments
                .iter()
                .map(|inc| {
                    end += inc;
                    StepDef { end_min: f64::from(end), ..StepDef::default() }
                })
                .collect();
            let s = Scenario {
                version: 1,
                name: "p".to_string(),
                subject: SubjectDef::default(),
                steps,
                expected: None,
                config: None,
            };
            prop_assert!(validate_scenario(&s).is_ok());
        }
    }
}
