//! ISO 7933 worked examples as built-in scenarios.
//!
//! Ten exposures, each run with the four model variants. The published
//! targets are at 480 min; limits not reached by then are listed as 480.

use crate::schema::{ExpectedDef, Scenario, StepDef, SubjectDef};
use crate::validate::LATEST_VERSION;
use phs_model::ModelVariant;

/// Duration of every reference exposure (min).
pub const ISO_DURATION_MIN: u32 = 480;

/// Published end results: Tre, D_Tre, SWtotg, Dwl50, Dwl95.
const TARGETS: [[f64; 5]; 10] = [
    [37.5, 480.0, 6168.0, 439.0, 298.0],
    [39.8, 74.0, 6935.0, 385.0, 256.0],
    [37.7, 480.0, 7166.0, 380.0, 258.0],
    [41.2, 57.0, 5807.0, 466.0, 314.0],
    [37.6, 480.0, 3892.0, 480.0, 463.0],
    [37.3, 480.0, 6763.0, 401.0, 271.0],
    [39.2, 70.0, 7236.0, 372.0, 247.0],
    [41.0, 67.0, 5548.0, 480.0, 318.0],
    [37.5, 480.0, 6684.0, 407.0, 276.0],
    [37.6, 480.0, 5379.0, 480.0, 339.0],
];

/// Number of reference examples.
pub const ISO_EXAMPLE_COUNT: usize = TARGETS.len();

fn base_step() -> StepDef {
    StepDef {
        end_min: f64::from(ISO_DURATION_MIN),
        posture: Some(2.0),
        t_air: Some(35.0),
        pw_air: Some(3.0),
        t_rad: Some(40.0),
        v_air: Some(0.3),
        met: Some(150.0),
        icl: Some(0.5),
        im_st: Some(0.38),
        f_aref: Some(0.54),
        fr: Some(0.97),
        walk_dir: None,
        v_walk: None,
        work: Some(0.0),
    }
}

/// Subject acclimatization and exposure of example `n` (1-based).
fn exposure(n: usize) -> (f64, StepDef) {
    let mut s = base_step();
    let mut accl = 100.0;
    match n {
        1 => {
            s.t_air = Some(40.0);
            s.pw_air = Some(2.5);
        }
        2 => {
            s.pw_air = Some(4.0);
            s.t_rad = Some(35.0);
        }
        3 => {
            s.t_air = Some(30.0);
            s.t_rad = Some(50.0);
        }
        4 => {
            accl = 0.0;
            s.t_air = Some(28.0);
            s.t_rad = Some(58.0);
        }
        5 => {
            accl = 0.0;
            s.posture = Some(1.0);
            s.t_rad = Some(35.0);
            s.v_air = Some(1.0);
        }
        6 => {
            s.posture = Some(1.0);
            s.t_air = Some(43.0);
            s.t_rad = Some(43.0);
            s.met = Some(103.0);
        }
        7 => {
            accl = 0.0;
            s.t_rad = Some(35.0);
            s.met = Some(206.0);
        }
        8 => {
            accl = 0.0;
            s.t_air = Some(34.0);
            s.t_rad = Some(34.0);
            s.icl = Some(1.0);
        }
        9 => {
            s.t_air = Some(40.0);
            s.icl = Some(0.4);
        }
        _ => {
            s.t_air = Some(40.0);
            s.icl = Some(0.4);
            s.walk_dir = Some(90.0);
            s.v_walk = Some(1.0);
        }
    }
    (accl, s)
}

/// Tag of example `n` (1-based) with `variant`.
pub fn iso_tag(n: usize, variant: ModelVariant) -> String {
    format!("ISO7933_{n}_{}", variant.tag())
}

/// Example `n` (1-based) with `variant`, or `None` when `n` is out of range.
pub fn iso_example(n: usize, variant: ModelVariant) -> Option<Scenario> {
    if !(1..=ISO_EXAMPLE_COUNT).contains(&n) {
        return None;
    }
    let (accl, step) = exposure(n);
    let [t_re, d_t_re, sw_tot_g, dwl50, dwl95] = TARGETS[n - 1];
    Some(Scenario {
        version: LATEST_VERSION,
        name: iso_tag(n, variant),
        subject: SubjectDef {
            accl,
            drink: true,
            height: 1.8,
            mass: 75.0,
            model: variant.code(),
        },
        steps: vec![step],
        expected: Some(ExpectedDef {
            t_re: Some(t_re),
            d_t_re: Some(d_t_re),
            sw_tot_g: Some(sw_tot_g),
            dwl50: Some(dwl50),
            dwl95: Some(dwl95),
        }),
        config: None,
    })
}

/// All examples for one variant.
pub fn iso_examples(variant: ModelVariant) -> Vec<Scenario> {
    (1..=ISO_EXAMPLE_COUNT)
        .filter_map(|n| iso_example(n, variant))
        .collect()
}

/// The whole catalog: every example with every variant, example-major.
pub fn iso_catalog() -> Vec<Scenario> {
    (1..=ISO_EXAMPLE_COUNT)
        .flat_map(|n| {
            ModelVariant::ALL
                .into_iter()
                .filter_map(move |v| iso_example(n, v))
        })
        .collect()
}
