//! Lifecycle and invariants of a simulation run.

use phs_model::{
    CoreTempAlgorithm, EnginePhase, FixedPointConfig, ModelError, NonConvergencePolicy, ParamId,
    RangePolicy, SimConfig, Simulation, StepLog, run_to_step_end,
};

fn hot_run(config: SimConfig) -> Simulation {
    let mut sim = Simulation::with_defaults(config);
    sim.set_param(ParamId::Tair, 35.0).unwrap();
    sim.set_param(ParamId::PwAir, 4.0).unwrap();
    sim.set_param(ParamId::Trad, 35.0).unwrap();
    sim.set_param(ParamId::StepEnd, 120.0).unwrap();
    sim
}

#[test]
fn identical_inputs_give_identical_snapshots() {
    let mut a = hot_run(SimConfig::default());
    let mut b = hot_run(SimConfig::default());
    a.initialize().unwrap();
    b.initialize().unwrap();
    for _ in 0..60 {
        let sa = a.advance_one_minute().unwrap();
        let sb = b.advance_one_minute().unwrap();
        assert_eq!(sa, sb);
    }
    assert_eq!(a.result_snapshot().unwrap(), b.result_snapshot().unwrap());
}

#[test]
fn clock_advances_by_one_and_water_loss_never_decreases() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    let mut last_total = 0.0;
    for minute in 1..=120 {
        let s = sim.advance_one_minute().unwrap();
        assert_eq!(s.time, minute);
        assert!(s.sw_tot_g >= last_total);
        last_total = s.sw_tot_g;
    }
}

#[test]
fn limit_markers_are_write_once() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    let mut log = StepLog::without_snapshots();
    run_to_step_end(&mut sim, &mut log).unwrap();
    let first = sim.result_snapshot().unwrap();
    let rectal = first.d_lim_t_re.expect("rectal limit reached in hot humid run");
    assert!(rectal <= 120);

    sim.set_param(ParamId::StepEnd, 240.0).unwrap();
    sim.mark_step_start();
    run_to_step_end(&mut sim, &mut log).unwrap();
    let later = sim.result_snapshot().unwrap();
    assert_eq!(later.d_lim_t_re, Some(rectal));
    assert!(later.t_re >= 38.0);
}

#[test]
fn markers_carry_the_minute_they_latched_in() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    loop {
        let s = sim.advance_one_minute().unwrap();
        if s.t_re >= 38.0 {
            assert_eq!(sim.result_snapshot().unwrap().d_lim_t_re, Some(s.time));
            break;
        }
        assert_eq!(sim.result_snapshot().unwrap().d_lim_t_re, None);
        assert!(s.time < 120, "rectal limit never reached");
    }
}

#[test]
fn advance_before_initialize_fails() {
    let mut sim = Simulation::with_defaults(SimConfig::default());
    assert_eq!(sim.advance_one_minute().unwrap_err(), ModelError::NotInitialized);
}

#[test]
fn subject_change_after_initialize_is_rejected() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    sim.advance_one_minute().unwrap();
    sim.set_param(ParamId::Mass, 90.0).unwrap();
    assert_eq!(
        sim.advance_one_minute().unwrap_err(),
        ModelError::StaleSubjectParameters
    );
    // Re-initializing starts a fresh run with the new subject
    sim.initialize().unwrap();
    assert_eq!(sim.time(), 0);
    sim.advance_one_minute().unwrap();
    assert_eq!(sim.phase(), EnginePhase::Stepping);
}

#[test]
fn subject_constants_cannot_be_refreshed_mid_run() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    for _ in 0..10 {
        sim.advance_one_minute().unwrap();
    }
    let sw_max = sim.step_constants().unwrap().sw_max;
    let adu = sim.subject_constants().unwrap().adu;
    sim.set_param(ParamId::Mass, 90.0).unwrap();
    sim.set_param(ParamId::SimMod, 2.0).unwrap();
    assert_eq!(
        sim.recompute_subject_constants().unwrap_err(),
        ModelError::StaleSubjectParameters
    );
    assert_eq!(
        sim.advance_one_minute().unwrap_err(),
        ModelError::StaleSubjectParameters
    );
    assert_eq!(sim.time(), 10);
    assert_eq!(sim.step_constants().unwrap().sw_max, sw_max);
    assert_eq!(sim.subject_constants().unwrap().adu, adu);
    assert_eq!(sim.algorithm(), CoreTempAlgorithm::Standard);
}

#[test]
fn subject_constants_follow_inputs_before_stepping() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    sim.set_param(ParamId::SimMod, 3.0).unwrap();
    sim.recompute_subject_constants().unwrap();
    assert_eq!(sim.algorithm(), CoreTempAlgorithm::Modified);
    sim.advance_one_minute().unwrap();
    assert_eq!(sim.phase(), EnginePhase::Stepping);
}

#[test]
fn step_change_is_picked_up_lazily() {
    let mut sim = hot_run(SimConfig::default());
    sim.initialize().unwrap();
    sim.advance_one_minute().unwrap();
    let before = sim.step_constants().unwrap().tcreq_ss;
    sim.set_param(ParamId::Met, 300.0).unwrap();
    sim.advance_one_minute().unwrap();
    let after = sim.step_constants().unwrap().tcreq_ss;
    assert!((before - (0.0036 * 150.0 + 36.6)).abs() < 1e-12);
    assert!((after - (0.0036 * 300.0 + 36.6)).abs() < 1e-12);
}

#[test]
fn invalid_variant_is_a_configuration_error() {
    let mut sim = Simulation::with_defaults(SimConfig::default());
    sim.set_param(ParamId::SimMod, 7.0).unwrap();
    assert_eq!(
        sim.initialize().unwrap_err(),
        ModelError::InvalidModelVariant { variant: 7.0 }
    );
}

#[test]
fn variant_zero_defaults_to_one() {
    let mut sim = Simulation::with_defaults(SimConfig::default());
    sim.set_param(ParamId::SimMod, 0.0).unwrap();
    sim.initialize().unwrap();
    assert_eq!(sim.diagnostics(), None);
    sim.advance_one_minute().unwrap();
    assert_eq!(sim.diagnostics().unwrap().variant.code(), 1);
}

#[test]
fn range_policies() {
    let mut pass = Simulation::with_defaults(SimConfig::default());
    pass.set_param(ParamId::Tair, 60.0).unwrap();
    assert_eq!(pass.param(ParamId::Tair), Some(60.0));

    let mut clamp = Simulation::with_defaults(SimConfig {
        range_policy: RangePolicy::Clamp,
        ..SimConfig::default()
    });
    clamp.set_param(ParamId::Tair, 60.0).unwrap();
    assert_eq!(clamp.param(ParamId::Tair), Some(50.0));

    let mut reject = Simulation::with_defaults(SimConfig {
        range_policy: RangePolicy::Reject,
        ..SimConfig::default()
    });
    assert!(matches!(
        reject.set_param(ParamId::Tair, 60.0),
        Err(ModelError::OutOfRange { name: "Tair", .. })
    ));
    assert_eq!(reject.param(ParamId::Tair), Some(40.0));
}

#[test]
fn non_finite_input_is_refused() {
    let mut sim = Simulation::with_defaults(SimConfig::default());
    assert!(matches!(
        sim.set_param(ParamId::Met, f64::NAN),
        Err(ModelError::Core(_))
    ));
}

fn starved_core_solver(policy: NonConvergencePolicy) -> SimConfig {
    SimConfig {
        core_nonconvergence: policy,
        core_solver: FixedPointConfig {
            max_iterations: 1,
            tolerance: 1e-12,
        },
        ..SimConfig::default()
    }
}

#[test]
fn core_non_convergence_fails_by_default() {
    for variant in [1.0, 3.0] {
        let mut sim = hot_run(starved_core_solver(NonConvergencePolicy::Fail));
        sim.set_param(ParamId::SimMod, variant).unwrap();
        sim.initialize().unwrap();
        let err = sim.advance_one_minute().unwrap_err();
        assert!(matches!(err, ModelError::ConvergenceFailed { iterations: 1, .. }));
        // The failed minute left the run untouched
        assert_eq!(sim.time(), 0);
    }
}

#[test]
fn core_non_convergence_can_continue_with_best_estimate() {
    for variant in [1.0, 3.0] {
        let mut sim = hot_run(starved_core_solver(NonConvergencePolicy::WarnAndContinue));
        sim.set_param(ParamId::SimMod, variant).unwrap();
        sim.initialize().unwrap();
        for _ in 0..10 {
            let s = sim.advance_one_minute().unwrap();
            assert!(s.t_cr.is_finite());
            assert!(s.t_re.is_finite());
        }
        assert_eq!(sim.diagnostics().unwrap().core_iterations, 1);
    }
}

#[test]
fn iterations_stay_within_bounds_over_documented_ranges() {
    let corners = [
        (15.0, 0.5, 15.0, 0.0, 100.0, 0.1),
        (50.0, 4.5, 60.0, 0.3, 400.0, 1.2),
        (30.0, 2.0, 110.0, 3.0, 250.0, 0.6),
        (45.0, 1.0, 45.0, 1.5, 150.0, 0.3),
    ];
    for (t_air, pw, t_rad, v_air, met, icl) in corners {
        let mut sim = Simulation::with_defaults(SimConfig::default());
        for (id, v) in [
            (ParamId::Tair, t_air),
            (ParamId::PwAir, pw),
            (ParamId::Trad, t_rad),
            (ParamId::VAir, v_air),
            (ParamId::Met, met),
            (ParamId::Icl, icl),
            (ParamId::StepEnd, 60.0),
        ] {
            sim.set_param(id, v).unwrap();
        }
        sim.initialize().unwrap();
        let mut log = StepLog::without_snapshots();
        run_to_step_end(&mut sim, &mut log).unwrap();
        let d = sim.diagnostics().unwrap();
        assert!(d.clothing_iterations <= 20);
        assert!(d.core_iterations <= 25);
        assert!(d.cor_cl > 0.0 && d.cor_cl <= 1.0);
        assert!(d.cor_ia > 0.0 && d.cor_ia <= 1.0);
        assert!(d.w_pre >= 0.0 && d.w_pre <= 1.0);
    }
}
