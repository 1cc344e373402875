//! One-minute integration of the thermal and sweat state.
//!
//! A minute is computed on a copy of the run state and committed only when
//! every sub-step succeeded, so a failed minute leaves the run untouched.

use crate::clothing::DynamicInsulation;
use crate::config::SimConfig;
use crate::constants::{StepConstants, SubjectConstants};
use crate::core_temp::{
    CoreHistory, RequiredCore, T_RE_LIMIT, modified_core_temperature, rectal_temperature,
    standard_core_temperature,
};
use crate::error::ModelResult;
use crate::heat::{Convection, HeatBalance, solve_clothing_temperature};
use crate::params::{Environment, Subject};
use crate::skin::SkinUpdate;
use crate::snapshot::Diagnostics;
use crate::state::{Clock, LimitMarkers, PreviousMinute, SweatState, ThermalState};
use crate::sweat::{SweatDrive, SweatResponse};
use crate::variant::CoreTempAlgorithm;
use crate::water::WaterLoss;
use phs_core::ensure_finite;

/// Everything that evolves during a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunState {
    pub thermal: ThermalState,
    pub previous: PreviousMinute,
    pub sweat: SweatState,
    pub markers: LimitMarkers,
    pub clock: Clock,
    /// Intermediate values of the last computed minute
    pub last: Option<Diagnostics>,
}

impl RunState {
    pub fn initial() -> Self {
        let thermal = ThermalState::initial();
        Self {
            thermal,
            previous: PreviousMinute::capture(&thermal),
            sweat: SweatState::initial(),
            markers: LimitMarkers::default(),
            clock: Clock::default(),
            last: None,
        }
    }
}

/// Read-only inputs of one minute.
#[derive(Clone, Copy, Debug)]
pub struct StepInputs<'a> {
    pub subject: &'a Subject,
    pub subject_constants: &'a SubjectConstants,
    pub env: &'a Environment,
    pub step_constants: &'a StepConstants,
    pub algorithm: CoreTempAlgorithm,
    pub config: &'a SimConfig,
}

/// Limits latched during a minute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latched {
    pub rectal: bool,
    pub water_loss_50: bool,
    pub water_loss_95: bool,
}

/// Advance `state` by one minute.
pub fn advance(state: &mut RunState, inputs: &StepInputs<'_>) -> ModelResult<Latched> {
    let mut next = *state;
    let latched = integrate(&mut next, inputs)?;
    *state = next;
    Ok(latched)
}

fn integrate(s: &mut RunState, inputs: &StepInputs<'_>) -> ModelResult<Latched> {
    let StepInputs {
        subject,
        subject_constants: sc,
        env,
        step_constants: step,
        algorithm,
        config,
    } = *inputs;

    let now = s.clock.tick();
    s.previous = PreviousMinute::capture(&s.thermal);
    let prev = s.previous;

    // Required core temperature
    let req = RequiredCore::compute(
        prev.t_cr_req,
        step.tcreq_ss,
        &sc.tcreq_lag,
        sc.sp_heat,
        prev.sk_cr_rel,
    );
    s.thermal.t_cr_req = req.t_cr_req;

    // Skin
    let skin = SkinUpdate::compute(env, prev.t_sk, prev.t_re, &sc.skin_lag);
    s.thermal.t_sk = skin.t_sk;

    // Clothing and dry heat exchange
    let ins = DynamicInsulation::compute(env.icl, env.im_st, step);
    let conv = Convection::compute(skin.t_sk, env, step.z);
    let surface = solve_clothing_temperature(
        skin.t_sk,
        ins.icl_dyn,
        &conv,
        env,
        step,
        &config.clothing_solver,
    )?;
    s.thermal.t_cl = surface.t_cl;
    let heat = HeatBalance::compute(env, step, &conv, &surface, req.d_sto_req);

    // Sweat
    let drive = SweatDrive {
        e_req: heat.e_req,
        p_sk: skin.p_sk,
        pw_air: env.pw_air,
        rt_dyn: ins.rt_dyn,
        sw_max: step.sw_max,
        w_max: sc.w_max,
    };
    let sweat = SweatResponse::compute(&drive, s.sweat.sw_pre, &sc.sweat_lag);
    s.sweat.sw_req = sweat.sw_req;
    s.sweat.sw_pre = sweat.sw_pre;
    s.sweat.w_req = sweat.w_req;
    s.sweat.w_pre = sweat.w_pre;
    s.sweat.e_pre = sweat.e_pre;

    // Core and rectal temperature
    let d_storage = sweat.e_req - sweat.e_pre + req.d_sto_req;
    let history = CoreHistory {
        t_cr: prev.t_cr,
        t_sk: prev.t_sk,
        t_bm: prev.t_bm,
        sk_cr_rel: prev.sk_cr_rel,
    };
    let solve = match algorithm {
        CoreTempAlgorithm::Standard => standard_core_temperature,
        CoreTempAlgorithm::Modified => modified_core_temperature,
    };
    let core = solve(
        d_storage,
        sc.sp_heat,
        skin.t_sk,
        &history,
        &config.core_solver,
        config.core_nonconvergence,
    )?;
    s.thermal.t_cr = ensure_finite(core.t_cr, "core temperature")?;
    if let Some(rel) = core.sk_cr_rel {
        s.thermal.sk_cr_rel = rel;
    }
    if let Some(t_bm) = core.t_bm {
        s.thermal.t_bm = t_bm;
    }
    s.thermal.t_re = ensure_finite(rectal_temperature(prev.t_re, core.t_cr), "rectal temperature")?;

    // Water loss
    let water = WaterLoss::accumulate(sweat.sw_pre, step.e_resp, s.sweat.sw_tot, sc.adu);
    s.sweat.sw = water.sw;
    s.sweat.sw_g = water.sw_g;
    s.sweat.sw_tot = water.sw_tot;
    s.sweat.sw_tot_g = ensure_finite(water.sw_tot_g, "cumulative water loss")?;

    let latched = Latched {
        rectal: LimitMarkers::latch(&mut s.markers.rectal, s.thermal.t_re >= T_RE_LIMIT, now),
        water_loss_50: LimitMarkers::latch(
            &mut s.markers.water_loss_50,
            water.sw_tot_g >= sc.sweat_max50_g,
            now,
        ),
        water_loss_95: LimitMarkers::latch(
            &mut s.markers.water_loss_95,
            water.sw_tot_g >= sc.sweat_max95_g,
            now,
        ),
    };

    s.last = Some(Diagnostics {
        time: now,
        variant: subject.variant,
        t_cr_req_ss: step.tcreq_ss,
        t_cr_req: req.t_cr_req,
        d_sto_req: req.d_sto_req,
        t_sk: skin.t_sk,
        p_sk: skin.p_sk,
        v_air_rel: step.motion.v_air_rel,
        cor_cl: ins.cor_cl,
        cor_ia: ins.cor_ia,
        cor_tot: ins.cor_tot,
        itot_dyn: ins.itot_dyn,
        icl_dyn: ins.icl_dyn,
        cor_e: ins.cor_e,
        rt_dyn: ins.rt_dyn,
        hc_dyn: conv.hc_dyn,
        f_acl_rad: conv.f_acl_rad,
        t_cl: surface.t_cl,
        h_r: surface.h_r,
        conv: heat.conv,
        rad: heat.rad,
        e_req: sweat.e_req,
        e_max: sweat.e_max,
        w_req: sweat.w_req,
        sw_pre: sweat.sw_pre,
        w_pre: sweat.w_pre,
        e_pre: sweat.e_pre,
        sk_cr_rel: s.thermal.sk_cr_rel,
        t_cr: s.thermal.t_cr,
        t_re: s.thermal.t_re,
        sw_tot: water.sw_tot,
        sw_tot_g: water.sw_tot_g,
        clothing_iterations: surface.iterations,
        core_iterations: core.iterations,
    });

    Ok(latched)
}
