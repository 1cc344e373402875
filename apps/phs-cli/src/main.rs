use clap::{Parser, Subcommand};
use phs_core::round_to;
use phs_model::{ModelVariant, ParamId, ParamLevel, ResultSnapshot, Snapshot};
use phs_scenario::{
    Comparison, RunOptions, ScenarioOutcome, ScenarioResult, iso_examples, run_scenario,
    run_scenario_with_progress,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "phs-cli")]
#[command(about = "PHS CLI - ISO 7933 predicted heat strain tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every model parameter with its default, range and unit
    Params,
    /// Validate a scenario file
    Validate {
        /// Path to a scenario file (.yaml or .json)
        scenario: PathBuf,
    },
    /// Run a scenario and print the end result
    Run {
        /// Path to a scenario file (.yaml or .json)
        scenario: PathBuf,
        /// Print the whole outcome as JSON
        #[arg(long)]
        json: bool,
        /// Print the per-minute trace
        #[arg(long)]
        trace: bool,
    },
    /// Run the ISO 7933 reference examples and compare with the published values
    Iso {
        /// Model variant (1-4)
        #[arg(long, default_value_t = 1)]
        variant: i64,
    },
}

fn main() -> ScenarioResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Params => cmd_params(),
        Commands::Validate { scenario } => cmd_validate(&scenario),
        Commands::Run {
            scenario,
            json,
            trace,
        } => cmd_run(&scenario, json, trace),
        Commands::Iso { variant } => cmd_iso(variant),
    }
}

fn cmd_params() -> ScenarioResult<()> {
    println!(
        "{:<10} {:<8} {:>9} {:>9} {:>9}  {:<8} Description",
        "Name", "Level", "Default", "Min", "Max", "Unit"
    );
    for id in ParamId::ALL {
        let spec = id.spec();
        let level = match spec.level {
            ParamLevel::Subject => "subject",
            ParamLevel::Step => "step",
        };
        let default = spec
            .default
            .map(|d| format!("{d}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<8} {:>9} {:>9} {:>9}  {:<8} {}",
            spec.name, level, default, spec.min, spec.max, spec.unit, spec.description
        );
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> ScenarioResult<()> {
    println!("Validating scenario: {}", path.display());
    let scenario = phs_scenario::load(path)?;
    println!("✓ Scenario is valid");
    println!("  Name: {}", scenario.name);
    println!("  Model variant: {}", scenario.subject.model);
    println!("  Step blocks: {}", scenario.steps.len());
    if let Some(last) = scenario.steps.last() {
        println!("  Duration: {} min", last.end_min);
    }
    Ok(())
}

fn cmd_run(path: &Path, json: bool, trace: bool) -> ScenarioResult<()> {
    let scenario = phs_scenario::load(path)?;
    let opts = RunOptions {
        record_snapshots: trace,
    };

    if json {
        let outcome = run_scenario(&scenario, &opts)?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Running scenario: {}", scenario.name);
    let end = scenario
        .steps
        .last()
        .map(|s| s.end_min.max(1.0) as u32)
        .unwrap_or(1);
    let outcome = run_scenario_with_progress(&scenario, &opts, |time| {
        render_progress(time, end);
    })?;
    clear_progress_line();
    println!("✓ Run completed: {}", outcome.name);

    if trace {
        print_trace(&outcome.step_log.snapshots);
    }
    print_blocks(&outcome);
    print_result(&outcome.result);
    if let Some(comparison) = &outcome.comparison {
        print_comparison(comparison);
    }
    Ok(())
}

fn cmd_iso(variant: i64) -> ScenarioResult<()> {
    let variant = ModelVariant::from_code(variant)?;
    println!("Running ISO 7933 reference examples, variant {}", variant.code());
    println!(
        "\n{:<16} {:>7} {:>6} {:>8} {:>6} {:>6}  Status",
        "Example", "Tre", "D_Tre", "SWtotg", "Dwl50", "Dwl95"
    );

    let mut failed = 0usize;
    let scenarios = iso_examples(variant);
    for scenario in &scenarios {
        let outcome = run_scenario(scenario, &RunOptions::default())?;
        let r = &outcome.result;
        let [d_t_re, dwl50, dwl95] = r.limits_or(r.time);
        let passed = outcome.comparison.as_ref().is_none_or(|c| c.passed());
        if !passed {
            failed += 1;
        }
        println!(
            "{:<16} {:>7.1} {:>6} {:>8} {:>6} {:>6}  {}",
            outcome.name,
            round_to(r.t_re, 1),
            d_t_re,
            round_to(r.sw_tot_g, 0),
            dwl50,
            dwl95,
            if passed { "✓" } else { "✗" }
        );
    }

    if failed == 0 {
        println!("\n✓ All {} examples match", scenarios.len());
    } else {
        println!("\n✗ {} of {} examples deviate", failed, scenarios.len());
        std::process::exit(1);
    }
    Ok(())
}

fn render_progress(time: u32, end: u32) {
    let width = 28usize;
    let fraction = f64::from(time) / f64::from(end);
    let filled = ((fraction * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] {:>6.2}%  t={}/{} min",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled)),
        fraction * 100.0,
        time,
        end
    );
    let _ = io::stdout().flush();
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn print_trace(snapshots: &[Snapshot]) {
    println!(
        "\n{:>5} {:>7} {:>7} {:>7} {:>7} {:>7} {:>8} {:>8}",
        "t", "Tcreq", "Tsk", "Tcr", "Tre", "Tcl", "SWg", "SWtotg"
    );
    for s in snapshots {
        println!(
            "{:>5} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>8.1} {:>8.1}",
            s.time, s.t_cr_req, s.t_sk, s.t_cr, s.t_re, s.t_cl, s.sw_g, s.sw_tot_g
        );
    }
}

fn print_blocks(outcome: &ScenarioOutcome) {
    if outcome.run_log.len() < 2 {
        return;
    }
    println!("\nBlocks:");
    for entry in &outcome.run_log {
        println!(
            "  {:<24} {:>4} - {:>4} min  Tre={:.2} °C  SWtotg={:.0} g",
            entry.tag,
            entry.step_start,
            entry.result.time,
            entry.result.t_re,
            entry.result.sw_tot_g
        );
    }
}

fn print_result(result: &ResultSnapshot) {
    let limit = |t: Option<u32>| {
        t.map_or_else(|| "not reached".to_string(), |t| format!("{t} min"))
    };
    println!("\nResult at {} min:", result.time);
    println!("  Rectal temperature: {:.2} °C", result.t_re);
    println!("  Total water loss:   {:.0} g", result.sw_tot_g);
    println!("  D_Tre:  {}", limit(result.d_lim_t_re));
    println!("  Dwl50:  {}", limit(result.d_lim_loss_50));
    println!("  Dwl95:  {}", limit(result.d_lim_loss_95));
}

fn print_comparison(comparison: &Comparison) {
    println!("\nComparison with expected values:");
    for check in &comparison.checks {
        println!(
            "  {} {:<7} simulated={:.2} target={:.2}",
            if check.pass { "✓" } else { "✗" },
            check.column,
            check.simulated,
            check.target
        );
    }
    if comparison.passed() {
        println!("✓ All columns within tolerance");
    } else {
        println!("✗ {} column(s) outside tolerance", comparison.failures().count());
    }
}
