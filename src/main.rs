use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fuzzy_autodiag::diagnosis::{DiagnosticSession, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE};
use fuzzy_autodiag::{LinguisticVariable, Memberships};

/// Fuzzy engine diagnosis: how urgently should a mechanic look at the car?
#[derive(Parser, Debug)]
#[command(name = "autodiag", version, about)]
struct Cli {
    /// Engine temperature in °C (0 to 120)
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE, allow_negative_numbers = true)]
    temperature: f64,

    /// Oil pressure in PSI (0 to 100)
    #[arg(short, long, default_value_t = DEFAULT_PRESSURE, allow_negative_numbers = true)]
    pressure: f64,

    /// Also print the aggregated action curve
    #[arg(short, long)]
    curves: bool,

    /// Log engine internals (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "fuzzy_autodiag=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut session = DiagnosticSession::new().context("failed to build the diagnosis system")?;
    let temperature = clamp_reading(session.temperature_variable(), cli.temperature);
    let pressure = clamp_reading(session.pressure_variable(), cli.pressure);

    session.set_inputs(temperature, pressure);

    let urgency = session.recompute().context("failed to evaluate the readings")?;

    println!("temperature: {temperature:.1} °C");
    print_memberships(session.temperature_memberships());
    println!("pressure:    {pressure:.1} PSI");
    print_memberships(session.pressure_memberships());
    println!();

    for (i, (premise, consequence, strength)) in session.rule_report().enumerate() {
        println!("rule {}: if {premise} then {consequence}  [{strength:.3}]", i + 1);
    }

    println!();
    println!("urgency:   {urgency:.2}");
    print_memberships(session.action_memberships());
    println!("diagnosis: {}", session.diagnosis());

    if cli.curves {
        println!();
        println!("aggregated action curve:");
        for (u, m) in session.action_variable().universe().points().iter().zip(session.aggregated()) {
            if *m > 0. {
                println!("  {u:>5.1}  {m:.3}  {}", "#".repeat((m * 40.).round() as usize));
            }
        }
    }

    Ok(())
}

/// Readings outside a variable's domain are pulled back onto its edge, the
/// way the dashboard's text fields do it.
fn clamp_reading(var: &LinguisticVariable, value: f64) -> f64 {
    let clamped = var.universe().clamp(value);

    if clamped != value {
        warn!(variable = var.name(), value, clamped, "reading outside of the domain, clamped");
    }

    clamped
}

fn print_memberships(memberships: Option<&Memberships>) {
    let Some(memberships) = memberships else {
        return;
    };
    let line: Vec<_> = memberships
        .iter()
        .map(|(term, degree)| format!("{term}={degree:.3}"))
        .collect();

    println!("  {}", line.join("  "));
}
