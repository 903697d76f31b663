use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use eco_core::{compute_summary, Catalog, EcoState, EcoSummary, Target};
use eco_world::{build_initial_state, load_catalog, load_snapshot};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "eco_cli", about = "Eco simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance a snapshot to a target round, printing status at round boundaries.
    Run {
        /// Initial snapshot JSON (cash, eco, assets, queues).
        #[arg(long = "state")]
        state_file: PathBuf,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Round to stop at; fractional rounds land inside the round.
        #[arg(long)]
        target_round: f64,
        /// Largest single step in seconds.
        #[arg(long, default_value_t = eco_core::DEFAULT_INTERVAL)]
        interval: f64,
        #[arg(long, default_value_t = 1)]
        print_every: u32,
        /// Also write the final summary as JSON to this path.
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunArgs {
    state_file: PathBuf,
    content_dir: String,
    target_round: f64,
    interval: f64,
    print_every: u32,
    summary_json: Option<PathBuf>,
}

fn run(args: &RunArgs) -> Result<()> {
    if !args.target_round.is_finite() || args.target_round < 0.0 {
        bail!("--target-round must be a non-negative number");
    }
    let catalog = load_catalog(&args.content_dir)?;
    let snapshot = load_snapshot(&args.state_file)?;
    let mut state = build_initial_state(&catalog, &snapshot)?;
    let print_every = args.print_every.max(1);

    println!(
        "Starting simulation: round={} time={:.1} cash={:.0} eco={:.1} content_version={}",
        state.meta.round,
        state.meta.time,
        state.portfolio.wallet.cash,
        state.portfolio.wallet.eco,
        catalog.content_version,
    );
    println!("{}", "-".repeat(80));

    let mut markers_seen = state.markers.len();
    let mut boundary = state.meta.round + 1;
    while f64::from(boundary) < args.target_round {
        let target = Target::Round(f64::from(boundary));
        eco_core::fast_forward(&mut state, &catalog, target, args.interval);
        markers_seen = print_markers(&state, markers_seen);
        if boundary % print_every == 0 {
            print_status(&state, &catalog);
        }
        boundary += 1;
    }
    eco_core::fast_forward(&mut state, &catalog, Target::Round(args.target_round), args.interval);
    print_markers(&state, markers_seen);

    println!("{}", "-".repeat(80));
    println!("Done. Final state at round {}:", state.meta.round);
    let summary = compute_summary(&state, &catalog);
    print_summary(&summary);

    let warnings: Vec<&str> = state.log.warnings().collect();
    if !warnings.is_empty() {
        println!("\n{} warning(s):", warnings.len());
        for warning in warnings {
            println!("  - {warning}");
        }
    }

    if let Some(path) = &args.summary_json {
        write_summary(path, &summary)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

/// Markers are printed as they happen, regardless of print_every.
fn print_markers(state: &EcoState, seen: usize) -> usize {
    for marker in &state.markers[seen..] {
        println!("*** {:?} at t={:.1}: {} ***", marker.kind, marker.time, marker.message);
    }
    state.markers.len()
}

fn print_status(state: &EcoState, catalog: &Catalog) {
    let summary = compute_summary(state, catalog);
    println!(
        "[round={round:02}  t={time:7.1}]  cash={cash:9.0}  eco={eco:7.1}  loan={loan:6.0}  \
         send={send}  farms={farms}  boats={boats}  droppers={droppers}",
        round = summary.round,
        time = summary.time,
        cash = summary.cash,
        eco = summary.eco,
        loan = summary.loan,
        send = state.send.strategy,
        farms = summary.farm_count,
        boats = summary.boat_count,
        droppers = summary.druid_count + summary.supply_drop_count + summary.heli_count,
    );
}

fn print_summary(summary: &EcoSummary) {
    println!("{:<20} {:>12.1}", "time", summary.time);
    println!("{:<20} {:>12.0}", "cash", summary.cash);
    println!("{:<20} {:>12.1}", "eco", summary.eco);
    println!("{:<20} {:>12.0}", "loan", summary.loan);
    println!("{:<20} {:>12}", "farms", summary.farm_count);
    println!("{:<20} {:>12.0}", "bank balance", summary.bank_balance);
    println!("{:<20} {:>12}", "boats", summary.boat_count);
    println!(
        "{:<20} {:>4}/{:>3}/{:>3}",
        "druids/drops/helis", summary.druid_count, summary.supply_drop_count, summary.heli_count
    );
    println!("{:<20} {:>12.0}", "farm income/round", summary.farm_income);
    println!("{:<20} {:>12.0}", "boat income/round", summary.boat_income);
    println!("{:<20} {:>12.0}", "revenue", summary.total_revenue);
    println!("{:<20} {:>12.0}", "expenses", summary.total_expenses);
}

fn write_summary(path: &Path, summary: &EcoSummary) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            state_file,
            content_dir,
            target_round,
            interval,
            print_every,
            summary_json,
        } => run(&RunArgs {
            state_file,
            content_dir,
            target_round,
            interval,
            print_every,
            summary_json,
        })?,
    }
    Ok(())
}
