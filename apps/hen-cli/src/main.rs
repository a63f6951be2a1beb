mod error;
mod report;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use hen_core::units::{k, raw};
use hen_model::{CaseStudy, NetworkState, StreamKind};
use hen_optim::{GaProgress, GaStage, GeneticAlgorithm};
use rand::SeedableRng;
use rand::rngs::StdRng;
use report::RunReport;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hen-cli")]
#[command(about = "Heat-exchanger network retrofit optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case-study file
    Validate {
        /// Path to the case-study YAML or JSON file
        case_path: PathBuf,
    },
    /// Show dimensions and the evaluated as-built network
    Inspect {
        /// Path to the case-study YAML or JSON file
        case_path: PathBuf,
    },
    /// Run the topology and duty search
    Optimize {
        /// Path to the case-study YAML or JSON file
        case_path: PathBuf,
        /// Algorithm settings (YAML or JSON); defaults apply when omitted
        #[arg(long)]
        algorithm: Option<PathBuf>,
        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the number of worker threads
        #[arg(long)]
        workers: Option<usize>,
        /// Write the hall of fame as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Inspect { case_path } => cmd_inspect(&case_path),
        Commands::Optimize {
            case_path,
            algorithm,
            seed,
            workers,
            json,
        } => cmd_optimize(&case_path, algorithm.as_deref(), seed, workers, json),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_case(path: &Path) -> CliResult<CaseStudy> {
    let case = if is_json(path) {
        hen_project::load_case_json(path)?
    } else {
        hen_project::load_case_yaml(path)?
    };
    Ok(case)
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case study: {}", case_path.display());
    let case = load_case(case_path)?;
    println!("✓ Case study '{}' is valid", case.name);
    Ok(())
}

fn cmd_inspect(case_path: &Path) -> CliResult<()> {
    let case = load_case(case_path)?;
    println!("Case study: {}", case.name);
    println!("  Operating cases: {}", case.number_operating_cases());
    println!(
        "  Hot streams: {} ({} utility)",
        case.hot_streams.len(),
        case.utility_indices(StreamKind::Hot).len()
    );
    println!(
        "  Cold streams: {} ({} utility)",
        case.cold_streams.len(),
        case.utility_indices(StreamKind::Cold).len()
    );
    println!("  Enthalpy stages: {}", case.enthalpy_stages);
    println!("  Exchangers: {}", case.number_exchangers());
    println!("  Balance utilities: {}", case.balance_utilities.len());

    // mixer choice is only random when both sides are equally valid
    let mut rng = StdRng::seed_from_u64(0);
    let state = NetworkState::evaluate(&case, &case.initial_topology(), &case.initial_duties, &mut rng)?;

    println!("\nAs-built network:");
    println!(
        "  Feasible: {}{}",
        if state.is_feasible() { "yes" } else { "no" },
        if state.is_feasible() {
            String::new()
        } else {
            format!(" (distance {:.1})", state.quadratic_distance())
        }
    );
    for oc in 0..case.number_operating_cases() {
        println!("  Operating case {}:", oc + 1);
        for (i, stream) in case.hot_streams.iter().enumerate().filter(|(_, s)| !s.is_utility()) {
            println!(
                "    {:<10} outlet {:>8.2} °C",
                stream.name,
                raw::celsius(k(state.temperatures.hot_outlet(i, oc)))
            );
        }
        for (i, stream) in case.cold_streams.iter().enumerate().filter(|(_, s)| !s.is_utility()) {
            println!(
                "    {:<10} outlet {:>8.2} °C",
                stream.name,
                raw::celsius(k(state.temperatures.cold_outlet(i, oc)))
            );
        }
    }
    for (i, (area, initial)) in state.areas().iter().zip(&case.exchangers).enumerate() {
        println!(
            "  Exchanger {:>3}: area {:>9.2} m² (installed {:.2} m²)",
            i + 1,
            area,
            initial.area
        );
    }
    let capital = &state.capital;
    println!("\nCosts:");
    println!("  Capital:        {:>14.2}", capital.total());
    println!("    exchangers    {:>14.2}", capital.exchangers);
    println!("    balance       {:>14.2}", capital.balance_exchangers);
    println!("    mixers        {:>14.2}", capital.mixers);
    println!(
        "    restructuring {:>14.2}",
        capital.splits + capital.repipe + capital.resequence + capital.matches
    );
    println!("  Operating:      {:>14.2} /a", state.operating_costs);
    println!("  Emissions:      {:>14.3} t/a", state.operating_emissions);
    println!("  TAC:            {:>14.2} /a", state.total_annual_cost());
    Ok(())
}

fn cmd_optimize(
    case_path: &Path,
    algorithm_path: Option<&Path>,
    seed: Option<u64>,
    workers: Option<usize>,
    json: bool,
) -> CliResult<()> {
    let case = load_case(case_path)?;
    let mut config = match algorithm_path {
        Some(path) if is_json(path) => hen_project::load_algorithm_json(path)?,
        Some(path) => hen_project::load_algorithm_yaml(path)?,
        None => Default::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(workers) = workers {
        if workers == 0 {
            return Err(CliError::InvalidInput("--workers must be positive".to_string()));
        }
        config.pool.workers = Some(workers);
    }

    info!(
        case = %case.name,
        seed = config.seed,
        workers = ?config.pool.workers,
        "optimizer configured"
    );
    let ga = GeneticAlgorithm::new(&case, &config)?;
    let outcome = if json {
        ga.run(None)?
    } else {
        println!("Optimizing case study: {}", case.name);
        let mut last_emit = Instant::now();
        let outcome = ga.run(Some(&mut |event| {
            if event.stage != GaStage::Generation || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_emit = Instant::now();
            }
        }))?;
        clear_progress_line();
        outcome
    };

    if json {
        let report = RunReport::new(&case.name, config.seed, &outcome);
        let stdout = io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &report)?;
        println!();
        return Ok(());
    }

    println!(
        "✓ Search completed: {} generations, {} topology evaluations",
        outcome.generations, outcome.evaluations
    );
    if outcome.hall_of_fame.is_empty() {
        println!("No feasible retrofit found");
        return Ok(());
    }
    println!("\nHall of fame:");
    for (rank, entry) in outcome.hall_of_fame.entries().iter().enumerate() {
        let exchangers = entry.topology.iter().filter(|a| a.exists).count();
        println!(
            "  #{:<2} indicator={:.4}  exchangers={}  front={}",
            rank + 1,
            entry.indicator,
            exchangers,
            entry.front.len()
        );
        if let Some(best) = entry.representative() {
            println!(
                "      TAC={:.2}  capital={:.2}  operating={:.2}  emissions={:.3}",
                best.summary.total_annual_cost,
                best.summary.capital_costs,
                best.summary.operating_costs,
                best.summary.operating_emissions
            );
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &GaProgress) {
    let width = 28usize;
    let filled = ((event.fraction_complete() * width as f64).round() as usize).min(width);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(width.saturating_sub(filled)));
    let label = match event.stage {
        GaStage::EvaluatingInitialPopulation => "initial population",
        GaStage::Generation => "evolving",
        GaStage::Completed => "done",
    };
    let best = event
        .best_indicator
        .map(|b| format!("{b:.4}"))
        .unwrap_or_else(|| "-".to_string());
    print!(
        "\r[{}] gen {}/{}  {}  evals={}  best={}  elapsed={:.1}s",
        bar,
        event.generation,
        event.max_generations,
        label,
        event.evaluations,
        best,
        event.elapsed_wall_s
    );
    let _ = io::stdout().flush();
}
