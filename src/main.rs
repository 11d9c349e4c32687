//! ofregress - Regression Test Harness for OpenFAST-style Simulation Executables
//!
//! A CLI tool that drives automated regression testing of an external
//! numerical-simulation executable: it prepares per-case working
//! directories, runs the binary under a bounded worker pool, and judges
//! the produced time-series outputs against stored baselines with
//! tolerance-based norms.
//!
//! ## Usage
//!
//! ```bash
//! # Compare previously produced outputs for every case
//! ofregress run --source /path/to/repo
//!
//! # Execute two cases with both drivers, then compare
//! ofregress run --source /path/to/repo --execute \
//!     -x /path/to/openfast -x /path/to/beamdyn_driver \
//!     --case AOC_WSt --case bd_curved_beam
//!
//! # List the registered cases
//! ofregress list --category beamdyn
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod catalog;
mod cli;
mod config;
mod executor;
mod loader;
mod norms;
mod report;
mod workspace;

use catalog::{CaseCatalog, Category};
use cli::Args;
use config::{Compiler, ConfigError, FileDefaults, PlotMode, RunPlan, SystemKind};
use executor::ExecutionDispatcher;
use loader::TextOutputLoader;
use report::{NoopRenderer, Report, ResultAggregator};
use workspace::WorkspacePlanner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        cli::Command::Run(run_args) => {
            run_cases(run_args, args.verbose).await?;
        }
        cli::Command::List(list_args) => {
            list_cases(list_args);
        }
    }

    Ok(())
}

/// Build the validated plan, materialize and execute if requested, then
/// compare and report.
///
/// The process exits nonzero only when configuration or materialization
/// fails; failing or skipped cases surface in the tally, not the exit code.
async fn run_cases(args: cli::RunArgs, verbose: bool) -> Result<()> {
    let catalog = CaseCatalog::new();

    let defaults = match &args.config {
        Some(path) => FileDefaults::load(path)?,
        None => FileDefaults::discover()?,
    };

    let compiler = match args.compiler.or(defaults.compiler) {
        Some(name) => {
            Compiler::from_str(&name).ok_or(ConfigError::UnknownCompiler(name.clone()))?
        }
        None => Compiler::Gnu,
    };
    let system = match args.system.or(defaults.system) {
        Some(name) => {
            SystemKind::from_str(&name).ok_or(ConfigError::UnknownSystem(name.clone()))?
        }
        None => SystemKind::host(),
    };
    let plot = PlotMode::from_flag(args.plot.or(defaults.plot).unwrap_or(0))?;

    let plan = RunPlan::new(args.cases, args.source)
        .with_compiler(compiler)
        .with_system(system)
        .with_tolerance(args.tolerance.or(defaults.tolerance).unwrap_or(1e-5))
        .with_plot(plot)
        .with_plot_path(args.plot_path)
        .with_execution(args.execute)
        .with_verbose(verbose)
        .with_jobs(args.jobs.or(defaults.jobs).unwrap_or(-1))
        .with_executables(&args.executables)
        .validated(&catalog)?;

    info!(
        "comparing {} cases against {} baselines (tolerance {:e})",
        plan.cases.len(),
        plan.output_type,
        plan.tolerance
    );

    let planner = WorkspacePlanner::new(&plan, &catalog);
    let layouts = planner.layouts()?;

    let started_at = Utc::now();
    if plan.execution {
        planner.materialize(&layouts)?;

        let dispatcher = ExecutionDispatcher::new(&plan)?;
        let results = dispatcher.run(&plan, &layouts).await;
        println!("{}", executor::tally(&results));
    }

    let loader = TextOutputLoader::new();
    let aggregator = ResultAggregator::new(&plan, &loader, &NoopRenderer);
    let report = Report::new(aggregator.evaluate_cases(&layouts), started_at);

    match args.format.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => println!("{report}"),
    }

    Ok(())
}

fn list_cases(args: cli::ListArgs) {
    let catalog = CaseCatalog::new();

    let filter = match args.category.as_deref() {
        Some(name) => match Category::from_str(name) {
            Some(category) => Some(category),
            None => {
                println!("Unknown category: {name}. Use regression, linear, or beamdyn.");
                return;
            }
        },
        None => None,
    };

    println!("\nRegistered cases ({} total)\n", catalog.len());
    println!("──────────────────────────────────────────────────────────");

    for (name, category) in catalog.iter() {
        if filter.is_some_and(|f| f != category) {
            continue;
        }
        println!("  {name:44} [{category}]");
    }

    println!("──────────────────────────────────────────────────────────\n");
}
