//! CLI argument parsing
//!
//! Defines the command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Regression test harness for OpenFAST-style simulation executables
#[derive(Parser, Debug)]
#[command(name = "ofregress")]
#[command(version = "0.1.0")]
#[command(about = "Run simulation regression cases and judge them against stored baselines")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run regression cases and compare their outputs against baselines
    Run(RunArgs),

    /// List the registered cases
    List(ListArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Case name to run (repeatable), or "all"
    #[arg(short, long = "case", default_value = "all")]
    pub cases: Vec<String>,

    /// Simulation executable path (repeatable); a beamdyn_driver-suffixed
    /// path selects the beamdyn driver, anything else the general executable
    #[arg(short = 'x', long = "executable")]
    pub executables: Vec<PathBuf>,

    /// Source repository root
    #[arg(short, long)]
    pub source: PathBuf,

    /// Compiler the stored baselines were built with (intel, gnu)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Operating system of the stored baselines (macos, linux, windows);
    /// defaults to the host
    #[arg(long)]
    pub system: Option<String>,

    /// Error tolerance for the pass/fail verdict
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Plot mode: 0 no plots, 1 all cases, 2 failing cases only
    #[arg(short, long)]
    pub plot: Option<u8>,

    /// Directory for rendered case summaries (default: each case's build
    /// directory)
    #[arg(long)]
    pub plot_path: Option<PathBuf>,

    /// Execute the simulation before comparing
    #[arg(short, long)]
    pub execute: bool,

    /// Maximum parallel jobs; -1 resolves to 80% of the available cores
    #[arg(short, long, allow_hyphen_values = true)]
    pub jobs: Option<i64>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Defaults file (YAML or JSON); explicit flags win over it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show cases of this category (regression, linear, beamdyn)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_parsing() {
        let args = Args::parse_from([
            "ofregress",
            "run",
            "--case",
            "AOC_WSt",
            "--case",
            "bd_curved_beam",
            "--source",
            "/repo",
            "--tolerance",
            "1e-4",
            "--jobs",
            "-1",
            "--execute",
        ]);

        match args.command {
            Command::Run(run) => {
                assert_eq!(run.cases, ["AOC_WSt", "bd_curved_beam"]);
                assert_eq!(run.source, PathBuf::from("/repo"));
                assert_eq!(run.tolerance, Some(1e-4));
                assert_eq!(run.jobs, Some(-1));
                assert!(run.execute);
                assert_eq!(run.format, "table");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn case_selector_defaults_to_all() {
        let args = Args::parse_from(["ofregress", "run", "--source", "/repo"]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.cases, ["all"]);
                assert_eq!(run.tolerance, None);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn two_executables_are_accepted() {
        let args = Args::parse_from([
            "ofregress",
            "run",
            "--source",
            "/repo",
            "-x",
            "/bin/openfast",
            "-x",
            "/bin/beamdyn_driver",
        ]);
        match args.command {
            Command::Run(run) => assert_eq!(run.executables.len(), 2),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn list_args_parsing() {
        let args = Args::parse_from(["ofregress", "list", "--category", "beamdyn", "--verbose"]);
        assert!(args.verbose);
        match args.command {
            Command::List(list) => assert_eq!(list.category.as_deref(), Some("beamdyn")),
            _ => panic!("Expected List command"),
        }
    }
}
