//! `kinbridge-cli` – command line front end for the kinematics adapter.
//!
//! Runs IK and FK queries against the demo gantry cell:
//!
//! ```text
//! kinbridge fk 0.1 0.2 0.3 0.0 0.5 0.0
//! kinbridge ik --xyz 0.4 0.2 0.6 --rpy 0 0 1.57 --seed 0 0 0 0 0 0
//! kinbridge --rail 0.5 ik --xyz 0.4 0.2 0.6 --rpy 0 0 0 --all
//! kinbridge init-config
//! ```
//!
//! Settings come from `~/.kinbridge/config.toml` (or `--config PATH`) with
//! `KINBRIDGE_*` environment overrides.  Exit status is 0 on success, 1 on a
//! configuration or solver error and 2 when the pose has no IK solution.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use kinbridge_core::KinematicsAdapter;
use kinbridge_frames::RigidTransform;
use kinbridge_frames::pose::{from_xyz_rpy, to_xyz_rpy};
use kinbridge_sim::{DemoCell, demo_cell};
use kinbridge_types::{JointConfiguration, KinError};
use serde_json::json;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "kinbridge")]
#[command(about = "World-frame IK/FK over an analytic solver", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.kinbridge/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rail position in meters, overriding the config
    #[arg(long, global = true, allow_negative_numbers = true)]
    rail: Option<f64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward kinematics: TCP pose in the world frame
    Fk {
        /// Joint values in chain order
        #[arg(num_args = 6, required = true, allow_negative_numbers = true)]
        joints: Vec<f64>,
    },

    /// Inverse kinematics for a TCP pose in the world frame
    Ik {
        /// Target position
        #[arg(
            long,
            num_args = 3,
            required = true,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true
        )]
        xyz: Vec<f64>,

        /// Target orientation as roll, pitch, yaw in radians
        #[arg(
            long,
            num_args = 3,
            default_values_t = [0.0, 0.0, 0.0],
            value_names = ["R", "P", "Y"],
            allow_negative_numbers = true
        )]
        rpy: Vec<f64>,

        /// Seed the closest solution is chosen against (defaults to all zeros)
        #[arg(long, num_args = 6, allow_negative_numbers = true)]
        seed: Option<Vec<f64>>,

        /// Print every solution instead of the closest one
        #[arg(long)]
        all: bool,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// What a successful command produced.
enum Outcome {
    Done,
    NoSolution,
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "warn" so query output stays
    // readable); KINBRIDGE_LOG_FORMAT=json switches to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("KINBRIDGE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::NoSolution) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, String> {
    let path = cli.config.clone().unwrap_or_else(config::config_path);

    if let Commands::InitConfig { force } = cli.command {
        if path.exists() && !force {
            return Err(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ));
        }
        config::save_to(&config::Config::default(), &path)?;
        println!("{} Config written to {}", "✓".green().bold(), path.display());
        return Ok(Outcome::Done);
    }

    let mut cfg = config::load_or_default(&path)?;
    if let Some(rail) = cli.rail {
        cfg.rail_position = rail;
    }
    debug!(config = ?cfg, path = %path.display(), "configuration resolved");

    let (_cell, adapter) = build_adapter(&cfg).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Fk { joints } => {
            let pose = adapter
                .solve_fk(&JointConfiguration::new(joints))
                .map_err(|e| e.to_string())?;
            print_pose(&pose, cli.json);
            Ok(Outcome::Done)
        }
        Commands::Ik {
            xyz,
            rpy,
            seed,
            all,
        } => {
            let pose = from_xyz_rpy([xyz[0], xyz[1], xyz[2]], [rpy[0], rpy[1], rpy[2]]);
            let solutions = if all {
                adapter
                    .solve_all_ik(&pose)
                    .map_err(|e| e.to_string())?
                    .into_vec()
            } else {
                let seed = seed
                    .map(JointConfiguration::new)
                    .unwrap_or_else(|| JointConfiguration::zeros(adapter.dof()));
                adapter
                    .solve_ik(&pose, &seed)
                    .map_err(|e| e.to_string())?
                    .into_iter()
                    .collect()
            };

            if solutions.is_empty() {
                info!("no IK solution");
                if cli.json {
                    println!("{}", json!({ "solutions": [] }));
                } else {
                    println!("{}", "no solution".yellow());
                }
                return Ok(Outcome::NoSolution);
            }
            print_solutions(&solutions, cli.json);
            Ok(Outcome::Done)
        }
        Commands::InitConfig { .. } => Ok(Outcome::Done),
    }
}

/// Demo cell with the rail placed per `cfg`, plus an initialized adapter.
fn build_adapter(cfg: &config::Config) -> Result<(DemoCell, KinematicsAdapter), KinError> {
    let mut cell = demo_cell()?;
    cell.set_rail(cfg.rail_position)?;
    let mut adapter = KinematicsAdapter::new(
        cell.chain.clone(),
        cfg.adapter.clone(),
        Box::new(cell.solver()),
    )?;
    adapter.initialize(&cell.tree)?;
    Ok((cell, adapter))
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_pose(pose: &RigidTransform, as_json: bool) {
    let (xyz, rpy) = to_xyz_rpy(pose);
    if as_json {
        println!("{}", json!({ "xyz": xyz, "rpy": rpy }));
        return;
    }
    println!("  {} {}", "xyz".bold(), format_values(&xyz));
    println!("  {} {}", "rpy".bold(), format_values(&rpy));
}

fn print_solutions(solutions: &[JointConfiguration], as_json: bool) {
    if as_json {
        println!("{}", json!({ "solutions": solutions }));
        return;
    }
    for (i, q) in solutions.iter().enumerate() {
        println!("  {} {}", format!("[{i}]").dimmed(), format_values(q));
    }
}

fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:>10.6}"))
        .collect::<Vec<_>>()
        .join(" ")
}
