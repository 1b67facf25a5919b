//! Slate Builder CLI
//!
//! CSV feature tables + market lines -> slate prediction report (JSON).
//! This is the external-script surface; the engine itself stays pure.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gs_core::{predict_slate_with_injuries, EngineConfig};
use slate_builder::{load_injuries, load_market_lines, load_repository};

#[derive(Parser)]
#[command(name = "slate_builder")]
#[command(about = "Run a slate of games through the simulation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate every game on a slate and write the report
    Run {
        /// Directory holding the weekly feature CSVs
        #[arg(long)]
        features: PathBuf,

        /// Market lines CSV (away_team,home_team,season,week,spread,total)
        #[arg(long)]
        lines: PathBuf,

        /// Optional injuries CSV
        #[arg(long)]
        injuries: Option<PathBuf>,

        /// Monte Carlo trials per game
        #[arg(long, default_value = "10000")]
        trials: u32,

        /// Master seed; reruns with the same seed are bit-identical
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Keep raw score pairs on each report for diagnostics
        #[arg(long, default_value = "false")]
        keep_raw: bool,

        /// Output JSON file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load the feature tables and print row counts
    Inspect {
        /// Directory holding the weekly feature CSVs
        #[arg(long)]
        features: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            features,
            lines,
            injuries,
            trials,
            seed,
            keep_raw,
            out,
        } => {
            let repo = load_repository(&features)?;
            let market_lines = load_market_lines(&lines)?;
            let injury_map = match injuries {
                Some(path) => load_injuries(&path)?,
                None => Default::default(),
            };

            let config = EngineConfig {
                trials,
                keep_raw_trials: keep_raw,
                ..Default::default()
            };

            let reports =
                predict_slate_with_injuries(&repo, &market_lines, &injury_map, &config, seed)
                    .context("slate prediction failed")?;

            let json = serde_json::to_string_pretty(&reports)?;
            match out {
                Some(path) => {
                    let mut file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    file.write_all(json.as_bytes())?;
                    eprintln!("wrote {} reports to {}", reports.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Inspect { features } => {
            let repo = load_repository(&features)?;
            println!("efficiency:     {} rows", repo.efficiency.rows.len());
            println!("pace:           {} rows", repo.pace.rows.len());
            println!("turnover:       {} rows", repo.turnover.rows.len());
            println!("red_zone:       {} rows", repo.red_zone.rows.len());
            println!("special_teams:  {} rows", repo.special_teams.rows.len());
            println!("matchup_grades: {} rows", repo.matchup_grades.rows.len());
            println!("qb_splits:      {} rows", repo.qb_splits.rows.len());
            println!("play_calling:   {} rows", repo.play_calling.len());
            println!("teams:          {}", repo.teams().len());
        }
    }
    Ok(())
}
