//! Tic-tac-toe heuristic audit
//!
//! Plays every possible human line against the rule-based solver and reports
//! how often each side wins, optionally exporting the solver's full policy.

mod audit;
mod export;
mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ttt_core::Mark;

use crate::audit::{format_line, AuditConfig};

#[derive(Parser, Debug)]
#[command(name = "audit", about = "Exhaustive audit of the tic-tac-toe solver")]
struct Cli {
    /// Side the human plays (circle or cross)
    #[arg(long, default_value = "circle")]
    human: Mark,

    /// Let the solver make the opening move
    #[arg(long)]
    ai_first: bool,

    /// Write the solver policy table to this SQLite file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Number of human-winning lines to print
    #[arg(long, default_value_t = 5)]
    show_losses: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Tic-Tac-Toe Solver Audit");
    println!("========================");
    println!("Human plays: {:?}", cli.human);
    println!("Opening: {}", if cli.ai_first { "solver" } else { "human" });
    println!();

    let config = AuditConfig {
        human: cli.human,
        solver_first: cli.ai_first,
        keep_losses: cli.show_losses,
    };
    info!(?config, "starting audit");
    let report = audit::run(&config);

    report.stats.print_summary(report.policy.len());

    if !report.losses.is_empty() {
        println!();
        println!("Lines the solver loses:");
        for line in &report.losses {
            println!("  {}", format_line(line));
        }
    }

    if let Some(path) = &cli.export {
        let count = export::export(path, &report.policy)?;
        println!();
        println!("Exported {} positions to {}", count, path.display());
    }

    Ok(())
}
