//! Audit statistics tracking.

use std::time::Instant;

use ttt_core::{Mark, Outcome};

/// Counters collected while walking the game tree.
#[derive(Debug)]
pub struct AuditStats {
    /// Positions where the human was to move (paths, not unique boards)
    pub nodes: u64,

    /// Human moves tried across all nodes
    pub human_moves: u64,

    /// Solver replies played
    pub solver_moves: u64,

    /// Breakdown of terminal outcomes
    pub human_wins: u64,
    pub solver_wins: u64,
    pub ties: u64,

    /// Deepest finished game, in plies
    pub max_depth: u64,

    start_time: Instant,
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStats {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            human_moves: 0,
            solver_moves: 0,
            human_wins: 0,
            solver_wins: 0,
            ties: 0,
            max_depth: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a finished game.
    pub fn record_terminal(&mut self, outcome: Outcome, human: Mark, plies: u64) {
        match outcome.winner() {
            Some(winner) if winner == human => self.human_wins += 1,
            Some(_) => self.solver_wins += 1,
            None => self.ties += 1,
        }
        self.max_depth = self.max_depth.max(plies);
    }

    /// Number of finished games (leaves of the tree).
    pub fn terminals(&self) -> u64 {
        self.human_wins + self.solver_wins + self.ties
    }

    /// Print final summary
    pub fn print_summary(&self, unique_positions: usize) {
        let total = self.terminals().max(1) as f64;
        println!("Human-to-move nodes: {}", self.nodes);
        println!("Unique solver positions: {}", unique_positions);
        println!("Human moves tried: {}", self.human_moves);
        println!("Solver replies: {}", self.solver_moves);
        println!("Finished games: {}", self.terminals());
        println!(
            "  - Human wins:  {} ({:.2}%)",
            self.human_wins,
            100.0 * self.human_wins as f64 / total
        );
        println!(
            "  - Solver wins: {} ({:.2}%)",
            self.solver_wins,
            100.0 * self.solver_wins as f64 / total
        );
        println!(
            "  - Ties:        {} ({:.2}%)",
            self.ties,
            100.0 * self.ties as f64 / total
        );
        println!("Max depth: {} plies", self.max_depth);
        println!("Time: {:.3}s", self.start_time.elapsed().as_secs_f64());
    }
}
