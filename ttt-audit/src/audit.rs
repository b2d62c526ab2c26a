//! Exhaustive walk of every human line against the heuristic.
//!
//! The human branches over every empty cell; the solver's reply is
//! deterministic, so each human-to-move position has one child per empty
//! cell. The tree is small (a few thousand nodes) and walked with an
//! explicit stack.

use std::collections::BTreeMap;

use tracing::debug;

use ttt_core::{solver, Board, Coord, Mark};

use crate::stats::AuditStats;

/// Audit settings.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Side the human plays; the solver takes the other.
    pub human: Mark,
    /// Let the solver make the opening move.
    pub solver_first: bool,
    /// How many human-winning lines to keep for reporting.
    pub keep_losses: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            human: Mark::Circle,
            solver_first: false,
            keep_losses: 5,
        }
    }
}

/// A solver decision recorded for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    pub reply: Coord,
    pub rule: &'static str,
}

/// Result of a full walk.
#[derive(Debug)]
pub struct AuditReport {
    pub stats: AuditStats,
    /// Board encoding (solver to move) -> solver reply.
    pub policy: BTreeMap<u32, PolicyEntry>,
    /// First few move sequences (both sides, in order) the human won.
    pub losses: Vec<Vec<Coord>>,
}

/// Stack frame for iterative DFS.
struct Frame {
    /// Board with the human to move
    board: Board,
    /// Moves from the empty board to here
    path: Vec<Coord>,
    /// Solver replies made so far (the solver's turn index)
    solver_turn: u32,
}

/// Play the solver on `board`, recording its decision.
fn solver_reply(
    board: &mut Board,
    side: Mark,
    turn: u32,
    policy: &mut BTreeMap<u32, PolicyEntry>,
) -> Option<Coord> {
    let key = board.to_bits();
    let (rule, _) = solver::choose(board, side)?;
    let reply = solver::next_move(board, turn, side == Mark::Circle)?;
    policy.entry(key).or_insert(PolicyEntry { reply, rule });
    Some(reply)
}

/// Walk the whole tree.
pub fn run(config: &AuditConfig) -> AuditReport {
    let human = config.human;
    let side = human.opponent();
    let mut stats = AuditStats::new();
    let mut policy = BTreeMap::new();
    let mut losses = Vec::new();

    let mut root = Frame {
        board: Board::new(),
        path: Vec::new(),
        solver_turn: 0,
    };
    if config.solver_first {
        if let Some(opening) = solver_reply(&mut root.board, side, 0, &mut policy) {
            root.path.push(opening);
            root.solver_turn = 1;
            stats.solver_moves += 1;
        }
    }

    let mut stack = vec![root];

    while let Some(frame) = stack.pop() {
        stats.nodes += 1;

        // Push in reverse so children are explored in row-major order.
        let cells: Vec<Coord> = frame.board.empty_cells().collect();
        for &cell in cells.iter().rev() {
            stats.human_moves += 1;

            let mut board = frame.board;
            board.set_at(cell, human);
            let mut path = frame.path.clone();
            path.push(cell);

            if board.is_terminal() {
                finish(&mut stats, &mut losses, config, &board, path);
                continue;
            }

            let Some(reply) = solver_reply(&mut board, side, frame.solver_turn, &mut policy)
            else {
                continue;
            };
            stats.solver_moves += 1;
            path.push(reply);

            if board.is_terminal() {
                finish(&mut stats, &mut losses, config, &board, path);
            } else {
                stack.push(Frame {
                    board,
                    path,
                    solver_turn: frame.solver_turn + 1,
                });
            }
        }
    }

    debug!(nodes = stats.nodes, positions = policy.len(), "audit walk complete");

    AuditReport {
        stats,
        policy,
        losses,
    }
}

fn finish(
    stats: &mut AuditStats,
    losses: &mut Vec<Vec<Coord>>,
    config: &AuditConfig,
    board: &Board,
    path: Vec<Coord>,
) {
    let outcome = board.outcome();
    stats.record_terminal(outcome, config.human, path.len() as u64);
    if outcome.winner() == Some(config.human) && losses.len() < config.keep_losses {
        losses.push(path);
    }
}

/// Format a move sequence as `(x,y) (x,y) ...`.
pub fn format_line(path: &[Coord]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttt_core::Outcome;

    fn replay(path: &[Coord], first: Mark) -> Board {
        let mut board = Board::new();
        let mut mover = first;
        for &c in path {
            assert!(board.set_at(c, mover), "illegal replay at {c}");
            mover = mover.opponent();
        }
        board
    }

    #[test]
    fn test_every_human_move_is_accounted_for() {
        let report = run(&AuditConfig::default());
        let stats = &report.stats;

        // Each human move either finishes the game, or is answered by the solver.
        let finished_by_human = stats.human_moves - stats.solver_moves;
        assert!(finished_by_human <= stats.terminals());
        // Each non-root node came from exactly one solver reply that didn't finish.
        assert_eq!(stats.nodes - 1, stats.solver_moves - (stats.terminals() - finished_by_human));
        assert!(stats.max_depth <= 9);
        assert!(stats.nodes > 1);
    }

    #[test]
    fn test_root_has_nine_children() {
        let config = AuditConfig::default();
        let report = run(&config);
        // Every opening move gets a recorded solver reply.
        let openings = Coord::all()
            .filter(|&c| {
                let mut b = Board::new();
                b.set_at(c, Mark::Circle);
                report.policy.contains_key(&b.to_bits())
            })
            .count();
        assert_eq!(openings, 9);
    }

    #[test]
    fn test_policy_replies_are_legal() {
        let report = run(&AuditConfig::default());
        for (&bits, entry) in &report.policy {
            let board = Board::from_bits(bits).unwrap();
            assert!(!board.is_terminal());
            assert_eq!(board.get_at(entry.reply), Mark::Empty);
            assert_eq!(
                solver::choose(&board, Mark::Cross),
                Some((entry.rule, entry.reply))
            );
        }
    }

    #[test]
    fn test_losses_replay_to_human_wins() {
        let config = AuditConfig {
            keep_losses: usize::MAX,
            ..Default::default()
        };
        let report = run(&config);
        assert_eq!(report.losses.len() as u64, report.stats.human_wins);
        for line in &report.losses {
            let board = replay(line, Mark::Circle);
            assert_eq!(board.outcome(), Outcome::CircleWin, "{}", format_line(line));
        }
    }

    #[test]
    fn test_solver_first() {
        let config = AuditConfig {
            solver_first: true,
            ..Default::default()
        };
        let report = run(&config);
        // The solver opens in the center.
        assert_eq!(
            report.policy.get(&0).map(|e| e.reply),
            Some(Coord::CENTER)
        );
        for line in &report.losses {
            assert_eq!(line[0], Coord::CENTER);
            let board = replay(line, Mark::Cross);
            assert_eq!(board.outcome(), Outcome::CircleWin);
        }
    }

    #[test]
    fn test_human_as_cross() {
        let config = AuditConfig {
            human: Mark::Cross,
            ..Default::default()
        };
        let report = run(&config);
        for (&bits, entry) in &report.policy {
            let board = Board::from_bits(bits).unwrap();
            assert_eq!(
                solver::choose(&board, Mark::Circle),
                Some((entry.rule, entry.reply))
            );
        }
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(&[Coord::new(0, 0), Coord::new(1, 1)]),
            "(0,0) (1,1)"
        );
    }
}
