//! Heuristic single-move solver.
//!
//! The policy is a fixed table of rules tried top to bottom; the first rule
//! that names a cell decides the move. There is no search, so a careful
//! opponent can beat it.

use tracing::debug;

use crate::board::{Board, Mark, LINES};
use crate::coord::Coord;

/// A rule inspects the board for the side to move and may name a cell.
pub type RuleFn = fn(&Board, Mark) -> Option<Coord>;

/// A named entry in the decision table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub pick: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// Decision table in priority order.
pub const RULES: [Rule; 6] = [
    Rule { name: "win", pick: immediate_win },
    Rule { name: "block", pick: immediate_block },
    Rule { name: "center", pick: center_control },
    Rule { name: "corner_trap", pick: corner_trap_defense },
    Rule { name: "adjacent", pick: adjacency_extension },
    Rule { name: "fallback", pick: first_empty },
];

/// Neighbour offsets tried by [`adjacency_extension`]:
/// left, right, up, down, down-right, up-left, down-left, up-right (up is y - 1).
pub const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (1, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

/// Corners opposite each other on the `\` diagonal, then the corners to try.
const MAIN_TRAP: ([Coord; 2], [Coord; 2]) = (
    [Coord::new(0, 0), Coord::new(2, 2)],
    [Coord::new(2, 0), Coord::new(0, 2)],
);

/// Same for the `/` diagonal.
const ANTI_TRAP: ([Coord; 2], [Coord; 2]) = (
    [Coord::new(2, 0), Coord::new(0, 2)],
    [Coord::new(2, 2), Coord::new(0, 0)],
);

/// Play one move for Circle (`solving_for_circle`) or Cross.
///
/// Returns the cell that was marked, or `None` if no rule found an empty
/// cell (only possible on a full board). `turn_index` is accepted for the
/// caller's bookkeeping and does not influence the choice.
///
/// The board's outcome is not checked: on a finished board with empty cells
/// a mark is still placed, so callers should stop first.
pub fn next_move(board: &mut Board, turn_index: u32, solving_for_circle: bool) -> Option<Coord> {
    let mover = Mark::for_side(solving_for_circle);

    for rule in &RULES {
        if let Some(cell) = (rule.pick)(board, mover) {
            if board.set_at(cell, mover) {
                debug!(rule = rule.name, %cell, turn_index, ?mover, "solver move");
                return Some(cell);
            }
        }
    }

    debug!(turn_index, ?mover, "solver found no empty cell");
    None
}

/// Pick a move without playing it.
pub fn choose(board: &Board, mover: Mark) -> Option<(&'static str, Coord)> {
    RULES
        .iter()
        .find_map(|rule| (rule.pick)(board, mover).map(|cell| (rule.name, cell)))
}

/// If exactly two cells of `line` hold `target` and the third is empty,
/// return the empty one.
pub fn completing_cell(board: &Board, line: &[Coord; 3], target: Mark) -> Option<Coord> {
    let mut matching = 0;
    let mut available = None;

    for &c in line {
        let mark = board.get_at(c);
        if mark == target {
            matching += 1;
        } else if mark == Mark::Empty {
            available = Some(c);
        }
    }

    if matching == 2 {
        available
    } else {
        None
    }
}

/// First line (in scan order) that `target` can complete in one move.
pub fn winning_cell(board: &Board, target: Mark) -> Option<Coord> {
    LINES
        .iter()
        .find_map(|line| completing_cell(board, line, target))
}

/// Rule 1: complete one of our own lines.
pub fn immediate_win(board: &Board, mover: Mark) -> Option<Coord> {
    winning_cell(board, mover)
}

/// Rule 2: occupy the cell that would complete an opponent line.
pub fn immediate_block(board: &Board, mover: Mark) -> Option<Coord> {
    winning_cell(board, mover.opponent())
}

/// Rule 3: take the center.
pub fn center_control(board: &Board, _mover: Mark) -> Option<Coord> {
    (board.get_at(Coord::CENTER) == Mark::Empty).then_some(Coord::CENTER)
}

/// Rule 4: opponent holds the center and a diagonal has one corner each;
/// take one of the two remaining corners to head off the diagonal fork.
pub fn corner_trap_defense(board: &Board, mover: Mark) -> Option<Coord> {
    let opponent = mover.opponent();
    if board.get_at(Coord::CENTER) != opponent {
        return None;
    }

    [MAIN_TRAP, ANTI_TRAP].iter().find_map(|([a, b], candidates)| {
        let corners = (board.get_at(*a), board.get_at(*b));
        let split = corners == (opponent, mover) || corners == (mover, opponent);
        if !split {
            return None;
        }
        candidates
            .iter()
            .copied()
            .find(|&c| board.get_at(c) == Mark::Empty)
    })
}

/// Rule 5: extend from one of our marks into an empty neighbour.
pub fn adjacency_extension(board: &Board, mover: Mark) -> Option<Coord> {
    Coord::all()
        .filter(|&c| board.get_at(c) == mover)
        .find_map(|c| {
            NEIGHBOURS
                .iter()
                .map(|&(dx, dy)| c.offset(dx, dy))
                .find(|&n| board.get_at(n) == Mark::Empty)
        })
}

/// Rule 6: first empty cell in row-major order.
pub fn first_empty(board: &Board, _mover: Mark) -> Option<Coord> {
    board.empty_cells().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Outcome;

    fn board_from(rows: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let mark = match ch {
                    'O' => Mark::Circle,
                    'X' => Mark::Cross,
                    _ => continue,
                };
                assert!(board.set(x as i32, y as i32, mark));
            }
        }
        board
    }

    #[test]
    fn test_completing_cell() {
        let board = board_from(["OO.", "X..", "..."]);
        let row0 = &LINES[0];
        assert_eq!(completing_cell(&board, row0, Mark::Circle), Some(Coord::new(2, 0)));
        assert_eq!(completing_cell(&board, row0, Mark::Cross), None);
        let col0 = &LINES[3];
        assert_eq!(completing_cell(&board, col0, Mark::Circle), None);
    }

    #[test]
    fn test_completing_cell_needs_an_empty() {
        let board = board_from(["OOX", "...", "..."]);
        assert_eq!(completing_cell(&board, &LINES[0], Mark::Circle), None);
    }

    #[test]
    fn test_win_takes_priority_over_block() {
        // Cross can finish the middle row; Circle threatens the top row.
        let mut board = board_from(["OO.", "XX.", "O.."]);
        let cell = next_move(&mut board, 0, false);
        assert_eq!(cell, Some(Coord::new(2, 1)));
        assert_eq!(board.outcome(), Outcome::CrossWin);
    }

    #[test]
    fn test_block() {
        let mut board = board_from(["OO.", ".X.", "..."]);
        assert_eq!(next_move(&mut board, 0, false), Some(Coord::new(2, 0)));
        assert_eq!(board.get(2, 0), Mark::Cross);
    }

    #[test]
    fn test_win_scans_rows_before_columns() {
        let board = board_from(["XX.", "X..", "..."]);
        assert_eq!(immediate_win(&board, Mark::Cross), Some(Coord::new(2, 0)));
    }

    #[test]
    fn test_center_when_empty() {
        let mut board = board_from(["O..", "...", "..."]);
        assert_eq!(next_move(&mut board, 0, false), Some(Coord::CENTER));
    }

    #[test]
    fn test_corner_trap_main_diagonal() {
        let board = board_from(["X..", ".O.", "..O"]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), Some(Coord::new(2, 0)));

        let board = board_from(["O.O", ".O.", "X.X"]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), None);
    }

    #[test]
    fn test_corner_trap_second_corner() {
        // (2,0) already taken, so (0,2) is next.
        let board = board_from(["X.X", ".O.", "..O"]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), Some(Coord::new(0, 2)));
    }

    #[test]
    fn test_corner_trap_anti_diagonal() {
        let board = board_from(["..X", ".O.", "O.."]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), Some(Coord::new(2, 2)));

        let board = board_from(["..O", ".O.", "X.X"]);
        // (2,2) taken, fall back to (0,0).
        assert_eq!(corner_trap_defense(&board, Mark::Cross), Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_corner_trap_needs_opponent_center() {
        let board = board_from(["X..", ".X.", "..O"]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), None);
    }

    #[test]
    fn test_corner_trap_for_circle() {
        let board = board_from(["O..", ".X.", "..X"]);
        assert_eq!(corner_trap_defense(&board, Mark::Circle), Some(Coord::new(2, 0)));
    }

    #[test]
    fn test_corner_trap_falls_through_when_corners_full() {
        // `\` corners are split and (2,0),(0,2) are taken, so the `/` check
        // runs. Its corners are split too, but its candidates are the `\`
        // corners, which are full, so the rule passes.
        let board = board_from(["O.X", "XOO", "O.X"]);
        assert_eq!(immediate_win(&board, Mark::Cross), None);
        assert_eq!(immediate_block(&board, Mark::Cross), None);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), None);
        assert_eq!(choose(&board, Mark::Cross), Some(("adjacent", Coord::new(1, 0))));
    }

    #[test]
    fn test_corner_trap_uses_anti_diagonal_after_main() {
        // `\` corners both belong to Cross, so only the `/` split counts.
        let board = board_from(["X.O", ".O.", "X.X"]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), None);

        let board = board_from(["..O", ".O.", "X.."]);
        assert_eq!(corner_trap_defense(&board, Mark::Cross), Some(Coord::new(2, 2)));
    }

    #[test]
    fn test_adjacency_order() {
        // Cross at (1,0); left neighbour (0,0) is empty.
        let board = board_from([".X.", ".O.", "..."]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(0, 0)));

        // Left taken, right is next.
        let board = board_from(["OX.", ".O.", "..."]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(2, 0)));

        // Left, right and up (off grid) unavailable; down is next.
        let board = board_from(["OXO", "...", "..."]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(1, 1)));
    }

    #[test]
    fn test_adjacency_diagonals_in_order() {
        // Cross at center; orthogonal neighbours all taken.
        let board = board_from([".O.", "OXO", ".O."]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(2, 2)));

        let board = board_from([".O.", "OXO", ".OO"]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(0, 0)));

        let board = board_from(["OO.", "OXO", ".OO"]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(0, 2)));

        let board = board_from(["OO.", "OXO", "OOO"]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), Some(Coord::new(2, 0)));
    }

    #[test]
    fn test_adjacency_without_own_marks() {
        let board = board_from(["O..", "...", "..."]);
        assert_eq!(adjacency_extension(&board, Mark::Cross), None);
    }

    #[test]
    fn test_fallback_first_empty() {
        let board = board_from(["OXO", "X.X", "..."]);
        assert_eq!(first_empty(&board, Mark::Cross), Some(Coord::new(1, 1)));
        assert_eq!(first_empty(&Board::new(), Mark::Circle), Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_full_board_no_move() {
        let mut board = board_from(["OXO", "OXX", "XOO"]);
        let before = board;
        assert_eq!(next_move(&mut board, 3, false), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_turn_index_does_not_change_choice() {
        let board = board_from(["X..", ".O.", "..O"]);
        let picks: Vec<_> = (0..5)
            .map(|turn| {
                let mut b = board;
                next_move(&mut b, turn, false)
            })
            .collect();
        assert!(picks.iter().all(|p| *p == picks[0]));
    }

    #[test]
    fn test_choose_reports_rule() {
        let board = board_from(["OO.", ".X.", "..."]);
        assert_eq!(choose(&board, Mark::Cross), Some(("block", Coord::new(2, 0))));
        assert_eq!(choose(&Board::new(), Mark::Cross), Some(("center", Coord::CENTER)));
    }
}
