//! Win and draw detection.
//!
//! [`evaluate`] is a pure function over a [`Board`]. Lines are checked in a
//! fixed order (rows, columns, diagonals) and the first complete line wins,
//! so a board with several complete lines always reports the same one.

use crate::board::{Board, Player, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Three board indices forming a winning line.
pub type Line = [usize; 3];

/// All winning lines, in evaluation order.
pub const LINES: [Line; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Game is ongoing.
    Ongoing,
    /// A player completed a line.
    Win {
        /// The winning player.
        player: Player,
        /// The completed line.
        line: Line,
    },
    /// Board is full with no complete line.
    Draw,
}

impl Outcome {
    /// Returns true once the game has been won or drawn.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Win { player, .. } => Some(*player),
            _ => None,
        }
    }

    /// Returns the winning line, empty unless the game was won.
    pub fn line(&self) -> &[usize] {
        match self {
            Outcome::Win { line, .. } => line,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ongoing => write!(f, "Ongoing"),
            Outcome::Win { player, line } => write!(f, "{} wins on {:?}", player, line),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Evaluates the board.
#[instrument(
    level = "trace",
    skip(board),
    fields(occupied = board.occupied_count())
)]
pub fn evaluate(board: &Board) -> Outcome {
    for line in LINES {
        let [a, b, c] = line;
        let sq = board.get(a);
        if let Some(Square::Occupied(player)) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Outcome::Win { player, line };
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn board_with(xs: &[usize], os: &[usize]) -> Board {
        let board = xs.iter().fold(Board::new(), |b, &i| b.place(i, Player::X));
        os.iter().fold(board, |b, &i| b.place(i, Player::O))
    }

    #[test]
    fn test_empty_board_is_ongoing() {
        assert_eq!(evaluate(&Board::new()), Outcome::Ongoing);
    }

    #[test]
    fn test_every_line_wins_for_either_player() {
        for player in Player::iter() {
            for line in LINES {
                let board = line.iter().fold(Board::new(), |b, &i| b.place(i, player));
                assert_eq!(evaluate(&board), Outcome::Win { player, line });
            }
        }
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        // X X X / O O X / X O O
        let board = board_with(&[0, 1, 2, 5, 6], &[3, 4, 7, 8]);
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                player: Player::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let board = board_with(&[0, 2, 4, 5, 7], &[1, 3, 6, 8]);
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn test_incomplete_line_is_ongoing() {
        let board = board_with(&[0, 1], &[4]);
        assert_eq!(evaluate(&board), Outcome::Ongoing);
    }

    #[test]
    fn test_mixed_line_does_not_win() {
        let board = board_with(&[0, 2], &[1]);
        assert_eq!(evaluate(&board), Outcome::Ongoing);
    }

    #[test]
    fn test_multiple_lines_report_first_in_order() {
        // Column 0 and the anti-diagonal are both complete; rows come first,
        // then columns, so column 0 is reported.
        let board = board_with(&[0, 3, 6, 2, 4], &[]);
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                player: Player::X,
                line: [0, 3, 6]
            }
        );

        // Both players completing a row: the earlier row wins.
        let board = board_with(&[6, 7, 8], &[0, 1, 2]);
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                player: Player::O,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let win = Outcome::Win {
            player: Player::O,
            line: [2, 4, 6],
        };
        assert!(win.is_terminal());
        assert_eq!(win.winner(), Some(Player::O));
        assert_eq!(win.line(), &[2, 4, 6]);

        assert!(Outcome::Draw.is_terminal());
        assert_eq!(Outcome::Draw.winner(), None);
        assert!(Outcome::Draw.line().is_empty());
        assert!(!Outcome::Ongoing.is_terminal());
    }
}
