//! The live game session value.

use crate::board::{Board, Player, Square};
use crate::outcome::{Outcome, evaluate};
use crate::store::{GameFields, GameId, GameRecord};
use tracing::{instrument, warn};

/// Why a move was not applied.
///
/// Rejections are not errors: the session is left untouched and callers can
/// simply re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The game has already been won or drawn.
    #[display("Game is already over")]
    GameOver,

    /// The index is not on the board.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The square already holds a mark.
    #[display("Square {} is already occupied", _0)]
    Occupied(usize),
}

/// Board, turn and outcome of the single tracked game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    turn: Player,
    outcome: Outcome,
    id: Option<GameId>,
}

impl GameSession {
    /// Creates an empty session: no marks, X to move, not yet persisted.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Player::X,
            outcome: Outcome::Ongoing,
            id: None,
        }
    }

    /// Creates an empty session bound to a persisted record.
    pub fn with_id(id: GameId) -> Self {
        Self {
            id: Some(id),
            ..Self::new()
        }
    }

    /// Rebuilds a session from a persisted record.
    ///
    /// The board is authoritative: the outcome is re-evaluated and the turn is
    /// derived from the number of marks. The stored `is_x_next`, `winner` and
    /// `winning_squares` columns are advisory; for records written by this
    /// crate they always agree with the board, and any that disagree are
    /// logged at `warn` and ignored.
    #[instrument(skip(record), fields(game_id = %record.id))]
    pub fn from_record(record: &GameRecord) -> Self {
        let board = record.board;
        let outcome = evaluate(&board);
        let turn = turn_for(&board);

        let stored = record.fields();
        let derived = GameFields::from_parts(board, turn, &outcome);
        if stored.is_x_next != derived.is_x_next {
            warn!(
                stored_x_next = stored.is_x_next,
                derived = %turn,
                "Stored turn disagrees with board, using board"
            );
        }
        if stored.winner != derived.winner || stored.winning_squares != derived.winning_squares {
            warn!(
                stored_winner = ?stored.winner,
                stored_line = ?stored.winning_squares,
                evaluated = %outcome,
                "Stored outcome disagrees with board, using evaluation"
            );
        }

        Self {
            board,
            turn,
            outcome,
            id: Some(record.id),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move next.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns the persisted record identifier, once saved.
    pub fn id(&self) -> Option<GameId> {
        self.id
    }

    /// Number of marks placed since the last reset.
    pub fn turns_taken(&self) -> usize {
        self.board.occupied_count()
    }

    /// Returns true once the game has been won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Returns true once any square holds a mark.
    pub fn has_started(&self) -> bool {
        self.turns_taken() > 0
    }

    /// Headline shown above the board.
    pub fn status_text(&self) -> String {
        match self.outcome {
            Outcome::Win { player, .. } => format!("{} Wins!", player),
            Outcome::Draw => "It's a Draw!".to_string(),
            Outcome::Ongoing if !self.has_started() => "Game Started!".to_string(),
            Outcome::Ongoing => format!("Next turn: {}", self.turn),
        }
    }

    /// Persisted columns for the current state.
    pub fn fields(&self) -> GameFields {
        GameFields::from_parts(self.board, self.turn, &self.outcome)
    }

    /// Checks whether `pos` would be accepted, without changing anything.
    pub fn check_move(&self, pos: usize) -> Result<(), MoveRejection> {
        if self.is_terminal() {
            return Err(MoveRejection::GameOver);
        }
        match self.board.get(pos) {
            None => Err(MoveRejection::OutOfBounds(pos)),
            Some(Square::Occupied(_)) => Err(MoveRejection::Occupied(pos)),
            Some(Square::Empty) => Ok(()),
        }
    }

    /// Places the current player's mark at `pos`, flips the turn and
    /// re-evaluates the outcome.
    ///
    /// On rejection the session is unchanged.
    pub fn place_mark(&mut self, pos: usize) -> Result<Outcome, MoveRejection> {
        self.check_move(pos)?;
        Ok(self.place_unchecked(pos))
    }

    /// Places a mark the caller has already validated with
    /// [`check_move`](Self::check_move).
    pub(crate) fn place_unchecked(&mut self, pos: usize) -> Outcome {
        self.board = self.board.place(pos, self.turn);
        self.turn = self.turn.opponent();
        self.outcome = evaluate(&self.board);
        self.outcome
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// X moves on even mark counts, O on odd.
fn turn_for(board: &Board) -> Player {
    if board.occupied_count() % 2 == 0 {
        Player::X
    } else {
        Player::O
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Winner;

    fn record(
        board: Board,
        is_x_next: bool,
        winner: Option<Winner>,
        line: Vec<usize>,
    ) -> GameRecord {
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        GameRecord {
            id: GameId::from(3),
            board,
            is_x_next,
            winner,
            winning_squares: line,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new();
        assert_eq!(session.turn(), Player::X);
        assert_eq!(session.outcome(), &Outcome::Ongoing);
        assert_eq!(session.id(), None);
        assert!(!session.has_started());
        assert_eq!(session.status_text(), "Game Started!");
    }

    #[test]
    fn test_place_mark_flips_turn() {
        let mut session = GameSession::new();
        assert_eq!(session.place_mark(4), Ok(Outcome::Ongoing));
        assert_eq!(session.turn(), Player::O);
        assert_eq!(session.board().get(4), Some(Square::Occupied(Player::X)));
        assert_eq!(session.status_text(), "Next turn: O");
    }

    #[test]
    fn test_rejections_leave_session_unchanged() {
        let mut session = GameSession::new();
        session.place_mark(0).unwrap();
        let before = session.clone();

        assert_eq!(session.place_mark(0), Err(MoveRejection::Occupied(0)));
        assert_eq!(session.place_mark(9), Err(MoveRejection::OutOfBounds(9)));
        assert_eq!(session, before);
    }

    #[test]
    fn test_terminal_rejects_moves() {
        let mut session = GameSession::new();
        for pos in [0, 3, 1, 4, 2] {
            session.place_mark(pos).unwrap();
        }
        assert_eq!(session.status_text(), "X Wins!");
        assert_eq!(session.place_mark(8), Err(MoveRejection::GameOver));
    }

    #[test]
    fn test_fields_reflect_outcome() {
        let mut session = GameSession::new();
        for pos in [0, 3, 1, 4, 2] {
            session.place_mark(pos).unwrap();
        }
        let fields = session.fields();
        assert_eq!(fields.winner, Some(Winner::X));
        assert_eq!(fields.winning_squares, vec![0, 1, 2]);
        assert!(!fields.is_x_next);
    }

    #[test]
    fn test_from_record_hydrates() {
        let board = Board::new().place(0, Player::X).place(4, Player::O);
        let session = GameSession::from_record(&record(board, true, None, vec![]));
        assert_eq!(session.board(), &board);
        assert_eq!(session.turn(), Player::X);
        assert_eq!(session.outcome(), &Outcome::Ongoing);
        assert_eq!(session.id(), Some(GameId::from(3)));
    }

    #[test]
    fn test_from_record_trusts_board_over_columns() {
        // X completed the top row but the stored columns say nothing.
        let board = Board::new()
            .place(0, Player::X)
            .place(3, Player::O)
            .place(1, Player::X)
            .place(4, Player::O)
            .place(2, Player::X);
        let session = GameSession::from_record(&record(board, true, None, vec![]));
        assert_eq!(
            session.outcome(),
            &Outcome::Win {
                player: Player::X,
                line: [0, 1, 2]
            }
        );
        assert_eq!(session.turn(), Player::O);
    }

    #[test]
    fn test_from_record_ignores_stale_turn_and_winner() {
        // One mark on the board, but the columns claim O won and X moves.
        let board = Board::new().place(4, Player::X);
        let stale = record(board, true, Some(Winner::O), vec![2, 4, 6]);
        let session = GameSession::from_record(&stale);
        assert_eq!(session.turn(), Player::O);
        assert_eq!(session.outcome(), &Outcome::Ongoing);
        assert!(!session.is_terminal());
        assert_eq!(session.fields().winner, None);
    }

    #[test]
    fn test_place_unchecked_matches_place_mark() {
        let mut checked = GameSession::new();
        let mut unchecked = GameSession::new();
        for pos in [0, 3, 1, 4, 2] {
            let expected = checked.place_mark(pos).unwrap();
            assert_eq!(unchecked.place_unchecked(pos), expected);
        }
        assert_eq!(checked, unchecked);
    }
}
