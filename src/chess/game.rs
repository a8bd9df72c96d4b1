//! Turn controller: the single entry point for changing the authoritative
//! board. Validates move attempts, alternates turns, detects the end of the
//! game and keeps the history needed to take moves back.

use std::fmt;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::chess::board::{Board, Special};
use crate::chess::config::{Config, ErrorPolicy};
use crate::chess::core::{Color, PieceKind, Square};
use crate::chess::error::{IllegalMove, Rejection, Result, RulesError};
use crate::chess::piece::{Piece, PieceId};
use crate::chess::simulation::Simulation;

/// How the game ended.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Checkmate,
    Stalemate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
        })
    }
}

/// Whether the game still accepts moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    #[allow(missing_docs)]
    InProgress,
    /// The side to move has no legal moves.
    Ended {
        /// Side that made the final move: the winner on checkmate.
        color: Color,
        #[allow(missing_docs)]
        outcome: Outcome,
    },
}

/// A played move as stored in the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// The piece that moved.
    pub piece: PieceId,
    /// Kind of the moving piece before the move.
    pub kind: PieceKind,
    #[allow(missing_docs)]
    pub color: Color,
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    /// Piece captured on `to`. The piece itself is kept in the graveyard.
    pub captured: Option<PieceId>,
    /// Castling or promotion details.
    pub special: Option<Special>,
}

type GameEndHandler = Box<dyn FnMut(Color, Outcome)>;
type IllegalMoveHandler = Box<dyn FnMut(&IllegalMove)>;

/// A game of chess on an arbitrary rectangular board.
///
/// ```
/// use rookery::{Board, Config, Game, GameState, Outcome, Square};
///
/// let mut game = Game::new(Board::standard(), Config::default()).unwrap();
/// // Fool's mate.
/// for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
///     let from = Square::from_algebraic(from, 8).unwrap();
///     let to = Square::from_algebraic(to, 8).unwrap();
///     assert!(game.attempt_move(from, to).unwrap());
/// }
/// assert!(matches!(
///     game.state(),
///     GameState::Ended {
///         outcome: Outcome::Checkmate,
///         ..
///     }
/// ));
/// ```
pub struct Game {
    board: Board,
    turn: Color,
    state: GameState,
    config: Config,
    history: Vec<MoveRecord>,
    graveyard: Vec<Piece>,
    on_game_end: Option<GameEndHandler>,
    on_illegal_move: Option<IllegalMoveHandler>,
}

impl Game {
    /// Starts a game with White to move.
    ///
    /// # Errors
    ///
    /// See [`Game::with_turn`].
    pub fn new(board: Board, config: Config) -> Result<Self> {
        Self::with_turn(board, config, Color::White)
    }

    /// Starts a game from an arbitrary position. The board takes the rules of
    /// `config`. A position where the side to move has no legal moves is
    /// ended right away.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::MissingKing`] unless both colors have a king and
    /// [`RulesError::OpponentInCheck`] if the side not to move is in check.
    pub fn with_turn(mut board: Board, config: Config, turn: Color) -> Result<Self> {
        for color in Color::ALL {
            if board.king(color).is_none() {
                return Err(RulesError::MissingKing { color });
            }
        }
        board.set_rules(config.rules);
        if Simulation::new(&board).is_king_attacked(turn.opponent()) {
            return Err(RulesError::OpponentInCheck {
                color: turn.opponent(),
            });
        }
        let mut game = Self {
            board,
            turn,
            state: GameState::InProgress,
            config,
            history: Vec::new(),
            graveyard: Vec::new(),
            on_game_end: None,
            on_illegal_move: None,
        };
        game.finish_turn(turn.opponent());
        Ok(game)
    }

    /// The authoritative board. Read-only: all changes go through the game.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Color {
        self.turn
    }

    /// Whether the game is still going and how it ended otherwise.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Settings the game was started with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Played moves, oldest first. Empty if history recording is disabled.
    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Captured pieces in capture order. Empty if history recording is
    /// disabled.
    #[must_use]
    pub fn graveyard(&self) -> &[Piece] {
        &self.graveyard
    }

    /// Piece on the square of the authoritative board, if any.
    #[must_use]
    pub fn piece(&self, square: Square) -> Option<&Piece> {
        self.board.piece(square)
    }

    /// Legal destinations of the piece on `square`, regardless of whose turn
    /// it is.
    ///
    /// # Errors
    ///
    /// Fails if there is no piece on the square.
    pub fn legal_moves(&mut self, square: Square) -> Result<&[Square]> {
        self.board.legal_moves(square)
    }

    /// Returns true if the piece on `from` may legally move to `to`.
    pub fn can_move_to(&mut self, from: Square, to: Square) -> bool {
        self.board.can_move_to(from, to)
    }

    /// Every move the side to move may play as `(from, to)` pairs. Empty once
    /// the game is over.
    pub fn playable_moves(&mut self) -> Vec<(Square, Square)> {
        if self.state != GameState::InProgress {
            return Vec::new();
        }
        let turn = self.turn;
        let mut moves = Vec::new();
        for from in self.squares_of(turn) {
            if let Ok(destinations) = self.board.legal_moves(from) {
                moves.extend(destinations.iter().map(|&to| (from, to)));
            }
        }
        moves
    }

    /// Returns true if the king of given color is attacked.
    #[must_use]
    pub fn is_check(&self, color: Color) -> bool {
        Simulation::new(&self.board).is_king_attacked(color)
    }

    /// Installs the handler called when the game ends, with the color that
    /// made the final move and the outcome.
    pub fn on_game_end(&mut self, handler: impl FnMut(Color, Outcome) + 'static) {
        self.on_game_end = Some(Box::new(handler));
    }

    /// Installs the handler called for every rejected move. While it is
    /// installed rejected moves return `Ok(false)` regardless of
    /// [`ErrorPolicy`].
    pub fn on_illegal_move(&mut self, handler: impl FnMut(&IllegalMove) + 'static) {
        self.on_illegal_move = Some(Box::new(handler));
    }

    /// Same as [`Game::attempt_move`] with raw coordinates.
    ///
    /// # Errors
    ///
    /// See [`Game::attempt_move`].
    pub fn attempt_move_at(
        &mut self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    ) -> Result<bool> {
        self.attempt_move(Square::new(from_x, from_y), Square::new(to_x, to_y))
    }

    /// Plays the move if it is legal for the side to move and returns
    /// `Ok(true)`. A rejected move does not change anything.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::IllegalMove`] for rejected moves when the error
    /// policy is [`ErrorPolicy::Raise`] and no illegal-move handler is
    /// installed.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<bool> {
        if let Err(reason) = self.validate(from, to) {
            return self.reject(IllegalMove { from, to, reason });
        }
        self.apply(from, to)?;
        Ok(true)
    }

    fn validate(&mut self, from: Square, to: Square) -> std::result::Result<(), Rejection> {
        if self.state != GameState::InProgress {
            return Err(Rejection::GameOver);
        }
        let size = self.board.size();
        if !size.contains(from) || !size.contains(to) {
            return Err(Rejection::OutOfBounds);
        }
        let color = self
            .board
            .piece(from)
            .ok_or(Rejection::EmptySquare)?
            .color();
        if color != self.turn {
            return Err(Rejection::WrongTurn);
        }
        if !self.board.can_move_to(from, to) {
            return Err(Rejection::NotLegal);
        }
        Ok(())
    }

    fn reject(&mut self, illegal: IllegalMove) -> Result<bool> {
        if let Some(handler) = self.on_illegal_move.as_mut() {
            handler(&illegal);
            return Ok(false);
        }
        warn!(%illegal, "move rejected");
        match self.config.errors {
            ErrorPolicy::Raise => Err(illegal.into()),
            ErrorPolicy::Ignore => Ok(false),
        }
    }

    fn apply(&mut self, from: Square, to: Square) -> Result<()> {
        let (kind, color) = self
            .board
            .piece(from)
            .map(|piece| (piece.kind(), piece.color()))
            .ok_or(RulesError::EmptySquare { square: from })?;
        let applied = self.board.move_piece(from, to)?;
        debug!(
            %color,
            piece = %kind,
            %from,
            %to,
            capture = applied.captured.is_some(),
            "move applied"
        );
        if self.config.history {
            self.history.push(MoveRecord {
                piece: applied.piece,
                kind,
                color,
                from,
                to,
                captured: applied.captured.as_ref().and_then(Piece::id),
                special: applied.special,
            });
            self.graveyard.extend(applied.captured);
        }
        self.finish_turn(color);
        self.turn = color.opponent();
        Ok(())
    }

    /// Ends the game if the opponent of `mover` has no legal moves left.
    fn finish_turn(&mut self, mover: Color) {
        let side = mover.opponent();
        for square in self.squares_of(side) {
            if self
                .board
                .legal_moves(square)
                .is_ok_and(|moves| !moves.is_empty())
            {
                return;
            }
        }
        let outcome = if Simulation::new(&self.board).is_king_attacked(side) {
            Outcome::Checkmate
        } else {
            Outcome::Stalemate
        };
        self.state = GameState::Ended {
            color: mover,
            outcome,
        };
        debug!(%mover, %outcome, "game over");
        if let Some(handler) = self.on_game_end.as_mut() {
            handler(mover, outcome);
        }
    }

    fn squares_of(&self, color: Color) -> Vec<Square> {
        self.board
            .pieces()
            .filter(|piece| piece.color() == color)
            .map(Piece::square)
            .collect_vec()
    }

    /// Takes back up to `count` moves, including castling and promotion side
    /// effects and captures. Returns the number of moves taken back, which is
    /// smaller than `count` only if the history ran out. The side to move is
    /// restored and an ended game continues.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::HistoryDisabled`] if the game does not record
    /// history.
    pub fn undo(&mut self, count: usize) -> Result<usize> {
        if !self.config.history {
            return Err(RulesError::HistoryDisabled);
        }
        let mut undone = 0;
        while undone < count {
            let Some(record) = self.history.pop() else {
                break;
            };
            self.revert(record)?;
            undone += 1;
        }
        Ok(undone)
    }

    fn revert(&mut self, record: MoveRecord) -> Result<()> {
        let MoveRecord {
            color,
            from,
            to,
            captured,
            special,
            ..
        } = record;
        match special {
            Some(Special::Promotion { pawn }) => {
                if self.board.remove_piece(to).is_none() {
                    return Err(RulesError::EmptySquare { square: to });
                }
                let _ = self.board.place(to, pawn)?;
            },
            Some(Special::Castle { rook_from, rook_to }) => {
                let mut rook = self
                    .board
                    .remove_piece(rook_to)
                    .ok_or(RulesError::EmptySquare { square: rook_to })?;
                rook.move_count = rook.move_count.saturating_sub(1);
                let _ = self.board.place(rook_from, rook)?;
            },
            None => {},
        }
        let mut piece = self
            .board
            .remove_piece(to)
            .ok_or(RulesError::EmptySquare { square: to })?;
        piece.move_count = piece.move_count.saturating_sub(1);
        let _ = self.board.place(from, piece)?;
        if captured.is_some() {
            if let Some(victim) = self.graveyard.pop() {
                let _ = self.board.place(to, victim)?;
            }
        }
        self.turn = color;
        self.state = GameState::InProgress;
        debug!(%color, %from, %to, "move taken back");
        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("turn", &self.turn)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("history", &self.history.len())
            .field("graveyard", &self.graveyard.len())
            .field("on_game_end", &self.on_game_end.is_some())
            .field("on_illegal_move", &self.on_illegal_move.is_some())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn standard() -> Game {
        Game::new(Board::standard(), Config::default()).unwrap()
    }

    #[test]
    fn turns_alternate() {
        let mut game = standard();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.playable_moves().len(), 20);
        assert!(game.attempt_move_at(4, 6, 4, 4).unwrap());
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.piece(Square::new(4, 4)).unwrap().move_count(), 1);
        assert!(game.attempt_move_at(4, 1, 4, 3).unwrap());
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn rejection_reasons() {
        let mut game = standard();
        let reason = |game: &mut Game, from: (i32, i32), to: (i32, i32)| {
            match game.attempt_move_at(from.0, from.1, to.0, to.1) {
                Err(RulesError::IllegalMove(illegal)) => illegal.reason,
                result => panic!("expected rejection, got {result:?}"),
            }
        };
        assert_eq!(reason(&mut game, (4, 6), (4, 8)), Rejection::OutOfBounds);
        assert_eq!(reason(&mut game, (-1, 6), (4, 4)), Rejection::OutOfBounds);
        assert_eq!(reason(&mut game, (4, 4), (4, 3)), Rejection::EmptySquare);
        assert_eq!(reason(&mut game, (4, 1), (4, 3)), Rejection::WrongTurn);
        assert_eq!(reason(&mut game, (4, 6), (4, 3)), Rejection::NotLegal);
        assert_eq!(reason(&mut game, (0, 7), (0, 5)), Rejection::NotLegal);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.board(), &Board::standard());
    }

    #[test]
    fn ignore_policy() {
        let mut game = Game::new(
            Board::standard(),
            Config {
                errors: ErrorPolicy::Ignore,
                ..Config::default()
            },
        )
        .unwrap();
        assert_eq!(game.attempt_move_at(4, 6, 4, 3), Ok(false));
    }

    #[test]
    fn handler_overrides_policy() {
        let mut game = standard();
        let rejected = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&rejected);
        game.on_illegal_move(move |illegal| sink.borrow_mut().push(*illegal));
        assert_eq!(game.attempt_move_at(3, 3, 3, 4), Ok(false));
        assert_eq!(
            *rejected.borrow(),
            vec![IllegalMove {
                from: Square::new(3, 3),
                to: Square::new(3, 4),
                reason: Rejection::EmptySquare,
            }]
        );
    }

    #[test]
    fn missing_king() {
        let board = Board::from_layout("K..\n...\n...").unwrap();
        assert_eq!(
            Game::new(board, Config::default()).unwrap_err(),
            RulesError::MissingKing {
                color: Color::Black
            }
        );
    }

    #[test]
    fn opponent_in_check() {
        let board = Board::from_layout(
            "k..\n\
             ...\n\
             R.K",
        )
        .unwrap();
        assert_eq!(
            Game::new(board.clone(), Config::default()).unwrap_err(),
            RulesError::OpponentInCheck {
                color: Color::Black
            }
        );
        assert!(Game::with_turn(board, Config::default(), Color::Black).is_ok());
    }

    #[test]
    fn config_rules_reach_the_board() {
        let config = Config {
            rules: crate::chess::config::Rules::empty(),
            ..Config::default()
        };
        let game = Game::new(Board::standard(), config).unwrap();
        assert!(game.board().rules().is_empty());
    }

    #[test]
    fn history_disabled() {
        let mut game = Game::new(
            Board::standard(),
            Config {
                history: false,
                ..Config::default()
            },
        )
        .unwrap();
        assert!(game.attempt_move_at(6, 7, 5, 5).unwrap());
        assert!(game.history().is_empty());
        assert_eq!(game.undo(1), Err(RulesError::HistoryDisabled));
    }

    #[test]
    fn undo_more_than_played() {
        let mut game = standard();
        assert!(game.attempt_move_at(6, 7, 5, 5).unwrap());
        assert_eq!(game.undo(3), Ok(1));
        assert_eq!(game.undo(1), Ok(0));
        assert_eq!(game.board(), &Board::standard());
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn debug_omits_handlers() {
        let mut game = standard();
        game.on_game_end(|_, _| {});
        let dump = format!("{game:?}");
        assert!(dump.contains("on_game_end: true"));
        assert!(dump.contains("on_illegal_move: false"));
    }
}
