//! Errors reported by the rules engine.

use std::fmt;

use thiserror::Error;

use crate::chess::core::{Color, Size, Square};

/// Errors produced by board setup and by the turn controller.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// Boards hold at most one king per color.
    #[error("board already has a {color} king")]
    DuplicateKing { color: Color },

    /// Square lies outside of the board.
    #[error("square {square} is outside of the {size} board")]
    OutOfBounds { square: Square, size: Size },

    /// Square already holds a piece.
    #[error("square {square} is already occupied")]
    Occupied { square: Square },

    /// Square does not hold any piece.
    #[error("no piece at square {square}")]
    EmptySquare { square: Square },

    /// Both board dimensions must be positive and the number of squares
    /// must fit in memory.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    /// The standard setup only exists for the 8x8 board.
    #[error("standard setup needs an 8x8 board, got {size}")]
    NonStandardSize { size: Size },

    /// A game needs exactly one king of each color.
    #[error("{color} king is missing")]
    MissingKing { color: Color },

    /// The side that does not move can not start in check.
    #[error("{color} king is in check but it is not {color}'s turn")]
    OpponentInCheck { color: Color },

    /// Undo requires history recording.
    #[error("history recording is disabled")]
    HistoryDisabled,

    #[error(transparent)]
    IllegalMove(#[from] IllegalMove),
}

/// Result of fallible rules operations.
pub type Result<T> = std::result::Result<T, RulesError>;

/// A move attempt that was rejected without touching the board.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal move {from} -> {to}: {reason}")]
pub struct IllegalMove {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    #[allow(missing_docs)]
    pub reason: Rejection,
}

/// Why a move attempt was rejected.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    GameOver,
    OutOfBounds,
    EmptySquare,
    WrongTurn,
    NotLegal,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GameOver => "the game is over",
            Self::OutOfBounds => "square is outside of the board",
            Self::EmptySquare => "there is no piece to move",
            Self::WrongTurn => "piece belongs to the side not to move",
            Self::NotLegal => "destination is not a legal move",
        })
    }
}
