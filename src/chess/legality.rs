//! Legal move generation: pseudo-legal destinations filtered by trying each
//! of them on a [`Simulation`] and checking the mover's king afterwards.
//!
//! Every candidate costs a full board copy and an attack mask.

use tracing::trace;

use crate::chess::board::Board;
use crate::chess::core::Square;
use crate::chess::error::{Result, RulesError};
use crate::chess::piece::{MoveCache, Piece};
use crate::chess::simulation::Simulation;

/// Returns true if moving the piece from `from` to `to` does not leave the
/// king of the mover's color attacked. The move itself is not checked against
/// the movement pattern of the piece.
///
/// A side without a king can not be checked, so all its moves are legal.
#[must_use]
pub fn is_legal(board: &Board, from: Square, to: Square) -> bool {
    let Some(color) = board.piece(from).map(|piece| piece.color()) else {
        return false;
    };
    let mut simulation = Simulation::new(board);
    if simulation.play(from, to).is_err() {
        return false;
    }
    !simulation.is_king_attacked(color)
}

/// Computes the legal destinations of the piece on `square` from scratch.
/// Empty squares have no legal moves.
#[must_use]
pub fn legal_destinations(board: &Board, square: Square) -> Vec<Square> {
    let Some(piece) = board.piece(square) else {
        return Vec::new();
    };
    piece
        .pseudo_legal(board, false)
        .into_iter()
        .filter(|&to| is_legal(board, square, to))
        .collect()
}

impl Board {
    /// Legal destinations of the piece on `square`.
    ///
    /// The list is cached inside the piece and stays valid for as long as
    /// [`Board::version`] does not change, so repeated queries between moves
    /// are cheap.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::OutOfBounds`] or [`RulesError::EmptySquare`] if
    /// there is no piece on the square.
    pub fn legal_moves(&mut self, square: Square) -> Result<&[Square]> {
        let version = self.version();
        let stamp = self.occupant(square)?.cache.stamp;
        if stamp == Some(version) {
            trace!(%square, version, "legal moves cache hit");
        } else {
            trace!(%square, version, "recomputing legal moves");
            let moves = legal_destinations(self, square);
            if let Some(piece) = self.piece_mut(square) {
                piece.cache = MoveCache {
                    stamp: Some(version),
                    moves,
                };
            }
        }
        Ok(&self.occupant(square)?.cache.moves)
    }

    /// Returns true if the piece on `from` may legally move to `to`.
    pub fn can_move_to(&mut self, from: Square, to: Square) -> bool {
        self.legal_moves(from)
            .is_ok_and(|moves| moves.contains(&to))
    }

    fn occupant(&self, square: Square) -> Result<&Piece> {
        if !self.size().contains(square) {
            return Err(RulesError::OutOfBounds {
                square,
                size: self.size(),
            });
        }
        self.piece(square).ok_or(RulesError::EmptySquare { square })
    }
}
