//! Scratch boards for "what if" questions and the attack masks computed on
//! them.
//!
//! A [`Simulation`] is a deep copy of a [`Board`] that nothing else refers
//! to. It is created for a single question (which squares does Black attack?
//! is the white king safe after this move?) and dropped right after, so the
//! authoritative board is never mutated speculatively.

use std::fmt;

use tracing::trace;

use crate::chess::board::Board;
use crate::chess::core::{render_grid, Color, Size, Square};
use crate::chess::error::Result;

/// Disposable copy of a board.
pub struct Simulation {
    board: Board,
}

impl Simulation {
    /// Copies every piece of `board` together with move counters,
    /// identities and rules. Cached move lists are not copied.
    #[must_use]
    pub fn new(board: &Board) -> Self {
        trace!(version = board.version(), "creating simulation board");
        Self {
            board: board.scratch_copy(),
        }
    }

    /// The simulated position.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Plays a move without checking whether it is legal, with the same
    /// castling and promotion side effects a real move would have.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RulesError`] if either square is outside of the board
    /// or there is no piece to move.
    pub fn play(&mut self, from: Square, to: Square) -> Result<()> {
        let _ = self.board.move_piece(from, to)?;
        Ok(())
    }

    /// Squares the pieces of `color` could capture on.
    #[must_use]
    pub fn attack_mask(&self, color: Color) -> CheckMask {
        let mut mask = CheckMask::new(self.board.size(), color);
        for piece in self.board.pieces().filter(|piece| piece.color() == color) {
            piece.mark_attacks(&self.board, &mut mask);
        }
        mask
    }

    /// Returns true if the king of given color stands on a square attacked by
    /// the opponent. A board without such king has no king to attack.
    #[must_use]
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.board.king(color).is_some_and(|king| {
            self.attack_mask(color.opponent())
                .is_attacked(king.square())
        })
    }
}

/// Set of squares attacked by one color.
#[derive(Clone, PartialEq, Eq)]
pub struct CheckMask {
    color: Color,
    size: Size,
    attacked: Vec<bool>,
}

impl CheckMask {
    pub(crate) fn new(size: Size, color: Color) -> Self {
        Self {
            color,
            size,
            attacked: vec![false; size.area()],
        }
    }

    pub(crate) fn mark(&mut self, square: Square) {
        if self.size.contains(square) {
            let index = self.size.index(square);
            self.attacked[index] = true;
        }
    }

    /// Returns true if the attacking color could capture on the square.
    /// Squares outside of the board are never attacked.
    #[must_use]
    pub fn is_attacked(&self, square: Square) -> bool {
        self.size.contains(square) && self.attacked[self.size.index(square)]
    }

    /// Color whose pieces produce the attacks.
    #[must_use]
    pub const fn attacking_color(&self) -> Color {
        self.color
    }

    /// Color whose king would be in check on an attacked square.
    #[must_use]
    pub const fn attacked_color(&self) -> Color {
        self.color.opponent()
    }

    /// Number of attacked squares.
    #[must_use]
    pub fn count(&self) -> usize {
        self.attacked.iter().filter(|&&attacked| attacked).count()
    }
}

impl fmt::Debug for CheckMask {
    /// Dumps the mask with `1` for attacked and `.` for safe squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "attacks by {}", self.color)?;
        f.write_str(&render_grid(self.size, " ", |square| {
            if self.is_attacked(square) {
                '1'
            } else {
                '.'
            }
        }))
    }
}
