//! Piece model: per-kind movement patterns and the attack patterns used for
//! check detection.
//!
//! The two are separate code paths: a pawn never moves diagonally onto an
//! empty square but it does attack that square, and a slider attacks every
//! empty square along its ray even though the capture-only move list skips
//! them.

use std::fmt;

use tracing::trace;

use crate::chess::board::Board;
use crate::chess::config::Rules;
use crate::chess::core::{Color, PieceKind, Square, Vector, KING_STEPS, KNIGHT_JUMPS};
use crate::chess::simulation::{CheckMask, Simulation};

/// Identity of a piece, unique within the board that first placed it.
/// Survives moves, simulation copies, captures and undo. A promoted pawn is
/// replaced by a queen with a fresh identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Legal destinations computed for a given board version.
#[derive(Clone, Debug, Default)]
pub(crate) struct MoveCache {
    pub(crate) stamp: Option<u64>,
    pub(crate) moves: Vec<Square>,
}

/// What is standing on a square from the point of view of a piece.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Occupant {
    Empty,
    Friend,
    Enemy,
}

/// A chess piece. Pieces are owned by a [`Board`]: the board keeps the
/// square, move counter and identity up to date.
#[derive(Clone, Debug)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    pub(crate) square: Square,
    pub(crate) move_count: u32,
    pub(crate) id: Option<PieceId>,
    pub(crate) cache: MoveCache,
}

impl Piece {
    /// Creates a piece that has not been placed on any board yet.
    #[must_use]
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            square: Square::new(0, 0),
            move_count: 0,
            id: None,
            cache: MoveCache::default(),
        }
    }

    /// Kind of the piece. Only promotion changes it, by replacing the piece.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Owner of the piece.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Square the piece stands on. Meaningless for pieces that are not on a
    /// board.
    #[must_use]
    pub const fn square(&self) -> Square {
        self.square
    }

    /// Number of times this piece has moved.
    #[must_use]
    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Identity assigned on first placement.
    #[must_use]
    pub const fn id(&self) -> Option<PieceId> {
        self.id
    }

    /// Image name for the rendering layer, e.g. `"king_white"`.
    #[must_use]
    pub fn asset_name(&self) -> String {
        format!("{}_{}", self.kind.name(), self.color)
    }

    /// Layout symbol: uppercase for White, lowercase for Black.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.kind.symbol(self.color)
    }

    /// Copy for a scratch board: same identity and counters, no cached moves.
    pub(crate) fn detached(&self) -> Self {
        Self {
            kind: self.kind,
            color: self.color,
            square: self.square,
            move_count: self.move_count,
            id: self.id,
            cache: MoveCache::default(),
        }
    }

    /// Destinations allowed by the movement pattern of the piece standing
    /// on the board, ignoring whether the own king is left in check.
    ///
    /// With `only_captures` only enemy-occupied destinations are produced
    /// and castling is never considered.
    #[must_use]
    pub fn pseudo_legal(&self, board: &Board, only_captures: bool) -> Vec<Square> {
        let mut moves = Vec::new();
        match self.kind {
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
                for &direction in self.kind.directions() {
                    self.directional(board, direction, only_captures, &mut moves);
                }
            },
            PieceKind::Knight => self.relative(board, &KNIGHT_JUMPS, only_captures, &mut moves),
            PieceKind::King => {
                self.relative(board, &KING_STEPS, only_captures, &mut moves);
                if !only_captures {
                    self.castling(board, &mut moves);
                }
            },
            PieceKind::Pawn => self.pawn(board, only_captures, &mut moves),
        }
        moves
    }

    /// Marks every square this piece could capture on.
    pub(crate) fn mark_attacks(&self, board: &Board, mask: &mut CheckMask) {
        match self.kind {
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
                for &direction in self.kind.directions() {
                    let mut square = self.square + direction;
                    while board.size().contains(square) {
                        match self.occupant(board, square) {
                            Occupant::Friend => break,
                            Occupant::Enemy => {
                                mask.mark(square);
                                break;
                            },
                            Occupant::Empty => mask.mark(square),
                        }
                        square = square + direction;
                    }
                }
            },
            PieceKind::Knight => self.mark_offsets(board, &KNIGHT_JUMPS, mask),
            PieceKind::King => self.mark_offsets(board, &KING_STEPS, mask),
            PieceKind::Pawn => {
                let forward = self.color.forward();
                let diagonals = [Vector::new(-1, forward), Vector::new(1, forward)];
                self.mark_offsets(board, &diagonals, mask);
            },
        }
    }

    fn mark_offsets(&self, board: &Board, offsets: &[Vector], mask: &mut CheckMask) {
        for &offset in offsets {
            let square = self.square + offset;
            if board.size().contains(square) && self.occupant(board, square) != Occupant::Friend {
                mask.mark(square);
            }
        }
    }

    fn occupant(&self, board: &Board, square: Square) -> Occupant {
        match board.piece(square) {
            None => Occupant::Empty,
            Some(piece) if piece.color == self.color => Occupant::Friend,
            Some(_) => Occupant::Enemy,
        }
    }

    /// Walks along `direction` until the edge of the board, stopping before
    /// a friend and right after an enemy.
    fn directional(
        &self,
        board: &Board,
        direction: Vector,
        only_captures: bool,
        moves: &mut Vec<Square>,
    ) {
        let mut square = self.square + direction;
        while board.size().contains(square) {
            match self.occupant(board, square) {
                Occupant::Friend => break,
                Occupant::Enemy => {
                    moves.push(square);
                    break;
                },
                Occupant::Empty => {
                    if !only_captures {
                        moves.push(square);
                    }
                },
            }
            square = square + direction;
        }
    }

    fn relative(
        &self,
        board: &Board,
        offsets: &[Vector],
        only_captures: bool,
        moves: &mut Vec<Square>,
    ) {
        for &offset in offsets {
            let square = self.square + offset;
            if !board.size().contains(square) {
                continue;
            }
            match self.occupant(board, square) {
                Occupant::Friend => {},
                Occupant::Enemy => moves.push(square),
                Occupant::Empty => {
                    if !only_captures {
                        moves.push(square);
                    }
                },
            }
        }
    }

    fn pawn(&self, board: &Board, only_captures: bool, moves: &mut Vec<Square>) {
        let forward = self.color.forward();
        for dx in [-1, 1] {
            let square = self.square + Vector::new(dx, forward);
            if board.size().contains(square) && self.occupant(board, square) == Occupant::Enemy {
                moves.push(square);
            }
        }
        if only_captures {
            return;
        }
        let single = self.square + Vector::new(0, forward);
        if !board.size().contains(single) || board.piece(single).is_some() {
            return;
        }
        moves.push(single);
        let double = single + Vector::new(0, forward);
        if self.move_count == 0 && board.size().contains(double) && board.piece(double).is_none() {
            moves.push(double);
        }
    }

    /// Castling with any unmoved rook on the same row. The king moves two
    /// squares toward the rook, none of the three squares it touches may be
    /// attacked and the squares in between must be empty.
    fn castling(&self, board: &Board, moves: &mut Vec<Square>) {
        if !board.rules().contains(Rules::CASTLING) || self.move_count > 0 {
            return;
        }
        let (x, y) = (self.square.x(), self.square.y());
        let mut attacks: Option<CheckMask> = None;
        for rook in board.pieces().filter(|piece| {
            piece.kind == PieceKind::Rook
                && piece.color == self.color
                && piece.move_count == 0
                && piece.square.y() == y
        }) {
            let distance = rook.square.x() - x;
            if distance.abs() < 3 {
                continue;
            }
            let dx = distance.signum();
            if (1..distance.abs()).any(|i| board.piece(Square::new(x + i * dx, y)).is_some()) {
                continue;
            }
            let mask = attacks.get_or_insert_with(|| {
                trace!(king = %self.square, "computing castling attack mask");
                Simulation::new(board).attack_mask(self.color.opponent())
            });
            if (0..3).any(|i| mask.is_attacked(Square::new(x + i * dx, y))) {
                continue;
            }
            moves.push(Square::new(x + 2 * dx, y));
        }
    }
}

/// Pieces are equal if they are the same piece in the same state. Cached
/// moves are not part of the state.
impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.color == other.color
            && self.square == other.square
            && self.move_count == other.move_count
            && self.id == other.id
    }
}

impl Eq for Piece {}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}
