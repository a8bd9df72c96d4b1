//! Board state: a rectangular grid of optional pieces with the per-color king
//! index and a version counter that stamps cached move lists.

use std::fmt;

use anyhow::{bail, Context};
use tracing::debug;

use crate::chess::config::Rules;
use crate::chess::core::{parse_symbol, render_grid, Color, PieceKind, Size, Square, Vector};
use crate::chess::error::{Result, RulesError};
use crate::chess::piece::{MoveCache, Piece, PieceId};

/// Side effect of a move beyond relocating the moving piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Special {
    /// The king castled and the rook jumped over it.
    Castle {
        #[allow(missing_docs)]
        rook_from: Square,
        #[allow(missing_docs)]
        rook_to: Square,
    },
    /// The pawn reached the farthest row and was replaced by a queen.
    Promotion {
        /// The pawn as it was when it arrived at the last row.
        pawn: Piece,
    },
}

/// Outcome of [`Board::move_piece`].
#[derive(Debug)]
pub(crate) struct Applied {
    pub(crate) piece: PieceId,
    pub(crate) captured: Option<Piece>,
    pub(crate) special: Option<Special>,
}

/// Grid of squares holding at most one piece each.
///
/// Invariants:
///
/// - There is at most one king of each color.
/// - Every piece knows the square it stands on.
/// - `version` grows on every placement and removal.
#[derive(Clone)]
pub struct Board {
    size: Size,
    squares: Vec<Option<Piece>>,
    kings: [Option<Square>; 2],
    version: u64,
    next_id: u32,
    rules: Rules,
}

impl Board {
    /// Creates an empty board of given size.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidSize`] unless both dimensions are
    /// positive and the number of squares fits into `i32`.
    pub fn empty(width: i32, height: i32) -> Result<Self> {
        let area = width
            .checked_mul(height)
            .filter(|_| width > 0 && height > 0)
            .and_then(|area| usize::try_from(area).ok());
        if area.is_none() {
            return Err(RulesError::InvalidSize { width, height });
        }
        Ok(Self::blank(Size::new(width, height)))
    }

    fn blank(size: Size) -> Self {
        Self {
            size,
            squares: vec![None; size.area()],
            kings: [None, None],
            version: 0,
            next_id: 0,
            rules: Rules::default(),
        }
    }

    /// Creates the classic 8x8 starting setup. Black occupies rows 0 and 1,
    /// White occupies rows 6 and 7 and moves toward row 0.
    #[must_use]
    pub fn standard() -> Self {
        let mut board = Self::blank(Size::STANDARD);
        board.fill_standard();
        board
    }

    /// Clears the board and puts the starting setup on it.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::NonStandardSize`] if the board is not 8x8. The
    /// board is left untouched in that case.
    pub fn reset_standard(&mut self) -> Result<()> {
        if self.size != Size::STANDARD {
            return Err(RulesError::NonStandardSize { size: self.size });
        }
        self.clear();
        self.fill_standard();
        Ok(())
    }

    fn fill_standard(&mut self) {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        const PAWNS: [PieceKind; 8] = [PieceKind::Pawn; 8];
        // Row-major, the same order a parsed layout is filled in.
        for (y, color, row) in [
            (0, Color::Black, BACK_RANK),
            (1, Color::Black, PAWNS),
            (6, Color::White, PAWNS),
            (7, Color::White, BACK_RANK),
        ] {
            for (x, kind) in (0..).zip(row) {
                let _ = self.insert(Square::new(x, y), Piece::new(kind, color));
            }
        }
    }

    /// Parses a board from its text layout: one line per row, `.` for an empty
    /// square, `KQRBNP` for White and `kqrbnp` for Black pieces. Whitespace
    /// around lines is ignored.
    ///
    /// Pieces start with no moves made, except for pawns standing off their
    /// starting row: these can no longer advance two squares.
    ///
    /// ```
    /// use rookery::{Board, Square};
    ///
    /// let board = Board::from_layout(
    ///     "..k\n\
    ///      ...\n\
    ///      K.R",
    /// )
    /// .unwrap();
    /// assert_eq!(board.size().width, 3);
    /// assert!(board.piece(Square::new(2, 2)).is_some());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if the layout is empty, ragged, contains an
    /// unknown symbol or more than one king of a color.
    pub fn from_layout(layout: &str) -> anyhow::Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            bail!("layout should have at least one row");
        };
        let width = i32::try_from(first.chars().count())?;
        let height = i32::try_from(rows.len())?;
        let mut board = Self::empty(width, height)?;
        for (y, row) in (0..).zip(&rows) {
            if i32::try_from(row.chars().count())? != width {
                bail!("row {y} should have {width} squares, got \"{row}\"");
            }
            for (x, symbol) in (0..).zip(row.chars()) {
                if symbol == '.' {
                    continue;
                }
                let (color, kind) = parse_symbol(symbol)?;
                let mut piece = Piece::new(kind, color);
                if kind == PieceKind::Pawn && y != color.pawn_row(board.size) {
                    piece.move_count = 1;
                }
                let _ = board
                    .place(Square::new(x, y), piece)
                    .with_context(|| format!("placing '{symbol}' at ({x}, {y})"))?;
            }
        }
        Ok(board)
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Mutation counter. Grows every time a piece is placed or removed.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Optional rules in effect on this board.
    #[must_use]
    pub const fn rules(&self) -> Rules {
        self.rules
    }

    /// Enables or disables optional rules.
    pub fn set_rules(&mut self, rules: Rules) {
        if rules != self.rules {
            self.rules = rules;
            // Castling availability depends on the rules.
            self.version += 1;
        }
    }

    /// Returns the piece on the square, or `None` if the square is empty or
    /// outside of the board.
    #[must_use]
    pub fn piece(&self, square: Square) -> Option<&Piece> {
        if !self.size.contains(square) {
            return None;
        }
        self.squares[self.size.index(square)].as_ref()
    }

    pub(crate) fn piece_mut(&mut self, square: Square) -> Option<&mut Piece> {
        if !self.size.contains(square) {
            return None;
        }
        let index = self.size.index(square);
        self.squares[index].as_mut()
    }

    /// King of given color, if present.
    #[must_use]
    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.kings[color.index()].and_then(|square| self.piece(square))
    }

    /// All pieces in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten()
    }

    /// Calls `visit` for every square in row-major order.
    pub fn for_each_square(&self, mut visit: impl FnMut(Square, Option<&Piece>)) {
        for (index, piece) in self.squares.iter().enumerate() {
            visit(self.size.square(index), piece.as_ref());
        }
    }

    /// Calls `visit` for every piece in row-major order.
    pub fn for_each_piece(&self, visit: impl FnMut(&Piece)) {
        self.pieces().for_each(visit);
    }

    /// Places a piece on an empty square. The piece keeps its identity if it
    /// has one and gets a new one otherwise.
    ///
    /// # Errors
    ///
    /// Fails without changing the board if the square is outside of the board
    /// or occupied, or if the piece is a king and the board already has a king
    /// of that color.
    pub fn add_piece(&mut self, square: Square, piece: Piece) -> Result<&Piece> {
        let _ = self.place(square, piece)?;
        self.piece(square).ok_or(RulesError::EmptySquare { square })
    }

    pub(crate) fn place(&mut self, square: Square, piece: Piece) -> Result<PieceId> {
        if !self.size.contains(square) {
            return Err(RulesError::OutOfBounds {
                square,
                size: self.size,
            });
        }
        if self.piece(square).is_some() {
            return Err(RulesError::Occupied { square });
        }
        if piece.kind() == PieceKind::King && self.kings[piece.color().index()].is_some() {
            return Err(RulesError::DuplicateKing {
                color: piece.color(),
            });
        }
        Ok(self.insert(square, piece))
    }

    /// Stores the piece without validation. Callers guarantee that the square
    /// is on the board and empty and that the king index stays consistent.
    fn insert(&mut self, square: Square, mut piece: Piece) -> PieceId {
        let id = match piece.id {
            Some(id) => {
                self.next_id = self.next_id.max(id.0);
                id
            },
            None => {
                self.next_id += 1;
                PieceId(self.next_id)
            },
        };
        piece.id = Some(id);
        piece.square = square;
        // Stamps are only meaningful for the board that computed them.
        piece.cache = MoveCache::default();
        if piece.kind() == PieceKind::King {
            self.kings[piece.color().index()] = Some(square);
        }
        let index = self.size.index(square);
        self.squares[index] = Some(piece);
        self.version += 1;
        id
    }

    /// Takes the piece off the board. Returns `None` if the square is empty or
    /// outside of the board.
    pub fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        if !self.size.contains(square) {
            return None;
        }
        let index = self.size.index(square);
        let piece = self.squares[index].take()?;
        if piece.kind() == PieceKind::King {
            self.kings[piece.color().index()] = None;
        }
        self.version += 1;
        Some(piece)
    }

    /// Removes every piece from the board.
    pub fn clear(&mut self) {
        self.squares.fill(None);
        self.kings = [None, None];
        self.version += 1;
    }

    /// Copy for a scratch board: identical pieces and counters but no cached
    /// move lists.
    pub(crate) fn scratch_copy(&self) -> Self {
        Self {
            size: self.size,
            squares: self
                .squares
                .iter()
                .map(|square| square.as_ref().map(Piece::detached))
                .collect(),
            kings: self.kings,
            version: self.version,
            next_id: self.next_id,
            rules: self.rules,
        }
    }

    /// Moves a piece without any legality checks: captures the occupant of
    /// the destination, bumps the move counter and applies castling and
    /// promotion side effects.
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) -> Result<Applied> {
        for square in [from, to] {
            if !self.size.contains(square) {
                return Err(RulesError::OutOfBounds {
                    square,
                    size: self.size,
                });
            }
        }
        let mut piece = self
            .remove_piece(from)
            .ok_or(RulesError::EmptySquare { square: from })?;
        let (kind, color) = (piece.kind(), piece.color());
        let captured = self.remove_piece(to);
        piece.move_count += 1;
        let id = self.place(to, piece)?;
        let special = match kind {
            PieceKind::King
                if self.rules.contains(Rules::CASTLING)
                    && from.y() == to.y()
                    && (to.x() - from.x()).abs() == 2 =>
            {
                self.castle_rook(from, to, color)
            },
            PieceKind::Pawn
                if self.rules.contains(Rules::PROMOTION)
                    && to.y() == color.promotion_row(self.size) =>
            {
                Some(self.promote(to, color)?)
            },
            _ => None,
        };
        Ok(Applied {
            piece: id,
            captured,
            special,
        })
    }

    /// Moves the first rook found beyond the king's landing square next to
    /// the square the king came from.
    fn castle_rook(&mut self, from: Square, to: Square, color: Color) -> Option<Special> {
        let step = Vector::new((to.x() - from.x()).signum(), 0);
        let mut rook_from = to + step;
        while self.size.contains(rook_from) {
            match self.piece(rook_from) {
                Some(piece) if piece.kind() == PieceKind::Rook && piece.color() == color => {
                    let mut rook = self.remove_piece(rook_from)?;
                    rook.move_count += 1;
                    let rook_to = from + step;
                    let _ = self.insert(rook_to, rook);
                    debug!(%color, %rook_from, %rook_to, "castled");
                    return Some(Special::Castle { rook_from, rook_to });
                },
                Some(_) => return None,
                None => rook_from = rook_from + step,
            }
        }
        None
    }

    fn promote(&mut self, square: Square, color: Color) -> Result<Special> {
        let mut pawn = self
            .remove_piece(square)
            .ok_or(RulesError::EmptySquare { square })?;
        pawn.cache = MoveCache::default();
        let _ = self.place(square, Piece::new(PieceKind::Queen, color))?;
        debug!(%color, %square, "pawn promoted");
        Ok(Special::Promotion { pawn })
    }
}

impl Default for Board {
    /// Empty 8x8 board.
    fn default() -> Self {
        Self::blank(Size::STANDARD)
    }
}

/// Boards are equal if they hold the same pieces under the same rules. The
/// version counter and cached moves are bookkeeping.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.squares == other.squares
            && self.kings == other.kings
            && self.rules == other.rules
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    /// Prints the layout accepted by [`Board::from_layout`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_grid(self.size, "", |square| {
            self.piece(square).map_or('.', Piece::symbol)
        }))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} board, version {}", self.size, self.version)?;
        f.write_str(&render_grid(self.size, " ", |square| {
            self.piece(square).map_or('.', Piece::symbol)
        }))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    const STANDARD: &str = "rnbqkbnr\n\
                            pppppppp\n\
                            ........\n\
                            ........\n\
                            ........\n\
                            ........\n\
                            PPPPPPPP\n\
                            RNBQKBNR";

    #[test]
    fn standard_setup() {
        let board = Board::standard();
        assert_eq!(board.to_string(), STANDARD);
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(
            board.king(Color::White).unwrap().square(),
            Square::new(4, 7)
        );
        assert_eq!(
            board.king(Color::Black).unwrap().square(),
            Square::new(4, 0)
        );
        assert_eq!(Board::from_layout(STANDARD).unwrap(), board);
    }

    #[test]
    fn reset_requires_standard_size() {
        let mut board = Board::empty(6, 6).unwrap();
        assert_eq!(
            board.reset_standard(),
            Err(RulesError::NonStandardSize {
                size: Size::new(6, 6)
            })
        );
        assert_eq!(board.pieces().count(), 0);
        let mut board = Board::default();
        board.reset_standard().unwrap();
        assert_eq!(board.to_string(), STANDARD);
    }

    #[test]
    fn invalid_size() {
        assert_eq!(
            Board::empty(0, 8),
            Err(RulesError::InvalidSize {
                width: 0,
                height: 8
            })
        );
        assert!(Board::empty(3, -1).is_err());
        assert!(Board::empty(-4, -4).is_err());
        assert_eq!(
            Board::empty(70_000, 70_000),
            Err(RulesError::InvalidSize {
                width: 70_000,
                height: 70_000
            })
        );
        assert_eq!(
            Board::empty(i32::MAX, 2).unwrap_err(),
            RulesError::InvalidSize {
                width: i32::MAX,
                height: 2
            }
        );
    }

    #[test]
    fn second_king_is_rejected() {
        let mut board = Board::empty(4, 4).unwrap();
        let _ = board
            .add_piece(Square::new(0, 0), Piece::new(PieceKind::King, Color::White))
            .unwrap();
        let before = board.clone();
        assert_eq!(
            board
                .add_piece(Square::new(3, 3), Piece::new(PieceKind::King, Color::White))
                .unwrap_err(),
            RulesError::DuplicateKing {
                color: Color::White
            }
        );
        assert_eq!(board, before);
        assert_eq!(board.version(), before.version());
        // The other color still has room for its king.
        let _ = board
            .add_piece(Square::new(3, 3), Piece::new(PieceKind::King, Color::Black))
            .unwrap();
        // Removing the king frees the slot.
        let king = board.remove_piece(Square::new(0, 0)).unwrap();
        assert!(board.king(Color::White).is_none());
        assert_eq!(
            board.add_piece(Square::new(1, 1), king).unwrap().id(),
            before.king(Color::White).unwrap().id()
        );
    }

    #[test]
    fn add_piece_validation() {
        let mut board = Board::empty(2, 2).unwrap();
        let _ = board
            .add_piece(Square::new(1, 1), Piece::new(PieceKind::Rook, Color::Black))
            .unwrap();
        assert_eq!(
            board
                .add_piece(Square::new(1, 1), Piece::new(PieceKind::Pawn, Color::White))
                .unwrap_err(),
            RulesError::Occupied {
                square: Square::new(1, 1)
            }
        );
        assert_eq!(
            board
                .add_piece(Square::new(2, 0), Piece::new(PieceKind::Pawn, Color::White))
                .unwrap_err(),
            RulesError::OutOfBounds {
                square: Square::new(2, 0),
                size: Size::new(2, 2)
            }
        );
        assert!(board.piece(Square::new(-1, 0)).is_none());
        assert!(board.remove_piece(Square::new(5, 5)).is_none());
    }

    #[test]
    fn version_grows_on_mutation() {
        let mut board = Board::empty(3, 3).unwrap();
        let initial = board.version();
        let _ = board
            .add_piece(Square::new(0, 0), Piece::new(PieceKind::Knight, Color::White))
            .unwrap();
        let added = board.version();
        assert!(added > initial);
        let _ = board.piece(Square::new(0, 0));
        assert_eq!(board.version(), added);
        let _ = board.remove_piece(Square::new(0, 0)).unwrap();
        assert!(board.version() > added);
    }

    #[test]
    fn pieces_track_their_squares() {
        let board = Board::standard();
        board.for_each_square(|square, piece| {
            if let Some(piece) = piece {
                assert_eq!(piece.square(), square);
            }
        });
        let mut white = 0;
        board.for_each_piece(|piece| {
            if piece.color() == Color::White {
                white += 1;
            }
        });
        assert_eq!(white, 16);
    }

    #[test]
    fn layout_errors() {
        assert!(Board::from_layout("").is_err());
        assert!(Board::from_layout("..\n...").is_err());
        assert!(Board::from_layout("x.\n..").is_err());
        assert!(Board::from_layout("KK\n..").is_err());
    }

    #[test]
    fn layout_pawns_off_start_row() {
        let board = Board::from_layout(
            "....\n\
             p...\n\
             .p..\n\
             ..P.",
        )
        .unwrap();
        assert_eq!(board.piece(Square::new(0, 1)).unwrap().move_count(), 0);
        assert_eq!(board.piece(Square::new(1, 2)).unwrap().move_count(), 1);
        // Row 2 is the white pawn row on a board of height 4.
        assert_eq!(board.piece(Square::new(2, 3)).unwrap().move_count(), 1);
    }

    #[test]
    fn castling_relocates_rook() {
        let mut board = Board::from_layout(
            "....k...\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             ........\n\
             R...K..R",
        )
        .unwrap();
        let rook_id = board.piece(Square::new(7, 7)).unwrap().id();
        let applied = board.move_piece(Square::new(4, 7), Square::new(6, 7)).unwrap();
        assert_eq!(
            applied.special,
            Some(Special::Castle {
                rook_from: Square::new(7, 7),
                rook_to: Square::new(5, 7),
            })
        );
        let rook = board.piece(Square::new(5, 7)).unwrap();
        assert_eq!(rook.id(), rook_id);
        assert_eq!(rook.move_count(), 1);
        assert_eq!(board.piece(Square::new(6, 7)).unwrap().move_count(), 1);
        assert!(board.piece(Square::new(7, 7)).is_none());
    }

    #[test]
    fn promotion_replaces_pawn() {
        let mut board = Board::from_layout(
            "...\n\
             P..\n\
             ...",
        )
        .unwrap();
        let pawn_id = board.piece(Square::new(0, 1)).unwrap().id();
        let applied = board.move_piece(Square::new(0, 1), Square::new(0, 0)).unwrap();
        let queen = board.piece(Square::new(0, 0)).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.color(), Color::White);
        assert_eq!(queen.move_count(), 0);
        assert_ne!(queen.id(), pawn_id);
        assert!(board.pieces().all(|piece| piece.id() != pawn_id));
        match applied.special {
            Some(Special::Promotion { pawn }) => assert_eq!(pawn.id(), pawn_id),
            special => panic!("expected promotion, got {special:?}"),
        }
    }

    #[test]
    fn debug_dump() {
        let board = Board::from_layout("k.\n.K").unwrap();
        assert_eq!(
            format!("{board:?}"),
            format!("2x2 board, version {}\nk .\n. K", board.version())
        );
    }
}
