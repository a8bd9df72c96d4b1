//! Chess primitives commonly used within [`crate::chess`].

use std::fmt;
use std::ops::{Add, Mul, Not};

use anyhow::bail;
use itertools::Itertools;

/// Width and height of the standard chess board.
pub const STANDARD_WIDTH: i32 = 8;
#[allow(missing_docs)]
pub const STANDARD_HEIGHT: i32 = 8;

/// Dimensions of a rectangular board. Both sides are positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    #[allow(missing_docs)]
    pub width: i32,
    #[allow(missing_docs)]
    pub height: i32,
}

impl Size {
    /// Size of the classic 8x8 board.
    pub const STANDARD: Self = Self::new(STANDARD_WIDTH, STANDARD_HEIGHT);

    /// Creates a size without validation: see [`crate::Board::empty`].
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns true if the square lies within `[0, width) x [0, height)`.
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        square.x >= 0 && square.y >= 0 && square.x < self.width && square.y < self.height
    }

    /// Total number of squares on the board.
    #[must_use]
    pub const fn area(self) -> usize {
        (self.width * self.height) as usize
    }

    /// Row-major index of a square. The caller is responsible for checking
    /// [`Size::contains`] first.
    pub(crate) const fn index(self, square: Square) -> usize {
        (square.x + square.y * self.width) as usize
    }

    /// Inverse of [`Size::index`].
    pub(crate) const fn square(self, index: usize) -> Square {
        let index = index as i32;
        Square::new(index % self.width, index / self.width)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A square on the board addressed by its column (`x`) and row (`y`).
///
/// Row 0 is the top of the board: Black's back rank in the standard setup.
/// Squares are plain values and are not tied to any board, so they may also
/// point outside of it: boards check the bounds on every access.
///
/// ```
/// use rookery::Square;
///
/// let e4 = Square::new(4, 4);
/// assert_eq!(e4.x(), 4);
/// assert_eq!(e4.to_string(), "(4, 4)");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    x: i32,
    y: i32,
}

impl Square {
    /// Creates a square from its column and row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    /// Row, counted from the top of the board.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Parses algebraic notation (e.g. "e2") on a board of given height. Files
    /// are lowercase letters starting from 'a', ranks are counted from the
    /// bottom of the board starting from 1.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if the input is not a letter followed by a
    /// positive number.
    pub fn from_algebraic(input: &str, height: i32) -> anyhow::Result<Self> {
        let mut chars = input.chars();
        let file = match chars.next() {
            Some(file @ 'a'..='z') => file,
            _ => bail!("square should start with a file letter, got \"{input}\""),
        };
        let rank = chars.as_str();
        if rank.is_empty() || !rank.bytes().all(|c| c.is_ascii_digit()) {
            bail!("square should end with a rank number, got \"{input}\"");
        }
        let rank: i32 = rank.parse()?;
        if rank == 0 {
            bail!("ranks start from 1, got \"{input}\"");
        }
        Ok(Self::new(i32::from(file as u8 - b'a'), height - rank))
    }

    /// Formats the square in algebraic notation on a board of given height.
    /// Inverse of [`Square::from_algebraic`].
    #[must_use]
    pub fn to_algebraic(self, height: i32) -> String {
        let file = u8::try_from(self.x).map_or('?', |x| char::from(b'a'.wrapping_add(x)));
        format!("{file}{}", height - self.y)
    }
}

impl Add<Vector> for Square {
    type Output = Self;

    fn add(self, rhs: Vector) -> Self::Output {
        Self::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl TryFrom<(i64, i64)> for Square {
    type Error = anyhow::Error;

    /// Converts raw coordinates (e.g. translated from pointer input) into a
    /// square.
    fn try_from((x, y): (i64, i64)) -> anyhow::Result<Self> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => Ok(Self::new(x, y)),
            _ => bail!("coordinates ({x}, {y}) do not fit any board"),
        }
    }
}

/// Relative displacement between two squares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vector {
    #[allow(missing_docs)]
    pub dx: i32,
    #[allow(missing_docs)]
    pub dy: i32,
}

impl Vector {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl Mul<i32> for Vector {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Self::new(self.dx * rhs, self.dy * rhs)
    }
}

/// Steps of a bishop (and the diagonal steps of a queen).
pub(crate) const DIAGONALS: [Vector; 4] = [
    Vector::new(-1, -1),
    Vector::new(1, -1),
    Vector::new(-1, 1),
    Vector::new(1, 1),
];

/// Steps of a rook (and the straight steps of a queen).
pub(crate) const STRAIGHTS: [Vector; 4] = [
    Vector::new(1, 0),
    Vector::new(-1, 0),
    Vector::new(0, 1),
    Vector::new(0, -1),
];

pub(crate) const KNIGHT_JUMPS: [Vector; 8] = [
    Vector::new(-2, -1),
    Vector::new(-2, 1),
    Vector::new(-1, -2),
    Vector::new(-1, 2),
    Vector::new(1, -2),
    Vector::new(1, 2),
    Vector::new(2, -1),
    Vector::new(2, 1),
];

pub(crate) const KING_STEPS: [Vector; 8] = [
    Vector::new(-1, -1),
    Vector::new(0, -1),
    Vector::new(1, -1),
    Vector::new(-1, 0),
    Vector::new(1, 0),
    Vector::new(-1, 1),
    Vector::new(0, 1),
    Vector::new(1, 1),
];

/// A standard game of chess is played between two sides: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[allow(missing_docs)]
    pub const ALL: [Self; 2] = [Self::White, Self::Black];

    /// "Flips" the color. Applying it twice returns the original color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row step of a pawn push: White moves toward row 0.
    pub(crate) const fn forward(self) -> i32 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// The farthest row from this side's perspective, where its pawns
    /// promote.
    pub(crate) const fn promotion_row(self, size: Size) -> i32 {
        match self {
            Self::White => 0,
            Self::Black => size.height - 1,
        }
    }

    /// The row pawns of this color start on in the standard setup.
    pub(crate) const fn pawn_row(self, size: Size) -> i32 {
        match self {
            Self::White => size.height - 2,
            Self::Black => 1,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Lowercase English name, e.g. "knight".
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::King => "king",
            Self::Queen => "queen",
            Self::Rook => "rook",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Pawn => "pawn",
        }
    }

    /// Symbol used in board layouts: uppercase for White, lowercase for
    /// Black.
    #[must_use]
    pub const fn symbol(self, color: Color) -> char {
        let symbol = match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        };
        match color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        }
    }

    /// Sliding pieces move along a line until they hit something.
    pub(crate) const fn directions(self) -> &'static [Vector] {
        match self {
            Self::Queen => &KING_STEPS,
            Self::Rook => &STRAIGHTS,
            Self::Bishop => &DIAGONALS,
            Self::King | Self::Knight | Self::Pawn => &[],
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a layout symbol into its owner and kind.
pub(crate) fn parse_symbol(symbol: char) -> anyhow::Result<(Color, PieceKind)> {
    let color = if symbol.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let kind = match symbol.to_ascii_lowercase() {
        'k' => PieceKind::King,
        'q' => PieceKind::Queen,
        'r' => PieceKind::Rook,
        'b' => PieceKind::Bishop,
        'n' => PieceKind::Knight,
        'p' => PieceKind::Pawn,
        _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
    };
    Ok((color, kind))
}

/// Renders a square-by-square grid, one board row per line.
pub(crate) fn render_grid(size: Size, separator: &str, cell: impl Fn(Square) -> char) -> String {
    (0..size.height)
        .map(|y| (0..size.width).map(|x| cell(Square::new(x, y))).join(separator))
        .join("\n")
}
