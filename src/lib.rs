//! Chess rules layer: keeps the board state, enumerates legal moves for each
//! piece, detects check, checkmate and stalemate and applies the special rules
//! (castling and pawn promotion). For more information, see [README].
//!
//! The entry point is [`Game`]: it owns the authoritative [`Board`], accepts
//! move attempts and reports the end of the game through event handlers.
//!
//! ```
//! use rookery::{Board, Config, Game, Square};
//!
//! let mut game = Game::new(Board::standard(), Config::default()).unwrap();
//! // White pawn from e2 to e4.
//! assert!(game.attempt_move(Square::new(4, 6), Square::new(4, 4)).unwrap());
//! ```
//!
//! [README]: https://github.com/kirillbobyrev/rookery/blob/main/README.md

// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod chess;

pub use chess::board::{Board, Special};
pub use chess::config::{Config, ErrorPolicy, Rules};
pub use chess::core::{Color, PieceKind, Size, Square, Vector};
pub use chess::error::{IllegalMove, Rejection, Result, RulesError};
pub use chess::game::{Game, GameState, MoveRecord, Outcome};
pub use chess::piece::{Piece, PieceId};
pub use chess::simulation::{CheckMask, Simulation};

use shadow_rs::shadow;

shadow!(build);

/// Returns the full crate version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the version, author and GitHub repository on
/// startup.
pub fn print_engine_info() {
    println!("Rookery chess rules {}", engine_version());
    println!("<https://github.com/kirillbobyrev/rookery>");
}

/// Prints whether this is a release build and whether the tree was clean.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
