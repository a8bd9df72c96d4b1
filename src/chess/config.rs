//! Knobs of the rules engine. Everything is programmatic: the engine has no
//! configuration files.

bitflags::bitflags! {
    /// Optional rules that can be switched off, e.g. for puzzles and tests
    /// that only exercise basic piece movement.
    ///
    /// The set is stored on the [`crate::Board`], so the simulation copies
    /// used for legality checks follow the same rules as the game.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Rules : u8 {
        /// King may castle with an unmoved rook.
        const CASTLING = 0b01;
        /// Pawn reaching the farthest row turns into a queen.
        const PROMOTION = 0b10;
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::all()
    }
}

/// What [`crate::Game::attempt_move`] does with an illegal move when no
/// illegal-move handler is installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return [`crate::RulesError::IllegalMove`].
    #[default]
    Raise,
    /// Return `Ok(false)`.
    Ignore,
}

/// Settings of a [`crate::Game`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Enabled optional rules.
    pub rules: Rules,
    /// Reaction to illegal moves.
    pub errors: ErrorPolicy,
    /// Record played moves and captured pieces, which makes
    /// [`crate::Game::undo`] possible.
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            errors: ErrorPolicy::default(),
            history: true,
        }
    }
}
