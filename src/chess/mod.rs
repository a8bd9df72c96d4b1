//! Implementation of the chess rules: board state, pieces and their moves,
//! check detection and the turn controller.
//!
//! Two kinds of boards exist at runtime. The authoritative [`board::Board`] is
//! owned by [`game::Game`] and only mutated through it. A
//! [`simulation::Simulation`] is a disposable deep copy used to compute
//! attacks and to try out a move without touching the real game.

pub mod board;
pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod legality;
pub mod piece;
pub mod simulation;
