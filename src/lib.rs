//! # Geodesic Y
//!
//! Plays the connection game Y on a geodesic board: a triangle subdivided
//! into concentric rings of cells. A player wins by building one connected
//! group of stones that touches all three sides of the board.
//!
//! ## Modules
//! - [`geometry`]: procedural board generation and edge classification
//! - [`board`]: cell ownership, legal moves and incremental win detection
//! - [`agents`]: move selection (random, negamax, Monte Carlo, human, external)
//! - [`engine`]: a stateful UCT searcher usable as an external engine
//! - [`game_controller`]: the turn loop that owns the authoritative board
//! - [`config`]: game and agent configuration

pub mod agent_wrapper;
pub mod agents;
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod game_controller;
pub mod geometry;

pub use agent_wrapper::AgentWrapper;
pub use agents::Agent;
pub use board::{Board, BoardSnapshot, CellView, Player};
pub use config::{AgentConfig, AgentKind, GameConfig};
pub use engine::UctEngine;
pub use error::{GameError, MoveValidationError};
pub use game_controller::{GameController, GameStatus, MoveResult};
pub use geometry::{generate_board, Geometry};

/// The state of a two-player game, as seen by generic search code.
///
/// Must be cloneable so searches can explore hypothetical continuations
/// without touching the state they were given.
pub trait GameState: Clone {
    /// The type of a move in the game.
    type Move: Clone + Ord + std::fmt::Debug;

    /// Returns a vector of all possible moves from the current state.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move for the player to move, modifying the state.
    fn make_move(&mut self, mv: &Self::Move) -> Result<(), GameError>;
    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;
    /// Returns the winner of the game, if any.
    fn get_winner(&self) -> Option<Player>;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> Player;
}
