//! # Move Selection Agents
//!
//! Every way of choosing a move implements the single [`Agent`] capability:
//! given a read-only board, return a cell id. Agents never mutate the board
//! they are handed; searches branch on private clones.
//!
//! ## Available Agents
//! - [`RandomAgent`]: uniform choice among legal moves
//! - [`NegamaxAgent`]: depth-limited alpha-beta over the circuit heuristic
//! - [`MctsAgent`]: Monte Carlo tree search rebuilt from scratch every move
//! - [`HumanAgent`]: reads cell ids from a text stream
//! - [`ExternalAgent`]: adapts any stateful [`SearchEngine`]
//!
//! ## Synchronisation
//! Agents that keep incremental state between turns (external engines) are
//! told about the opponent's latest move through
//! [`Agent::observe_opponent_move`] before they are asked to move. On its
//! first turn of a game an agent also receives the moves played before that
//! through [`Agent::observe_history`], so it can join a game in progress.

use crate::board::{Board, Player};
use crate::error::GameError;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub mod external;
pub mod human;
pub mod mcts;
pub mod negamax;
pub mod random;

pub use external::{ExternalAgent, SearchEngine};
pub use human::HumanAgent;
pub use mcts::MctsAgent;
pub use negamax::NegamaxAgent;
pub use random::RandomAgent;

/// A strategy that picks moves for one player.
pub trait Agent {
    /// Colour this agent plays
    fn color(&self) -> Player;

    /// Chooses a cell to play on `board`.
    ///
    /// # Errors
    /// `GameError::GameOver` when there is nothing left to play; agents with
    /// their own configuration or input may report other kinds.
    fn select_move(&mut self, board: &Board) -> Result<usize, GameError>;

    /// Called with the opponent's most recent move before `select_move`.
    fn observe_opponent_move(&mut self, _cell: usize) -> Result<(), GameError> {
        Ok(())
    }

    /// Called once before the agent's first turn with every earlier move,
    /// oldest first, up to but excluding the opponent's most recent one.
    fn observe_history(&mut self, _cells: &[usize]) -> Result<(), GameError> {
        Ok(())
    }
}

/// Random generator for agents, seeded when reproducibility is wanted.
pub fn make_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    }
}
