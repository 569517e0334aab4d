//! Adapter for stateful search engines that track the game themselves.

use super::Agent;
use crate::board::{Board, Player};
use crate::error::GameError;
use tracing::debug;

/// A search engine that keeps its own copy of the game.
///
/// Every move of the game, the engine's own included, reaches its state
/// through `inform_move`. `step` only proposes a move, so an answer the game
/// rejects leaves the engine where it was.
pub trait SearchEngine {
    /// Applies the next move of the game to the engine's state.
    fn inform_move(&mut self, cell: usize) -> Result<(), GameError>;

    /// Searches from the current state and returns the chosen move without
    /// playing it.
    fn step(&mut self) -> Result<usize, GameError>;
}

/// Plays with a [`SearchEngine`].
///
/// The board handed to `select_move` is only used to check the engine's
/// answer; a move the board rejects surfaces as `GameError::InvalidMove` and
/// is never played on the engine.
#[derive(Debug)]
pub struct ExternalAgent<E> {
    color: Player,
    engine: E,
}

impl<E: SearchEngine> ExternalAgent<E> {
    pub fn new(color: Player, engine: E) -> Self {
        Self { color, engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: SearchEngine> Agent for ExternalAgent<E> {
    fn color(&self) -> Player {
        self.color
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        if board.is_terminal() {
            return Err(GameError::GameOver);
        }
        let cell = self.engine.step()?;
        board.validate_move(cell)?;
        self.engine.inform_move(cell)?;
        debug!(player = %self.color, cell, "external engine answered");
        Ok(cell)
    }

    fn observe_opponent_move(&mut self, cell: usize) -> Result<(), GameError> {
        self.engine.inform_move(cell)
    }

    fn observe_history(&mut self, cells: &[usize]) -> Result<(), GameError> {
        for &cell in cells {
            self.engine.inform_move(cell)?;
        }
        if !cells.is_empty() {
            debug!(player = %self.color, moves = cells.len(), "external engine caught up");
        }
        Ok(())
    }
}
