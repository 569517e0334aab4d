//! Negamax search with alpha-beta pruning.
//!
//! The recursive search returns a value from the point of view of the player
//! to move in the frame; the root wrapper additionally tracks which move
//! produced the best value. Every explored move is played on a private clone
//! of the parent board, so siblings never share state.
//!
//! Leaves are scored with the board's circuit heuristic
//! ([`Board::connectivity_score`]). A move that completes a winning group
//! ends the line immediately with an infinite score.

use super::Agent;
use crate::board::{Board, Player};
use crate::error::GameError;
use tracing::debug;

/// Score of a won position
const INF: f64 = f64::INFINITY;

/// Alpha-beta negamax to a fixed depth.
#[derive(Debug, Clone)]
pub struct NegamaxAgent {
    color: Player,
    max_depth: u32,
    nodes: u64,
}

impl NegamaxAgent {
    /// # Errors
    /// `GameError::SearchConfig` when `max_depth` is 0.
    pub fn new(color: Player, max_depth: u32) -> Result<Self, GameError> {
        if max_depth < 1 {
            return Err(GameError::SearchConfig(
                "negamax depth must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            color,
            max_depth,
            nodes: 0,
        })
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Positions visited by the last search
    pub fn nodes_searched(&self) -> u64 {
        self.nodes
    }

    /// Root search: returns the best move for `color` and its value.
    ///
    /// Ties keep the earliest legal move; only a strictly greater value
    /// replaces the running best.
    pub fn search_root(&mut self, board: &Board, color: Player) -> Result<(usize, f64), GameError> {
        let moves = board.legal_moves().to_vec();
        let Some(&first) = moves.first() else {
            return Err(GameError::GameOver);
        };
        if board.winner().is_some() {
            return Err(GameError::GameOver);
        }

        self.nodes = 0;
        let mut best_move = first;
        let mut best_value = -INF;
        let mut alpha = -INF;
        let beta = INF;

        for mv in moves {
            let mut child = board.clone();
            child.apply_move(mv, color)?;
            let value = -self.negamax(&child, self.max_depth - 1, -beta, -alpha, color.opponent(), mv)?;

            if value > best_value {
                best_value = value;
                best_move = mv;
            }
            alpha = alpha.max(best_value);
            if alpha >= beta {
                break;
            }
        }

        Ok((best_move, best_value))
    }

    /// Value of `board` for `color`, the player to move, after `last_move`
    /// was played by the opponent.
    fn negamax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: f64,
        beta: f64,
        color: Player,
        last_move: usize,
    ) -> Result<f64, GameError> {
        self.nodes += 1;

        if let Some(winner) = board.find_winner(last_move) {
            return Ok(if winner == color { INF } else { -INF });
        }
        if depth == 0 || board.legal_moves().is_empty() {
            return Ok(evaluate(board, color));
        }

        let mut value = -INF;
        for &mv in board.legal_moves() {
            let mut child = board.clone();
            child.apply_move(mv, color)?;
            let child_value = -self.negamax(&child, depth - 1, -beta, -alpha, color.opponent(), mv)?;

            value = value.max(child_value);
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }
        Ok(value)
    }
}

/// Heuristic strength of `board` for `color`.
pub fn evaluate(board: &Board, color: Player) -> f64 {
    board.connectivity_score(color) as f64
}

impl Agent for NegamaxAgent {
    fn color(&self) -> Player {
        self.color
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        let (best_move, value) = self.search_root(board, self.color)?;
        debug!(
            player = %self.color,
            cell = best_move,
            value,
            depth = self.max_depth,
            nodes = self.nodes,
            "negamax picked a move"
        );
        Ok(best_move)
    }
}
