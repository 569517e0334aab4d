//! # Game Controller
//!
//! The `GameController` owns the authoritative [`Board`] and is the only
//! place where moves of a real game are applied. Agents receive the board by
//! shared reference and search on their own clones; renderers receive
//! [`BoardSnapshot`]s.
//!
//! ## Turn protocol
//! For every turn the controller:
//! 1. tells the agent to move about the opponent's most recent move, if any,
//!    after handing it every earlier move on its first turn,
//! 2. asks it for a cell,
//! 3. validates and applies the cell, recording it in the move history,
//! 4. stops the game as soon as the move completes a winning group.
//!
//! Any error from an agent or from validation halts the game loop and is
//! returned to the caller unchanged.

use crate::agents::Agent;
use crate::board::{Board, BoardSnapshot, Player};
use crate::error::{GameError, MoveValidationError};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The played cell
        cell: usize,
        /// Player who made the move
        player: Player,
        /// Whether the move ended the game
        game_over: bool,
        winner: Option<Player>,
    },
    /// Move was rejected as invalid
    Invalid {
        /// Reason the move was rejected
        reason: MoveValidationError,
    },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    pub player: Player,
    pub cell: usize,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: Player, cell: usize, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            cell,
            move_number,
        }
    }
}

/// Current game status. Y cannot end in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Player),
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The central game controller that owns the authoritative board.
#[derive(Debug, Clone)]
pub struct GameController {
    board: Board,
    move_history: Vec<MoveHistoryEntry>,
    status: GameStatus,
    /// Whether each colour's agent has been handed the earlier moves
    briefed: [bool; 2],
}

impl GameController {
    /// Create a controller over an empty board of `base_size`.
    pub fn new(base_size: usize) -> Result<Self, GameError> {
        Ok(Self::with_board(Board::new(base_size)?))
    }

    /// Create a controller that continues from `board`.
    ///
    /// The move history is rebuilt from the board's per-colour histories, so
    /// agents joining the game are told about every stone already placed.
    pub fn with_board(board: Board) -> Self {
        let status = match board.winner() {
            Some(winner) => GameStatus::Win(winner),
            None => GameStatus::InProgress,
        };
        let move_history = board
            .move_order()
            .into_iter()
            .enumerate()
            .map(|(i, (player, cell))| MoveHistoryEntry::new(player, cell, i + 1))
            .collect();
        Self {
            board,
            move_history,
            status,
            briefed: [false; 2],
        }
    }

    /// Validate a move for the player to move without applying it.
    pub fn validate_move(&self, cell: usize) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        self.board.validate_move(cell)
    }

    /// Validates `cell` and plays it for the player to move.
    pub fn try_make_move(&mut self, cell: usize) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        if let Err(reason) = self.validate_move(cell) {
            return MoveResult::Invalid { reason };
        }

        let player = self.board.to_move();
        if let Err(err) = self.board.apply_move(cell, player) {
            // Validation above covers every rejection apply_move can make
            return match err {
                GameError::InvalidMove(reason) => MoveResult::Invalid { reason },
                _ => MoveResult::GameOver,
            };
        }

        let move_number = self.move_history.len() + 1;
        self.move_history
            .push(MoveHistoryEntry::new(player, cell, move_number));

        let winner = self.board.find_winner(cell);
        if let Some(winner) = winner {
            self.status = GameStatus::Win(winner);
        }
        info!(move_number, player = %player, cell, "move applied");

        MoveResult::Success {
            cell,
            player,
            game_over: winner.is_some(),
            winner,
        }
    }

    /// Plays one turn with `agent`, which must be the player to move.
    ///
    /// # Errors
    /// `GameError::GameOver` once the game has a winner, whatever the agent
    /// reports, or `GameError::InvalidMove` when the agent's cell is rejected.
    pub fn play_turn(&mut self, agent: &mut dyn Agent) -> Result<MoveResult, GameError> {
        if self.status.is_game_over() {
            return Err(GameError::GameOver);
        }
        let to_move = self.board.to_move();
        if agent.color() != to_move {
            return Err(GameError::SearchConfig(format!(
                "{} agent asked to move while {} is to play",
                agent.color(),
                to_move
            )));
        }

        let opponent_moved_last = self
            .move_history
            .last()
            .is_some_and(|last| last.player != to_move);
        if !self.briefed[to_move.index()] {
            let earlier = if opponent_moved_last {
                &self.move_history[..self.move_history.len() - 1]
            } else {
                &self.move_history[..]
            };
            let cells: Vec<usize> = earlier.iter().map(|entry| entry.cell).collect();
            agent.observe_history(&cells)?;
            self.briefed[to_move.index()] = true;
        }
        if opponent_moved_last {
            if let Some(last) = self.move_history.last() {
                agent.observe_opponent_move(last.cell)?;
            }
        }

        let cell = agent.select_move(&self.board)?;
        debug!(player = %to_move, cell, "agent answered");

        match self.try_make_move(cell) {
            MoveResult::Invalid { reason } => Err(GameError::InvalidMove(reason)),
            MoveResult::GameOver => Err(GameError::GameOver),
            result => Ok(result),
        }
    }

    /// Alternates between the two agents until one of them wins.
    ///
    /// # Errors
    /// Stops at the first error from either agent or from move validation.
    pub fn run(&mut self, black: &mut dyn Agent, white: &mut dyn Agent) -> Result<Player, GameError> {
        self.run_with(black, white, |_, _| {})
    }

    /// Like [`GameController::run`], calling `on_move` after every applied move.
    pub fn run_with<F>(
        &mut self,
        black: &mut dyn Agent,
        white: &mut dyn Agent,
        mut on_move: F,
    ) -> Result<Player, GameError>
    where
        F: FnMut(&GameController, &MoveResult),
    {
        info!(
            base_size = self.board.base_size(),
            cells = self.board.cell_count(),
            "game started"
        );
        loop {
            if let GameStatus::Win(winner) = self.status {
                info!(winner = %winner, moves = self.move_history.len(), "game over");
                return Ok(winner);
            }
            if self.board.legal_moves().is_empty() {
                return Err(GameError::GameOver);
            }
            let agent: &mut dyn Agent = match self.board.to_move() {
                Player::Black => &mut *black,
                Player::White => &mut *white,
            };
            let result = self.play_turn(agent)?;
            on_move(self, &result);
        }
    }

    /// Read-only view of the authoritative board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Snapshot for rendering collaborators
    pub fn get_render_state(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn get_current_player(&self) -> Player {
        self.board.to_move()
    }

    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn get_winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            GameStatus::InProgress => None,
        }
    }

    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Reset to an empty board of the same size.
    pub fn reset(&mut self) {
        self.board = Board::with_geometry(Arc::clone(self.board.geometry()));
        self.move_history.clear();
        self.status = GameStatus::InProgress;
        self.briefed = [false; 2];
    }

    /// Move history as plain text, one move per line, followed by the result.
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.\n");
        }

        let mut output = format!("=== Y (base size {}) ===\n", self.board.base_size());
        for entry in &self.move_history {
            output.push_str(&format!("{}. {} - {}\n", entry.move_number, entry.player, entry.cell));
        }
        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", winner));
            }
            GameStatus::InProgress => {
                output.push_str(&format!("\n(Game in progress - {} to move)\n", self.board.to_move()));
            }
        }
        output
    }
}
