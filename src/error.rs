//! Error types shared by the board, the agents and the controller.

use thiserror::Error;

/// Reasons a move is rejected before it touches the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveValidationError {
    /// The cell id does not exist on this board
    #[error("cell {cell} is out of range for a board of {cells} cells")]
    OutOfRange { cell: usize, cells: usize },
    /// The cell already holds a stone
    #[error("cell {0} is already occupied")]
    Occupied(usize),
    /// A winner has been found, the board accepts no further moves
    #[error("the game is already over")]
    GameAlreadyOver,
}

/// Errors surfaced by every fallible operation in the crate.
///
/// None of these are retried internally; they propagate to whoever asked for
/// the failing operation.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("cannot generate a board of base size {base_size}, the minimum is 2")]
    GraphGeneration { base_size: usize },

    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveValidationError),

    #[error("no move can be made, the game is over")]
    GameOver,

    #[error("invalid search configuration: {0}")]
    SearchConfig(String),

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
