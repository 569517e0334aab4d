//! Human player reading cell ids from a text stream.

use super::Agent;
use crate::board::{Board, Player};
use crate::error::GameError;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Prompts on `output` and reads one cell id per line from `input`.
///
/// Unparseable or illegal input is reported and asked again; the agent only
/// gives up when the input stream ends.
pub struct HumanAgent<R, W> {
    color: Player,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(color: Player, input: R, output: W) -> Self {
        Self {
            color,
            input,
            output,
        }
    }

    /// Consumes the agent and returns its output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    fn color(&self) -> Player {
        self.color
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        if board.is_terminal() {
            return Err(GameError::GameOver);
        }

        let mut line = String::new();
        loop {
            write!(
                self.output,
                "{} to move, enter a cell (0-{}): ",
                self.color,
                board.cell_count() - 1
            )?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(GameError::InputClosed);
            }

            let cell = match line.trim().parse::<usize>() {
                Ok(cell) => cell,
                Err(_) => {
                    writeln!(self.output, "'{}' is not a cell number", line.trim())?;
                    continue;
                }
            };
            if let Err(err) = board.validate_move(cell) {
                warn!(player = %self.color, cell, "rejected human move: {}", err);
                writeln!(self.output, "{}", err)?;
                continue;
            }

            debug!(player = %self.color, cell, "human entered a move");
            return Ok(cell);
        }
    }
}
