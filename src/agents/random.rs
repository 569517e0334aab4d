//! Uniform random move selection.

use super::{make_rng, Agent};
use crate::board::{Board, Player};
use crate::error::GameError;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

/// Picks uniformly among the legal moves.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    color: Player,
    rng: Xoshiro256PlusPlus,
}

impl RandomAgent {
    pub fn new(color: Player, seed: Option<u64>) -> Self {
        Self {
            color,
            rng: make_rng(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn color(&self) -> Player {
        self.color
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        let moves = board.legal_moves();
        if moves.is_empty() || board.winner().is_some() {
            return Err(GameError::GameOver);
        }
        let pick = moves[self.rng.random_range(0..moves.len())];
        debug!(player = %self.color, cell = pick, "random agent picked a move");
        Ok(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_a_legal_move() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        let mut agent = RandomAgent::new(Player::White, Some(7));
        for _ in 0..20 {
            let mv = agent.select_move(&board).unwrap();
            assert!(board.is_legal(mv));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let board = Board::new(5).unwrap();
        let mut a = RandomAgent::new(Player::Black, Some(42));
        let mut b = RandomAgent::new(Player::Black, Some(42));
        for _ in 0..10 {
            assert_eq!(a.select_move(&board).unwrap(), b.select_move(&board).unwrap());
        }
    }

    #[test]
    fn test_game_over_when_won() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        board.apply_move(1, Player::Black).unwrap();
        let mut agent = RandomAgent::new(Player::White, Some(1));
        assert!(matches!(agent.select_move(&board), Err(GameError::GameOver)));
    }
}
