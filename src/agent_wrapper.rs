//! # Agent Wrapper
//!
//! A closed enum over every agent the binaries can build from an
//! [`AgentConfig`]. Dispatch is generated by a macro so each variant forwards
//! to its inner agent without dynamic dispatch.

use crate::agents::{Agent, ExternalAgent, HumanAgent, MctsAgent, NegamaxAgent, RandomAgent};
use crate::board::{Board, Player};
use crate::config::AgentConfig;
use crate::engine::UctEngine;
use crate::error::GameError;
use crate::geometry::Geometry;
use std::io::{self, StdinLock, Stdout};
use std::sync::Arc;

/// Any agent selectable from the command line
pub enum AgentWrapper {
    Human(HumanAgent<StdinLock<'static>, Stdout>),
    Random(RandomAgent),
    Negamax(NegamaxAgent),
    MonteCarlo(MctsAgent),
    External(ExternalAgent<UctEngine<Board>>),
}

impl AgentWrapper {
    /// Builds the agent described by `config` to play `color`.
    ///
    /// The external engine starts from an empty board over `geometry`, so it
    /// must be created before the first move of the game.
    ///
    /// # Errors
    /// `GameError::SearchConfig` for a zero depth, trial or iteration count.
    pub fn from_config(
        config: AgentConfig,
        color: Player,
        geometry: &Arc<Geometry>,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let agent = match config {
            AgentConfig::Human => {
                AgentWrapper::Human(HumanAgent::new(color, io::stdin().lock(), io::stdout()))
            }
            AgentConfig::Random => AgentWrapper::Random(RandomAgent::new(color, seed)),
            AgentConfig::Negamax { max_depth } => {
                AgentWrapper::Negamax(NegamaxAgent::new(color, max_depth)?)
            }
            AgentConfig::MonteCarlo { max_trials } => {
                AgentWrapper::MonteCarlo(MctsAgent::new(color, max_trials, seed)?)
            }
            AgentConfig::External { iterations } => {
                let engine = UctEngine::for_geometry(Arc::clone(geometry), iterations, seed)?;
                AgentWrapper::External(ExternalAgent::new(color, engine))
            }
        };
        Ok(agent)
    }

    /// Name of the wrapped agent kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            AgentWrapper::Human(_) => "human",
            AgentWrapper::Random(_) => "random",
            AgentWrapper::Negamax(_) => "negamax",
            AgentWrapper::MonteCarlo(_) => "mcts",
            AgentWrapper::External(_) => "external",
        }
    }
}

macro_rules! impl_agent_dispatch {
    ($($variant:ident),*) => {
        impl Agent for AgentWrapper {
            fn color(&self) -> Player {
                match self {
                    $(AgentWrapper::$variant(a) => a.color(),)*
                }
            }

            fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
                match self {
                    $(AgentWrapper::$variant(a) => a.select_move(board),)*
                }
            }

            fn observe_opponent_move(&mut self, cell: usize) -> Result<(), GameError> {
                match self {
                    $(AgentWrapper::$variant(a) => a.observe_opponent_move(cell),)*
                }
            }

            fn observe_history(&mut self, cells: &[usize]) -> Result<(), GameError> {
                match self {
                    $(AgentWrapper::$variant(a) => a.observe_history(cells),)*
                }
            }
        }
    };
}

impl_agent_dispatch!(Human, Random, Negamax, MonteCarlo, External);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::generate_board;

    fn geometry(base_size: usize) -> Arc<Geometry> {
        Arc::new(generate_board(base_size).unwrap())
    }

    #[test]
    fn test_builds_each_search_agent() {
        let geometry = geometry(3);
        let configs = [
            (AgentConfig::Random, "random"),
            (AgentConfig::Negamax { max_depth: 2 }, "negamax"),
            (AgentConfig::MonteCarlo { max_trials: 20 }, "mcts"),
            (AgentConfig::External { iterations: 20 }, "external"),
        ];
        for (config, name) in configs {
            let agent = AgentWrapper::from_config(config, Player::White, &geometry, Some(1)).unwrap();
            assert_eq!(agent.kind_name(), name);
            assert_eq!(agent.color(), Player::White);
        }
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let geometry = geometry(3);
        let result = AgentWrapper::from_config(
            AgentConfig::External { iterations: 0 },
            Player::Black,
            &geometry,
            None,
        );
        assert!(matches!(result, Err(GameError::SearchConfig(_))));
    }

    #[test]
    fn test_dispatches_to_inner_agent() {
        let geometry = geometry(3);
        let board = Board::with_geometry(Arc::clone(&geometry));
        let mut agent =
            AgentWrapper::from_config(AgentConfig::External { iterations: 30 }, Player::Black, &geometry, Some(2))
                .unwrap();
        let cell = agent.select_move(&board).unwrap();
        assert!(board.is_legal(cell));
    }
}
