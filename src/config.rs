//! Game and agent configuration.
//!
//! The command line selects an [`AgentKind`] per colour plus the numeric
//! knobs for every kind; [`AgentConfig::from_kind`] keeps only the knob that
//! applies to the chosen kind and [`GameConfig::validate`] rejects values the
//! board or the searches cannot work with.

use crate::error::GameError;
use crate::geometry::MIN_BASE_SIZE;
use clap::ValueEnum;
use std::fmt;

/// Default number of cells along one side of the board
pub const DEFAULT_BASE_SIZE: usize = 5;
/// Default negamax search depth
pub const DEFAULT_DEPTH: u32 = 4;
/// Default trials per move for Monte Carlo agents
pub const DEFAULT_TRIALS: u32 = 2000;

/// Agent kinds selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    /// Reads cell ids from standard input
    Human,
    /// Uniformly random legal moves
    Random,
    /// Alpha-beta negamax over the circuit heuristic
    Negamax,
    /// Monte Carlo tree search rebuilt every move
    Mcts,
    /// Persistent UCT engine driven through the external engine protocol
    External,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Human => "human",
            AgentKind::Random => "random",
            AgentKind::Negamax => "negamax",
            AgentKind::Mcts => "mcts",
            AgentKind::External => "external",
        };
        write!(f, "{}", name)
    }
}

/// Fully resolved configuration of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentConfig {
    Human,
    Random,
    Negamax { max_depth: u32 },
    MonteCarlo { max_trials: u32 },
    External { iterations: u32 },
}

impl AgentConfig {
    /// Builds the configuration for `kind`, taking whichever of `depth` and
    /// `trials` that kind uses.
    pub fn from_kind(kind: AgentKind, depth: u32, trials: u32) -> Self {
        match kind {
            AgentKind::Human => AgentConfig::Human,
            AgentKind::Random => AgentConfig::Random,
            AgentKind::Negamax => AgentConfig::Negamax { max_depth: depth },
            AgentKind::Mcts => AgentConfig::MonteCarlo { max_trials: trials },
            AgentKind::External => AgentConfig::External { iterations: trials },
        }
    }

    /// Checks the numeric parameters of this agent.
    pub fn validate(&self) -> Result<(), GameError> {
        match *self {
            AgentConfig::Negamax { max_depth } if max_depth < 1 => Err(GameError::SearchConfig(
                "negamax depth must be at least 1".to_string(),
            )),
            AgentConfig::MonteCarlo { max_trials } if max_trials < 1 => Err(
                GameError::SearchConfig("MCTS needs at least one trial".to_string()),
            ),
            AgentConfig::External { iterations } if iterations < 1 => Err(
                GameError::SearchConfig("the UCT engine needs at least one iteration".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Short label for logs and summaries
    pub fn label(&self) -> String {
        match self {
            AgentConfig::Human => "human".to_string(),
            AgentConfig::Random => "random".to_string(),
            AgentConfig::Negamax { max_depth } => format!("negamax(depth={})", max_depth),
            AgentConfig::MonteCarlo { max_trials } => format!("mcts(trials={})", max_trials),
            AgentConfig::External { iterations } => format!("external(iterations={})", iterations),
        }
    }
}

/// Everything needed to set up one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub base_size: usize,
    pub black: AgentConfig,
    pub white: AgentConfig,
    /// Base seed for the random agents; each colour derives its own from it
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_size: DEFAULT_BASE_SIZE,
            black: AgentConfig::Human,
            white: AgentConfig::MonteCarlo {
                max_trials: DEFAULT_TRIALS,
            },
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.base_size < MIN_BASE_SIZE {
            return Err(GameError::GraphGeneration {
                base_size: self.base_size,
            });
        }
        self.black.validate()?;
        self.white.validate()
    }

    /// Seed for the agent playing `index` (0 black, 1 white), if seeded.
    pub fn seed_for(&self, index: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(index as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.base_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_kind_picks_relevant_knob() {
        assert_eq!(
            AgentConfig::from_kind(AgentKind::Negamax, 3, 500),
            AgentConfig::Negamax { max_depth: 3 }
        );
        assert_eq!(
            AgentConfig::from_kind(AgentKind::Mcts, 3, 500),
            AgentConfig::MonteCarlo { max_trials: 500 }
        );
        assert_eq!(
            AgentConfig::from_kind(AgentKind::External, 3, 500),
            AgentConfig::External { iterations: 500 }
        );
        assert_eq!(AgentConfig::from_kind(AgentKind::Random, 3, 500), AgentConfig::Random);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = GameConfig {
            base_size: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameError::GraphGeneration { base_size: 1 })
        ));

        config.base_size = 4;
        config.black = AgentConfig::Negamax { max_depth: 0 };
        assert!(matches!(config.validate(), Err(GameError::SearchConfig(_))));

        config.black = AgentConfig::Random;
        config.white = AgentConfig::MonteCarlo { max_trials: 0 };
        assert!(matches!(config.validate(), Err(GameError::SearchConfig(_))));
    }

    #[test]
    fn test_seed_per_colour() {
        let config = GameConfig {
            seed: Some(10),
            ..GameConfig::default()
        };
        assert_eq!(config.seed_for(0), Some(10));
        assert_eq!(config.seed_for(1), Some(11));
        assert_eq!(GameConfig::default().seed_for(1), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(AgentConfig::Negamax { max_depth: 2 }.label(), "negamax(depth=2)");
        assert_eq!(AgentKind::External.to_string(), "external");
    }
}
