//! # UCT Engine
//!
//! A persistent Monte Carlo searcher over any [`GameState`]. Unlike
//! [`MctsAgent`](crate::agents::MctsAgent), it keeps its own copy of the game
//! and its search tree across turns: after every move the root advances to
//! the matching subtree, so earlier simulations keep paying off.
//!
//! The engine speaks the [`SearchEngine`] protocol and is plugged into a game
//! through [`ExternalAgent`](crate::agents::ExternalAgent).

use crate::agents::{make_rng, SearchEngine};
use crate::board::{Board, Player};
use crate::error::GameError;
use crate::geometry::Geometry;
use crate::GameState;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Exploration constant used when none is given
pub const DEFAULT_EXPLORATION: f64 = 1.414;

/// A node in the search tree.
#[derive(Debug, Clone)]
struct UctNode<M: Ord> {
    /// Sum of rewards from the point of view of the player who moved into this node
    wins: f64,
    visits: u32,
    /// Ordered so that ties are broken the same way on every run
    children: BTreeMap<M, UctNode<M>>,
}

impl<M: Ord> UctNode<M> {
    fn new() -> Self {
        UctNode {
            wins: 0.0,
            visits: 0,
            children: BTreeMap::new(),
        }
    }

    /// Calculates the UCB1 (Upper Confidence Bound 1) score for this node.
    ///
    /// # Arguments
    /// * `parent_visits` - The number of visits to the parent node.
    /// * `exploration` - A constant to tune the level of exploration.
    fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            f64::INFINITY
        } else {
            let visits = self.visits as f64;
            self.wins / visits + exploration * ((parent_visits as f64).ln() / visits).sqrt()
        }
    }
}

/// Reward credited to a node whose incoming move was made by `mover`.
fn reward(winner: Option<Player>, mover: Player) -> f64 {
    match winner {
        Some(w) if w == mover => 1.0,
        Some(_) => 0.0,
        None => 0.5,
    }
}

/// Stateful UCT search engine.
pub struct UctEngine<S: GameState> {
    /// The engine's own view of the game
    state: S,
    root: UctNode<S::Move>,
    iterations: u32,
    exploration: f64,
    rng: Xoshiro256PlusPlus,
}

impl<S: GameState> UctEngine<S> {
    /// Creates an engine that starts from `state`.
    ///
    /// # Arguments
    /// * `iterations` - Simulations run for every move the engine makes.
    /// * `exploration` - The UCB1 exploration constant.
    /// * `seed` - Seed for the playout generator, random when `None`.
    ///
    /// # Errors
    /// `GameError::SearchConfig` when `iterations` is 0.
    pub fn new(state: S, iterations: u32, exploration: f64, seed: Option<u64>) -> Result<Self, GameError> {
        if iterations == 0 {
            return Err(GameError::SearchConfig(
                "the UCT engine needs at least one iteration".to_string(),
            ));
        }
        Ok(UctEngine {
            state,
            root: UctNode::new(),
            iterations,
            exploration,
            rng: make_rng(seed),
        })
    }

    /// The engine's current view of the game
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Visits accumulated at the current root
    pub fn root_visits(&self) -> u32 {
        self.root.visits
    }

    /// Applies `mv` to the engine's state and keeps the matching subtree.
    pub fn apply(&mut self, mv: &S::Move) -> Result<(), GameError> {
        self.state.make_move(mv)?;
        self.advance_root(mv);
        Ok(())
    }

    /// Advances the root of the tree to the node corresponding to the given
    /// move, or to a fresh node if that move was never explored.
    fn advance_root(&mut self, mv: &S::Move) {
        let mut children = std::mem::take(&mut self.root.children);
        self.root = children.remove(mv).unwrap_or_else(UctNode::new);
    }

    /// Returns statistics for the children of the root node as a map from a
    /// move to its `(wins, visits)`.
    pub fn root_children_stats(&self) -> BTreeMap<S::Move, (f64, u32)> {
        self.root
            .children
            .iter()
            .map(|(mv, node)| (mv.clone(), (node.wins, node.visits)))
            .collect()
    }

    /// Runs the configured number of simulations and returns the most
    /// visited move, without playing it.
    ///
    /// # Errors
    /// `GameError::GameOver` when the engine's state is terminal.
    pub fn search(&mut self) -> Result<S::Move, GameError> {
        if self.state.is_terminal() {
            return Err(GameError::GameOver);
        }

        for _ in 0..self.iterations {
            let mut state = self.state.clone();
            playout(&mut self.root, &mut state, self.exploration, &mut self.rng)?;
        }

        // Most visited child; ties keep the smallest move
        let mut best: Option<(&S::Move, u32)> = None;
        for (mv, node) in &self.root.children {
            if best.map_or(true, |(_, visits)| node.visits > visits) {
                best = Some((mv, node.visits));
            }
        }
        best.map(|(mv, _)| mv.clone()).ok_or(GameError::GameOver)
    }
}

/// One simulation from `node`: descend by UCB1, expand the first leaf,
/// finish the game randomly and update statistics on the way back.
fn playout<S: GameState>(
    node: &mut UctNode<S::Move>,
    state: &mut S,
    exploration: f64,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Option<Player>, GameError> {
    let mover = state.get_current_player().opponent();

    let winner = if state.is_terminal() {
        state.get_winner()
    } else if node.children.is_empty() {
        for mv in state.get_possible_moves() {
            node.children.insert(mv, UctNode::new());
        }
        rollout(state, rng)?
    } else {
        let parent_visits = node.visits;
        let mut best: Option<(&S::Move, &mut UctNode<S::Move>)> = None;
        let mut best_score = f64::NEG_INFINITY;
        for (mv, child) in node.children.iter_mut() {
            let score = child.ucb1(parent_visits, exploration);
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some((mv, child));
            }
        }
        match best {
            Some((mv, child)) => {
                state.make_move(mv)?;
                playout(child, state, exploration, rng)?
            }
            None => state.get_winner(),
        }
    };

    node.visits += 1;
    node.wins += reward(winner, mover);
    Ok(winner)
}

/// Plays uniformly random moves until the game ends.
fn rollout<S: GameState>(state: &mut S, rng: &mut Xoshiro256PlusPlus) -> Result<Option<Player>, GameError> {
    while !state.is_terminal() {
        let moves = state.get_possible_moves();
        if moves.is_empty() {
            break;
        }
        let mv = &moves[rng.random_range(0..moves.len())];
        state.make_move(mv)?;
    }
    Ok(state.get_winner())
}

impl UctEngine<Board> {
    /// Engine starting from an empty board of `base_size`, with the default
    /// exploration constant.
    pub fn for_board(base_size: usize, iterations: u32, seed: Option<u64>) -> Result<Self, GameError> {
        Self::new(Board::new(base_size)?, iterations, DEFAULT_EXPLORATION, seed)
    }

    /// Like [`UctEngine::for_board`], reusing an existing geometry.
    pub fn for_geometry(
        geometry: Arc<Geometry>,
        iterations: u32,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        Self::new(Board::with_geometry(geometry), iterations, DEFAULT_EXPLORATION, seed)
    }
}

impl<S: GameState<Move = usize>> SearchEngine for UctEngine<S> {
    fn inform_move(&mut self, cell: usize) -> Result<(), GameError> {
        self.apply(&cell)
    }

    fn step(&mut self) -> Result<usize, GameError> {
        let cell = self.search()?;
        let visits = self.root.children.get(&cell).map_or(0, |node| node.visits);
        debug!(cell, visits, root_visits = self.root.visits, "UCT engine chose a move");
        Ok(cell)
    }
}
