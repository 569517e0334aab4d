//! # Monte Carlo Tree Search Agent
//!
//! A fixed-budget MCTS whose tree is built from scratch for every decision
//! and thrown away afterwards.
//!
//! ## Tree
//! Nodes live in an arena and are addressed by [`NodeId`]. A freshly created
//! child is *pending*: it shares its parent's board through an `Rc` and only
//! remembers the move that leads to it. The move is applied to a private
//! copy of the board when the child is itself expanded, so no node ever
//! mutates a board another node can see.
//!
//! ## Colours
//! Each node stores `to_move`, the player to move in the node's position.
//! A node is credited a win when a rollout through it is won by the other
//! player, i.e. the one whose move created the node. The root's children
//! therefore count wins for the deciding agent.
//!
//! ## Trial
//! 1. Selection: from the root, follow the child with the highest
//!    [`selection_score`] until reaching a node without children.
//! 2. Expansion: materialise the node's board and add one pending child per
//!    legal move, unless the move that created the node won the game.
//! 3. Simulation: play uniformly random moves, alternating colours, until a
//!    group connects all three edges.
//! 4. Backpropagation: update every node from the expanded one up to, but
//!    not including, the root; then count the trial on the root.

use super::{make_rng, Agent};
use crate::board::{Board, Player};
use crate::error::GameError;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::rc::Rc;
use tracing::{debug, trace};

/// Score given to a child that has never been visited
const UNVISITED_SCORE: f64 = 0.5;

/// Index into the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Board held by a node
#[derive(Debug, Clone)]
pub enum NodeState {
    /// Not yet expanded: the parent's board plus the move still to apply
    Pending { base: Rc<Board>, pending_move: usize },
    /// Expanded: a board private to this node (and read by its children)
    Expanded { board: Rc<Board>, last_move: Option<usize> },
}

/// A node of the search tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub parent: Option<NodeId>,
    /// Player to move in this node's position
    pub to_move: Player,
    pub state: NodeState,
    pub children: Vec<NodeId>,
    pub wins: u32,
    pub trials: u32,
}

impl TreeNode {
    /// Move that leads from the parent to this node
    pub fn action(&self) -> Option<usize> {
        match &self.state {
            NodeState::Pending { pending_move, .. } => Some(*pending_move),
            NodeState::Expanded { last_move, .. } => *last_move,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.state, NodeState::Expanded { .. })
    }

    /// Fraction of trials through this node won by the player who moved into it
    pub fn win_ratio(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.wins as f64 / self.trials as f64
        }
    }
}

/// Selection score of a child with the given statistics.
///
/// `(wins / trials) * sqrt(4 * ln(parent_trials) / trials)` for a visited
/// child, a fixed `0.5` for an unvisited one.
pub fn selection_score(wins: u32, trials: u32, parent_trials: u32) -> f64 {
    if trials == 0 {
        return UNVISITED_SCORE;
    }
    let trials = trials as f64;
    let exploration = (4.0 * (parent_trials as f64).ln() / trials).sqrt();
    (wins as f64 / trials) * exploration
}

/// Arena-allocated search tree for one decision
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    /// Tree rooted at a copy of `board`, with `to_move` to play.
    pub fn new(board: &Board, to_move: Player) -> Self {
        let root = TreeNode {
            parent: None,
            to_move,
            state: NodeState::Expanded {
                board: Rc::new(board.clone()),
                last_move: None,
            },
            children: Vec::new(),
            wins: 0,
            trials: 0,
        };
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Applies the node's pending move on a private board copy and, unless
    /// that move ended the game, adds one pending child per legal move.
    ///
    /// Expanding an already expanded node only adds children if it has none
    /// and its position is still open.
    pub fn expand(&mut self, id: NodeId) -> Result<(), GameError> {
        let to_move = self.get(id).to_move;

        if let NodeState::Pending { base, pending_move } = &self.get(id).state {
            let mut board = Board::clone(base);
            let mv = *pending_move;
            board.apply_move(mv, to_move.opponent())?;
            self.get_mut(id).state = NodeState::Expanded {
                board: Rc::new(board),
                last_move: Some(mv),
            };
        }

        let node = self.get(id);
        if !node.children.is_empty() {
            return Ok(());
        }
        let NodeState::Expanded { board, .. } = &node.state else {
            return Ok(());
        };
        if board.winner().is_some() {
            return Ok(());
        }

        let board = Rc::clone(board);
        for &mv in board.legal_moves() {
            let child = TreeNode {
                parent: Some(id),
                to_move: to_move.opponent(),
                state: NodeState::Pending {
                    base: Rc::clone(&board),
                    pending_move: mv,
                },
                children: Vec::new(),
                wins: 0,
                trials: 0,
            };
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(child);
            self.get_mut(id).children.push(child_id);
        }
        Ok(())
    }

    /// Child of `id` with the highest selection score.
    ///
    /// The running best starts at 0 with the first child, and only a strictly
    /// greater score replaces it.
    pub fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id);
        let mut best = *node.children.first()?;
        let mut best_score = 0.0;
        for &child_id in &node.children {
            let child = self.get(child_id);
            let score = selection_score(child.wins, child.trials, node.trials);
            if score > best_score {
                best_score = score;
                best = child_id;
            }
        }
        Some(best)
    }

    /// Descends from the root to a node without children.
    pub fn select(&self) -> NodeId {
        let mut current = self.root();
        while let Some(child) = self.select_child(current) {
            current = child;
        }
        current
    }

    /// Credits one trial to every node from `id` up to the root's children,
    /// then counts it on the root.
    pub fn backpropagate(&mut self, id: NodeId, winner: Option<Player>) {
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            let node = self.get_mut(current);
            node.trials += 1;
            if winner == Some(node.to_move.opponent()) {
                node.wins += 1;
            }
            current = parent;
        }
        self.get_mut(current).trials += 1;
    }

    /// Root child with the best win ratio; ties keep the earliest child.
    pub fn best_move(&self) -> Option<usize> {
        let root = self.get(self.root());
        let first = self.get(*root.children.first()?).action()?;

        let mut best_move = first;
        let mut best_ratio = 0.0;
        for &child_id in &root.children {
            let child = self.get(child_id);
            let ratio = child.win_ratio();
            if ratio > best_ratio {
                if let Some(mv) = child.action() {
                    best_ratio = ratio;
                    best_move = mv;
                }
            }
        }
        Some(best_move)
    }
}

/// Monte Carlo tree search with a fixed number of trials per move.
#[derive(Debug, Clone)]
pub struct MctsAgent {
    color: Player,
    max_trials: u32,
    rng: Xoshiro256PlusPlus,
}

impl MctsAgent {
    /// # Errors
    /// `GameError::SearchConfig` when `max_trials` is 0.
    pub fn new(color: Player, max_trials: u32, seed: Option<u64>) -> Result<Self, GameError> {
        if max_trials < 1 {
            return Err(GameError::SearchConfig(
                "MCTS needs at least one trial".to_string(),
            ));
        }
        Ok(Self {
            color,
            max_trials,
            rng: make_rng(seed),
        })
    }

    pub fn max_trials(&self) -> u32 {
        self.max_trials
    }

    /// Runs the full search from `board` and returns the finished tree.
    pub fn build_tree(&mut self, board: &Board) -> Result<SearchTree, GameError> {
        if board.winner().is_some() {
            return Err(GameError::GameOver);
        }
        let mut tree = SearchTree::new(board, self.color);
        tree.expand(tree.root())?;
        if tree.get(tree.root()).children.is_empty() {
            return Err(GameError::GameOver);
        }

        for trial in 0..self.max_trials {
            let leaf = tree.select();
            tree.expand(leaf)?;
            let winner = self.simulate(tree.get(leaf))?;
            tree.backpropagate(leaf, winner);
            trace!(trial, leaf = leaf.0, winner = ?winner, "MCTS trial complete");
        }
        Ok(tree)
    }

    /// Random playout from an expanded node's position.
    fn simulate(&mut self, node: &TreeNode) -> Result<Option<Player>, GameError> {
        let NodeState::Expanded { board, .. } = &node.state else {
            return Ok(None);
        };
        if let Some(winner) = board.winner() {
            return Ok(Some(winner));
        }

        let mut state = Board::clone(board);
        let mut color = node.to_move;
        loop {
            let moves = state.legal_moves();
            if moves.is_empty() {
                return Ok(None);
            }
            let pick = moves[self.rng.random_range(0..moves.len())];
            state.apply_move(pick, color)?;
            if let Some(winner) = state.find_winner(pick) {
                return Ok(Some(winner));
            }
            color = color.opponent();
        }
    }
}

impl Agent for MctsAgent {
    fn color(&self) -> Player {
        self.color
    }

    fn select_move(&mut self, board: &Board) -> Result<usize, GameError> {
        let tree = self.build_tree(board)?;
        let best = tree.best_move().ok_or(GameError::GameOver)?;
        debug!(
            player = %self.color,
            cell = best,
            trials = tree.get(tree.root()).trials,
            nodes = tree.len(),
            "MCTS picked a move"
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_trials_is_rejected() {
        assert!(matches!(
            MctsAgent::new(Player::Black, 0, None),
            Err(GameError::SearchConfig(_))
        ));
    }

    #[test]
    fn test_selection_score() {
        assert_eq!(selection_score(0, 0, 10), 0.5);
        assert_eq!(selection_score(3, 4, 1), 0.0);
        let expected = 0.5 * (4.0 * 8f64.ln() / 4.0).sqrt();
        assert!((selection_score(2, 4, 8) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_root_expansion_creates_pending_children() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(4, Player::Black).unwrap();
        let mut tree = SearchTree::new(&board, Player::White);
        tree.expand(tree.root()).unwrap();

        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 8);
        for &child_id in &root.children {
            let child = tree.get(child_id);
            assert!(!child.is_expanded());
            assert_eq!(child.to_move, Player::Black);
        }
        assert_eq!(tree.get(root.children[0]).action(), Some(0));
    }

    #[test]
    fn test_expansion_copies_board_lazily() {
        let board = Board::new(3).unwrap();
        let mut tree = SearchTree::new(&board, Player::Black);
        tree.expand(tree.root()).unwrap();
        let first = tree.get(tree.root()).children[0];
        let second = tree.get(tree.root()).children[1];

        tree.expand(first).unwrap();
        let NodeState::Expanded { board: expanded, .. } = &tree.get(first).state else {
            panic!("expected an expanded node");
        };
        assert_eq!(expanded.owner(0), Some(Player::Black));
        assert_eq!(tree.get(first).children.len(), 8);

        let NodeState::Pending { base, .. } = &tree.get(second).state else {
            panic!("sibling should still be pending");
        };
        assert_eq!(base.owner(0), None);
    }

    #[test]
    fn test_winning_node_has_no_children() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        board.apply_move(2, Player::White).unwrap();
        let mut tree = SearchTree::new(&board, Player::Black);
        tree.expand(tree.root()).unwrap();
        let only = tree.get(tree.root()).children[0];
        tree.expand(only).unwrap();
        assert!(tree.get(only).children.is_empty());
    }

    #[test]
    fn test_backpropagation_credits_the_mover() {
        let board = Board::new(3).unwrap();
        let mut tree = SearchTree::new(&board, Player::Black);
        tree.expand(tree.root()).unwrap();
        let child = tree.get(tree.root()).children[0];
        tree.expand(child).unwrap();
        let grandchild = tree.get(child).children[0];

        tree.backpropagate(grandchild, Some(Player::Black));
        assert_eq!(tree.get(grandchild).trials, 1);
        assert_eq!(tree.get(grandchild).wins, 0);
        assert_eq!(tree.get(child).trials, 1);
        assert_eq!(tree.get(child).wins, 1);
        assert_eq!(tree.get(tree.root()).trials, 1);
        assert_eq!(tree.get(tree.root()).wins, 0);
    }

    #[test]
    fn test_best_move_prefers_ratio_then_order() {
        let board = Board::new(2).unwrap();
        let mut tree = SearchTree::new(&board, Player::Black);
        tree.expand(tree.root()).unwrap();
        let children = tree.get(tree.root()).children.clone();

        // Nothing visited: first child
        assert_eq!(tree.best_move(), Some(0));

        tree.get_mut(children[1]).trials = 2;
        tree.get_mut(children[1]).wins = 1;
        tree.get_mut(children[2]).trials = 4;
        tree.get_mut(children[2]).wins = 2;
        assert_eq!(tree.best_move(), Some(1));
    }

    #[test]
    fn test_single_trial_returns_first_child() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        for seed in 0..5 {
            let mut agent = MctsAgent::new(Player::White, 1, Some(seed)).unwrap();
            assert_eq!(agent.select_move(&board).unwrap(), 1);
        }
    }

    #[test]
    fn test_winning_child_wins_every_trial() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(3, Player::Black).unwrap();
        board.apply_move(0, Player::White).unwrap();
        board.apply_move(4, Player::Black).unwrap();
        board.apply_move(1, Player::White).unwrap();

        let mut agent = MctsAgent::new(Player::Black, 300, Some(11)).unwrap();
        let tree = agent.build_tree(&board).unwrap();
        let root = tree.get(tree.root());
        assert_eq!(root.trials, 300);

        let winning = root
            .children
            .iter()
            .map(|&id| tree.get(id))
            .find(|child| child.action() == Some(5))
            .unwrap();
        assert!(winning.trials > 0);
        assert_eq!(winning.wins, winning.trials);
    }

    #[test]
    fn test_rollouts_start_with_the_player_to_move() {
        // Whatever white plays, black fills the last cell and completes the triangle
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        let mut agent = MctsAgent::new(Player::White, 20, Some(4)).unwrap();
        let tree = agent.build_tree(&board).unwrap();

        let root = tree.get(tree.root());
        let mut trials = 0;
        for &id in &root.children {
            let child = tree.get(id);
            assert_eq!(child.wins, 0, "child {:?} won a rollout", child.action());
            trials += child.trials;
        }
        assert_eq!(trials, 20);
    }

    #[test]
    fn test_search_is_deterministic_with_seed() {
        let mut board = Board::new(4).unwrap();
        board.apply_move(4, Player::Black).unwrap();
        let mut a = MctsAgent::new(Player::White, 200, Some(3)).unwrap();
        let mut b = MctsAgent::new(Player::White, 200, Some(3)).unwrap();
        assert_eq!(a.select_move(&board).unwrap(), b.select_move(&board).unwrap());
    }

    #[test]
    fn test_game_over_on_finished_board() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        board.apply_move(1, Player::Black).unwrap();
        let mut agent = MctsAgent::new(Player::White, 10, Some(1)).unwrap();
        assert!(matches!(agent.select_move(&board), Err(GameError::GameOver)));
    }
}
