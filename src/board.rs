//! # Board State
//!
//! Cell ownership, the legal-move set, per-player move histories and the
//! incremental connectivity structure used to detect a win.
//!
//! ## Connectivity
//! Same-colour groups are tracked with an index-based union-find embedded in
//! the cell arrays. Every played stone becomes the root of its group: when a
//! stone joins existing groups, their roots are repointed at the new stone and
//! their accumulated edge masks are OR-ed into it. A group wins the moment its
//! root's mask reaches [`ALL_EDGES`], which can only happen right after a move
//! of that group's colour.
//!
//! ## Circuit heuristic
//! Independently of win detection, each cell keeps per colour a "circuit" set:
//! the cells it would touch if that colour's stones were contracted into their
//! neighbours. Negamax sums these set sizes as its evaluation. The sets only
//! rank positions and never decide a game.
//!
//! ## Cloning
//! Search agents branch by cloning a [`Board`]. The topology lives behind an
//! `Arc<Geometry>` and is shared, so a clone copies only per-game state.

use crate::error::{GameError, MoveValidationError};
use crate::geometry::{generate_board, Geometry, ALL_EDGES};
use crate::GameState;
use colored::Colorize;
use std::fmt;
use std::sync::Arc;

/// One of the two players. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// The other player
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Slot of this player in per-colour arrays
    pub fn index(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// Read-only view of one cell, as handed to renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub id: usize,
    /// Ring (depth level) of the cell, the central triangle being ring 2
    pub ring: usize,
    /// Offset of the cell within its ring
    pub position: usize,
    pub owner: Option<Player>,
    pub edge_mask: u8,
}

/// Immutable snapshot of a board for visualization collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub base_size: usize,
    pub cells: Vec<CellView>,
}

/// The complete, mutable state of one game of Y
#[derive(Debug, Clone)]
pub struct Board {
    /// Shared adjacency and static edge masks
    geometry: Arc<Geometry>,
    /// Owner of every cell, `None` when empty
    owners: Vec<Option<Player>>,
    /// Union-find parent links; a root points to itself
    parents: Vec<usize>,
    /// Accumulated edge mask, authoritative only at group roots
    edges: Vec<u8>,
    /// Circuit sets per cell, indexed by `Player::index`, kept sorted
    circuits: Vec<[Vec<usize>; 2]>,
    /// Unplayed cell ids in ascending order
    legal_moves: Vec<usize>,
    /// Played cells per player, in move order
    history: [Vec<usize>; 2],
    /// Set once a move completes a winning group
    winner: Option<Player>,
}

impl Board {
    /// Creates an empty board of the given base size.
    ///
    /// # Errors
    /// Fails with `GameError::GraphGeneration` when `base_size < 2`.
    pub fn new(base_size: usize) -> Result<Self, GameError> {
        Ok(Self::with_geometry(Arc::new(generate_board(base_size)?)))
    }

    /// Creates an empty board over an already generated geometry.
    pub fn with_geometry(geometry: Arc<Geometry>) -> Self {
        let cells = geometry.len();
        let circuits = (0..cells)
            .map(|cell| {
                let neighbors = geometry.neighbors(cell).to_vec();
                [neighbors.clone(), neighbors]
            })
            .collect();
        let edges = (0..cells).map(|cell| geometry.edge_mask(cell)).collect();

        Self {
            owners: vec![None; cells],
            parents: (0..cells).collect(),
            edges,
            circuits,
            legal_moves: (0..cells).collect(),
            history: [Vec::new(), Vec::new()],
            winner: None,
            geometry,
        }
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn base_size(&self) -> usize {
        self.geometry.base_size()
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.owners.len()
    }

    /// Owner of `cell`; `None` for empty and out-of-range cells
    pub fn owner(&self, cell: usize) -> Option<Player> {
        self.owners.get(cell).copied().flatten()
    }

    /// Unplayed cell ids in ascending order
    pub fn legal_moves(&self) -> &[usize] {
        &self.legal_moves
    }

    pub fn is_legal(&self, cell: usize) -> bool {
        self.winner.is_none() && self.legal_moves.binary_search(&cell).is_ok()
    }

    /// Cells played by `player`, oldest first
    pub fn history(&self, player: Player) -> &[usize] {
        &self.history[player.index()]
    }

    /// Every played cell, oldest first.
    ///
    /// Colours alternate starting with black; when one colour has played
    /// extra stones in a row they follow the alternating part.
    pub fn move_order(&self) -> Vec<(Player, usize)> {
        let [black, white] = &self.history;
        let mut order = Vec::with_capacity(self.moves_made());
        for i in 0..black.len().max(white.len()) {
            if let Some(&cell) = black.get(i) {
                order.push((Player::Black, cell));
            }
            if let Some(&cell) = white.get(i) {
                order.push((Player::White, cell));
            }
        }
        order
    }

    /// Total number of stones on the board
    pub fn moves_made(&self) -> usize {
        self.history[0].len() + self.history[1].len()
    }

    /// The player whose turn it is, derived from the move counts
    pub fn to_move(&self) -> Player {
        if self.history[0].len() > self.history[1].len() {
            Player::White
        } else {
            Player::Black
        }
    }

    /// Winner of the game, once one exists
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.legal_moves.is_empty()
    }

    /// Checks a move without applying it.
    pub fn validate_move(&self, cell: usize) -> Result<(), MoveValidationError> {
        if self.winner.is_some() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if cell >= self.cell_count() {
            return Err(MoveValidationError::OutOfRange {
                cell,
                cells: self.cell_count(),
            });
        }
        if self.owners[cell].is_some() {
            return Err(MoveValidationError::Occupied(cell));
        }
        Ok(())
    }

    /// Places a stone for `player` on `cell`.
    ///
    /// Merges the stone with every same-coloured neighbour group and updates
    /// the circuit sets of its neighbours. The board is left untouched when
    /// the move is rejected.
    ///
    /// # Errors
    /// `GameError::InvalidMove` for an occupied or out-of-range cell, or when
    /// the game already has a winner.
    pub fn apply_move(&mut self, cell: usize, player: Player) -> Result<(), GameError> {
        self.validate_move(cell)?;

        self.owners[cell] = Some(player);
        if let Ok(pos) = self.legal_moves.binary_search(&cell) {
            self.legal_moves.remove(pos);
        }
        self.history[player.index()].push(cell);

        let geometry = Arc::clone(&self.geometry);
        for &nb in geometry.neighbors(cell) {
            self.update_circuit(nb, cell, player);

            if self.owners[nb] != Some(player) {
                continue;
            }
            let root = self.find_root(nb);
            self.parents[nb] = cell;
            self.parents[root] = cell;
            self.edges[cell] |= self.edges[root];
        }

        if self.edges[cell] == ALL_EDGES {
            self.winner = Some(player);
        }
        Ok(())
    }

    /// Colour of the group containing `cell` if that group touches all three
    /// edges. Meant to be called right after `apply_move` on the same cell.
    pub fn find_winner(&self, cell: usize) -> Option<Player> {
        let owner = self.owners.get(cell).copied().flatten()?;
        let root = self.root_of(cell);
        if self.edges[root] == ALL_EDGES {
            Some(owner)
        } else {
            None
        }
    }

    /// Accumulated edge mask of the group containing `cell`, 0 off the board
    pub fn group_edges(&self, cell: usize) -> u8 {
        if cell >= self.cell_count() {
            return 0;
        }
        self.edges[self.root_of(cell)]
    }

    /// Group root of `cell`, compressing the path on the way.
    fn find_root(&mut self, cell: usize) -> usize {
        let root = self.root_of(cell);
        let mut current = cell;
        while self.parents[current] != root {
            let next = self.parents[current];
            self.parents[current] = root;
            current = next;
        }
        root
    }

    /// Group root of `cell` without touching the parent links.
    pub(crate) fn root_of(&self, cell: usize) -> usize {
        let mut current = cell;
        while self.parents[current] != current {
            current = self.parents[current];
        }
        current
    }

    /// Folds a freshly played stone at `played` into the circuit sets of `cell`.
    fn update_circuit(&mut self, cell: usize, played: usize, player: Player) {
        let own = player.index();
        let other = player.opponent().index();

        let absorbed: Vec<usize> = self.circuits[played][own]
            .iter()
            .copied()
            .filter(|&c| c != cell)
            .collect();

        let set = &mut self.circuits[cell][own];
        remove_sorted(set, played);
        for c in absorbed {
            insert_sorted(set, c);
        }
        remove_sorted(&mut self.circuits[cell][other], played);
    }

    /// Circuit set of `cell` for `player`
    pub fn circuit(&self, cell: usize, player: Player) -> &[usize] {
        self.circuits
            .get(cell)
            .map_or(&[], |sets| sets[player.index()].as_slice())
    }

    /// Sum of circuit-set sizes for `player` over the whole board.
    pub fn connectivity_score(&self, player: Player) -> usize {
        self.circuits
            .iter()
            .map(|sets| sets[player.index()].len())
            .sum()
    }

    /// Read-only snapshot for renderers
    pub fn snapshot(&self) -> BoardSnapshot {
        let cells = (0..self.cell_count())
            .map(|id| CellView {
                id,
                ring: self.geometry.ring_of(id),
                position: self.geometry.position_in_ring(id),
                owner: self.owners[id],
                edge_mask: self.geometry.edge_mask(id),
            })
            .collect();
        BoardSnapshot {
            base_size: self.base_size(),
            cells,
        }
    }
}

impl GameState for Board {
    type Move = usize;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.winner.is_some() {
            return Vec::new();
        }
        self.legal_moves.clone()
    }

    fn make_move(&mut self, mv: &Self::Move) -> Result<(), GameError> {
        let player = self.to_move();
        self.apply_move(*mv, player)
    }

    fn is_terminal(&self) -> bool {
        Board::is_terminal(self)
    }

    fn get_winner(&self) -> Option<Player> {
        self.winner
    }

    fn get_current_player(&self) -> Player {
        self.to_move()
    }
}

fn insert_sorted(set: &mut Vec<usize>, value: usize) {
    if let Err(pos) = set.binary_search(&value) {
        set.insert(pos, value);
    }
}

fn remove_sorted(set: &mut Vec<usize>, value: usize) {
    if let Ok(pos) = set.binary_search(&value) {
        set.remove(pos);
    }
}

impl fmt::Display for Board {
    /// One line per ring, innermost first: `X` black, `O` white, `.` empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ring = 0;
        for cell in 0..self.cell_count() {
            let cell_ring = self.geometry.ring_of(cell);
            if cell_ring != ring {
                if ring != 0 {
                    writeln!(f)?;
                }
                ring = cell_ring;
                write!(f, "{:>3} |", ring)?;
            }
            let symbol = match self.owners[cell] {
                Some(Player::Black) => "X".blue().bold(),
                Some(Player::White) => "O".yellow().bold(),
                None => ".".normal(),
            };
            write!(f, " {}", symbol)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EDGE_BOTTOM;

    #[test]
    fn test_new_board() {
        let board = Board::new(4).unwrap();
        assert_eq!(board.cell_count(), 18);
        assert_eq!(board.legal_moves().len(), 18);
        assert_eq!(board.to_move(), Player::Black);
        assert_eq!(board.winner(), None);
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_apply_move_updates_bookkeeping() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(4, Player::Black).unwrap();
        assert_eq!(board.owner(4), Some(Player::Black));
        assert!(!board.legal_moves().contains(&4));
        assert_eq!(board.history(Player::Black), &[4]);
        assert_eq!(board.to_move(), Player::White);

        board.apply_move(0, Player::White).unwrap();
        assert_eq!(board.history(Player::White), &[0]);
        assert_eq!(board.to_move(), Player::Black);
        assert_eq!(board.moves_made(), 2);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(4, Player::Black).unwrap();
        let before = board.legal_moves().to_vec();

        let err = board.apply_move(4, Player::White).unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidMove(MoveValidationError::Occupied(4))
        ));
        assert_eq!(board.owner(4), Some(Player::Black));
        assert_eq!(board.legal_moves(), before.as_slice());
        assert!(board.history(Player::White).is_empty());
    }

    #[test]
    fn test_out_of_range_cell_is_rejected() {
        let mut board = Board::new(2).unwrap();
        let err = board.apply_move(3, Player::Black).unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidMove(MoveValidationError::OutOfRange { cell: 3, cells: 3 })
        ));
        assert_eq!(board.legal_moves(), &[0, 1, 2]);
    }

    #[test]
    fn test_winning_path_on_base_three() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(3, Player::Black).unwrap();
        assert_eq!(board.find_winner(3), None);
        board.apply_move(4, Player::Black).unwrap();
        assert_eq!(board.find_winner(4), None);
        assert_eq!(board.group_edges(3), 0b101);
        board.apply_move(5, Player::Black).unwrap();
        assert_eq!(board.find_winner(5), Some(Player::Black));
        assert_eq!(board.winner(), Some(Player::Black));
        assert!(board.is_terminal());
    }

    #[test]
    fn test_no_moves_after_win() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        board.apply_move(1, Player::Black).unwrap();
        assert_eq!(board.winner(), Some(Player::Black));

        let err = board.apply_move(2, Player::White).unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidMove(MoveValidationError::GameAlreadyOver)
        ));
        assert_eq!(board.owner(2), None);
        assert_eq!(board.legal_moves(), &[2]);
        assert!(!board.is_legal(2));
    }

    #[test]
    fn test_lookups_off_the_board() {
        let mut board = Board::new(2).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        assert_eq!(board.owner(3), None);
        assert_eq!(board.owner(usize::MAX), None);
        assert_eq!(board.group_edges(3), 0);
        assert!(board.circuit(3, Player::Black).is_empty());
        assert_eq!(board.find_winner(3), None);
    }

    #[test]
    fn test_move_order_interleaves_colours() {
        let mut board = Board::new(4).unwrap();
        for (cell, player) in [(4, Player::Black), (7, Player::White), (0, Player::Black), (9, Player::White)] {
            board.apply_move(cell, player).unwrap();
        }
        board.apply_move(12, Player::Black).unwrap();
        assert_eq!(
            board.move_order(),
            vec![
                (Player::Black, 4),
                (Player::White, 7),
                (Player::Black, 0),
                (Player::White, 9),
                (Player::Black, 12),
            ]
        );
        assert!(Board::new(3).unwrap().move_order().is_empty());
    }

    #[test]
    fn test_new_stone_becomes_group_root() {
        let mut board = Board::new(4).unwrap();
        board.apply_move(9, Player::White).unwrap();
        board.apply_move(11, Player::White).unwrap();
        assert_ne!(board.root_of(9), board.root_of(11));

        board.apply_move(10, Player::White).unwrap();
        assert_eq!(board.root_of(9), 10);
        assert_eq!(board.root_of(11), 10);
        assert_eq!(board.group_edges(9), board.group_edges(10));
    }

    #[test]
    fn test_opponent_stones_do_not_merge() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(5, Player::Black).unwrap();
        board.apply_move(6, Player::White).unwrap();
        assert_eq!(board.root_of(6), 6);
        assert_eq!(board.group_edges(6), EDGE_BOTTOM);
    }

    #[test]
    fn test_circuits_contract_own_stones() {
        let mut board = Board::new(3).unwrap();
        // Neighbours of 4 are [0, 1, 3, 5]; 3 and 5 are not adjacent
        assert!(!board.circuit(3, Player::Black).contains(&5));
        board.apply_move(4, Player::Black).unwrap();

        assert!(board.circuit(3, Player::Black).contains(&5));
        assert!(!board.circuit(3, Player::Black).contains(&4));
        assert!(!board.circuit(3, Player::White).contains(&4));
        assert!(!board.circuit(3, Player::Black).contains(&3));
    }

    #[test]
    fn test_connectivity_score_favours_the_mover() {
        let mut board = Board::new(4).unwrap();
        let before = board.connectivity_score(Player::Black);
        assert_eq!(before, board.connectivity_score(Player::White));

        board.apply_move(4, Player::Black).unwrap();
        assert!(board.connectivity_score(Player::Black) > board.connectivity_score(Player::White));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        let mut branch = board.clone();
        branch.apply_move(1, Player::White).unwrap();

        assert_eq!(board.owner(1), None);
        assert_eq!(branch.owner(1), Some(Player::White));
        assert!(Arc::ptr_eq(board.geometry(), branch.geometry()));
    }

    #[test]
    fn test_snapshot() {
        let mut board = Board::new(3).unwrap();
        board.apply_move(7, Player::White).unwrap();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.base_size, 3);
        assert_eq!(snapshot.cells.len(), 9);
        let cell = &snapshot.cells[7];
        assert_eq!(cell.owner, Some(Player::White));
        assert_eq!(cell.ring, 3);
        assert_eq!(cell.position, 4);
        assert_eq!(cell.edge_mask, 0b110);
    }

    #[test]
    fn test_display() {
        colored::control::set_override(false);
        let mut board = Board::new(3).unwrap();
        board.apply_move(0, Player::Black).unwrap();
        board.apply_move(8, Player::White).unwrap();
        let text = format!("{}", board);
        assert_eq!(text, "  2 | X . .\n  3 | . . . . . O\n");
    }
}
