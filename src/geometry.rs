//! # Geodesic Board Geometry
//!
//! Builds the adjacency graph of a geodesic Y board and classifies which of the
//! three outer board edges every cell touches.
//!
//! ## Layout
//! Cells are numbered ring by ring, from the innermost triangle outwards. Ring
//! `d` (the "depth level") holds `3 * (d - 1)` cells and starts at id
//! `smallest_cell_number(d)`. Ring 1 is empty and ring 2 is the central
//! triangle, so a board of base size `N` has rings `2..=N` and
//! `smallest_cell_number(N + 1)` cells in total.
//!
//! Every ring has three corner cells, evenly spaced `d - 1` ids apart. While
//! building, each cell is linked to its two cyclic neighbours in its own ring
//! and to the next ring out: corners reach three outward cells, every other
//! cell reaches two. A final pass adds missing reverse links and sorts each
//! neighbour list so the graph is symmetric and deterministic.
//!
//! ## Edges
//! Only cells of the outermost ring touch the board edge. The three corners of
//! that ring split it into three sides; a side cell touches one edge and a
//! corner touches the two edges that meet there.

use crate::error::GameError;

/// Bit for the side running from the first to the second outer corner
pub const EDGE_RIGHT: u8 = 0b001;
/// Bit for the side running from the second to the third outer corner
pub const EDGE_BOTTOM: u8 = 0b010;
/// Bit for the side running from the third outer corner back to the first
pub const EDGE_LEFT: u8 = 0b100;
/// A group touching all three sides wins
pub const ALL_EDGES: u8 = EDGE_RIGHT | EDGE_BOTTOM | EDGE_LEFT;

/// Smallest base size that yields a playable board
pub const MIN_BASE_SIZE: usize = 2;

/// First cell id of ring `depth`.
pub fn smallest_cell_number(depth: usize) -> usize {
    if depth < 2 {
        return 0;
    }
    3 * (depth - 1) * (depth - 2) / 2
}

/// Total number of cells on a board of the given base size.
pub fn cell_count(base_size: usize) -> usize {
    smallest_cell_number(base_size + 1)
}

/// Id of corner `place` (0, 1 or 2) of ring `depth`.
pub(crate) fn corner(place: usize, depth: usize) -> usize {
    smallest_cell_number(depth) + depth.saturating_sub(1) * place
}

/// Which corner of ring `depth` the cell is, if any.
pub(crate) fn corner_place(cell: usize, depth: usize) -> Option<usize> {
    (0..3).find(|&place| corner(place, depth) == cell)
}

/// Index of the corner that opens the side of ring `depth` containing `cell`.
fn side_of(cell: usize, depth: usize) -> usize {
    if cell < corner(1, depth) {
        0
    } else if cell < corner(2, depth) {
        1
    } else {
        2
    }
}

/// Edge mask of `cell` on a finished board of base size `base_size`.
///
/// The mask is always taken against the outermost ring of the finished
/// board; cells of inner rings get `0`, as does every cell when the base
/// size is too small to form a board.
pub(crate) fn edge_mask(cell: usize, base_size: usize) -> u8 {
    if base_size < MIN_BASE_SIZE {
        return 0;
    }
    let first = corner(0, base_size);
    let second = corner(1, base_size);
    let third = corner(2, base_size);

    let mut edge = 0;
    if (first..=second).contains(&cell) {
        edge |= EDGE_RIGHT;
    }
    if (second..=third).contains(&cell) {
        edge |= EDGE_BOTTOM;
    }
    if cell == first || (cell >= third && cell < cell_count(base_size)) {
        edge |= EDGE_LEFT;
    }
    edge
}

/// Immutable topology of one board: adjacency plus per-cell edge masks.
///
/// Built once per game and shared by every board snapshot taken from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    base_size: usize,
    adjacency: Vec<Vec<usize>>,
    edge_masks: Vec<u8>,
}

impl Geometry {
    /// Base size the board was generated for
    pub fn base_size(&self) -> usize {
        self.base_size
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Sorted neighbour ids of `cell`
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.adjacency[cell]
    }

    /// The full adjacency list, indexed by cell id
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    /// Which outer edges `cell` touches
    pub fn edge_mask(&self, cell: usize) -> u8 {
        self.edge_masks[cell]
    }

    /// Ring (depth level) holding `cell`, counting the central triangle as ring 2.
    pub fn ring_of(&self, cell: usize) -> usize {
        let mut depth = 2;
        while cell >= smallest_cell_number(depth + 1) {
            depth += 1;
        }
        depth
    }

    /// Offset of `cell` from the first cell of its ring.
    pub fn position_in_ring(&self, cell: usize) -> usize {
        cell - smallest_cell_number(self.ring_of(cell))
    }
}

/// Builds the adjacency graph and edge masks for a board of base size `base_size`.
///
/// # Errors
/// Returns `GameError::GraphGeneration` when `base_size < 2`.
pub fn generate_board(base_size: usize) -> Result<Geometry, GameError> {
    if base_size < MIN_BASE_SIZE {
        return Err(GameError::GraphGeneration { base_size });
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); cell_count(base_size)];

    for depth in 2..=base_size {
        let smallest = smallest_cell_number(depth);
        let biggest = smallest_cell_number(depth + 1);

        for cell in smallest..biggest {
            // Cyclic neighbours within the ring
            let next = if cell + 1 == biggest { smallest } else { cell + 1 };
            let prev = if cell == smallest { biggest - 1 } else { cell - 1 };
            adjacency[cell].push(next);
            adjacency[cell].push(prev);

            // The outermost ring has nothing above it
            if depth == base_size {
                continue;
            }

            match corner_place(cell, depth) {
                Some(place) => {
                    let up = corner(place, depth + 1);
                    adjacency[cell].push(up);
                    adjacency[cell].push(up + 1);
                    if up == biggest {
                        // Corner 0 wraps around to the last cell of the next ring
                        adjacency[cell].push(smallest_cell_number(depth + 2) - 1);
                    } else {
                        adjacency[cell].push(up - 1);
                    }
                }
                None => {
                    let offset = 3 * (depth - 1) + side_of(cell, depth);
                    adjacency[cell].push(cell + offset);
                    adjacency[cell].push(cell + offset + 1);
                }
            }
        }
    }

    symmetrize(&mut adjacency);

    let edge_masks = (0..adjacency.len())
        .map(|cell| edge_mask(cell, base_size))
        .collect();

    Ok(Geometry {
        base_size,
        adjacency,
        edge_masks,
    })
}

/// Adds any missing reverse link, then sorts and deduplicates each list.
fn symmetrize(adjacency: &mut [Vec<usize>]) {
    for cell in 0..adjacency.len() {
        for i in 0..adjacency[cell].len() {
            let other = adjacency[cell][i];
            if !adjacency[other].contains(&cell) {
                adjacency[other].push(cell);
            }
        }
    }
    for neighbors in adjacency.iter_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
}
