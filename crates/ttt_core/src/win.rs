//! Win detection.
//!
//! A line is `S` cells reached by repeatedly stepping one fixed direction
//! vector from a start cell, where every component of the direction is
//! -1, 0 or +1 and at least one is non-zero. Lines may only start on a face
//! of the board: for every axis the direction moves along, the start sits on
//! the edge the direction moves away from. Each geometric line is therefore
//! found twice (once from each end) and deduplicated by its cell set.

use crate::board::{Board, Piece, Rank};
use crate::geometry::{add, Coord, AXES};
use std::collections::BTreeMap;

/// A completed line of one side's pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningLine {
    /// Flat indices of the line's cells in ascending order.
    pub cells: Vec<usize>,
    /// Owner of every cell in the line.
    pub piece: Piece,
}

impl WinningLine {
    pub fn contains(&self, index: usize) -> bool {
        self.cells.binary_search(&index).is_ok()
    }
}

/// Every non-zero direction vector over the active axes of `rank`.
///
/// There are `3^rank - 1` of them; inactive components are always 0.
pub fn directions(rank: Rank) -> Vec<Coord> {
    let active = rank.get();
    (0..3usize.pow(active as u32))
        .map(|mut n| {
            let mut direction = [0; AXES];
            for component in direction.iter_mut().take(active) {
                *component = (n % 3) as i32 - 1;
                n /= 3;
            }
            direction
        })
        .filter(|direction| direction.iter().any(|&c| c != 0))
        .collect()
}

/// Finds every line on `board` whose cells all hold the same piece.
///
/// The result is ordered by the lines' sorted cell lists, so identical boards
/// always produce identical output.
pub fn find_winning_lines(board: &Board) -> Vec<WinningLine> {
    let geometry = board.geometry();
    let rank = board.rank();
    let side = board.side_length();
    let last = side as i32 - 1;
    let directions = directions(rank);

    let mut found: BTreeMap<Vec<usize>, Piece> = BTreeMap::new();
    for start in 0..board.cell_count() {
        let Some(piece) = board.cell(start) else {
            continue;
        };
        let origin = geometry.decode(start);

        for direction in &directions {
            let on_face = origin.iter().zip(direction).all(|(&c, &d)| match d {
                1 => c == 0,
                -1 => c == last,
                _ => true,
            });
            if !on_face {
                continue;
            }

            let mut cells = Vec::with_capacity(side);
            let mut position = origin;
            while geometry.contains(position, rank) {
                cells.push(geometry.encode(position));
                position = add(position, *direction);
            }
            if cells.len() != side || cells.iter().any(|&cell| board.cell(cell) != Some(piece)) {
                continue;
            }

            cells.sort_unstable();
            found.entry(cells).or_insert(piece);
        }
    }

    found
        .into_iter()
        .map(|(cells, piece)| WinningLine { cells, piece })
        .collect()
}
