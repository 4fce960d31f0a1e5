//! Cell addressing for boards of up to four dimensions.
//!
//! Every board stores its cells in one flat vector. A flat index maps to a
//! 4-component coordinate through a mixed-radix scheme with radix
//! `side_length`; axes beyond the board's rank are pinned to 0, which lets the
//! same storage and addressing serve 2D, 3D and 4D boards.

use crate::board::Rank;

/// Number of coordinate axes a board can use.
pub const AXES: usize = 4;

/// A 4-component integer coordinate `(x, y, z, w)`.
///
/// Components are signed so that direction vectors and intermediate results
/// of [`add`] can step outside the board before being wrapped or rejected.
pub type Coord = [i32; AXES];

/// Componentwise addition of two coordinates.
pub fn add(a: Coord, b: Coord) -> Coord {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]]
}

/// Mixed-radix addressing for a fixed side length.
///
/// `decode` and `encode` always use the same radix, so a single `Geometry`
/// round-trips every index it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    side_length: usize,
}

impl Geometry {
    /// Creates addressing for boards whose axes are `side_length` cells long.
    pub fn new(side_length: usize) -> Self {
        Self { side_length }
    }

    /// The radix used by this geometry.
    pub fn side_length(&self) -> usize {
        self.side_length
    }

    /// Number of cells on a board of the given rank (`side_length^rank`),
    /// or `None` if that does not fit in a `usize`.
    pub fn cell_count(&self, rank: Rank) -> Option<usize> {
        self.side_length.checked_pow(rank.get() as u32)
    }

    /// Converts a flat index into its coordinate.
    ///
    /// Produces `(i mod S, (i mod S²)/S, (i mod S³)/S², i/S³)`.
    pub fn decode(&self, index: usize) -> Coord {
        let s = self.side_length;
        [
            (index % s) as i32,
            ((index % (s * s)) / s) as i32,
            ((index % (s * s * s)) / (s * s)) as i32,
            (index / (s * s * s)) as i32,
        ]
    }

    /// Converts a coordinate into a flat index, wrapping every component
    /// modulo the side length first (`-1` becomes `S - 1`).
    pub fn encode(&self, coord: Coord) -> usize {
        let s = self.side_length as i32;
        coord
            .iter()
            .rev()
            .fold(0usize, |acc, &c| acc * self.side_length + c.rem_euclid(s) as usize)
    }

    /// Whether `coord` addresses a cell of a board with the given rank
    /// without wrapping: every active component lies in `[0, S)` and every
    /// inactive component is 0.
    pub fn contains(&self, coord: Coord, rank: Rank) -> bool {
        let s = self.side_length as i32;
        coord.iter().enumerate().all(|(axis, &c)| {
            if axis < rank.get() {
                (0..s).contains(&c)
            } else {
                c == 0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matches_mixed_radix_formula() {
        let geometry = Geometry::new(3);
        assert_eq!(geometry.decode(0), [0, 0, 0, 0]);
        assert_eq!(geometry.decode(5), [2, 1, 0, 0]);
        assert_eq!(geometry.decode(13), [1, 1, 1, 0]);
        assert_eq!(geometry.decode(80), [2, 2, 2, 2]);
        assert_eq!(geometry.decode(27), [0, 0, 0, 1]);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        for side in 2..=5 {
            let geometry = Geometry::new(side);
            for index in 0..side.pow(4) {
                assert_eq!(geometry.encode(geometry.decode(index)), index, "side {side}");
            }
        }
    }

    #[test]
    fn test_encode_wraps_each_component() {
        let geometry = Geometry::new(3);
        assert_eq!(geometry.encode([-1, 0, 0, 0]), 2);
        assert_eq!(geometry.encode([3, 0, 0, 0]), 0);
        assert_eq!(geometry.encode([0, -1, 0, 0]), 6);
        assert_eq!(geometry.encode([0, 0, 0, -1]), 54);
    }

    #[test]
    fn test_add_is_componentwise() {
        assert_eq!(add([1, 2, 0, -1], [-1, 1, 1, 1]), [0, 3, 1, 0]);
    }

    #[test]
    fn test_contains_respects_rank() {
        let geometry = Geometry::new(3);
        let two = Rank::new(2).unwrap();
        let four = Rank::new(4).unwrap();
        assert!(geometry.contains([2, 2, 0, 0], two));
        assert!(!geometry.contains([2, 2, 1, 0], two));
        assert!(!geometry.contains([3, 0, 0, 0], four));
        assert!(!geometry.contains([-1, 0, 0, 0], four));
        assert!(geometry.contains([2, 2, 2, 2], four));
    }

    #[test]
    fn test_cell_count() {
        let geometry = Geometry::new(3);
        assert_eq!(geometry.cell_count(Rank::new(2).unwrap()), Some(9));
        assert_eq!(geometry.cell_count(Rank::new(3).unwrap()), Some(27));
        assert_eq!(geometry.cell_count(Rank::new(4).unwrap()), Some(81));
        assert_eq!(Geometry::new(1 << 20).cell_count(Rank::FOUR), None);
    }
}
