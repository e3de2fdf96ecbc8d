/// Single board axis, used for row/column positions and for the board height/width.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`, also used for sizes as `(rows, cols)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub const fn in_bounds((row, col): Coord2, (rows, cols): Coord2) -> bool {
    row < rows && col < cols
}

/// Whether `a` and `b` are the same cell or touch each other, diagonals included.
pub const fn within_one(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

/// Iterates the up-to-8 neighbors of `center` that lie inside `bounds`.
pub fn neighbors(center: Coord2, bounds: Coord2) -> NeighborIter {
    NeighborIter::new(center, bounds)
}

/// Number of cells in the 3x3 block around `center`, clipped to `bounds`.
pub fn block_len(center: Coord2, bounds: Coord2) -> CellCount {
    let span = |pos: Coord, len: Coord| -> CellCount {
        let lo = pos.saturating_sub(1);
        let hi = pos.saturating_add(1).min(len.saturating_sub(1));
        (hi - lo + 1).into()
    };
    span(center.0, bounds.0) * span(center.1, bounds.1)
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, (dr, dc): (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let next = (
        coords.0.checked_add_signed(dr)?,
        coords.1.checked_add_signed(dc)?,
    );
    in_bounds(next, bounds).then_some(next)
}

#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: usize,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = DISPLACEMENTS.get(self.index) {
            self.index += 1;
            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_three_neighbors() {
        let found: Vec<_> = neighbors((0, 0), (9, 9)).collect();
        assert_eq!(found, vec![(0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn interior_has_eight_neighbors() {
        assert_eq!(neighbors((4, 4), (9, 9)).count(), 8);
        assert!(neighbors((4, 4), (9, 9)).all(|pos| within_one(pos, (4, 4))));
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        assert_eq!(neighbors((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn block_len_is_clipped_at_edges() {
        assert_eq!(block_len((4, 4), (9, 9)), 9);
        assert_eq!(block_len((0, 0), (9, 9)), 4);
        assert_eq!(block_len((0, 4), (9, 9)), 6);
        assert_eq!(block_len((8, 8), (9, 9)), 4);
        assert_eq!(block_len((0, 0), (1, 1)), 1);
    }
}
