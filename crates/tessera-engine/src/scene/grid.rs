/// Dimensions of the instance lattice.
///
/// `rows` runs along X, `columns` along Y and `depth` along Z.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridDims {
    pub rows: u32,
    pub columns: u32,
    pub depth: u32,
}

impl GridDims {
    #[inline]
    pub const fn new(rows: u32, columns: u32, depth: u32) -> Self {
        Self { rows, columns, depth }
    }

    /// `rows * columns * depth`, or `None` if it does not fit in `u32`.
    pub fn checked_instance_count(self) -> Option<u32> {
        self.rows.checked_mul(self.columns)?.checked_mul(self.depth)
    }

    /// Instance count, saturating at `u32::MAX`.
    ///
    /// Configurations are validated against overflow before use.
    pub fn instance_count(self) -> u32 {
        self.rows.saturating_mul(self.columns).saturating_mul(self.depth)
    }

    /// Iterates every cell with `ix` varying fastest, then `iy`, then `iz`.
    pub fn cells(self) -> GridCells {
        GridCells {
            dims: self,
            next: 0,
            ix: 0,
            iy: 0,
            iz: 0,
        }
    }
}

/// One lattice cell and its linear instance index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GridCell {
    pub index: u32,
    pub ix: u32,
    pub iy: u32,
    pub iz: u32,
}

/// Iterator over [`GridDims::cells`].
#[derive(Debug, Clone)]
pub struct GridCells {
    dims: GridDims,
    next: u32,
    ix: u32,
    iy: u32,
    iz: u32,
}

impl Iterator for GridCells {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        if self.next >= self.dims.instance_count() {
            return None;
        }

        // Carry from x into y, then from y into z.
        if self.ix == self.dims.rows {
            self.ix = 0;
            self.iy += 1;
        }
        if self.iy == self.dims.columns {
            self.iy = 0;
            self.iz += 1;
        }

        let cell = GridCell {
            index: self.next,
            ix: self.ix,
            iy: self.iy,
            iz: self.iz,
        };

        self.ix += 1;
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.dims.instance_count() - self.next.min(self.dims.instance_count())) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridCells {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn covers_full_lattice_without_duplicates() {
        let dims = GridDims::new(10, 10, 10);
        let cells: Vec<GridCell> = dims.cells().collect();
        assert_eq!(cells.len(), 1000);

        let unique: HashSet<(u32, u32, u32)> = cells.iter().map(|c| (c.ix, c.iy, c.iz)).collect();
        assert_eq!(unique.len(), 1000);

        for c in &cells {
            assert!(c.ix < 10 && c.iy < 10 && c.iz < 10, "{c:?}");
        }
    }

    #[test]
    fn x_varies_fastest() {
        let dims = GridDims::new(3, 2, 2);
        let order: Vec<(u32, u32, u32)> = dims.cells().map(|c| (c.ix, c.iy, c.iz)).collect();
        assert_eq!(&order[..4], &[(0, 0, 0), (1, 0, 0), (2, 0, 0), (0, 1, 0)]);
        assert_eq!(order[6], (0, 0, 1));
        assert_eq!(order.last(), Some(&(2, 1, 1)));
    }

    #[test]
    fn linear_index_matches_coordinates() {
        let dims = GridDims::new(4, 3, 5);
        for c in dims.cells() {
            assert_eq!(c.index, c.ix + c.iy * 4 + c.iz * 4 * 3);
        }
    }

    #[test]
    fn non_cubic_dims_carry_on_their_own_axis() {
        let dims = GridDims::new(2, 5, 1);
        let cells: Vec<GridCell> = dims.cells().collect();
        assert_eq!(cells.len(), 10);
        assert!(cells.iter().all(|c| c.iz == 0));
        assert_eq!(cells.iter().map(|c| c.iy).max(), Some(4));
    }

    #[test]
    fn single_cell_grid() {
        let cells: Vec<GridCell> = GridDims::new(1, 1, 1).cells().collect();
        assert_eq!(cells, vec![GridCell { index: 0, ix: 0, iy: 0, iz: 0 }]);
    }

    #[test]
    fn exact_size_hint() {
        let mut it = GridDims::new(2, 2, 2).cells();
        assert_eq!(it.len(), 8);
        it.next();
        assert_eq!(it.len(), 7);
    }
}
