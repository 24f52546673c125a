#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashMap;
#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Dense grids may hold at most this many cells per indexed point (plus
/// [`DENSE_CELL_SLACK`]) before the index switches to sparse cell keys.
pub const DENSE_CELLS_PER_POINT: usize = 16;
pub const DENSE_CELL_SLACK: usize = 1024;

/// Uniform grid over particle positions for 3x3 neighbourhood queries.
///
/// Cells are addressed by `floor(x / cell_size), floor(y / cell_size)`. The
/// grid covers exactly the cells spanned by the indexed points: the minimum
/// cell becomes the origin and every cell maps to the flat index
/// `(cx - min_cx) + (cy - min_cy) * cols`.
///
/// When the points are spread so thinly that the dense grid would dwarf the
/// point count, only occupied cells get a slot and `sparse_cells` maps cell
/// coordinates to that slot. Memory stays linear in the number of points.
///
/// Storage follows the offset-array pattern (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i + 1]` is the slice of `entity_indices`
/// holding the points in cell `i`, in ascending index order.
///
/// The index is rebuilt from scratch for every query batch; nothing is
/// maintained incrementally.
///
/// # Examples
/// ```
/// use observer_core::spatial_hash::SpatialHash;
///
/// let mut grid = SpatialHash::new(10.0);
/// grid.build(&[(15.0, 15.0), (25.0, 25.0), (85.0, 85.0)]);
///
/// let mut nearby = Vec::new();
/// grid.query_into(15.0, 15.0, &mut nearby);
/// assert_eq!(nearby, vec![0, 1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SpatialHash {
    pub cell_size: f64,
    pub min_cx: i64,
    pub min_cy: i64,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
    pub sparse_cells: Option<HashMap<(i64, i64), usize>>,
}

impl SpatialHash {
    /// Creates an empty index. Non-finite or non-positive cell sizes yield an
    /// index that never returns anything.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            min_cx: 0,
            min_cy: 0,
            cols: 0,
            rows: 0,
            cell_offsets: vec![0],
            entity_indices: Vec::new(),
            sparse_cells: None,
        }
    }

    #[inline]
    fn usable(&self) -> bool {
        self.cell_size.is_finite() && self.cell_size > 0.0
    }

    /// Integer cell coordinate of a world position.
    ///
    /// Returns `None` for non-finite input or coordinates whose cell would
    /// overflow an `i32`.
    #[inline]
    pub fn cell_coords(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        if !self.usable() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let cx = (x / self.cell_size).floor();
        let cy = (y / self.cell_size).floor();
        let limit = f64::from(i32::MAX);
        if cx.abs() > limit || cy.abs() > limit {
            return None;
        }
        Some((cx as i64, cy as i64))
    }

    /// Flat index of the cell at integer coordinates, if it lies in the grid.
    #[inline]
    pub fn cell_index(&self, cx: i64, cy: i64) -> Option<usize> {
        if let Some(sparse) = &self.sparse_cells {
            return sparse.get(&(cx, cy)).copied();
        }
        let lx = cx - self.min_cx;
        let ly = cy - self.min_cy;
        if lx < 0 || ly < 0 || lx >= self.cols as i64 || ly >= self.rows as i64 {
            None
        } else {
            Some(ly as usize * self.cols + lx as usize)
        }
    }

    /// Flat index of the cell containing a world position.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, y: f64) -> Option<usize> {
        let (cx, cy) = self.cell_coords(x, y)?;
        self.cell_index(cx, cy)
    }

    /// Rebuilds the index over `positions`. Point `i` is reported as index `i`.
    /// Points with unusable coordinates are left out.
    pub fn build(&mut self, positions: &[(f64, f64)]) {
        let coords: Vec<Option<(i64, i64)>> = positions
            .iter()
            .map(|&(x, y)| self.cell_coords(x, y))
            .collect();

        let mut bounds: Option<(i64, i64, i64, i64)> = None;
        for &(cx, cy) in coords.iter().flatten() {
            bounds = Some(match bounds {
                None => (cx, cy, cx, cy),
                Some((x0, y0, x1, y1)) => (x0.min(cx), y0.min(cy), x1.max(cx), y1.max(cy)),
            });
        }

        let Some((x0, y0, x1, y1)) = bounds else {
            self.min_cx = 0;
            self.min_cy = 0;
            self.cols = 0;
            self.rows = 0;
            self.cell_offsets.clear();
            self.cell_offsets.push(0);
            self.entity_indices.clear();
            self.sparse_cells = None;
            return;
        };

        self.min_cx = x0;
        self.min_cy = y0;
        self.cols = (x1 - x0 + 1) as usize;
        self.rows = (y1 - y0 + 1) as usize;
        let dense_limit = positions
            .len()
            .saturating_mul(DENSE_CELLS_PER_POINT)
            .saturating_add(DENSE_CELL_SLACK);
        let cell_count = match self.cols.checked_mul(self.rows) {
            Some(count) if count <= dense_limit => {
                self.sparse_cells = None;
                count
            }
            _ => {
                let mut sparse = HashMap::new();
                for &key in coords.iter().flatten() {
                    let next = sparse.len();
                    sparse.entry(key).or_insert(next);
                }
                let count = sparse.len();
                self.sparse_cells = Some(sparse);
                count
            }
        };

        let cells: Vec<Option<usize>> = coords
            .iter()
            .map(|c| c.and_then(|(cx, cy)| self.cell_index(cx, cy)))
            .collect();

        let counts = count_per_cell(&cells, cell_count);

        self.cell_offsets.clear();
        self.cell_offsets.reserve(cell_count + 1);
        let mut total = 0;
        for &count in &counts {
            self.cell_offsets.push(total);
            total += count;
        }
        self.cell_offsets.push(total);

        self.entity_indices.clear();
        self.entity_indices.resize(total, 0);
        let mut cursor = self.cell_offsets[..cell_count].to_vec();
        for (entity_idx, cell) in cells.iter().enumerate() {
            if let Some(cell_idx) = *cell {
                self.entity_indices[cursor[cell_idx]] = entity_idx;
                cursor[cell_idx] += 1;
            }
        }
    }

    /// Slice of indices stored in one cell.
    #[inline]
    pub fn cell_entities(&self, cell_idx: usize) -> &[usize] {
        &self.entity_indices[self.cell_offsets[cell_idx]..self.cell_offsets[cell_idx + 1]]
    }

    /// Visits every index in the 3x3 block of cells around `(x, y)`.
    ///
    /// Cells are walked column-major (`dx` outer, `dy` inner); indices within a
    /// cell come in ascending order. The candidate set is a superset of the
    /// true neighbours within `cell_size`; callers confirm with a distance check.
    pub fn query_callback<F>(&self, x: f64, y: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        let Some((cx, cy)) = self.cell_coords(x, y) else {
            return;
        };
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell_idx) = self.cell_index(cx + dx, cy + dy) {
                    for &entity_idx in self.cell_entities(cell_idx) {
                        callback(entity_idx);
                    }
                }
            }
        }
    }

    /// Like [`query_callback`](Self::query_callback) but lets the visitor stop
    /// the walk early by returning `false`. Returns whether the walk completed.
    pub fn query_until<F>(&self, x: f64, y: f64, mut visit: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        let Some((cx, cy)) = self.cell_coords(x, y) else {
            return true;
        };
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell_idx) = self.cell_index(cx + dx, cy + dy) {
                    for &entity_idx in self.cell_entities(cell_idx) {
                        if !visit(entity_idx) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    #[inline]
    pub fn query_into(&self, x: f64, y: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(x, y, |idx| result.push(idx));
    }

    pub fn count_nearby(&self, x: f64, y: f64) -> usize {
        let mut count = 0;
        self.query_callback(x, y, |_| count += 1);
        count
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_indices.is_empty()
    }
}

#[cfg(feature = "parallel")]
fn count_per_cell(cells: &[Option<usize>], cell_count: usize) -> Vec<usize> {
    let atomic_counts: Vec<AtomicUsize> = (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
    cells.par_iter().for_each(|cell| {
        if let Some(idx) = *cell {
            atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
        }
    });
    atomic_counts.into_iter().map(AtomicUsize::into_inner).collect()
}

#[cfg(not(feature = "parallel"))]
fn count_per_cell(cells: &[Option<usize>], cell_count: usize) -> Vec<usize> {
    let mut counts = vec![0; cell_count];
    for idx in cells.iter().flatten() {
        counts[*idx] += 1;
    }
    counts
}
