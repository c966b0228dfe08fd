use glam::DVec2;
use std::collections::HashMap;

/// Smallest cell edge; keeps cell coordinates of the unit square well inside `i64`
const MIN_CELL_SIZE: f64 = 1.0 / (1u64 << 32) as f64;

/// Spatial hash grid over the unit Mercator square.
/// Items live in a flat vec; cells hold indices into it.
pub struct SpatialGrid<T> {
    /// Grid cells indexed by (cell_x, cell_y)
    cells: HashMap<(i64, i64), Vec<usize>>,
    items: Vec<T>,
    positions: Vec<DVec2>,
    cell_size: f64,
}

impl<T> SpatialGrid<T> {
    /// Create an empty grid. `cell_size` is in normalized Mercator units and is clamped
    /// to `[MIN_CELL_SIZE, 1]`; zero, NaN and infinite sizes only change bucketing.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.clamp(MIN_CELL_SIZE, 1.0)
        } else {
            1.0
        };
        Self {
            cells: HashMap::new(),
            items: Vec::new(),
            positions: Vec::new(),
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i64, i64) {
        let x = (p.x / self.cell_size).floor() as i64;
        let y = (p.y / self.cell_size).floor() as i64;
        (x, y)
    }

    /// Insert an item at a position, returning its index
    pub fn insert(&mut self, position: DVec2, item: T) -> usize {
        let idx = self.items.len();
        self.items.push(item);
        self.positions.push(position);

        let cell = self.to_cell(position);
        self.cells.entry(cell).or_default().push(idx);
        idx
    }

    /// Indices of items within `radius` of `center` (inclusive), in insertion order
    pub fn within(&self, center: DVec2, radius: f64) -> Vec<usize> {
        let center_cell = self.to_cell(center);
        // No point can be more cells away than the unit square is wide
        let cells_across = (1.0 / self.cell_size).ceil() as i64 + 1;
        let cell_radius = ((radius / self.cell_size).ceil() as i64).min(cells_across);
        let r2 = radius * radius;

        let mut results = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                let cell = (
                    center_cell.0.saturating_add(dx),
                    center_cell.1.saturating_add(dy),
                );
                if let Some(indices) = self.cells.get(&cell) {
                    results.extend(
                        indices
                            .iter()
                            .copied()
                            .filter(|&i| self.positions[i].distance_squared(center) <= r2),
                    );
                }
            }
        }

        results.sort_unstable();
        results
    }

    /// Indices of items inside the box `[min, max]` (inclusive), in insertion order.
    /// Walks occupied cells instead of the cell range when the range is the larger set.
    pub fn query_bbox(&self, min: DVec2, max: DVec2) -> Vec<usize> {
        let min_cell = self.to_cell(min);
        let max_cell = self.to_cell(max);
        let inside = |i: &usize| {
            let p = self.positions[*i];
            p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
        };

        let span = |lo: i64, hi: i64| hi.saturating_sub(lo).saturating_add(1).max(0) as u128;
        let span_x = span(min_cell.0, max_cell.0);
        let span_y = span(min_cell.1, max_cell.1);

        let mut results = Vec::new();
        if span_x.saturating_mul(span_y) > self.cells.len() as u128 {
            for (&(x, y), indices) in &self.cells {
                if x >= min_cell.0 && x <= max_cell.0 && y >= min_cell.1 && y <= max_cell.1 {
                    results.extend(indices.iter().copied().filter(inside));
                }
            }
        } else {
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    if let Some(indices) = self.cells.get(&(x, y)) {
                        results.extend(indices.iter().copied().filter(inside));
                    }
                }
            }
        }

        results.sort_unstable();
        results
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> DVec2 {
        self.positions[idx]
    }

    #[inline(always)]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
