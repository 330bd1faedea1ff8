// grid.rs: spatial hash grid over the thermal field.
//
// Cell size >= largest query radius, so a radius query touches at most 3×3 cells.
// Cell coordinates wrap around the torus before hashing.
// Hash: Fibonacci hashing (Knuth). Build: one counting pass, one scatter pass.

use super::geometry::Scalar;

/// Spatial hash grid for thermals. Built once; the field never changes.
pub struct ThermalGrid {
    /// Bucket `h` holds `data[offsets[h] .. offsets[h] + counts[h]]`.
    counts: Vec<u32>,
    offsets: Vec<u32>,
    data: Vec<u32>,
    table_size: usize,
    mask: usize,
    /// Cells per axis.
    cols: i64,
    cell_width: Scalar,
}

impl ThermalGrid {
    /// Index `points` (all inside `[0, area_size)²`) with cells at least `cell_size` wide.
    pub fn build(points: &[(Scalar, Scalar)], area_size: Scalar, cell_size: Scalar) -> Self {
        let cols = ((area_size / cell_size).floor() as i64).max(1);
        let cell_width = area_size / cols as Scalar;
        let table_size = (points.len() * 2).next_power_of_two().max(16);

        let mut grid = ThermalGrid {
            counts: vec![0u32; table_size],
            offsets: vec![0u32; table_size],
            data: vec![0u32; points.len()],
            table_size,
            mask: table_size - 1,
            cols,
            cell_width,
        };

        // ── Pass 1: count ────────────────────────────────────────────────────
        for &(x, y) in points {
            let (cx, cy) = grid.cell_of(x, y);
            let h = grid.hash(cx, cy);
            grid.counts[h] += 1;
        }

        // ── Prefix sum → offsets ─────────────────────────────────────────────
        let mut running = 0u32;
        for h in 0..grid.table_size {
            grid.offsets[h] = running;
            running += grid.counts[h];
        }

        // ── Pass 2: scatter ──────────────────────────────────────────────────
        grid.counts.iter_mut().for_each(|c| *c = 0); // reuse as cursor

        for (i, &(x, y)) in points.iter().enumerate() {
            let (cx, cy) = grid.cell_of(x, y);
            let h = grid.hash(cx, cy);
            let slot = (grid.offsets[h] + grid.counts[h]) as usize;
            grid.data[slot] = i as u32;
            grid.counts[h] += 1;
        }

        grid
    }

    #[inline(always)]
    fn hash(&self, cx: i64, cy: i64) -> usize {
        let key = (cx as u64).wrapping_mul(2654435761) ^ (cy as u64).wrapping_mul(2246822519);
        (key.wrapping_mul(11400714819323198485) >> (64 - self.table_size.trailing_zeros())) as usize
            & self.mask
    }

    #[inline(always)]
    fn cell_of(&self, x: Scalar, y: Scalar) -> (i64, i64) {
        let cx = ((x / self.cell_width).floor() as i64).clamp(0, self.cols - 1);
        let cy = ((y / self.cell_width).floor() as i64).clamp(0, self.cols - 1);
        (cx, cy)
    }

    /// Wrapped cell indices covering `[q - r, q + r]` on one axis.
    fn axis_cells(&self, q: Scalar, r: Scalar) -> Vec<i64> {
        let lo = ((q - r) / self.cell_width).floor() as i64;
        let hi = ((q + r) / self.cell_width).floor() as i64;
        if hi - lo + 1 >= self.cols {
            return (0..self.cols).collect();
        }
        (lo..=hi).map(|c| c.rem_euclid(self.cols)).collect()
    }

    /// Candidate thermal indices near `(qx, qy)` within radius `r`, sorted and deduplicated.
    ///
    /// The grid is a filter: callers must still apply the exact distance test.
    pub fn candidates(&self, qx: Scalar, qy: Scalar, r: Scalar) -> Vec<u32> {
        let xs = self.axis_cells(qx, r);
        let ys = self.axis_cells(qy, r);

        let mut found = Vec::new();
        for &cy in &ys {
            for &cx in &xs {
                let h = self.hash(cx, cy);
                let start = self.offsets[h] as usize;
                let end = start + self.counts[h] as usize;
                found.extend_from_slice(&self.data[start..end]);
            }
        }
        // Distinct cells may share a bucket
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize, cx: Scalar, cy: Scalar, radius: Scalar) -> Vec<(Scalar, Scalar)> {
        (0..n)
            .map(|i| {
                let angle = (i as Scalar / n as Scalar) * std::f64::consts::TAU;
                (cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect()
    }

    #[test]
    fn query_returns_every_point_in_range() {
        let points = ring(200, 50.0, 50.0, 3.0);
        let grid = ThermalGrid::build(&points, 100.0, 1.0);
        let found = grid.candidates(50.0, 50.0, 4.0);
        assert_eq!(found.len(), 200, "expected all ring points as candidates");
    }

    #[test]
    fn query_wraps_across_the_edge() {
        let points = vec![(0.2, 0.2), (99.9, 99.9), (50.0, 50.0)];
        let grid = ThermalGrid::build(&points, 100.0, 1.0);
        let found = grid.candidates(99.95, 0.05, 1.0);
        assert!(found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn small_area_collapses_to_one_cell() {
        let points = vec![(0.1, 0.1), (0.4, 0.3)];
        let grid = ThermalGrid::build(&points, 0.5, 1.0);
        assert_eq!(grid.candidates(0.25, 0.25, 1.0), vec![0, 1]);
        assert_eq!(grid.len(), 2);
    }
}
