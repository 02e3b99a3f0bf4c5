use std::fmt;
use serde::Serialize;
use crate::geometry::Geometry;
use crate::traversal::{Cursor, Traversal};




/**
 * A scalar quantity sampled on every cell of the mesh array, ghost layer
 * included. Values are stored in a single buffer, the first index increasing
 * fastest.
 *
 * The offset places the quantity within its cell: the value of cell `(i, j)`
 * sits at the physical position `(i * dx - offset.0, j * dy - offset.1)`.
 * Cell-centered quantities use an offset of half a cell on both axes,
 * face-centered (staggered) quantities on one axis only.
 */
#[derive(Clone, Debug, Serialize)]
pub struct Field {
    geometry: Geometry,
    offset: (f64, f64),
    data: Vec<f64>,
}




// ============================================================================
impl Field {

    pub fn new(geometry: &Geometry) -> Self {
        Self::with_value(geometry, 0.0)
    }

    pub fn with_value(geometry: &Geometry, value: f64) -> Self {
        Self {
            geometry: *geometry,
            offset: (0.0, 0.0),
            data: vec![value; geometry.num_cells()],
        }
    }

    pub fn with_offset(geometry: &Geometry, offset: (f64, f64)) -> Self {
        Self {
            offset,
            ..Self::new(geometry)
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /**
     * Set every value, ghost layer included.
     */
    pub fn initialize(&mut self, value: f64) {
        for x in &mut self.data {
            *x = value;
        }
    }

    pub fn cell<C: Cursor>(&self, it: &C) -> f64 {
        debug_assert_eq!(it.extent(), self.geometry.extent(), "cursor belongs to another mesh");
        self.data[it.value()]
    }

    pub fn cell_mut<C: Cursor>(&mut self, it: &C) -> &mut f64 {
        debug_assert_eq!(it.extent(), self.geometry.extent(), "cursor belongs to another mesh");
        &mut self.data[it.value()]
    }

    /**
     * Return the value at an explicit index, panicking with a description of
     * the array bounds if the index is outside of them.
     */
    pub fn at(&self, index: (usize, usize)) -> f64 {
        let (ni, nj) = self.geometry.extent();

        if index.0 >= ni || index.1 >= nj {
            panic!("index ({} {}) out of range on field (0..{} 0..{})", index.0, index.1, ni, nj);
        }
        self.data[index.1 * ni + index.0]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}




/**
 * Difference quotients. Each operator reads the current cell and its direct
 * neighbors, so the cursor must not sit on the ghost layer in the direction
 * of the stencil (a ghost cell's outward neighbor is the cell itself).
 */
impl Field {

    pub fn dx_l<C: Cursor>(&self, it: &C) -> f64 {
        (self.cell(it) - self.cell(&it.left())) / self.geometry.mesh().0
    }

    pub fn dx_r<C: Cursor>(&self, it: &C) -> f64 {
        (self.cell(&it.right()) - self.cell(it)) / self.geometry.mesh().0
    }

    pub fn dy_l<C: Cursor>(&self, it: &C) -> f64 {
        (self.cell(it) - self.cell(&it.down())) / self.geometry.mesh().1
    }

    pub fn dy_r<C: Cursor>(&self, it: &C) -> f64 {
        (self.cell(&it.top()) - self.cell(it)) / self.geometry.mesh().1
    }

    pub fn dxx<C: Cursor>(&self, it: &C) -> f64 {
        let dx = self.geometry.mesh().0;
        (self.cell(&it.right()) - 2.0 * self.cell(it) + self.cell(&it.left())) / (dx * dx)
    }

    pub fn dyy<C: Cursor>(&self, it: &C) -> f64 {
        let dy = self.geometry.mesh().1;
        (self.cell(&it.top()) - 2.0 * self.cell(it) + self.cell(&it.down())) / (dy * dy)
    }
}




/**
 * Donor-cell discretization of the convective terms of the momentum
 * equations. `alpha` blends central differences (`alpha = 0`) with the
 * upwind estimate (`alpha = 1`).
 */
impl Field {

    /**
     * d(u^2)/dx at a u-node, where `self` is the horizontal velocity.
     */
    pub fn dc_udu_x<C: Cursor>(&self, it: &C, alpha: f64) -> f64 {
        let u0 = self.cell(it);
        let ur = self.cell(&it.right());
        let ul = self.cell(&it.left());
        let sr = u0 + ur;
        let sl = ul + u0;

        let central = sr * sr - sl * sl;
        let upwind = sr.abs() * (u0 - ur) - sl.abs() * (ul - u0);

        0.25 * (central + alpha * upwind) / self.geometry.mesh().0
    }

    /**
     * d(v^2)/dy at a v-node, where `self` is the vertical velocity.
     */
    pub fn dc_vdv_y<C: Cursor>(&self, it: &C, alpha: f64) -> f64 {
        let v0 = self.cell(it);
        let vt = self.cell(&it.top());
        let vd = self.cell(&it.down());
        let st = v0 + vt;
        let sd = vd + v0;

        let central = st * st - sd * sd;
        let upwind = st.abs() * (v0 - vt) - sd.abs() * (vd - v0);

        0.25 * (central + alpha * upwind) / self.geometry.mesh().1
    }

    /**
     * d(uv)/dx at a v-node, where `self` is the vertical velocity and `u` the
     * horizontal one.
     */
    pub fn dc_udv_x<C: Cursor>(&self, it: &C, alpha: f64, u: &Field) -> f64 {
        let v0 = self.cell(it);
        let vr = self.cell(&it.right());
        let vl = self.cell(&it.left());
        let ur = u.cell(it) + u.cell(&it.top());
        let ul = u.cell(&it.left()) + u.cell(&it.left().top());

        let central = ur * (v0 + vr) - ul * (vl + v0);
        let upwind = ur.abs() * (v0 - vr) - ul.abs() * (vl - v0);

        0.25 * (central + alpha * upwind) / self.geometry.mesh().0
    }

    /**
     * d(vu)/dy at a u-node, where `self` is the horizontal velocity and `v`
     * the vertical one.
     */
    pub fn dc_vdu_y<C: Cursor>(&self, it: &C, alpha: f64, v: &Field) -> f64 {
        let u0 = self.cell(it);
        let ut = self.cell(&it.top());
        let ud = self.cell(&it.down());
        let vt = v.cell(it) + v.cell(&it.right());
        let vd = v.cell(&it.down()) + v.cell(&it.down().right());

        let central = vt * (u0 + ut) - vd * (ud + u0);
        let upwind = vt.abs() * (u0 - ut) - vd.abs() * (ud - u0);

        0.25 * (central + alpha * upwind) / self.geometry.mesh().1
    }
}




/**
 * Sampling and reductions
 */
impl Field {

    /**
     * Bilinear interpolation at a physical position. Positions outside the
     * array are clamped to its edge.
     */
    pub fn interpolate(&self, position: (f64, f64)) -> f64 {
        let (dx, dy) = self.geometry.mesh();
        let (ni, nj) = self.geometry.extent();

        let x = ((position.0 + self.offset.0) / dx).max(0.0);
        let y = ((position.1 + self.offset.1) / dy).max(0.0);
        let i = (x.floor() as usize).min(ni - 2);
        let j = (y.floor() as usize).min(nj - 2);
        let a = (x - i as f64).min(1.0);
        let b = (y - j as f64).min(1.0);

        let it = Traversal::at(&self.geometry, (i, j));
        let y00 = self.cell(&it);
        let y10 = self.cell(&it.right());
        let y01 = self.cell(&it.top());
        let y11 = self.cell(&it.right().top());

        (1.0 - b) * ((1.0 - a) * y00 + a * y10) + b * ((1.0 - a) * y01 + a * y11)
    }

    pub fn max(&self) -> f64 {
        self.fold_interior(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.fold_interior(f64::INFINITY, f64::min)
    }

    pub fn abs_max(&self) -> f64 {
        self.fold_interior(0.0, |m, x| m.max(x.abs()))
    }

    pub fn print(&self) {
        println!("{}", self);
    }

    fn fold_interior<F>(&self, init: f64, f: F) -> f64
    where
        F: Fn(f64, f64) -> f64
    {
        Traversal::interior(&self.geometry)
            .positions()
            .fold(init, |m, (i, j)| f(m, self.at((i, j))))
    }
}




// ============================================================================
impl fmt::Display for Field {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let (ni, _) = self.geometry.extent();

        for row in self.data.chunks_exact(ni).rev() {
            for x in row {
                write!(fmt, "{:>10.4} ", x)?;
            }
            writeln!(fmt)?;
        }
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use approx::assert_relative_eq;
    use crate::geometry::Geometry;
    use crate::traversal::{Cursor, Traversal};
    use super::Field;

    /**
     * Write the 3x3 block (top row first) into the lower-left corner of the
     * array, ghost cells included, walking the block with neighbor steps.
     * Returns a cursor at the center of the block.
     */
    fn fill_block(field: &mut Field, block: [[f64; 3]; 3]) -> Traversal {
        let geometry = *field.geometry();
        let mut it = Traversal::new(&geometry);
        it.first();

        for j in 0..3 {
            let mut row = it.clone();
            for i in 0..3 {
                *field.cell_mut(&row) = block[2 - j][i];
                row = row.right();
            }
            it = it.top();
        }
        Traversal::at(&geometry, (1, 1))
    }

    fn sample<F: Fn(f64, f64) -> f64>(field: &mut Field, f: F) {
        let geometry = *field.geometry();
        let (dx, dy) = geometry.mesh();
        let (ox, oy) = field.offset();
        let mut it = Traversal::new(&geometry);
        it.first();
        while it.valid() {
            let (i, j) = it.pos();
            *field.cell_mut(&it) = f(i as f64 * dx - ox, j as f64 * dy - oy);
            it.next();
        }
    }

    #[test]
    fn difference_quotients_match_the_worked_example() {
        let geometry = Geometry::default();
        let (dx, dy) = geometry.mesh();
        let mut grid = Field::new(&geometry);
        let it = fill_block(&mut grid, [[3.0, 4.0, 5.0], [2.0, 3.0, 4.0], [0.0, 1.0, 3.0]]);

        assert_eq!(grid.cell(&it), 3.0);
        assert_relative_eq!(grid.dx_l(&it), 1.0 / dx);
        assert_relative_eq!(grid.dx_r(&it), 1.0 / dx);
        assert_relative_eq!(grid.dy_l(&it), 2.0 / dy);
        assert_relative_eq!(grid.dy_r(&it), 1.0 / dy);
        assert_eq!(grid.dxx(&it), 0.0);
        assert_relative_eq!(grid.dyy(&it), -1.0 / (dy * dy));

        // at the ghost corner the outward neighbor is the corner itself
        let corner = it.down().left();
        assert_eq!(corner.pos(), (0, 0));
        assert_eq!(grid.dx_l(&corner), 0.0);
        assert_relative_eq!(grid.dx_r(&corner), 1.0 / dx);
        assert_eq!(grid.dy_l(&corner), 0.0);
        assert_relative_eq!(grid.dy_r(&corner), 2.0 / dy);
        assert_relative_eq!(grid.dxx(&corner), 1.0 / (dx * dx));
        assert_relative_eq!(grid.dyy(&corner), 2.0 / (dy * dy));
    }

    #[test]
    fn interpolation_matches_the_worked_example() {
        let geometry = Geometry::default();
        let (nx, ny) = geometry.extent();
        let mut grid = Field::new(&geometry);
        fill_block(&mut grid, [[3.0, 4.0, 5.0], [2.0, 3.0, 4.0], [0.0, 1.0, 3.0]]);

        let x = 0.5 / (nx - 2) as f64;
        let y = 0.5 / (ny - 2) as f64;
        assert_eq!(grid.interpolate((x, y)), 1.5);
    }

    #[test]
    fn donor_cell_terms_match_hand_computed_values() {
        let geometry = Geometry::default();
        let (dx, dy) = geometry.mesh();
        let mut u = Field::new(&geometry);
        let mut v = Field::new(&geometry);
        let it = fill_block(&mut u, [[3.0, 4.0, 5.0], [2.0, 3.0, 4.0], [0.0, 1.0, 3.0]]);
        fill_block(&mut v, [[3.0, 4.0, 5.0], [2.0, 3.0, 4.0], [1.0, 2.0, 3.0]]);

        assert_relative_eq!(u.dc_udu_x(&it, 0.5), 23.0 / (4.0 * dx));
        assert_relative_eq!(u.dc_vdu_y(&it, 0.5, &v), 30.5 / (4.0 * dy));
        assert_relative_eq!(v.dc_udv_x(&it, 0.5, &u), 23.0 / (4.0 * dx));
        assert_relative_eq!(v.dc_vdv_y(&it, 0.5), 23.0 / (4.0 * dy));
    }

    #[test]
    fn donor_cell_terms_reduce_to_central_differences() {
        let geometry = Geometry::new((8, 8), (1.0, 1.0)).unwrap();
        let mut u = Field::new(&geometry);
        let mut v = Field::new(&geometry);
        sample(&mut u, |x, y| 1.0 + x * y);
        sample(&mut v, |x, y| 2.0 - x + y * y);
        let it = Traversal::at(&geometry, (4, 3));

        let (dx, _) = geometry.mesh();
        let central = ((u.cell(&it) + u.cell(&it.right())).powi(2)
                     - (u.cell(&it.left()) + u.cell(&it)).powi(2)) / (4.0 * dx);
        assert_relative_eq!(u.dc_udu_x(&it, 0.0), central, epsilon = 1e-12);

        // a uniform field carries no convective flux in either scheme
        let w = Field::with_value(&geometry, -1.5);
        assert_eq!(w.dc_udu_x(&it, 1.0), 0.0);
        assert_eq!(w.dc_vdv_y(&it, 1.0), 0.0);
        assert_eq!(w.dc_udv_x(&it, 1.0, &w), 0.0);
        assert_eq!(w.dc_vdu_y(&it, 1.0, &w), 0.0);
    }

    #[test]
    fn second_derivatives_converge_at_second_order() {
        use std::f64::consts::PI;

        let max_error = |n: usize| {
            let geometry = Geometry::new((n, n), (1.0, 1.0)).unwrap();
            let (dx, dy) = geometry.mesh();
            let mut field = Field::with_offset(&geometry, (0.5 * dx, 0.5 * dy));
            sample(&mut field, |x, y| (2.0 * PI * x).sin() * (PI * y).cos());

            let mut error = (0.0f64, 0.0f64);
            let mut it = Traversal::interior(&geometry);
            it.first();
            while it.valid() {
                let (i, j) = it.pos();
                let x = (i as f64 - 0.5) * dx;
                let y = (j as f64 - 0.5) * dy;
                let fxx = -4.0 * PI * PI * (2.0 * PI * x).sin() * (PI * y).cos();
                let fyy = -PI * PI * (2.0 * PI * x).sin() * (PI * y).cos();
                error.0 = error.0.max((field.dxx(&it) - fxx).abs());
                error.1 = error.1.max((field.dyy(&it) - fyy).abs());
                it.next();
            }
            error
        };

        let coarse = max_error(16);
        let fine = max_error(32);
        let order_x = (coarse.0 / fine.0).log2();
        let order_y = (coarse.1 / fine.1).log2();
        assert!((order_x - 2.0).abs() < 0.1, "dxx order {}", order_x);
        assert!((order_y - 2.0).abs() < 0.1, "dyy order {}", order_y);
    }

    #[test]
    fn interpolation_reproduces_grid_values_and_means() {
        let geometry = Geometry::new((6, 4), (3.0, 2.0)).unwrap();
        let (dx, dy) = geometry.mesh();
        let mut p = Field::with_offset(&geometry, (0.5 * dx, 0.5 * dy));
        sample(&mut p, |x, y| x * x - 3.0 * y);

        // cell (3, 2) sits at ((3 - 0.5) dx, (2 - 0.5) dy)
        let at = (2.5 * dx, 1.5 * dy);
        assert_eq!(p.interpolate(at), p.at((3, 2)));

        let mid = (3.0 * dx, 2.0 * dy);
        let mean = 0.25 * (p.at((3, 2)) + p.at((4, 2)) + p.at((3, 3)) + p.at((4, 3)));
        assert_relative_eq!(p.interpolate(mid), mean, epsilon = 1e-12);

        // the far corner of the array is reached without leaving it
        let far = (7.0 * dx - 0.5 * dx, 5.0 * dy - 0.5 * dy);
        assert_relative_eq!(p.interpolate(far), p.at((7, 5)), epsilon = 1e-12);
    }

    #[test]
    fn reductions_ignore_the_ghost_layer() {
        let geometry = Geometry::new((3, 3), (1.0, 1.0)).unwrap();
        let mut field = Field::with_value(&geometry, 100.0);
        let mut it = Traversal::interior(&geometry);
        it.first();
        while it.valid() {
            let (i, j) = it.pos();
            *field.cell_mut(&it) = i as f64 - 2.0 * j as f64;
            it.next();
        }
        assert_eq!(field.max(), 1.0);
        assert_eq!(field.min(), -5.0);
        assert_eq!(field.abs_max(), 5.0);

        field.initialize(-7.0);
        assert!(field.data().iter().all(|&x| x == -7.0));
        assert_eq!(field.abs_max(), 7.0);
    }

    #[test]
    #[should_panic]
    fn explicit_index_is_bounds_checked() {
        let geometry = Geometry::new((3, 3), (1.0, 1.0)).unwrap();
        Field::new(&geometry).at((5, 0));
    }

    #[test]
    fn display_prints_top_row_first() {
        let geometry = Geometry::new((1, 1), (1.0, 1.0)).unwrap();
        let mut field = Field::new(&geometry);
        *field.cell_mut(&Traversal::at(&geometry, (0, 2))) = 9.0;
        let dump = field.to_string();
        let first = dump.lines().next().unwrap();
        assert!(first.trim_start().starts_with("9.0000"));
        assert_eq!(dump.lines().count(), 3);
    }
}
