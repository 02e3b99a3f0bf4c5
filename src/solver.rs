use std::sync::{Mutex, PoisonError};
use rayon::prelude::*;
use crate::error::Error;
use crate::field::Field;
use crate::geometry::Geometry;
use crate::traversal::{Cursor, Traversal};




/**
 * Interface for an iterative relaxation scheme applied to the discrete
 * Poisson equation `laplace(p) = rhs` on the interior cells of a field.
 * Ghost values of `field` are boundary data: they are read, never written.
 *
 * A call to `cycle` performs a single relaxation sweep in place and returns
 * the RMS residual afterwards. Solvers keep no observable state between
 * calls; the caller owns the outer iteration and its stopping criterion.
 */
pub trait Solver: Send + Sync {
    fn cycle(&self, field: &mut Field, rhs: &Field) -> f64;
}




/**
 * Return the root-mean-square of `laplace(p) - rhs` over the interior cells.
 */
pub fn residual(field: &Field, rhs: &Field) -> f64 {
    let mut it = Traversal::interior(field.geometry());
    let mut sum = 0.0;

    it.first();
    while it.valid() {
        let r = field.dxx(&it) + field.dyy(&it) - rhs.cell(&it);
        sum += r * r;
        it.next();
    }
    (sum / field.geometry().num_interior() as f64).sqrt()
}




/**
 * Coefficients of the five-point update shared by the SOR variants.
 */
#[derive(Clone, Copy, Debug)]
struct Stencil {
    omega: f64,
    cx: f64,
    cy: f64,
    scale: f64,
}

impl Stencil {
    fn new(geometry: &Geometry, omega: f64) -> Result<Self, Error> {
        if !(omega > 0.0 && omega < 2.0) {
            return Err(Error::InvalidRelaxation(omega));
        }
        let (dx, dy) = geometry.mesh();
        let cx = 1.0 / (dx * dx);
        let cy = 1.0 / (dy * dy);
        Ok(Self { omega, cx, cy, scale: omega / (2.0 * cx + 2.0 * cy) })
    }

    #[inline]
    fn update(&self, p: f64, w: f64, e: f64, s: f64, n: f64, rhs: f64) -> f64 {
        (1.0 - self.omega) * p + self.scale * ((w + e) * self.cx + (s + n) * self.cy - rhs)
    }
}




/**
 * Successive over-relaxation with lexicographic (Gauss-Seidel) ordering.
 * Each update reads neighbors already updated in the same sweep, so the
 * iterates depend on the traversal order.
 */
#[derive(Clone, Debug)]
pub struct Sor {
    geometry: Geometry,
    stencil: Stencil,
}




// ============================================================================
impl Sor {

    /**
     * Create a solver for the given mesh. The relaxation factor must lie in
     * the open interval (0, 2).
     */
    pub fn new(geometry: &Geometry, omega: f64) -> Result<Self, Error> {
        Ok(Self { geometry: *geometry, stencil: Stencil::new(geometry, omega)? })
    }

    pub fn omega(&self) -> f64 {
        self.stencil.omega
    }
}

impl Solver for Sor {

    fn cycle(&self, field: &mut Field, rhs: &Field) -> f64 {
        debug_assert_eq!(field.geometry().extent(), self.geometry.extent());

        let mut it = Traversal::interior(&self.geometry);
        it.first();

        while it.valid() {
            let p = self.stencil.update(
                field.cell(&it),
                field.cell(&it.left()),
                field.cell(&it.right()),
                field.cell(&it.down()),
                field.cell(&it.top()),
                rhs.cell(&it));
            *field.cell_mut(&it) = p;
            it.next();
        }
        residual(field, rhs)
    }
}




/**
 * Successive over-relaxation with red-black (checkerboard) ordering. Cells
 * of one color only neighbor cells of the other, so each half sweep updates
 * its color in parallel over rows. The result does not depend on the number
 * of threads. Iterates differ from `Sor`, the converged solution does not.
 *
 * New values of a color are first written to a scratch array which is kept
 * between cycles, then copied into the field.
 */
#[derive(Debug)]
pub struct RedBlackSor {
    geometry: Geometry,
    stencil: Stencil,
    scratch: Mutex<Vec<f64>>,
}




// ============================================================================
impl RedBlackSor {

    pub fn new(geometry: &Geometry, omega: f64) -> Result<Self, Error> {
        Ok(Self {
            geometry: *geometry,
            stencil: Stencil::new(geometry, omega)?,
            scratch: Mutex::new(vec![0.0; geometry.num_cells()]),
        })
    }

    pub fn omega(&self) -> f64 {
        self.stencil.omega
    }

    fn half_sweep(&self, field: &mut Field, rhs: &Field, scratch: &mut [f64], color: usize) {
        let (ni, _) = self.geometry.extent();
        let (imax, jmax) = self.geometry.size();
        let stencil = self.stencil;
        let first = move |j: usize| if (1 + j) % 2 == color { 1 } else { 2 };

        let p = field.data();
        let b = rhs.data();

        scratch
        .par_chunks_mut(ni)
        .enumerate()
        .skip(1)
        .take(jmax)
        .for_each(|(j, row)| {
            for i in (first(j)..=imax).step_by(2) {
                let k = j * ni + i;
                row[i] = stencil.update(p[k], p[k - 1], p[k + 1], p[k - ni], p[k + ni], b[k]);
            }
        });

        let updated: &[f64] = scratch;

        field
        .data_mut()
        .par_chunks_mut(ni)
        .enumerate()
        .skip(1)
        .take(jmax)
        .for_each(|(j, row)| {
            for i in (first(j)..=imax).step_by(2) {
                row[i] = updated[j * ni + i];
            }
        });
    }
}

impl Solver for RedBlackSor {

    fn cycle(&self, field: &mut Field, rhs: &Field) -> f64 {
        debug_assert_eq!(field.geometry().extent(), self.geometry.extent());

        let mut scratch = self.scratch.lock().unwrap_or_else(PoisonError::into_inner);
        scratch.resize(field.data().len(), 0.0);

        self.half_sweep(field, rhs, &mut scratch[..], 0);
        self.half_sweep(field, rhs, &mut scratch[..], 1);
        residual(field, rhs)
    }
}
