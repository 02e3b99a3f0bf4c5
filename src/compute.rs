use std::io::Write;
use log::{debug, info, warn};
use serde::Serialize;
use crate::error::Error;
use crate::field::Field;
use crate::geometry::Geometry;
use crate::parameter::Parameter;
use crate::solver::{Solver, Sor};
use crate::traversal::{Boundary, BoundaryTraversal, Cursor, Traversal};




/**
 * Summary of one completed time step
 */
#[derive(Clone, Debug)]
pub struct StepReport {
    pub time: f64,
    pub dt: f64,
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
}




/**
 * Borrowed view of the solution state, for serialization
 */
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub iteration: u64,
    pub time: f64,
    pub geometry: &'a Geometry,
    pub parameter: &'a Parameter,
    pub u: &'a Field,
    pub v: &'a Field,
    pub p: &'a Field,
}




/**
 * Time integration of the incompressible Navier-Stokes equations on a
 * staggered grid, using an explicit momentum predictor followed by a
 * pressure projection. The horizontal velocity `u` is stored on the right
 * face of each cell, the vertical velocity `v` on the top face, and the
 * pressure `p` at the cell center.
 */
pub struct Compute {
    geometry: Geometry,
    parameter: Parameter,
    solver: Box<dyn Solver>,
    time: f64,
    iteration: u64,
    u: Field,
    v: Field,
    p: Field,
    f: Field,
    g: Field,
    rhs: Field,
}




// ============================================================================
impl Compute {

    /**
     * Set up a run with a lexicographic SOR pressure solver.
     */
    pub fn new(geometry: &Geometry, parameter: &Parameter) -> Result<Self, Error> {
        let solver = Sor::new(geometry, parameter.omega)?;
        Self::with_solver(geometry, parameter, Box::new(solver))
    }

    pub fn with_solver(geometry: &Geometry, parameter: &Parameter, solver: Box<dyn Solver>) -> Result<Self, Error> {
        parameter.validate()?;

        let (dx, dy) = geometry.mesh();
        let mut u = Field::with_offset(geometry, (0.0, 0.5 * dy));
        let mut v = Field::with_offset(geometry, (0.5 * dx, 0.0));
        let mut p = Field::with_offset(geometry, (0.5 * dx, 0.5 * dy));

        p.initialize(geometry.pressure());
        geometry.update_u(&mut u);
        geometry.update_v(&mut v);

        Ok(Self {
            geometry: *geometry,
            parameter: parameter.clone(),
            solver,
            time: 0.0,
            iteration: 0,
            f: u.clone(),
            g: v.clone(),
            rhs: Field::with_offset(geometry, (0.5 * dx, 0.5 * dy)),
            u,
            v,
            p,
        })
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn u(&self) -> &Field {
        &self.u
    }

    pub fn v(&self) -> &Field {
        &self.v
    }

    pub fn p(&self) -> &Field {
        &self.p
    }

    /**
     * Advance the solution by one time step. The step size is the largest
     * one admitted by the stability conditions (scaled by `tau`), and never
     * exceeds `parameter.dt`.
     */
    pub fn time_step(&mut self, verbose: bool) -> StepReport {
        let dt = self.time_step_size();

        self.geometry.update_u(&mut self.u);
        self.geometry.update_v(&mut self.v);
        self.momentum_eq(dt);
        self.rhs_eq(dt);

        let (iterations, residual) = self.solve_pressure();
        let converged = residual < self.parameter.eps;

        if !converged {
            warn!(
                "pressure solve stopped after {} cycles with residual {:.3e} (eps = {:.3e})",
                iterations, residual, self.parameter.eps);
        }

        self.new_vel(dt);
        self.geometry.update_u(&mut self.u);
        self.geometry.update_v(&mut self.v);

        self.time += dt;
        self.iteration += 1;

        if verbose {
            info!("[{}] t={:.4} dt={:.3e} cycles={} res={:.3e}", self.iteration, self.time, dt, iterations, residual);
        } else {
            debug!("[{}] t={:.4} dt={:.3e} cycles={} res={:.3e}", self.iteration, self.time, dt, iterations, residual);
        }

        StepReport { time: self.time, dt, iterations, residual, converged }
    }

    /**
     * Velocity magnitude at the cell centers.
     */
    pub fn velocity(&self) -> Field {
        let (dx, dy) = self.geometry.mesh();
        let mut speed = Field::with_offset(&self.geometry, (0.5 * dx, 0.5 * dy));
        let mut it = Traversal::interior(&self.geometry);

        it.first();
        while it.valid() {
            let (i, j) = it.pos();
            let x = (i as f64 - 0.5) * dx;
            let y = (j as f64 - 0.5) * dy;
            let u = self.u.interpolate((x, y));
            let v = self.v.interpolate((x, y));
            *speed.cell_mut(&it) = (u * u + v * v).sqrt();
            it.next();
        }
        speed
    }

    /**
     * Vorticity `du/dy - dv/dx` at the upper-right corner of each interior
     * cell.
     */
    pub fn vorticity(&self) -> Field {
        let mut zeta = Field::new(&self.geometry);
        let mut it = Traversal::interior(&self.geometry);

        it.first();
        while it.valid() {
            *zeta.cell_mut(&it) = self.u.dy_r(&it) - self.v.dx_r(&it);
            it.next();
        }
        zeta
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            iteration: self.iteration,
            time: self.time,
            geometry: &self.geometry,
            parameter: &self.parameter,
            u: &self.u,
            v: &self.v,
            p: &self.p,
        }
    }

    /**
     * Write the solution state as CBOR.
     */
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<(), Error> {
        ciborium::ser::into_writer(&self.snapshot(), writer).map_err(|e| Error::Snapshot(format!("{:?}", e)))
    }
}




// ============================================================================
impl Compute {

    fn time_step_size(&self) -> f64 {
        let param = &self.parameter;

        if param.tau <= 0.0 {
            return param.dt;
        }
        let (dx, dy) = self.geometry.mesh();
        let mut limit = 0.5 * param.re / (1.0 / (dx * dx) + 1.0 / (dy * dy));
        let umax = self.u.abs_max();
        let vmax = self.v.abs_max();

        if umax > 0.0 {
            limit = limit.min(dx / umax);
        }
        if vmax > 0.0 {
            limit = limit.min(dy / vmax);
        }
        (param.tau * limit).min(param.dt)
    }

    /**
     * Explicit momentum predictor `F`, `G`. On the walls, the predictor equals
     * the wall velocity so that the pressure equation sees no flux there.
     */
    fn momentum_eq(&mut self, dt: f64) {
        let alpha = self.parameter.alpha;
        let re = self.parameter.re;
        let (u, v) = (&self.u, &self.v);
        let mut it = Traversal::interior(&self.geometry);

        it.first();
        while it.valid() {
            let diffusion_u = (u.dxx(&it) + u.dyy(&it)) / re;
            let diffusion_v = (v.dxx(&it) + v.dyy(&it)) / re;
            let convection_u = u.dc_udu_x(&it, alpha) + u.dc_vdu_y(&it, alpha, v);
            let convection_v = v.dc_udv_x(&it, alpha, u) + v.dc_vdv_y(&it, alpha);

            *self.f.cell_mut(&it) = u.cell(&it) + dt * (diffusion_u - convection_u);
            *self.g.cell_mut(&it) = v.cell(&it) + dt * (diffusion_v - convection_v);
            it.next();
        }

        let mut it = BoundaryTraversal::new(&self.geometry, Boundary::Left);
        for boundary in Boundary::ALL.iter() {
            it.set_boundary(*boundary);
            it.first();

            while it.valid() {
                match boundary {
                    Boundary::Left => {
                        *self.f.cell_mut(&it) = u.cell(&it);
                    }
                    Boundary::Right => {
                        let wall = it.left();
                        *self.f.cell_mut(&wall) = u.cell(&wall);
                    }
                    Boundary::Bottom => {
                        *self.g.cell_mut(&it) = v.cell(&it);
                    }
                    Boundary::Top => {
                        let wall = it.down();
                        *self.g.cell_mut(&wall) = v.cell(&wall);
                    }
                }
                it.next();
            }
        }
    }

    /**
     * Right-hand side of the pressure equation: the divergence of the
     * predicted velocity, over `dt`.
     */
    fn rhs_eq(&mut self, dt: f64) {
        let mut it = Traversal::interior(&self.geometry);

        it.first();
        while it.valid() {
            *self.rhs.cell_mut(&it) = (self.f.dx_l(&it) + self.g.dy_l(&it)) / dt;
            it.next();
        }
    }

    /**
     * Relax the pressure until the residual drops below `eps`, or `iter_max`
     * cycles have run. Boundary values are refreshed before every cycle.
     */
    fn solve_pressure(&mut self) -> (usize, f64) {
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        while iterations < self.parameter.iter_max {
            self.geometry.update_p(&mut self.p);
            residual = self.solver.cycle(&mut self.p, &self.rhs);
            iterations += 1;

            if residual < self.parameter.eps {
                break;
            }
        }
        self.geometry.update_p(&mut self.p);
        (iterations, residual)
    }

    fn new_vel(&mut self, dt: f64) {
        let mut it = Traversal::interior(&self.geometry);

        it.first();
        while it.valid() {
            *self.u.cell_mut(&it) = self.f.cell(&it) - dt * self.p.dx_r(&it);
            *self.v.cell_mut(&it) = self.g.cell(&it) - dt * self.p.dy_r(&it);
            it.next();
        }
    }
}
