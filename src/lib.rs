//! Cavity is a finite-difference solver for the incompressible Navier-Stokes
//! equations on a uniform, staggered, rectangular grid, in the style of the
//! classic lid-driven cavity codes. Each time step computes an explicit
//! momentum predictor, with donor-cell differencing of the convective terms,
//! and then projects it onto a divergence-free field by solving a pressure
//! Poisson equation with successive over-relaxation.
//!
//! The numerical core is three pieces: traversal cursors which enumerate
//! interior, boundary and corner cells of the mesh array and step to neighbor
//! cells; scalar fields carrying difference operators evaluated at a cursor;
//! and relaxation solvers for the pressure equation. `Compute` sequences
//! them into a time integrator.

pub mod compute;
pub mod error;
pub mod field;
pub mod geometry;
pub mod index_space;
pub mod parameter;
pub mod solver;
pub mod traversal;

pub use compute::Compute;
pub use error::Error;
pub use field::Field;
pub use geometry::Geometry;
pub use parameter::Parameter;
pub use solver::{RedBlackSor, Solver, Sor};
pub use traversal::{Boundary, BoundaryTraversal, Corner, Cursor, Traversal};
