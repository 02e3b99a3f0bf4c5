use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::field::Field;
use crate::traversal::{Boundary, BoundaryTraversal, Corner, Cursor, Traversal};




/**
 * The rectangular domain of a driven-cavity run: number of interior cells,
 * physical extent, and the lid velocity and reference pressure used by the
 * boundary conditions. Immutable for the lifetime of a run.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    size: (usize, usize),
    length: (f64, f64),
    velocity: (f64, f64),
    pressure: f64,
}




// ============================================================================
impl Default for Geometry {
    fn default() -> Self {
        Self {
            size: (128, 128),
            length: (1.0, 1.0),
            velocity: (1.0, 0.0),
            pressure: 0.0,
        }
    }
}




// ============================================================================
impl Geometry {

    pub fn new(size: (usize, usize), length: (f64, f64)) -> Result<Self, Error> {
        let geometry = Self { size, length, ..Self::default() };
        geometry.validate()?;
        Ok(geometry)
    }

    /**
     * Parse and validate a geometry from JSON text. Keys left out take their
     * default values.
     */
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let geometry: Self = serde_json::from_str(text).map_err(|e| Error::Load(e.to_string()))?;
        geometry.validate()?;
        Ok(geometry)
    }

    /**
     * Read a geometry from a JSON file.
     */
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /**
     * Return a copy of this geometry with a different number of cells.
     */
    pub fn with_size(self, size: (usize, usize)) -> Result<Self, Error> {
        let geometry = Self { size, ..self };
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> Result<(), Error> {
        let (size, length) = (self.size, self.length);

        if size.0 == 0 || size.1 == 0 {
            return Err(Error::InvalidGeometry(format!("size must be positive, got {:?}", size)));
        }
        if !(length.0 > 0.0 && length.1 > 0.0 && length.0.is_finite() && length.1.is_finite()) {
            return Err(Error::InvalidGeometry(format!("length must be positive, got {:?}", length)));
        }
        if !(self.velocity.0.is_finite() && self.velocity.1.is_finite() && self.pressure.is_finite()) {
            return Err(Error::InvalidGeometry(format!("lid velocity {:?} and pressure {} must be finite", self.velocity, self.pressure)));
        }
        Ok(())
    }

    pub fn with_velocity(self, velocity: (f64, f64)) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_pressure(self, pressure: f64) -> Self {
        Self { pressure, ..self }
    }

    /**
     * Return the number of interior cells on each axis.
     */
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn length(&self) -> (f64, f64) {
        self.length
    }

    /**
     * Return the cell spacing on each axis.
     */
    pub fn mesh(&self) -> (f64, f64) {
        (self.length.0 / self.size.0 as f64, self.length.1 / self.size.1 as f64)
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /**
     * Return the dimensions of the array including one ghost layer on each
     * side.
     */
    pub fn extent(&self) -> (usize, usize) {
        (self.size.0 + 2, self.size.1 + 2)
    }

    pub fn num_cells(&self) -> usize {
        let (ni, nj) = self.extent();
        ni * nj
    }

    pub fn num_interior(&self) -> usize {
        self.size.0 * self.size.1
    }
}




/**
 * Boundary conditions of the lid-driven cavity. The horizontal velocity `u`
 * lives on vertical cell faces, the vertical velocity `v` on horizontal
 * faces, and the pressure at cell centers.
 */
impl Geometry {

    /**
     * No-slip walls, with the top wall moving at the lid velocity.
     */
    pub fn update_u(&self, u: &mut Field) {
        let mut it = BoundaryTraversal::new(self, Boundary::Left);

        // walls before lid and floor, so the mirrored values see u = 0 at the corners
        for boundary in [Boundary::Left, Boundary::Right, Boundary::Bottom, Boundary::Top].iter() {
            it.set_boundary(*boundary);
            it.first();

            while it.valid() {
                match boundary {
                    Boundary::Bottom => {
                        *u.cell_mut(&it) = -u.cell(&it.top());
                    }
                    Boundary::Top => {
                        *u.cell_mut(&it) = 2.0 * self.velocity.0 - u.cell(&it.down());
                    }
                    Boundary::Left => {
                        *u.cell_mut(&it) = 0.0;
                    }
                    Boundary::Right => {
                        *u.cell_mut(&it) = 0.0;
                        *u.cell_mut(&it.left()) = 0.0;
                    }
                }
                it.next();
            }
        }
    }

    /**
     * No-slip walls; the lid only moves tangentially.
     */
    pub fn update_v(&self, v: &mut Field) {
        let mut it = BoundaryTraversal::new(self, Boundary::Bottom);

        for boundary in [Boundary::Bottom, Boundary::Top, Boundary::Left, Boundary::Right].iter() {
            it.set_boundary(*boundary);
            it.first();

            while it.valid() {
                match boundary {
                    Boundary::Bottom => {
                        *v.cell_mut(&it) = 0.0;
                    }
                    Boundary::Top => {
                        *v.cell_mut(&it) = 0.0;
                        *v.cell_mut(&it.down()) = 0.0;
                    }
                    Boundary::Left => {
                        *v.cell_mut(&it) = -v.cell(&it.right());
                    }
                    Boundary::Right => {
                        *v.cell_mut(&it) = -v.cell(&it.left());
                    }
                }
                it.next();
            }
        }
    }

    /**
     * Homogeneous Neumann condition on every wall. Corners copy their
     * diagonal interior neighbor.
     */
    pub fn update_p(&self, p: &mut Field) {
        let mut it = BoundaryTraversal::new(self, Boundary::Bottom);

        for boundary in Boundary::ALL.iter() {
            it.set_boundary(*boundary);
            it.first();

            while it.valid() {
                let inner = match boundary {
                    Boundary::Bottom => it.top(),
                    Boundary::Top    => it.down(),
                    Boundary::Left   => it.right(),
                    Boundary::Right  => it.left(),
                };
                *p.cell_mut(&it) = p.cell(&inner);
                it.next();
            }
        }

        for corner in Corner::ALL.iter() {
            let it = Traversal::corner(self, *corner);
            let inner = match corner {
                Corner::BottomLeft  => it.right().top(),
                Corner::BottomRight => it.left().top(),
                Corner::TopLeft     => it.right().down(),
                Corner::TopRight    => it.left().down(),
            };
            *p.cell_mut(&it) = p.cell(&inner);
        }
    }
}
