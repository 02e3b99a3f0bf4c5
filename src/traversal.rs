use crate::geometry::Geometry;
use crate::index_space::{range2d, IndexSpace};




/**
 * Identifier for one of the four edges of the domain
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Bottom,
    Right,
    Top,
    Left,
}




/**
 * Identifier for one of the four ghost corners of the domain
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}




// ============================================================================
impl Boundary {

    pub const ALL: [Boundary; 4] = [Boundary::Bottom, Boundary::Right, Boundary::Top, Boundary::Left];

    /**
     * Return the ghost row or column adjacent to this edge, corners
     * excluded.
     */
    pub fn index_space(self, geometry: &Geometry) -> IndexSpace {
        let (imax, jmax) = geometry.size();
        match self {
            Boundary::Bottom => range2d(1..imax + 1, 0..1),
            Boundary::Right  => range2d(imax + 1..imax + 2, 1..jmax + 1),
            Boundary::Top    => range2d(1..imax + 1, jmax + 1..jmax + 2),
            Boundary::Left   => range2d(0..1, 1..jmax + 1),
        }
    }
}

impl Corner {

    pub const ALL: [Corner; 4] = [Corner::BottomLeft, Corner::BottomRight, Corner::TopLeft, Corner::TopRight];

    pub fn index(self, geometry: &Geometry) -> (usize, usize) {
        let (imax, jmax) = geometry.size();
        match self {
            Corner::BottomLeft  => (0, 0),
            Corner::BottomRight => (imax + 1, 0),
            Corner::TopLeft     => (0, jmax + 1),
            Corner::TopRight    => (imax + 1, jmax + 1),
        }
    }
}




/**
 * A restartable cursor over a subset of the cells of a mesh array. The
 * enumeration protocol is `first`, `valid`, `pos`, `next`:
 *
 * ```ignore
 * let mut it = Traversal::interior(&geometry);
 * it.first();
 * while it.valid() {
 *     *field.cell_mut(&it) = 0.0;
 *     it.next();
 * }
 * ```
 *
 * Neighbor navigation yields a full-array cursor one cell away from the
 * current position. Navigation never leaves the array: stepping off the
 * edge returns the current cell, so the neighbor of a ghost corner in the
 * outward direction is the corner itself.
 */
pub trait Cursor {

    /// Reset to the first position of the enumerated subset.
    fn first(&mut self);

    /// Whether the cursor refers to a position in its subset.
    fn valid(&self) -> bool;

    /// Advance to the next position. A no-op once the subset is exhausted.
    fn next(&mut self);

    /// Return the current index. The cursor must be valid.
    fn pos(&self) -> (usize, usize);

    /// Return the dimensions of the full array, ghost layer included.
    fn extent(&self) -> (usize, usize);

    /// Return the linear offset of the current index in the full array.
    fn value(&self) -> usize {
        let (i, j) = self.pos();
        j * self.extent().0 + i
    }

    fn left(&self) -> Traversal {
        let (i, j) = self.pos();
        Traversal::at_extent(self.extent(), (i.saturating_sub(1), j))
    }

    fn right(&self) -> Traversal {
        let (i, j) = self.pos();
        let (ni, _) = self.extent();
        Traversal::at_extent(self.extent(), ((i + 1).min(ni - 1), j))
    }

    fn top(&self) -> Traversal {
        let (i, j) = self.pos();
        let (_, nj) = self.extent();
        Traversal::at_extent(self.extent(), (i, (j + 1).min(nj - 1)))
    }

    fn down(&self) -> Traversal {
        let (i, j) = self.pos();
        Traversal::at_extent(self.extent(), (i, j.saturating_sub(1)))
    }

    /// Restart the cursor and drain it as a standard iterator of indexes.
    fn positions(&mut self) -> Positions<'_, Self> where Self: Sized {
        self.first();
        Positions { cursor: self }
    }
}




/**
 * Iterator adapter returned by `Cursor::positions`
 */
pub struct Positions<'a, C: Cursor> {
    cursor: &'a mut C,
}

impl<'a, C: Cursor> Iterator for Positions<'a, C> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.valid() {
            let index = self.cursor.pos();
            self.cursor.next();
            Some(index)
        } else {
            None
        }
    }
}




/**
 * Cursor over a rectangular subset of the mesh array: the whole array, the
 * interior, a single corner, or (via `BoundaryTraversal`) one ghost edge.
 */
#[derive(Clone, Debug)]
pub struct Traversal {
    extent: (usize, usize),
    space: IndexSpace,
    offset: usize,
}




// ============================================================================
impl Traversal {

    /**
     * Cursor over every cell of the array, ghost layer included.
     */
    pub fn new(geometry: &Geometry) -> Self {
        let (ni, nj) = geometry.extent();
        Self::over(geometry.extent(), range2d(0..ni, 0..nj))
    }

    /**
     * Cursor over the interior cells `1..=imax` x `1..=jmax`.
     */
    pub fn interior(geometry: &Geometry) -> Self {
        let (ni, nj) = geometry.extent();
        Self::over(geometry.extent(), range2d(0..ni, 0..nj).trim_all(1))
    }

    /**
     * Single-position cursor at one of the ghost corners.
     */
    pub fn corner(geometry: &Geometry, corner: Corner) -> Self {
        let (i, j) = corner.index(geometry);
        Self::over(geometry.extent(), range2d(i..i + 1, j..j + 1))
    }

    /**
     * Full-array cursor positioned at the given index.
     */
    pub fn at(geometry: &Geometry, index: (usize, usize)) -> Self {
        Self::at_extent(geometry.extent(), index)
    }

    fn over(extent: (usize, usize), space: IndexSpace) -> Self {
        Self { extent, space, offset: 0 }
    }

    fn at_extent(extent: (usize, usize), index: (usize, usize)) -> Self {
        debug_assert!(index.0 < extent.0 && index.1 < extent.1);
        Self {
            extent,
            space: range2d(0..extent.0, 0..extent.1),
            offset: index.1 * extent.0 + index.0,
        }
    }
}

impl Cursor for Traversal {

    fn first(&mut self) {
        self.offset = 0;
    }

    fn valid(&self) -> bool {
        self.offset < self.space.len()
    }

    fn next(&mut self) {
        if self.valid() {
            self.offset += 1;
        }
    }

    fn pos(&self) -> (usize, usize) {
        debug_assert!(self.valid(), "position requested from an exhausted cursor");
        self.space.position(self.offset)
    }

    fn extent(&self) -> (usize, usize) {
        self.extent
    }
}




/**
 * Cursor over the ghost cells along one edge of the domain. Re-selecting the
 * edge restarts the enumeration. The corner accessors do not depend on the
 * selected edge.
 */
#[derive(Clone, Debug)]
pub struct BoundaryTraversal {
    geometry: Geometry,
    inner: Traversal,
}




// ============================================================================
impl BoundaryTraversal {

    pub fn new(geometry: &Geometry, boundary: Boundary) -> Self {
        Self {
            geometry: *geometry,
            inner: Traversal::over(geometry.extent(), boundary.index_space(geometry)),
        }
    }

    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.inner = Traversal::over(self.geometry.extent(), boundary.index_space(&self.geometry));
    }

    pub fn corner_bottom_left(&self) -> Traversal {
        Traversal::corner(&self.geometry, Corner::BottomLeft)
    }

    pub fn corner_bottom_right(&self) -> Traversal {
        Traversal::corner(&self.geometry, Corner::BottomRight)
    }

    pub fn corner_top_left(&self) -> Traversal {
        Traversal::corner(&self.geometry, Corner::TopLeft)
    }

    pub fn corner_top_right(&self) -> Traversal {
        Traversal::corner(&self.geometry, Corner::TopRight)
    }
}

impl Cursor for BoundaryTraversal {

    fn first(&mut self) {
        self.inner.first()
    }

    fn valid(&self) -> bool {
        self.inner.valid()
    }

    fn next(&mut self) {
        self.inner.next()
    }

    fn pos(&self) -> (usize, usize) {
        self.inner.pos()
    }

    fn extent(&self) -> (usize, usize) {
        self.inner.extent()
    }
}
