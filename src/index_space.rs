use core::ops::Range;




/**
 * Represents a rectangular region in the discrete index space of a mesh
 * array, ghost layer included.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpace {
    di: Range<usize>,
    dj: Range<usize>,
}




/**
 * Describes a rectangular index space. Traversal is row-major with the
 * first (x) index increasing fastest, matching the memory layout of a
 * `Field`.
 */
impl IndexSpace {


    pub fn new(di: Range<usize>, dj: Range<usize>) -> Self {

        assert!(
            di.start <= di.end && dj.start <= dj.end,
            "index space has negative volume");

        Self { di, dj }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize) {
        (self.di.end - self.di.start, self.dj.end - self.dj.start)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m) = self.dim();
        l * m
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Trim this index space by the given number of elements on each axis.
     */
    pub fn trim_all(&self, delta: usize) -> Self {
        Self::new(
            self.di.start + delta .. self.di.end - delta,
            self.dj.start + delta .. self.dj.end - delta)
    }


    /**
     * Return the index at the given traversal offset. The offset must be
     * less than `len()`.
     */
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let (l, _) = self.dim();
        debug_assert!(offset < self.len());
        (self.di.start + offset % l, self.dj.start + offset / l)
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range2d(di: Range<usize>, dj: Range<usize>) -> IndexSpace {
    IndexSpace::new(di, dj)
}
