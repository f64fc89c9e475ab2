//! Index arithmetic for tensor-product grids.

use hfd_core::Size;

/// Maps between multi-dimensional grid coordinates and a flat index space.
///
/// The first dimension is the fastest-running one: for a two-dimensional
/// `nx × nv` grid the flat index of node `(ix, iv)` is `ix + iv * nx`.
#[derive(Debug, Clone)]
pub struct FdmLinearOpLayout {
    dims: Vec<Size>,
    spacing: Vec<Size>,
    size: Size,
}

impl FdmLinearOpLayout {
    /// Build a layout from the per-dimension grid sizes.
    pub fn new(dims: Vec<Size>) -> Self {
        let mut spacing = Vec::with_capacity(dims.len());
        let mut size = 1;
        for &d in &dims {
            spacing.push(size);
            size *= d;
        }
        Self { dims, spacing, size }
    }

    /// Total number of grid nodes.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of dimensions.
    pub fn dim(&self) -> Size {
        self.dims.len()
    }

    /// Grid size along dimension `d`.
    pub fn dim_size(&self, d: Size) -> Size {
        self.dims[d]
    }

    /// Flat-index stride of dimension `d`.
    pub fn spacing(&self, d: Size) -> Size {
        self.spacing[d]
    }

    /// Coordinate of flat index `i` along dimension `d`.
    pub fn coordinate(&self, i: Size, d: Size) -> Size {
        (i / self.spacing[d]) % self.dims[d]
    }

    /// Flat index of the given coordinates.
    pub fn index(&self, coords: &[Size]) -> Size {
        coords
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Flat index of the node `offset` steps away from `i` along dimension
    /// `d`, or `None` if that neighbour falls outside the grid.
    pub fn neighbour(&self, i: Size, d: Size, offset: isize) -> Option<Size> {
        let c = self.coordinate(i, d) as isize + offset;
        if c < 0 || c >= self.dims[d] as isize {
            None
        } else {
            Some((i as isize + offset * self.spacing[d] as isize) as Size)
        }
    }

    /// Iterate over the flat indices of all nodes with coordinate zero along
    /// dimension `d`, i.e. one representative per grid line of that dimension.
    pub fn line_starts(&self, d: Size) -> Vec<Size> {
        (0..self.size)
            .filter(|&i| self.coordinate(i, d) == 0)
            .collect()
    }
}
