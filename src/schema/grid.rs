//! Grid data model for one simulation time step.

/// One grid element: water height and 2D momentum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
    /// Water height (or wall height in the static grid).
    pub h: f32,
    /// Momentum along X.
    pub qx: f32,
    /// Momentum along Y.
    pub qy: f32,
}

impl Cell {
    pub fn new(x: usize, y: usize, h: f32, qx: f32, qy: f32) -> Self {
        Self { x, y, h, qx, qy }
    }

    /// Inspector label with 1-based coordinates, as shown when hovering a cell.
    pub fn describe(&self) -> String {
        format!(
            "({}, {}): h: {}, qx: {}, qy: {}",
            self.x + 1,
            self.y + 1,
            self.h,
            self.qx,
            self.qy
        )
    }
}

/// Rectangular array of cells.
///
/// Cells are stored row-major with indexing `[y * width + x]`. Dimensions are
/// fixed at construction; every row holds exactly `width` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major height and momentum fields.
    ///
    /// All three slices must hold `width * height` values.
    pub fn from_fields(
        width: usize,
        height: usize,
        heights: &[f32],
        qx: &[f32],
        qy: &[f32],
    ) -> Self {
        debug_assert_eq!(heights.len(), width * height);
        debug_assert_eq!(qx.len(), width * height);
        debug_assert_eq!(qy.len(), width * height);

        let cells = (0..width * height)
            .map(|i| Cell::new(i % width, i / width, heights[i], qx[i], qy[i]))
            .collect();

        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid with every height set to `h` and zero momentum.
    pub fn filled(width: usize, height: usize, h: f32) -> Self {
        let cells = (0..width * height)
            .map(|i| Cell::new(i % width, i / width, h, 0.0, 0.0))
            .collect();

        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total cell count (width * height).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Get the cell at (x, y).
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.idx(x, y)]
    }

    /// Set the height of the cell at (x, y).
    ///
    /// Only used while constructing static grids; frame grids are never mutated.
    pub(crate) fn set_height(&mut self, x: usize, y: usize, h: f32) {
        let i = self.idx(x, y);
        self.cells[i].h = h;
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Sum of all heights.
    pub fn total_volume(&self) -> f32 {
        self.cells.iter().map(|c| c.h).sum()
    }

    /// Largest height in the grid (0 for an empty grid).
    pub fn max_height(&self) -> f32 {
        self.cells.iter().map(|c| c.h).fold(0.0, f32::max)
    }

    /// Number of cells holding at least `threshold` of water.
    pub fn wet_cells(&self, threshold: f32) -> usize {
        self.cells.iter().filter(|c| c.h >= threshold).count()
    }
}
