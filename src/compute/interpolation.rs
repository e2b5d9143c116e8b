//! Wall-aware interpolation of surface heights at cell corners.
//!
//! Cell heights live at cell centers. The surface mesh needs heights at the
//! corners shared by up to four cells, which are blended bilinearly unless a
//! neighbor is solid, in which case the water side is used unmodified.

use crate::schema::Grid;

/// Heights below this are treated as dry.
pub const NEAR_ZERO_HEIGHT: f32 = 1e-4;

/// Height used for dry cells so they render as a sliver below the floor.
pub const DRY_SURFACE_HEIGHT: f32 = -0.01;

/// Per-cell solid flag derived from the static grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WallMask {
    width: usize,
    height: usize,
    walls: Vec<bool>,
}

impl WallMask {
    /// A cell is a wall when its static height is above zero.
    pub fn from_static_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            walls: grid.cells().iter().map(|c| c.h > 0.0).collect(),
        }
    }

    /// Mask without any walls.
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            walls: vec![false; width * height],
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

    #[inline]
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.walls[y * self.width + x]
    }

    /// Number of wall cells.
    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|&&w| w).count()
    }
}

/// Linear blend: a * (1 - w) + b * w
#[inline]
pub fn lerp(a: f32, b: f32, w: f32) -> f32 {
    a * (1.0 - w) + b * w
}

/// Remap near-empty heights to [`DRY_SURFACE_HEIGHT`].
#[inline]
pub fn shift_near_zero_height(h: f32) -> f32 {
    if h < NEAR_ZERO_HEIGHT {
        DRY_SURFACE_HEIGHT
    } else {
        h
    }
}

/// Blend two samples, substituting the open side when the other is solid.
#[inline]
fn blend_open(a: f32, a_wall: bool, b: f32, b_wall: bool, w: f32) -> f32 {
    if a_wall {
        b
    } else if b_wall {
        a
    } else {
        lerp(a, b, w)
    }
}

/// Surface height at corner (x, y), for `0 <= x <= width` and `0 <= y <= height`.
///
/// Corner (x, y) is the top-left corner of cell (x, y). Border corners clamp
/// to the nearest cell center instead of extrapolating.
pub fn corner_height(x: usize, y: usize, grid: &Grid, walls: &WallMask) -> f32 {
    let xc = x as f32 - 0.5;
    let yc = y as f32 - 0.5;

    let x_min = xc.floor().max(0.0) as usize;
    let x_max = (xc.ceil().max(0.0) as usize).min(grid.width() - 1);
    let y_min = yc.floor().max(0.0) as usize;
    let y_max = (yc.ceil().max(0.0) as usize).min(grid.height() - 1);

    let top_left = grid.cell(x_min, y_min).h;
    let top_right = grid.cell(x_max, y_min).h;
    let bottom_left = grid.cell(x_min, y_max).h;
    let bottom_right = grid.cell(x_max, y_max).h;

    let top_left_wall = walls.is_wall(x_min, y_min);
    let top_right_wall = walls.is_wall(x_max, y_min);
    let bottom_left_wall = walls.is_wall(x_min, y_max);
    let bottom_right_wall = walls.is_wall(x_max, y_max);

    let xw = xc - xc.trunc();
    let yw = yc - yc.trunc();

    let top = blend_open(top_left, top_left_wall, top_right, top_right_wall, xw);
    let bottom = blend_open(
        bottom_left,
        bottom_left_wall,
        bottom_right,
        bottom_right_wall,
        xw,
    );

    // A row only counts as solid when both of its cells are.
    let top_wall = top_left_wall && top_right_wall;
    let bottom_wall = bottom_left_wall && bottom_right_wall;

    blend_open(top, top_wall, bottom, bottom_wall, yw)
}
