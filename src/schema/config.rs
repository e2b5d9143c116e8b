//! Configuration types for replayed simulations.
//!
//! These mirror the JSON files written next to the solver output, so field
//! names follow its camelCase convention.

use serde::{Deserialize, Serialize};

use super::Grid;

/// Playback parameters of one recorded simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Frames recorded per simulated second.
    pub fps: u32,
    /// Simulated duration in seconds.
    pub seconds: u32,
    /// True if each frame lives in its own `<index>.txt` file,
    /// false if all frames are concatenated in one combined file.
    #[serde(default)]
    pub separate_files: bool,
    /// Grid width in cells. Needed only when walls come from a builder config.
    #[serde(default)]
    pub width: Option<usize>,
    /// Grid height in cells. Needed only when walls come from a builder config.
    #[serde(default)]
    pub height: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            seconds: 10,
            separate_files: true,
            width: Some(64),
            height: Some(64),
        }
    }
}

impl SimulationConfig {
    /// Number of recorded frames, including the initial state.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.seconds as usize * self.fps as usize + 1
    }

    /// Grid dimensions if both are configured.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.width.zip(self.height)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Settings shared by every simulation under a resource root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Name of the simulation to replay.
    pub name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            name: "dam_break".to_string(),
        }
    }
}

/// Wall layout used to synthesize the static grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Wall boxes, applied in order.
    #[serde(default)]
    pub wall: Vec<WallBox>,
}

/// Axis-aligned block of wall cells; both corners are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallBox {
    /// (x, y) of the first cell.
    pub top_left: [usize; 2],
    /// (x, y) of the last cell.
    pub bottom_right: [usize; 2],
    /// Wall height. Any value above zero marks the cells as solid.
    pub height: f32,
}

impl BuilderConfig {
    /// Rasterize the wall boxes into a static grid of the given size.
    ///
    /// Later boxes overwrite earlier ones where they overlap.
    pub fn build_static_grid(&self, width: usize, height: usize) -> Result<Grid, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }

        let mut grid = Grid::filled(width, height, 0.0);

        for (i, wall) in self.wall.iter().enumerate() {
            let [x0, y0] = wall.top_left;
            let [x1, y1] = wall.bottom_right;
            if x0 > x1 || y0 > y1 || x1 >= width || y1 >= height {
                return Err(ConfigError::InvalidWallBox { index: i });
            }
            for y in y0..=y1 {
                for x in x0..=x1 {
                    grid.set_height(x, y, wall.height);
                }
            }
        }

        Ok(grid)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Frame rate must be non-zero")]
    InvalidFrameRate,
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Wall box {index} is inverted or lies outside the grid")]
    InvalidWallBox { index: usize },
}
