//! Text snapshot format written by the shallow-water solver.
//!
//! ```text
//! 0.1 0.2 0.3      <- heights, one row per line
//! 0.4 0.5 0.6
//! -                <- block separator
//! 0 0 0            <- momentum X (optional, together with Y)
//! 0 0 0
//! -
//! 0 0 0            <- momentum Y
//! 0 0 0
//! ```
//!
//! A combined file concatenates snapshots, each terminated by a line that
//! starts with `--`.

use std::fmt::Write as _;
use std::io;

use crate::schema::{Cell, Grid};

/// First token of a line separating blocks inside one snapshot.
pub const BLOCK_SEPARATOR: &str = "-";

/// Prefix of a line terminating one snapshot in a combined file.
pub const FRAME_TERMINATOR: &str = "--";

const BLOCK_NAMES: [&str; 3] = ["heights", "velocity-x", "velocity-y"];

/// Snapshot parse errors. Every variant means the grid is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Snapshot has no height rows")]
    MissingHeights,
    #[error("Invalid number {token:?} on line {line}")]
    InvalidToken { line: usize, token: String },
    #[error("Row {row} of {block} block has {found} columns, expected {expected}")]
    RaggedRow {
        block: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{block} block has {found} rows, expected {expected}")]
    RowCountMismatch {
        block: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Velocity-x block has no matching velocity-y block")]
    UnpairedVelocity,
}

/// Parse a snapshot from its full text.
pub fn parse_snapshot(text: &str) -> Result<Grid, ParseError> {
    parse_lines(text.lines())
}

/// Parse a snapshot from a sequence of lines.
///
/// Blank lines are ignored and separator lines before the first data row are
/// skipped. After that every separator starts the next block, so a repeated
/// separator leaves an empty block behind. Momentum is read only when the
/// velocity-x block has rows; otherwise it is zero. Blocks after the third
/// are ignored.
pub fn parse_lines<I, S>(lines: I) -> Result<Grid, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blocks: [Vec<Vec<f32>>; 3] = Default::default();
    let mut block = 0usize;
    let mut seen_data = false;

    for (n, line) in lines.into_iter().enumerate() {
        let mut tokens = line.as_ref().split_whitespace().peekable();
        let Some(&first) = tokens.peek() else {
            continue;
        };

        if first == BLOCK_SEPARATOR {
            if seen_data {
                block += 1;
            }
            continue;
        }

        seen_data = true;

        if block >= blocks.len() {
            continue;
        }

        let row = tokens
            .map(|t| {
                t.parse::<f32>().map_err(|_| ParseError::InvalidToken {
                    line: n + 1,
                    token: t.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        blocks[block].push(row);
    }

    let [heights, vel_x, vel_y] = blocks;

    let height = heights.len();
    if height == 0 {
        return Err(ParseError::MissingHeights);
    }
    let width = heights[0].len();

    let heights = flatten_block(heights, 0, width, height)?;
    let (vel_x, vel_y) = if vel_x.is_empty() {
        (vec![0.0; width * height], vec![0.0; width * height])
    } else if vel_y.is_empty() {
        return Err(ParseError::UnpairedVelocity);
    } else {
        (
            flatten_block(vel_x, 1, width, height)?,
            flatten_block(vel_y, 2, width, height)?,
        )
    };

    Ok(Grid::from_fields(width, height, &heights, &vel_x, &vel_y))
}

/// Check a block's shape and flatten it row-major.
fn flatten_block(
    rows: Vec<Vec<f32>>,
    block: usize,
    width: usize,
    height: usize,
) -> Result<Vec<f32>, ParseError> {
    if rows.len() != height {
        return Err(ParseError::RowCountMismatch {
            block: BLOCK_NAMES[block],
            expected: height,
            found: rows.len(),
        });
    }

    let mut flat = Vec::with_capacity(width * height);
    for (y, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(ParseError::RaggedRow {
                block: BLOCK_NAMES[block],
                row: y,
                expected: width,
                found: row.len(),
            });
        }
        flat.extend(row);
    }
    Ok(flat)
}

/// Write a grid in the three-block snapshot format.
pub fn to_snapshot_text(grid: &Grid) -> String {
    let mut out = String::new();
    let fields: [fn(&Cell) -> f32; 3] = [|c| c.h, |c| c.qx, |c| c.qy];

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(BLOCK_SEPARATOR);
            out.push('\n');
        }
        for row in grid.rows() {
            let mut first = true;
            for cell in row {
                if !first {
                    out.push(' ');
                }
                first = false;
                let _ = write!(out, "{}", field(cell));
            }
            out.push('\n');
        }
    }

    out
}

/// Concatenate grids into the combined-file format.
pub fn to_combined_text<'a, I>(grids: I) -> String
where
    I: IntoIterator<Item = &'a Grid>,
{
    let mut out = String::new();
    for grid in grids {
        out.push_str(&to_snapshot_text(grid));
        out.push_str(FRAME_TERMINATOR);
        out.push('\n');
    }
    out
}

/// Split a combined file into at most `num_frames` snapshot texts.
///
/// A trailing snapshot without a terminator is kept if it holds any text.
pub fn split_combined<I>(lines: I, num_frames: usize) -> io::Result<Vec<String>>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut frames = Vec::with_capacity(num_frames);
    let mut current = String::new();

    for line in lines {
        if frames.len() >= num_frames {
            break;
        }

        let line = line?;
        if line.trim_start().starts_with(FRAME_TERMINATOR) {
            frames.push(std::mem::take(&mut current));
            continue;
        }

        current.push_str(&line);
        current.push('\n');
    }

    if frames.len() < num_frames && !current.trim().is_empty() {
        frames.push(current);
    }

    Ok(frames)
}
