//! Loading and playback of recorded shallow-water simulations.
//!
//! Recorded frames are plain-text snapshots written by an external solver.
//! This module parses them, turns each into a surface mesh on a worker pool,
//! and steps through the results.
//!
//! # Resource Layout
//!
//! ```text
//! global.json              GlobalConfig (simulation name)
//! <sim>/config.json        SimulationConfig
//! <sim>/static.txt         static grid; heights > 0 mark walls
//! <sim>/builder.json       wall boxes, used when static.txt is absent
//! <sim>/<index>.txt        one snapshot per frame (separateFiles = true)
//! <sim>/combined.txt       all snapshots, each ended by a `--` line
//! ```
//!
//! # Pipeline
//!
//! ```text
//! DiskReading (combined only) -> GridProcessing -> MeshProcessing -> All
//! ```

mod cache;
mod events;
mod format;
mod pipeline;
mod player;
mod source;

pub use cache::{FrameCache, FrameSlot, NotReady};
pub use events::{EventTracker, Phase, PhaseError, PhaseState};
pub use format::{
    BLOCK_SEPARATOR, FRAME_TERMINATOR, ParseError, parse_lines, parse_snapshot, split_combined,
    to_combined_text, to_snapshot_text,
};
pub use pipeline::{
    FrameError, GLOBAL_CONFIG_PATH, LoadError, LoadingPipeline, PipelineContext, PipelineOptions,
    PipelineStatus, ReplayInputs, builder_path, combined_path, config_path, frame_path,
    load_global_config, static_grid_path,
};
pub use player::{
    FrameDisplay, FrameStats, HeadlessDisplay, PlaybackController, ReplaySession, StepDirection,
};
pub use source::{FsSource, MemorySource, SnapshotSource};
