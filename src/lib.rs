//! Fluid Replay - Playback of precomputed shallow-water simulations.
//!
//! An external solver writes one height/momentum snapshot per frame. This
//! crate reconstructs each frame's grid, builds a flat-shaded surface mesh
//! from it, and serves the frames for stepping.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration types and the cell grid
//! - `compute`: Wall-aware corner interpolation and mesh building
//! - `animation`: Snapshot format, loading pipeline, and playback
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use fluid_replay::animation::{
//!     FsSource, HeadlessDisplay, LoadingPipeline, PipelineOptions, ReplayInputs, ReplaySession,
//!     SnapshotSource, StepDirection,
//! };
//!
//! let source: Arc<dyn SnapshotSource> = Arc::new(FsSource::new("recordings"));
//! let inputs = ReplayInputs::load(source.as_ref(), "dam_break")?;
//! let pipeline = LoadingPipeline::new(inputs, source, &PipelineOptions::default())?;
//!
//! let mut session = ReplaySession::new(pipeline, HeadlessDisplay::default());
//! while !session.pipeline().is_complete() {
//!     session.tick()?;
//!     std::thread::sleep(Duration::from_millis(16));
//! }
//!
//! session.request_step(StepDirection::Forward);
//! session.tick()?;
//! println!("Now at frame {}", session.controller().current_frame());
//! # Ok::<(), fluid_replay::animation::LoadError>(())
//! ```

pub mod animation;
pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{MeshBuffers, WallMask, build_frame, corner_height};
pub use schema::{Cell, Grid, SimulationConfig};
