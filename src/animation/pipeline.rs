//! Staged loading of recorded frames.
//!
//! The pipeline is driven by [`LoadingPipeline::tick`] on the consuming
//! thread, which never blocks. Heavy work runs elsewhere:
//!
//! 1. `DiskReading` (combined files only): a background thread splits the
//!    combined file into per-frame texts.
//! 2. `GridProcessing`: a rayon pool parses every frame and builds its mesh,
//!    each index handled by exactly one worker.
//! 3. `MeshProcessing`: built meshes are handed to the renderer, in order, on
//!    the ticking thread.
//!
//! Phase completion is signalled over channels and only acted upon when a
//! later tick observes it.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use serde::de::DeserializeOwned;

use super::cache::{FrameCache, FrameSlot};
use super::events::{EventTracker, Phase, PhaseError};
use super::format::{ParseError, parse_lines, parse_snapshot, split_combined};
use super::player::FrameDisplay;
use super::source::SnapshotSource;
use crate::compute::{WallMask, build_frame};
use crate::schema::{BuilderConfig, ConfigError, GlobalConfig, Grid, SimulationConfig};

/// Resource holding the [`GlobalConfig`].
pub const GLOBAL_CONFIG_PATH: &str = "global.json";

pub fn config_path(sim: &str) -> String {
    format!("{}/config.json", sim)
}

pub fn static_grid_path(sim: &str) -> String {
    format!("{}/static.txt", sim)
}

pub fn builder_path(sim: &str) -> String {
    format!("{}/builder.json", sim)
}

pub fn frame_path(sim: &str, index: usize) -> String {
    format!("{}/{}.txt", sim, index)
}

pub fn combined_path(sim: &str) -> String {
    format!("{}/combined.txt", sim)
}

/// Errors that abort a replay session.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Static grid {path} is malformed: {source}")]
    StaticGrid { path: String, source: ParseError },
    #[error("Simulation {0} has neither a static grid, a builder config, nor grid dimensions")]
    MissingStaticGrid(String),
    #[error("Builder config needs width and height in the simulation config")]
    MissingDimensions,
    #[error("Static grid is {found:?} but the config declares {expected:?}")]
    DimensionConflict {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to start disk reader: {0}")]
    Spawn(io::Error),
    #[error(transparent)]
    Phase(#[from] PhaseError),
}

/// Errors that leave a single frame slot empty.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Frame file {path} does not exist")]
    MissingFile { path: String },
    #[error("Combined file has no snapshot {index}")]
    MissingBlock { index: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Frame is {found:?} but the static grid is {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

fn read_json<T: DeserializeOwned>(source: &dyn SnapshotSource, path: &str) -> Result<T, LoadError> {
    let text = source.read_all_text(path).map_err(|e| LoadError::Io {
        path: path.to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| LoadError::Json {
        path: path.to_string(),
        source: e,
    })
}

/// Read the [`GlobalConfig`] at the source root.
pub fn load_global_config(source: &dyn SnapshotSource) -> Result<GlobalConfig, LoadError> {
    read_json(source, GLOBAL_CONFIG_PATH)
}

/// Everything read once at startup before frames are loaded.
#[derive(Debug, Clone)]
pub struct ReplayInputs {
    /// Simulation name; also the directory holding its resources.
    pub name: String,
    pub config: SimulationConfig,
    /// Static grid whose positive heights mark walls.
    pub static_grid: Grid,
}

impl ReplayInputs {
    /// Load config and static grid for simulation `name`.
    ///
    /// Walls come from `static.txt` if present, else from `builder.json`,
    /// else the grid is open and sized by the config.
    pub fn load(source: &dyn SnapshotSource, name: &str) -> Result<Self, LoadError> {
        let config: SimulationConfig = read_json(source, &config_path(name))?;
        config.validate()?;

        let static_path = static_grid_path(name);
        let static_grid = if source.file_exists(&static_path) {
            let text = source.read_all_text(&static_path).map_err(|e| LoadError::Io {
                path: static_path.clone(),
                source: e,
            })?;
            parse_snapshot(&text).map_err(|e| LoadError::StaticGrid {
                path: static_path,
                source: e,
            })?
        } else if source.file_exists(&builder_path(name)) {
            let builder: BuilderConfig = read_json(source, &builder_path(name))?;
            let (width, height) = config.dimensions().ok_or(LoadError::MissingDimensions)?;
            builder.build_static_grid(width, height)?
        } else if let Some((width, height)) = config.dimensions() {
            Grid::filled(width, height, 0.0)
        } else {
            return Err(LoadError::MissingStaticGrid(name.to_string()));
        };

        if let Some(expected) = config.dimensions() {
            let found = (static_grid.width(), static_grid.height());
            if expected != found {
                return Err(LoadError::DimensionConflict { expected, found });
            }
        }

        Ok(Self {
            name: name.to_string(),
            config,
            static_grid,
        })
    }
}

/// Pipeline tuning.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Frame worker count. Defaults to hardware concurrency minus one.
    pub worker_threads: Option<usize>,
}

impl PipelineOptions {
    /// Worker count to use, leaving one core to the consuming thread.
    pub fn resolved_threads(&self) -> usize {
        self.worker_threads
            .unwrap_or_else(|| {
                thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2)
                    .saturating_sub(1)
            })
            .max(1)
    }
}

/// State shared by reference with every frame worker.
pub struct PipelineContext {
    name: String,
    config: SimulationConfig,
    wall_mask: WallMask,
    cache: FrameCache,
    source: Arc<dyn SnapshotSource>,
}

impl PipelineContext {
    pub fn new(inputs: ReplayInputs, source: Arc<dyn SnapshotSource>) -> Self {
        let wall_mask = WallMask::from_static_grid(&inputs.static_grid);
        let cache = FrameCache::new(inputs.config.num_frames());
        Self {
            name: inputs.name,
            config: inputs.config,
            wall_mask,
            cache,
            source,
        }
    }

    pub fn wall_mask(&self) -> &WallMask {
        &self.wall_mask
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Read, parse and mesh one frame.
    ///
    /// `blocks` holds pre-split snapshot texts when frames come from a
    /// combined file; otherwise the frame's own file is read.
    pub fn process_frame(
        &self,
        index: usize,
        blocks: Option<&[String]>,
    ) -> Result<FrameSlot, FrameError> {
        let grid = match blocks {
            Some(blocks) => {
                let text = blocks.get(index).ok_or(FrameError::MissingBlock { index })?;
                parse_snapshot(text)?
            }
            None => {
                let path = frame_path(&self.name, index);
                if !self.source.file_exists(&path) {
                    return Err(FrameError::MissingFile { path });
                }
                let lines = self
                    .source
                    .read_lines(&path)?
                    .collect::<io::Result<Vec<_>>>()?;
                parse_lines(lines)?
            }
        };

        let expected = (self.wall_mask.width(), self.wall_mask.height());
        let found = (grid.width(), grid.height());
        if expected != found {
            return Err(FrameError::DimensionMismatch { expected, found });
        }

        let mesh = build_frame(&grid, &self.wall_mask);
        Ok(FrameSlot { grid, mesh })
    }

    /// Process one frame into its slot. Failures leave the slot empty.
    pub fn load_frame(&self, index: usize, blocks: Option<&[String]>) -> bool {
        match self.process_frame(index, blocks) {
            Ok(slot) => {
                if !self.cache.fill(index, slot) {
                    log::error!("Frame {} was filled twice", index);
                }
                true
            }
            Err(e @ (FrameError::MissingFile { .. } | FrameError::MissingBlock { .. })) => {
                log::debug!("Skipping frame {}: {}", index, e);
                false
            }
            Err(e) => {
                log::warn!("Frame {} failed to load: {}", index, e);
                false
            }
        }
    }
}

/// Outcome of one pipeline tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineStatus {
    /// Still working; `progress` is the fraction of filled slots.
    Loading { progress: f32 },
    /// All phases finished during this tick.
    Completed,
    /// All phases had already finished.
    Ready,
}

/// Tick-driven loader turning raw snapshots into ready frames.
pub struct LoadingPipeline {
    context: Arc<PipelineContext>,
    events: EventTracker,
    pool: rayon::ThreadPool,
    disk_rx: Option<Receiver<io::Result<Vec<String>>>>,
    grid_rx: Option<Receiver<usize>>,
}

impl LoadingPipeline {
    /// Create a pipeline. Nothing is read until the first tick.
    pub fn new(
        inputs: ReplayInputs,
        source: Arc<dyn SnapshotSource>,
        options: &PipelineOptions,
    ) -> Result<Self, LoadError> {
        let threads = options.resolved_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("frame-worker-{}", i))
            .build()?;

        log::info!(
            "Replaying {} ({} frames, {} workers)",
            inputs.name,
            inputs.config.num_frames(),
            threads
        );

        Ok(Self {
            context: Arc::new(PipelineContext::new(inputs, source)),
            events: EventTracker::new(),
            pool,
            disk_rx: None,
            grid_rx: None,
        })
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn cache(&self) -> &FrameCache {
        &self.context.cache
    }

    pub fn events(&self) -> &EventTracker {
        &self.events
    }

    pub fn num_frames(&self) -> usize {
        self.context.cache.len()
    }

    /// Fraction of frames loaded so far.
    pub fn progress(&self) -> f32 {
        self.context.cache.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.events.is_done(Phase::All)
    }

    /// Advance the pipeline as far as already-finished work allows.
    pub fn tick(&mut self, display: &mut dyn FrameDisplay) -> Result<PipelineStatus, LoadError> {
        if self.events.is_done(Phase::All) {
            return Ok(PipelineStatus::Ready);
        }

        if !self.events.is_started(Phase::All) {
            self.events.start(Phase::All)?;
            if self.context.config.separate_files {
                self.start_grid_processing(None)?;
            } else {
                self.start_disk_reading()?;
            }
        }

        if self.events.is_running(Phase::DiskReading) {
            let Some(result) = poll(&mut self.disk_rx) else {
                let progress = self.progress();
                display.report_progress(progress);
                return Ok(PipelineStatus::Loading { progress });
            };
            self.events.end(Phase::DiskReading)?;

            let blocks = match result {
                Some(Ok(blocks)) => {
                    if blocks.len() < self.num_frames() {
                        log::warn!(
                            "Combined file holds {} of {} frames",
                            blocks.len(),
                            self.num_frames()
                        );
                    }
                    blocks
                }
                Some(Err(e)) => {
                    log::error!("Failed to read combined file: {}", e);
                    Vec::new()
                }
                None => {
                    log::error!("Disk reader exited without a result");
                    Vec::new()
                }
            };
            self.start_grid_processing(Some(Arc::new(blocks)))?;
        }

        if self.events.is_running(Phase::GridProcessing) {
            let progress = self.progress();
            display.report_progress(progress);

            let Some(result) = poll(&mut self.grid_rx) else {
                return Ok(PipelineStatus::Loading { progress });
            };
            if result.is_none() {
                log::error!("Frame workers exited without reporting");
            }
            self.events.end(Phase::GridProcessing)?;
            display.report_progress(self.progress());

            let missing = self.cache().missing();
            if !missing.is_empty() {
                log::warn!("{} frames could not be loaded", missing.len());
            }
        }

        // Every branch above returns while its phase is still pending.
        debug_assert!(self.events.is_done(Phase::GridProcessing));

        self.events.start(Phase::MeshProcessing)?;
        for (index, slot) in self.context.cache.filled() {
            display.instantiate_mesh(index, &slot.mesh);
        }
        self.events.end(Phase::MeshProcessing)?;
        self.events.end(Phase::All)?;

        Ok(PipelineStatus::Completed)
    }

    /// Tick until complete, sleeping `interval` between ticks.
    pub fn run_until_complete(
        &mut self,
        display: &mut dyn FrameDisplay,
        interval: Duration,
    ) -> Result<(), LoadError> {
        loop {
            match self.tick(display)? {
                PipelineStatus::Loading { .. } => thread::sleep(interval),
                PipelineStatus::Completed | PipelineStatus::Ready => return Ok(()),
            }
        }
    }

    fn start_disk_reading(&mut self) -> Result<(), LoadError> {
        self.events.start(Phase::DiskReading)?;

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.context.source);
        let path = combined_path(&self.context.name);
        let num_frames = self.num_frames();

        thread::Builder::new()
            .name("disk-reader".to_string())
            .spawn(move || {
                let result = source
                    .read_lines(&path)
                    .and_then(|lines| split_combined(lines, num_frames));
                let _ = tx.send(result);
            })
            .map_err(LoadError::Spawn)?;

        self.disk_rx = Some(rx);
        Ok(())
    }

    fn start_grid_processing(&mut self, blocks: Option<Arc<Vec<String>>>) -> Result<(), LoadError> {
        self.events.start(Phase::GridProcessing)?;

        let (tx, rx) = mpsc::channel();
        let context = Arc::clone(&self.context);

        self.pool.spawn(move || {
            let blocks = blocks.as_deref().map(Vec::as_slice);
            let loaded = (0..context.cache.len())
                .into_par_iter()
                .filter(|&i| context.load_frame(i, blocks))
                .count();
            let _ = tx.send(loaded);
        });

        self.grid_rx = Some(rx);
        Ok(())
    }
}

/// Non-blocking receive. `None` while pending; `Some(None)` if the sender
/// vanished without sending.
fn poll<T>(rx: &mut Option<Receiver<T>>) -> Option<Option<T>> {
    let receiver = rx.as_ref()?;
    let result = match receiver.try_recv() {
        Ok(value) => Some(value),
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => None,
    };
    *rx = None;
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::format::{to_combined_text, to_snapshot_text};
    use crate::animation::player::HeadlessDisplay;
    use crate::animation::source::{FsSource, MemorySource};
    use std::fs;
    use std::io::BufRead;
    use std::sync::Mutex;
    use tempfile::tempdir;

    const TICK: Duration = Duration::from_millis(1);

    fn config_json(fps: u32, seconds: u32, separate: bool) -> String {
        format!(
            r#"{{"fps": {}, "seconds": {}, "separateFiles": {}}}"#,
            fps, seconds, separate
        )
    }

    fn frame_grid(i: usize) -> Grid {
        let h = 0.1 * (i + 1) as f32;
        Grid::from_fields(3, 2, &[h; 6], &[0.5; 6], &[-0.5; 6])
    }

    fn static_text() -> String {
        to_snapshot_text(&Grid::from_fields(
            3,
            2,
            &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            &[0.0; 6],
            &[0.0; 6],
        ))
    }

    /// Source whose `gated` resource blocks in `open` until released.
    struct GatedSource {
        inner: MemorySource,
        gated: String,
        gate: Mutex<Receiver<()>>,
    }

    impl SnapshotSource for GatedSource {
        fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + Send>> {
            if path == self.gated {
                let _ = self.gate.lock().unwrap().recv();
            }
            self.inner.open(path)
        }

        fn file_exists(&self, path: &str) -> bool {
            self.inner.file_exists(path)
        }
    }

    fn pipeline(source: MemorySource, name: &str) -> LoadingPipeline {
        let source: Arc<dyn SnapshotSource> = Arc::new(source);
        let inputs = ReplayInputs::load(source.as_ref(), name).unwrap();
        let options = PipelineOptions {
            worker_threads: Some(2),
        };
        LoadingPipeline::new(inputs, source, &options).unwrap()
    }

    #[test]
    fn test_separate_files_load_every_frame() {
        let mut source = MemorySource::new()
            .with_file("sim/config.json", config_json(2, 1, true))
            .with_file("sim/static.txt", static_text());
        for i in 0..3 {
            source.insert(frame_path("sim", i), to_snapshot_text(&frame_grid(i)));
        }

        let mut pipeline = pipeline(source, "sim");
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert!(pipeline.is_complete());
        assert!(!pipeline.events().is_started(Phase::DiskReading));
        assert!(pipeline.events().is_done(Phase::GridProcessing));
        assert!(pipeline.events().is_done(Phase::MeshProcessing));
        assert_eq!(pipeline.num_frames(), 3);

        for i in 0..3 {
            let frame = pipeline.cache().frame_at(i as isize).unwrap();
            assert_eq!(frame.grid, frame_grid(i));
            assert_eq!(frame.mesh.vertices.len(), 12 * 6);
            // One wall cell contributes nothing
            assert_eq!(frame.mesh.triangle_count(), 4 * 5);
        }
        assert_eq!(display.instantiated, vec![0, 1, 2]);
        assert_eq!(pipeline.progress(), 1.0);
        assert_eq!(pipeline.tick(&mut display).unwrap(), PipelineStatus::Ready);
    }

    #[test]
    fn test_missing_frame_stays_empty() {
        let source = MemorySource::new()
            .with_file("sim/config.json", config_json(1, 2, true))
            .with_file("sim/static.txt", static_text())
            .with_file(frame_path("sim", 0), to_snapshot_text(&frame_grid(0)))
            .with_file(frame_path("sim", 2), to_snapshot_text(&frame_grid(2)));

        let mut pipeline = pipeline(source, "sim");
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        let cache = pipeline.cache();
        assert!(cache.frame_at(0).is_ok());
        assert!(cache.frame_at(1).is_err());
        assert!(cache.frame_at(2).is_ok());
        assert_eq!(cache.missing(), vec![1]);

        assert!(display.progress.iter().all(|&p| p < 1.0));
        let last = *display.progress.last().unwrap();
        assert!((last - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(display.instantiated, vec![0, 2]);
    }

    #[test]
    fn test_combined_file() {
        let grids: Vec<Grid> = (0..4).map(frame_grid).collect();
        let source = MemorySource::new()
            .with_file("sim/config.json", config_json(3, 1, false))
            .with_file("sim/static.txt", static_text())
            .with_file(combined_path("sim"), to_combined_text(&grids));

        let mut pipeline = pipeline(source, "sim");
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert!(pipeline.events().is_done(Phase::DiskReading));
        assert_eq!(pipeline.cache().filled_count(), 4);
        for (i, grid) in grids.iter().enumerate() {
            assert_eq!(&pipeline.cache().frame_at(i as isize).unwrap().grid, grid);
        }
    }

    #[test]
    fn test_disk_reading_does_not_block_tick() {
        let grids: Vec<Grid> = (0..4).map(frame_grid).collect();
        let (release, gate) = mpsc::channel();
        let source: Arc<dyn SnapshotSource> = Arc::new(GatedSource {
            inner: MemorySource::new()
                .with_file("sim/config.json", config_json(3, 1, false))
                .with_file("sim/static.txt", static_text())
                .with_file(combined_path("sim"), to_combined_text(&grids)),
            gated: combined_path("sim"),
            gate: Mutex::new(gate),
        });

        let inputs = ReplayInputs::load(source.as_ref(), "sim").unwrap();
        let options = PipelineOptions {
            worker_threads: Some(2),
        };
        let mut pipeline = LoadingPipeline::new(inputs, source, &options).unwrap();
        let mut display = HeadlessDisplay::default();

        // The reader is parked inside open(); ticks keep returning
        for _ in 0..5 {
            assert_eq!(
                pipeline.tick(&mut display).unwrap(),
                PipelineStatus::Loading { progress: 0.0 }
            );
            assert!(pipeline.events().is_running(Phase::DiskReading));
            assert!(!pipeline.events().is_started(Phase::GridProcessing));
        }
        assert_eq!(display.progress, vec![0.0; 5]);

        release.send(()).unwrap();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert!(pipeline.events().is_done(Phase::DiskReading));
        assert!(pipeline.events().is_done(Phase::GridProcessing));
        assert_eq!(pipeline.cache().filled_count(), 4);
    }

    #[test]
    fn test_short_combined_file() {
        let grids: Vec<Grid> = (0..2).map(frame_grid).collect();
        let source = MemorySource::new()
            .with_file("sim/config.json", config_json(1, 2, false))
            .with_file("sim/static.txt", static_text())
            .with_file(combined_path("sim"), to_combined_text(&grids));

        let mut pipeline = pipeline(source, "sim");
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert_eq!(pipeline.cache().missing(), vec![2]);
    }

    #[test]
    fn test_bad_frames_do_not_abort() {
        let source = MemorySource::new()
            .with_file("sim/config.json", config_json(1, 2, true))
            .with_file("sim/static.txt", static_text())
            .with_file(frame_path("sim", 0), "0.1 0.2 x\n0 0 0\n")
            .with_file(frame_path("sim", 1), "0.1 0.2\n0.3 0.4\n")
            .with_file(frame_path("sim", 2), to_snapshot_text(&frame_grid(2)));

        let mut pipeline = pipeline(source, "sim");
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert!(pipeline.is_complete());
        assert_eq!(pipeline.cache().missing(), vec![0, 1]);

        let err = pipeline.context().process_frame(1, None).unwrap_err();
        assert!(matches!(
            err,
            FrameError::DimensionMismatch {
                expected: (3, 2),
                found: (2, 2)
            }
        ));
    }

    #[test]
    fn test_builder_walls() {
        let source = MemorySource::new()
            .with_file(
                "sim/config.json",
                r#"{"fps": 1, "seconds": 1, "separateFiles": true, "width": 4, "height": 3}"#,
            )
            .with_file(
                "sim/builder.json",
                r#"{"wall": [{"topLeft": [0, 0], "bottomRight": [3, 0], "height": 2}]}"#,
            );

        let inputs = ReplayInputs::load(&source, "sim").unwrap();
        assert_eq!(inputs.static_grid.width(), 4);
        let walls = WallMask::from_static_grid(&inputs.static_grid);
        assert_eq!(walls.wall_count(), 4);

        let context = PipelineContext::new(inputs, Arc::new(source));
        assert!(context.wall_mask().is_wall(2, 0));
        assert!(!context.wall_mask().is_wall(2, 1));
    }

    #[test]
    fn test_inputs_require_walls_or_dimensions() {
        let source = MemorySource::new().with_file("sim/config.json", config_json(1, 1, true));
        assert!(matches!(
            ReplayInputs::load(&source, "sim"),
            Err(LoadError::MissingStaticGrid(_))
        ));

        let source = MemorySource::new();
        assert!(matches!(
            ReplayInputs::load(&source, "sim"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_filesystem_source_end_to_end() {
        let dir = tempdir().unwrap();
        let sim = dir.path().join("flood");
        fs::create_dir(&sim).unwrap();
        fs::write(dir.path().join("global.json"), r#"{"name": "flood"}"#).unwrap();
        fs::write(sim.join("config.json"), config_json(1, 1, true)).unwrap();
        fs::write(sim.join("static.txt"), static_text()).unwrap();
        for i in 0..2 {
            fs::write(sim.join(format!("{}.txt", i)), to_snapshot_text(&frame_grid(i))).unwrap();
        }

        let source: Arc<dyn SnapshotSource> = Arc::new(FsSource::new(dir.path()));
        let global = load_global_config(source.as_ref()).unwrap();
        assert_eq!(global.name, "flood");

        let inputs = ReplayInputs::load(source.as_ref(), &global.name).unwrap();
        let mut pipeline =
            LoadingPipeline::new(inputs, source, &PipelineOptions::default()).unwrap();
        let mut display = HeadlessDisplay::default();
        pipeline.run_until_complete(&mut display, TICK).unwrap();

        assert_eq!(pipeline.cache().filled_count(), 2);
    }

    #[test]
    fn test_resolved_threads_at_least_one() {
        let options = PipelineOptions {
            worker_threads: Some(0),
        };
        assert_eq!(options.resolved_threads(), 1);
        assert!(PipelineOptions::default().resolved_threads() >= 1);
    }
}
