//! Frame-stepping playback over loaded frames.

use super::cache::{FrameCache, FrameSlot, NotReady};
use super::pipeline::{LoadError, LoadingPipeline, PipelineStatus};
use crate::compute::MeshBuffers;
use crate::schema::Grid;

/// Renderer-side collaborator receiving frame data.
pub trait FrameDisplay {
    /// Create the renderable mesh for frame `index`. Called once per loaded
    /// frame, in index order, on the ticking thread.
    fn instantiate_mesh(&mut self, index: usize, mesh: &MeshBuffers);

    /// Show the mesh of frame `index`.
    fn display_mesh(&mut self, index: usize, mesh: &MeshBuffers);

    /// Expose the cells of the shown frame (e.g. for hover inspection).
    fn display_cells(&mut self, grid: &Grid);

    /// Loading progress in [0, 1].
    fn report_progress(&mut self, fraction: f32);

    /// Index of the frame now shown.
    fn report_frame_label(&mut self, index: usize);
}

/// Summary of the frame currently shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub volume: f32,
    pub max_height: f32,
    pub wet_cells: usize,
}

/// Display that renders nothing and keeps a record of what it was given.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    /// Frames whose meshes were instantiated, in call order.
    pub instantiated: Vec<usize>,
    /// Total vertex and index bytes prepared for upload.
    pub uploaded_bytes: usize,
    /// Frames shown, in call order.
    pub shown: Vec<usize>,
    /// Every progress report.
    pub progress: Vec<f32>,
    /// Last frame label.
    pub label: Option<String>,
    /// Stats of the last displayed grid.
    pub stats: Option<FrameStats>,
}

/// Heights at or above this count as wet in [`FrameStats`].
const WET_THRESHOLD: f32 = 1e-2;

impl FrameDisplay for HeadlessDisplay {
    fn instantiate_mesh(&mut self, index: usize, mesh: &MeshBuffers) {
        self.uploaded_bytes += mesh.vertex_bytes().len() + mesh.index_bytes().len();
        self.instantiated.push(index);
    }

    fn display_mesh(&mut self, index: usize, _mesh: &MeshBuffers) {
        self.shown.push(index);
    }

    fn display_cells(&mut self, grid: &Grid) {
        self.stats = Some(FrameStats {
            volume: grid.total_volume(),
            max_height: grid.max_height(),
            wet_cells: grid.wet_cells(WET_THRESHOLD),
        });
    }

    fn report_progress(&mut self, fraction: f32) {
        log::debug!("Loading {:.0}%", fraction * 100.0);
        self.progress.push(fraction);
    }

    fn report_frame_label(&mut self, index: usize) {
        self.label = Some(format!("Frame {}", index));
    }
}

/// Direction of a single frame step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    #[inline]
    pub fn delta(self) -> isize {
        match self {
            StepDirection::Forward => 1,
            StepDirection::Backward => -1,
        }
    }
}

/// Current frame index with bounds-checked stepping.
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    current_frame: isize,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current_frame(&self) -> isize {
        self.current_frame
    }

    /// Move by `delta` frames if the target frame is ready.
    ///
    /// On `NotReady` the current frame is left unchanged.
    pub fn step<'a>(
        &mut self,
        delta: isize,
        cache: &'a FrameCache,
    ) -> Result<&'a FrameSlot, NotReady> {
        let target = self.current_frame + delta;
        let slot = cache.frame_at(target)?;
        self.current_frame = target;
        Ok(slot)
    }

    /// Send the current frame to the display.
    pub fn show_current(
        &self,
        cache: &FrameCache,
        display: &mut dyn FrameDisplay,
    ) -> Result<(), NotReady> {
        let slot = cache.frame_at(self.current_frame)?;
        show(self.current_frame as usize, slot, display);
        Ok(())
    }
}

fn show(index: usize, slot: &FrameSlot, display: &mut dyn FrameDisplay) {
    display.display_mesh(index, &slot.mesh);
    display.display_cells(&slot.grid);
    display.report_frame_label(index);
}

/// Loading pipeline, playback controller and display driven by one tick.
pub struct ReplaySession<D: FrameDisplay> {
    pipeline: LoadingPipeline,
    controller: PlaybackController,
    display: D,
    forward_requested: bool,
    backward_requested: bool,
}

impl<D: FrameDisplay> ReplaySession<D> {
    pub fn new(pipeline: LoadingPipeline, display: D) -> Self {
        Self {
            pipeline,
            controller: PlaybackController::new(),
            display,
            forward_requested: false,
            backward_requested: false,
        }
    }

    pub fn pipeline(&self) -> &LoadingPipeline {
        &self.pipeline
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Queue a step for the next tick that finds loading already complete.
    ///
    /// Requests made while loading stay queued until then. Forward and
    /// backward requests are independent; repeated requests in the same
    /// direction collapse into one.
    pub fn request_step(&mut self, direction: StepDirection) {
        match direction {
            StepDirection::Forward => self.forward_requested = true,
            StepDirection::Backward => self.backward_requested = true,
        }
    }

    /// Advance loading and apply queued steps.
    ///
    /// Returns the frames stepped to during this tick.
    pub fn tick(&mut self) -> Result<Vec<isize>, LoadError> {
        match self.pipeline.tick(&mut self.display)? {
            PipelineStatus::Loading { .. } => Ok(Vec::new()),
            PipelineStatus::Completed => {
                if let Err(e) = self
                    .controller
                    .show_current(self.pipeline.cache(), &mut self.display)
                {
                    log::warn!("Initial frame unavailable: {}", e);
                }
                Ok(Vec::new())
            }
            PipelineStatus::Ready => {
                let requests = [
                    (std::mem::take(&mut self.forward_requested), StepDirection::Forward),
                    (std::mem::take(&mut self.backward_requested), StepDirection::Backward),
                ];
                let mut stepped = Vec::new();
                for (requested, direction) in requests {
                    if requested && self.step(direction) {
                        stepped.push(self.controller.current_frame());
                    }
                }
                Ok(stepped)
            }
        }
    }

    /// Step immediately. Returns false if the target frame is not ready.
    pub fn step(&mut self, direction: StepDirection) -> bool {
        match self
            .controller
            .step(direction.delta(), self.pipeline.cache())
        {
            Ok(slot) => {
                show(
                    self.controller.current_frame() as usize,
                    slot,
                    &mut self.display,
                );
                true
            }
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }
}
