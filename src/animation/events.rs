//! Phase timers for the loading pipeline.
//!
//! Each phase is started and ended exactly once per session; anything else
//! is a sequencing bug and reported as a [`PhaseError`].

use std::fmt;
use std::time::{Duration, Instant};

/// Loading pipeline phases, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Splitting a combined snapshot file into per-frame texts.
    DiskReading,
    /// Parsing snapshots and building meshes on the worker pool.
    GridProcessing,
    /// Handing built meshes to the renderer.
    MeshProcessing,
    /// The whole pipeline.
    All,
}

impl Phase {
    pub const COUNT: usize = 4;

    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::DiskReading,
        Phase::GridProcessing,
        Phase::MeshProcessing,
        Phase::All,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::DiskReading => "DiskReading",
            Phase::GridProcessing => "GridProcessing",
            Phase::MeshProcessing => "MeshProcessing",
            Phase::All => "All",
        };
        f.write_str(name)
    }
}

/// Phase sequencing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("Phase {0} was already started")]
    DuplicatePhase(Phase),
    #[error("Phase {0} was never started")]
    PhaseNotStarted(Phase),
    #[error("Phase {0} has already ended")]
    AlreadyEnded(Phase),
    #[error("Phase {0} has not ended yet")]
    NotYetEnded(Phase),
}

/// Lifecycle state of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    NotStarted,
    Running,
    Done,
}

/// Start/end timestamps of one phase.
#[derive(Debug, Clone, Copy)]
struct PhaseSpan {
    started_at: Instant,
    ended_at: Option<Instant>,
}

/// Fixed table of phase timers indexed by [`Phase`].
#[derive(Debug, Clone, Default)]
pub struct EventTracker {
    spans: [Option<PhaseSpan>; Phase::COUNT],
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a phase.
    pub fn start(&mut self, phase: Phase) -> Result<(), PhaseError> {
        let slot = &mut self.spans[phase.index()];
        if slot.is_some() {
            return Err(PhaseError::DuplicatePhase(phase));
        }

        *slot = Some(PhaseSpan {
            started_at: Instant::now(),
            ended_at: None,
        });
        log::debug!("{} started", phase);
        Ok(())
    }

    /// End a running phase and return its duration.
    pub fn end(&mut self, phase: Phase) -> Result<Duration, PhaseError> {
        let span = self.spans[phase.index()]
            .as_mut()
            .ok_or(PhaseError::PhaseNotStarted(phase))?;
        if span.ended_at.is_some() {
            return Err(PhaseError::AlreadyEnded(phase));
        }

        let now = Instant::now();
        span.ended_at = Some(now);
        let elapsed = now - span.started_at;
        log::info!("{} took {} ms", phase, elapsed.as_millis());
        Ok(elapsed)
    }

    pub fn state(&self, phase: Phase) -> PhaseState {
        match self.spans[phase.index()] {
            None => PhaseState::NotStarted,
            Some(PhaseSpan { ended_at: None, .. }) => PhaseState::Running,
            Some(_) => PhaseState::Done,
        }
    }

    #[inline]
    pub fn is_started(&self, phase: Phase) -> bool {
        self.state(phase) != PhaseState::NotStarted
    }

    #[inline]
    pub fn is_running(&self, phase: Phase) -> bool {
        self.state(phase) == PhaseState::Running
    }

    #[inline]
    pub fn is_done(&self, phase: Phase) -> bool {
        self.state(phase) == PhaseState::Done
    }

    /// Duration of an ended phase.
    pub fn duration(&self, phase: Phase) -> Result<Duration, PhaseError> {
        let span = self.spans[phase.index()].ok_or(PhaseError::PhaseNotStarted(phase))?;
        let ended_at = span.ended_at.ok_or(PhaseError::NotYetEnded(phase))?;
        Ok(ended_at - span.started_at)
    }
}
