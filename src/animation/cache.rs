//! Preallocated per-frame storage shared between frame workers and the
//! consuming thread.

use std::sync::OnceLock;

use crate::compute::MeshBuffers;
use crate::schema::Grid;

/// Parsed grid and built mesh of one frame.
#[derive(Debug, Clone)]
pub struct FrameSlot {
    pub grid: Grid,
    pub mesh: MeshBuffers,
}

/// Frame lookup failure: out of range or not loaded (yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Frame {index} is not ready")]
pub struct NotReady {
    pub index: isize,
}

/// Fixed-size array of write-once frame slots.
///
/// Each slot goes from empty to filled at most once and is never cleared.
/// Grid and mesh are published together, so readers never observe a
/// partially written slot.
#[derive(Debug)]
pub struct FrameCache {
    slots: Vec<OnceLock<FrameSlot>>,
}

impl FrameCache {
    /// Create a cache with `num_frames` empty slots.
    pub fn new(num_frames: usize) -> Self {
        Self {
            slots: (0..num_frames).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Fill slot `index`.
    ///
    /// Returns false if the index is out of range or the slot was already
    /// filled; the existing contents are kept in that case.
    pub fn fill(&self, index: usize, slot: FrameSlot) -> bool {
        match self.slots.get(index) {
            Some(cell) => cell.set(slot).is_ok(),
            None => false,
        }
    }

    /// Look up a filled frame.
    pub fn frame_at(&self, index: isize) -> Result<&FrameSlot, NotReady> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.slots.get(i))
            .and_then(OnceLock::get)
            .ok_or(NotReady { index })
    }

    #[inline]
    pub fn is_filled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.get().is_some())
    }

    /// Number of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    /// Fraction of filled slots in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.slots.is_empty() {
            return 1.0;
        }
        self.filled_count() as f32 / self.slots.len() as f32
    }

    /// Iterate over filled slots with their indices.
    pub fn filled(&self) -> impl Iterator<Item = (usize, &FrameSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.get().map(|slot| (i, slot)))
    }

    /// Indices of slots that are still empty.
    pub fn missing(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| !self.is_filled(i))
            .collect()
    }
}
