use glam::Vec3;

use crate::{
    key::{assert_finite_camera, compute_keys, Bounded},
    sorting::{is_reordering, is_sorted, sort_order},
    types::{Aabb, DistanceMode, RawObjectHandle, Sorting},
};

/// One object waiting to be drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QueueEntry {
    pub handle: RawObjectHandle,
    /// World space.
    pub bounds: Aabb,
}

impl Bounded for QueueEntry {
    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Objects in the order they will be submitted.
///
/// The queue always holds the last applied order; sorting permutes it in
/// place.
#[derive(Debug, Clone, Default)]
pub struct DrawQueue {
    entries: Vec<QueueEntry>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object to the end of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` is not finite.
    pub fn push(&mut self, handle: RawObjectHandle, bounds: Aabb) {
        assert_finite_bounds(&bounds);
        self.entries.push(QueueEntry { handle, bounds });
    }

    pub fn remove(&mut self, handle: RawObjectHandle) -> Option<QueueEntry> {
        let position = self.position(handle)?;
        Some(self.entries.remove(position))
    }

    /// Returns false if the handle is not in the queue.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` is not finite.
    pub fn update_bounds(&mut self, handle: RawObjectHandle, bounds: Aabb) -> bool {
        assert_finite_bounds(&bounds);
        match self.position(handle) {
            Some(position) => {
                self.entries[position].bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn handles(&self) -> impl Iterator<Item = RawObjectHandle> + '_ {
        self.entries.iter().map(|e| e.handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorders the queue for the camera. Returns true if the order changed.
    ///
    /// # Panics
    ///
    /// Panics if `camera_location` is not finite.
    pub fn sort(&mut self, camera_location: Vec3, sorting: Sorting, mode: DistanceMode) -> bool {
        profiling::scope!("DrawQueue::sort");
        assert_finite_camera(camera_location);

        let keys = compute_keys(&self.entries, camera_location, mode);
        let order = sort_order(&keys, sorting);

        if !is_reordering(&order) {
            return false;
        }

        self.entries = order.iter().map(|&i| self.entries[i]).collect();
        debug_assert!(is_sorted(&order.iter().map(|&i| keys[i]).collect::<Vec<_>>(), sorting));

        true
    }

    fn position(&self, handle: RawObjectHandle) -> Option<usize> {
        self.entries.iter().position(|e| e.handle == handle)
    }
}

fn assert_finite_bounds(bounds: &Aabb) {
    assert!(bounds.is_finite(), "object bounds must be finite, got {bounds:?}");
}
