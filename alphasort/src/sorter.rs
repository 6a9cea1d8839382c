use glam::{Mat4, Vec3};
use indexmap::IndexMap;

use crate::{
    handle_alloc::HandleAllocator,
    queue::DrawQueue,
    triangles::TriangleMesh,
    types::{Aabb, MeshTag, ObjectTag, RawMeshHandle, RawObjectHandle, SortSettings, SortSettingsChange, Sorting},
    validate_settings, CameraManager,
};

/// Whether the current draw order matches the current camera and geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortState {
    /// Camera, geometry, or settings changed since the last sort.
    Stale,
    /// The draw order matches the current camera.
    Sorted,
}

/// Result of asking the sorter to sort.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// Sorting is turned off in the settings. Nothing was touched.
    Disabled,
    /// The order was already up to date, no work was done.
    Skipped,
    /// A sort ran. `changed` is true if any draw order or index buffer moved.
    Sorted { changed: bool },
}

impl SortOutcome {
    /// True if callers need to re-upload or redraw.
    pub fn changed(self) -> bool {
        matches!(self, Self::Sorted { changed: true })
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SortStatistics {
    /// Sorts which actually ran.
    pub sorts_performed: u64,
    /// Requests that found the order already up to date.
    pub sorts_skipped: u64,
    /// Sorts which moved something.
    pub orders_changed: u64,
}

/// Owns everything needed to keep transparent geometry in draw order.
///
/// Sorting is event driven: the sorter only does work after it has been told
/// the camera moved, geometry changed, or the settings changed.
pub struct TransparencySorter {
    settings: SortSettings,
    camera: CameraManager,
    /// Camera location the current order was computed for.
    sorted_location: Option<Vec3>,
    state: SortState,
    statistics: SortStatistics,

    object_handles: HandleAllocator<ObjectTag>,
    queue: DrawQueue,

    mesh_handles: HandleAllocator<MeshTag>,
    meshes: IndexMap<RawMeshHandle, TriangleMesh>,
}

impl TransparencySorter {
    /// # Panics
    ///
    /// Panics if `settings.camera_epsilon` is negative or not finite.
    pub fn new(settings: SortSettings) -> Self {
        profiling::scope!("TransparencySorter::new");
        assert_valid_settings(&settings);

        Self {
            settings,
            camera: CameraManager::default(),
            sorted_location: None,
            state: SortState::Stale,
            statistics: SortStatistics::default(),
            object_handles: HandleAllocator::new(),
            queue: DrawQueue::new(),
            mesh_handles: HandleAllocator::new(),
            meshes: IndexMap::new(),
        }
    }

    pub fn settings(&self) -> &SortSettings {
        &self.settings
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    pub fn statistics(&self) -> SortStatistics {
        self.statistics
    }

    pub fn queue(&self) -> &DrawQueue {
        &self.queue
    }

    pub fn mesh(&self, handle: RawMeshHandle) -> Option<&TriangleMesh> {
        self.meshes.get(&handle)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (RawMeshHandle, &TriangleMesh)> + '_ {
        self.meshes.iter().map(|(&handle, mesh)| (handle, mesh))
    }

    /// Applies a settings change. Changes which affect the order invalidate
    /// the current one.
    ///
    /// # Panics
    ///
    /// Panics if the change sets a negative or non-finite `camera_epsilon`.
    pub fn apply_change(&mut self, change: SortSettingsChange) {
        let mut settings = self.settings.clone();
        settings.update_from_changes(change);
        assert_valid_settings(&settings);
        let old = std::mem::replace(&mut self.settings, settings);

        let reorders = old.sorting != self.settings.sorting
            || old.mode != self.settings.mode
            || (!old.enabled && self.settings.enabled);
        if reorders {
            log::debug!("Sort settings changed from {:?} to {:?}", old, self.settings);
            self.mark_stale();
        }
    }

    /// Moves the camera. Moves no longer than the configured epsilon keep the
    /// current order.
    ///
    /// # Panics
    ///
    /// Panics if `location` is not finite.
    pub fn set_camera_location(&mut self, location: Vec3) {
        self.set_camera(CameraManager::from_location(location));
    }

    /// Moves the camera to the location described by a world -> view matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix does not yield a finite location.
    pub fn set_camera_view(&mut self, view: Mat4) {
        self.set_camera(CameraManager::new(view));
    }

    fn set_camera(&mut self, camera: CameraManager) {
        let location = camera.location();
        self.camera = camera;

        let moved = match self.sorted_location {
            Some(sorted) => sorted.distance(location) > self.settings.camera_epsilon,
            None => true,
        };
        if moved {
            self.mark_stale();
        }
    }

    /// Adds an object to the end of the draw queue.
    pub fn add_object(&mut self, bounds: Aabb) -> RawObjectHandle {
        let handle = self.object_handles.allocate();
        self.queue.push(handle, bounds);
        self.mark_stale();
        handle
    }

    pub fn remove_object(&mut self, handle: RawObjectHandle) {
        if self.queue.remove(handle).is_some() {
            self.object_handles.deallocate(handle);
        } else {
            log::warn!("Tried to remove object {:?} which is not in the queue", handle);
        }
    }

    pub fn update_object_bounds(&mut self, handle: RawObjectHandle, bounds: Aabb) {
        if self.queue.update_bounds(handle, bounds) {
            self.mark_stale();
        } else {
            log::warn!("Tried to update object {:?} which is not in the queue", handle);
        }
    }

    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> RawMeshHandle {
        let handle = self.mesh_handles.allocate();
        self.meshes.insert(handle, mesh);
        self.mark_stale();
        handle
    }

    pub fn remove_mesh(&mut self, handle: RawMeshHandle) -> Option<TriangleMesh> {
        let mesh = self.meshes.shift_remove(&handle);
        if mesh.is_some() {
            self.mesh_handles.deallocate(handle);
        } else {
            log::warn!("Tried to remove mesh {:?} which does not exist", handle);
        }
        mesh
    }

    /// Model -> World matrix of a mesh.
    pub fn set_mesh_transform(&mut self, handle: RawMeshHandle, transform: Mat4) {
        match self.meshes.get_mut(&handle) {
            Some(mesh) => {
                mesh.set_transform(transform);
                self.mark_stale();
            }
            None => log::warn!("Tried to move mesh {:?} which does not exist", handle),
        }
    }

    /// Tells the sorter that geometry changed behind its back.
    pub fn notify_geometry_changed(&mut self) {
        self.mark_stale();
    }

    /// Sorts if anything changed since the last sort.
    pub fn sort_if_stale(&mut self) -> SortOutcome {
        let Some(sorting) = self.settings.active_sorting() else {
            return SortOutcome::Disabled;
        };

        match self.state {
            SortState::Sorted => {
                self.statistics.sorts_skipped += 1;
                SortOutcome::Skipped
            }
            SortState::Stale => self.sort(sorting),
        }
    }

    /// Sorts regardless of state.
    pub fn force_sort(&mut self) -> SortOutcome {
        match self.settings.active_sorting() {
            Some(sorting) => self.sort(sorting),
            None => SortOutcome::Disabled,
        }
    }

    fn sort(&mut self, sorting: Sorting) -> SortOutcome {
        profiling::scope!("TransparencySorter::sort");

        let location = self.camera.location();
        let mode = self.settings.mode;

        let mut changed = self.queue.sort(location, sorting, mode);
        for mesh in self.meshes.values_mut() {
            changed |= mesh.sort(location, sorting, mode);
        }

        self.sorted_location = Some(location);
        self.state = SortState::Sorted;
        self.statistics.sorts_performed += 1;
        if changed {
            self.statistics.orders_changed += 1;
        }

        log::trace!(
            "Sorted {} objects and {} meshes for camera at {}, changed: {}",
            self.queue.len(),
            self.meshes.len(),
            location,
            changed
        );

        SortOutcome::Sorted { changed }
    }

    fn mark_stale(&mut self) {
        self.state = SortState::Stale;
    }
}

fn assert_valid_settings(settings: &SortSettings) {
    if let Err(err) = validate_settings(settings) {
        panic!("{err}");
    }
}

impl Default for TransparencySorter {
    fn default() -> Self {
        Self::new(SortSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::types::{CornerStatistic, DistanceMode, Sorting};

    fn point(z: f32) -> Aabb {
        Aabb::from_point(Vec3::new(0.0, 0.0, z))
    }

    #[test]
    fn starts_stale_then_sorted() {
        let mut sorter = TransparencySorter::default();
        sorter.add_object(point(0.0));
        assert_eq!(sorter.state(), SortState::Stale);

        assert_eq!(sorter.sort_if_stale(), SortOutcome::Sorted { changed: false });
        assert_eq!(sorter.state(), SortState::Sorted);
        assert_eq!(sorter.sort_if_stale(), SortOutcome::Skipped);
        assert_eq!(
            sorter.statistics(),
            SortStatistics {
                sorts_performed: 1,
                sorts_skipped: 1,
                orders_changed: 0,
            }
        );
    }

    #[test]
    fn same_camera_location_stays_sorted() {
        let mut sorter = TransparencySorter::default();
        sorter.set_camera_location(Vec3::new(0.0, 0.0, 5.0));
        sorter.sort_if_stale();

        sorter.set_camera_location(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(sorter.state(), SortState::Sorted);

        sorter.set_camera_location(Vec3::new(0.0, 0.0, 6.0));
        assert_eq!(sorter.state(), SortState::Stale);
    }

    #[test]
    fn small_moves_within_epsilon_accumulate() {
        let mut sorter = TransparencySorter::new(SortSettings {
            camera_epsilon: 1.0,
            ..Default::default()
        });
        sorter.sort_if_stale();

        sorter.set_camera_location(Vec3::new(0.6, 0.0, 0.0));
        assert_eq!(sorter.state(), SortState::Sorted);
        // Measured against where the last sort happened, not the last move.
        sorter.set_camera_location(Vec3::new(1.2, 0.0, 0.0));
        assert_eq!(sorter.state(), SortState::Stale);
    }

    #[test]
    fn settings_changes() {
        let mut sorter = TransparencySorter::default();
        sorter.sort_if_stale();

        sorter.apply_change(SortSettingsChange {
            camera_epsilon: Some(2.0),
            ..Default::default()
        });
        assert_eq!(sorter.state(), SortState::Sorted);

        sorter.apply_change(SortSettingsChange {
            mode: Some(DistanceMode::AllCorners(CornerStatistic::Max)),
            ..Default::default()
        });
        assert_eq!(sorter.state(), SortState::Stale);
    }

    #[test]
    #[should_panic(expected = "camera_epsilon must be finite and non-negative")]
    fn nan_epsilon_change_fails_fast() {
        let mut sorter = TransparencySorter::default();
        sorter.apply_change(SortSettingsChange {
            camera_epsilon: Some(f32::NAN),
            ..Default::default()
        });
    }

    #[test]
    #[should_panic(expected = "camera_epsilon must be finite and non-negative")]
    fn negative_epsilon_fails_fast() {
        TransparencySorter::new(SortSettings {
            camera_epsilon: -1.0,
            ..Default::default()
        });
    }

    #[test]
    fn disabled_sorting_touches_nothing() {
        let mut sorter = TransparencySorter::default();
        sorter.apply_change(SortSettingsChange {
            enabled: Some(false),
            ..Default::default()
        });
        let a = sorter.add_object(point(100.0));
        let b = sorter.add_object(point(-100.0));
        sorter.set_camera_location(Vec3::new(0.0, 0.0, 500.0));

        assert_eq!(sorter.sort_if_stale(), SortOutcome::Disabled);
        assert_eq!(sorter.force_sort(), SortOutcome::Disabled);
        assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [a, b]);

        sorter.apply_change(SortSettingsChange {
            enabled: Some(true),
            ..Default::default()
        });
        assert!(sorter.sort_if_stale().changed());
        assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [b, a]);
    }

    #[test]
    fn direction_change_reverses_queue() {
        let mut sorter = TransparencySorter::default();
        let handles: Vec<_> = [0.0, -100.0, 100.0].into_iter().map(|z| sorter.add_object(point(z))).collect();
        sorter.set_camera_location(Vec3::new(0.0, 0.0, 500.0));
        sorter.sort_if_stale();

        sorter.apply_change(SortSettingsChange {
            sorting: Some(Sorting::FrontToBack),
            ..Default::default()
        });
        assert!(sorter.sort_if_stale().changed());
        assert_eq!(
            sorter.queue().handles().collect::<Vec<_>>(),
            [handles[2], handles[0], handles[1]]
        );
    }

    #[test]
    fn object_lifecycle_marks_stale() {
        let mut sorter = TransparencySorter::default();
        let a = sorter.add_object(point(0.0));
        sorter.sort_if_stale();

        sorter.update_object_bounds(a, point(1.0));
        assert_eq!(sorter.state(), SortState::Stale);
        sorter.sort_if_stale();

        sorter.remove_object(a);
        assert!(sorter.queue().is_empty());
        // Removal keeps the remaining relative order intact.
        assert_eq!(sorter.state(), SortState::Sorted);

        assert_eq!(sorter.add_object(point(0.0)), a);
    }

    #[test]
    fn meshes_sort_with_objects() {
        let mut sorter = TransparencySorter::default();
        let positions = vec![
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];
        let mesh = sorter.add_mesh(TriangleMesh::new(positions, vec![0, 1, 2, 3, 4, 5]).unwrap());
        sorter.set_camera_location(Vec3::new(0.0, 0.0, 10.0));

        assert!(sorter.sort_if_stale().changed());
        assert_eq!(sorter.mesh(mesh).unwrap().indices(), [3, 4, 5, 0, 1, 2]);

        sorter.set_mesh_transform(mesh, Mat4::from_translation(Vec3::new(0.0, 0.0, 100.0)));
        assert_eq!(sorter.state(), SortState::Stale);
        // Both triangles are now past the camera, so the z = 1 triangle is farthest.
        assert_eq!(sorter.sort_if_stale(), SortOutcome::Sorted { changed: true });
        assert_eq!(sorter.mesh(mesh).unwrap().indices(), [0, 1, 2, 3, 4, 5]);

        assert!(sorter.remove_mesh(mesh).is_some());
        assert!(sorter.mesh(mesh).is_none());
    }
}
