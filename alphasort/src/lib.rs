//! Camera distance sorting for transparent geometry.
//!
//! Alpha blended surfaces only composite correctly when they are drawn from
//! the farthest to the nearest. alphasort computes that order for whole scene
//! objects (a [`DrawQueue`]) and for the triangles of a single mesh (an index
//! buffer reordered in place), and reports whether the order changed since it
//! was last applied so redundant buffer uploads can be skipped.
//!
//! The [`TransparencySorter`] ties everything together: it owns the settings,
//! camera, and queues, and only resorts after it has been told the camera or
//! geometry changed.
//!
//! ```
//! use alphasort::{types::{glam::Vec3, Aabb, SortSettings}, SortOutcome, TransparencySorter};
//!
//! let mut sorter = TransparencySorter::new(SortSettings::default());
//! let near = sorter.add_object(Aabb::from_point(Vec3::new(0.0, 0.0, 100.0)));
//! let far = sorter.add_object(Aabb::from_point(Vec3::new(0.0, 0.0, -100.0)));
//! sorter.set_camera_location(Vec3::new(0.0, 0.0, 500.0));
//!
//! assert_eq!(sorter.sort_if_stale(), SortOutcome::Sorted { changed: true });
//! assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [far, near]);
//! ```

pub use alphasort_types as types;

mod camera;
mod handle_alloc;
pub mod key;
mod queue;
mod settings;
mod sorter;
pub mod sorting;
mod triangles;

pub use camera::CameraManager;
pub use queue::{DrawQueue, QueueEntry};
pub use settings::{load_settings, parse_settings, validate_settings, SettingsError};
pub use sorter::{SortOutcome, SortState, SortStatistics, TransparencySorter};
pub use triangles::{sort_triangle_indices, IndexFormat, TriangleMesh};
