//! Type declarations for the alphasort transparency sorting crate.
//!
//! This is reexported in the alphasort crate proper and includes all the
//! "surface" api arguments.

use std::{fmt::Debug, hash::Hash, marker::PhantomData};

/// Reexport of the glam version alphasort is using.
pub use glam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod bounds;
pub use bounds::*;

/// Non-owning primitive handle.
///
/// alphasort never looks inside the handle, it is carried along so the caller
/// can map a sorted draw order back onto its own render data.
pub struct RawHandle<T> {
    /// Underlying value of the handle.
    pub idx: usize,
    _phantom: PhantomData<T>,
}

impl<T> RawHandle<T> {
    /// Creates a new handle with the given value
    pub const fn new(idx: usize) -> Self {
        Self {
            idx,
            _phantom: PhantomData,
        }
    }
}

// Need Debug/Copy/Clone impls that don't require T: Trait.
impl<T> Debug for RawHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawHandle").field("idx", &self.idx).finish()
    }
}

impl<T> Copy for RawHandle<T> {}

impl<T> Clone for RawHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for RawHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T> Eq for RawHandle<T> {}

impl<T> Hash for RawHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

/// Tag type for differentiating scene objects on the type level.
#[doc(hidden)]
pub struct ObjectTag;
/// Tag type for differentiating meshes on the type level.
#[doc(hidden)]
pub struct MeshTag;

/// Non-owning handle to a scene object in a draw queue.
pub type RawObjectHandle = RawHandle<ObjectTag>;
/// Non-owning handle to a mesh whose triangles get sorted.
pub type RawMeshHandle = RawHandle<MeshTag>;

macro_rules! changeable_struct {
    (
        $(#[$outer:meta])*
        pub struct $name:ident <- $name_change:ident {
            $($(#[$inner:meta])* $field_vis:vis $field_name:ident : $field_type:ty),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$inner])* $field_vis $field_name : $field_type
            ),*
        }
        impl $name {
            pub fn update_from_changes(&mut self, change: $name_change) {
                $(
                    if let Some(inner) = change.$field_name {
                        self.$field_name = inner;
                    }
                );*
            }
        }
        #[doc = concat!("Describes a modification to a ", stringify!($name), ".")]
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct $name_change {
            $(
                $field_vis $field_name : Option<$field_type>
            ),*
        }
    };
}

/// Direction a queue gets sorted in, relative to the camera.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sorting {
    /// Nearest first. Used for opaque queues to maximize early-z rejection.
    FrontToBack,
    /// Farthest first. Required for correct alpha blending.
    #[default]
    BackToFront,
}

/// How the 8 corner distances of a bounding box are reduced to one key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerStatistic {
    /// Farthest corner.
    #[default]
    Max,
    /// Nearest corner.
    Min,
    /// Average of the squared corner distances.
    Mean,
}

/// Which reference point(s) of a primitive's bounding box the sort key is
/// measured to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// Distance to the center of the bounding box. One distance per primitive.
    #[default]
    Center,
    /// Distance to every corner of the bounding box, reduced with the given
    /// statistic. Eight times the work of [`DistanceMode::Center`], but tells
    /// apart boxes which share a center.
    AllCorners(CornerStatistic),
}

changeable_struct! {
    /// Settings for a transparency sorter.
    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    pub struct SortSettings <- SortSettingsChange {
        /// If false, queues are left in insertion order.
        pub enabled: bool,
        pub sorting: Sorting,
        pub mode: DistanceMode,
        /// Camera moves shorter than this do not invalidate the current order.
        pub camera_epsilon: f32,
    }
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sorting: Sorting::BackToFront,
            mode: DistanceMode::Center,
            camera_epsilon: 0.0,
        }
    }
}

impl SortSettings {
    /// The sorting direction to use, or `None` if sorting is turned off.
    pub fn active_sorting(&self) -> Option<Sorting> {
        self.enabled.then_some(self.sorting)
    }
}

/// Error returned from index buffer validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshValidationError {
    #[error("Mesh has {count} indices which is not a multiple of three. Meshes are always composed of triangles")]
    IndexCountNotMultipleOfThree { count: usize },
    #[error(
        "Index at position {index} has the value {value} which is out of bounds for vertex buffers of {max} length"
    )]
    IndexOutOfBounds { index: usize, value: u32, max: u32 },
}

/// Validates that `indices` describes whole triangles into a vertex buffer of
/// `vertex_count` positions.
pub fn validate_indices(
    indices: impl ExactSizeIterator<Item = u32>,
    vertex_count: usize,
) -> Result<(), MeshValidationError> {
    let count = indices.len();
    if count % 3 != 0 {
        return Err(MeshValidationError::IndexCountNotMultipleOfThree { count });
    }

    for (index, value) in indices.enumerate() {
        if value as usize >= vertex_count {
            return Err(MeshValidationError::IndexOutOfBounds {
                index,
                value,
                max: vertex_count as u32,
            });
        }
    }

    Ok(())
}
