//! Per-primitive sort keys.
//!
//! Keys are squared distances. Only relative order matters, so the square
//! root is never taken.

use glam::{Vec3, Vec3A};
use ordered_float::OrderedFloat;

use crate::types::{Aabb, CornerStatistic, DistanceMode, Sorting};

/// Anything with a world space bounding box can be sorted.
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

/// Squared distance from `camera` to `bounds`, measured the way `mode` says.
pub fn distance_key(bounds: &Aabb, camera: Vec3, mode: DistanceMode) -> f32 {
    let camera = Vec3A::from(camera);
    match mode {
        DistanceMode::Center => Vec3A::from(bounds.center()).distance_squared(camera),
        DistanceMode::AllCorners(statistic) => {
            let distances = bounds.corners().map(|c| Vec3A::from(c).distance_squared(camera));
            match statistic {
                CornerStatistic::Max => distances.into_iter().fold(f32::MIN, f32::max),
                CornerStatistic::Min => distances.into_iter().fold(f32::MAX, f32::min),
                CornerStatistic::Mean => distances.iter().sum::<f32>() / distances.len() as f32,
            }
        }
    }
}

/// Turns a distance into a key which sorts ascending in the requested draw
/// order.
pub fn ordering_key(distance: f32, sorting: Sorting) -> OrderedFloat<f32> {
    match sorting {
        Sorting::FrontToBack => OrderedFloat(distance),
        Sorting::BackToFront => OrderedFloat(-distance),
    }
}

/// # Panics
///
/// Panics if `location` is not finite.
pub fn assert_finite_camera(location: Vec3) {
    assert!(location.is_finite(), "camera location must be finite, got {location:?}");
}

pub fn compute_keys<T: Bounded>(items: &[T], camera: Vec3, mode: DistanceMode) -> Vec<f32> {
    items.iter().map(|i| distance_key(&i.bounds(), camera, mode)).collect()
}
