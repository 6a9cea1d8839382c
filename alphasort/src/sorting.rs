use std::borrow::Cow;

use glam::Vec3;

use crate::{
    key::{assert_finite_camera, compute_keys, ordering_key, Bounded},
    types::{DistanceMode, Sorting},
};

/// Stable permutation of `0..keys.len()` which puts the keys in draw order.
///
/// Equal keys keep their input order, so resorting for the same camera never
/// shuffles ties around.
pub fn sort_order(keys: &[f32], sorting: Sorting) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by_key(|&i| ordering_key(keys[i], sorting));
    order
}

/// True if the permutation moves anything.
pub fn is_reordering(order: &[usize]) -> bool {
    order.iter().enumerate().any(|(position, &source)| position != source)
}

/// True if the keys are already in draw order.
pub fn is_sorted(keys: &[f32], sorting: Sorting) -> bool {
    keys.windows(2)
        .all(|pair| ordering_key(pair[0], sorting) <= ordering_key(pair[1], sorting))
}

/// Sorts `objects` by distance to `camera_location`.
///
/// If `sorting` is `None` the objects are handed back untouched.
///
/// # Panics
///
/// Panics if `camera_location` is not finite.
pub fn sort_objects<'a, T: Bounded + Clone>(
    objects: &'a [T],
    camera_location: Vec3,
    sorting: Option<Sorting>,
    mode: DistanceMode,
) -> Cow<'a, [T]> {
    assert_finite_camera(camera_location);

    if let Some(sorting) = sorting {
        profiling::scope!("Sorting");

        let keys = compute_keys(objects, camera_location, mode);
        let order = sort_order(&keys, sorting);

        Cow::Owned(order.into_iter().map(|i| objects[i].clone()).collect())
    } else {
        Cow::Borrowed(objects)
    }
}
