use bytemuck::Pod;
use glam::{Mat4, Vec3};

use crate::{
    key::{assert_finite_camera, distance_key},
    sorting::{is_reordering, sort_order},
    types::{validate_indices, Aabb, DistanceMode, MeshValidationError, Sorting},
};

/// Integer type an index buffer can be made of.
pub trait IndexFormat: Pod {
    fn to_u32(self) -> u32;
}

impl IndexFormat for u16 {
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl IndexFormat for u32 {
    fn to_u32(self) -> u32 {
        self
    }
}

/// Reorders the triangles of `indices` by distance to `camera_location`.
///
/// Triangles move as a whole, so winding is preserved. `positions` must be in
/// the same space as the camera. Returns true if the order changed; the
/// buffer is left untouched on error.
///
/// # Panics
///
/// Panics if `camera_location` or any of `positions` is not finite.
pub fn sort_triangle_indices<I: IndexFormat>(
    positions: &[Vec3],
    indices: &mut [I],
    camera_location: Vec3,
    sorting: Sorting,
    mode: DistanceMode,
) -> Result<bool, MeshValidationError> {
    assert_finite_positions(positions);
    validate_indices(indices.iter().map(|i| i.to_u32()), positions.len())?;
    Ok(sort_validated(positions, indices, camera_location, sorting, mode))
}

fn sort_validated<I: IndexFormat>(
    positions: &[Vec3],
    indices: &mut [I],
    camera_location: Vec3,
    sorting: Sorting,
    mode: DistanceMode,
) -> bool {
    profiling::scope!("Triangle Sorting");
    assert_finite_camera(camera_location);

    let triangles: &mut [[I; 3]] = bytemuck::cast_slice_mut(indices);

    let keys: Vec<f32> = triangles
        .iter()
        .map(|tri| distance_key(&triangle_bounds(positions, tri), camera_location, mode))
        .collect();
    let order = sort_order(&keys, sorting);

    if !is_reordering(&order) {
        return false;
    }

    let original = triangles.to_vec();
    for (dst, &src) in triangles.iter_mut().zip(&order) {
        *dst = original[src];
    }

    log::trace!("Reordered {} triangles", triangles.len());

    true
}

fn assert_finite_positions(positions: &[Vec3]) {
    if let Some((index, position)) = positions.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        panic!("mesh positions must be finite, got {position:?} at index {index}");
    }
}

fn triangle_bounds<I: IndexFormat>(positions: &[Vec3], triangle: &[I; 3]) -> Aabb {
    Aabb::from_points(&triangle.map(|i| positions[i.to_u32() as usize]))
}

/// A mesh whose triangles are sorted for a world space camera.
///
/// World space positions are cached and only recomputed when the transform
/// changes.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    world_positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl TriangleMesh {
    /// Validates the index buffer and builds a mesh with an identity transform.
    ///
    /// # Panics
    ///
    /// Panics if any position is not finite.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, MeshValidationError> {
        assert_finite_positions(&positions);
        validate_indices(indices.iter().copied(), positions.len())?;

        Ok(Self {
            world_positions: positions.clone(),
            positions,
            indices,
        })
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.set_transform(transform);
        self
    }

    /// Model -> World matrix.
    ///
    /// # Panics
    ///
    /// Panics if the transformed positions are not finite.
    pub fn set_transform(&mut self, transform: Mat4) {
        let world_positions: Vec<Vec3> = self
            .positions
            .iter()
            .map(|&p| transform.transform_point3(p))
            .collect();
        assert_finite_positions(&world_positions);
        self.world_positions = world_positions;
    }

    /// The index buffer in the last applied draw order.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Reorders the index buffer in place. Returns true if the order changed.
    pub fn sort(&mut self, camera_location: Vec3, sorting: Sorting, mode: DistanceMode) -> bool {
        sort_validated(&self.world_positions, &mut self.indices, camera_location, sorting, mode)
    }
}
