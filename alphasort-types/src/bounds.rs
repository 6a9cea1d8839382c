use glam::{Mat4, Vec3, Vec3A};
use serde::{Deserialize, Serialize};

/// Axis aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of zero size sitting at `point`.
    pub const fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Box centered on `center` extending `half_extents` in each direction.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box enclosing all points. An empty slice yields a zero sized box
    /// at the origin.
    pub fn from_points(points: &[Vec3]) -> Self {
        let first = if let Some(first) = points.first() {
            *first
        } else {
            return Self::default();
        };
        let mut max = Vec3A::from(first);
        let mut min = max;

        for pos in points.iter().skip(1) {
            let pos = Vec3A::from(*pos);
            max = max.max(pos);
            min = min.min(pos);
        }

        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// All 8 corners. Bit 0 of the index selects x, bit 1 y, bit 2 z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
    }

    /// Box enclosing this box after it has been transformed.
    pub fn transform(&self, transform: Mat4) -> Self {
        let corners = self.corners().map(|c| transform.transform_point3(c));
        Self::from_points(&corners)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::Aabb;

    #[test]
    fn bounds_of_points() {
        let aabb = Aabb::from_points(&[Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 3.0), Vec3::ZERO]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn corners_cover_every_combination() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let corners = aabb.corners();
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(corners[0], Vec3::ZERO);
        assert_eq!(corners[7], Vec3::ONE);
    }

    #[test]
    fn translated_box() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transform(glam::Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)));
        assert_eq!(moved.center(), Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(moved.half_extents(), Vec3::ONE);
    }
}
