//! Axis-aligned bounding boxes
//!
//! Boxes are recomputed from a node's local bounds and its current transform
//! once per tick. They are deliberately not interpolated: collision queries
//! work on discrete tick geometry.

use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::scene::transform::TransformState;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty set
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| Self {
            min: aabb.min.inf(p),
            max: aabb.max.sup(p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    ///
    /// Closed intervals on every axis, so touching faces count. Zero-volume
    /// boxes go through the same test.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Box enclosing `local` after applying `matrix`
    pub fn transformed(local: &AABB, matrix: &Mat4) -> Self {
        let corners = local
            .corners()
            .map(|c| matrix.transform_point(&Point3::from(c)).coords);
        // Eight corners, never empty
        Self::from_points(corners.iter()).unwrap_or(*local)
    }

    /// Recompute this box from local bounds and a transform state
    pub fn update(&mut self, local: &AABB, position: Vec3, scale: Vec3, rotation: Vec3) {
        let state = TransformState {
            position,
            rotation,
            scale,
        };
        *self = Self::transformed(local, &state.to_matrix());
    }
}

/// Free-function form of [`AABB::intersects`]
pub fn intersects(a: &AABB, b: &AABB) -> bool {
    a.intersects(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> AABB {
        AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_intersects() {
        let overlapping = AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(2.0, 2.0, 2.0));
        let apart = AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));

        assert!(intersects(&unit(), &overlapping));
        assert!(!intersects(&unit(), &apart));
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let boxes = [
            unit(),
            AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(2.0, 2.0, 2.0)),
            AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0)),
            AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
            AABB::new(Vec3::new(-5.0, 0.2, 0.2), Vec3::new(5.0, 0.3, 0.3)),
        ];

        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a));
            }
        }
    }

    #[test]
    fn test_degenerate_box_uses_interval_test() {
        let flat = AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(unit().intersects(&flat));
        assert!(flat.intersects(&flat));
    }

    #[test]
    fn test_update_is_pure_in_inputs() {
        let local = AABB::default();
        let mut a = AABB::default();
        let mut b = AABB::default();

        let position = Vec3::new(3.0, -1.0, 2.0);
        let scale = Vec3::new(2.0, 1.0, 0.5);
        let rotation = Vec3::new(20.0, 7.0, 10.0);

        a.update(&local, position, scale, rotation);
        let first = a;
        a.update(&local, position, scale, rotation);
        b.update(&local, position, scale, rotation);

        assert_eq!(a, first);
        assert_eq!(a, b);
    }

    #[test]
    fn test_update_applies_scale_and_rotation() {
        let local = AABB::default();
        let mut aabb = AABB::default();

        aabb.update(&local, Vec3::new(5.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 90.0));

        // Scaled along x to half-width 2, then turned onto y
        assert_relative_eq!(aabb.min, Vec3::new(4.0, -2.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(aabb.max, Vec3::new(6.0, 2.0, 1.0), epsilon = 1e-5);
    }
}
