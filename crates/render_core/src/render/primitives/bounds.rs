//! Bounding volumes

use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::{RenderError, RenderResult};

/// Sphere given by center and radius
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    /// Center in world space
    pub center: Vec3,
    /// Radius, never negative
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Circumscribed sphere of the triangle `a`, `b`, `c`
    ///
    /// The center is the circumcenter in the triangle's plane. Collinear points fall
    /// back to the sphere spanning the longest edge.
    pub fn circumscribe(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let normal_len2 = normal.norm_squared();

        if normal_len2 <= f32::EPSILON * ab.norm_squared().max(ac.norm_squared()).max(1.0) {
            let bc = c - b;
            let (p, q) = [(a, b), (a, c), (b, c)]
                .into_iter()
                .zip([ab.norm_squared(), ac.norm_squared(), bc.norm_squared()])
                .max_by(|(_, l), (_, r)| l.total_cmp(r))
                .map_or((a, a), |(pair, _)| pair);
            let center = (p + q) * 0.5;
            return Self::new(center, (q - p).norm() * 0.5);
        }

        let offset = (normal.cross(&ab) * ac.norm_squared() + ac.cross(&normal) * ab.norm_squared()) / (2.0 * normal_len2);
        Self::new(a + offset, offset.norm())
    }

    /// Sphere bounding the frustum described by `view_projection`
    ///
    /// Unprojects the near-left-bottom, far-left-bottom and far-right-top corners of
    /// the `[0, 1]` depth clip volume and circumscribes them.
    pub fn from_frustum(view_projection: &Mat4) -> RenderResult<Self> {
        let inverse = view_projection.try_inverse().ok_or(RenderError::DegenerateFrustum)?;

        let near_bottom_left = utils::transform_coordinate(Vec3::new(-1.0, -1.0, 0.0), &inverse);
        let far_bottom_left = utils::transform_coordinate(Vec3::new(-1.0, -1.0, 1.0), &inverse);
        let far_top_right = utils::transform_coordinate(Vec3::new(1.0, 1.0, 1.0), &inverse);

        Ok(Self::circumscribe(near_bottom_left, far_bottom_left, far_top_right))
    }

    /// Whether `point` lies inside or on the sphere, with a small tolerance
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.center).norm() <= self.radius * (1.0 + 1e-4) + 1e-5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    #[test]
    fn test_right_triangle_radius_is_half_hypotenuse() {
        let sphere = BoundingSphere::circumscribe(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        );

        assert_relative_eq!(sphere.radius, 2.5, epsilon = 1e-5);
        assert_relative_eq!(sphere.center, Vec3::new(1.5, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_circumcenter_is_equidistant_in_3d() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(-3.0, 4.0, 2.0);
        let c = Vec3::new(5.0, 1.0, -6.0);
        let sphere = BoundingSphere::circumscribe(a, b, c);

        for point in [a, b, c] {
            assert_relative_eq!((point - sphere.center).norm(), sphere.radius, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_collinear_points_span_longest_edge() {
        let sphere = BoundingSphere::circumscribe(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(sphere.center, Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(sphere.radius, 2.0);
    }

    #[test]
    fn test_frustum_sphere_contains_frustum_corners() {
        let mut camera = Camera::perspective(Vec3::new(0.0, 1.0, 5.0), 60.0, 1.5, 0.5, 30.0);
        camera.look_at(Vec3::zeros(), Vec3::y());
        let vp = camera.get_view_projection_matrix();

        let sphere = BoundingSphere::from_frustum(&vp).unwrap();
        let inverse = vp.try_inverse().unwrap();
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                let far_corner = utils::transform_coordinate(Vec3::new(x, y, 1.0), &inverse);
                assert!(sphere.contains(&far_corner), "far corner {far_corner:?} outside {sphere:?}");
            }
        }
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        assert_eq!(
            BoundingSphere::from_frustum(&Mat4::zeros()),
            Err(RenderError::DegenerateFrustum)
        );
    }
}
