//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by the render core together with
//! the projection helpers shared by scene cameras and shadow cameras.

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Transform a point by `matrix` including the perspective divide.
    ///
    /// A `w` of zero leaves the point undivided rather than producing infinities.
    pub fn transform_coordinate(point: Vec3, matrix: &Mat4) -> Vec3 {
        let h = matrix * point.push(1.0);
        if h.w.abs() <= f32::EPSILON {
            return h.xyz();
        }
        h.xyz() / h.w
    }

    /// Whether the linear part of `matrix` flips handedness (negative determinant).
    pub fn is_mirrored(matrix: &Mat4) -> bool {
        matrix.fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0
    }
}

/// Extension trait for Mat4 with projection and view constructors
///
/// All projections follow the same chain used by [`crate::render::primitives::Camera`]:
/// `P × X × V`, where `X` is [`Mat4Ext::vulkan_coordinate_transform`] and depth lands
/// in `[0, 1]`.
pub trait Mat4Ext {
    /// Create a perspective projection matrix (depth mapped to `[0, 1]`)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an off-center orthographic projection (depth mapped to `[0, 1]`)
    fn orthographic_off_center(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Intermediate coordinate system transformation (flips Y and Z)
    fn vulkan_coordinate_transform() -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn orthographic_off_center(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / (right - left);
        result[(0, 3)] = -(right + left) / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(1, 3)] = -(top + bottom) / (top - bottom);
        result[(2, 2)] = 1.0 / (far - near);
        result[(2, 3)] = -near / (far - near);

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        // Right-handed: the camera looks down its local -Z
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn vulkan_coordinate_transform() -> Mat4 {
        Mat4::new(
            1.0,  0.0,  0.0, 0.0,
            0.0, -1.0,  0.0, 0.0,
            0.0,  0.0, -1.0, 0.0,
            0.0,  0.0,  0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_perspective_depth_range() {
        let projection = Mat4::perspective(utils::deg_to_rad(60.0), 1.5, 0.5, 50.0);
        let chain = projection * Mat4::vulkan_coordinate_transform();

        // View space looks down -Z, so the near plane sits at z = -near
        let near = utils::transform_coordinate(Vec3::new(0.0, 0.0, -0.5), &chain);
        let far = utils::transform_coordinate(Vec3::new(0.0, 0.0, -50.0), &chain);

        assert_relative_eq!(near.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(far.z, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_orthographic_maps_box_to_unit_cube() {
        let projection = Mat4::orthographic_off_center(-4.0, 4.0, -2.0, 2.0, 1.0, 9.0);
        let chain = projection * Mat4::vulkan_coordinate_transform();

        let corner = utils::transform_coordinate(Vec3::new(4.0, -2.0, -9.0), &chain);
        assert_relative_eq!(corner, Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);

        let near_center = utils::transform_coordinate(Vec3::new(0.0, 0.0, -1.0), &chain);
        assert_relative_eq!(near_center, Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());

        let transformed = utils::transform_coordinate(eye, &view);
        assert_relative_eq!(transformed, Vec3::zeros(), epsilon = EPSILON);

        // The target lands straight ahead on -Z
        let target = utils::transform_coordinate(Vec3::zeros(), &view);
        assert_relative_eq!(target.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(target.y, 0.0, epsilon = EPSILON);
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_mirrored_matrix_detection() {
        assert!(!utils::is_mirrored(&Mat4::identity()));
        assert!(utils::is_mirrored(&Mat4::new_nonuniform_scaling(&Vec3::new(-1.0, 1.0, 1.0))));
        assert!(!utils::is_mirrored(&Mat4::new_nonuniform_scaling(&Vec3::new(-1.0, -1.0, 1.0))));
    }
}
