//! # 3D Camera System
//!
//! Provides camera abstractions for 3D rendering with the matrix chain used
//! throughout the render core.
//!
//! ## Design Principles
//! - **Backend-agnostic**: No GPU dependencies in camera math
//! - **On-demand matrices**: Matrices are derived from the parameters when asked for
//! - **One chain**: every camera produces `P × X × V`

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::shader::ShaderData;

/// Uniform names a camera publishes into its [`ShaderData`]
pub mod uniforms {
    /// World-to-view matrix
    pub const VIEW: &str = "u_View";
    /// Projection matrix including the coordinate transform
    pub const PROJECTION: &str = "u_Projection";
    /// Combined view-projection matrix
    pub const VIEW_PROJECTION: &str = "u_ViewProjection";
    /// Camera position in world space
    pub const CAMERA_POS: &str = "u_CameraPos";
}

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov: f32,
        /// Width / height
        aspect: f32,
    },
    /// Off-center orthographic projection
    Orthographic {
        /// Left edge of the view volume
        left: f32,
        /// Right edge of the view volume
        right: f32,
        /// Bottom edge of the view volume
        bottom: f32,
        /// Top edge of the view volume
        top: f32,
    },
}

/// 3D Camera for perspective and orthographic projections
///
/// # Coordinate System
/// Uses a right-handed Y-up coordinate system in view space with the camera looking
/// down -Z. The coordinate transform `X` flips Y and Z afterwards so that depth lands
/// in `[0, 1]` with +Z pointing into the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection model
    pub projection: Projection,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking at the origin with +Y up
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use render_core::foundation::math::Vec3;
    /// use render_core::render::primitives::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 2.0, 5.0), 75.0, 16.0 / 9.0, 0.1, 100.0);
    /// assert!(camera.is_perspective());
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            projection: Projection::Perspective {
                fov: utils::deg_to_rad(fov_degrees),
                aspect,
            },
            near,
            far,
        }
    }

    /// Create an orthographic camera looking at the origin with +Y up
    pub fn orthographic(position: Vec3, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            projection: Projection::Orthographic { left, right, bottom, top },
            near,
            far,
        }
    }

    /// Whether the camera uses a perspective projection
    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {:?}", target);
    }

    /// Configure camera to look at a specific point with custom up vector
    ///
    /// The up vector doesn't need to be perpendicular to the view direction; the view
    /// matrix orthonormalizes it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Replace the projection with an orthographic volume
    pub fn set_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.projection = Projection::Orthographic { left, right, bottom, top };
        self.near = near;
        self.far = far;
    }

    /// Update camera aspect ratio for viewport changes
    ///
    /// Orthographic cameras ignore this.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: current, .. } = &mut self.projection {
            // Only log significant changes to avoid noise during resizes
            if (*current - aspect).abs() > 0.01 {
                log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", current, aspect);
            }
            *current = aspect;
        }
    }

    /// Normalized viewing direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Projection matrix `P × X` over the camera's own clip range
    pub fn get_projection_matrix(&self) -> Mat4 {
        self.projection_matrix_for_range(self.near, self.far)
    }

    /// Projection matrix `P × X` with the clip range replaced by `[near, far]`
    ///
    /// Used to bound a slice of the camera frustum without touching the camera.
    pub fn projection_matrix_for_range(&self, near: f32, far: f32) -> Mat4 {
        let projection = match self.projection {
            Projection::Perspective { fov, aspect } => Mat4::perspective(fov, aspect, near, far),
            Projection::Orthographic { left, right, bottom, top } => {
                Mat4::orthographic_off_center(left, right, bottom, top, near, far)
            }
        };
        projection * Mat4::vulkan_coordinate_transform()
    }

    /// Generate combined view-projection matrix `P × X × V`
    ///
    /// For rendering individual objects, multiply this result by the model matrix:
    /// `Final = ViewProjection × Model × Vertex`
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }

    /// View-projection matrix whose clip range is `[near, far]`
    pub fn view_projection_for_range(&self, near: f32, far: f32) -> Mat4 {
        self.projection_matrix_for_range(near, far) * self.get_view_matrix()
    }

    /// Write the camera's matrices and position into `data`
    pub fn publish(&self, data: &mut ShaderData) {
        let view = self.get_view_matrix();
        let projection = self.get_projection_matrix();
        data.set_matrix4(uniforms::VIEW, view);
        data.set_matrix4(uniforms::PROJECTION, projection);
        data.set_matrix4(uniforms::VIEW_PROJECTION, projection * view);
        data.set_vector3(uniforms::CAMERA_POS, self.position);
    }
}

impl Default for Camera {
    /// Perspective camera above and behind the origin, 45 degree FOV, 16:9
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            projection: Projection::Perspective {
                fov: std::f32::consts::FRAC_PI_4,
                aspect: 16.0 / 9.0,
            },
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::transform_coordinate;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_projection_maps_clip_range_to_unit_depth() {
        let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, 1.0, 1.0, 21.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        let vp = camera.get_view_projection_matrix();
        let near = transform_coordinate(Vec3::new(0.0, 0.0, 9.0), &vp);
        let far = transform_coordinate(Vec3::new(0.0, 0.0, -11.0), &vp);

        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_range_override_leaves_camera_untouched() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, 1.0, 1.0, 100.0);
        let capped = camera.view_projection_for_range(1.0, 20.0);

        let point = transform_coordinate(Vec3::new(0.0, 0.0, -10.0), &capped);
        assert_relative_eq!(point.z, 1.0, epsilon = 1e-4);
        assert_relative_eq!(camera.far, 100.0);
    }

    #[test]
    fn test_orthographic_camera_is_linear_in_depth() {
        let mut camera = Camera::orthographic(Vec3::new(0.0, 0.0, 5.0), -2.0, 2.0, -2.0, 2.0, 0.0, 10.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        let vp = camera.get_view_projection_matrix();
        let middle = transform_coordinate(Vec3::zeros(), &vp);
        assert_relative_eq!(middle.z, 0.5, epsilon = 1e-5);
        assert!(!camera.is_perspective());
    }

    #[test]
    fn test_publish_writes_camera_uniforms() {
        let camera = Camera::default();
        let mut data = ShaderData::new();
        camera.publish(&mut data);

        assert_eq!(data.matrix4(uniforms::VIEW), Some(camera.get_view_matrix()));
        assert_eq!(data.vector3(uniforms::CAMERA_POS), Some(camera.position));
        assert!(data.matrix4(uniforms::VIEW_PROJECTION).is_some());
    }

    #[test]
    fn test_aspect_ratio_only_changes_perspective() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(2.0);
        assert!(matches!(camera.projection, Projection::Perspective { aspect, .. } if (aspect - 2.0).abs() < 1e-6));

        let mut ortho = Camera::orthographic(Vec3::z(), -1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        let before = ortho.projection;
        ortho.set_aspect_ratio(2.0);
        assert_eq!(ortho.projection, before);
    }
}
