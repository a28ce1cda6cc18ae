//! Directional light description used for shadow casting

use crate::foundation::math::Vec3;

/// A directional light casting cascaded shadows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, from the light toward the scene
    pub direction: Vec3,
    /// Approximate up vector; only needs to be non-parallel to `direction`
    pub up: Vec3,
    /// Texel grid used for snapping; `None` uses the shadow map size
    pub shadow_resolution: Option<u32>,
}

impl DirectionalLight {
    /// Light travelling along `direction` with +Y as the up hint
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction,
            up: Vec3::y(),
            shadow_resolution: None,
        }
    }

    /// Replace the up hint
    #[must_use]
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    /// Orthonormal light-space axes
    pub fn basis(&self) -> LightBasis {
        let direction = self.direction.try_normalize(f32::EPSILON).unwrap_or_else(|| -Vec3::y());

        // Fall back to another axis when the hint is parallel to the light
        let hint = if self.up.cross(&direction).norm_squared() > 1e-8 {
            self.up
        } else if direction.x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::z()
        };
        let side = hint.cross(&direction).normalize();
        let up = direction.cross(&side);

        LightBasis { up, side, direction }
    }
}

impl Default for DirectionalLight {
    /// Light shining straight down
    fn default() -> Self {
        Self::new(-Vec3::y()).with_up(Vec3::z())
    }
}

/// Orthonormal axes of light space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightBasis {
    /// Light-space up
    pub up: Vec3,
    /// Light-space side, perpendicular to `up` and `direction`
    pub side: Vec3,
    /// Normalized light direction
    pub direction: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basis_is_orthonormal() {
        let light = DirectionalLight::new(Vec3::new(1.0, -2.0, 0.5));
        let basis = light.basis();

        assert_relative_eq!(basis.up.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(basis.side.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(basis.direction.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(basis.up.dot(&basis.side), 0.0, epsilon = 1e-5);
        assert_relative_eq!(basis.up.dot(&basis.direction), 0.0, epsilon = 1e-5);
        assert_relative_eq!(basis.side.dot(&basis.direction), 0.0, epsilon = 1e-5);
        // The up axis stays on the same side as the hint
        assert!(basis.up.dot(&Vec3::y()) > 0.0);
    }

    #[test]
    fn test_parallel_up_hint_falls_back() {
        let light = DirectionalLight::new(-Vec3::y());
        let basis = light.basis();
        assert!(basis.up.iter().all(|c| c.is_finite()));
        assert_relative_eq!(basis.up.dot(&basis.direction), 0.0, epsilon = 1e-5);
    }
}
