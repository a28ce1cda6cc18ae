//! Named uniform values plus a define mask
//!
//! Scenes, cameras, render objects and materials each own one [`ShaderData`]. The
//! executor hands it to the backend as a whole when the corresponding uniform group
//! has to be uploaded.

use std::collections::HashMap;

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::api::RenderTargetHandle;

use super::ShaderDefines;

/// A single uniform value
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// Two-component vector
    Vector2(Vec2),
    /// Three-component vector
    Vector3(Vec3),
    /// Four-component vector
    Vector4(Vec4),
    /// Column-major 4x4 matrix
    Matrix4(Mat4),
    /// Flat float array, e.g. a packed matrix array
    Buffer(Vec<f32>),
    /// Sampled render target
    Texture(RenderTargetHandle),
}

impl UniformValue {
    /// Raw bytes of the value as laid out for upload
    ///
    /// Textures have no byte representation and return `None`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Float(value) => Some(bytemuck::bytes_of(value)),
            Self::Vector2(value) => Some(bytemuck::cast_slice(value.as_slice())),
            Self::Vector3(value) => Some(bytemuck::cast_slice(value.as_slice())),
            Self::Vector4(value) => Some(bytemuck::cast_slice(value.as_slice())),
            Self::Matrix4(value) => Some(bytemuck::cast_slice(value.as_slice())),
            Self::Buffer(values) => Some(bytemuck::cast_slice(values.as_slice())),
            Self::Texture(_) => None,
        }
    }
}

/// Define mask and named uniforms of one shader-data owner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderData {
    defines: ShaderDefines,
    values: HashMap<String, UniformValue>,
}

impl ShaderData {
    /// Empty data with no defines
    pub fn new() -> Self {
        Self::default()
    }

    /// Current define mask
    pub fn defines(&self) -> ShaderDefines {
        self.defines
    }

    /// Add `define` to the mask
    pub fn add_define(&mut self, define: ShaderDefines) {
        self.defines.insert(define);
    }

    /// Remove `define` from the mask
    pub fn remove_define(&mut self, define: ShaderDefines) {
        self.defines.remove(define);
    }

    /// Whether every bit of `define` is set
    pub fn has_define(&self, define: ShaderDefines) -> bool {
        self.defines.contains(define)
    }

    /// Replace the members of a mutually exclusive define family
    pub fn set_exclusive_define(&mut self, group: ShaderDefines, selected: ShaderDefines) {
        self.defines.set_exclusive(group, selected);
    }

    /// Set an arbitrary uniform
    pub fn set_value(&mut self, name: &str, value: UniformValue) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    /// Set a scalar uniform
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_value(name, UniformValue::Float(value));
    }

    /// Set a vec2 uniform
    pub fn set_vector2(&mut self, name: &str, value: Vec2) {
        self.set_value(name, UniformValue::Vector2(value));
    }

    /// Set a vec3 uniform
    pub fn set_vector3(&mut self, name: &str, value: Vec3) {
        self.set_value(name, UniformValue::Vector3(value));
    }

    /// Set a vec4 uniform
    pub fn set_vector4(&mut self, name: &str, value: Vec4) {
        self.set_value(name, UniformValue::Vector4(value));
    }

    /// Set a mat4 uniform
    pub fn set_matrix4(&mut self, name: &str, value: Mat4) {
        self.set_value(name, UniformValue::Matrix4(value));
    }

    /// Set a float-array uniform, reusing the existing allocation when possible
    pub fn set_buffer(&mut self, name: &str, values: &[f32]) {
        match self.values.get_mut(name) {
            Some(UniformValue::Buffer(existing)) => {
                existing.clear();
                existing.extend_from_slice(values);
            }
            _ => self.set_value(name, UniformValue::Buffer(values.to_vec())),
        }
    }

    /// Bind a render target as a sampled texture
    pub fn set_texture(&mut self, name: &str, texture: RenderTargetHandle) {
        self.set_value(name, UniformValue::Texture(texture));
    }

    /// Drop a uniform
    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.values.remove(name)
    }

    /// Look up a uniform of any type
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Scalar uniform, if present with that type
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(UniformValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    /// vec2 uniform, if present with that type
    pub fn vector2(&self, name: &str) -> Option<Vec2> {
        match self.values.get(name) {
            Some(UniformValue::Vector2(value)) => Some(*value),
            _ => None,
        }
    }

    /// vec3 uniform, if present with that type
    pub fn vector3(&self, name: &str) -> Option<Vec3> {
        match self.values.get(name) {
            Some(UniformValue::Vector3(value)) => Some(*value),
            _ => None,
        }
    }

    /// vec4 uniform, if present with that type
    pub fn vector4(&self, name: &str) -> Option<Vec4> {
        match self.values.get(name) {
            Some(UniformValue::Vector4(value)) => Some(*value),
            _ => None,
        }
    }

    /// mat4 uniform, if present with that type
    pub fn matrix4(&self, name: &str) -> Option<Mat4> {
        match self.values.get(name) {
            Some(UniformValue::Matrix4(value)) => Some(*value),
            _ => None,
        }
    }

    /// Float-array uniform, if present with that type
    pub fn buffer(&self, name: &str) -> Option<&[f32]> {
        match self.values.get(name) {
            Some(UniformValue::Buffer(values)) => Some(values),
            _ => None,
        }
    }

    /// Texture binding, if present
    pub fn texture(&self, name: &str) -> Option<RenderTargetHandle> {
        match self.values.get(name) {
            Some(UniformValue::Texture(texture)) => Some(*texture),
            _ => None,
        }
    }

    /// Iterate over every uniform
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of uniforms
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no uniforms are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors_reject_other_types() {
        let mut data = ShaderData::new();
        data.set_vector4("u_Color", Vec4::new(1.0, 0.5, 0.25, 1.0));

        assert_eq!(data.vector4("u_Color"), Some(Vec4::new(1.0, 0.5, 0.25, 1.0)));
        assert_eq!(data.vector2("u_Color"), None);
        assert_eq!(data.buffer("u_Color"), None);
    }

    #[test]
    fn test_buffer_is_replaced_in_place() {
        let mut data = ShaderData::new();
        data.set_buffer("u_Matrices", &[1.0; 32]);
        data.set_buffer("u_Matrices", &[2.0; 16]);

        assert_eq!(data.buffer("u_Matrices"), Some(&[2.0; 16][..]));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_value_bytes_match_float_layout() {
        let value = UniformValue::Vector2(Vec2::new(1.0, 2.0));
        let bytes = value.as_bytes().unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());

        assert!(UniformValue::Texture(RenderTargetHandle(1)).as_bytes().is_none());
        assert_eq!(UniformValue::Matrix4(Mat4::identity()).as_bytes().map(<[u8]>::len), Some(64));
    }

    #[test]
    fn test_defines_toggle() {
        let mut data = ShaderData::new();
        data.add_define(ShaderDefines::RECEIVE_SHADOW);
        assert!(data.has_define(ShaderDefines::RECEIVE_SHADOW));
        data.remove_define(ShaderDefines::RECEIVE_SHADOW);
        assert!(data.defines().is_empty());
    }
}
