//! Arenas of the resources render elements point into

use std::rc::Rc;

use crate::foundation::collections::{MaterialKey, RenderObjectKey, SlotMap, TransformKey};
use crate::foundation::math::Mat4;
use crate::render::shader::{Shader, ShaderData, ShaderDefines};

use super::RenderObject;

/// Surface description: a shader plus its material-level uniforms
#[derive(Debug, Clone)]
pub struct Material {
    /// Shader whose default sub-shader draws the material
    pub shader: Rc<Shader>,
    /// Material uniforms and defines
    pub shader_data: ShaderData,
    /// Scene defines this material opts out of (e.g. an unlit material ignoring shadows)
    pub disabled_public_defines: ShaderDefines,
}

impl Material {
    /// Material with empty uniforms
    pub fn new(shader: Rc<Shader>) -> Self {
        Self {
            shader,
            shader_data: ShaderData::new(),
            disabled_public_defines: ShaderDefines::empty(),
        }
    }

    /// Opt out of `defines` published by the scene
    #[must_use]
    pub fn with_disabled_public_defines(mut self, defines: ShaderDefines) -> Self {
        self.disabled_public_defines = defines;
        self
    }
}

/// World transforms, materials and render objects referenced by key
#[derive(Debug, Default)]
pub struct DrawResources {
    /// World matrices
    pub transforms: SlotMap<TransformKey, Mat4>,
    /// Materials
    pub materials: SlotMap<MaterialKey, Material>,
    /// Render objects
    pub render_objects: SlotMap<RenderObjectKey, RenderObject>,
}

impl DrawResources {
    /// Empty arenas
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a world transform
    pub fn add_transform(&mut self, world: Mat4) -> TransformKey {
        self.transforms.insert(world)
    }

    /// Register a material
    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    /// Register a render object
    pub fn add_render_object(&mut self, render_object: RenderObject) -> RenderObjectKey {
        self.render_objects.insert(render_object)
    }

    /// Replace a world transform; returns false for stale keys
    pub fn set_transform(&mut self, key: TransformKey, world: Mat4) -> bool {
        match self.transforms.get_mut(key) {
            Some(slot) => {
                *slot = world;
                true
            }
            None => false,
        }
    }
}
