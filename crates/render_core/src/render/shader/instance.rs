//! Compiled shader pass variants and their upload bookkeeping

use std::collections::HashMap;

use crate::foundation::collections::{MaterialKey, PassInstanceKey, RenderObjectKey, SlotMap};
use crate::render::api::{ProgramHandle, RenderBackend};
use crate::render::element::{CameraId, RenderType, SceneId, UpdateMark};
use crate::render::RenderResult;

use super::{PassId, ShaderDefines, ShaderPass};

/// The three define masks a pass variant is compiled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompileDefines {
    /// Scene defines with the material's publicly disabled defines removed
    pub scene: ShaderDefines,
    /// Render-object defines
    pub render: ShaderDefines,
    /// Material defines
    pub material: ShaderDefines,
}

impl CompileDefines {
    /// Union of all three masks
    pub fn combined(&self) -> ShaderDefines {
        self.scene | self.render | self.material
    }
}

/// One compiled variant of a shader pass
///
/// Besides the program it remembers which scene, render object, camera and material
/// were uploaded last, and the update mark of its last draw. The executor compares
/// against these to skip uniform groups that are already current.
#[derive(Debug, Clone)]
pub struct ShaderPassInstance {
    pass: PassId,
    defines: CompileDefines,
    program: ProgramHandle,
    pub(crate) uploaded_scene: Option<SceneId>,
    pub(crate) uploaded_render: Option<(RenderObjectKey, RenderType)>,
    pub(crate) uploaded_camera: Option<CameraId>,
    pub(crate) uploaded_material: Option<MaterialKey>,
    pub(crate) upload_mark: Option<UpdateMark>,
}

impl ShaderPassInstance {
    fn new(pass: PassId, defines: CompileDefines, program: ProgramHandle) -> Self {
        Self {
            pass,
            defines,
            program,
            uploaded_scene: None,
            uploaded_render: None,
            uploaded_camera: None,
            uploaded_material: None,
            upload_mark: None,
        }
    }

    /// Pass this variant was compiled from
    pub fn pass(&self) -> PassId {
        self.pass
    }

    /// Defines this variant was compiled with
    pub fn defines(&self) -> &CompileDefines {
        &self.defines
    }

    /// Backend program
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Update mark of the last draw through this variant
    pub fn upload_mark(&self) -> Option<UpdateMark> {
        self.upload_mark
    }

    /// Forget every upload stamp so the next draw re-uploads all groups
    pub fn invalidate_uploads(&mut self) {
        self.uploaded_scene = None;
        self.uploaded_render = None;
        self.uploaded_camera = None;
        self.uploaded_material = None;
        self.upload_mark = None;
    }
}

/// Owner of every compiled pass variant
///
/// Variants are created on first use and live until the cache is dropped, so keys
/// stay valid for the whole frame.
#[derive(Debug, Default)]
pub struct ShaderInstanceCache {
    instances: SlotMap<PassInstanceKey, ShaderPassInstance>,
    lookup: HashMap<(PassId, CompileDefines), PassInstanceKey>,
}

impl ShaderInstanceCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant of `pass` for `defines`, compiling it on first request
    pub fn compile_or_fetch(
        &mut self,
        pass: &ShaderPass,
        defines: CompileDefines,
        backend: &mut dyn RenderBackend,
    ) -> RenderResult<PassInstanceKey> {
        if let Some(&key) = self.lookup.get(&(pass.id(), defines)) {
            return Ok(key);
        }

        let program = backend.compile_program(pass, &defines)?;
        log::debug!(
            "Compiled pass '{}' with defines {:#x} -> {:?}",
            pass.name(),
            defines.combined().bits(),
            program
        );
        let key = self.instances.insert(ShaderPassInstance::new(pass.id(), defines, program));
        self.lookup.insert((pass.id(), defines), key);
        Ok(key)
    }

    /// Variant by key
    pub fn get(&self, key: PassInstanceKey) -> Option<&ShaderPassInstance> {
        self.instances.get(key)
    }

    /// Mutable variant by key
    pub fn get_mut(&mut self, key: PassInstanceKey) -> Option<&mut ShaderPassInstance> {
        self.instances.get_mut(key)
    }

    /// Reset the upload stamps of every variant, e.g. after the backend lost its state
    pub fn invalidate_uploads(&mut self) {
        for instance in self.instances.values_mut() {
            instance.invalidate_uploads();
        }
    }

    /// Number of compiled variants
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing has been compiled yet
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::{mock_device, Call};

    #[test]
    fn test_variants_are_compiled_once_per_define_set() {
        let (mut device, log) = mock_device();
        let mut cache = ShaderInstanceCache::new();
        let pass = ShaderPass::new("forward");
        let lit = CompileDefines {
            scene: ShaderDefines::RECEIVE_SHADOW,
            ..CompileDefines::default()
        };

        let a = cache.compile_or_fetch(&pass, lit, device.backend_mut()).unwrap();
        let b = cache.compile_or_fetch(&pass, lit, device.backend_mut()).unwrap();
        let c = cache
            .compile_or_fetch(&pass, CompileDefines::default(), device.backend_mut())
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(log.count(|call| matches!(call, Call::Compile { .. })), 2);
    }

    #[test]
    fn test_same_bits_in_different_groups_are_distinct_variants() {
        let (mut device, _log) = mock_device();
        let mut cache = ShaderInstanceCache::new();
        let pass = ShaderPass::new("forward");
        let bit = ShaderDefines::user(0).unwrap();

        let as_scene = CompileDefines { scene: bit, ..CompileDefines::default() };
        let as_material = CompileDefines { material: bit, ..CompileDefines::default() };
        assert_eq!(as_scene.combined(), as_material.combined());

        let a = cache.compile_or_fetch(&pass, as_scene, device.backend_mut()).unwrap();
        let b = cache.compile_or_fetch(&pass, as_material, device.backend_mut()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalidate_clears_stamps() {
        let (mut device, _log) = mock_device();
        let mut cache = ShaderInstanceCache::new();
        let key = cache
            .compile_or_fetch(&ShaderPass::new("p"), CompileDefines::default(), device.backend_mut())
            .unwrap();
        cache.get_mut(key).unwrap().upload_mark = Some(UpdateMark::default());

        cache.invalidate_uploads();
        assert_eq!(cache.get(key).unwrap().upload_mark(), None);
    }
}
