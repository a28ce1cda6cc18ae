//! Scene, camera and the per-draw render context

use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::primitives::Camera;
use crate::render::shader::{ShaderData, ShaderInstanceCache};
use crate::render::GpuDevice;

use super::{DrawResources, FrameContext};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CAMERA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a scene for upload de-duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of a camera for upload de-duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(u64);

impl CameraId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        Self(NEXT_CAMERA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Scene-level shader state
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    /// Scene uniforms and defines (lights, shadows, fog)
    pub shader_data: ShaderData,
}

impl Scene {
    /// Empty scene with a fresh id
    pub fn new() -> Self {
        Self {
            id: SceneId::next(),
            shader_data: ShaderData::new(),
        }
    }

    /// Scene id
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Borrowed view handed to the executor
    pub fn view(&self) -> SceneView<'_> {
        SceneView {
            id: self.id,
            data: &self.shader_data,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// A camera together with the uniforms it publishes
#[derive(Debug, Clone)]
pub struct RenderCamera {
    id: CameraId,
    /// Camera parameters
    pub camera: Camera,
    /// Published camera uniforms
    pub shader_data: ShaderData,
}

impl RenderCamera {
    /// Wrap `camera` with a fresh id and publish its uniforms
    pub fn new(camera: Camera) -> Self {
        let mut render_camera = Self {
            id: CameraId::next(),
            camera,
            shader_data: ShaderData::new(),
        };
        render_camera.publish();
        render_camera
    }

    /// Camera id
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Re-publish the camera uniforms after the camera changed
    pub fn publish(&mut self) {
        self.camera.publish(&mut self.shader_data);
    }

    /// Borrowed view handed to the executor
    pub fn view(&self) -> CameraView<'_> {
        CameraView {
            id: self.id,
            camera: &self.camera,
            data: &self.shader_data,
        }
    }
}

/// Borrowed scene state for one render pass
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    /// Scene identity
    pub id: SceneId,
    /// Scene uniforms and defines
    pub data: &'a ShaderData,
}

/// Borrowed camera state for one render pass
#[derive(Debug, Clone, Copy)]
pub struct CameraView<'a> {
    /// Camera identity
    pub id: CameraId,
    /// Camera parameters
    pub camera: &'a Camera,
    /// Camera uniforms
    pub data: &'a ShaderData,
}

/// Everything one element execution reads or mutates
pub struct RenderContext<'a> {
    /// Scene being rendered
    pub scene: SceneView<'a>,
    /// Camera currently bound (a scene camera or a shadow cascade camera)
    pub camera: CameraView<'a>,
    /// Update mark source
    pub frame: &'a mut FrameContext,
    /// Transforms, materials and render objects referenced by elements
    pub resources: &'a mut DrawResources,
    /// Compiled pass variants
    pub shaders: &'a mut ShaderInstanceCache,
    /// Target device
    pub device: &'a mut GpuDevice,
}
