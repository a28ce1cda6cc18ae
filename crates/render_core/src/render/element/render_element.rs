//! Render elements and the geometry they draw

use crate::foundation::collections::{MaterialKey, RenderObjectKey, TransformKey};
use crate::render::api::PrimitiveTopology;
use crate::render::buffer_state::{BufferState, IndexBuffer, VertexBuffer};
use crate::render::{GpuDevice, RenderResult};

use super::{CameraView, RenderType};

/// Drawable GPU geometry
pub trait Geometry {
    /// Prepare for drawing with `camera`; `false` skips the draw
    fn prepare_render(&mut self, camera: &CameraView<'_>) -> bool;

    /// Issue the draw call
    fn render(&mut self, device: &mut GpuDevice) -> RenderResult<()>;
}

/// Indexed triangle geometry backed by a [`BufferState`]
#[derive(Debug)]
pub struct MeshGeometry {
    state: BufferState,
    index_buffer: IndexBuffer,
    topology: PrimitiveTopology,
    instance_count: u32,
}

impl MeshGeometry {
    /// Record the vertex input of `vertex_buffers` + `index_buffer` once
    pub fn new(device: &mut GpuDevice, vertex_buffers: &[VertexBuffer], index_buffer: IndexBuffer) -> RenderResult<Self> {
        let mut state = BufferState::new();
        state.bind(device);
        state.apply_vertex_buffers(device, vertex_buffers)?;
        state.apply_index_buffer(device, &index_buffer)?;
        state.unbind(device);
        Ok(Self {
            state,
            index_buffer,
            topology: PrimitiveTopology::Triangles,
            instance_count: 1,
        })
    }

    /// Record an instanced mesh; `instance_buffer` advances once per instance
    pub fn instanced(
        device: &mut GpuDevice,
        vertex_buffers: &[VertexBuffer],
        instance_buffer: &VertexBuffer,
        index_buffer: IndexBuffer,
        instance_count: u32,
    ) -> RenderResult<Self> {
        let mut state = BufferState::new();
        state.bind(device);
        state.apply_vertex_buffers(device, vertex_buffers)?;
        state.apply_instance_vertex_buffer(device, instance_buffer)?;
        state.apply_index_buffer(device, &index_buffer)?;
        state.unbind(device);
        Ok(Self {
            state,
            index_buffer,
            topology: PrimitiveTopology::Triangles,
            instance_count,
        })
    }

    /// Number of instances drawn per call
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Change the instance count (ignored by devices without instancing)
    pub fn set_instance_count(&mut self, instance_count: u32) {
        self.instance_count = instance_count;
    }
}

impl Geometry for MeshGeometry {
    fn prepare_render(&mut self, _camera: &CameraView<'_>) -> bool {
        self.index_buffer.index_count > 0 && self.instance_count > 0
    }

    fn render(&mut self, device: &mut GpuDevice) -> RenderResult<()> {
        self.state.bind(device);
        let count = self.index_buffer.index_count;
        if self.instance_count > 1 && device.supports_instancing() {
            device
                .backend_mut()
                .draw_elements_instanced(self.topology, 0, count, self.instance_count);
        } else {
            device.backend_mut().draw_elements(self.topology, 0, count);
        }
        Ok(())
    }
}

/// One draw call: geometry, transform, material and render object
///
/// The element owns its geometry; everything else is referenced by key into
/// [`super::DrawResources`].
pub struct RenderElement {
    geometry: Box<dyn Geometry>,
    static_batch: Option<Box<dyn Geometry>>,
    /// World transform
    pub transform: TransformKey,
    /// Material; `None` skips the element
    pub material: Option<MaterialKey>,
    /// Render object supplying render-level uniforms
    pub render_object: RenderObjectKey,
    /// Batching mode
    pub render_type: RenderType,
    /// Camera distance used to sort queues
    pub depth_key: f32,
}

impl RenderElement {
    /// Element without material, drawn as [`RenderType::Normal`]
    pub fn new(geometry: Box<dyn Geometry>, transform: TransformKey, render_object: RenderObjectKey) -> Self {
        Self {
            geometry,
            static_batch: None,
            transform,
            material: None,
            render_object,
            render_type: RenderType::Normal,
            depth_key: 0.0,
        }
    }

    /// Set the material
    #[must_use]
    pub fn with_material(mut self, material: MaterialKey) -> Self {
        self.material = Some(material);
        self
    }

    /// Set the batching mode
    #[must_use]
    pub fn with_render_type(mut self, render_type: RenderType) -> Self {
        self.render_type = render_type;
        self
    }

    /// Attach or detach the merged geometry of a static batch
    pub fn set_static_batch(&mut self, geometry: Option<Box<dyn Geometry>>) {
        self.static_batch = geometry;
    }

    /// Whether a static batch geometry is attached
    pub fn has_static_batch(&self) -> bool {
        self.static_batch.is_some()
    }

    /// Geometry drawn for the current render type
    pub fn active_geometry_mut(&mut self) -> &mut dyn Geometry {
        match (&mut self.static_batch, self.render_type) {
            (Some(batch), RenderType::StaticBatch) => batch.as_mut(),
            _ => self.geometry.as_mut(),
        }
    }
}

impl std::fmt::Debug for RenderElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderElement")
            .field("transform", &self.transform)
            .field("material", &self.material)
            .field("render_object", &self.render_object)
            .field("render_type", &self.render_type)
            .field("static_batch", &self.static_batch.is_some())
            .field("depth_key", &self.depth_key)
            .finish_non_exhaustive()
    }
}
