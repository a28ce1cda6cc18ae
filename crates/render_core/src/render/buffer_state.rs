//! Vertex input binding
//!
//! A [`BufferState`] records which vertex buffers, attribute layouts and index buffer
//! make up one piece of geometry (a vertex array object on GL-like backends). All
//! `apply_*` calls configure the currently bound state, so the state has to be bound
//! on the device first.
//!
//! Applying layouts is comparatively expensive; do it once when the geometry is
//! created, then just [`BufferState::bind`] before each draw.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::api::BufferId;
use crate::render::{GpuDevice, RenderError, RenderResult};

static NEXT_BUFFER_STATE_ID: AtomicU64 = AtomicU64::new(1);

/// Scalar type of one vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Signed 8-bit integer
    Byte,
    /// Unsigned 8-bit integer
    UnsignedByte,
    /// Signed 16-bit integer
    Short,
    /// Unsigned 16-bit integer
    UnsignedShort,
    /// Signed 32-bit integer
    Int,
    /// Unsigned 32-bit integer
    UnsignedInt,
    /// 16-bit float
    HalfFloat,
    /// 32-bit float
    Float,
}

impl ComponentType {
    /// Size of one component in bytes
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort | Self::HalfFloat => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
        }
    }
}

/// One attribute slot inside an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Shader attribute location
    pub location: u32,
    /// Number of components (1..=4)
    pub components: u8,
    /// Scalar type of each component
    pub component_type: ComponentType,
    /// Whether integer data is normalized into `[0, 1]` / `[-1, 1]`
    pub normalized: bool,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

impl VertexElement {
    /// Size of the whole attribute in bytes
    pub const fn size_in_bytes(&self) -> u32 {
        self.components as u32 * self.component_type.size_in_bytes()
    }
}

/// Attribute layout of an interleaved vertex buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexDeclaration {
    stride: u32,
    elements: Vec<VertexElement>,
}

impl VertexDeclaration {
    /// Empty declaration; elements are appended with [`Self::with_element`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute packed directly after the previous one
    #[must_use]
    pub fn with_element(mut self, location: u32, components: u8, component_type: ComponentType, normalized: bool) -> Self {
        let element = VertexElement {
            location,
            components,
            component_type,
            normalized,
            offset: self.stride,
        };
        self.stride += element.size_in_bytes();
        self.elements.push(element);
        self
    }

    /// Bytes between consecutive vertices
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Declared attribute slots in declaration order
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }
}

/// A GPU vertex buffer together with its layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    /// Backend buffer
    pub id: BufferId,
    /// Attribute layout of the buffer contents
    pub declaration: VertexDeclaration,
}

/// Width of the indices in an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

/// A GPU index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    /// Backend buffer
    pub id: BufferId,
    /// Index width
    pub format: IndexFormat,
    /// Number of indices stored
    pub index_count: u32,
}

/// Recorded vertex input for one piece of geometry
#[derive(Debug)]
pub struct BufferState {
    id: u64,
    bound_index_buffer: Option<BufferId>,
}

impl BufferState {
    /// Create a state with a process-unique identifier
    pub fn new() -> Self {
        Self {
            id: NEXT_BUFFER_STATE_ID.fetch_add(1, Ordering::Relaxed),
            bound_index_buffer: None,
        }
    }

    /// Identifier compared against the device's bound state
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this state is the one bound on `device`
    pub fn is_bound(&self, device: &GpuDevice) -> bool {
        device.bound_buffer_state() == Some(self.id)
    }

    /// Make this state current; a no-op when it already is
    pub fn bind(&self, device: &mut GpuDevice) {
        if !self.is_bound(device) {
            device.backend_mut().bind_vertex_array(self.id);
            device.set_bound_buffer_state(Some(self.id));
        }
    }

    /// Unbind this state if it is current
    pub fn unbind(&self, device: &mut GpuDevice) {
        if self.is_bound(device) {
            device.backend_mut().unbind_vertex_array();
            device.set_bound_buffer_state(None);
        }
    }

    fn ensure_bound(&self, device: &GpuDevice) -> RenderResult<()> {
        if self.is_bound(device) {
            Ok(())
        } else {
            log::error!("BufferState {}: bind() must be called before applying buffers", self.id);
            Err(RenderError::PrecededBindRequired { state: self.id })
        }
    }

    /// Enable and describe every attribute of `buffer`
    pub fn apply_vertex_buffer(&self, device: &mut GpuDevice, buffer: &VertexBuffer) -> RenderResult<()> {
        self.ensure_bound(device)?;
        Self::apply_attributes(device, buffer, None);
        Ok(())
    }

    /// Enable and describe every attribute of several vertex streams
    pub fn apply_vertex_buffers(&self, device: &mut GpuDevice, buffers: &[VertexBuffer]) -> RenderResult<()> {
        self.ensure_bound(device)?;
        for buffer in buffers {
            Self::apply_attributes(device, buffer, None);
        }
        Ok(())
    }

    /// Like [`Self::apply_vertex_buffer`] but advancing once per instance
    ///
    /// Does nothing on devices without instancing.
    pub fn apply_instance_vertex_buffer(&self, device: &mut GpuDevice, buffer: &VertexBuffer) -> RenderResult<()> {
        if !device.supports_instancing() {
            log::trace!("BufferState {}: instancing unsupported, skipping instance buffer", self.id);
            return Ok(());
        }
        self.ensure_bound(device)?;
        Self::apply_attributes(device, buffer, Some(1));
        Ok(())
    }

    /// Attach `buffer` as the index buffer unless it already is
    pub fn apply_index_buffer(&mut self, device: &mut GpuDevice, buffer: &IndexBuffer) -> RenderResult<()> {
        self.ensure_bound(device)?;
        if self.bound_index_buffer != Some(buffer.id) {
            device.backend_mut().bind_index_buffer(buffer.id);
            self.bound_index_buffer = Some(buffer.id);
        }
        Ok(())
    }

    fn apply_attributes(device: &mut GpuDevice, buffer: &VertexBuffer, divisor: Option<u32>) {
        let backend = device.backend_mut();
        let stride = buffer.declaration.stride();
        backend.bind_vertex_buffer(buffer.id);
        for element in buffer.declaration.elements() {
            backend.enable_vertex_attrib_array(element.location);
            backend.vertex_attrib_pointer(element, stride);
            if let Some(divisor) = divisor {
                backend.vertex_attrib_divisor(element.location, divisor);
            }
        }
    }
}

impl Default for BufferState {
    fn default() -> Self {
        Self::new()
    }
}
