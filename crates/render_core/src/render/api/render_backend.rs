//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a graphics backend implements so the executor,
//! buffer states and shadow planner can drive it without knowing the API underneath.

use crate::render::blend::BlendFactor;
use crate::render::buffer_state::VertexElement;
use crate::render::shader::{CompileDefines, ShaderData, ShaderPass};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a vertex or index buffer owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Handle to a linked shader program owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Uniform group uploaded to a program
///
/// Groups are uploaded independently so each can be skipped when unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformGroup {
    /// Per-scene values (lights, fog, shadow matrices)
    Scene,
    /// Per-render-object values (world matrix, skinning)
    Render,
    /// Per-camera values (view, projection, position)
    Camera,
    /// Per-material values (colors, textures)
    Material,
}

/// Primitive assembly mode for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Independent points
    Points,
    /// Independent line segments
    Lines,
    /// Connected line segments
    LineStrip,
    /// Independent triangles
    Triangles,
    /// Connected triangles
    TriangleStrip,
}

bitflags::bitflags! {
    /// Attachments cleared by [`RenderBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Color attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

/// Main rendering backend trait
///
/// Calls are issued in submission order on a single thread. Implementations do not
/// need to deduplicate redundant work; the render core already skips uploads and
/// state changes it can prove are unchanged.
pub trait RenderBackend {
    /// Whether per-instance vertex attributes (attribute divisors) are available
    fn supports_instancing(&self) -> bool;

    // === Vertex input ===

    /// Bind a vertex array object by buffer-state identifier
    fn bind_vertex_array(&mut self, state: u64);

    /// Unbind whatever vertex array object is current
    fn unbind_vertex_array(&mut self);

    /// Bind a vertex buffer as the current array buffer
    fn bind_vertex_buffer(&mut self, buffer: BufferId);

    /// Bind an index buffer into the current vertex array
    fn bind_index_buffer(&mut self, buffer: BufferId);

    /// Enable the attribute array at `location`
    fn enable_vertex_attrib_array(&mut self, location: u32);

    /// Describe the layout of the attribute at `element.location` in the bound buffer
    fn vertex_attrib_pointer(&mut self, element: &VertexElement, stride: u32);

    /// Set the per-instance divisor of the attribute at `location`
    fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32);

    // === Fixed-function state ===

    /// Set the blend function
    fn set_blend_func(&mut self, source: BlendFactor, destination: BlendFactor);

    /// Set the viewport rectangle in pixels
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Enable or disable the scissor test
    fn set_scissor_test(&mut self, enabled: bool);

    /// Set the scissor rectangle in pixels
    fn set_scissor(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear the selected attachments of the current target
    fn clear(&mut self, flags: ClearFlags);

    // === Programs ===

    /// Compile and link `pass` with the given define sets
    fn compile_program(&mut self, pass: &ShaderPass, defines: &CompileDefines) -> BackendResult<ProgramHandle>;

    /// Make `program` current and report whether the active program changed
    fn bind_program(&mut self, program: ProgramHandle) -> bool;

    /// Upload one uniform group
    ///
    /// With `upload_values == false` only program-local bindings are refreshed (texture
    /// units, block bindings); the values themselves are still current on the GPU.
    fn upload_uniforms(&mut self, program: ProgramHandle, group: UniformGroup, data: &ShaderData, upload_values: bool);

    /// Apply the blend and depth state a material requests
    fn upload_blend_depth_state(&mut self, program: ProgramHandle, material: &ShaderData);

    /// Apply the material's cull mode and winding
    ///
    /// `render_target` flips the winding for targets rendered upside down; `mirrored`
    /// flips it for world matrices with a negative determinant.
    fn upload_front_face_state(&mut self, program: ProgramHandle, material: &ShaderData, render_target: bool, mirrored: bool);

    // === Draws ===

    /// Draw non-indexed primitives from the bound vertex input
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Draw indexed primitives from the bound index buffer
    fn draw_elements(&mut self, topology: PrimitiveTopology, first_index: u32, index_count: u32);

    /// Draw indexed primitives `instance_count` times
    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        index_count: u32,
        instance_count: u32,
    );
}
