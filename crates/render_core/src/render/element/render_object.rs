//! Render objects: the per-drawable owner of render-level uniforms

use crate::foundation::math::{utils, Mat4};
use crate::render::shader::ShaderData;

use super::{CameraView, UpdateMark};

/// Uniform name of the world matrix written by [`WorldMatrixHooks`]
pub const WORLD_MATRIX: &str = "u_WorldMat";

/// How an element's geometry was batched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderType {
    /// Drawn on its own
    #[default]
    Normal,
    /// Merged into a static batch at load time
    StaticBatch,
    /// Drawn through GPU instancing
    InstanceBatch,
    /// Merged into a dynamic vertex batch
    VertexBatch,
}

/// Inputs available to render-object update hooks
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Camera the element is drawn with
    pub camera: CameraView<'a>,
    /// World transform of the element
    pub world: &'a Mat4,
    /// Batching mode of the element being drawn
    pub render_type: RenderType,
}

/// Per-frame hooks of a render object
///
/// `render_update` and `render_update_with_camera` run at most once per update mark
/// and render type. `revert_batch_render_update` runs after a batched draw that
/// triggered an update so non-batched consumers see unbatched data again.
pub trait RenderObjectHooks {
    /// Refresh render uniforms that do not depend on the camera
    fn render_update(&mut self, data: &mut ShaderData, ctx: &UpdateContext<'_>);

    /// Refresh render uniforms that depend on the camera
    fn render_update_with_camera(&mut self, _data: &mut ShaderData, _ctx: &UpdateContext<'_>) {}

    /// Undo data changes made for a batched draw
    fn revert_batch_render_update(&mut self, _data: &mut ShaderData, _ctx: &UpdateContext<'_>) {}
}

/// Hooks of a plain mesh: publish the world matrix
///
/// Static batches are already in world space, so they get identity instead; the
/// revert restores the real transform.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldMatrixHooks;

impl RenderObjectHooks for WorldMatrixHooks {
    fn render_update(&mut self, data: &mut ShaderData, ctx: &UpdateContext<'_>) {
        match ctx.render_type {
            RenderType::StaticBatch | RenderType::VertexBatch => data.set_matrix4(WORLD_MATRIX, Mat4::identity()),
            RenderType::Normal | RenderType::InstanceBatch => data.set_matrix4(WORLD_MATRIX, *ctx.world),
        }
    }

    fn revert_batch_render_update(&mut self, data: &mut ShaderData, ctx: &UpdateContext<'_>) {
        data.set_matrix4(WORLD_MATRIX, *ctx.world);
    }
}

/// Drawable state shared by all elements of one object
pub struct RenderObject {
    /// Render-level uniforms and defines
    pub shader_data: ShaderData,
    hooks: Box<dyn RenderObjectHooks>,
    update_mark: Option<UpdateMark>,
    update_render_type: Option<RenderType>,
}

impl RenderObject {
    /// Render object driven by `hooks`
    pub fn new(hooks: Box<dyn RenderObjectHooks>) -> Self {
        Self {
            shader_data: ShaderData::new(),
            hooks,
            update_mark: None,
            update_render_type: None,
        }
    }

    /// Render object with [`WorldMatrixHooks`]
    pub fn with_world_matrix() -> Self {
        Self::new(Box::new(WorldMatrixHooks))
    }

    /// Mark of the last hook run
    pub fn update_mark(&self) -> Option<UpdateMark> {
        self.update_mark
    }

    /// Render type of the last hook run
    pub fn update_render_type(&self) -> Option<RenderType> {
        self.update_render_type
    }

    /// Whether the hooks must run before drawing at `mark` as `render_type`
    pub fn needs_update(&self, mark: UpdateMark, render_type: RenderType) -> bool {
        self.update_mark != Some(mark) || self.update_render_type != Some(render_type)
    }

    pub(crate) fn run_update(&mut self, ctx: &UpdateContext<'_>, mark: UpdateMark) {
        self.hooks.render_update(&mut self.shader_data, ctx);
        self.hooks.render_update_with_camera(&mut self.shader_data, ctx);
        self.update_mark = Some(mark);
        self.update_render_type = Some(ctx.render_type);
    }

    pub(crate) fn revert_batch(&mut self, ctx: &UpdateContext<'_>) {
        self.hooks.revert_batch_render_update(&mut self.shader_data, ctx);
    }

    /// Whether the world transform flips winding
    pub fn is_mirrored(world: &Mat4) -> bool {
        utils::is_mirrored(world)
    }
}

impl std::fmt::Debug for RenderObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderObject")
            .field("update_mark", &self.update_mark)
            .field("update_render_type", &self.update_render_type)
            .field("uniforms", &self.shader_data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::element::RenderCamera;
    use crate::render::primitives::Camera;

    #[test]
    fn test_needs_update_tracks_mark_and_type() {
        let camera = RenderCamera::new(Camera::default());
        let world = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let ctx = UpdateContext {
            camera: camera.view(),
            world: &world,
            render_type: RenderType::Normal,
        };
        let mut object = RenderObject::with_world_matrix();
        let mark = UpdateMark::new(4);

        assert!(object.needs_update(mark, RenderType::Normal));
        object.run_update(&ctx, mark);
        assert!(!object.needs_update(mark, RenderType::Normal));
        assert!(object.needs_update(mark, RenderType::StaticBatch));
        assert!(object.needs_update(mark.next(), RenderType::Normal));
        assert_eq!(object.shader_data.matrix4(WORLD_MATRIX), Some(world));
    }

    #[test]
    fn test_static_batch_update_is_reverted() {
        let camera = RenderCamera::new(Camera::default());
        let world = Mat4::new_scaling(2.0);
        let ctx = UpdateContext {
            camera: camera.view(),
            world: &world,
            render_type: RenderType::StaticBatch,
        };
        let mut object = RenderObject::with_world_matrix();

        object.run_update(&ctx, UpdateMark::new(0));
        assert_eq!(object.shader_data.matrix4(WORLD_MATRIX), Some(Mat4::identity()));

        object.revert_batch(&ctx);
        assert_eq!(object.shader_data.matrix4(WORLD_MATRIX), Some(world));
    }
}
