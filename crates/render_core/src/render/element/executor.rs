//! # Render Element Executor
//!
//! Turns one [`RenderElement`] into draw calls for the bound scene and camera.
//!
//! ## Per-element sequence
//!
//! 1. Run the render object's update hooks if the update mark or render type changed
//! 2. Let the geometry decline the draw
//! 3. Resolve the passes: material shader, custom shader, or tagged replacement
//! 4. Per pass: fetch the compiled variant, bind it, upload stale uniform groups in
//!    scene → render → camera → material order
//! 5. Re-issue blend/depth and front-face state only when it can have changed
//! 6. Draw
//! 7. Revert batch-induced render-object changes
//! 8. Advance the update mark
//!
//! Steps 7 and 8 run for every element that reached step 1, including skipped ones.
//! A replacement-tag skip is no early return: the batch update it ran is still
//! reverted and the mark still advances.

use crate::foundation::collections::{MaterialKey, PassInstanceKey, RenderObjectKey};
use crate::foundation::math::Mat4;
use crate::render::api::UniformGroup;
use crate::render::shader::{CompileDefines, Shader, ShaderPass};
use crate::render::{RenderError, RenderResult};

use super::{RenderContext, RenderElement, RenderObject, RenderType, UpdateContext, UpdateMark};

/// Result of executing one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The geometry was drawn once per pass
    Drawn {
        /// Number of passes drawn
        passes: usize,
    },
    /// The geometry declined to draw in this context
    GeometryNotReady,
    /// The element has no material
    NoMaterial,
    /// The replacement shader has no sub-shader for this element
    ReplacementSkipped,
}

/// Counters accumulated across executions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Elements executed
    pub elements: u32,
    /// Geometry draw calls issued
    pub draw_calls: u32,
    /// Scene uniform group uploads
    pub scene_uploads: u32,
    /// Render-object uniform group uploads
    pub render_uploads: u32,
    /// Camera uniform group uploads
    pub camera_uploads: u32,
    /// Material uniform group uploads
    pub material_uploads: u32,
    /// Blend/depth state re-issues
    pub blend_depth_changes: u32,
    /// Front-face state re-issues
    pub front_face_changes: u32,
    /// Render-object hook runs
    pub render_updates: u32,
    /// Elements skipped because the geometry was not ready
    pub skipped_geometry: u32,
    /// Elements skipped because they had no material
    pub skipped_material: u32,
    /// Elements skipped by replacement-tag filtering
    pub skipped_replacement: u32,
}

impl ExecutorStats {
    /// Uploads across all four uniform groups
    pub fn uniform_uploads(&self) -> u32 {
        self.scene_uploads + self.render_uploads + self.camera_uploads + self.material_uploads
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderStateKey {
    material: MaterialKey,
    instance: PassInstanceKey,
    render: RenderObjectKey,
}

/// Dispatches render elements and coalesces GPU state across consecutive draws
#[derive(Debug, Default)]
pub struct RenderElementExecutor {
    last_state: Option<RenderStateKey>,
    stats: ExecutorStats,
}

impl RenderElementExecutor {
    /// Executor with an empty state cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last issued blend/depth/front-face state
    ///
    /// Call whenever something outside the executor may have changed that state,
    /// e.g. at the start of a pass or after switching render targets.
    pub fn reset_state_cache(&mut self) {
        self.last_state = None;
    }

    /// Counters since the last [`Self::take_stats`]
    pub fn stats(&self) -> &ExecutorStats {
        &self.stats
    }

    /// Return and reset the counters
    pub fn take_stats(&mut self) -> ExecutorStats {
        std::mem::take(&mut self.stats)
    }

    /// Draw `element` with the context's scene and camera
    ///
    /// `is_shadow_target` flips the winding for targets rendered upside down.
    /// `custom_shader` replaces the material's shader; with `replacement_tag` only
    /// elements whose material sub-shader carries that tag are drawn, using the
    /// custom sub-shader with the same tag value.
    pub fn execute(
        &mut self,
        ctx: &mut RenderContext<'_>,
        element: &mut RenderElement,
        is_shadow_target: bool,
        custom_shader: Option<&Shader>,
        replacement_tag: Option<&str>,
    ) -> RenderResult<ExecuteOutcome> {
        let mark = ctx.frame.mark();
        let render_type = element.render_type;
        let world = *ctx
            .resources
            .transforms
            .get(element.transform)
            .ok_or(RenderError::MissingResource("transform"))?;
        let update_ctx = UpdateContext {
            camera: ctx.camera,
            world: &world,
            render_type,
        };

        let update_render = {
            let render = ctx
                .resources
                .render_objects
                .get_mut(element.render_object)
                .ok_or(RenderError::MissingResource("render object"))?;
            let needed = render.needs_update(mark, render_type);
            if needed {
                render.run_update(&update_ctx, mark);
                self.stats.render_updates += 1;
            }
            needed
        };

        let outcome = self.draw(ctx, element, &world, mark, is_shadow_target, custom_shader, replacement_tag);

        if update_render && render_type != RenderType::Normal {
            if let Some(render) = ctx.resources.render_objects.get_mut(element.render_object) {
                render.revert_batch(&update_ctx);
            }
        }
        ctx.frame.advance();
        self.stats.elements += 1;

        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn draw(
        &mut self,
        ctx: &mut RenderContext<'_>,
        element: &mut RenderElement,
        world: &Mat4,
        mark: UpdateMark,
        is_shadow_target: bool,
        custom_shader: Option<&Shader>,
        replacement_tag: Option<&str>,
    ) -> RenderResult<ExecuteOutcome> {
        let render_key = element.render_object;
        let render_type = element.render_type;
        let material_key = element.material;
        let camera = ctx.camera;

        let geometry = element.active_geometry_mut();
        if !geometry.prepare_render(&camera) {
            log::trace!("Skipping element: geometry not ready");
            self.stats.skipped_geometry += 1;
            return Ok(ExecuteOutcome::GeometryNotReady);
        }

        let Some(material_key) = material_key else {
            log::trace!("Skipping element: no material");
            self.stats.skipped_material += 1;
            return Ok(ExecuteOutcome::NoMaterial);
        };
        let material = ctx
            .resources
            .materials
            .get(material_key)
            .ok_or(RenderError::MissingResource("material"))?;
        let render = ctx
            .resources
            .render_objects
            .get(render_key)
            .ok_or(RenderError::MissingResource("render object"))?;

        let Some(passes) = Self::resolve_passes(&material.shader, custom_shader, replacement_tag)? else {
            log::trace!(
                "Skipping element: no replacement for tag {:?} in '{}'",
                replacement_tag,
                material.shader.name()
            );
            self.stats.skipped_replacement += 1;
            return Ok(ExecuteOutcome::ReplacementSkipped);
        };

        let defines = CompileDefines {
            scene: ctx.scene.data.defines() - material.disabled_public_defines,
            render: render.shader_data.defines(),
            material: material.shader_data.defines(),
        };
        let mirrored = RenderObject::is_mirrored(world);

        for pass in passes {
            let instance_key = ctx.shaders.compile_or_fetch(pass, defines, ctx.device.backend_mut())?;
            let instance = ctx
                .shaders
                .get_mut(instance_key)
                .ok_or(RenderError::MissingResource("shader pass instance"))?;
            let program = instance.program();
            let backend = ctx.device.backend_mut();

            let switched = backend.bind_program(program);
            let mark_changed = instance.upload_mark != Some(mark);

            let upload_scene = instance.uploaded_scene != Some(ctx.scene.id) || mark_changed;
            if upload_scene || switched {
                backend.upload_uniforms(program, UniformGroup::Scene, ctx.scene.data, upload_scene);
                instance.uploaded_scene = Some(ctx.scene.id);
                self.stats.scene_uploads += 1;
            }

            let upload_render = instance.uploaded_render != Some((render_key, render_type)) || mark_changed;
            if upload_render || switched {
                backend.upload_uniforms(program, UniformGroup::Render, &render.shader_data, upload_render);
                instance.uploaded_render = Some((render_key, render_type));
                self.stats.render_uploads += 1;
            }

            let upload_camera = instance.uploaded_camera != Some(camera.id) || mark_changed;
            if upload_camera || switched {
                backend.upload_uniforms(program, UniformGroup::Camera, camera.data, upload_camera);
                instance.uploaded_camera = Some(camera.id);
                self.stats.camera_uploads += 1;
            }

            let upload_material = instance.uploaded_material != Some(material_key) || mark_changed;
            if upload_material || switched {
                backend.upload_uniforms(program, UniformGroup::Material, &material.shader_data, upload_material);
                instance.uploaded_material = Some(material_key);
                self.stats.material_uploads += 1;
            }

            let state = RenderStateKey {
                material: material_key,
                instance: instance_key,
                render: render_key,
            };
            match self.last_state {
                Some(last) if last.material == state.material && last.instance == state.instance => {
                    // Winding depends on the world transform, so only the render object matters
                    if last.render != state.render {
                        backend.upload_front_face_state(program, &material.shader_data, is_shadow_target, mirrored);
                        self.stats.front_face_changes += 1;
                    }
                }
                _ => {
                    backend.upload_blend_depth_state(program, &material.shader_data);
                    backend.upload_front_face_state(program, &material.shader_data, is_shadow_target, mirrored);
                    self.stats.blend_depth_changes += 1;
                    self.stats.front_face_changes += 1;
                }
            }
            self.last_state = Some(state);

            geometry.render(ctx.device)?;
            instance.upload_mark = Some(mark);
            self.stats.draw_calls += 1;
        }

        Ok(ExecuteOutcome::Drawn { passes: passes.len() })
    }

    /// Passes to draw, or `None` when a replacement does not apply
    fn resolve_passes<'s>(
        material_shader: &'s Shader,
        custom_shader: Option<&'s Shader>,
        replacement_tag: Option<&str>,
    ) -> RenderResult<Option<&'s [ShaderPass]>> {
        let sub_shader = material_shader
            .default_sub_shader()
            .ok_or(RenderError::MissingResource("material sub-shader"))?;

        let Some(custom) = custom_shader else {
            return Ok(Some(sub_shader.passes()));
        };
        let Some(tag) = replacement_tag else {
            let custom_sub_shader = custom
                .default_sub_shader()
                .ok_or(RenderError::MissingResource("custom sub-shader"))?;
            return Ok(Some(custom_sub_shader.passes()));
        };

        Ok(sub_shader
            .flag(tag)
            .and_then(|value| custom.replacement_for(tag, value))
            .map(|replacement| replacement.passes()))
    }
}
