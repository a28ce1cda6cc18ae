//! # Cascaded Shadow Planner
//!
//! Owns the per-cascade light cameras and the shadow map for one directional light.
//! Each frame the planner fits a light camera around every cascade slice of the scene
//! camera's frustum, writes the texture-space light matrices and split distances into
//! the scene's shader data, and brackets the caster pass with [`start`] / [`end`].
//!
//! [`start`]: CascadedShadowPlanner::start
//! [`end`]: CascadedShadowPlanner::end

use crate::core::config::ShadowConfig;
use crate::foundation::math::{Mat4, Vec2, Vec4};
use crate::render::api::{ClearFlags, DepthFormat, RenderTargetHandle, RenderTargetPool};
use crate::render::element::RenderCamera;
use crate::render::primitives::{BoundingSphere, Camera};
use crate::render::shader::{ShaderData, ShaderDefines};
use crate::render::{GpuDevice, RenderError, RenderResult};

use super::cascade::{compute_split_distances, snap_to_texel_grid, texture_bias_matrix};
use super::{cascade_define, uniforms, DirectionalLight, PcfQuality, MAX_CASCADES};

const MATRIX_FLOATS: usize = 16;

/// State of one light camera
///
/// Records are kept once allocated; indices past the active count are left alone
/// until a later configuration uses them again.
#[derive(Debug, Clone)]
pub struct ShadowCascadeState {
    camera: RenderCamera,
    sphere: BoundingSphere,
    near: f32,
    far: f32,
    texture_matrix: Mat4,
}

impl ShadowCascadeState {
    fn new() -> Self {
        Self {
            camera: RenderCamera::new(Camera::orthographic(Default::default(), -1.0, 1.0, -1.0, 1.0, 0.0, 1.0)),
            sphere: BoundingSphere::default(),
            near: 0.0,
            far: 0.0,
            texture_matrix: Mat4::identity(),
        }
    }

    /// Light camera used to render casters into this cascade
    pub fn camera(&self) -> &RenderCamera {
        &self.camera
    }

    /// Sphere bounding the frustum slice
    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    /// View-space depth range `(near, far)` covered by this cascade
    pub fn range(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Light view-projection premultiplied by the texture bias
    pub fn texture_matrix(&self) -> &Mat4 {
        &self.texture_matrix
    }
}

/// Plans and publishes cascaded shadows for a directional light
#[derive(Debug)]
pub struct CascadedShadowPlanner {
    light: DirectionalLight,
    max_distance: f32,
    texture_size: u32,
    cascade_count: usize,
    pcf_quality: PcfQuality,
    split_ratio: Option<f32>,
    near_plane_bias: f32,
    splits: [f32; MAX_CASCADES + 1],
    cascades: Vec<ShadowCascadeState>,
    light_view_projection: Vec<f32>,
    active: Option<usize>,
    shadow_map: Option<RenderTargetHandle>,
}

impl CascadedShadowPlanner {
    /// Planner with default settings; call [`Self::configure`] before use
    pub fn new() -> Self {
        let defaults = ShadowConfig::default();
        Self {
            light: DirectionalLight::default(),
            max_distance: defaults.max_distance,
            texture_size: defaults.texture_size,
            cascade_count: defaults.cascade_count,
            pcf_quality: defaults.pcf_quality,
            split_ratio: defaults.split_ratio,
            near_plane_bias: defaults.near_plane_bias,
            splits: [0.0; MAX_CASCADES + 1],
            cascades: Vec::new(),
            light_view_projection: Vec::new(),
            active: None,
            shadow_map: None,
        }
    }

    /// Planner configured from a [`ShadowConfig`]
    pub fn from_config(config: &ShadowConfig, light: DirectionalLight, scene_data: &mut ShaderData) -> Self {
        let mut planner = Self::new();
        planner.near_plane_bias = config.near_plane_bias;
        planner.split_ratio = config.split_ratio;
        planner.configure(
            scene_data,
            light,
            config.max_distance,
            config.texture_size,
            config.cascade_count,
            config.pcf_quality,
        );
        planner
    }

    /// Set up the planner for a light and publish the static shadow state
    ///
    /// `cascade_count` is clamped into `1..=MAX_CASCADES`.
    pub fn configure(
        &mut self,
        scene_data: &mut ShaderData,
        light: DirectionalLight,
        max_distance: f32,
        texture_size: u32,
        cascade_count: usize,
        pcf_quality: PcfQuality,
    ) {
        let count = cascade_count.clamp(1, MAX_CASCADES);
        if count != cascade_count {
            log::warn!("Cascade count {} clamped to {}", cascade_count, count);
        }

        self.light = light;
        self.max_distance = max_distance;
        self.cascade_count = count;
        self.active = None;

        let cameras = count + 1;
        while self.cascades.len() < cameras {
            self.cascades.push(ShadowCascadeState::new());
        }
        self.light_view_projection.clear();
        self.light_view_projection.resize(cameras * MATRIX_FLOATS, 0.0);

        scene_data.set_exclusive_define(ShaderDefines::SHADOW_PSSM, cascade_define(count));
        scene_data.set_buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT, &self.light_view_projection);
        self.set_shadow_map_texture_size(texture_size, scene_data);
        self.set_pcf_quality(pcf_quality, scene_data);

        log::debug!(
            "Shadow planner configured: {} cascades, {}px map, distance {}",
            count,
            self.texture_size,
            max_distance
        );
    }

    /// Number of active cascades
    pub fn cascade_count(&self) -> usize {
        self.cascade_count
    }

    /// Shadowed view distance
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Shadow map edge length in texels
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Current filtering quality
    pub fn pcf_quality(&self) -> PcfQuality {
        self.pcf_quality
    }

    /// Light the planner casts from
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Split blend ratio in effect
    pub fn split_ratio(&self) -> f32 {
        self.split_ratio.unwrap_or(1.0 / self.cascade_count as f32)
    }

    /// Override the split blend ratio; `None` restores `1 / cascade_count`
    pub fn set_split_ratio(&mut self, ratio: Option<f32>) {
        self.split_ratio = ratio.map(|r| r.clamp(0.0, 1.0));
    }

    /// Near plane of every light camera
    pub fn set_near_plane_bias(&mut self, bias: f32) {
        self.near_plane_bias = bias.max(0.0);
    }

    /// Split distances from the last computed cascade, `0..=cascade_count`
    pub fn split_distances(&self) -> &[f32] {
        &self.splits[..=self.cascade_count]
    }

    /// Change the shadow map resolution and republish the PCF texel offset
    pub fn set_shadow_map_texture_size(&mut self, size: u32, scene_data: &mut ShaderData) {
        self.texture_size = size.max(1);
        let texel = 1.0 / self.texture_size as f32;
        scene_data.set_vector2(uniforms::SHADOW_PCF_OFFSET, Vec2::new(texel, texel));
    }

    /// Change the filtering quality and republish its define
    pub fn set_pcf_quality(&mut self, quality: PcfQuality, scene_data: &mut ShaderData) {
        self.pcf_quality = quality;
        scene_data.set_exclusive_define(ShaderDefines::SHADOW_PCF, quality.define());
    }

    /// View-projection bounding the whole shadowed part of `camera`'s frustum
    ///
    /// When the shadow distance is shorter than the camera's far plane the clip range
    /// is capped at the shadow distance.
    pub fn frustum_matrix(&self, camera: &Camera) -> Mat4 {
        if self.max_distance < camera.far {
            camera.view_projection_for_range(camera.near, self.max_distance)
        } else {
            camera.get_view_projection_matrix()
        }
    }

    /// Fit light camera `index` to its slice of `camera`'s frustum
    ///
    /// Cameras `0..cascade_count` cover one cascade each; camera `cascade_count`
    /// covers the whole shadow range.
    pub fn begin_cascade(&mut self, index: usize, camera: &Camera, scene_data: &mut ShaderData) -> RenderResult<()> {
        let cameras = self.cascade_count + 1;
        if index >= cameras || index >= self.cascades.len() {
            return Err(RenderError::InvalidCascadeIndex { index, count: cameras });
        }
        if let Some(active) = self.active {
            return Err(RenderError::CascadeAlreadyActive(active));
        }

        // Nothing past the camera's far plane receives shadows
        let shadow_far = self.max_distance.min(camera.far);
        self.splits = compute_split_distances(camera.near, shadow_far, self.cascade_count, self.split_ratio());

        let (near, far, frustum) = if index < self.cascade_count {
            let near = self.splits[index];
            let far = self.splits[index + 1];
            (near, far, camera.view_projection_for_range(near, far))
        } else {
            (camera.near, shadow_far, self.frustum_matrix(camera))
        };
        let sphere = BoundingSphere::from_frustum(&frustum)?;

        let basis = self.light.basis();
        let resolution = self.light.shadow_resolution.unwrap_or(self.texture_size);
        let center = snap_to_texel_grid(sphere.center, &basis, sphere.radius, resolution);
        let radius = sphere.radius;

        let state = &mut self.cascades[index];
        let light_camera = &mut state.camera;
        light_camera.camera.set_position(center - basis.direction * radius);
        light_camera.camera.look_at(center, basis.up);
        light_camera
            .camera
            .set_orthographic(-radius, radius, -radius, radius, self.near_plane_bias, radius * 2.0);
        light_camera.publish();

        state.sphere = BoundingSphere::new(center, radius);
        state.near = near;
        state.far = far;
        state.texture_matrix = texture_bias_matrix() * light_camera.camera.get_view_projection_matrix();

        let slot = index * MATRIX_FLOATS;
        self.light_view_projection[slot..slot + MATRIX_FLOATS].copy_from_slice(state.texture_matrix.as_slice());

        scene_data.set_buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT, &self.light_view_projection);
        scene_data.set_vector4(
            uniforms::SHADOW_DISTANCE,
            Vec4::new(self.splits[1], self.splits[2], self.splits[3], self.splits[4]),
        );

        self.active = Some(index);
        log::trace!("Cascade {} covers {:.3}..{:.3}, radius {:.3}", index, near, far, radius);
        Ok(())
    }

    /// Close light camera `index`
    pub fn end_cascade(&mut self, index: usize) -> RenderResult<()> {
        match self.active {
            Some(active) if active == index => {
                self.active = None;
                Ok(())
            }
            _ => Err(RenderError::CascadeNotActive(index)),
        }
    }

    /// Fit every light camera for this frame
    ///
    /// With a single cascade only camera 0 is fitted.
    pub fn compute_all(&mut self, camera: &Camera, scene_data: &mut ShaderData) -> RenderResult<()> {
        let last = if self.cascade_count == 1 { 0 } else { self.cascade_count };
        for index in 0..=last {
            self.begin_cascade(index, camera, scene_data)?;
            self.end_cascade(index)?;
        }
        Ok(())
    }

    /// Light camera `index` as fitted by the last [`Self::begin_cascade`]
    pub fn cascade_camera(&self, index: usize) -> RenderResult<&RenderCamera> {
        self.cascade(index).map(ShadowCascadeState::camera)
    }

    /// Full state of light camera `index`
    pub fn cascade(&self, index: usize) -> RenderResult<&ShadowCascadeState> {
        let cameras = self.cascade_count + 1;
        self.cascades
            .get(index)
            .filter(|_| index < cameras)
            .ok_or(RenderError::InvalidCascadeIndex { index, count: cameras })
    }

    /// Texture-space light matrices, `cascade_count + 1` column-major `mat4`s
    pub fn light_view_projection(&self) -> &[f32] {
        &self.light_view_projection
    }

    /// Shadow map held between [`Self::start`] and [`Self::clear`]
    pub fn shadow_map(&self) -> Option<RenderTargetHandle> {
        self.shadow_map
    }

    /// Acquire the shadow map, publish it as the shadow sampler and begin drawing into it
    pub fn start(&mut self, pool: &mut dyn RenderTargetPool, scene_data: &mut ShaderData) -> RenderResult<()> {
        if let Some(previous) = self.shadow_map.take() {
            log::warn!("Shadow map {:?} was not cleared before start", previous);
            pool.release(previous);
        }

        let size = self.texture_size;
        let target = pool.acquire(size, size, DepthFormat::Depth16)?;
        scene_data.set_texture(uniforms::SHADOW_MAP_TEXTURE, target);
        pool.begin(target);
        self.shadow_map = Some(target);
        Ok(())
    }

    /// Set viewport and scissor to the shadow map and clear it
    pub fn prepare_viewport(&self, device: &mut GpuDevice) {
        let size = self.texture_size;
        let backend = device.backend_mut();
        backend.set_viewport(0, 0, size, size);
        backend.set_scissor_test(true);
        backend.set_scissor(0, 0, size, size);
        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
    }

    /// Finish drawing into the shadow map
    pub fn end(&mut self, pool: &mut dyn RenderTargetPool, device: &mut GpuDevice) -> RenderResult<()> {
        let target = self.shadow_map.ok_or(RenderError::ShadowMapNotStarted)?;
        pool.end(target);
        device.backend_mut().set_scissor_test(false);
        Ok(())
    }

    /// Return the shadow map to the pool
    pub fn clear(&mut self, pool: &mut dyn RenderTargetPool) {
        if let Some(target) = self.shadow_map.take() {
            pool.release(target);
        }
    }
}

impl Default for CascadedShadowPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils, Vec3};
    use crate::render::test_support::{mock_device, Call, MockTargetPool};
    use approx::assert_relative_eq;

    fn scene_camera() -> Camera {
        let mut camera = Camera::perspective(Vec3::new(0.0, 5.0, 20.0), 60.0, 16.0 / 9.0, 0.1, 500.0);
        camera.look_at(Vec3::zeros(), Vec3::y());
        camera
    }

    fn light() -> DirectionalLight {
        DirectionalLight::new(Vec3::new(-0.4, -1.0, -0.3))
    }

    fn planner(count: usize, data: &mut ShaderData) -> CascadedShadowPlanner {
        let mut planner = CascadedShadowPlanner::new();
        planner.configure(data, light(), 200.0, 1024, count, PcfQuality::TwoTap);
        planner
    }

    #[test]
    fn test_configure_publishes_defines_and_offset() {
        let mut data = ShaderData::new();
        let planner = planner(2, &mut data);

        assert!(data.has_define(ShaderDefines::SHADOW_PSSM2));
        assert!(!data.has_define(ShaderDefines::SHADOW_PSSM1));
        assert!(data.has_define(ShaderDefines::SHADOW_PCF2));
        assert_eq!(data.vector2(uniforms::SHADOW_PCF_OFFSET), Some(Vec2::new(1.0 / 1024.0, 1.0 / 1024.0)));
        assert_eq!(data.buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT).map(<[f32]>::len), Some(3 * 16));
        assert_relative_eq!(planner.split_ratio(), 0.5);
    }

    #[test]
    fn test_four_cascades_clear_pssm_defines() {
        let mut data = ShaderData::new();
        let mut planner = planner(1, &mut data);
        assert!(data.has_define(ShaderDefines::SHADOW_PSSM1));

        planner.configure(&mut data, light(), 200.0, 1024, 7, PcfQuality::None);
        assert_eq!(planner.cascade_count(), MAX_CASCADES);
        assert!(!data.defines().intersects(ShaderDefines::SHADOW_PSSM));
        assert!(data.has_define(ShaderDefines::SHADOW_PCF_NO));
        assert!(!data.has_define(ShaderDefines::SHADOW_PCF2));
    }

    #[test]
    fn test_compute_all_publishes_distances() {
        crate::foundation::logging::init_for_tests();
        let mut data = ShaderData::new();
        let mut planner = planner(3, &mut data);
        planner.compute_all(&scene_camera(), &mut data).unwrap();

        let distances = data.vector4(uniforms::SHADOW_DISTANCE).unwrap();
        assert_relative_eq!(distances.x, 23.084_39, max_relative = 1e-4);
        assert_relative_eq!(distances.y, 55.038_23, max_relative = 1e-4);
        assert_relative_eq!(distances.z, 200.0);
        assert_eq!(distances.w, 0.0);
        assert_eq!(planner.split_distances().len(), 4);
    }

    #[test]
    fn test_light_cameras_cover_their_slices() {
        let mut data = ShaderData::new();
        let mut planner = planner(2, &mut data);
        let camera = scene_camera();
        planner.compute_all(&camera, &mut data).unwrap();

        let buffer = data.buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT).unwrap().to_vec();
        for index in 0..=2 {
            let state = planner.cascade(index).unwrap();
            let (near, far) = state.range();
            let slice = camera.view_projection_for_range(near, far).try_inverse().unwrap();

            // Every slice corner lands inside the shadow map in texture space
            for x in [-1.0, 1.0] {
                for y in [-1.0, 1.0] {
                    for z in [0.0, 1.0] {
                        let corner = utils::transform_coordinate(Vec3::new(x, y, z), &slice);
                        let uv = utils::transform_coordinate(corner, state.texture_matrix());
                        assert!((-1e-3..=1.0 + 1e-3).contains(&uv.x), "cascade {index}: {uv:?}");
                        assert!((-1e-3..=1.0 + 1e-3).contains(&uv.y), "cascade {index}: {uv:?}");
                        // Depth may dip below zero by the near plane bias
                        assert!((-1e-2..=1.0 + 1e-3).contains(&uv.z), "cascade {index}: {uv:?}");
                    }
                }
            }

            let slot = &buffer[index * 16..(index + 1) * 16];
            assert_eq!(slot, state.texture_matrix().as_slice());
        }

        let full = planner.cascade(2).unwrap().range();
        assert_relative_eq!(full.0, 0.1);
        assert_relative_eq!(full.1, 200.0);
    }

    #[test]
    fn test_light_camera_publishes_its_matrices() {
        let mut data = ShaderData::new();
        let mut planner = planner(1, &mut data);
        planner.compute_all(&scene_camera(), &mut data).unwrap();

        let light_camera = planner.cascade_camera(0).unwrap();
        assert!(!light_camera.camera.is_perspective());
        assert_eq!(
            light_camera.shader_data.matrix4(crate::render::primitives::camera::uniforms::VIEW_PROJECTION),
            Some(light_camera.camera.get_view_projection_matrix())
        );

        let sphere = planner.cascade(0).unwrap().sphere();
        let expected = sphere.center - light().basis().direction * sphere.radius;
        assert_relative_eq!(light_camera.camera.position, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_single_cascade_leaves_boundary_camera_untouched() {
        let mut data = ShaderData::new();
        let mut planner = planner(1, &mut data);
        planner.compute_all(&scene_camera(), &mut data).unwrap();

        let buffer = data.buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT).unwrap();
        assert!(buffer[..16].iter().any(|&v| v != 0.0));
        assert!(buffer[16..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_frustum_matrix_caps_at_shadow_distance() {
        let mut data = ShaderData::new();
        let planner = planner(2, &mut data);
        let camera = scene_camera();

        let capped = planner.frustum_matrix(&camera);
        assert_relative_eq!(capped, camera.view_projection_for_range(0.1, 200.0), epsilon = 1e-5);

        let mut short = camera.clone();
        short.far = 50.0;
        assert_eq!(planner.frustum_matrix(&short), short.get_view_projection_matrix());
    }

    #[test]
    fn test_short_far_plane_bounds_every_cascade() {
        let mut data = ShaderData::new();
        let mut planner = planner(3, &mut data);
        let mut camera = scene_camera();
        camera.far = 50.0;
        planner.compute_all(&camera, &mut data).unwrap();

        for index in 0..=3 {
            let (near, far) = planner.cascade(index).unwrap().range();
            assert!(near < far, "cascade {index}: {near}..{far}");
            assert!(far <= 50.0 + 1e-4, "cascade {index}: {near}..{far}");
        }

        let splits = planner.split_distances();
        assert_relative_eq!(splits[0], 0.1);
        assert_relative_eq!(splits[3], 50.0);
        for pair in splits.windows(2) {
            assert!(pair[0] < pair[1], "{splits:?}");
        }

        let distances = data.vector4(uniforms::SHADOW_DISTANCE).unwrap();
        assert_relative_eq!(distances.z, 50.0);
    }

    #[test]
    fn test_cascade_state_machine_errors() {
        let mut data = ShaderData::new();
        let mut planner = planner(2, &mut data);
        let camera = scene_camera();

        assert_eq!(
            planner.begin_cascade(3, &camera, &mut data),
            Err(RenderError::InvalidCascadeIndex { index: 3, count: 3 })
        );
        assert_eq!(planner.end_cascade(0), Err(RenderError::CascadeNotActive(0)));

        planner.begin_cascade(0, &camera, &mut data).unwrap();
        assert_eq!(
            planner.begin_cascade(1, &camera, &mut data),
            Err(RenderError::CascadeAlreadyActive(0))
        );
        assert_eq!(planner.end_cascade(1), Err(RenderError::CascadeNotActive(1)));
        planner.end_cascade(0).unwrap();
        planner.begin_cascade(1, &camera, &mut data).unwrap();
        planner.end_cascade(1).unwrap();
    }

    #[test]
    fn test_stationary_camera_is_stable_across_frames() {
        let mut data = ShaderData::new();
        let mut planner = planner(2, &mut data);
        let camera = scene_camera();

        planner.compute_all(&camera, &mut data).unwrap();
        let first = planner.light_view_projection().to_vec();
        planner.compute_all(&camera, &mut data).unwrap();
        assert_eq!(first, planner.light_view_projection());
    }

    #[test]
    fn test_render_target_lifecycle() {
        let mut data = ShaderData::new();
        let mut planner = planner(2, &mut data);
        let mut pool = MockTargetPool::new();
        let (mut device, device_log) = mock_device();

        assert_eq!(planner.end(&mut pool, &mut device), Err(RenderError::ShadowMapNotStarted));

        planner.start(&mut pool, &mut data).unwrap();
        let target = planner.shadow_map().unwrap();
        assert_eq!(data.texture(uniforms::SHADOW_MAP_TEXTURE), Some(target));
        assert_eq!(
            pool.log.calls(),
            vec![
                Call::Acquire { width: 1024, height: 1024, depth: DepthFormat::Depth16 },
                Call::BeginTarget(target),
            ]
        );

        planner.prepare_viewport(&mut device);
        planner.end(&mut pool, &mut device).unwrap();
        assert_eq!(
            device_log.calls(),
            vec![
                Call::Viewport { x: 0, y: 0, width: 1024, height: 1024 },
                Call::ScissorTest(true),
                Call::Scissor { x: 0, y: 0, width: 1024, height: 1024 },
                Call::Clear(ClearFlags::COLOR | ClearFlags::DEPTH),
                Call::ScissorTest(false),
            ]
        );

        planner.clear(&mut pool);
        assert!(pool.live.is_empty());
        assert_eq!(planner.shadow_map(), None);
        planner.clear(&mut pool);
        assert_eq!(pool.log.count(|call| matches!(call, Call::Release(_))), 1);
    }

    #[test]
    fn test_restart_releases_previous_map() {
        let mut data = ShaderData::new();
        let mut planner = planner(1, &mut data);
        let mut pool = MockTargetPool::new();

        planner.start(&mut pool, &mut data).unwrap();
        planner.set_shadow_map_texture_size(512, &mut data);
        planner.start(&mut pool, &mut data).unwrap();

        assert_eq!(pool.live.len(), 1);
        assert_eq!(
            pool.log.count(|call| matches!(call, Call::Acquire { width: 512, .. })),
            1
        );
    }

    #[test]
    fn test_from_config() {
        let config = ShadowConfig::default()
            .with_cascade_count(4)
            .with_texture_size(2048)
            .with_split_ratio(0.75);
        let mut data = ShaderData::new();
        let planner = CascadedShadowPlanner::from_config(&config, light(), &mut data);

        assert_eq!(planner.cascade_count(), 4);
        assert_eq!(planner.texture_size(), 2048);
        assert_relative_eq!(planner.split_ratio(), 0.75);
        assert_eq!(data.buffer(uniforms::SHADOW_LIGHT_VIEW_PROJECT).map(<[f32]>::len), Some(5 * 16));
    }
}
