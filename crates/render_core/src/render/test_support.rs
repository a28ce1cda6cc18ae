//! Recording backend and fixtures for unit tests

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::foundation::collections::{MaterialKey, RenderObjectKey, TransformKey};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{
    BackendResult, BufferId, ClearFlags, DepthFormat, PrimitiveTopology, ProgramHandle, RenderBackend,
    RenderTargetHandle, RenderTargetPool, UniformGroup,
};
use crate::render::blend::BlendFactor;
use crate::render::buffer_state::VertexElement;
use crate::render::element::{
    CameraView, DrawResources, FrameContext, Geometry, Material, RenderCamera, RenderContext, RenderElement,
    RenderObject, Scene,
};
use crate::render::primitives::Camera;
use crate::render::shader::{CompileDefines, Shader, ShaderData, ShaderInstanceCache, ShaderPass, SubShader};
use crate::render::{GpuDevice, RenderError, RenderResult};

/// One recorded backend or pool call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BindVertexArray(u64),
    UnbindVertexArray,
    BindVertexBuffer(BufferId),
    BindIndexBuffer(BufferId),
    EnableAttrib(u32),
    AttribPointer { location: u32, stride: u32, offset: u32 },
    AttribDivisor { location: u32, divisor: u32 },
    BlendFunc(BlendFactor, BlendFactor),
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    ScissorTest(bool),
    Scissor { x: i32, y: i32, width: u32, height: u32 },
    Clear(ClearFlags),
    Compile { pass: String, defines: CompileDefines },
    BindProgram(ProgramHandle),
    Upload { group: UniformGroup, values: bool },
    BlendDepth(ProgramHandle),
    FrontFace { program: ProgramHandle, render_target: bool, mirrored: bool },
    DrawArrays { count: u32 },
    DrawElements { index_count: u32 },
    DrawElementsInstanced { index_count: u32, instances: u32 },
    Acquire { width: u32, height: u32, depth: DepthFormat },
    Release(RenderTargetHandle),
    BeginTarget(RenderTargetHandle),
    EndTarget(RenderTargetHandle),
}

/// Shared view of everything a mock recorded
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<Call>>>,
    force_switch: Rc<Cell<bool>>,
}

impl CallLog {
    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub fn draw_count(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                Call::DrawArrays { .. } | Call::DrawElements { .. } | Call::DrawElementsInstanced { .. }
            )
        })
    }

    pub fn upload_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Upload { .. }))
    }

    pub fn uploads(&self) -> Vec<(UniformGroup, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Upload { group, values } => Some((*group, *values)),
                _ => None,
            })
            .collect()
    }

    pub fn compiled_passes(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Compile { pass, .. } => Some(pass.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn compiled_defines(&self) -> Vec<CompileDefines> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Compile { defines, .. } => Some(*defines),
                _ => None,
            })
            .collect()
    }

    /// Make every `bind_program` report a switch
    pub fn force_program_switch(&self, enabled: bool) {
        self.force_switch.set(enabled);
    }
}

pub struct MockBackend {
    log: CallLog,
    instancing: bool,
    current_program: Option<ProgramHandle>,
    next_program: u64,
}

impl RenderBackend for MockBackend {
    fn supports_instancing(&self) -> bool {
        self.instancing
    }

    fn bind_vertex_array(&mut self, state: u64) {
        self.log.push(Call::BindVertexArray(state));
    }

    fn unbind_vertex_array(&mut self) {
        self.log.push(Call::UnbindVertexArray);
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) {
        self.log.push(Call::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.log.push(Call::BindIndexBuffer(buffer));
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.log.push(Call::EnableAttrib(location));
    }

    fn vertex_attrib_pointer(&mut self, element: &VertexElement, stride: u32) {
        self.log.push(Call::AttribPointer {
            location: element.location,
            stride,
            offset: element.offset,
        });
    }

    fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32) {
        self.log.push(Call::AttribDivisor { location, divisor });
    }

    fn set_blend_func(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.log.push(Call::BlendFunc(source, destination));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.log.push(Call::Viewport { x, y, width, height });
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.log.push(Call::ScissorTest(enabled));
    }

    fn set_scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.log.push(Call::Scissor { x, y, width, height });
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.log.push(Call::Clear(flags));
    }

    fn compile_program(&mut self, pass: &ShaderPass, defines: &CompileDefines) -> BackendResult<ProgramHandle> {
        self.log.push(Call::Compile {
            pass: pass.name().to_string(),
            defines: *defines,
        });
        if pass.name().starts_with("broken") {
            return Err(RenderError::ShaderCompilation(pass.name().to_string()));
        }
        self.next_program += 1;
        Ok(ProgramHandle(self.next_program))
    }

    fn bind_program(&mut self, program: ProgramHandle) -> bool {
        self.log.push(Call::BindProgram(program));
        let switched = self.current_program != Some(program) || self.log.force_switch.get();
        self.current_program = Some(program);
        switched
    }

    fn upload_uniforms(&mut self, _program: ProgramHandle, group: UniformGroup, _data: &ShaderData, upload_values: bool) {
        self.log.push(Call::Upload {
            group,
            values: upload_values,
        });
    }

    fn upload_blend_depth_state(&mut self, program: ProgramHandle, _material: &ShaderData) {
        self.log.push(Call::BlendDepth(program));
    }

    fn upload_front_face_state(&mut self, program: ProgramHandle, _material: &ShaderData, render_target: bool, mirrored: bool) {
        self.log.push(Call::FrontFace {
            program,
            render_target,
            mirrored,
        });
    }

    fn draw_arrays(&mut self, _topology: PrimitiveTopology, _first: u32, count: u32) {
        self.log.push(Call::DrawArrays { count });
    }

    fn draw_elements(&mut self, _topology: PrimitiveTopology, _first_index: u32, index_count: u32) {
        self.log.push(Call::DrawElements { index_count });
    }

    fn draw_elements_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first_index: u32,
        index_count: u32,
        instance_count: u32,
    ) {
        self.log.push(Call::DrawElementsInstanced {
            index_count,
            instances: instance_count,
        });
    }
}

/// Render-target pool tracking which targets are out
pub struct MockTargetPool {
    pub log: CallLog,
    next: u64,
    pub live: HashSet<RenderTargetHandle>,
}

impl MockTargetPool {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            next: 0,
            live: HashSet::new(),
        }
    }
}

impl RenderTargetPool for MockTargetPool {
    fn acquire(&mut self, width: u32, height: u32, depth: DepthFormat) -> BackendResult<RenderTargetHandle> {
        self.log.push(Call::Acquire { width, height, depth });
        self.next += 1;
        let handle = RenderTargetHandle(self.next);
        self.live.insert(handle);
        Ok(handle)
    }

    fn release(&mut self, target: RenderTargetHandle) {
        self.log.push(Call::Release(target));
        self.live.remove(&target);
    }

    fn begin(&mut self, target: RenderTargetHandle) {
        self.log.push(Call::BeginTarget(target));
    }

    fn end(&mut self, target: RenderTargetHandle) {
        self.log.push(Call::EndTarget(target));
    }
}

fn device_with(instancing: bool) -> (GpuDevice, CallLog) {
    let log = CallLog::default();
    let backend = MockBackend {
        log: log.clone(),
        instancing,
        current_program: None,
        next_program: 0,
    };
    (GpuDevice::new(Box::new(backend)), log)
}

pub fn mock_device() -> (GpuDevice, CallLog) {
    device_with(true)
}

pub fn mock_device_without_instancing() -> (GpuDevice, CallLog) {
    device_with(false)
}

/// Geometry that issues one non-indexed draw when ready
pub struct TestGeometry {
    ready: bool,
}

impl Geometry for TestGeometry {
    fn prepare_render(&mut self, _camera: &CameraView<'_>) -> bool {
        self.ready
    }

    fn render(&mut self, device: &mut GpuDevice) -> RenderResult<()> {
        device.backend_mut().draw_arrays(PrimitiveTopology::Triangles, 0, 3);
        Ok(())
    }
}

/// A scene, camera, opaque material and render object wired to a mock device
pub struct TestScene {
    pub device: GpuDevice,
    pub log: CallLog,
    pub frame: FrameContext,
    pub resources: DrawResources,
    pub shaders: ShaderInstanceCache,
    pub scene: Scene,
    pub camera: RenderCamera,
    pub material: MaterialKey,
    pub render_object: RenderObjectKey,
    pub transform: TransformKey,
}

impl TestScene {
    pub fn new() -> Self {
        let (device, log) = mock_device();
        let mut resources = DrawResources::new();
        let shader = Shader::new(
            "Lit",
            vec![SubShader::new()
                .with_flag("RenderType", "Opaque")
                .with_pass(ShaderPass::new("forward"))],
        );
        let material = resources.add_material(Material::new(Rc::new(shader)));
        let render_object = resources.add_render_object(RenderObject::with_world_matrix());
        let transform = resources.add_transform(Mat4::identity());
        let mut camera = Camera::perspective(Vec3::new(0.0, 2.0, 8.0), 60.0, 16.0 / 9.0, 0.1, 100.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        Self {
            device,
            log,
            frame: FrameContext::new(),
            resources,
            shaders: ShaderInstanceCache::new(),
            scene: Scene::new(),
            camera: RenderCamera::new(camera),
            material,
            render_object,
            transform,
        }
    }

    pub fn geometry(&self, ready: bool) -> Box<dyn Geometry> {
        Box::new(TestGeometry { ready })
    }

    pub fn element_with_geometry(&self, ready: bool) -> RenderElement {
        RenderElement::new(self.geometry(ready), self.transform, self.render_object)
    }

    pub fn add_material_with(&mut self, sub_shader: SubShader) -> MaterialKey {
        let shader = Shader::new("Custom", vec![sub_shader]);
        self.resources.add_material(Material::new(Rc::new(shader)))
    }

    pub fn add_render_object(&mut self) -> RenderObjectKey {
        self.resources.add_render_object(RenderObject::with_world_matrix())
    }

    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut RenderContext<'_>) -> R) -> R {
        let mut ctx = RenderContext {
            scene: self.scene.view(),
            camera: self.camera.view(),
            frame: &mut self.frame,
            resources: &mut self.resources,
            shaders: &mut self.shaders,
            device: &mut self.device,
        };
        f(&mut ctx)
    }

    pub fn with_camera_context<R>(&mut self, camera: &RenderCamera, f: impl FnOnce(&mut RenderContext<'_>) -> R) -> R {
        let mut ctx = RenderContext {
            scene: self.scene.view(),
            camera: camera.view(),
            frame: &mut self.frame,
            resources: &mut self.resources,
            shaders: &mut self.shaders,
            device: &mut self.device,
        };
        f(&mut ctx)
    }
}

/// Ready element on the scene's transform and render object, without material
pub fn test_element(scene: &mut TestScene) -> RenderElement {
    scene.element_with_geometry(true)
}
