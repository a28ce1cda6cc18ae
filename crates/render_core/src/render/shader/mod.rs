//! Shader model consumed by the executor
//!
//! Only the contracts the render core relies on live here: define masks, named
//! uniform storage, the shader/sub-shader/pass hierarchy and the cache of compiled
//! pass variants. Source code and compilation belong to the backend.

pub mod defines;
pub mod instance;
#[allow(clippy::module_inception)]
pub mod shader;
pub mod shader_data;

pub use defines::ShaderDefines;
pub use instance::{CompileDefines, ShaderInstanceCache, ShaderPassInstance};
pub use shader::{PassId, Shader, ShaderPass, SubShader};
pub use shader_data::{ShaderData, UniformValue};
