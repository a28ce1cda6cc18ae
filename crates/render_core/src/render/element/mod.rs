//! Render elements and their execution
//!
//! A [`RenderElement`] is one draw call. Elements live in a [`RenderElementPool`],
//! are queued per pass in a [`RenderQueue`], and are turned into GPU commands by the
//! [`RenderElementExecutor`].

pub mod context;
pub mod executor;
pub mod frame;
pub mod pool;
pub mod queue;
pub mod render_element;
pub mod render_object;
pub mod resources;

pub use context::{CameraId, CameraView, RenderCamera, RenderContext, Scene, SceneId, SceneView};
pub use executor::{ExecuteOutcome, ExecutorStats, RenderElementExecutor};
pub use frame::{FrameContext, UpdateMark};
pub use pool::RenderElementPool;
pub use queue::{QueueKind, QueuePass, RenderQueue};
pub use render_element::{Geometry, MeshGeometry, RenderElement};
pub use render_object::{RenderObject, RenderObjectHooks, RenderType, UpdateContext, WorldMatrixHooks, WORLD_MATRIX};
pub use resources::{DrawResources, Material};
