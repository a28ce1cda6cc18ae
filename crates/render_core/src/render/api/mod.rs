//! Backend-facing API
//!
//! The render core never talks to a graphics API directly. Everything it needs from
//! the GPU is expressed by [`RenderBackend`] and [`RenderTargetPool`].

pub mod render_backend;
pub mod render_target;

pub use render_backend::{
    BackendResult, BufferId, ClearFlags, PrimitiveTopology, ProgramHandle, RenderBackend, UniformGroup,
};
pub use render_target::{DepthFormat, RenderTargetHandle, RenderTargetPool};
