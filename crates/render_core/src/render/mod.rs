//! # Rendering Core
//!
//! Draw-call dispatch and shadow planning on top of an abstract GPU backend.
//!
//! ## Architecture
//!
//! ```text
//! CascadedShadowPlanner ──publishes──▶ scene ShaderData (defines, matrices, distances)
//!          │                                    │
//!          └─light cameras──┐                   ▼
//!                           ▼        RenderElementExecutor ──▶ ShaderInstanceCache
//!                      RenderQueue ──────────┘        │
//!                                                     ▼
//!                                GpuDevice (RenderBackend + bound BufferState)
//! ```
//!
//! The planner runs to completion once per frame before any queue that samples its
//! output. The executor then runs once per element per pass, including once per
//! cascade with the matching light camera bound.

pub mod api;
pub mod blend;
pub mod buffer_state;
pub mod device;
pub mod element;
pub mod primitives;
pub mod shader;
pub mod shadow;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{BackendResult, RenderBackend, RenderTargetPool};
pub use device::GpuDevice;

use thiserror::Error;

/// Result type for render core operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the render core
///
/// Every variant describes a broken caller contract or a backend failure. Nothing in
/// the core retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A buffer-state operation ran without the state being bound first
    #[error("Buffer state {state} must be bound before applying buffers")]
    PrecededBindRequired {
        /// Identifier of the buffer state the caller tried to use
        state: u64,
    },

    /// The backend failed to compile a shader pass variant
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    /// A cascade index outside `0..=cascade_count` was requested
    #[error("Cascade index {index} is out of range for {count} cascades")]
    InvalidCascadeIndex {
        /// Requested cascade
        index: usize,
        /// Active cascade count
        count: usize,
    },

    /// A cascade was ended without being begun
    #[error("Cascade {0} is not the active cascade")]
    CascadeNotActive(usize),

    /// A cascade was begun while another one was still active
    #[error("Cascade {0} is still active")]
    CascadeAlreadyActive(usize),

    /// The camera matrix could not be inverted to recover the frustum
    #[error("Camera view-projection matrix is not invertible")]
    DegenerateFrustum,

    /// Shadow map operations were issued before `start`
    #[error("Shadow map has not been started for this frame")]
    ShadowMapNotStarted,

    /// The render element arena is full
    #[error("Render element pool exhausted (capacity {capacity})")]
    PoolExhausted {
        /// Fixed capacity of the pool
        capacity: usize,
    },

    /// An element handle no longer refers to a live element
    #[error("Render element handle is stale")]
    StaleElement,

    /// An element referenced a resource that is not registered
    #[error("Missing resource: {0}")]
    MissingResource(&'static str),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    Backend(String),
}
