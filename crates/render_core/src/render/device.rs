//! GPU device wrapper
//!
//! Owns the backend together with the per-context state the render core tracks on
//! top of it.

use crate::render::api::RenderBackend;

/// A backend plus the identity of the buffer state currently bound to it
///
/// Exactly one buffer state can be bound per device at a time. Buffer states compare
/// their own identifier against [`GpuDevice::bound_buffer_state`] before touching
/// vertex input.
pub struct GpuDevice {
    backend: Box<dyn RenderBackend>,
    bound_buffer_state: Option<u64>,
}

impl GpuDevice {
    /// Wrap a backend with no buffer state bound
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        log::debug!(
            "GpuDevice created (instancing supported: {})",
            backend.supports_instancing()
        );
        Self {
            backend,
            bound_buffer_state: None,
        }
    }

    /// Shared access to the backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Exclusive access to the backend
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Whether per-instance attributes are available on this device
    pub fn supports_instancing(&self) -> bool {
        self.backend.supports_instancing()
    }

    /// Identifier of the buffer state bound right now, if any
    pub fn bound_buffer_state(&self) -> Option<u64> {
        self.bound_buffer_state
    }

    pub(crate) fn set_bound_buffer_state(&mut self, state: Option<u64>) {
        self.bound_buffer_state = state;
    }
}

impl std::fmt::Debug for GpuDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuDevice")
            .field("bound_buffer_state", &self.bound_buffer_state)
            .finish_non_exhaustive()
    }
}
