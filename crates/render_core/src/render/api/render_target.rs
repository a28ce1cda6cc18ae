//! Pooled offscreen render targets

use super::BackendResult;

/// Depth attachment format of a pooled target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthFormat {
    /// 16-bit depth, what shadow maps use
    Depth16,
    /// 24-bit depth with 8-bit stencil
    Depth24Stencil8,
    /// 32-bit float depth
    Depth32Float,
}

/// Handle to a pooled render target
///
/// Also used as the sampler binding published to shaders once the target has been
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u64);

/// Source of temporary render targets
///
/// A target acquired during a frame must be released before the next frame acquires
/// its replacement.
pub trait RenderTargetPool {
    /// Borrow a target of the given size and depth format
    fn acquire(&mut self, width: u32, height: u32, depth: DepthFormat) -> BackendResult<RenderTargetHandle>;

    /// Return a target to the pool
    fn release(&mut self, target: RenderTargetHandle);

    /// Redirect subsequent draws into `target`
    fn begin(&mut self, target: RenderTargetHandle);

    /// Restore the previous target after drawing into `target`
    fn end(&mut self, target: RenderTargetHandle);
}
