//! # Render Queue
//!
//! Collects the pooled elements visible in one pass and replays them through the
//! executor.
//!
//! - **Opaque** elements are drawn first, sorted front-to-back for early depth rejection
//! - **Transparent** elements follow, sorted back-to-front for correct blending

use crate::foundation::collections::ElementKey;
use crate::render::shader::Shader;
use crate::render::{RenderError, RenderResult};

use super::{ExecuteOutcome, RenderContext, RenderElementExecutor, RenderElementPool};

/// Which list an element is queued in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Depth-tested, no blending
    Opaque,
    /// Blended over the opaque result
    Transparent,
}

/// How a queue replays its elements
#[derive(Debug, Clone, Copy, Default)]
pub struct QueuePass<'s> {
    /// Render target is flipped (affects winding)
    pub is_shadow_target: bool,
    /// Replacement shader, e.g. a depth-only caster shader
    pub custom_shader: Option<&'s Shader>,
    /// Sub-shader flag used to pick from `custom_shader`
    pub replacement_tag: Option<&'s str>,
}

/// Element keys of one pass, split into opaque and transparent lists
#[derive(Debug, Default)]
pub struct RenderQueue {
    opaque: Vec<ElementKey>,
    transparent: Vec<ElementKey>,
    last_transparent: Option<ElementKey>,
    last_transparent_batched: bool,
}

impl RenderQueue {
    /// Create a new empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a render queue with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            opaque: Vec::with_capacity(capacity),
            transparent: Vec::with_capacity(capacity / 4),
            ..Self::default()
        }
    }

    /// Queue an element into the given list
    pub fn add(&mut self, kind: QueueKind, key: ElementKey) {
        match kind {
            QueueKind::Opaque => self.add_opaque(key),
            QueueKind::Transparent => self.add_transparent(key),
        }
    }

    /// Queue an opaque element
    pub fn add_opaque(&mut self, key: ElementKey) {
        self.opaque.push(key);
    }

    /// Queue a transparent element
    ///
    /// The element becomes the batching candidate for the next transparent element.
    pub fn add_transparent(&mut self, key: ElementKey) {
        self.transparent.push(key);
        self.last_transparent = Some(key);
        self.last_transparent_batched = false;
    }

    /// Last transparent element queued
    pub fn last_transparent(&self) -> Option<ElementKey> {
        self.last_transparent
    }

    /// Whether the last transparent element has been merged into a dynamic batch
    pub fn last_transparent_batched(&self) -> bool {
        self.last_transparent_batched
    }

    /// Record that the last transparent element was merged into a batch
    pub fn mark_last_transparent_batched(&mut self) {
        self.last_transparent_batched = true;
    }

    /// Sort by each element's `depth_key`
    ///
    /// Opaque near to far, transparent far to near. Stale keys sort last.
    pub fn sort(&mut self, pool: &RenderElementPool) {
        let depth = |key: &ElementKey| pool.get(*key).map_or(f32::INFINITY, |element| element.depth_key);
        self.opaque.sort_by(|a, b| depth(a).total_cmp(&depth(b)));
        self.transparent.sort_by(|a, b| {
            let (a, b) = (depth(a), depth(b));
            // Stale keys (infinite depth) still go last
            match (a.is_finite(), b.is_finite()) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => b.total_cmp(&a),
            }
        });
    }

    /// Opaque keys in draw order
    pub fn opaque(&self) -> &[ElementKey] {
        &self.opaque
    }

    /// Transparent keys in draw order
    pub fn transparent(&self) -> &[ElementKey] {
        &self.transparent
    }

    /// Total number of queued elements
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }

    /// Clear all elements for next frame
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.last_transparent = None;
        self.last_transparent_batched = false;
    }

    /// Execute every queued element, opaque first
    ///
    /// Returns the number of elements that drew at least one pass.
    pub fn render(
        &self,
        executor: &mut RenderElementExecutor,
        ctx: &mut RenderContext<'_>,
        pool: &mut RenderElementPool,
        pass: QueuePass<'_>,
    ) -> RenderResult<usize> {
        executor.reset_state_cache();
        let mut drawn = 0;
        for &key in self.opaque.iter().chain(&self.transparent) {
            let element = pool.get_mut(key).ok_or(RenderError::StaleElement)?;
            let outcome = executor.execute(ctx, element, pass.is_shadow_target, pass.custom_shader, pass.replacement_tag)?;
            if matches!(outcome, ExecuteOutcome::Drawn { .. }) {
                drawn += 1;
            }
        }
        Ok(drawn)
    }
}
