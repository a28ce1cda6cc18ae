//! Fixed-capacity arena of render elements
//!
//! Released slots are reused by later acquisitions, so a steady-state frame loop does
//! not allocate. Keys are generational: a key to a released element stays invalid
//! even after its slot is reused.

use crate::core::config::ExecutorConfig;
use crate::foundation::collections::{ElementKey, SlotMap};
use crate::render::{RenderError, RenderResult};

use super::RenderElement;

/// Arena of [`RenderElement`]s with a hard capacity
#[derive(Debug)]
pub struct RenderElementPool {
    elements: SlotMap<ElementKey, RenderElement>,
    capacity: usize,
}

impl RenderElementPool {
    /// Pool holding at most `capacity` live elements
    pub fn new(capacity: usize) -> Self {
        Self {
            elements: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    /// Pool sized from configuration
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.element_pool_capacity)
    }

    /// Store `element` and return its key
    pub fn acquire(&mut self, element: RenderElement) -> RenderResult<ElementKey> {
        if self.elements.len() >= self.capacity {
            log::warn!("Render element pool exhausted at {} elements", self.capacity);
            return Err(RenderError::PoolExhausted { capacity: self.capacity });
        }
        Ok(self.elements.insert(element))
    }

    /// Remove an element and hand it back
    pub fn release(&mut self, key: ElementKey) -> RenderResult<RenderElement> {
        self.elements.remove(key).ok_or(RenderError::StaleElement)
    }

    /// Element by key
    pub fn get(&self, key: ElementKey) -> Option<&RenderElement> {
        self.elements.get(key)
    }

    /// Mutable element by key
    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut RenderElement> {
        self.elements.get_mut(key)
    }

    /// Drop every element, keeping the storage
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Live elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element is live
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Maximum number of live elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
