//! Specialized collection types

pub use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Index-based handle to a world transform in [`crate::render::element::DrawResources`]
    pub struct TransformKey;
    /// Index-based handle to a material
    pub struct MaterialKey;
    /// Index-based handle to a render object (the drawable that owns elements)
    pub struct RenderObjectKey;
    /// Index-based handle to a compiled shader pass instance
    pub struct PassInstanceKey;
    /// Index-based handle to a pooled render element
    pub struct ElementKey;
}
