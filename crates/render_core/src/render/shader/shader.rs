//! Shader, sub-shader and pass descriptions
//!
//! A [`Shader`] groups alternative [`SubShader`]s; each sub-shader is an ordered list
//! of [`ShaderPass`]es plus string flags (e.g. `RenderType = Opaque`). Replacement
//! rendering picks a sub-shader of another shader by matching one of those flags,
//! which is resolved through a table built once in [`Shader::new`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_PASS_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identifier of a shader pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(u32);

impl PassId {
    /// Raw identifier value
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One program of a sub-shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPass {
    id: PassId,
    name: String,
}

impl ShaderPass {
    /// Create a pass with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PassId(NEXT_PASS_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
        }
    }

    /// Identifier keying compiled variants of this pass
    pub fn id(&self) -> PassId {
        self.id
    }

    /// Human-readable pass name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered passes sharing a set of string flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubShader {
    flags: HashMap<String, String>,
    passes: Vec<ShaderPass>,
}

impl SubShader {
    /// Sub-shader without flags or passes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set flag `tag` to `value`
    #[must_use]
    pub fn with_flag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.insert(tag.into(), value.into());
        self
    }

    /// Append a pass
    #[must_use]
    pub fn with_pass(mut self, pass: ShaderPass) -> Self {
        self.passes.push(pass);
        self
    }

    /// Value of flag `tag`
    pub fn flag(&self, tag: &str) -> Option<&str> {
        self.flags.get(tag).map(String::as_str)
    }

    /// Passes in execution order
    pub fn passes(&self) -> &[ShaderPass] {
        &self.passes
    }
}

/// A named collection of sub-shaders
#[derive(Debug, Clone)]
pub struct Shader {
    name: String,
    sub_shaders: Vec<SubShader>,
    // tag -> flag value -> sub-shader index; first sub-shader wins on duplicates
    replacements: HashMap<String, HashMap<String, usize>>,
}

impl Shader {
    /// Create a shader and index its sub-shader flags for replacement lookups
    pub fn new(name: impl Into<String>, sub_shaders: Vec<SubShader>) -> Self {
        let name = name.into();
        let mut replacements: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (index, sub_shader) in sub_shaders.iter().enumerate() {
            for (tag, value) in &sub_shader.flags {
                replacements
                    .entry(tag.clone())
                    .or_default()
                    .entry(value.clone())
                    .or_insert(index);
            }
        }
        log::debug!(
            "Shader '{}' created with {} sub-shaders, {} replacement tags",
            name,
            sub_shaders.len(),
            replacements.len()
        );
        Self {
            name,
            sub_shaders,
            replacements,
        }
    }

    /// Shader name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-shader at `index`
    pub fn sub_shader(&self, index: usize) -> Option<&SubShader> {
        self.sub_shaders.get(index)
    }

    /// The sub-shader used when no replacement applies
    pub fn default_sub_shader(&self) -> Option<&SubShader> {
        self.sub_shaders.first()
    }

    /// All sub-shaders in declaration order
    pub fn sub_shaders(&self) -> &[SubShader] {
        &self.sub_shaders
    }

    /// Sub-shader whose flag `tag` equals `value`
    pub fn replacement_for(&self, tag: &str, value: &str) -> Option<&SubShader> {
        let index = *self.replacements.get(tag)?.get(value)?;
        self.sub_shaders.get(index)
    }
}
