//! # Render Core
//!
//! The per-frame core of a real-time 3D renderer, written against an abstract GPU
//! backend.
//!
//! ## Features
//!
//! - **Render element dispatch**: shader pass resolution, variant compilation and
//!   de-duplicated uniform uploads per draw call
//! - **Buffer binding sessions**: vertex/index buffer state with a bind-first contract
//! - **Cascaded shadow maps**: split distances, frustum bounding spheres, texel-snapped
//!   light cameras and the shadow map lifecycle
//! - **Animation clips**: binary clip decoding (format revision 03)
//!
//! ## Quick Start
//!
//! ```rust
//! use render_core::prelude::*;
//!
//! let mut scene = Scene::new();
//! let mut camera = Camera::perspective(Vec3::new(0.0, 5.0, 20.0), 60.0, 16.0 / 9.0, 0.1, 500.0);
//! camera.look_at(Vec3::zeros(), Vec3::y());
//!
//! let config = RenderCoreConfig::default();
//! let light = DirectionalLight::new(Vec3::new(-0.4, -1.0, -0.3));
//! let mut shadows = CascadedShadowPlanner::from_config(&config.shadows, light, &mut scene.shader_data);
//! shadows.compute_all(&camera, &mut scene.shader_data)?;
//! # Ok::<(), RenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod config;
pub mod core;
pub mod foundation;
pub mod render;

/// Common imports for render core users
pub mod prelude {
    pub use crate::{
        animation::{parse_clip, AnimationClip, ClipParseError},
        core::{Config, ConfigError, RenderCoreConfig, ShadowConfig},
        foundation::math::{Mat4, Vec3, Vec4},
        render::{
            element::{
                FrameContext, Material, RenderCamera, RenderContext, RenderElement, RenderElementExecutor,
                RenderElementPool, RenderObject, RenderQueue, RenderType, Scene,
            },
            primitives::{BoundingSphere, Camera},
            shader::{Shader, ShaderData, ShaderDefines, ShaderPass, SubShader},
            shadow::{CascadedShadowPlanner, DirectionalLight, PcfQuality},
            GpuDevice, RenderBackend, RenderError, RenderResult, RenderTargetPool,
        },
    };
}
