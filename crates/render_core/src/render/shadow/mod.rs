//! # Cascaded Shadow Maps
//!
//! Splits the view frustum into up to [`MAX_CASCADES`] depth slices, fits a light
//! camera around each slice and publishes the resulting texture-space matrices to the
//! scene so receivers can sample the shadow map.
//!
//! ## Frame sequence
//!
//! ```text
//! configure ─▶ compute_all (begin/end per cascade) ─▶ start ─▶ prepare_viewport
//!          ─▶ render casters per light camera ─▶ end ─▶ render receivers ─▶ clear
//! ```

pub mod cascade;
pub mod light;
pub mod planner;

use serde::{Deserialize, Serialize};

use crate::render::shader::ShaderDefines;

pub use cascade::{compute_split_distances, snap_to_texel_grid, texture_bias_matrix};
pub use light::{DirectionalLight, LightBasis};
pub use planner::{CascadedShadowPlanner, ShadowCascadeState};

/// Maximum number of shadow cascades
pub const MAX_CASCADES: usize = 4;

/// Uniform names published to the scene's shader data
pub mod uniforms {
    /// Far distance of each cascade (`vec4`, unused slots zero)
    pub const SHADOW_DISTANCE: &str = "u_shadowPSSMDistance";
    /// Texture-space light matrices, `cascade_count + 1` column-major `mat4`s
    pub const SHADOW_LIGHT_VIEW_PROJECT: &str = "u_lightShadowVP";
    /// One shadow-map texel in UV units (`vec2`)
    pub const SHADOW_PCF_OFFSET: &str = "u_shadowPCFoffset";
    /// The shadow map sampler
    pub const SHADOW_MAP_TEXTURE: &str = "u_shadowMap1";
}

/// Percentage-closer filtering quality of shadow lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PcfQuality {
    /// Single unfiltered lookup
    #[default]
    None,
    /// One-tap filter
    OneTap,
    /// Two-tap filter
    TwoTap,
    /// Three-tap filter
    ThreeTap,
}

impl PcfQuality {
    /// Quality from the numeric level `0..=3`
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::OneTap),
            2 => Some(Self::TwoTap),
            3 => Some(Self::ThreeTap),
            _ => None,
        }
    }

    /// The shader define selecting this quality
    pub const fn define(self) -> ShaderDefines {
        match self {
            Self::None => ShaderDefines::SHADOW_PCF_NO,
            Self::OneTap => ShaderDefines::SHADOW_PCF1,
            Self::TwoTap => ShaderDefines::SHADOW_PCF2,
            Self::ThreeTap => ShaderDefines::SHADOW_PCF3,
        }
    }
}

/// Define announcing `cascade_count` cascades to shaders
///
/// Four cascades have no dedicated define; shaders treat "no PSSM define" as the
/// four-cascade path.
pub const fn cascade_define(cascade_count: usize) -> ShaderDefines {
    match cascade_count {
        1 => ShaderDefines::SHADOW_PSSM1,
        2 => ShaderDefines::SHADOW_PSSM2,
        3 => ShaderDefines::SHADOW_PSSM3,
        _ => ShaderDefines::empty(),
    }
}
