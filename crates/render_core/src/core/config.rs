//! # Render Core Configuration
//!
//! Settings for the shadow planner and the draw-call executor, grouped under a
//! single [`RenderCoreConfig`] that can be loaded from TOML or RON.
//!
//! ```toml
//! log_level = "info"
//!
//! [shadows]
//! max_distance = 150.0
//! texture_size = 2048
//! cascade_count = 3
//! pcf_quality = "TwoTap"
//! near_plane_bias = 0.1
//!
//! [executor]
//! element_pool_capacity = 4096
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::render::shadow::{PcfQuality, MAX_CASCADES};

/// # Shadow Configuration
///
/// Parameters fed to [`crate::render::shadow::CascadedShadowPlanner::configure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Farthest view distance that still receives shadows
    pub max_distance: f32,
    /// Edge length of the square shadow map in texels
    pub texture_size: u32,
    /// Number of cascades (1..=4)
    pub cascade_count: usize,
    /// Percentage-closer filtering quality
    pub pcf_quality: PcfQuality,
    /// Blend between uniform and logarithmic splits; `None` uses `1 / cascade_count`
    pub split_ratio: Option<f32>,
    /// Near plane of every light camera
    pub near_plane_bias: f32,
}

impl ShadowConfig {
    /// Set the shadow distance
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the cascade count
    pub fn with_cascade_count(mut self, cascade_count: usize) -> Self {
        self.cascade_count = cascade_count;
        self
    }

    /// Set the shadow map resolution
    pub fn with_texture_size(mut self, texture_size: u32) -> Self {
        self.texture_size = texture_size;
        self
    }

    /// Set the PCF quality
    pub fn with_pcf_quality(mut self, pcf_quality: PcfQuality) -> Self {
        self.pcf_quality = pcf_quality;
        self
    }

    /// Override the split blend ratio
    pub fn with_split_ratio(mut self, ratio: f32) -> Self {
        self.split_ratio = Some(ratio);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "shadow max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if self.texture_size == 0 {
            return Err(ConfigError::Invalid("shadow texture_size must be non-zero".to_string()));
        }
        if self.cascade_count == 0 || self.cascade_count > MAX_CASCADES {
            return Err(ConfigError::Invalid(format!(
                "cascade_count must be within 1..={MAX_CASCADES}, got {}",
                self.cascade_count
            )));
        }
        if let Some(ratio) = self.split_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::Invalid(format!("split_ratio must be within 0..=1, got {ratio}")));
            }
        }
        if self.near_plane_bias < 0.0 {
            return Err(ConfigError::Invalid("near_plane_bias must not be negative".to_string()));
        }
        Ok(())
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            max_distance: 200.0,
            texture_size: 1024,
            cascade_count: 3,
            pcf_quality: PcfQuality::None,
            split_ratio: None,
            near_plane_bias: 0.1,
        }
    }
}

/// # Executor Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Capacity of the render element arena
    pub element_pool_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { element_pool_capacity: 4096 }
    }
}

/// # Complete Render Core Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderCoreConfig {
    /// Default log filter handed to [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
    /// Cascaded shadow settings
    pub shadows: ShadowConfig,
    /// Render element executor settings
    pub executor: ExecutorConfig,
}

impl RenderCoreConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shadows.validate()?;
        if self.executor.element_pool_capacity == 0 {
            return Err(ConfigError::Invalid("element_pool_capacity must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for RenderCoreConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            shadows: ShadowConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl Config for RenderCoreConfig {}
