//! # Core Module
//!
//! Shared configuration for the render core subsystems.

pub mod config;

pub use config::{Config, ConfigError, ExecutorConfig, RenderCoreConfig, ShadowConfig};
