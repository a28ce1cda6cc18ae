//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the render core:
//! - Math types and projection helpers
//! - Arena handles (generational slot keys)
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
