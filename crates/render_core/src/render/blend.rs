//! Canvas-style blend modes
//!
//! Maps the named compositing modes used by 2D content onto GPU blend factors.

use std::str::FromStr;

use crate::render::api::RenderBackend;

/// Blend factor applied to the source or destination color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// 0
    Zero,
    /// 1
    One,
    /// Source alpha
    SrcAlpha,
    /// 1 - source color
    OneMinusSrcColor,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination color
    DstColor,
    /// Destination alpha
    DstAlpha,
}

/// Named compositing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Premultiplied source-over
    #[default]
    Normal,
    /// Additive; `"lighter"` parses to this too
    Add,
    /// Multiply
    Multiply,
    /// Screen
    Screen,
    /// Overlay
    Overlay,
    /// Light
    Light,
    /// Keep the destination where the source is opaque
    Mask,
    /// Clear the destination
    DestinationOut,
}

impl BlendMode {
    /// Every mode, indexed by its numeric id
    pub const ALL: [Self; 8] = [
        Self::Normal,
        Self::Add,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Light,
        Self::Mask,
        Self::DestinationOut,
    ];

    /// Canonical name of the mode
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Light => "light",
            Self::Mask => "mask",
            Self::DestinationOut => "destination-out",
        }
    }

    /// `(source, destination)` factors for the mode
    ///
    /// Drawing into an offscreen target uses the same factors as drawing to screen.
    pub const fn factors(self) -> (BlendFactor, BlendFactor) {
        match self {
            Self::Normal => (BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            Self::Add => (BlendFactor::One, BlendFactor::DstAlpha),
            Self::Multiply => (BlendFactor::DstColor, BlendFactor::OneMinusSrcAlpha),
            Self::Screen | Self::Light => (BlendFactor::One, BlendFactor::One),
            Self::Overlay => (BlendFactor::One, BlendFactor::OneMinusSrcColor),
            Self::Mask => (BlendFactor::Zero, BlendFactor::SrcAlpha),
            Self::DestinationOut => (BlendFactor::Zero, BlendFactor::Zero),
        }
    }

    /// Mode from its numeric id
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Numeric id of the mode
    pub fn index(self) -> usize {
        self as usize
    }

    /// Issue the mode's blend function on `backend`
    pub fn apply(self, backend: &mut dyn RenderBackend) {
        let (source, destination) = self.factors();
        backend.set_blend_func(source, destination);
    }
}

/// Error returned when parsing an unknown blend mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blend mode: {0}")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "add" | "lighter" => Ok(Self::Add),
            "multiply" => Ok(Self::Multiply),
            "screen" => Ok(Self::Screen),
            "overlay" => Ok(Self::Overlay),
            "light" => Ok(Self::Light),
            "mask" => Ok(Self::Mask),
            "destination-out" => Ok(Self::DestinationOut),
            other => Err(UnknownBlendMode(other.to_string())),
        }
    }
}
