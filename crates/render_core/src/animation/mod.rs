//! Keyframe animation clips and their binary format

pub mod clip;
pub mod parser;

pub use clip::{AnimationClip, AnimationEvent, EventParam, Keyframe, KeyframeNode, KeyframeNodeType, Keyframes};
pub use parser::{parse_clip, BlockKind, BlockSpan, ClipParseError};
