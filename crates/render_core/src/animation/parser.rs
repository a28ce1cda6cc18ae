//! Binary animation clip reader (format revision 03)
//!
//! ## Layout
//!
//! All values are little-endian.
//!
//! ```text
//! data_offset: u32, data_size: u32
//! block_count: u16, block_count × (start: u32, length: u32)
//! string_offset: u32, string_count: u16      strings live at data_offset + string_offset
//! block_count × (name: u16, block payload)
//! ```
//!
//! Strings are a `u16` byte length followed by UTF-8 bytes.

use thiserror::Error;

use crate::foundation::math::{Vec3, Vec4};

use super::clip::{AnimationClip, AnimationEvent, EventParam, Keyframe, KeyframeNode, KeyframeNodeType, Keyframes};

/// Failure decoding a clip
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipParseError {
    /// The input ended inside a value
    #[error("unexpected end of data at offset {offset}, needed {needed} more bytes")]
    UnexpectedEof {
        /// Read position
        offset: usize,
        /// Bytes the value required
        needed: usize,
    },

    /// A string table entry is not UTF-8
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Start of the string bytes
        offset: usize,
    },

    /// A block name has no reader
    #[error("unknown block '{0}'")]
    UnknownBlock(String),

    /// A keyframe node type tag is not recognized
    #[error("unknown keyframe node type {0}")]
    UnknownNodeType(u8),

    /// An event parameter type tag is not recognized
    #[error("unknown event parameter type {0}")]
    UnknownEventParam(u8),

    /// A string index points past the string table
    #[error("string index {index} out of range ({count} strings)")]
    StringIndex {
        /// Index read from the file
        index: usize,
        /// Size of the string table
        count: usize,
    },

    /// A keyframe start-time index points past the time table
    #[error("start time index {index} out of range ({count} times)")]
    StartTimeIndex {
        /// Index read from the file
        index: usize,
        /// Size of the time table
        count: usize,
    },
}

/// Block kinds a clip file may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Clip header, keyframe nodes and events
    Animations,
}

impl BlockKind {
    /// Resolve a block name from the string table
    pub fn from_name(name: &str) -> Result<Self, ClipParseError> {
        match name {
            "ANIMATIONS" => Ok(Self::Animations),
            other => Err(ClipParseError::UnknownBlock(other.to_string())),
        }
    }
}

/// Entry of the block table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Byte offset of the block
    pub start: u32,
    /// Byte length of the block
    pub length: u32,
}

/// Little-endian cursor over a byte slice
struct ClipReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClipReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ClipParseError> {
        let slice = self.take_slice(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], ClipParseError> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.bytes.len());
        let Some(end) = end else {
            return Err(ClipParseError::UnexpectedEof {
                offset: self.pos,
                needed: len,
            });
        };
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClipParseError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, ClipParseError> {
        self.take().map(u16::from_le_bytes)
    }

    fn i16(&mut self) -> Result<i16, ClipParseError> {
        self.take().map(i16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, ClipParseError> {
        self.take().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> Result<i32, ClipParseError> {
        self.take().map(i32::from_le_bytes)
    }

    fn f32(&mut self) -> Result<f32, ClipParseError> {
        self.take().map(f32::from_le_bytes)
    }

    fn vec3(&mut self) -> Result<Vec3, ClipParseError> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    fn vec4(&mut self) -> Result<Vec4, ClipParseError> {
        Ok(Vec4::new(self.f32()?, self.f32()?, self.f32()?, self.f32()?))
    }

    fn utf_string(&mut self) -> Result<String, ClipParseError> {
        let len = usize::from(self.u16()?);
        let offset = self.pos;
        let bytes = self.take_slice(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ClipParseError::InvalidUtf8 { offset })
    }
}

/// Decoder state shared by the block readers
struct ClipParser<'a> {
    reader: ClipReader<'a>,
    strings: Vec<String>,
    blocks: Vec<BlockSpan>,
}

impl<'a> ClipParser<'a> {
    fn string(&mut self) -> Result<String, ClipParseError> {
        let index = usize::from(self.reader.u16()?);
        self.strings.get(index).cloned().ok_or(ClipParseError::StringIndex {
            index,
            count: self.strings.len(),
        })
    }

    fn strings(&mut self) -> Result<Vec<String>, ClipParseError> {
        let count = self.reader.u16()?;
        (0..count).map(|_| self.string()).collect()
    }

    fn read_header(&mut self) -> Result<(), ClipParseError> {
        let data_offset = self.reader.u32()? as usize;
        let _data_size = self.reader.u32()?;

        let block_count = self.reader.u16()?;
        self.blocks = (0..block_count)
            .map(|_| {
                Ok(BlockSpan {
                    start: self.reader.u32()?,
                    length: self.reader.u32()?,
                })
            })
            .collect::<Result<_, ClipParseError>>()?;

        let string_offset = self.reader.u32()? as usize;
        let string_count = self.reader.u16()?;
        let resume = self.reader.pos;
        self.reader.pos = data_offset.saturating_add(string_offset);
        self.strings = (0..string_count)
            .map(|_| self.reader.utf_string())
            .collect::<Result<_, _>>()?;
        self.reader.pos = resume;
        Ok(())
    }

    fn read_animations(&mut self, clip: &mut AnimationClip) -> Result<(), ClipParseError> {
        let time_count = self.reader.u16()?;
        let start_times = (0..time_count)
            .map(|_| self.reader.f32())
            .collect::<Result<Vec<_>, _>>()?;

        clip.name = self.string()?;
        clip.duration = self.reader.f32()?;
        clip.looping = self.reader.u8()? != 0;
        clip.frame_rate = self.reader.i16()?;

        let node_count = self.reader.i16()?.max(0);
        for _ in 0..node_count {
            let node = self.read_node(&start_times)?;
            clip.add_node(node);
        }

        let event_count = self.reader.u16()?;
        for _ in 0..event_count {
            let event = self.read_event()?;
            clip.add_event(event);
        }

        log::debug!(
            "Parsed clip '{}': {} nodes, {} events, {:.3}s",
            clip.name,
            clip.nodes().len(),
            clip.events().len(),
            clip.duration
        );
        Ok(())
    }

    fn read_node(&mut self, start_times: &[f32]) -> Result<KeyframeNode, ClipParseError> {
        let tag = self.reader.u8()?;
        let node_type = KeyframeNodeType::from_tag(tag).ok_or(ClipParseError::UnknownNodeType(tag))?;
        let owner_path = self.strings()?;
        let property_owner = self.string()?;
        let properties = self.strings()?;

        let count = self.reader.u16()?;
        let keyframes = match node_type {
            KeyframeNodeType::Float => Keyframes::Float(
                (0..count)
                    .map(|_| self.keyframe(start_times, |r| r.f32()))
                    .collect::<Result<_, _>>()?,
            ),
            KeyframeNodeType::Position | KeyframeNodeType::Scale | KeyframeNodeType::RotationEuler => {
                Keyframes::Vector3(
                    (0..count)
                        .map(|_| self.keyframe(start_times, ClipReader::vec3))
                        .collect::<Result<_, _>>()?,
                )
            }
            KeyframeNodeType::Rotation => Keyframes::Quaternion(
                (0..count)
                    .map(|_| self.keyframe(start_times, ClipReader::vec4))
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(KeyframeNode {
            node_type,
            owner_path,
            property_owner,
            properties,
            keyframes,
        })
    }

    fn keyframe<T>(
        &mut self,
        start_times: &[f32],
        mut read: impl FnMut(&mut ClipReader<'a>) -> Result<T, ClipParseError>,
    ) -> Result<Keyframe<T>, ClipParseError> {
        let index = usize::from(self.reader.u16()?);
        let time = *start_times.get(index).ok_or(ClipParseError::StartTimeIndex {
            index,
            count: start_times.len(),
        })?;

        Ok(Keyframe {
            time,
            in_tangent: read(&mut self.reader)?,
            out_tangent: read(&mut self.reader)?,
            value: read(&mut self.reader)?,
        })
    }

    fn read_event(&mut self) -> Result<AnimationEvent, ClipParseError> {
        let time = self.reader.f32()?;
        let name = self.string()?;
        let count = self.reader.u16()?;
        let params = (0..count)
            .map(|_| {
                let tag = self.reader.u8()?;
                match tag {
                    0 => Ok(EventParam::Bool(self.reader.u8()? != 0)),
                    1 => Ok(EventParam::Int(self.reader.i32()?)),
                    2 => Ok(EventParam::Float(self.reader.f32()?)),
                    3 => Ok(EventParam::String(self.string()?)),
                    other => Err(ClipParseError::UnknownEventParam(other)),
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(AnimationEvent { time, name, params })
    }
}

/// Decode a format-03 clip
pub fn parse_clip(bytes: &[u8]) -> Result<AnimationClip, ClipParseError> {
    let mut parser = ClipParser {
        reader: ClipReader::new(bytes),
        strings: Vec::new(),
        blocks: Vec::new(),
    };
    parser.read_header()?;

    let mut clip = AnimationClip::default();
    for _ in 0..parser.blocks.len() {
        let name = parser.string()?;
        match BlockKind::from_name(&name)? {
            BlockKind::Animations => parser.read_animations(&mut clip)?,
        }
    }
    Ok(clip)
}
