//! Keyframe animation clip model

use std::collections::HashMap;

use crate::foundation::math::{Vec3, Vec4};

/// Property a keyframe node animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyframeNodeType {
    /// Single float property
    Float,
    /// Local position
    Position,
    /// Local rotation quaternion
    Rotation,
    /// Local scale
    Scale,
    /// Local rotation as Euler angles
    RotationEuler,
}

impl KeyframeNodeType {
    /// Decode the on-disk type tag
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Float),
            1 => Some(Self::Position),
            2 => Some(Self::Rotation),
            3 => Some(Self::Scale),
            4 => Some(Self::RotationEuler),
            _ => None,
        }
    }

    /// Number of floats in each of a keyframe's tangents and value
    pub const fn width(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Position | Self::Scale | Self::RotationEuler => 3,
            Self::Rotation => 4,
        }
    }
}

/// One Hermite keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// Time in seconds
    pub time: f32,
    /// Incoming tangent
    pub in_tangent: T,
    /// Outgoing tangent
    pub out_tangent: T,
    /// Value at `time`
    pub value: T,
}

/// Keyframes of a node, typed by its value width
#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    /// Float curve
    Float(Vec<Keyframe<f32>>),
    /// Three-component curve
    Vector3(Vec<Keyframe<Vec3>>),
    /// Quaternion curve stored as `(x, y, z, w)`
    Quaternion(Vec<Keyframe<Vec4>>),
}

impl Keyframes {
    /// Number of keyframes
    pub fn len(&self) -> usize {
        match self {
            Self::Float(frames) => frames.len(),
            Self::Vector3(frames) => frames.len(),
            Self::Quaternion(frames) => frames.len(),
        }
    }

    /// Whether the curve has no keyframes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keyframe times in order
    pub fn times(&self) -> Vec<f32> {
        match self {
            Self::Float(frames) => frames.iter().map(|k| k.time).collect(),
            Self::Vector3(frames) => frames.iter().map(|k| k.time).collect(),
            Self::Quaternion(frames) => frames.iter().map(|k| k.time).collect(),
        }
    }
}

/// Animated property of one object in the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeNode {
    /// What the node animates
    pub node_type: KeyframeNodeType,
    /// Names from the clip root down to the animated object
    pub owner_path: Vec<String>,
    /// Component owning the property
    pub property_owner: String,
    /// Property path inside the owner
    pub properties: Vec<String>,
    /// The curve
    pub keyframes: Keyframes,
}

impl KeyframeNode {
    /// Owner path joined with `/`
    pub fn owner_key(&self) -> String {
        self.owner_path.join("/")
    }

    /// `owner/path.propertyOwner.prop1.prop2`
    pub fn full_path(&self) -> String {
        format!("{}.{}.{}", self.owner_key(), self.property_owner, self.properties.join("."))
    }
}

/// Typed event parameter
#[derive(Debug, Clone, PartialEq)]
pub enum EventParam {
    /// Boolean parameter
    Bool(bool),
    /// Integer parameter
    Int(i32),
    /// Float parameter
    Float(f32),
    /// String parameter
    String(String),
}

/// Named callback fired at a point of the clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEvent {
    /// Time in seconds, never past the clip duration
    pub time: f32,
    /// Event name
    pub name: String,
    /// Parameters passed to the handler
    pub params: Vec<EventParam>,
}

/// A decoded animation clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Length in seconds
    pub duration: f32,
    /// Whether playback wraps around
    pub looping: bool,
    /// Authoring frame rate
    pub frame_rate: i16,
    nodes: Vec<KeyframeNode>,
    nodes_by_owner: HashMap<String, Vec<usize>>,
    nodes_by_path: HashMap<String, usize>,
    events: Vec<AnimationEvent>,
}

impl AnimationClip {
    /// Empty clip
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Self::default()
        }
    }

    /// Add a node and index it by owner path and full path
    ///
    /// A later node with the same full path shadows the earlier one in
    /// [`Self::node_by_path`].
    pub fn add_node(&mut self, node: KeyframeNode) {
        let index = self.nodes.len();
        self.nodes_by_owner.entry(node.owner_key()).or_default().push(index);
        self.nodes_by_path.insert(node.full_path(), index);
        self.nodes.push(node);
    }

    /// All nodes in file order
    pub fn nodes(&self) -> &[KeyframeNode] {
        &self.nodes
    }

    /// Nodes animating the object at `owner_path` (`a/b`)
    pub fn nodes_for_owner<'a>(&'a self, owner_path: &str) -> impl Iterator<Item = &'a KeyframeNode> + 'a {
        self.nodes_by_owner
            .get(owner_path)
            .into_iter()
            .flatten()
            .map(|&index| &self.nodes[index])
    }

    /// Node with full path `owner.propertyOwner.prop`
    pub fn node_by_path(&self, full_path: &str) -> Option<&KeyframeNode> {
        self.nodes_by_path.get(full_path).map(|&index| &self.nodes[index])
    }

    /// Insert an event, keeping events ordered by time
    ///
    /// Events at equal times keep insertion order.
    pub fn add_event(&mut self, mut event: AnimationEvent) {
        event.time = event.time.min(self.duration);
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
    }

    /// Events ordered by time
    pub fn events(&self) -> &[AnimationEvent] {
        &self.events
    }
}
