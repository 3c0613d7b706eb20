//! Timeline node types
//!
//! Contains the arena node `TimelineNode`, its closed `NodeKind` discriminant
//! and the raw role attributes found on a node. Every field is decoded once;
//! traversal code never looks at tag strings again.

use core::fmt;

use crate::resolve::TimeMap;
use crate::timecode::{FrameRate, Rational, TimecodeError};

/// Index of a node inside its [`Timeline`](super::Timeline) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural category of a timeline element
///
/// # Examples
///
/// ```rust
/// use markers_core::model::NodeKind;
///
/// assert_eq!(NodeKind::parse_tag("ref-clip"), NodeKind::CompoundClipRef);
/// assert_eq!(NodeKind::CompoundClipRef.as_str(), "ref-clip");
/// assert!(NodeKind::parse_tag("adjust-transform").is_other());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Library,
    Event,
    Project,
    /// Compound or multicam definition in `<resources>`
    Media,
    Sequence,
    Spine,
    AssetClip,
    Clip,
    Gap,
    Title,
    Video,
    Audio,
    Audition,
    SyncClip,
    /// `<mc-clip>` instance of a multicam media
    MulticamClip,
    /// `<ref-clip>` instance of a compound clip media
    CompoundClipRef,
    Marker,
    ChapterMarker,
    Caption,
    Keyword,
    /// `<audio-channel-source>` or `<audio-role-source>`
    AudioChannelSource,
    /// Any element without structural meaning for extraction
    Other(String),
}

impl NodeKind {
    /// Decode an FCPXML tag name
    #[must_use]
    pub fn parse_tag(tag: &str) -> Self {
        match tag {
            "library" => Self::Library,
            "event" => Self::Event,
            "project" => Self::Project,
            "media" => Self::Media,
            "sequence" => Self::Sequence,
            "spine" => Self::Spine,
            "asset-clip" => Self::AssetClip,
            "clip" => Self::Clip,
            "gap" => Self::Gap,
            "title" => Self::Title,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "audition" => Self::Audition,
            "sync-clip" => Self::SyncClip,
            "mc-clip" => Self::MulticamClip,
            "ref-clip" => Self::CompoundClipRef,
            "marker" => Self::Marker,
            "chapter-marker" => Self::ChapterMarker,
            "caption" => Self::Caption,
            "keyword" => Self::Keyword,
            "audio-channel-source" | "audio-role-source" => Self::AudioChannelSource,
            other => Self::Other(other.to_string()),
        }
    }

    /// FCPXML tag name, used as the clip type in exports
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Library => "library",
            Self::Event => "event",
            Self::Project => "project",
            Self::Media => "media",
            Self::Sequence => "sequence",
            Self::Spine => "spine",
            Self::AssetClip => "asset-clip",
            Self::Clip => "clip",
            Self::Gap => "gap",
            Self::Title => "title",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Audition => "audition",
            Self::SyncClip => "sync-clip",
            Self::MulticamClip => "mc-clip",
            Self::CompoundClipRef => "ref-clip",
            Self::Marker => "marker",
            Self::ChapterMarker => "chapter-marker",
            Self::Caption => "caption",
            Self::Keyword => "keyword",
            Self::AudioChannelSource => "audio-channel-source",
            Self::Other(tag) => tag,
        }
    }

    /// Timeline items that occupy a time range and can carry annotations
    #[must_use]
    pub const fn is_clip(&self) -> bool {
        matches!(
            self,
            Self::AssetClip
                | Self::Clip
                | Self::Gap
                | Self::Title
                | Self::Video
                | Self::Audio
                | Self::Audition
                | Self::SyncClip
                | Self::MulticamClip
                | Self::CompoundClipRef
        )
    }

    /// Markers of any flavour (not captions)
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, Self::Marker | Self::ChapterMarker)
    }

    /// Nodes that can become exported markers
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        matches!(self, Self::Marker | Self::ChapterMarker | Self::Caption)
    }

    /// Clips whose nested content belongs to a definition rather than the
    /// consuming timeline
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::SyncClip | Self::MulticamClip | Self::CompoundClipRef
        )
    }

    #[must_use]
    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role strings authored directly on a node
///
/// `None` means the attribute was absent; an empty attribute is decoded as
/// `None` too, so the two are never confused downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleAttributes {
    pub video: Option<String>,
    pub audio: Option<String>,
    pub caption: Option<String>,
}

impl RoleAttributes {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none() && self.caption.is_none()
    }
}

/// A node in the decoded timeline tree
///
/// Times are exact rational seconds in the parent's local coordinate space.
/// For markers and keywords `offset` holds the `start` attribute, which is
/// where FCPXML places them on their clip's own timeline.
///
/// # Examples
///
/// ```rust
/// use markers_core::model::{NodeKind, TimelineNode};
/// use markers_core::timecode::Rational;
///
/// let clip = TimelineNode {
///     offset: Rational::from_integer(10),
///     duration: Some(Rational::from_integer(5)),
///     ..TimelineNode::new(NodeKind::AssetClip)
/// };
/// assert!(clip.enabled);
/// assert_eq!(clip.lane, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineNode {
    pub kind: NodeKind,

    /// Position on the parent's timeline
    pub offset: Rational,

    /// Internal zero point trimmed off the front of the node
    pub start: Rational,

    pub duration: Option<Rational>,

    /// Connected lane index, 0 on the primary storyline
    pub lane: i32,

    pub time_map: Option<TimeMap>,

    /// Source rate declared by a `<conform-rate>` child
    pub conform_rate: Option<FrameRate>,

    /// Rate declared through this node's format; inherited when absent
    pub frame_rate: Option<FrameRate>,

    pub enabled: bool,

    pub roles: RoleAttributes,

    pub name: Option<String>,

    /// `ref` attribute: asset, media or effect id
    pub reference: Option<String>,

    /// Marker `value`, keyword list, or caption fallback label
    pub value: Option<String>,

    pub note: Option<String>,

    /// To-do state of a marker; `None` for standard markers
    pub completed: Option<bool>,

    /// Caption or title text body
    pub text: Option<String>,

    /// Sequence timecode origin
    pub tc_start: Option<Rational>,

    /// Sequence `tcFormat="DF"`
    pub drop_frame: Option<bool>,

    /// Library bundle URL
    pub location: Option<String>,

    /// Audio source `active` flag
    pub active: bool,

    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TimelineNode {
    /// Create a node with FCPXML attribute defaults
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            offset: Rational::ZERO,
            start: Rational::ZERO,
            duration: None,
            lane: 0,
            time_map: None,
            conform_rate: None,
            frame_rate: None,
            enabled: true,
            roles: RoleAttributes {
                video: None,
                audio: None,
                caption: None,
            },
            name: None,
            reference: None,
            value: None,
            note: None,
            completed: None,
            text: None,
            tc_start: None,
            drop_frame: None,
            location: None,
            active: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// End of the node's visible range on its own timeline
    ///
    /// # Errors
    ///
    /// Returns [`TimecodeError::Overflow`] when `start + duration` is out of
    /// range.
    pub fn local_end(&self) -> Result<Option<Rational>, TimecodeError> {
        self.duration
            .map(|duration| self.start.checked_add(duration))
            .transpose()
    }

    /// Name attribute or empty string
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}
