//! Resolved marker records handed to export writers

use core::fmt;

use crate::model::{NodeKind, TimelineNode};
use crate::timecode::Timecode;

/// Kind of exported annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum MarkerKind {
    Standard,
    ToDo { completed: bool },
    Chapter,
    Caption,
}

impl MarkerKind {
    /// Kind of an annotation node, `None` for anything else
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markers_core::extract::MarkerKind;
    /// use markers_core::model::{NodeKind, TimelineNode};
    ///
    /// let todo = TimelineNode {
    ///     completed: Some(true),
    ///     ..TimelineNode::new(NodeKind::Marker)
    /// };
    /// assert_eq!(MarkerKind::from_node(&todo), Some(MarkerKind::ToDo { completed: true }));
    /// assert_eq!(MarkerKind::from_node(&TimelineNode::new(NodeKind::Gap)), None);
    /// ```
    #[must_use]
    pub fn from_node(node: &TimelineNode) -> Option<Self> {
        match node.kind {
            NodeKind::Marker => Some(node.completed.map_or(Self::Standard, |completed| {
                Self::ToDo { completed }
            })),
            NodeKind::ChapterMarker => Some(Self::Chapter),
            NodeKind::Caption => Some(Self::Caption),
            _ => None,
        }
    }

    /// Display label used in tabular exports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::ToDo { completed: false } => "To Do",
            Self::ToDo { completed: true } => "Completed",
            Self::Chapter => "Chapter",
            Self::Caption => "Caption",
        }
    }

    #[must_use]
    pub const fn is_caption(self) -> bool {
        matches!(self, Self::Caption)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved role name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Role {
    pub name: String,
    /// FCP's implicit role for the clip type rather than an authored one
    pub is_default: bool,
}

impl Role {
    #[must_use]
    pub fn explicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
        }
    }

    #[must_use]
    pub fn default_for(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: true,
        }
    }
}

/// Roles of the clip (or caption) that owns a marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarkerRoles {
    pub video: Option<Role>,
    /// Sync and multichannel clips expose several audio roles
    pub audio: Vec<Role>,
    pub caption: Option<Role>,
}

impl MarkerRoles {
    /// All role names, video first, then audio, then caption
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.video
            .iter()
            .chain(self.audio.iter())
            .chain(self.caption.iter())
            .map(|role| role.name.as_str())
    }

    /// Whether any role matches one of the excluded role names
    #[must_use]
    pub fn matches_any(&self, excluded: &[String]) -> bool {
        self.names().any(|name| {
            excluded
                .iter()
                .any(|pattern| super::metadata::role_matches(name, pattern))
        })
    }
}

/// Where a marker sits: its clip and the enclosing containers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParentInfo {
    /// FCPXML tag of the owning clip (`asset-clip`, `ref-clip`, ...)
    pub clip_type: String,
    pub clip_name: String,
    /// In point on the clip's own timeline
    pub clip_in: Timecode,
    /// Out point on the clip's own timeline, unknown without a duration
    pub clip_out: Option<Timecode>,
    pub keywords: Vec<String>,
    pub library_name: Option<String>,
    pub event_name: Option<String>,
    pub project_name: Option<String>,
    pub timeline_name: String,
    pub timeline_start: Timecode,
}

/// How the base identifier of a marker is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum IdMode {
    /// `{project}_{timecode}`
    #[default]
    ProjectTimecode,
    Name,
    Notes,
}

impl IdMode {
    /// Parse a mode name as used on the command line
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markers_core::extract::IdMode;
    ///
    /// assert_eq!(IdMode::parse_mode("project-timecode"), Some(IdMode::ProjectTimecode));
    /// assert_eq!(IdMode::parse_mode("Notes"), Some(IdMode::Notes));
    /// assert_eq!(IdMode::parse_mode("uuid"), None);
    /// ```
    #[must_use]
    pub fn parse_mode(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project-timecode" | "timecode" => Some(Self::ProjectTimecode),
            "name" => Some(Self::Name),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectTimecode => "project-timecode",
            Self::Name => "name",
            Self::Notes => "notes",
        }
    }
}

impl fmt::Display for IdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exported marker
///
/// Built once per annotation; after the uniquing pass assigns `id_suffix`
/// the record is never changed again.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedMarker {
    pub kind: MarkerKind,
    pub name: String,
    /// Empty when the marker has no note
    pub notes: String,
    /// Absolute position at the root timeline's rate
    pub position: Timecode,
    /// `position` rendered in the run's timecode style
    pub timecode: String,
    pub roles: MarkerRoles,
    pub parent: ParentInfo,
    pub(crate) id_suffix: Option<String>,
}

impl ResolvedMarker {
    /// Disambiguation suffix (`"-2"`), set only for colliding IDs
    #[must_use]
    pub fn id_suffix(&self) -> Option<&str> {
        self.id_suffix.as_deref()
    }

    /// Base identifier before uniquing
    #[must_use]
    pub fn id(&self, mode: IdMode) -> String {
        match mode {
            IdMode::ProjectTimecode => {
                let project = self
                    .parent
                    .project_name
                    .as_deref()
                    .unwrap_or(&self.parent.timeline_name);
                format!("{project}_{}", self.timecode)
            }
            IdMode::Name => self.name.clone(),
            IdMode::Notes => self.notes.clone(),
        }
    }

    /// Final identifier: base ID plus any suffix
    #[must_use]
    pub fn unique_id(&self, mode: IdMode) -> String {
        let mut id = self.id(mode);
        if let Some(suffix) = &self.id_suffix {
            id.push_str(suffix);
        }
        id
    }

    /// Short description for log and error messages
    #[must_use]
    pub fn describe(&self) -> String {
        if self.name.is_empty() {
            format!("unnamed {} at {}", self.kind, self.timecode)
        } else {
            format!("{} '{}' at {}", self.kind, self.name, self.timecode)
        }
    }
}
