//! Marker collection
//!
//! Walks one sequence depth-first in document order and returns the
//! annotation nodes that should be exported. Content belonging to a compound,
//! multicam or sync definition is never visited: those clips contribute only
//! the annotations placed on the instance itself.

use core::fmt;

use log::debug;

use super::metadata::resolve_roles;
use crate::model::{NodeId, NodeKind, Timeline};

/// Which annotation kinds are exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum MarkerSource {
    /// Markers, to-dos and chapter markers
    #[default]
    Markers,
    MarkersAndCaptions,
    Captions,
}

impl MarkerSource {
    #[must_use]
    pub const fn includes_markers(self) -> bool {
        matches!(self, Self::Markers | Self::MarkersAndCaptions)
    }

    #[must_use]
    pub const fn includes_captions(self) -> bool {
        matches!(self, Self::Captions | Self::MarkersAndCaptions)
    }

    /// Parse a source name as used on the command line
    ///
    /// # Examples
    ///
    /// ```rust
    /// use markers_core::extract::MarkerSource;
    ///
    /// assert_eq!(MarkerSource::parse("captions"), Some(MarkerSource::Captions));
    /// assert_eq!(MarkerSource::parse("markers-and-captions"), Some(MarkerSource::MarkersAndCaptions));
    /// assert_eq!(MarkerSource::parse("keywords"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markers" => Some(Self::Markers),
            "markers-and-captions" | "all" => Some(Self::MarkersAndCaptions),
            "captions" => Some(Self::Captions),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markers => "markers",
            Self::MarkersAndCaptions => "markers-and-captions",
            Self::Captions => "captions",
        }
    }

    fn accepts(self, kind: &NodeKind) -> bool {
        match kind {
            NodeKind::Caption => self.includes_captions(),
            kind if kind.is_marker() => self.includes_markers(),
            _ => false,
        }
    }
}

impl fmt::Display for MarkerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters applied while walking the timeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOptions {
    pub source: MarkerSource,
    /// Clips and captions whose resolved role matches are skipped with their
    /// whole subtree
    pub excluded_roles: Vec<String>,
    /// Visit clips with `enabled="0"`
    pub include_disabled: bool,
    /// Export captions with `enabled="0"`
    pub include_disabled_captions: bool,
}

/// Collect exportable annotations under `root` in document order
///
/// `root` is normally a project's sequence. Positions are not resolved
/// here; hidden-by-trim filtering happens after resolution.
///
/// # Example
///
/// ```rust
/// use markers_core::extract::{collect_markers, CollectOptions};
/// use markers_core::model::{NodeKind, Timeline, TimelineNode};
///
/// let mut b = Timeline::builder();
/// let sequence = b.push(None, TimelineNode::new(NodeKind::Sequence));
/// let spine = b.push(Some(sequence), TimelineNode::new(NodeKind::Spine));
/// let clip = b.push(Some(spine), TimelineNode::new(NodeKind::AssetClip));
/// let marker = b.push(Some(clip), TimelineNode::new(NodeKind::Marker));
/// let timeline = b.build();
///
/// assert_eq!(collect_markers(&timeline, sequence, &CollectOptions::default()), vec![marker]);
/// ```
#[must_use]
pub fn collect_markers(timeline: &Timeline, root: NodeId, options: &CollectOptions) -> Vec<NodeId> {
    let mut collector = Collector {
        timeline,
        options,
        found: Vec::new(),
    };
    collector.visit_children(root);
    collector.found
}

struct Collector<'a> {
    timeline: &'a Timeline,
    options: &'a CollectOptions,
    found: Vec<NodeId>,
}

impl Collector<'_> {
    fn visit_children(&mut self, parent: NodeId) {
        let timeline = self.timeline;
        for &child in timeline.children(parent) {
            self.visit(child);
        }
    }

    fn visit(&mut self, id: NodeId) {
        let timeline = self.timeline;
        let kind = &timeline.node(id).kind;
        if kind.is_annotation() {
            self.annotation(id);
        } else if *kind == NodeKind::Spine {
            self.visit_children(id);
        } else if kind.is_clip() && self.enters_clip(id) {
            self.clip(id);
        }
    }

    fn annotation(&mut self, id: NodeId) {
        let timeline = self.timeline;
        let node = timeline.node(id);
        if !self.options.source.accepts(&node.kind) {
            return;
        }
        if node.kind == NodeKind::Caption {
            if !node.enabled && !self.options.include_disabled_captions {
                debug!("Skipping disabled caption {id}");
                return;
            }
            if self.is_excluded(id) {
                debug!("Skipping caption {id} with an excluded role");
                return;
            }
        }
        self.found.push(id);
    }

    fn enters_clip(&self, id: NodeId) -> bool {
        let node = self.timeline.node(id);
        if !node.enabled && !self.options.include_disabled {
            debug!("Skipping disabled {} {id}", node.kind);
            return false;
        }
        if self.is_excluded(id) {
            debug!("Skipping {} {id} with an excluded role", node.kind);
            return false;
        }
        true
    }

    fn clip(&mut self, id: NodeId) {
        let timeline = self.timeline;
        match &timeline.node(id).kind {
            NodeKind::SyncClip => self.direct_annotations(id),
            kind if kind.is_opaque() => {
                for &child in timeline.children(id) {
                    let node = timeline.node(child);
                    if node.kind.is_annotation() || (node.kind.is_clip() && node.lane != 0) {
                        self.visit(child);
                    }
                }
            }
            NodeKind::Audition => {
                let pick = timeline
                    .children(id)
                    .iter()
                    .copied()
                    .find(|child| timeline.node(*child).kind.is_clip());
                for &child in timeline.children(id) {
                    if timeline.node(child).kind.is_annotation() {
                        self.annotation(child);
                    } else if Some(child) == pick {
                        self.visit(child);
                    }
                }
            }
            _ => self.visit_children(id),
        }
    }

    fn direct_annotations(&mut self, id: NodeId) {
        let timeline = self.timeline;
        for &child in timeline.children(id) {
            if timeline.node(child).kind.is_annotation() {
                self.annotation(child);
            }
        }
    }

    fn is_excluded(&self, id: NodeId) -> bool {
        !self.options.excluded_roles.is_empty()
            && resolve_roles(self.timeline, id).matches_any(&self.options.excluded_roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoleAttributes, TimelineNode};
    use pretty_assertions::assert_eq;

    fn node(kind: NodeKind) -> TimelineNode {
        TimelineNode::new(kind)
    }

    fn connected(kind: NodeKind, lane: i32) -> TimelineNode {
        TimelineNode {
            lane,
            ..TimelineNode::new(kind)
        }
    }

    fn disabled(kind: NodeKind) -> TimelineNode {
        TimelineNode {
            enabled: false,
            ..TimelineNode::new(kind)
        }
    }

    #[test]
    fn document_order_through_spines_and_gaps() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let spine = b.push(Some(seq), node(NodeKind::Spine));
        let gap = b.push(Some(spine), node(NodeKind::Gap));
        let m1 = b.push(Some(gap), node(NodeKind::Marker));
        let title = b.push(Some(gap), connected(NodeKind::Title, 1));
        let m2 = b.push(Some(title), node(NodeKind::ChapterMarker));
        let clip = b.push(Some(spine), node(NodeKind::AssetClip));
        let inner = b.push(Some(clip), connected(NodeKind::Spine, 2));
        let nested = b.push(Some(inner), node(NodeKind::Clip));
        let m3 = b.push(Some(nested), node(NodeKind::Marker));
        let m4 = b.push(Some(clip), node(NodeKind::Marker));
        b.push(Some(clip), node(NodeKind::Keyword));
        let timeline = b.build();

        assert_eq!(
            collect_markers(&timeline, seq, &CollectOptions::default()),
            vec![m1, m2, m3, m4]
        );
    }

    #[test]
    fn definition_content_is_never_visited() {
        let mut b = Timeline::builder();
        // <media> definitions hang off the resources, outside the sequence
        let media = b.push(None, node(NodeKind::Media));
        let media_seq = b.push(Some(media), node(NodeKind::Sequence));
        let media_clip = b.push(Some(media_seq), node(NodeKind::AssetClip));
        b.push(Some(media_clip), node(NodeKind::Marker));

        let seq = b.push(None, node(NodeKind::Sequence));
        let spine = b.push(Some(seq), node(NodeKind::Spine));
        let first = b.push(Some(spine), node(NodeKind::CompoundClipRef));
        let on_first = b.push(Some(first), node(NodeKind::Marker));
        let second = b.push(Some(spine), node(NodeKind::CompoundClipRef));
        let on_second = b.push(Some(second), node(NodeKind::Marker));
        let attached = b.push(Some(second), connected(NodeKind::Title, 1));
        let on_attached = b.push(Some(attached), node(NodeKind::Marker));
        let sync = b.push(Some(spine), node(NodeKind::SyncClip));
        let on_sync = b.push(Some(sync), node(NodeKind::Marker));
        let sync_spine = b.push(Some(sync), node(NodeKind::Spine));
        let synced = b.push(Some(sync_spine), node(NodeKind::AssetClip));
        b.push(Some(synced), node(NodeKind::Marker));
        let timeline = b.build();

        assert_eq!(
            collect_markers(&timeline, seq, &CollectOptions::default()),
            vec![on_first, on_second, on_attached, on_sync]
        );
    }

    #[test]
    fn multicam_angles_stay_inside_the_definition() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let multicam = b.push(Some(seq), node(NodeKind::MulticamClip));
        let on_multicam = b.push(Some(multicam), node(NodeKind::Marker));
        let angle = b.push(Some(multicam), node(NodeKind::AssetClip));
        b.push(Some(angle), node(NodeKind::Marker));
        let connected_title = b.push(Some(multicam), connected(NodeKind::Title, 2));
        let on_title = b.push(Some(connected_title), node(NodeKind::Marker));
        let timeline = b.build();

        assert!(timeline.node(multicam).kind.is_opaque());
        assert_eq!(
            collect_markers(&timeline, seq, &CollectOptions::default()),
            vec![on_multicam, on_title]
        );
    }

    #[test]
    fn audition_contributes_only_active_pick() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let audition = b.push(Some(seq), node(NodeKind::Audition));
        let pick = b.push(Some(audition), node(NodeKind::AssetClip));
        let on_pick = b.push(Some(pick), node(NodeKind::Marker));
        let alternate = b.push(Some(audition), node(NodeKind::AssetClip));
        b.push(Some(alternate), node(NodeKind::Marker));
        let on_audition = b.push(Some(audition), node(NodeKind::Marker));
        let timeline = b.build();

        assert_eq!(
            collect_markers(&timeline, seq, &CollectOptions::default()),
            vec![on_pick, on_audition]
        );
    }

    #[test]
    fn source_selects_markers_or_captions() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let clip = b.push(Some(seq), node(NodeKind::AssetClip));
        let marker = b.push(Some(clip), node(NodeKind::Marker));
        let caption = b.push(Some(clip), connected(NodeKind::Caption, 1));
        let timeline = b.build();

        let collect = |source| {
            collect_markers(
                &timeline,
                seq,
                &CollectOptions {
                    source,
                    ..CollectOptions::default()
                },
            )
        };
        assert_eq!(collect(MarkerSource::Markers), vec![marker]);
        assert_eq!(collect(MarkerSource::Captions), vec![caption]);
        assert_eq!(collect(MarkerSource::MarkersAndCaptions), vec![marker, caption]);
    }

    #[test]
    fn disabled_flags_are_independent() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let off_clip = b.push(Some(seq), disabled(NodeKind::AssetClip));
        let in_off_clip = b.push(Some(off_clip), node(NodeKind::Marker));
        let clip = b.push(Some(seq), node(NodeKind::AssetClip));
        let off_caption = b.push(Some(clip), disabled(NodeKind::Caption));
        let timeline = b.build();

        let options = |include_disabled, include_disabled_captions| CollectOptions {
            source: MarkerSource::MarkersAndCaptions,
            include_disabled,
            include_disabled_captions,
            ..CollectOptions::default()
        };
        assert!(collect_markers(&timeline, seq, &options(false, false)).is_empty());
        assert_eq!(collect_markers(&timeline, seq, &options(true, false)), vec![in_off_clip]);
        assert_eq!(collect_markers(&timeline, seq, &options(false, true)), vec![off_caption]);
    }

    #[test]
    fn excluded_roles_skip_subtrees_and_captions() {
        let mut b = Timeline::builder();
        let seq = b.push(None, node(NodeKind::Sequence));
        let music = b.push(
            Some(seq),
            TimelineNode {
                roles: RoleAttributes {
                    audio: Some("music.music-1".into()),
                    ..RoleAttributes::default()
                },
                ..node(NodeKind::Audio)
            },
        );
        b.push(Some(music), node(NodeKind::Marker));
        let broll = b.push(
            Some(seq),
            TimelineNode {
                roles: RoleAttributes {
                    video: Some("B-Roll".into()),
                    ..RoleAttributes::default()
                },
                ..node(NodeKind::AssetClip)
            },
        );
        let kept = b.push(Some(broll), node(NodeKind::Marker));
        b.push(Some(broll), connected(NodeKind::Caption, 1));
        let timeline = b.build();

        let options = CollectOptions {
            source: MarkerSource::MarkersAndCaptions,
            excluded_roles: vec!["Music".into(), "captions".into()],
            ..CollectOptions::default()
        };
        assert_eq!(collect_markers(&timeline, seq, &options), vec![kept]);
    }
}
