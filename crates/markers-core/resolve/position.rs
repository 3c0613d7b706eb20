//! Absolute marker positions on the root timeline
//!
//! A marker's `offset` is local to its clip. Each step up the tree maps a
//! position from a node's local timeline into its parent's:
//!
//! 1. subtract the node's `start` trim when it is positive
//! 2. relabel at the node's effective frame rate (wall-clock equivalent)
//! 3. apply the node's time map, else its conform rate scale
//! 4. add the node's own `offset`
//!
//! At the enclosing sequence the sequence's `tcStart` is added.

use log::{debug, warn};

use crate::model::{NodeId, NodeKind, Timeline, TimelineNode};
use crate::timecode::{FrameRate, Timecode, DEFAULT_SUBFRAME_BASE};
use crate::utils::errors::{CoreError, Result};

/// Resolves annotation positions against one timeline
///
/// Borrowing the timeline read-only makes every resolution a pure function
/// of the tree: resolving the same node twice yields the same value.
#[derive(Debug, Clone, Copy)]
pub struct PositionResolver<'a> {
    timeline: &'a Timeline,
    subframe_base: u32,
}

impl<'a> PositionResolver<'a> {
    #[must_use]
    pub const fn new(timeline: &'a Timeline) -> Self {
        Self {
            timeline,
            subframe_base: DEFAULT_SUBFRAME_BASE,
        }
    }

    #[must_use]
    pub const fn with_subframe_base(mut self, subframe_base: u32) -> Self {
        self.subframe_base = subframe_base;
        self
    }

    /// Absolute position of `node` at the enclosing sequence's frame rate
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DetachedNode`] when the node has no path to a
    /// sequence and [`CoreError::Timecode`] when composing the position
    /// leaves the representable time range. Missing frame rates degrade to
    /// [`FrameRate::DEFAULT`] with a warning instead of failing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use markers_core::model::{NodeKind, Timeline, TimelineNode};
    /// use markers_core::resolve::PositionResolver;
    /// use markers_core::timecode::{FrameRate, Rational};
    ///
    /// let mut b = Timeline::builder();
    /// let sequence = b.push(None, TimelineNode {
    ///     frame_rate: Some(FrameRate::Fps25),
    ///     tc_start: Some(Rational::from_integer(3600)),
    ///     ..TimelineNode::new(NodeKind::Sequence)
    /// });
    /// let clip = b.push(Some(sequence), TimelineNode::new(NodeKind::AssetClip));
    /// let marker = b.push(Some(clip), TimelineNode {
    ///     offset: Rational::from_integer(2),
    ///     ..TimelineNode::new(NodeKind::Marker)
    /// });
    /// let timeline = b.build();
    ///
    /// let position = PositionResolver::new(&timeline).resolve(marker)?;
    /// assert_eq!(position.to_string(), "01:00:02:00");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve(&self, node: NodeId) -> Result<Timecode> {
        let chain = self.timeline.ancestors(node)?;
        let mut position = Timecode::new(
            self.timeline.node(node).offset,
            self.effective_rate(node),
            self.subframe_base,
        );

        for parent_id in chain {
            let parent = self.timeline.node(parent_id);
            let parent_rate = self.effective_rate(parent_id);

            if parent.kind == NodeKind::Sequence {
                let tc_start = Timecode::new(
                    parent.tc_start.unwrap_or_default(),
                    parent_rate,
                    self.subframe_base,
                );
                return Ok(position.converted(parent_rate).checked_add(&tc_start)?);
            }
            position = self.into_parent_space(position, parent, parent_rate)?;
        }

        // ancestors() always ends at a sequence
        Err(CoreError::internal(format!(
            "ancestor chain of node {node} did not end at a sequence"
        )))
    }

    /// Whether a later trim has hidden the annotation
    ///
    /// The check happens on the owning clip's own timeline: a position at or
    /// before the clip's in point, or at or after its out point, is hidden.
    /// Annotations not owned by a clip are never hidden.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Timecode`] when the clip's out point is out of
    /// range.
    pub fn is_hidden_by_trim(&self, node: NodeId) -> Result<bool> {
        let Some(clip_id) = self.timeline.parent(node) else {
            return Ok(false);
        };
        let clip = self.timeline.node(clip_id);
        if !clip.kind.is_clip() {
            return Ok(false);
        }

        let local = self.timeline.node(node).offset;
        let end = clip.local_end()?;
        let hidden = local <= clip.start || end.is_some_and(|end| local >= end);
        if hidden {
            debug!(
                "{} {node} at {local} is outside {} {clip_id} [{}, {})",
                self.timeline.node(node).kind,
                clip.kind,
                clip.start,
                end.map_or_else(|| "open".to_string(), |end| end.to_string())
            );
        }
        Ok(hidden)
    }

    fn effective_rate(&self, node: NodeId) -> FrameRate {
        let resolution = self.timeline.resource_frame_rate(node);
        if resolution.fallback {
            warn!(
                "No frame rate declared for {} {node}; assuming {} fps",
                self.timeline.node(node).kind,
                resolution.rate
            );
        }
        resolution.rate
    }

    fn into_parent_space(
        &self,
        position: Timecode,
        segment: &TimelineNode,
        segment_rate: FrameRate,
    ) -> Result<Timecode> {
        let shifted = if segment.start.is_positive() {
            position.checked_sub(&Timecode::new(
                segment.start,
                position.rate(),
                self.subframe_base,
            ))?
        } else {
            position
        };

        let shifted = if shifted.rate() == segment_rate {
            shifted
        } else {
            shifted.converted(segment_rate)
        };

        let local = match (&segment.time_map, segment.conform_rate) {
            (Some(map), _) if !map.is_empty() => map.map(shifted.seconds())?,
            (_, Some(conform)) if conform != segment_rate => shifted
                .seconds()
                .checked_mul(segment_rate.as_rational())?
                .checked_div(conform.as_rational())?,
            _ => shifted.seconds(),
        };

        let local = Timecode::new(local, segment_rate, self.subframe_base);
        let offset = Timecode::new(segment.offset, segment_rate, self.subframe_base);
        Ok(local.checked_add(&offset)?)
    }
}
