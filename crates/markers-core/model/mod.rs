//! Timeline tree model
//!
//! The decoded document lives in a flat arena of [`TimelineNode`]s addressed
//! by [`NodeId`]. Parents are stored as indices, so ancestor walks are index
//! chases and the tree needs no reference counting. The arena is immutable
//! once built; every later pass borrows it read-only.
//!
//! # Example
//!
//! ```rust
//! use markers_core::model::{NodeKind, Timeline, TimelineNode};
//!
//! let mut builder = Timeline::builder();
//! let sequence = builder.push(None, TimelineNode::new(NodeKind::Sequence));
//! let clip = builder.push(Some(sequence), TimelineNode::new(NodeKind::AssetClip));
//! let marker = builder.push(Some(clip), TimelineNode::new(NodeKind::Marker));
//! let timeline = builder.build();
//!
//! assert_eq!(timeline.ancestors(marker)?, vec![clip, sequence]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod node;
mod resources;

pub use node::{NodeId, NodeKind, RoleAttributes, TimelineNode};
pub use resources::{Asset, Format, Resources};

use crate::timecode::FrameRate;
use crate::utils::errors::{CoreError, Result};

/// Outcome of a frame rate lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRateResolution {
    pub rate: FrameRate,
    /// Node whose declaration supplied the rate
    pub declared_by: Option<NodeId>,
    /// No declaration was found and [`FrameRate::DEFAULT`] was substituted
    pub fallback: bool,
}

/// Arena-backed timeline tree with its resource table
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    nodes: Vec<TimelineNode>,
    roots: Vec<NodeId>,
    resources: Resources,
}

impl Timeline {
    /// Start building a timeline by hand
    #[must_use]
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    /// Parse an FCPXML document into a timeline
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Parse`] when the XML is malformed, the root is
    /// not `<fcpxml>`, or a time attribute does not parse.
    pub fn parse(source: &str) -> Result<Self> {
        let root = crate::parser::XmlElement::parse(source)?;
        Ok(crate::parser::decode(&root)?)
    }

    /// Node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this timeline.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TimelineNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TimelineNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Top-level nodes in document order
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in arena order, which is document order for parsed input
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Ancestors from the immediate parent up to the enclosing sequence
    ///
    /// The returned chain ends with the nearest [`NodeKind::Sequence`]. A
    /// sequence itself has that sequence's ancestors only if it is nested.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DetachedNode`] if no sequence is reached, which
    /// means the tree is structurally inconsistent.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            chain.push(parent);
            if self.node(parent).kind == NodeKind::Sequence {
                return Ok(chain);
            }
            if chain.len() > self.nodes.len() {
                break;
            }
            current = self.parent(parent);
        }
        Err(CoreError::DetachedNode {
            node: id.0,
            kind: self
                .get(id)
                .map_or_else(|| "unknown".to_string(), |node| node.kind.to_string()),
        })
    }

    /// Closest ancestor (excluding `id`) whose kind satisfies `predicate`
    ///
    /// Unlike [`Timeline::ancestors`] this walks past sequences, so it can
    /// reach the enclosing project, event and library.
    pub fn find_nearest_ancestor<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut current = self.parent(id);
        let mut steps = 0;
        while let Some(parent) = current {
            if predicate(&self.node(parent).kind) {
                return Some(parent);
            }
            steps += 1;
            if steps > self.nodes.len() {
                return None;
            }
            current = self.parent(parent);
        }
        None
    }

    /// Effective frame rate of a node
    ///
    /// Uses the node's own declaration, else the nearest declaring ancestor.
    /// When nothing declares a rate the result is [`FrameRate::DEFAULT`] with
    /// `fallback` set; callers are expected to log the degradation.
    #[must_use]
    pub fn resource_frame_rate(&self, id: NodeId) -> FrameRateResolution {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            if let Some(rate) = node.frame_rate {
                return FrameRateResolution {
                    rate,
                    declared_by: Some(node_id),
                    fallback: false,
                };
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = node.parent;
        }
        FrameRateResolution {
            rate: FrameRate::DEFAULT,
            declared_by: None,
            fallback: true,
        }
    }

    /// Project nodes in document order
    #[must_use]
    pub fn projects(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|id| self.node(*id).kind == NodeKind::Project)
            .collect()
    }

    /// The sequence a project holds
    #[must_use]
    pub fn project_sequence(&self, project: NodeId) -> Option<NodeId> {
        self.children(project)
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == NodeKind::Sequence)
    }
}

/// Incremental construction of a [`Timeline`]
///
/// Used by the decoder and by tests that assemble trees without XML.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    nodes: Vec<TimelineNode>,
    roots: Vec<NodeId>,
    resources: Resources,
}

impl TimelineBuilder {
    /// Append a node under `parent` (or as a root) and return its id
    ///
    /// The node's own `parent` and `children` fields are overwritten.
    pub fn push(&mut self, parent: Option<NodeId>, mut node: TimelineNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.children.clear();
        node.parent = parent.filter(|p| p.0 < self.nodes.len());
        match node.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    /// Mutable access to a node pushed earlier
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TimelineNode> {
        self.nodes.get_mut(id.0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TimelineNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    #[must_use]
    pub fn build(self) -> Timeline {
        Timeline {
            nodes: self.nodes,
            roots: self.roots,
            resources: self.resources,
        }
    }
}
