//! Role resolution
//!
//! A clip's role on each channel comes from the first [`RoleStrategy`] in a
//! fixed fallback chain that yields anything. Keeping the chain as data makes
//! the precedence auditable and lets each strategy be tested alone.
//!
//! Raw role strings are normalised for display: the caption format query is
//! dropped, FCP's auto-generated `Role.Role-N` subroles collapse to `Role`, and
//! lowercase built-in role names are capitalised.

use crate::extract::marker::{MarkerRoles, Role};
use crate::model::{NodeId, NodeKind, RoleAttributes, Timeline};
use crate::utils::hashers::create_hash_set;

/// Built-in role names FCP writes in lowercase
const BUILTIN_ROLES: &[&str] = &["video", "titles", "dialogue", "music", "effects", "captions"];

/// Role channel of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleChannel {
    Video,
    Audio,
    Caption,
}

impl RoleChannel {
    fn attribute(self, roles: &RoleAttributes) -> Option<&str> {
        match self {
            Self::Video => roles.video.as_deref(),
            Self::Audio => roles.audio.as_deref(),
            Self::Caption => roles.caption.as_deref(),
        }
    }
}

/// One source of role information, tried in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleStrategy {
    /// `role` / `audioRole` on the clip, or on the video and audio
    /// components of a `<clip>`
    ExplicitAttribute,
    /// Active `audio-channel-source` / `audio-role-source` children
    AudioChannelSources,
    /// Closest ancestor below the sequence with an explicit role
    NearestAncestor,
    /// FCP's implicit role for the clip type
    ClipTypeDefault,
}

impl RoleStrategy {
    /// Fallback chain for a channel
    #[must_use]
    pub const fn chain(channel: RoleChannel) -> &'static [Self] {
        match channel {
            RoleChannel::Video => &[
                Self::ExplicitAttribute,
                Self::NearestAncestor,
                Self::ClipTypeDefault,
            ],
            RoleChannel::Audio => &[
                Self::ExplicitAttribute,
                Self::AudioChannelSources,
                Self::NearestAncestor,
                Self::ClipTypeDefault,
            ],
            RoleChannel::Caption => &[Self::ExplicitAttribute, Self::ClipTypeDefault],
        }
    }

    /// Roles this strategy finds for `clip`; empty when it has no answer
    #[must_use]
    pub fn apply(self, timeline: &Timeline, clip: NodeId, channel: RoleChannel) -> Vec<Role> {
        match self {
            Self::ExplicitAttribute => explicit_roles(timeline, clip, channel),
            Self::AudioChannelSources => {
                if channel == RoleChannel::Audio {
                    channel_source_roles(timeline, clip)
                } else {
                    Vec::new()
                }
            }
            Self::NearestAncestor => ancestor_role(timeline, clip, channel)
                .into_iter()
                .collect(),
            Self::ClipTypeDefault => default_role(&timeline.node(clip).kind, channel)
                .map(Role::default_for)
                .into_iter()
                .collect(),
        }
    }
}

/// Implicit role of a clip type on a channel
///
/// # Examples
///
/// ```rust
/// use markers_core::extract::metadata::{default_role, RoleChannel};
/// use markers_core::model::NodeKind;
///
/// assert_eq!(default_role(&NodeKind::Title, RoleChannel::Video), Some("Titles"));
/// assert_eq!(default_role(&NodeKind::AssetClip, RoleChannel::Audio), Some("Dialogue"));
/// assert_eq!(default_role(&NodeKind::Gap, RoleChannel::Video), None);
/// ```
#[must_use]
pub const fn default_role(kind: &NodeKind, channel: RoleChannel) -> Option<&'static str> {
    match (kind, channel) {
        (
            NodeKind::AssetClip
            | NodeKind::Clip
            | NodeKind::Video
            | NodeKind::SyncClip
            | NodeKind::MulticamClip
            | NodeKind::CompoundClipRef,
            RoleChannel::Video,
        ) => Some("Video"),
        (
            NodeKind::AssetClip
            | NodeKind::Clip
            | NodeKind::Audio
            | NodeKind::SyncClip
            | NodeKind::MulticamClip
            | NodeKind::CompoundClipRef,
            RoleChannel::Audio,
        ) => Some("Dialogue"),
        (NodeKind::Title, RoleChannel::Video) => Some("Titles"),
        (NodeKind::Caption, RoleChannel::Caption) => Some("Captions"),
        _ => None,
    }
}

/// Collapse FCP's redundant `Role.Role-<digits>` subrole to `Role`
///
/// # Examples
///
/// ```rust
/// use markers_core::extract::metadata::collapse_subrole;
///
/// assert_eq!(collapse_subrole("Dialogue.Dialogue-1"), "Dialogue");
/// assert_eq!(collapse_subrole("Dialogue.Dialogue-Custom"), "Dialogue.Dialogue-Custom");
/// assert_eq!(collapse_subrole("Dialogue.Boom"), "Dialogue.Boom");
/// ```
#[must_use]
pub fn collapse_subrole(role: &str) -> String {
    let collapsed = role.split_once('.').and_then(|(main, sub)| {
        let (base, digits) = sub.rsplit_once('-')?;
        let numeric = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        (numeric && base == main).then_some(main)
    });
    collapsed.unwrap_or(role).to_string()
}

/// Normalise a raw role attribute for display
///
/// # Examples
///
/// ```rust
/// use markers_core::extract::metadata::{normalize_role, RoleChannel};
///
/// assert_eq!(normalize_role("dialogue.dialogue-2", RoleChannel::Audio), "Dialogue");
/// assert_eq!(normalize_role("iTT?captionFormat=ITT.en", RoleChannel::Caption), "iTT");
/// assert_eq!(normalize_role("B-Roll", RoleChannel::Video), "B-Roll");
/// ```
#[must_use]
pub fn normalize_role(raw: &str, channel: RoleChannel) -> String {
    let role = raw.trim();
    let role = if channel == RoleChannel::Caption {
        role.split_once('?').map_or(role, |(name, _)| name)
    } else {
        role
    };
    capitalize_builtin(&collapse_subrole(role))
}

fn capitalize_builtin(role: &str) -> String {
    let (main, rest) = match role.split_once('.') {
        Some((main, sub)) => (main, Some(sub)),
        None => (role, None),
    };
    if !BUILTIN_ROLES.contains(&main) {
        return role.to_string();
    }
    let mut out = String::with_capacity(role.len());
    let mut chars = main.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    if let Some(sub) = rest {
        out.push('.');
        out.push_str(sub);
    }
    out
}

/// Whether a resolved role matches an exclusion entry
///
/// Matching is a case-insensitive substring test against the full role, so
/// `Dialogue` matches `Dialogue.Boom` and `boom` matches it too. A blank
/// entry matches nothing.
#[must_use]
pub fn role_matches(role: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }
    role.to_lowercase().contains(&pattern.to_lowercase())
}

/// Resolve every role channel that applies to `owner`
///
/// Captions carry only a caption role. An audition contributes the roles of
/// its active pick.
#[must_use]
pub fn resolve_roles(timeline: &Timeline, owner: NodeId) -> MarkerRoles {
    let owner = active_pick(timeline, owner);
    if timeline.node(owner).kind == NodeKind::Caption {
        return MarkerRoles {
            caption: resolve_channel(timeline, owner, RoleChannel::Caption)
                .into_iter()
                .next(),
            ..MarkerRoles::default()
        };
    }
    MarkerRoles {
        video: resolve_channel(timeline, owner, RoleChannel::Video)
            .into_iter()
            .next(),
        audio: resolve_channel(timeline, owner, RoleChannel::Audio),
        caption: None,
    }
}

/// Walk the strategy chain for one channel
#[must_use]
pub fn resolve_channel(timeline: &Timeline, clip: NodeId, channel: RoleChannel) -> Vec<Role> {
    if !channel_applies(timeline, clip, channel) {
        return Vec::new();
    }
    RoleStrategy::chain(channel)
        .iter()
        .map(|strategy| strategy.apply(timeline, clip, channel))
        .find(|roles| !roles.is_empty())
        .unwrap_or_default()
}

/// A channel applies when it is authored, or when the clip type has a
/// default for it and the referenced asset does not rule it out.
fn channel_applies(timeline: &Timeline, clip: NodeId, channel: RoleChannel) -> bool {
    if !explicit_roles(timeline, clip, channel).is_empty() {
        return true;
    }
    let node = timeline.node(clip);
    if default_role(&node.kind, channel).is_none() {
        return false;
    }
    let asset = node
        .reference
        .as_deref()
        .and_then(|id| timeline.resources().asset(id));
    match (asset, channel) {
        (Some(asset), RoleChannel::Video) => asset.has_video,
        (Some(asset), RoleChannel::Audio) => asset.has_audio,
        _ => true,
    }
}

/// The clip an audition currently plays, or `node` itself
pub(super) fn active_pick(timeline: &Timeline, node: NodeId) -> NodeId {
    if timeline.node(node).kind != NodeKind::Audition {
        return node;
    }
    timeline
        .children(node)
        .iter()
        .copied()
        .find(|child| timeline.node(*child).kind.is_clip())
        .unwrap_or(node)
}

fn explicit_roles(timeline: &Timeline, clip: NodeId, channel: RoleChannel) -> Vec<Role> {
    let node = timeline.node(clip);
    let own = channel
        .attribute(&node.roles)
        .map(|raw| normalize_role(raw, channel))
        .filter(|name| !name.is_empty());
    if let Some(name) = own {
        return vec![Role::explicit(name)];
    }
    if node.kind != NodeKind::Clip {
        return Vec::new();
    }
    let component = match channel {
        RoleChannel::Video => NodeKind::Video,
        RoleChannel::Audio => NodeKind::Audio,
        RoleChannel::Caption => return Vec::new(),
    };
    let names = timeline
        .children(clip)
        .iter()
        .map(|child| timeline.node(*child))
        .filter(|child| child.kind == component)
        .filter_map(|child| channel.attribute(&child.roles))
        .map(|raw| normalize_role(raw, channel))
        .filter(|name| !name.is_empty());
    let mut roles = dedup(names).map(Role::explicit).collect::<Vec<_>>();
    if channel == RoleChannel::Video {
        roles.truncate(1);
    }
    roles
}

fn channel_source_roles(timeline: &Timeline, clip: NodeId) -> Vec<Role> {
    let mut sources = Vec::new();
    for child in timeline.children(clip) {
        let node = timeline.node(*child);
        match &node.kind {
            NodeKind::AudioChannelSource => sources.push(node),
            NodeKind::Other(tag) if tag == "sync-source" => sources.extend(
                timeline
                    .children(*child)
                    .iter()
                    .map(|grandchild| timeline.node(*grandchild))
                    .filter(|grandchild| grandchild.kind == NodeKind::AudioChannelSource),
            ),
            _ => {}
        }
    }

    let names = sources
        .into_iter()
        .filter(|source| source.active)
        .filter_map(|source| source.roles.audio.as_deref())
        .map(|raw| normalize_role(raw, RoleChannel::Audio))
        .filter(|name| !name.is_empty());
    dedup(names).map(Role::explicit).collect()
}

fn ancestor_role(timeline: &Timeline, clip: NodeId, channel: RoleChannel) -> Option<Role> {
    let mut current = timeline.parent(clip);
    while let Some(id) = current {
        let node = timeline.node(id);
        if node.kind == NodeKind::Sequence {
            return None;
        }
        let name = channel
            .attribute(&node.roles)
            .map(|raw| normalize_role(raw, channel))
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            return Some(Role::explicit(name));
        }
        current = node.parent;
    }
    None
}

/// Drop repeated names, keeping first occurrence order
fn dedup(names: impl Iterator<Item = String>) -> impl Iterator<Item = String> {
    let mut seen = create_hash_set();
    names.filter(move |name| seen.insert(name.clone()))
}
