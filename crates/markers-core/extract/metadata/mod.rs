//! Parent clip and container metadata for resolved markers
//!
//! Everything here reads the immutable timeline; the only fallible step is
//! locating the enclosing sequence, which fails for detached nodes.

mod roles;

use roles::active_pick;

pub use roles::{
    collapse_subrole, default_role, normalize_role, resolve_channel, resolve_roles,
    role_matches, RoleChannel, RoleStrategy,
};

use crate::extract::marker::{MarkerRoles, ParentInfo};
use crate::model::{Asset, NodeId, NodeKind, Timeline};
use crate::timecode::{Timecode, DEFAULT_SUBFRAME_BASE};
use crate::utils::errors::{CoreError, Result};
use crate::utils::hashers::create_hash_set;

/// Resolve the parent clip description and roles of an annotation
///
/// Captions carry their own role; markers take the roles of the clip they
/// sit on, or of the active pick when that clip is an audition.
///
/// # Errors
///
/// Returns [`CoreError::DetachedNode`] when the annotation is not inside a
/// sequence and [`CoreError::Timecode`] when a clip or keyword range is out
/// of range.
pub fn resolve_metadata(timeline: &Timeline, marker: NodeId) -> Result<(ParentInfo, MarkerRoles)> {
    let chain = timeline.ancestors(marker)?;
    let (Some(&parent), Some(&sequence)) = (chain.first(), chain.last()) else {
        return Err(CoreError::internal(format!(
            "annotation {marker} has an empty ancestor chain"
        )));
    };

    let clip = active_pick(timeline, parent);
    let clip_node = timeline.node(clip);
    let clip_rate = timeline.resource_frame_rate(clip).rate;
    let sequence_node = timeline.node(sequence);
    let sequence_rate = timeline.resource_frame_rate(sequence).rate;

    let project = timeline.find_nearest_ancestor(sequence, |kind| *kind == NodeKind::Project);
    let project_name = project.and_then(|id| non_empty(timeline.node(id).name.as_deref()));

    let info = ParentInfo {
        clip_type: clip_node.kind.to_string(),
        clip_name: clip_name(timeline, clip),
        clip_in: Timecode::new(clip_node.start, clip_rate, DEFAULT_SUBFRAME_BASE),
        clip_out: clip_node
            .local_end()?
            .map(|end| Timecode::new(end, clip_rate, DEFAULT_SUBFRAME_BASE)),
        keywords: keywords_at(timeline, parent, marker)?,
        library_name: timeline
            .find_nearest_ancestor(sequence, |kind| *kind == NodeKind::Library)
            .and_then(|id| timeline.node(id).location.as_deref())
            .and_then(library_name_from_location),
        event_name: timeline
            .find_nearest_ancestor(sequence, |kind| *kind == NodeKind::Event)
            .and_then(|id| non_empty(timeline.node(id).name.as_deref())),
        project_name,
        timeline_name: timeline_name(timeline, sequence),
        timeline_start: Timecode::new(
            sequence_node.tc_start.unwrap_or_default(),
            sequence_rate,
            DEFAULT_SUBFRAME_BASE,
        ),
    };

    let role_owner = if timeline.node(marker).kind == NodeKind::Caption {
        marker
    } else {
        clip
    };
    Ok((info, resolve_roles(timeline, role_owner)))
}

/// Display name of a clip with the media file extension appended
///
/// Uses the clip's `name`, else the referenced asset's name. The extension
/// comes from the asset's media URL and is only added when the name does
/// not already end with it.
#[must_use]
pub fn clip_name(timeline: &Timeline, clip: NodeId) -> String {
    let node = timeline.node(clip);
    let asset = clip_asset(timeline, clip);
    let base = non_empty(node.name.as_deref())
        .or_else(|| asset.and_then(|asset| non_empty(asset.name.as_deref())))
        .unwrap_or_default();

    match asset.and_then(Asset::extension) {
        Some(ext) if !base.is_empty() && !ends_with_ignore_case(&base, ext) => {
            format!("{base}{ext}")
        }
        _ => base,
    }
}

/// Name of the timeline a sequence belongs to
///
/// The enclosing project's name, else the sequence's own name, else
/// `"Untitled"`.
#[must_use]
pub fn timeline_name(timeline: &Timeline, sequence: NodeId) -> String {
    timeline
        .find_nearest_ancestor(sequence, |kind| *kind == NodeKind::Project)
        .and_then(|id| non_empty(timeline.node(id).name.as_deref()))
        .or_else(|| non_empty(timeline.node(sequence).name.as_deref()))
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Keywords whose range on the clip covers the marker
///
/// Keyword `value`s are comma-separated; entries are trimmed and
/// deduplicated in first-seen order. A keyword without a duration covers
/// the rest of the clip.
///
/// # Errors
///
/// Returns [`CoreError::Timecode`] when a keyword's end is out of range.
pub fn keywords_at(timeline: &Timeline, clip: NodeId, marker: NodeId) -> Result<Vec<String>> {
    let local = timeline.node(marker).offset;
    let mut seen = create_hash_set();
    let mut words = Vec::new();
    for id in timeline.children(clip) {
        let keyword = timeline.node(*id);
        if keyword.kind != NodeKind::Keyword || keyword.offset > local {
            continue;
        }
        if let Some(duration) = keyword.duration {
            if local >= keyword.offset.checked_add(duration)? {
                continue;
            }
        }
        let values = keyword.value.as_deref().unwrap_or_default();
        for word in values.split(',').map(str::trim) {
            if !word.is_empty() && seen.insert(word.to_string()) {
                words.push(word.to_string());
            }
        }
    }
    Ok(words)
}

/// Library name from a bundle `location` URL
///
/// # Examples
///
/// ```rust
/// use markers_core::extract::metadata::library_name_from_location;
///
/// assert_eq!(
///     library_name_from_location("file:///Users/ed/Movies/My%20Show.fcpbundle/"),
///     Some("My Show".to_string())
/// );
/// assert_eq!(library_name_from_location("/"), None);
/// ```
#[must_use]
pub fn library_name_from_location(location: &str) -> Option<String> {
    let last = location.trim().trim_end_matches('/').rsplit('/').next()?;
    let decoded = percent_decode(last);
    let name = decoded
        .strip_suffix(".fcpbundle")
        .unwrap_or(&decoded)
        .trim();
    non_empty(Some(name))
}

/// Asset behind a clip; a `<clip>` refers to it through its first
/// video or audio component
fn clip_asset(timeline: &Timeline, clip: NodeId) -> Option<&Asset> {
    let node = timeline.node(clip);
    let reference = if node.kind == NodeKind::Clip {
        timeline
            .children(clip)
            .iter()
            .map(|id| timeline.node(*id))
            .find(|child| matches!(child.kind, NodeKind::Video | NodeKind::Audio))
            .and_then(|child| child.reference.as_deref())
    } else {
        node.reference.as_deref()
    };
    reference.and_then(|id| timeline.resources().asset(id))
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name
            .get(name.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = core::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
