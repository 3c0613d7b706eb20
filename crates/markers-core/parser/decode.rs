//! Decode an FCPXML element tree into the timeline arena
//!
//! Each element becomes one [`TimelineNode`] with its kind and timing
//! attributes decoded up front. A few helper elements are folded into their
//! parent instead of becoming nodes: `<timeMap>`, `<conform-rate>`, caption
//! text runs and the resource definitions that only feed lookup tables.

use log::{debug, warn};

use ahash::RandomState;
use std::collections::HashMap;

use super::{ParseError, XmlElement};
use crate::model::{Asset, Format, NodeId, NodeKind, Timeline, TimelineBuilder, TimelineNode};
use crate::resolve::{TimeMap, TimePoint};
use crate::timecode::{FrameRate, Rational, TimecodeError};
use crate::utils::hashers::create_hash_map;

/// Elements folded into their parent or into the resource table
const FOLDED_TAGS: &[&str] = &[
    "timeMap",
    "conform-rate",
    "text",
    "text-style-def",
    "format",
    "asset",
    "effect",
];

/// Decode a parsed `<fcpxml>` document
///
/// # Errors
///
/// Returns [`ParseError::UnexpectedRoot`] when the root is not `<fcpxml>`,
/// [`ParseError::InvalidTime`] for any malformed time attribute and
/// [`ParseError::InvalidAttribute`] for a non-numeric lane.
pub fn decode(root: &XmlElement) -> Result<Timeline, ParseError> {
    if root.tag != "fcpxml" {
        return Err(ParseError::UnexpectedRoot {
            tag: root.tag.clone(),
        });
    }

    let mut decoder = Decoder {
        builder: Timeline::builder(),
        media_rates: create_hash_map(),
    };
    for resources in root.children_named("resources") {
        decoder.load_resources(resources)?;
    }
    decoder.decode_element(root, None)?;
    Ok(decoder.builder.build())
}

struct Decoder {
    builder: TimelineBuilder,
    /// Rate of each `<media>` definition's inner sequence or multicam
    media_rates: HashMap<String, FrameRate, RandomState>,
}

impl Decoder {
    fn load_resources(&mut self, resources: &XmlElement) -> Result<(), ParseError> {
        for format in resources.children_named("format") {
            let Some(id) = format.attr("id") else {
                continue;
            };
            let frame_rate = match parse_time(format, "frameDuration")? {
                Some(duration) => match FrameRate::from_frame_duration(duration) {
                    Ok(rate) => Some(rate),
                    Err(err) => {
                        warn!("Ignoring frame duration of format '{id}': {err}");
                        None
                    }
                },
                None => None,
            };
            self.builder.resources_mut().insert_format(
                id,
                Format {
                    name: non_empty(format.attr("name")),
                    frame_rate,
                },
            );
        }

        for asset in resources.children_named("asset") {
            let Some(id) = asset.attr("id") else {
                continue;
            };
            let src = non_empty(asset.attr("src")).or_else(|| {
                asset
                    .children_named("media-rep")
                    .find_map(|rep| non_empty(rep.attr("src")))
            });
            self.builder.resources_mut().insert_asset(
                id,
                Asset {
                    name: non_empty(asset.attr("name")),
                    src,
                    format: non_empty(asset.attr("format")),
                    has_video: asset.attr("hasVideo") == Some("1"),
                    has_audio: asset.attr("hasAudio") == Some("1"),
                },
            );
        }

        for media in resources.children_named("media") {
            let Some(id) = media.attr("id") else {
                continue;
            };
            let rate = media
                .children
                .iter()
                .filter_map(|inner| inner.attr("format"))
                .find_map(|format| self.format_rate(format));
            if let Some(rate) = rate {
                self.media_rates.insert(id.to_string(), rate);
            }
        }
        Ok(())
    }

    fn decode_element(
        &mut self,
        element: &XmlElement,
        parent: Option<NodeId>,
    ) -> Result<(), ParseError> {
        if parent.is_some() && FOLDED_TAGS.contains(&element.tag.as_str()) {
            return Ok(());
        }

        let node = self.decode_node(element, parent)?;
        let is_media = node.kind == NodeKind::Media;
        let id = self.builder.push(parent, node);
        if is_media {
            if let Some(media_id) = element.attr("id") {
                self.builder.resources_mut().insert_media(media_id, id);
            }
        }

        for child in &element.children {
            self.decode_element(child, Some(id))?;
        }
        Ok(())
    }

    fn decode_node(
        &self,
        element: &XmlElement,
        parent: Option<NodeId>,
    ) -> Result<TimelineNode, ParseError> {
        let kind = NodeKind::parse_tag(&element.tag);
        let mut node = TimelineNode::new(kind.clone());

        match kind {
            // annotations sit at `start` on their clip's own timeline
            NodeKind::Marker | NodeKind::ChapterMarker | NodeKind::Keyword => {
                node.offset = parse_time(element, "start")?.unwrap_or_default();
            }
            _ => {
                node.offset = parse_time(element, "offset")?.unwrap_or_default();
                node.start = parse_time(element, "start")?.unwrap_or_default();
            }
        }
        node.duration = parse_time(element, "duration")?;
        node.tc_start = parse_time(element, "tcStart")?;

        if let Some(lane) = element.attr("lane") {
            node.lane = lane.trim().parse().map_err(|_| {
                ParseError::invalid_attribute(&element.tag, "lane", lane, "expected an integer")
            })?;
        }

        node.enabled = element.attr("enabled") != Some("0");
        node.active = element.attr("active") != Some("0");
        node.name = non_empty(element.attr("name"));
        node.reference = non_empty(element.attr("ref"));
        node.value = non_empty(element.attr("value"));
        node.note = non_empty(element.attr("note"));
        node.location = non_empty(element.attr("location"));
        node.completed = element
            .attr("completed")
            .map(|value| matches!(value.trim(), "1" | "true"));
        node.drop_frame = element.attr("tcFormat").map(|format| format == "DF");

        let role = non_empty(element.attr("role"));
        match kind {
            NodeKind::Caption => node.roles.caption = role,
            NodeKind::Audio | NodeKind::AudioChannelSource => node.roles.audio = role,
            _ => {
                node.roles.video = role;
                node.roles.audio = non_empty(element.attr("audioRole"));
            }
        }

        if matches!(kind, NodeKind::Caption | NodeKind::Title) {
            let text: Vec<String> = element
                .children_named("text")
                .map(XmlElement::text_content)
                .filter(|line| !line.is_empty())
                .collect();
            if !text.is_empty() {
                node.text = Some(text.join("\n"));
            }
        }

        node.time_map = element.child("timeMap").map(decode_time_map).transpose()?;
        node.conform_rate = element.child("conform-rate").and_then(|conform| {
            let label = conform.attr("srcFrameRate")?;
            let rate = FrameRate::from_decimal_label(label);
            if rate.is_none() {
                warn!("Ignoring unrecognised conform rate '{label}'");
            }
            rate
        });
        node.frame_rate = self.declared_rate(element, &kind);

        // FCP places primary storyline items at offsets that already include
        // the sequence's tcStart
        if kind == NodeKind::Spine && element.attr("start").is_none() {
            if let Some(sequence) = parent.and_then(|p| self.builder.node(p)) {
                if sequence.kind == NodeKind::Sequence {
                    node.start = sequence.tc_start.unwrap_or_default();
                }
            }
        }

        Ok(node)
    }

    fn declared_rate(&self, element: &XmlElement, kind: &NodeKind) -> Option<FrameRate> {
        if let Some(format) = element.attr("format") {
            let rate = self.format_rate(format);
            if rate.is_none() {
                debug!("Format '{format}' on <{}> declares no frame rate", element.tag);
            }
            return rate;
        }
        let reference = element.attr("ref")?;
        match kind {
            NodeKind::AssetClip | NodeKind::Video | NodeKind::Audio => {
                let format = self.asset(reference)?.format.clone()?;
                self.format_rate(&format)
            }
            NodeKind::CompoundClipRef | NodeKind::MulticamClip => {
                self.media_rates.get(reference).copied()
            }
            _ => None,
        }
    }

    fn format_rate(&self, id: &str) -> Option<FrameRate> {
        self.builder.resources().format_rate(id)
    }

    fn asset(&self, id: &str) -> Option<&Asset> {
        self.builder.resources().asset(id)
    }
}

fn decode_time_map(element: &XmlElement) -> Result<TimeMap, ParseError> {
    let mut points = Vec::new();
    for point in element.children_named("timept") {
        let (Some(source), Some(target)) =
            (parse_time(point, "value")?, parse_time(point, "time")?)
        else {
            debug!("Skipping incomplete <timept>");
            continue;
        };
        points.push(TimePoint::new(source, target));
    }
    Ok(TimeMap::new(points))
}

/// Parse an optional time attribute; malformed values are fatal
fn parse_time(element: &XmlElement, attribute: &str) -> Result<Option<Rational>, ParseError> {
    let Some(value) = element.attr(attribute) else {
        return Ok(None);
    };
    Rational::parse_fcpxml(value).map(Some).map_err(|err| {
        let reason = match err {
            TimecodeError::InvalidTime { reason, .. } => reason,
            other => other.to_string(),
        };
        ParseError::invalid_time(&element.tag, attribute, value, &reason)
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
