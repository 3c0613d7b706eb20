//! Marker extraction pipeline
//!
//! Turns a decoded [`Timeline`] into the final, ordered list of
//! [`ResolvedMarker`]s for one project:
//!
//! 1. select the project and its sequence
//! 2. collect annotations ([`collect_markers`])
//! 3. resolve absolute positions ([`PositionResolver`]) and drop markers a
//!    trim has hidden
//! 4. resolve parent metadata and roles ([`metadata::resolve_metadata`])
//! 5. stable-sort by position and make IDs unique ([`unique_ids`])
//!
//! The list is complete before it is returned; export writers never see a
//! partial result.
//!
//! # Example
//!
//! ```rust
//! use markers_core::extract::{ExtractionConfig, Extractor, IdMode};
//! use markers_core::model::Timeline;
//!
//! let xml = r#"<fcpxml version="1.11">
//!   <resources><format id="r1" frameDuration="1/25s"/></resources>
//!   <library><event name="Day 1"><project name="Promo">
//!     <sequence format="r1" tcStart="3600s">
//!       <spine>
//!         <gap offset="3600s" start="3600s" duration="10s">
//!           <marker start="3602s" duration="1/25s" value="Logo"/>
//!         </gap>
//!       </spine>
//!     </sequence>
//!   </project></event></library>
//! </fcpxml>"#;
//!
//! let timeline = Timeline::parse(xml)?;
//! let config = ExtractionConfig::default().with_id_mode(IdMode::Name);
//! let extraction = Extractor::new(config).extract(&timeline)?;
//!
//! assert_eq!(extraction.markers[0].timecode, "01:00:02:00");
//! assert_eq!(extraction.unique_ids(), vec!["Logo"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod collector;
mod marker;
pub mod metadata;
mod uniquing;

pub use collector::{collect_markers, CollectOptions, MarkerSource};
pub use marker::{IdMode, MarkerKind, MarkerRoles, ParentInfo, ResolvedMarker, Role};
pub use uniquing::unique_ids;

use log::{info, warn};

use crate::model::{NodeId, NodeKind, Timeline, TimelineNode};
use crate::resolve::PositionResolver;
use crate::timecode::{FrameRate, Timecode, TimecodeStyle, DEFAULT_SUBFRAME_BASE};
use crate::utils::errors::{CoreError, Result};

/// Extraction settings
///
/// # Example
///
/// ```rust
/// use markers_core::extract::{ExtractionConfig, MarkerSource};
///
/// let config = ExtractionConfig::default()
///     .with_source(MarkerSource::MarkersAndCaptions)
///     .with_excluded_roles(["Music"])
///     .with_project("Rough Cut");
/// assert_eq!(config.project.as_deref(), Some("Rough Cut"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Annotation kinds to export
    pub source: MarkerSource,

    /// How marker IDs are derived
    pub id_mode: IdMode,

    /// Roles whose clips and captions are skipped
    ///
    /// An entry excludes any resolved role containing it, ignoring case, so
    /// `Dialogue` also covers `Dialogue.Boom`.
    pub excluded_roles: Vec<String>,

    /// Export markers on disabled clips
    pub include_disabled: bool,

    /// Export disabled captions
    pub include_disabled_captions: bool,

    /// Project to extract when the document holds several
    pub project: Option<String>,

    /// Drop-frame labelling; `None` follows the sequence's `tcFormat`
    pub drop_frame: Option<bool>,

    /// Append subframes to rendered timecodes
    pub subframes: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            source: MarkerSource::Markers,
            id_mode: IdMode::ProjectTimecode,
            excluded_roles: Vec::new(),
            include_disabled: false,
            include_disabled_captions: false,
            project: None,
            drop_frame: None,
            subframes: false,
        }
    }
}

impl ExtractionConfig {
    #[must_use]
    pub fn with_source(mut self, source: MarkerSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_id_mode(mut self, mode: IdMode) -> Self {
        self.id_mode = mode;
        self
    }

    #[must_use]
    pub fn with_excluded_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_include_disabled(mut self, enabled: bool) -> Self {
        self.include_disabled = enabled;
        self
    }

    #[must_use]
    pub fn with_include_disabled_captions(mut self, enabled: bool) -> Self {
        self.include_disabled_captions = enabled;
        self
    }

    #[must_use]
    pub fn with_project(mut self, name: impl Into<String>) -> Self {
        self.project = Some(name.into());
        self
    }

    /// Force drop-frame (`Some(true)`) or non-drop (`Some(false)`) labels
    #[must_use]
    pub fn with_drop_frame(mut self, drop_frame: Option<bool>) -> Self {
        self.drop_frame = drop_frame;
        self
    }

    #[must_use]
    pub fn with_subframes(mut self, enabled: bool) -> Self {
        self.subframes = enabled;
        self
    }

    /// Collector options derived from this configuration
    #[must_use]
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            source: self.source,
            excluded_roles: self.excluded_roles.clone(),
            include_disabled: self.include_disabled,
            include_disabled_captions: self.include_disabled_captions,
        }
    }
}

/// The timeline the markers were extracted from
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimelineContext {
    pub timeline_name: String,
    pub timeline_start: Timecode,
    pub frame_rate: FrameRate,
    /// Timecodes were rendered with drop-frame labels
    pub drop_frame: bool,
}

/// Result of one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Extraction {
    pub context: TimelineContext,
    pub id_mode: IdMode,
    /// Sorted by position, IDs unique
    pub markers: Vec<ResolvedMarker>,
}

impl Extraction {
    /// Final IDs in marker order
    #[must_use]
    pub fn unique_ids(&self) -> Vec<String> {
        self.markers
            .iter()
            .map(|marker| marker.unique_id(self.id_mode))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Runs the extraction pipeline with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    #[must_use]
    pub const fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract markers from the single selected project
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::NoProject`], [`CoreError::MultipleProjects`]
    /// or [`CoreError::ProjectNotFound`] when no single project is selected,
    /// and with any error of [`Extractor::extract_project`].
    pub fn extract(&self, timeline: &Timeline) -> Result<Extraction> {
        let project = self.select_project(timeline)?;
        self.extract_project(timeline, project)
    }

    /// Extract markers from one project node
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the project has no sequence or a
    /// marker ID is empty, [`CoreError::Timecode`] when a position is out of
    /// range, and [`CoreError::DetachedNode`] for a broken tree.
    pub fn extract_project(&self, timeline: &Timeline, project: NodeId) -> Result<Extraction> {
        let project_node = timeline.node(project);
        let Some(sequence) = timeline.project_sequence(project) else {
            return Err(CoreError::validation(format!(
                "project '{}' has no sequence",
                project_node.display_name()
            )));
        };

        let sequence_node = timeline.node(sequence);
        let rate = timeline.resource_frame_rate(sequence);
        if rate.fallback {
            warn!(
                "Sequence of project '{}' declares no frame rate; using {} fps",
                project_node.display_name(),
                rate.rate
            );
        }
        let drop_frame = self
            .config
            .drop_frame
            .or(sequence_node.drop_frame)
            .unwrap_or(false)
            && rate.rate.is_drop_frame_capable();
        let style = TimecodeStyle::Timecode {
            drop_frame,
            subframes: self.config.subframes,
        };

        let resolver = PositionResolver::new(timeline);
        let candidates = collect_markers(timeline, sequence, &self.config.collect_options());
        let collected = candidates.len();

        let mut markers = Vec::with_capacity(collected);
        for id in candidates {
            if resolver.is_hidden_by_trim(id)? {
                continue;
            }
            let position = resolver.resolve(id)?;
            let (parent, roles) = metadata::resolve_metadata(timeline, id)?;
            let node = timeline.node(id);
            let Some(kind) = MarkerKind::from_node(node) else {
                return Err(CoreError::internal(format!(
                    "collected {} {id} is not an annotation",
                    node.kind
                )));
            };
            markers.push(ResolvedMarker {
                kind,
                name: annotation_name(node),
                notes: node.note.clone().unwrap_or_default(),
                position,
                timecode: position.format(style),
                roles,
                parent,
                id_suffix: None,
            });
        }
        let hidden = collected - markers.len();

        // Stable: equal positions keep document order
        markers.sort_by_key(|marker| marker.position);
        let markers = unique_ids(markers, self.config.id_mode)?;

        let timeline_name = metadata::timeline_name(timeline, sequence);
        info!(
            "Extracted {} markers from '{timeline_name}' ({hidden} hidden by trims)",
            markers.len()
        );

        Ok(Extraction {
            context: TimelineContext {
                timeline_name,
                timeline_start: Timecode::new(
                    sequence_node.tc_start.unwrap_or_default(),
                    rate.rate,
                    DEFAULT_SUBFRAME_BASE,
                ),
                frame_rate: rate.rate,
                drop_frame,
            },
            id_mode: self.config.id_mode,
            markers,
        })
    }

    fn select_project(&self, timeline: &Timeline) -> Result<NodeId> {
        let projects = timeline.projects();
        if let Some(name) = &self.config.project {
            return projects
                .into_iter()
                .find(|id| timeline.node(*id).name.as_deref() == Some(name.as_str()))
                .ok_or_else(|| CoreError::ProjectNotFound { name: name.clone() });
        }
        match projects.as_slice() {
            [] => Err(CoreError::NoProject),
            [project] => Ok(*project),
            _ => Err(CoreError::MultipleProjects {
                names: projects
                    .iter()
                    .map(|id| timeline.node(*id).display_name().to_string())
                    .collect(),
            }),
        }
    }
}

/// Run the pipeline once per project, in document order
///
/// Projects are never merged; each result carries its own context.
///
/// # Errors
///
/// Returns [`CoreError::NoProject`] for a document without projects and the
/// first error any project produces.
pub fn extract_each_project(timeline: &Timeline, config: &ExtractionConfig) -> Result<Vec<Extraction>> {
    let projects = timeline.projects();
    if projects.is_empty() {
        return Err(CoreError::NoProject);
    }
    let extractor = Extractor::new(config.clone());
    projects
        .into_iter()
        .map(|project| extractor.extract_project(timeline, project))
        .collect()
}

/// Display name of an annotation
fn annotation_name(node: &TimelineNode) -> String {
    let candidates = if node.kind == NodeKind::Caption {
        [&node.text, &node.name, &node.value]
    } else {
        [&node.value, &node.name, &None]
    };
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}
