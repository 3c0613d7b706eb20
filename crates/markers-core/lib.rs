//! # markers-core
//!
//! Marker extraction for Final Cut Pro XML (FCPXML) timelines. Reads a
//! document into an immutable timeline tree, resolves every marker, to-do,
//! chapter marker and caption to an absolute timecode on the root timeline,
//! and attaches the clip, role and container metadata export formats need.
//!
//! ## Features
//!
//! - **Exact time**: rational arithmetic end to end, rounding only at render
//! - **Nested timelines**: trims, time maps, conform rates and offsets are
//!   composed through compound, multicam and connected clips
//! - **Role resolution**: explicit, channel-source, inherited and default
//!   roles with FCP's subrole collapse
//! - **Stable output**: markers sorted by position with unique IDs
//!
//! ## Quick Start
//!
//! ```rust
//! use markers_core::{extract_markers, ExtractionConfig};
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <fcpxml version="1.11">
//!   <resources>
//!     <format id="r1" frameDuration="1/25s" name="FFVideoFormat1080p25"/>
//!     <asset id="r2" name="A001" src="file:///Media/A001.mov" format="r1" hasVideo="1" hasAudio="1"/>
//!   </resources>
//!   <library>
//!     <event name="Day 1">
//!       <project name="Promo">
//!         <sequence format="r1" tcStart="3600s">
//!           <spine>
//!             <asset-clip ref="r2" offset="3600s" start="10s" duration="20s">
//!               <marker start="12s" duration="1/25s" value="Logo in"/>
//!             </asset-clip>
//!           </spine>
//!         </sequence>
//!       </project>
//!     </event>
//!   </library>
//! </fcpxml>"#;
//!
//! let extraction = extract_markers(xml, &ExtractionConfig::default())?;
//! let marker = &extraction.markers[0];
//! assert_eq!(marker.timecode, "01:00:02:00");
//! assert_eq!(marker.parent.clip_name, "A001.mov");
//! assert_eq!(extraction.unique_ids(), vec!["Promo_01:00:02:00"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod extract;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod timecode;
pub mod utils;

pub use extract::{
    extract_each_project, Extraction, ExtractionConfig, Extractor, IdMode, MarkerKind,
    MarkerSource, ResolvedMarker, TimelineContext,
};
pub use model::Timeline;
pub use parser::ParseError;
pub use timecode::{FrameRate, Rational, Timecode, TimecodeStyle};
pub use utils::errors::Result;
pub use utils::{CoreError, ErrorCategory};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse an FCPXML document and extract the markers of its project
///
/// Convenience for [`Timeline::parse`] followed by [`Extractor::extract`].
///
/// # Errors
///
/// Returns [`CoreError::Parse`] for unreadable documents and any error of
/// [`Extractor::extract`].
pub fn extract_markers(xml: &str, config: &ExtractionConfig) -> Result<Extraction> {
    let timeline = Timeline::parse(xml)?;
    Extractor::new(config.clone()).extract(&timeline)
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        let err = extract_markers("<fcpxml><library>", &ExtractionConfig::default());
        assert!(err.is_err());

        let err = extract_markers("<notfcpxml/>", &ExtractionConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
        assert_eq!(err.category(), ErrorCategory::Structural);
    }
}
