//! Property-based tests for the extraction pipeline
//!
//! Uses proptest to check ordering, idempotence and uniqueness over randomly
//! placed markers on a trimmed clip.

use markers_core::{ExtractionConfig, Extractor, IdMode, Rational, Timeline};
use proptest::prelude::*;
use std::collections::HashSet;

/// Clip in point and out point in frames at 25 fps (10s and 30s)
const CLIP_IN: i64 = 250;
const CLIP_OUT: i64 = 750;

/// Generate marker placements as (frame on the clip's timeline, name)
///
/// Names mix in `-` and digits so some collide with suffixed IDs.
fn arb_markers() -> impl Strategy<Value = Vec<(i64, String)>> {
    prop::collection::vec((0..1000i64, "[A-B](-[1-3]){0,2}"), 0..25)
}

fn document(markers: &[(i64, String)]) -> String {
    let body = markers
        .iter()
        .map(|(frame, name)| format!(r#"<marker start="{frame}/25s" value="{name}"/>"#))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
    <asset id="r2" name="Clip" src="file:///Media/Clip.mov" format="r1" hasVideo="1"/>
  </resources>
  <library><event name="E"><project name="P">
    <sequence format="r1" tcStart="3600s"><spine>
      <asset-clip ref="r2" offset="3600s" start="10s" duration="20s">
{body}
      </asset-clip>
    </spine></sequence>
  </project></event></library>
</fcpxml>"#
    )
}

proptest! {
    /// Output is ordered by position and holds exactly the visible markers
    #[test]
    fn test_sorted_and_trimmed(markers in arb_markers()) {
        let timeline = Timeline::parse(&document(&markers))?;
        let extraction = Extractor::new(ExtractionConfig::default()).extract(&timeline)?;

        let visible = markers
            .iter()
            .filter(|(frame, _)| *frame > CLIP_IN && *frame < CLIP_OUT)
            .count();
        prop_assert_eq!(extraction.len(), visible);
        prop_assert!(extraction
            .markers
            .windows(2)
            .all(|pair| pair[0].position <= pair[1].position));
    }

    /// Each position is the clip-relative offset plus the timeline start
    #[test]
    fn test_position_composition(frame in (CLIP_IN + 1)..CLIP_OUT) {
        let markers = vec![(frame, "M".to_string())];
        let timeline = Timeline::parse(&document(&markers))?;
        let extraction = Extractor::default().extract(&timeline)?;

        let expected = Rational::new(frame, 25) - Rational::from_integer(10)
            + Rational::from_integer(3600);
        prop_assert_eq!(extraction.markers[0].position.seconds(), expected);
    }

    /// Running the pipeline twice on one timeline gives identical results
    #[test]
    fn test_extraction_is_idempotent(markers in arb_markers()) {
        let timeline = Timeline::parse(&document(&markers))?;
        let extractor = Extractor::new(ExtractionConfig::default().with_id_mode(IdMode::Name));

        let first = extractor.extract(&timeline)?;
        let second = extractor.extract(&timeline)?;
        prop_assert_eq!(first, second);
    }

    /// Final IDs never collide, whatever the names
    #[test]
    fn test_unique_ids_are_unique(markers in arb_markers()) {
        let timeline = Timeline::parse(&document(&markers))?;
        for mode in [IdMode::ProjectTimecode, IdMode::Name] {
            let extraction =
                Extractor::new(ExtractionConfig::default().with_id_mode(mode)).extract(&timeline)?;
            let ids = extraction.unique_ids();
            let distinct = ids.iter().collect::<HashSet<_>>();
            prop_assert_eq!(distinct.len(), ids.len());
        }
    }
}
