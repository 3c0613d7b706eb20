//! End-to-end extraction tests over inline FCPXML documents.
//!
//! Each document is small enough to compute expected timecodes by hand; the
//! arithmetic is noted next to the assertions.

use markers_core::extract::{metadata::collapse_subrole, Role};
use markers_core::{
    extract_each_project, extract_markers, CoreError, ErrorCategory, ExtractionConfig, IdMode,
    MarkerKind, MarkerSource, Timeline,
};
use pretty_assertions::assert_eq;

/// Wrap a spine body in a one-project library at 25 fps starting at 01:00:00:00
fn project_document(spine: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE fcpxml>
<fcpxml version="1.11">
  <resources>
    <format id="r1" name="FFVideoFormat1080p25" frameDuration="1/25s" width="1920" height="1080"/>
    <asset id="r2" name="Interview" start="0s" duration="600s" hasVideo="1" hasAudio="1" format="r1">
      <media-rep kind="original-media" src="file:///Volumes/Media/Interview.mov"/>
    </asset>
    <asset id="r4" name="Score" src="file:///Volumes/Media/Score.wav" hasAudio="1"/>
    <media id="r3" name="Opening">
      <sequence format="r1" tcStart="0s">
        <spine>
          <asset-clip ref="r2" offset="0s" start="0s" duration="30s">
            <marker start="5s" duration="1/25s" value="Inside definition"/>
          </asset-clip>
        </spine>
      </sequence>
    </media>
  </resources>
  <library location="file:///Users/editor/Movies/Documentary.fcpbundle/">
    <event name="Interviews">
      <project name="Assembly">
        <sequence format="r1" tcStart="3600s" tcFormat="NDF">
          <spine>
{spine}
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#
    )
}

#[test]
fn marker_two_seconds_into_first_clip() {
    // clip in point 10s, marker at 12s: 2s into the clip, clip at the
    // timeline start, timeline starts at 01:00:00:00
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" name="Interview" start="10s" duration="20s">
             <marker start="12s" duration="1/25s" value="Slate" note="check focus"/>
           </asset-clip>"#,
    );
    let extraction = extract_markers(&xml, &ExtractionConfig::default()).unwrap();

    assert_eq!(extraction.len(), 1);
    let marker = &extraction.markers[0];
    assert_eq!(marker.timecode, "01:00:02:00");
    assert_eq!(marker.name, "Slate");
    assert_eq!(marker.notes, "check focus");
    assert_eq!(marker.kind, MarkerKind::Standard);
    assert_eq!(marker.parent.clip_name, "Interview.mov");
    assert_eq!(marker.parent.event_name.as_deref(), Some("Interviews"));
    assert_eq!(marker.parent.library_name.as_deref(), Some("Documentary"));
    assert_eq!(extraction.context.timeline_name, "Assembly");
    assert_eq!(extraction.context.timeline_start.to_string(), "01:00:00:00");
    assert_eq!(extraction.unique_ids(), vec!["Assembly_01:00:02:00"]);
}

#[test]
fn compound_definitions_are_not_traversed() {
    // Both instances of r3 carry their own marker; the definition's marker
    // must not appear once per instance.
    // first:  (3s - 1s) + 3600s -> 01:00:02:00
    // second: (4s - 1s) + 3610s -> 01:00:13:00
    let xml = project_document(
        r#"<ref-clip ref="r3" offset="3600s" start="1s" duration="10s" name="Opening">
             <marker start="3s" value="First instance"/>
           </ref-clip>
           <ref-clip ref="r3" offset="3610s" start="1s" duration="10s" name="Opening">
             <marker start="4s" value="Second instance"/>
           </ref-clip>"#,
    );
    let extraction = extract_markers(&xml, &ExtractionConfig::default()).unwrap();

    let found = extraction
        .markers
        .iter()
        .map(|m| (m.name.as_str(), m.timecode.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        found,
        vec![
            ("First instance", "01:00:02:00"),
            ("Second instance", "01:00:13:00")
        ]
    );
    assert_eq!(extraction.markers[0].parent.clip_type, "ref-clip");
}

#[test]
fn trim_boundaries_are_exclusive() {
    // 1/2000s is one subframe at 25 fps with 80 subframes per frame
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="10s" duration="20s">
             <marker start="10s" value="At in point"/>
             <marker start="20001/2000s" value="One subframe later"/>
             <marker start="29s" value="Before out point"/>
             <marker start="30s" value="At out point"/>
             <marker start="45s" value="Trimmed away"/>
           </asset-clip>"#,
    );
    let config = ExtractionConfig::default().with_subframes(true);
    let extraction = extract_markers(&xml, &config).unwrap();

    let found = extraction
        .markers
        .iter()
        .map(|m| (m.name.as_str(), m.timecode.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        found,
        vec![
            ("One subframe later", "01:00:00:00.01"),
            ("Before out point", "01:00:19:00.00")
        ]
    );
}

#[test]
fn retimed_clip_maps_through_time_map() {
    // half speed: source 10s plays at timeline 20s, so a marker 4s into the
    // source lands 8s into the timeline
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="0s" duration="40s">
             <timeMap>
               <timept time="0s" value="0s" interp="linear"/>
               <timept time="20s" value="10s" interp="linear"/>
             </timeMap>
             <marker start="4s" value="Retimed"/>
           </asset-clip>"#,
    );
    let extraction = extract_markers(&xml, &ExtractionConfig::default()).unwrap();
    assert_eq!(extraction.markers[0].timecode, "01:00:08:00");
}

#[test]
fn markers_are_sorted_and_uniqued() {
    let xml = project_document(
        r#"<gap offset="3600s" start="3600s" duration="30s">
             <marker start="3620s" value="X"/>
             <marker start="3605s" value="X"/>
             <chapter-marker start="3610s" value="Act 2" posterOffset="0s"/>
             <marker start="3601s" value="X" completed="1"/>
           </gap>"#,
    );
    let config = ExtractionConfig::default().with_id_mode(IdMode::Name);
    let extraction = extract_markers(&xml, &config).unwrap();

    assert_eq!(extraction.unique_ids(), vec!["X-1", "X-2", "Act 2", "X-3"]);
    assert_eq!(extraction.markers[0].kind, MarkerKind::ToDo { completed: true });
    assert_eq!(extraction.markers[2].kind, MarkerKind::Chapter);
    assert_eq!(extraction.markers[3].timecode, "01:00:20:00");
    assert!(extraction
        .markers
        .windows(2)
        .all(|pair| pair[0].position <= pair[1].position));
}

#[test]
fn empty_ids_fail_the_whole_run() {
    let xml = project_document(
        r#"<gap offset="3600s" start="3600s" duration="30s">
             <marker start="3601s" value="Named"/>
             <marker start="3602s"/>
           </gap>"#,
    );
    let err = extract_markers(&xml, &ExtractionConfig::default().with_id_mode(IdMode::Name))
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyMarkerId { .. }));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.suggestion().is_some());

    // timecode IDs are never empty
    let extraction = extract_markers(&xml, &ExtractionConfig::default()).unwrap();
    assert_eq!(extraction.len(), 2);
}

#[test]
fn roles_captions_and_exclusion() {
    // marker at (12 - 10) -> 01:00:02:00, captions at (14 - 10) and (16 - 10)
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="10s" duration="20s" role="interview" audioRole="dialogue.dialogue-1">
             <marker start="12s" value="Question"/>
             <caption lane="1" offset="14s" duration="2s" role="iTT?captionFormat=ITT.en">
               <text><text-style ref="ts1">Hello there</text-style></text>
             </caption>
             <caption lane="1" offset="16s" duration="2s" role="iTT?captionFormat=ITT.en" enabled="0">
               <text><text-style ref="ts1">Disabled line</text-style></text>
             </caption>
           </asset-clip>
           <asset-clip ref="r4" offset="3620s" start="1s" duration="5s" audioRole="music.music-1">
             <marker start="2s" value="Beat"/>
           </asset-clip>"#,
    );

    let config = ExtractionConfig::default().with_source(MarkerSource::MarkersAndCaptions);
    let extraction = extract_markers(&xml, &config).unwrap();
    let names = extraction
        .markers
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Question", "Hello there", "Beat"]);

    let question = &extraction.markers[0];
    assert_eq!(question.roles.video, Some(Role::explicit("interview")));
    assert_eq!(question.roles.audio, vec![Role::explicit("Dialogue")]);

    let caption = &extraction.markers[1];
    assert_eq!(caption.kind, MarkerKind::Caption);
    assert_eq!(caption.timecode, "01:00:04:00");
    assert_eq!(caption.roles.caption, Some(Role::explicit("iTT")));
    assert_eq!(caption.roles.video, None);

    // the score asset has no video, so no default video role
    let beat = &extraction.markers[2];
    assert_eq!(beat.roles.video, None);
    assert_eq!(beat.roles.audio, vec![Role::explicit("Music")]);
    assert_eq!(beat.timecode, "01:00:21:00");

    let with_disabled = extract_markers(
        &xml,
        &config.clone().with_include_disabled_captions(true),
    )
    .unwrap();
    assert_eq!(with_disabled.len(), 4);

    let no_music = extract_markers(&xml, &config.clone().with_excluded_roles(["music"])).unwrap();
    assert_eq!(no_music.len(), 2);

    let no_captions = extract_markers(&xml, &config.clone().with_excluded_roles(["iTT"])).unwrap();
    assert_eq!(no_captions.len(), 2);

    // entries match any role containing them
    let no_mus = extract_markers(&xml, &config.clone().with_excluded_roles(["MUS"])).unwrap();
    assert_eq!(no_mus.len(), no_music.len());

    // excluding the clip's role drops its captions with it
    let no_dialogue = extract_markers(&xml, &config.with_excluded_roles(["Dialogue"])).unwrap();
    let names = no_dialogue
        .markers
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Beat"]);
}

#[test]
fn disabled_clips_are_skipped_unless_requested() {
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="10s" duration="20s" enabled="0">
             <marker start="12s" value="Hidden"/>
           </asset-clip>"#,
    );
    let skipped = extract_markers(&xml, &ExtractionConfig::default()).unwrap();
    assert!(skipped.is_empty());

    let included =
        extract_markers(&xml, &ExtractionConfig::default().with_include_disabled(true)).unwrap();
    assert_eq!(included.len(), 1);
}

#[test]
fn drop_frame_labels_follow_sequence_format() {
    // frame 1800 at 29.97 is labelled 00:01:00;02
    let xml = r#"<fcpxml version="1.11">
  <resources><format id="r1" frameDuration="1001/30000s"/></resources>
  <library><event name="E"><project name="DF">
    <sequence format="r1" tcStart="0s" tcFormat="DF"><spine>
      <gap offset="0s" start="0s" duration="120s">
        <marker start="1801800/30000s" value="Minute"/>
      </gap>
    </spine></sequence>
  </project></event></library>
</fcpxml>"#;

    let extraction = extract_markers(xml, &ExtractionConfig::default()).unwrap();
    assert!(extraction.context.drop_frame);
    assert_eq!(extraction.markers[0].timecode, "00:01:00;02");

    let forced =
        extract_markers(xml, &ExtractionConfig::default().with_drop_frame(Some(false))).unwrap();
    assert_eq!(forced.markers[0].timecode, "00:01:00:00");
}

#[test]
fn several_projects_need_a_selection() {
    let xml = r#"<fcpxml version="1.11">
  <resources><format id="r1" frameDuration="1/25s"/></resources>
  <library><event name="E">
    <project name="Cut A"><sequence format="r1" tcStart="0s"><spine>
      <gap offset="0s" start="0s" duration="10s"><marker start="1s" value="a"/></gap>
    </spine></sequence></project>
    <project name="Cut B"><sequence format="r1" tcStart="0s"><spine>
      <gap offset="0s" start="0s" duration="10s"><marker start="2s" value="b"/></gap>
    </spine></sequence></project>
  </event></library>
</fcpxml>"#;

    let err = extract_markers(xml, &ExtractionConfig::default()).unwrap_err();
    assert_eq!(
        err,
        CoreError::MultipleProjects {
            names: vec!["Cut A".into(), "Cut B".into()]
        }
    );

    let selected = extract_markers(xml, &ExtractionConfig::default().with_project("Cut B")).unwrap();
    assert_eq!(selected.unique_ids(), vec!["Cut B_00:00:02:00"]);

    let timeline = Timeline::parse(xml).unwrap();
    let each = extract_each_project(&timeline, &ExtractionConfig::default()).unwrap();
    let contexts = each
        .iter()
        .map(|e| e.context.timeline_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(contexts, vec!["Cut A", "Cut B"]);
}

#[test]
fn malformed_time_is_fatal() {
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="ten seconds" duration="20s"/>"#,
    );
    let err = extract_markers(&xml, &ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::Parse(_)));
    assert!(err.to_string().contains("ten seconds"));
}

#[test]
fn out_of_range_time_arithmetic_is_an_error() {
    // each value is well formed, but the coprime denominators multiply out
    // past anything a position can represent
    let xml = project_document(
        r#"<gap offset="1/9223372036854775783s" start="1/9223372036854775643s">
             <marker start="1/9223372036854775549s" value="Edge"/>
           </gap>"#,
    );
    let err = extract_markers(&xml, &ExtractionConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Timecode(markers_core::timecode::TimecodeError::Overflow)
    ));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.suggestion().is_some());
}

#[test]
fn subrole_collapse_matches_fcp_naming() {
    assert_eq!(collapse_subrole("Dialogue.Dialogue-1"), "Dialogue");
    assert_eq!(collapse_subrole("Dialogue.Dialogue-Custom"), "Dialogue.Dialogue-Custom");
}

#[test]
fn extraction_serializes_to_json() {
    let xml = project_document(
        r#"<asset-clip ref="r2" offset="3600s" start="10s" duration="20s">
             <keyword start="10s" duration="10s" value="Interview, Wide"/>
             <marker start="12s" value="Slate" completed="0"/>
           </asset-clip>"#,
    );
    let extraction = extract_markers(&xml, &ExtractionConfig::default()).unwrap();
    let json = serde_json::to_value(&extraction).unwrap();

    let marker = &json["markers"][0];
    assert_eq!(marker["kind"]["type"], "to_do");
    assert_eq!(marker["timecode"], "01:00:02:00");
    assert_eq!(marker["position"]["timecode"], "01:00:02:00");
    assert_eq!(marker["parent"]["keywords"][1], "Wide");
    assert_eq!(marker["roles"]["video"]["name"], "Video");
    assert_eq!(marker["roles"]["video"]["is_default"], true);
    assert_eq!(json["context"]["drop_frame"], false);
    assert_eq!(json["id_mode"], "project-timecode");
}
