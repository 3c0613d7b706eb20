//! Marker ID uniquing
//!
//! Export targets key markers by ID, so colliding base IDs get a numeric
//! suffix. Every member of a colliding group is numbered `-1, -2, ...` in list
//! order; IDs that are already unique are left untouched. A number whose
//! suffixed ID another marker already uses verbatim is skipped. Run this on
//! the final, sorted list so numbering follows timeline order.

use log::info;

use super::marker::{IdMode, ResolvedMarker};
use crate::utils::errors::{CoreError, Result};
use crate::utils::hashers::{create_hash_map_with_capacity, create_hash_set};

/// Assign suffixes to markers whose base IDs collide
///
/// # Errors
///
/// Returns [`CoreError::EmptyMarkerId`] when a marker's base ID is empty
/// (for example an unnamed marker in [`IdMode::Name`]); the whole run fails
/// so nothing unaddressable is exported. Returns [`CoreError::Internal`] if
/// a marker already carries a suffix.
pub fn unique_ids(mut markers: Vec<ResolvedMarker>, mode: IdMode) -> Result<Vec<ResolvedMarker>> {
    let mut groups = create_hash_map_with_capacity::<String, Vec<usize>>(markers.len());
    for (index, marker) in markers.iter().enumerate() {
        let id = marker.id(mode);
        if id.trim().is_empty() {
            return Err(CoreError::EmptyMarkerId {
                mode: mode.to_string(),
                marker: marker.describe(),
            });
        }
        groups.entry(id).or_default().push(index);
    }

    let mut taken = create_hash_set();
    taken.extend(groups.keys().cloned());
    let mut duplicates = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .collect::<Vec<_>>();
    // Report in timeline order
    duplicates.sort_by_key(|(_, members)| members[0]);

    for (id, members) in duplicates {
        info!(
            "Marker ID '{id}' is used by {} markers; numbering them from {id}-1",
            members.len()
        );
        let mut n = 0usize;
        for index in members {
            let marker = &mut markers[index];
            if marker.id_suffix.is_some() {
                return Err(CoreError::internal(format!(
                    "{} was uniqued twice",
                    marker.describe()
                )));
            }
            let suffix = loop {
                n += 1;
                let suffix = format!("-{n}");
                if taken.insert(format!("{id}{suffix}")) {
                    break suffix;
                }
            };
            marker.id_suffix = Some(suffix);
        }
    }

    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::marker::{MarkerKind, MarkerRoles, ParentInfo};
    use crate::timecode::{FrameRate, Rational, Timecode};
    use pretty_assertions::assert_eq;

    fn marker(name: &str, timecode: &str) -> ResolvedMarker {
        let zero = Timecode::zero(FrameRate::Fps25);
        ResolvedMarker {
            kind: MarkerKind::Standard,
            name: name.to_string(),
            notes: String::new(),
            position: Timecode::new(Rational::from_integer(1), FrameRate::Fps25, 80),
            timecode: timecode.to_string(),
            roles: MarkerRoles::default(),
            parent: ParentInfo {
                clip_type: "asset-clip".into(),
                clip_name: "A001.mov".into(),
                clip_in: zero,
                clip_out: None,
                keywords: Vec::new(),
                library_name: None,
                event_name: None,
                project_name: Some("Cut".into()),
                timeline_name: "Cut".into(),
                timeline_start: zero,
            },
            id_suffix: None,
        }
    }

    fn ids(markers: &[ResolvedMarker], mode: IdMode) -> Vec<String> {
        markers.iter().map(|m| m.unique_id(mode)).collect()
    }

    #[test]
    fn colliding_names_are_numbered_in_order() {
        let markers = vec![
            marker("X", "01:00:00:00"),
            marker("Y", "01:00:01:00"),
            marker("X", "01:00:02:00"),
            marker("X", "01:00:03:00"),
        ];
        let uniqued = unique_ids(markers, IdMode::Name).unwrap();
        assert_eq!(ids(&uniqued, IdMode::Name), vec!["X-1", "Y", "X-2", "X-3"]);
        assert_eq!(uniqued[1].id_suffix(), None);
        assert_eq!(uniqued[3].id_suffix(), Some("-3"));
    }

    #[test]
    fn suffixes_skip_ids_already_in_use() {
        let markers = vec![
            marker("X", "01:00:00:00"),
            marker("X", "01:00:01:00"),
            marker("X-1", "01:00:02:00"),
            marker("X-3", "01:00:03:00"),
            marker("X", "01:00:04:00"),
        ];
        let uniqued = unique_ids(markers, IdMode::Name).unwrap();
        assert_eq!(
            ids(&uniqued, IdMode::Name),
            vec!["X-2", "X-4", "X-1", "X-3", "X-5"]
        );
    }

    #[test]
    fn literal_suffix_groups_stay_distinct() {
        let markers = vec![
            marker("X-1", "01:00:00:00"),
            marker("X", "01:00:01:00"),
            marker("X-1", "01:00:02:00"),
            marker("X", "01:00:03:00"),
        ];
        let uniqued = unique_ids(markers, IdMode::Name).unwrap();
        assert_eq!(
            ids(&uniqued, IdMode::Name),
            vec!["X-1-1", "X-2", "X-1-2", "X-3"]
        );
    }

    #[test]
    fn project_timecode_ids() {
        let markers = vec![
            marker("A", "01:00:00:00"),
            marker("B", "01:00:00:00"),
            marker("C", "01:00:05:00"),
        ];
        let uniqued = unique_ids(markers, IdMode::ProjectTimecode).unwrap();
        assert_eq!(
            ids(&uniqued, IdMode::ProjectTimecode),
            vec!["Cut_01:00:00:00-1", "Cut_01:00:00:00-2", "Cut_01:00:05:00"]
        );
    }

    #[test]
    fn empty_id_fails_the_run() {
        let markers = vec![marker("A", "01:00:00:00"), marker("", "01:00:01:00")];
        let err = unique_ids(markers, IdMode::Name).unwrap_err();
        assert!(matches!(err, CoreError::EmptyMarkerId { ref mode, .. } if mode == "name"));

        let notes = vec![marker("A", "01:00:00:00")];
        assert!(unique_ids(notes, IdMode::Notes).is_err());
    }

    #[test]
    fn second_pass_is_rejected() {
        let markers = vec![marker("X", "01:00:00:00"), marker("X", "01:00:01:00")];
        let once = unique_ids(markers, IdMode::Name).unwrap();
        let err = unique_ids(once, IdMode::Name).unwrap_err();
        assert!(err.is_internal_bug());
    }
}
