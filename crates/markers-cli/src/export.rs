//! Export writers for resolved markers
//!
//! Both writers take a finished [`Extraction`]: markers are already sorted
//! and their IDs are unique, so writing never fails halfway for data reasons.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use markers_core::{Extraction, IdMode, ResolvedMarker, TimelineContext};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

const CSV_HEADER: [&str; 15] = [
    "ID",
    "Name",
    "Type",
    "Timecode",
    "Notes",
    "Clip Type",
    "Clip Name",
    "Video Role",
    "Audio Roles",
    "Caption Role",
    "Keywords",
    "Timeline",
    "Project",
    "Event",
    "Library",
];

#[derive(Serialize)]
struct JsonExport<'a> {
    generator: &'static str,
    version: &'static str,
    timeline: &'a TimelineContext,
    id_mode: IdMode,
    markers: Vec<JsonMarker<'a>>,
}

#[derive(Serialize)]
struct JsonMarker<'a> {
    id: String,
    #[serde(flatten)]
    marker: &'a ResolvedMarker,
}

/// Write the extraction in the requested format
pub fn write<W: Write>(out: W, format: ExportFormat, extraction: &Extraction) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(out, extraction),
        ExportFormat::Csv => write_csv(out, extraction),
    }
}

/// Pretty-printed JSON document with the timeline context and all markers
pub fn write_json<W: Write>(mut out: W, extraction: &Extraction) -> Result<()> {
    let document = JsonExport {
        generator: env!("CARGO_PKG_NAME"),
        version: markers_core::VERSION,
        timeline: &extraction.context,
        id_mode: extraction.id_mode,
        markers: extraction
            .markers
            .iter()
            .map(|marker| JsonMarker {
                id: marker.unique_id(extraction.id_mode),
                marker,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut out, &document)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// One CSV row per marker, RFC 4180 quoting
pub fn write_csv<W: Write>(mut out: W, extraction: &Extraction) -> Result<()> {
    write_row(&mut out, CSV_HEADER.iter().map(|field| (*field).to_string()))?;
    for marker in &extraction.markers {
        let parent = &marker.parent;
        let row = [
            marker.unique_id(extraction.id_mode),
            marker.name.clone(),
            marker.kind.label().to_string(),
            marker.timecode.clone(),
            marker.notes.clone(),
            parent.clip_type.clone(),
            parent.clip_name.clone(),
            marker
                .roles
                .video
                .as_ref()
                .map(|role| role.name.clone())
                .unwrap_or_default(),
            marker
                .roles
                .audio
                .iter()
                .map(|role| role.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            marker
                .roles
                .caption
                .as_ref()
                .map(|role| role.name.clone())
                .unwrap_or_default(),
            parent.keywords.join(", "),
            parent.timeline_name.clone(),
            parent.project_name.clone().unwrap_or_default(),
            parent.event_name.clone().unwrap_or_default(),
            parent.library_name.clone().unwrap_or_default(),
        ];
        write_row(&mut out, row.into_iter())?;
    }
    out.flush()?;
    Ok(())
}

fn write_row<W: Write>(out: &mut W, fields: impl Iterator<Item = String>) -> Result<()> {
    let line = fields
        .map(|field| escape_csv(&field))
        .collect::<Vec<_>>()
        .join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")?;
    Ok(())
}

fn escape_csv(field: &str) -> String {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(' ')
        || field.ends_with(' ');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
