//! fcpxml-markers - export the markers of an FCPXML timeline as JSON or CSV

mod export;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use export::ExportFormat;
use markers_core::{extract_markers, CoreError, ExtractionConfig, IdMode, MarkerSource};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fcpxml-markers")]
#[command(version)]
#[command(about = "Export markers, to-dos, chapters and captions from an FCPXML timeline")]
#[command(long_about = "Resolves every marker of a Final Cut Pro timeline to its absolute \
    timecode, through compound clips, retimes and connected storylines.\n\n\
    EXAMPLES:\n    \
    fcpxml-markers Cut.fcpxml\n    \
    fcpxml-markers Cut.fcpxml --format csv --output markers.csv\n    \
    fcpxml-markers Library.fcpxml --project \"Rough Cut\" --exclude-role Music")]
struct Args {
    /// FCPXML document to read
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Marker ID scheme (project-timecode, name, notes)
    #[arg(long, default_value = "project-timecode", value_parser = parse_id_mode)]
    id_mode: IdMode,

    /// Annotations to export (markers, markers-and-captions, captions)
    #[arg(long, default_value = "markers", value_parser = parse_source)]
    source: MarkerSource,

    /// Skip clips and captions with this role (repeatable)
    #[arg(long = "exclude-role", value_name = "ROLE")]
    excluded_roles: Vec<String>,

    /// Export markers on disabled clips
    #[arg(long)]
    include_disabled: bool,

    /// Export disabled captions
    #[arg(long)]
    include_disabled_captions: bool,

    /// Project to export when the document contains several
    #[arg(long)]
    project: Option<String>,

    /// Force drop-frame timecode labels
    #[arg(long, conflicts_with = "non_drop_frame")]
    drop_frame: bool,

    /// Force non-drop-frame timecode labels
    #[arg(long)]
    non_drop_frame: bool,

    /// Append subframes to timecodes
    #[arg(long)]
    subframes: bool,

    /// Log level (off, error, warn, info, debug, trace); RUST_LOG overrides
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

impl Args {
    fn extraction_config(&self) -> ExtractionConfig {
        let drop_frame = if self.drop_frame {
            Some(true)
        } else if self.non_drop_frame {
            Some(false)
        } else {
            None
        };
        let mut config = ExtractionConfig::default()
            .with_source(self.source)
            .with_id_mode(self.id_mode)
            .with_excluded_roles(self.excluded_roles.iter().cloned())
            .with_include_disabled(self.include_disabled)
            .with_include_disabled_captions(self.include_disabled_captions)
            .with_drop_frame(drop_frame)
            .with_subframes(self.subframes);
        if let Some(project) = &self.project {
            config = config.with_project(project.clone());
        }
        config
    }
}

fn parse_id_mode(value: &str) -> Result<IdMode, String> {
    IdMode::parse_mode(value).ok_or_else(|| {
        format!("unknown ID mode '{value}' (expected project-timecode, name or notes)")
    })
}

fn parse_source(value: &str) -> Result<MarkerSource, String> {
    MarkerSource::parse(value).ok_or_else(|| {
        format!("unknown source '{value}' (expected markers, markers-and-captions or captions)")
    })
}

fn run(args: &Args) -> Result<()> {
    let xml = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let extraction = extract_markers(&xml, &args.extraction_config())
        .with_context(|| format!("Failed to extract markers from {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            export::write(BufWriter::new(file), args.format, &extraction)?;
            info!("Wrote {} markers to {}", extraction.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            export::write(&mut out, args.format, &extraction)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = err.downcast_ref::<CoreError>().and_then(CoreError::suggestion) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
