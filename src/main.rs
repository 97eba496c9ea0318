//! facesignal CLI
//!
//! Usage:
//!   facesignal --input frames.jsonl                 # Replay detections, human output
//!   facesignal --input - --json                     # Read stdin, one JSON report per frame
//!   facesignal --input frames.jsonl --validate-every 30
//!   facesignal --config tuning.toml --input frames.jsonl
//!
//! Each input line is one frame from one source:
//!   {"source": "cam0", "timestamp": 0.033, "faces": [{"bbox": {"x": 10, "y": 20, "w": 80, "h": 80}}]}

use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use facesignal::core::{CrossSourceValidator, SourceHub, TrackingSession};
use facesignal::types::{FaceSignals, FrameInput, FrameReport, ValidationReport, ValidationStatus};
use facesignal::{EngineConfig, FacesignalError, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "facesignal",
    version = VERSION,
    about = "Temporal face tracking and behavioral signal fusion",
    long_about = "facesignal replays per-frame face detections (boxes plus optional\n\
                  landmarks and expression labels) from one or more sources and\n\
                  reports per-identity signals: track identity, synchronized blinks,\n\
                  gaze and head pose, quadrant stability and micro-expressions.\n\n\
                  With two or more sources, their latest snapshots are cross-validated\n\
                  pairwise and summarized."
)]
struct Args {
    /// JSON-lines frame file, or - for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// TOML tuning file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Cross-validate sources every N frames (0 = only at end of input)
    #[arg(long, default_value_t = 0)]
    validate_every: u64,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-face signal breakdown
    #[arg(short, long)]
    verbose: bool,
}

/// One input line
#[derive(Debug, Deserialize)]
struct SourceFrame {
    #[serde(default = "default_source")]
    source: String,
    #[serde(flatten)]
    frame: FrameInput,
}

fn default_source() -> String {
    "default".to_string()
}

fn parse_line(line: &str) -> Result<SourceFrame, FacesignalError> {
    Ok(serde_json::from_str(line)?)
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    source: &'a str,
    report: &'a FrameReport,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonLine<'a> {
    Frame(FrameOutput<'a>),
    Validation(&'a ValidationReport),
}

/// Frame replay over one session per source
struct Replay {
    config: EngineConfig,
    sessions: BTreeMap<String, TrackingSession>,
    hub: SourceHub,
    validator: CrossSourceValidator,
    frames: u64,
    rejected: u64,
    malformed: u64,
}

impl Replay {
    fn new(config: EngineConfig) -> Self {
        Self {
            validator: CrossSourceValidator::with_config(config.validation.clone()),
            config,
            sessions: BTreeMap::new(),
            hub: SourceHub::new(),
            frames: 0,
            rejected: 0,
            malformed: 0,
        }
    }

    fn session(&mut self, source: &str) -> &mut TrackingSession {
        if !self.sessions.contains_key(source) {
            self.hub.register_source(source);
            info!(source, "new source");
        }
        let config = &self.config;
        self.sessions
            .entry(source.to_string())
            .or_insert_with(|| TrackingSession::with_config(source, config.clone()))
    }

    /// Process one frame and publish the source's snapshot
    fn ingest(&mut self, input: &SourceFrame) -> Result<FrameReport, FacesignalError> {
        let session = self.session(&input.source);
        let report = session.process_frame(&input.frame)?;
        let snapshot = session.snapshot().clone();
        self.hub.publish(snapshot)?;
        self.frames += 1;
        Ok(report)
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), FacesignalError> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    debug!(?config, "configuration loaded");

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    if !args.json {
        print_header(&args.input);
    }

    let mut replay = Replay::new(config);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let input = match parse_line(line) {
            Ok(input) => input,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "skipping malformed line");
                replay.malformed += 1;
                continue;
            }
        };

        match replay.ingest(&input) {
            Ok(report) => print_frame(&input.source, &report, args)?,
            Err(FacesignalError::Frame(_)) => {
                replay.rejected += 1;
                continue;
            }
            Err(e) => return Err(e),
        }

        if args.validate_every > 0 && replay.frames % args.validate_every == 0 && replay.hub.len() > 1 {
            let report = replay.validator.validate(&replay.hub);
            print_validation(&report, args)?;
        }
    }

    if replay.hub.len() > 1 {
        let report = replay.validator.validate(&replay.hub);
        print_validation(&report, args)?;
    }

    if !args.json {
        print_footer(replay);
    }
    Ok(())
}

fn print_header(input: &str) {
    let source = if input == "-" { "stdin" } else { input };
    println!("{}", "========================================".bold());
    println!("{}", format!("  facesignal v{} - {}", VERSION, source).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn print_frame(source: &str, report: &FrameReport, args: &Args) -> Result<(), FacesignalError> {
    if args.json {
        let line = JsonLine::Frame(FrameOutput { source, report });
        println!("{}", serde_json::to_string(&line)?);
        return Ok(());
    }

    let mut events = Vec::new();
    for id in &report.new_tracks {
        events.push(format!("+{}", id).green().to_string());
    }
    for id in &report.dropped_tracks {
        events.push(format!("-{}", id).red().to_string());
    }

    println!(
        "[{}] t={:.3} faces={} {}",
        source.cyan(),
        report.timestamp,
        report.faces.len(),
        events.join(" ")
    );

    for face in &report.faces {
        print_face(face, args.verbose);
    }
    Ok(())
}

fn print_face(face: &FaceSignals, verbose: bool) {
    let pose = &face.geometry.head_pose;
    let blinks = face.synchronized_blink_count;
    let expression = face.expression_label().unwrap_or("-");

    println!(
        "  #{} {} blinks={} pose={} gaze={} stability={:.2}",
        face.track_id,
        expression.yellow(),
        blinks,
        pose.orientation,
        face.geometry.gaze.direction,
        face.quadrants.overall_stability()
    );

    for blink in &face.blinks {
        println!(
            "    {} {:?} blink ({:.0} ms)",
            "*".blue(),
            blink.kind,
            blink.duration * 1000.0
        );
    }
    if let Some(event) = face.micro.as_ref().and_then(|m| m.detected.as_ref()) {
        println!(
            "    {} micro-expression {} ({:.0} ms)",
            "!".magenta(),
            event.label,
            event.duration * 1000.0
        );
    }

    if !verbose {
        return;
    }

    println!(
        "    yaw={:.1} pitch={:.1} roll={:.1} speed={:.1}px/s size={:?}",
        pose.yaw, pose.pitch, pose.roll, face.speed, face.placement.size
    );
    if let Some(eyes) = &face.eyes {
        println!(
            "    eyes L={} ({:.2}) R={} ({:.2}) asym={:.2} sync={}",
            eyes.left.status(),
            eyes.left.ear,
            eyes.right.status(),
            eyes.right.ear,
            eyes.asymmetry,
            eyes.synchronized
        );
    }
    if let Some(micro) = &face.micro {
        println!("    {} | stability={:.2}", micro.pattern, micro.stability);
    }
    if let Some(motion) = &face.eye_motion {
        println!(
            "    gaze pattern={:?} saccades={} fixations={}",
            motion.pattern, motion.saccade_count, motion.fixation_count
        );
    }
    if let Some(mouth) = &face.mouth {
        println!("    mouth {:?} ratio={:.2}", mouth.state, mouth.opening_ratio);
    }
}

fn print_validation(report: &ValidationReport, args: &Args) -> Result<(), FacesignalError> {
    if args.json {
        println!("{}", serde_json::to_string(&JsonLine::Validation(report))?);
        return Ok(());
    }

    println!();
    println!("{}", "Cross-source validation".bold());
    for result in &report.results {
        let status = match result.status {
            ValidationStatus::Validated => result.status.to_string().green(),
            ValidationStatus::NeedsReview => result.status.to_string().yellow(),
        };
        println!(
            "  {} confidence={:.2} faces_match={} {}",
            result.pair_key(),
            result.confidence,
            result.face_count_match,
            status
        );
    }
    let s = &report.summary;
    println!(
        "  runs={} comparisons={} validated={} needs_review={} mean_confidence={:.2}",
        s.runs, s.total_comparisons, s.validated, s.needs_review, s.average_confidence
    );
    println!();
    Ok(())
}

fn print_footer(replay: Replay) {
    println!();
    println!(
        "{} {} frames, {} rejected, {} malformed",
        "Done.".bold(),
        replay.frames,
        replay.rejected,
        replay.malformed
    );
    for (source, session) in replay.sessions {
        let stats = session.drop_session();
        println!(
            "  [{}] frames={} unique_faces={} max_simultaneous={} duration={:.1}s faces/s={:.2}",
            source.as_str().cyan(),
            stats.frames_processed,
            stats.unique_faces_seen,
            stats.max_faces_simultaneous,
            stats.session_duration(),
            stats.avg_faces_per_second()
        );
    }
}
