mod overlay;
mod recording;

use anyhow::Context;
use clap::Parser;
use sign_vision::core_modules::stabilizer::DEFAULT_CONFIRMATION_FRAMES;
use sign_vision::core_modules::transcript::{SentenceBuilder, Transcript, UtteranceGate};
use sign_vision::pipeline::{GesturePipeline, PipelineConfig, Report, StabilizedGestureEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use recording::TrackedHands;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "gesture_replayer",
    about = "Replays recorded hand landmarks through the sign_vision pipeline"
)]
struct Cli {
    /// JSON-lines recording, one frame per line
    input: PathBuf,

    /// Consecutive identical frames needed to confirm a gesture
    #[arg(long, env = "SV_CONFIRMATION_FRAMES", default_value_t = DEFAULT_CONFIRMATION_FRAMES)]
    confirmation_frames: u32,

    /// Write a skeleton overlay PNG for every confirmed gesture into this directory
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Do not print utterances
    #[arg(long)]
    muted: bool,

    /// Frame rate the recording was captured at, used to time utterances
    #[arg(long, default_value_t = 30.0, value_parser = parse_fps)]
    fps: f64,

    /// Print confirmed events as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone)]
struct ReplayOptions {
    confirmation_frames: u32,
    snapshot_dir: Option<PathBuf>,
    muted: bool,
    frame_interval: Duration,
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("frame rate must be a positive number, got {value}"))
    }
}

impl TryFrom<&Cli> for ReplayOptions {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> anyhow::Result<Self> {
        let frame_interval = Duration::try_from_secs_f64(1.0 / cli.fps)
            .with_context(|| format!("frame rate {} gives no usable frame interval", cli.fps))?;
        Ok(Self {
            confirmation_frames: cli.confirmation_frames,
            snapshot_dir: cli.snapshot_dir.clone(),
            muted: cli.muted,
            frame_interval,
        })
    }
}

#[derive(Debug, Default)]
struct ReplaySummary {
    /// 1-based frame number and the event confirmed on it.
    events: Vec<(usize, StabilizedGestureEvent)>,
    utterances: Vec<String>,
    transcript: Transcript,
    snapshots: Vec<PathBuf>,
}

fn snapshot_name(frame: usize, event: &StabilizedGestureEvent) -> String {
    let label: String = event
        .gesture
        .as_str()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect();
    format!("frame_{frame:05}_{label}.png")
}

fn replay(frames: &[TrackedHands], options: &ReplayOptions) -> anyhow::Result<ReplaySummary> {
    let mut pipeline = GesturePipeline::new(PipelineConfig {
        confirmation_frames: options.confirmation_frames,
    });
    let mut gate = UtteranceGate::default();
    let mut summary = ReplaySummary::default();
    let start = Instant::now();

    if let Some(dir) = &options.snapshot_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for (index, hands) in frames.iter().enumerate() {
        let number = index + 1;
        let Report::GestureConfirmed(event) = pipeline.process_hands(hands) else {
            continue;
        };
        info!(frame = number, gesture = %event.gesture, confidence = event.confidence, "gesture confirmed");
        summary.events.push((number, event));

        if summary.transcript.record(&event) {
            debug!(entries = summary.transcript.len(), "transcript updated");
        }

        let now = start + options.frame_interval * index as u32;
        if !options.muted && gate.admit(event.gesture.as_str(), now) {
            summary.utterances.push(event.gesture.as_str().to_string());
        }

        if let (Some(dir), Some(points)) = (&options.snapshot_dir, hands.first()) {
            let path = dir.join(snapshot_name(number, &event));
            let image = overlay::render(points, overlay::OVERLAY_SIZE);
            overlay::save(&path, &image).with_context(|| format!("writing {}", path.display()))?;
            summary.snapshots.push(path);
        }
    }

    info!(
        frames = pipeline.frames_processed(),
        confirmed = summary.events.len(),
        "replay complete"
    );
    Ok(summary)
}

fn print_summary(summary: &ReplaySummary, json: bool) -> anyhow::Result<()> {
    for (frame, event) in &summary.events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!(
                "frame {frame}: {} ({:.2}) - {}",
                event.gesture,
                event.confidence,
                event.gesture.description()
            );
        }
    }
    for text in &summary.utterances {
        println!("say: {text}");
    }

    let mut sentence = SentenceBuilder::new();
    let mut transcript = summary.transcript.clone();
    sentence.absorb(&mut transcript);
    if let Some(text) = sentence.sentence() {
        println!("transcript: {text}");
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let frames = recording::read_recording(&cli.input)?;
    info!(frames = frames.len(), input = %cli.input.display(), "recording loaded");
    let summary = replay(&frames, &ReplayOptions::try_from(cli)?)?;
    print_summary(&summary, cli.json)?;
    if let Some(dir) = &cli.snapshot_dir {
        println!("{} overlay(s) saved to {}", summary.snapshots.len(), dir.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_replayer=info,sign_vision=info".into()),
        )
        .init();

    info!("gesture_replayer v{} starting", env!("CARGO_PKG_VERSION"));
    run(&cli)
}
