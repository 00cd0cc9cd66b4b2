// Recordings are JSON lines, one frame per line. A line holds one hand as a list
// of landmark objects, several hands as a list of such lists, or `null` / `[]`
// when the tracker saw nothing. Blank lines are ignored. Every hand is kept; the
// pipeline decides which one to classify.

use anyhow::Context;
use serde::Deserialize;
use sign_vision::core_modules::landmark::Landmark;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedFrame {
    Hands(Vec<Vec<Landmark>>),
    Hand(Vec<Landmark>),
}

/// The hands seen in one frame, in tracker order. Empty when nothing was seen.
pub type TrackedHands = Vec<Vec<Landmark>>;

impl RecordedFrame {
    fn into_hands(self) -> TrackedHands {
        let hands = match self {
            RecordedFrame::Hands(hands) => hands,
            RecordedFrame::Hand(hand) => vec![hand],
        };
        hands.into_iter().filter(|points| !points.is_empty()).collect()
    }
}

pub fn parse_line(line: &str) -> anyhow::Result<TrackedHands> {
    let frame: Option<RecordedFrame> = serde_json::from_str(line)?;
    Ok(frame.map(RecordedFrame::into_hands).unwrap_or_default())
}

pub fn parse_recording(reader: impl BufRead) -> anyhow::Result<Vec<TrackedHands>> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = parse_line(&line).with_context(|| format!("parsing line {}", index + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn read_recording(path: &Path) -> anyhow::Result<Vec<TrackedHands>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_recording(BufReader::new(file))
}
