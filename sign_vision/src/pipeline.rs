// THEORY:
// The `pipeline` module is the top-level, synchronous API of the engine. It
// chains the three layers for one frame at a time:
//
//   raw landmarks -> FingerExtensionState -> GestureMatch -> Stabilizer -> Report
//
// The caller owns the `GesturePipeline` and is the only thing that ever mutates its
// stabilizer, which gives the single-writer, arrival-order guarantee for free. The
// pipeline never blocks and never fails: a missing or malformed frame is an
// ordinary "no hand" observation.

use crate::core_modules::classifier;
use crate::core_modules::finger_state::FingerExtensionState;
use crate::core_modules::landmark::{HandFrame, Landmark};
use crate::core_modules::stabilizer::{DEFAULT_CONFIRMATION_FRAMES, Stabilizer};
use tracing::{debug, trace};

// Re-export key data structures for the public API.
pub use crate::core_modules::gesture::{Gesture, GestureMatch};
pub use crate::core_modules::stabilizer::{CurrentGesture, StabilizedGestureEvent};

/// Configuration for the GesturePipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Consecutive identical classifications needed to confirm a gesture.
    /// Values below 1 are treated as 1.
    pub confirmation_frames: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confirmation_frames: DEFAULT_CONFIRMATION_FRAMES,
        }
    }
}

/// The primary output of the pipeline for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    NoConfirmedGesture,
    GestureConfirmed(StabilizedGestureEvent),
}

impl Report {
    pub fn event(&self) -> Option<&StabilizedGestureEvent> {
        match self {
            Report::GestureConfirmed(event) => Some(event),
            Report::NoConfirmedGesture => None,
        }
    }
}

/// Everything the pipeline learned from one frame, for callers that want more than
/// the report (live displays, logging).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub hand_detected: bool,
    pub observation: GestureMatch,
    pub report: Report,
    pub current: CurrentGesture,
}

pub struct GesturePipeline {
    config: PipelineConfig,
    stabilizer: Stabilizer,
    frames_processed: u64,
}

impl Default for GesturePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl GesturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            stabilizer: Stabilizer::new(config.confirmation_frames),
            config,
            frames_processed: 0,
        }
    }

    /// Processes one frame's raw landmarks. `None` or an empty slice means no hand.
    pub fn analyze(&mut self, points: Option<&[Landmark]>) -> FrameAnalysis {
        let hand = match points.filter(|p| !p.is_empty()).map(HandFrame::new) {
            Some(Ok(frame)) => Some(FingerExtensionState::extract(frame)),
            Some(Err(error)) => {
                debug!(%error, "malformed hand frame treated as no hand");
                None
            }
            None => None,
        };
        self.analyze_hand(hand)
    }

    /// Processes an already validated frame.
    pub fn analyze_frame(&mut self, frame: Option<HandFrame>) -> FrameAnalysis {
        self.analyze_hand(frame.map(FingerExtensionState::extract))
    }

    fn analyze_hand(&mut self, hand: Option<FingerExtensionState>) -> FrameAnalysis {
        self.frames_processed += 1;

        // Stage 1: Classification
        let observation = classifier::classify_frame(hand.as_ref());
        trace!(frame = self.frames_processed, gesture = ?observation.gesture, "classified");

        // Stage 2: Temporal Stabilization
        let report = match self.stabilizer.update(Some(&observation)) {
            Some(event) => Report::GestureConfirmed(event),
            None => Report::NoConfirmedGesture,
        };

        FrameAnalysis {
            hand_detected: hand.is_some(),
            observation,
            report,
            current: self.stabilizer.current(),
        }
    }

    pub fn generate_report(&mut self, points: Option<&[Landmark]>) -> Report {
        self.analyze(points).report
    }

    /// Classifies the first of possibly several tracked hands; the others are ignored.
    pub fn process_hands<H: AsRef<[Landmark]>>(&mut self, hands: &[H]) -> Report {
        self.generate_report(hands.first().map(AsRef::as_ref))
    }

    pub fn gesture_confirmed(&mut self, points: Option<&[Landmark]>) -> bool {
        matches!(self.generate_report(points), Report::GestureConfirmed(_))
    }

    /// The latest confirmed gesture, or an empty view while unconfirmed.
    pub fn current_state(&self) -> CurrentGesture {
        self.stabilizer.current()
    }

    /// Drops any run in progress so the next frame starts unconfirmed.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::finger_state::Finger;
    use crate::poses::PoseBuilder;

    fn run(pipeline: &mut GesturePipeline, frames: &[Option<Vec<Landmark>>]) -> Vec<(usize, Gesture)> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                pipeline
                    .generate_report(f.as_deref())
                    .event()
                    .map(|e| (i + 1, e.gesture))
            })
            .collect()
    }

    #[test]
    fn open_palm_confirms_hello_on_third_frame() {
        let palm = Some(PoseBuilder::open_palm().points());
        let mut pipeline = GesturePipeline::default();
        let events = run(&mut pipeline, &[palm.clone(), palm.clone(), palm.clone(), palm]);
        assert_eq!(events, vec![(3, Gesture::Hello)]);
        assert_eq!(
            pipeline.current_state(),
            CurrentGesture {
                gesture: Some(Gesture::Hello),
                confidence: 0.8
            }
        );
        assert_eq!(pipeline.frames_processed(), 4);
    }

    #[test]
    fn malformed_frame_resets_like_hand_loss() {
        let fist = Some(PoseBuilder::fist().points());
        let broken = Some(PoseBuilder::fist().points()[..12].to_vec());
        let mut pipeline = GesturePipeline::default();
        let events = run(
            &mut pipeline,
            &[fist.clone(), fist.clone(), broken, fist.clone(), fist.clone(), fist],
        );
        assert_eq!(events, vec![(6, Gesture::Yes)]);
    }

    #[test]
    fn missing_frame_reports_empty_state() {
        let mut pipeline = GesturePipeline::default();
        let analysis = pipeline.analyze(None);
        assert!(!analysis.hand_detected);
        assert_eq!(analysis.observation, GestureMatch::none());
        assert_eq!(analysis.report, Report::NoConfirmedGesture);
        assert_eq!(analysis.current, CurrentGesture::default());

        let analysis = pipeline.analyze(Some(&[]));
        assert!(!analysis.hand_detected);
    }

    #[test]
    fn switching_signs_needs_a_fresh_run() {
        let v = Some(PoseBuilder::fist().extend(Finger::Index).extend(Finger::Middle).points());
        let u = Some(
            PoseBuilder::fist()
                .extend(Finger::Index)
                .extend(Finger::Middle)
                .set(crate::core_modules::landmark::MIDDLE_TIP, 0.47, 0.40)
                .points(),
        );
        let mut pipeline = GesturePipeline::default();
        let events = run(
            &mut pipeline,
            &[v.clone(), v.clone(), u.clone(), u.clone(), u, v.clone(), v.clone(), v],
        );
        assert_eq!(events, vec![(5, Gesture::U), (8, Gesture::V)]);
    }

    #[test]
    fn only_the_first_hand_is_classified() {
        let mut pipeline = GesturePipeline::default();
        let hands = vec![PoseBuilder::open_palm().points(), PoseBuilder::fist().points()];
        pipeline.process_hands(&hands);
        pipeline.process_hands(&hands);
        let report = pipeline.process_hands(&hands);
        assert_eq!(report.event().map(|e| e.gesture), Some(Gesture::Hello));

        let none: Vec<Vec<Landmark>> = Vec::new();
        assert_eq!(pipeline.process_hands(&none), Report::NoConfirmedGesture);
        assert_eq!(pipeline.current_state(), CurrentGesture::default());
    }

    #[test]
    fn reset_discards_partial_runs() {
        let palm = PoseBuilder::open_palm().points();
        let mut pipeline = GesturePipeline::new(PipelineConfig {
            confirmation_frames: 3,
        });
        assert!(!pipeline.gesture_confirmed(Some(&palm)));
        assert!(!pipeline.gesture_confirmed(Some(&palm)));
        pipeline.reset();
        assert!(!pipeline.gesture_confirmed(Some(&palm)));
        assert!(!pipeline.gesture_confirmed(Some(&palm)));
        assert!(pipeline.gesture_confirmed(Some(&palm)));
    }

    #[test]
    fn validated_frames_take_the_same_path() {
        let frame = PoseBuilder::fist().extend(Finger::Thumb).frame();
        let mut pipeline = GesturePipeline::new(PipelineConfig {
            confirmation_frames: 1,
        });
        let analysis = pipeline.analyze_frame(Some(frame));
        assert_eq!(analysis.observation, GestureMatch::new(Gesture::A, 0.85));
        assert_eq!(analysis.report.event().map(|e| e.gesture), Some(Gesture::A));
    }
}
