// THEORY:
// The `stabilizer` is the temporal layer of the engine. The classifier is
// stateless and happily flickers between labels as a hand jitters; the stabilizer
// adds memory so that only a label held for several consecutive frames reaches
// consumers.
//
// Key architectural principles:
// 1.  **Run-Length Debounce**: The state is just the last label and how many frames
//     in a row it has been seen. A label is confirmed when its run reaches the
//     confirmation threshold (3 by default), and an event is emitted on that frame
//     only.
// 2.  **Pure Transition**: `StabilizerState::transition` takes the state by value and
//     returns the next state plus an optional event. There is no hidden mutable
//     state, so every sequence of frames can be replayed in a unit test.
// 3.  **Reset Semantics**: Losing the hand, a frame no rule recognises, or any change
//     of label ends the current run and clears the confirmed gesture. A fresh run
//     has to earn confirmation from scratch.
// 4.  **Idempotent Hold**: While a confirmed label keeps repeating, no further events
//     are emitted, but the confirmed label stays readable for live display.

use crate::core_modules::gesture::{Gesture, GestureMatch};
use tracing::{debug, trace};

/// Consecutive identical classifications required before a gesture is confirmed.
pub const DEFAULT_CONFIRMATION_FRAMES: u32 = 3;

/// Emitted exactly once per run, on the frame the run reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilizedGestureEvent {
    pub gesture: Gesture,
    pub confidence: f64,
}

/// The externally readable view: the confirmed gesture, or nothing while unconfirmed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrentGesture {
    pub gesture: Option<Gesture>,
    pub confidence: f64,
}

impl From<StabilizedGestureEvent> for CurrentGesture {
    fn from(event: StabilizedGestureEvent) -> Self {
        Self {
            gesture: Some(event.gesture),
            confidence: event.confidence,
        }
    }
}

/// Run-length summary carried between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilizerState {
    pub last_gesture: Option<Gesture>,
    pub run_length: u32,
    /// Set once the current run has been confirmed.
    pub confirmed: Option<StabilizedGestureEvent>,
}

impl StabilizerState {
    /// Advances the state by one frame. `observation` is `None` when no hand was
    /// detected; a match without a gesture is handled the same way.
    pub fn transition(
        self,
        observation: Option<&GestureMatch>,
        threshold: u32,
    ) -> (Self, Option<StabilizedGestureEvent>) {
        let threshold = threshold.max(1);

        let (gesture, confidence) = match observation {
            Some(GestureMatch {
                gesture: Some(gesture),
                confidence,
            }) => (*gesture, *confidence),
            _ => {
                if self.last_gesture.is_some() {
                    trace!(previous = ?self.last_gesture, "run reset: no gesture");
                }
                return (Self::default(), None);
            }
        };

        let mut next = if self.last_gesture == Some(gesture) {
            Self {
                run_length: self.run_length.saturating_add(1),
                ..self
            }
        } else {
            if self.last_gesture.is_some() {
                trace!(previous = ?self.last_gesture, next = %gesture, "run reset: label changed");
            }
            Self {
                last_gesture: Some(gesture),
                run_length: 1,
                confirmed: None,
            }
        };

        if next.run_length == threshold {
            let event = StabilizedGestureEvent {
                gesture,
                confidence,
            };
            debug!(gesture = %gesture, confidence, frames = threshold, "gesture confirmed");
            next.confirmed = Some(event);
            return (next, Some(event));
        }

        (next, None)
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    pub fn current(&self) -> CurrentGesture {
        self.confirmed.map(CurrentGesture::from).unwrap_or_default()
    }
}

/// Owns a `StabilizerState` for a single tracking session.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    state: StabilizerState,
    threshold: u32,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRMATION_FRAMES)
    }
}

impl Stabilizer {
    pub fn new(threshold: u32) -> Self {
        Self {
            state: StabilizerState::default(),
            threshold: threshold.max(1),
        }
    }

    pub fn update(&mut self, observation: Option<&GestureMatch>) -> Option<StabilizedGestureEvent> {
        let (next, event) = self.state.transition(observation, self.threshold);
        self.state = next;
        event
    }

    pub fn reset(&mut self) {
        self.state = StabilizerState::default();
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn current(&self) -> CurrentGesture {
        self.state.current()
    }
}
