// THEORY:
// The `transcript` module holds the consumer-side helpers that sit downstream of
// confirmed gestures. The engine deliberately re-emits a label every time a new
// run confirms it; deciding whether that is a new word or the same word again is
// the consumer's job, and these helpers encode the usual policy for it.
//
// - `Transcript` keeps a short rolling history of recognised signs.
// - `UtteranceGate` decides whether a label should be spoken again yet.
// - `SentenceBuilder` lets a user assemble recognised words into a sentence.

use crate::core_modules::stabilizer::StabilizedGestureEvent;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Entries kept by a `Transcript`.
pub const TRANSCRIPT_CAPACITY: usize = 10;
/// Events at or below this confidence are not written to the transcript.
pub const TRANSCRIPT_MIN_CONFIDENCE: f64 = 0.6;
/// The same text is not spoken twice within this window.
pub const UTTERANCE_COOLDOWN: Duration = Duration::from_millis(2000);

/// Rolling history of confirmed signs, newest last.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: VecDeque<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a confirmed event. Returns true if it was appended.
    ///
    /// Low-confidence events are skipped, as is a repeat of the latest entry.
    pub fn record(&mut self, event: &StabilizedGestureEvent) -> bool {
        if event.confidence <= TRANSCRIPT_MIN_CONFIDENCE {
            return false;
        }
        let label = event.gesture.as_str();
        if self.entries.back().is_some_and(|last| last == label) {
            return false;
        }
        if self.entries.len() == TRANSCRIPT_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(label.to_string());
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the transcript, returning what it held.
    pub fn take(&mut self) -> Vec<String> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Suppresses repeating the same utterance within `UTTERANCE_COOLDOWN`.
#[derive(Debug, Clone)]
pub struct UtteranceGate {
    cooldown: Duration,
    last: Option<(String, Instant)>,
}

impl Default for UtteranceGate {
    fn default() -> Self {
        Self::new(UTTERANCE_COOLDOWN)
    }
}

impl UtteranceGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Returns true when `text` may be spoken at `now`, and remembers it if so.
    pub fn admit(&mut self, text: &str, now: Instant) -> bool {
        if text.is_empty() {
            return false;
        }
        if let Some((last_text, at)) = &self.last {
            if last_text == text && now.saturating_duration_since(*at) < self.cooldown {
                return false;
            }
        }
        self.last = Some((text.to_string(), now));
        true
    }
}

/// Words picked by the user, in order.
#[derive(Debug, Clone, Default)]
pub struct SentenceBuilder {
    words: Vec<String>,
}

impl SentenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, word: impl Into<String>) {
        self.words.push(word.into());
    }

    /// Removes the word at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.words.len()).then(|| self.words.remove(index))
    }

    /// Moves every transcript entry into the sentence and empties the transcript.
    pub fn absorb(&mut self, transcript: &mut Transcript) {
        self.words.extend(transcript.take());
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The sentence as it would be spoken, or `None` when there is nothing to say.
    pub fn sentence(&self) -> Option<String> {
        (!self.words.is_empty()).then(|| self.words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::gesture::Gesture;

    fn event(gesture: Gesture, confidence: f64) -> StabilizedGestureEvent {
        StabilizedGestureEvent {
            gesture,
            confidence,
        }
    }

    #[test]
    fn transcript_skips_low_confidence_and_repeats() {
        let mut transcript = Transcript::new();
        assert!(transcript.record(&event(Gesture::Hello, 0.8)));
        assert!(!transcript.record(&event(Gesture::Hello, 0.8)));
        // "Yes" carries exactly the cut-off confidence.
        assert!(!transcript.record(&event(Gesture::Yes, 0.6)));
        assert!(transcript.record(&event(Gesture::ILoveYou, 0.9)));
        assert!(transcript.record(&event(Gesture::Hello, 0.8)));
        let entries: Vec<&str> = transcript.entries().collect();
        assert_eq!(entries, vec!["Hello", "I Love You", "Hello"]);
    }

    #[test]
    fn transcript_keeps_only_the_latest_entries() {
        let mut transcript = Transcript::new();
        let letters = [Gesture::A, Gesture::B];
        for i in 0..(TRANSCRIPT_CAPACITY + 3) {
            transcript.record(&event(letters[i % 2], 0.85));
        }
        assert_eq!(transcript.len(), TRANSCRIPT_CAPACITY);
        assert_eq!(transcript.entries().next(), Some("B"));
    }

    #[test]
    fn gate_enforces_cooldown_per_text() {
        let mut gate = UtteranceGate::default();
        let t0 = Instant::now();
        assert!(gate.admit("Hello", t0));
        assert!(!gate.admit("Hello", t0 + Duration::from_millis(500)));
        assert!(gate.admit("Hello", t0 + Duration::from_millis(2500)));
        assert!(gate.admit("Yes", t0 + Duration::from_millis(2600)));
        assert!(gate.admit("Hello", t0 + Duration::from_millis(2700)));
        assert!(!gate.admit("", t0 + Duration::from_secs(10)));
    }

    #[test]
    fn sentence_builder_absorbs_transcript() {
        let mut transcript = Transcript::new();
        transcript.record(&event(Gesture::Hello, 0.8));
        transcript.record(&event(Gesture::ILoveYou, 0.9));

        let mut builder = SentenceBuilder::new();
        assert_eq!(builder.sentence(), None);
        builder.push("Please");
        builder.absorb(&mut transcript);
        assert!(transcript.is_empty());
        assert_eq!(builder.sentence().as_deref(), Some("Please Hello I Love You"));

        assert_eq!(builder.remove(0).as_deref(), Some("Please"));
        assert_eq!(builder.remove(9), None);
        builder.clear();
        assert!(builder.is_empty());
    }
}
