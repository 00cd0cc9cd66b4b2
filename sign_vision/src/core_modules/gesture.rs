// THEORY:
// The `gesture` module holds the engine's output vocabulary. Every label the
// classifier can produce is a variant of `Gesture`, so downstream consumers match
// on a closed set instead of comparing free-form strings. The display string of a
// variant is what speech and transcript consumers receive.

use std::fmt;

/// Every sign the rule cascade knows how to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    A,
    B,
    C,
    D,
    I,
    J,
    L,
    O,
    U,
    V,
    Y,
    Z,
    ILoveYou,
    Hello,
    Yes,
    No,
    Please,
    Drink,
    Rain,
    Eat,
    Thirsty,
    Say,
    Maybe,
    DontKnow,
    Forget,
    Walk,
    Shirt,
    Book,
    Look,
    How,
}

impl Gesture {
    /// The label spoken aloud and written to transcripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::I => "I",
            Self::J => "J",
            Self::L => "L",
            Self::O => "O",
            Self::U => "U",
            Self::V => "V",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::ILoveYou => "I Love You",
            Self::Hello => "Hello",
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Please => "Please",
            Self::Drink => "Drink",
            Self::Rain => "Rain",
            Self::Eat => "Eat",
            Self::Thirsty => "Thirsty",
            Self::Say => "Say",
            Self::Maybe => "Maybe",
            Self::DontKnow => "Don't Know",
            Self::Forget => "Forget",
            Self::Walk => "Walk",
            Self::Shirt => "Shirt",
            Self::Book => "Book",
            Self::Look => "Look",
            Self::How => "How",
        }
    }

    /// A short description of the pose, for a user-facing guide.
    pub fn description(&self) -> &'static str {
        match self {
            Self::A => "Fist with thumb up",
            Self::B => "All fingers up, thumb folded",
            Self::C => "Curved hand shape",
            Self::D => "Index up, thumb touching middle finger",
            Self::I => "Pinky up",
            Self::J => "Pinky up, hand tilted",
            Self::L => "Index & thumb extended (L shape)",
            Self::O => "Fingertips curled to touch thumb",
            Self::U => "Index & middle up, together",
            Self::V => "Peace sign",
            Self::Y => "Thumb & pinky extended",
            Self::Z => "Index pointing, hand tilted",
            Self::ILoveYou => "Thumb, index & pinky extended",
            Self::Hello => "Open palm, all fingers spread",
            Self::Yes => "Closed fist",
            Self::No => "Index & middle together",
            Self::Please => "Open palm near chest",
            Self::Drink => "Thumb to mouth",
            Self::Rain => "Fingers pointing down",
            Self::Eat => "Fingertips bunched at mouth",
            Self::Thirsty => "Index pointing down at throat",
            Self::Say => "Index near mouth",
            Self::Maybe => "Flat hand at mid height",
            Self::DontKnow => "Hand at forehead",
            Self::Forget => "Hand sweeping out from forehead",
            Self::Walk => "Two fingers pointing down",
            Self::Shirt => "Pinching at chest",
            Self::Book => "Flat hand opening at mid height",
            Self::Look => "V fingers pointing at eyes",
            Self::How => "Curved hand low in frame",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        crate::core_modules::classifier::CASCADE
            .iter()
            .map(|rule| rule.gesture)
            .find(|g| g.as_str() == label)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Gesture {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Gesture {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Gesture::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown gesture label {:?}", label)))
    }
}

/// The raw, per-frame classifier output. `gesture` is `None` when no hand was
/// seen or no rule fired; `confidence` is then 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureMatch {
    pub gesture: Option<Gesture>,
    pub confidence: f64,
}

impl GestureMatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(gesture: Gesture, confidence: f64) -> Self {
        Self {
            gesture: Some(gesture),
            confidence,
        }
    }

    pub fn is_match(&self) -> bool {
        self.gesture.is_some()
    }
}
