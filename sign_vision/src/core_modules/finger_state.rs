// THEORY:
// The `finger_state` module is the geometry extractor. It turns a validated
// `HandFrame` into the handful of boolean features the classifier reasons about:
// which of the five fingers are straightened.
//
// Key architectural principles:
// 1.  **Vertical Heuristic for Fingers**: A non-thumb finger is extended when its tip
//     sits strictly above its middle (PIP) joint in image space. Image `y` grows
//     downward, so "above" means a smaller `y`. No joint angles are computed.
// 2.  **Lateral Heuristic for the Thumb**: The thumb opens sideways, so it is judged
//     by the horizontal gap between its tip and the wrist instead.
// 3.  **Purity**: Extraction reads the frame and nothing else. The same frame always
//     yields the same state, which keeps the classifier above it deterministic.
// 4.  **No-Hand Sentinel**: An absent or malformed payload maps to `None` rather than
//     an error, since "no hand" is an ordinary per-frame outcome.

use crate::core_modules::landmark::*;

/// Minimum horizontal thumb-tip to wrist gap for the thumb to count as extended.
pub const THUMB_EXTENSION_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// The bend reference joint. For the thumb this is the IP joint, which the
    /// extension test does not use.
    pub fn middle_joint(self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }
}

/// Per-frame finger features together with the frame they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerExtensionState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
    frame: HandFrame,
}

impl FingerExtensionState {
    pub fn extract(frame: HandFrame) -> Self {
        let finger_up = |finger: Finger| {
            frame.point(finger.tip()).y < frame.point(finger.middle_joint()).y
        };
        let thumb_out =
            (frame.point(THUMB_TIP).x - frame.point(WRIST).x).abs() > THUMB_EXTENSION_THRESHOLD;

        Self {
            thumb: thumb_out,
            index: finger_up(Finger::Index),
            middle: finger_up(Finger::Middle),
            ring: finger_up(Finger::Ring),
            pinky: finger_up(Finger::Pinky),
            frame,
        }
    }

    /// Extracts from an optional raw payload. Missing, empty or malformed input
    /// all produce the no-hand sentinel.
    pub fn from_points(points: Option<&[Landmark]>) -> Option<Self> {
        let frame = HandFrame::new(points?).ok()?;
        Some(Self::extract(frame))
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// Number of extended fingers, 0 through 5.
    pub fn extended_count(&self) -> usize {
        Finger::ALL.iter().filter(|f| self.is_extended(**f)).count()
    }

    /// True when the extended set is exactly `fingers`.
    pub fn only(&self, fingers: &[Finger]) -> bool {
        Finger::ALL
            .iter()
            .all(|f| self.is_extended(*f) == fingers.contains(f))
    }

    /// True when every finger in `fingers` is folded; the rest are unconstrained.
    pub fn folded(&self, fingers: &[Finger]) -> bool {
        fingers.iter().all(|f| !self.is_extended(*f))
    }

    /// True when every finger in `fingers` is extended; the rest are unconstrained.
    pub fn raised(&self, fingers: &[Finger]) -> bool {
        fingers.iter().all(|f| self.is_extended(*f))
    }

    pub fn frame(&self) -> &HandFrame {
        &self.frame
    }

    pub fn point(&self, index: usize) -> &Landmark {
        self.frame.point(index)
    }
}
