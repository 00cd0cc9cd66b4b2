// Synthetic hand poses for demos, replay fixtures and tests. Coordinates roughly
// follow a right hand held in front of the camera with the wrist low in the frame.

use crate::core_modules::finger_state::Finger;
use crate::core_modules::landmark::*;

/// How far above its PIP joint an extended fingertip is placed.
const RAISE: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct PoseBuilder {
    points: [Landmark; LANDMARK_COUNT],
}

impl PoseBuilder {
    /// A closed fist: every finger folded, thumb tucked but clear of the index tip.
    pub fn fist() -> Self {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        let mut put = |i: usize, x: f64, y: f64| points[i] = Landmark::new(x, y);

        put(WRIST, 0.50, 0.80);

        put(THUMB_CMC, 0.47, 0.76);
        put(THUMB_MCP, 0.44, 0.72);
        put(THUMB_IP, 0.42, 0.70);
        put(THUMB_TIP, 0.42, 0.72);

        for (mcp, pip, dip, tip, x, pip_y) in [
            (INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP, 0.45, 0.55),
            (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP, 0.50, 0.55),
            (RING_MCP, RING_PIP, RING_DIP, RING_TIP, 0.55, 0.55),
            (PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP, 0.60, 0.57),
        ] {
            put(mcp, x, pip_y + 0.05);
            put(pip, x, pip_y);
            put(dip, x, pip_y + 0.03);
            put(tip, x, pip_y + 0.05);
        }

        Self { points }
    }

    /// Every finger extended, thumb spread wide.
    pub fn open_palm() -> Self {
        Finger::ALL
            .iter()
            .fold(Self::fist(), |pose, finger| pose.extend(*finger))
    }

    pub fn extend(mut self, finger: Finger) -> Self {
        match finger {
            Finger::Thumb => {
                let wrist = self.points[WRIST];
                self.points[THUMB_IP] = Landmark::new(wrist.x - 0.18, 0.68);
                self.points[THUMB_TIP] = Landmark::new(wrist.x - 0.25, 0.65);
            }
            _ => {
                let pip = self.points[finger.middle_joint()];
                self.points[finger.middle_joint() + 1] = Landmark::new(pip.x, pip.y - RAISE / 2.0);
                self.points[finger.tip()] = Landmark::new(pip.x, pip.y - RAISE);
            }
        }
        self
    }

    pub fn set(mut self, index: usize, x: f64, y: f64) -> Self {
        self.points[index] = Landmark::new(x, y);
        self
    }

    /// Moves only the wrist. The thumb test reads the wrist's `x`, so callers
    /// that extend the thumb should do so after repositioning the wrist.
    pub fn wrist(self, x: f64, y: f64) -> Self {
        self.set(WRIST, x, y)
    }

    pub fn points(&self) -> Vec<Landmark> {
        self.points.to_vec()
    }
}

#[cfg(test)]
impl PoseBuilder {
    pub fn frame(&self) -> HandFrame {
        HandFrame::new(&self.points).expect("synthetic pose is well formed")
    }

    pub fn state(&self) -> crate::core_modules::finger_state::FingerExtensionState {
        crate::core_modules::finger_state::FingerExtensionState::extract(self.frame())
    }
}
