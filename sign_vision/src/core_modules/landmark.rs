// THEORY:
// The `landmark` module is the lowest layer of the engine. It defines the raw
// geometry handed to us by the external hand tracker: 21 normalized points laid
// out in a fixed anatomical order. Everything above this layer reasons about
// fingers by index into this topology, so the indices live here and nowhere else.
//
// Key architectural principles:
// 1.  **Validated Construction**: A `HandFrame` can only be built from exactly 21
//     finite points. A malformed tracker payload is rejected at the boundary with a
//     `FrameError`, so higher layers never have to bounds-check.
// 2.  **Immutability**: Once constructed, a frame is never mutated. It lives for a
//     single classification pass and is then dropped; the engine keeps no frame
//     history.
// 3.  **Dumb Data Container**: Like a `Pixel`, a `Landmark` knows nothing about its
//     neighbours. Pairwise helpers (`manhattan_distance`) are provided because the
//     classifier compares fingertip positions constantly.

use std::fmt;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Edges drawn by an overlay renderer: each finger as a chain from the wrist,
/// then the knuckle line across the palm.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, RING_MCP), (RING_MCP, PINKY_MCP),
];

/// A single tracked point. `x` and `y` are normalized to the camera frame,
/// with `y` growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth, when the tracker provides one. Unused by the classifier.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// City-block distance in the image plane.
    pub fn manhattan_distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }
}

/// Why a tracker payload could not become a `HandFrame`.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The payload did not contain exactly `LANDMARK_COUNT` points.
    WrongLandmarkCount(usize),
    /// A coordinate was NaN or infinite.
    NonFiniteCoordinate { index: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::WrongLandmarkCount(count) => {
                write!(f, "expected {} hand landmarks, got {}", LANDMARK_COUNT, count)
            }
            FrameError::NonFiniteCoordinate { index } => {
                write!(f, "landmark {} has a non-finite coordinate", index)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// One validated, immutable hand observation.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: &[Landmark]) -> Result<Self, FrameError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| FrameError::WrongLandmarkCount(points.len()))?;
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(FrameError::NonFiniteCoordinate { index });
        }
        Ok(Self { landmarks })
    }

    /// Returns the landmark at a topology index (see the constants above).
    pub fn point(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}

impl TryFrom<&[Landmark]> for HandFrame {
    type Error = FrameError;

    fn try_from(points: &[Landmark]) -> Result<Self, Self::Error> {
        HandFrame::new(points)
    }
}
