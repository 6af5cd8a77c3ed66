//! Geometry Extractor
//!
//! Converts one frame of 21 hand landmarks into per-finger curl and
//! direction measurements.
//!
//! Landmark layout (MediaPipe / TF.js handpose ordering):
//! - 0: wrist
//! - 1..=4: thumb CMC, MCP, IP, TIP
//! - 5..=8, 9..=12, 13..=16, 17..=20: index, middle, ring, pinky MCP, PIP, DIP, TIP
//!
//! Curl is the accumulated bend along the finger's joint chain, normalized by
//! the bend of a fully curled finger. Angles do not change with hand size or
//! hand rotation. Direction is the unit vector from the finger base to its tip
//! in a y-up viewer frame.

use serde::{Deserialize, Serialize};

use crate::curve::CurveLibrary;
use crate::error::{GestureError, Result};
use crate::types::{
    angle_between_degrees, dot, norm, Finger, FingerCurl, FingerDirection, Landmark, EPSILON,
    FINGER_COUNT, LANDMARK_COUNT, MIDDLE_MCP, WRIST,
};

// ==================== Constants ====================

/// Accumulated bend (degrees) of a fully curled index..pinky finger
pub const FINGER_FULL_CURL_DEGREES: f64 = 240.0;

/// Accumulated bend (degrees) of a fully curled thumb
pub const THUMB_FULL_CURL_DEGREES: f64 = 130.0;

/// Smallest segment allowed, as a fraction of the palm length
const MIN_SEGMENT_RATIO: f64 = 0.01;

/// Largest segment allowed, as a multiple of the palm length
const MAX_SEGMENT_RATIO: f64 = 5.0;

/// Index, middle, ring and pinky MCP, across the palm
const KNUCKLES: [usize; 4] = [5, 9, 13, 17];

/// Allowed wrist-to-knuckle distance, in palm lengths
const KNUCKLE_REACH_RATIO: (f64, f64) = (0.6, 1.4);

/// Largest gap between neighbouring knuckles, in palm lengths
const MAX_KNUCKLE_GAP_RATIO: f64 = 0.6;

// ==================== Direction ====================

/// Unit pointing vector in a viewer frame: x right, y up, z toward the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DirectionVector {
    /// Normalizes the input; a zero vector stays zero
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let n = norm([x, y, z]);
        if n < EPSILON {
            return Self { x: 0.0, y: 0.0, z: 0.0 };
        }
        Self {
            x: x / n,
            y: y / n,
            z: z / n,
        }
    }

    /// In-plane unit vector at the given azimuth
    pub fn from_azimuth_degrees(azimuth: f64) -> Self {
        let rad = azimuth.to_radians();
        Self::new(rad.cos(), rad.sin(), 0.0)
    }

    /// Azimuth in the image plane, degrees in `[0, 360)`, counter-clockwise from +x
    pub fn azimuth_degrees(&self) -> f64 {
        self.y.atan2(self.x).to_degrees().rem_euclid(360.0)
    }

    /// Length of the in-plane component, 1 for a vector lying in the image plane
    pub fn planarity(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

// ==================== Finger / Hand Geometry ====================

/// Measurements for one finger in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FingerGeometry {
    /// Normalized bend in `[0, 1]`, 0 = straight
    pub curl: f64,
    /// Base-to-tip pointing direction
    pub direction: DirectionVector,
}

/// Measurements for all five fingers of one hand in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandGeometry {
    fingers: [FingerGeometry; FINGER_COUNT],
}

/// Best category per finger, for overlays and debugging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerPoseSummary {
    pub finger: Finger,
    pub curl: Option<FingerCurl>,
    pub curl_score: f64,
    pub direction: Option<FingerDirection>,
    pub direction_score: f64,
}

impl HandGeometry {
    pub fn new(fingers: [FingerGeometry; FINGER_COUNT]) -> Self {
        Self { fingers }
    }

    /// Build geometry directly from measurements, indexed by `Finger::index`
    pub fn from_measurements(curls: [f64; FINGER_COUNT], directions: [DirectionVector; FINGER_COUNT]) -> Self {
        let fingers = std::array::from_fn(|i| FingerGeometry {
            curl: curls[i].clamp(0.0, 1.0),
            direction: directions[i],
        });
        Self { fingers }
    }

    pub fn finger(&self, finger: Finger) -> &FingerGeometry {
        &self.fingers[finger.index()]
    }

    /// Replace one finger's measurements
    pub fn with_finger(mut self, finger: Finger, geometry: FingerGeometry) -> Self {
        self.fingers[finger.index()] = geometry;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, &FingerGeometry)> {
        Finger::ALL.into_iter().zip(self.fingers.iter())
    }

    /// Highest-scoring curl and direction category for each finger.
    ///
    /// Categories missing from the library are skipped.
    pub fn pose_summary(&self, library: &CurveLibrary) -> Vec<FingerPoseSummary> {
        self.iter()
            .map(|(finger, geometry)| {
                let (curl, curl_score) = best_of(
                    FingerCurl::ALL
                        .into_iter()
                        .filter_map(|c| library.curl_score(geometry.curl, c).ok().map(|s| (c, s))),
                );
                let (direction, direction_score) = best_of(
                    FingerDirection::ALL.into_iter().filter_map(|d| {
                        library
                            .direction_score(&geometry.direction, d)
                            .ok()
                            .map(|s| (d, s))
                    }),
                );
                FingerPoseSummary {
                    finger,
                    curl,
                    curl_score,
                    direction,
                    direction_score,
                }
            })
            .collect()
    }
}

fn best_of<T: Copy>(scored: impl Iterator<Item = (T, f64)>) -> (Option<T>, f64) {
    let mut best: (Option<T>, f64) = (None, 0.0);
    for (item, score) in scored {
        if best.0.is_none() || score > best.1 {
            best = (Some(item), score);
        }
    }
    best
}

// ==================== Extractor ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Landmarks use image coordinates with y growing downward
    pub image_y_down: bool,
    /// Flip x, for mirrored (selfie) camera feeds
    pub mirror_x: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            image_y_down: true,
            mirror_x: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeometryExtractor {
    config: ExtractorConfig,
}

impl GeometryExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Measure curl and direction for every finger.
    ///
    /// Fails with `InvalidLandmarkSet` when the frame does not have exactly 21
    /// finite points or its shape is not a plausible hand.
    pub fn extract(&self, landmarks: &[Landmark]) -> Result<HandGeometry> {
        validate_landmarks(landmarks)?;

        let palm_axis = landmarks[WRIST].to(&landmarks[MIDDLE_MCP]);
        let mut fingers = [FingerGeometry {
            curl: 0.0,
            direction: DirectionVector::from_azimuth_degrees(90.0),
        }; FINGER_COUNT];

        let lateral = palm_lateral_axis(landmarks, palm_axis);

        for finger in Finger::ALL {
            let chain = finger.landmark_chain();
            let bones: Vec<[f64; 3]> = chain
                .windows(2)
                .map(|pair| landmarks[pair[0]].to(&landmarks[pair[1]]))
                .collect();

            let mut bend: f64 = bones
                .windows(2)
                .map(|w| angle_between_degrees(w[0], w[1]))
                .sum();
            if finger != Finger::Thumb {
                // Only flexion at the knuckle counts; sideways spread is not curl
                let proximal = match lateral {
                    Some(axis) => without_component(bones[0], axis),
                    None => bones[0],
                };
                bend += angle_between_degrees(palm_axis, proximal);
            }
            let full = match finger {
                Finger::Thumb => THUMB_FULL_CURL_DEGREES,
                _ => FINGER_FULL_CURL_DEGREES,
            };

            let [dx, dy, dz] = landmarks[chain[0]].to(&landmarks[chain[3]]);
            fingers[finger.index()] = FingerGeometry {
                curl: (bend / full).clamp(0.0, 1.0),
                direction: self.to_viewer_frame(dx, dy, dz),
            };
        }

        Ok(HandGeometry::new(fingers))
    }

    fn to_viewer_frame(&self, dx: f64, dy: f64, dz: f64) -> DirectionVector {
        let x = if self.config.mirror_x { -dx } else { dx };
        let y = if self.config.image_y_down { -dy } else { dy };
        DirectionVector::new(x, y, dz)
    }
}

/// Unit vector across the palm (index knuckle towards pinky knuckle),
/// orthogonal to the palm axis. `None` when the knuckles line up with it.
fn palm_lateral_axis(landmarks: &[Landmark], palm_axis: [f64; 3]) -> Option<[f64; 3]> {
    let across = landmarks[KNUCKLES[0]].to(&landmarks[KNUCKLES[3]]);
    let palm_len = norm(palm_axis);
    let unit = palm_axis.map(|c| c / palm_len);
    let lateral = without_component(across, unit);
    let len = norm(lateral);
    (len > EPSILON * palm_len).then(|| lateral.map(|c| c / len))
}

/// `v` minus its projection on the unit vector `axis`
fn without_component(v: [f64; 3], axis: [f64; 3]) -> [f64; 3] {
    let along = dot(v, axis);
    [v[0] - along * axis[0], v[1] - along * axis[1], v[2] - along * axis[2]]
}

fn validate_landmarks(landmarks: &[Landmark]) -> Result<()> {
    if landmarks.len() != LANDMARK_COUNT {
        return Err(GestureError::InvalidLandmarkSet(format!(
            "expected {} landmarks, got {}",
            LANDMARK_COUNT,
            landmarks.len()
        )));
    }

    if let Some(idx) = landmarks.iter().position(|p| !p.is_finite()) {
        return Err(GestureError::InvalidLandmarkSet(format!(
            "landmark {idx} has a non-finite coordinate"
        )));
    }

    let palm = landmarks[WRIST].distance(&landmarks[MIDDLE_MCP]);
    if palm < EPSILON {
        return Err(GestureError::InvalidLandmarkSet(
            "wrist and middle MCP coincide".to_string(),
        ));
    }

    // The palm is rigid: knuckles sit about one palm length from the wrist,
    // side by side, with the thumb base closer in than any of them
    let (min_reach, max_reach) = KNUCKLE_REACH_RATIO;
    let mut nearest_knuckle = f64::INFINITY;
    for &idx in &KNUCKLES {
        let reach = landmarks[WRIST].distance(&landmarks[idx]) / palm;
        if !(min_reach..=max_reach).contains(&reach) {
            return Err(GestureError::InvalidLandmarkSet(format!(
                "knuckle {idx} is {reach:.2}x the palm length from the wrist; landmarks look misordered"
            )));
        }
        nearest_knuckle = nearest_knuckle.min(reach);
    }
    for pair in KNUCKLES.windows(2) {
        let gap = landmarks[pair[0]].distance(&landmarks[pair[1]]) / palm;
        if gap >= MAX_KNUCKLE_GAP_RATIO {
            return Err(GestureError::InvalidLandmarkSet(format!(
                "knuckles {} and {} are {gap:.2}x the palm length apart; landmarks look misordered",
                pair[0], pair[1]
            )));
        }
    }
    let thumb_base = Finger::Thumb.landmark_chain()[0];
    if landmarks[WRIST].distance(&landmarks[thumb_base]) / palm >= nearest_knuckle {
        return Err(GestureError::InvalidLandmarkSet(
            "thumb CMC is farther from the wrist than the knuckles; landmarks look misordered".to_string(),
        ));
    }

    for finger in Finger::ALL {
        let chain = finger.landmark_chain();
        let mut prev = WRIST;
        for &idx in &chain {
            let length = landmarks[prev].distance(&landmarks[idx]);
            if length < palm * MIN_SEGMENT_RATIO {
                return Err(GestureError::InvalidLandmarkSet(format!(
                    "{finger} segment {prev}->{idx} is degenerate"
                )));
            }
            if length > palm * MAX_SEGMENT_RATIO {
                return Err(GestureError::InvalidLandmarkSet(format!(
                    "{finger} segment {prev}->{idx} is {:.1}x the palm length; landmarks look misordered",
                    length / palm
                )));
            }
            prev = idx;
        }
    }

    Ok(())
}

// ==================== Unit Tests ====================
