//! Synthetic hands
//!
//! Builds 21-point landmark sets from per-finger flexion and pointing angles,
//! for tests, benchmarks and replaying scripted poses without a camera.
//!
//! The hand is modelled in a y-up frame with the wrist at the origin, then
//! turned about the vertical axis (`yaw`), scaled, flipped into image
//! coordinates (y down) and translated to `origin`.

use crate::types::{Finger, Landmark, FINGER_COUNT, LANDMARK_COUNT};

/// Thumb base (CMC) offset along the palm axis and sideways
const THUMB_BASE: (f64, f64) = (0.25, 0.35);

/// MCP offset along the palm axis and sideways, index..pinky
const KNUCKLES: [(f64, f64); 4] = [(0.95, 0.22), (1.0, 0.0), (0.95, -0.2), (0.85, -0.38)];

const THUMB_SEGMENTS: [f64; 3] = [0.35, 0.30, 0.25];
const FINGER_SEGMENTS: [f64; 3] = [0.45, 0.28, 0.22];

/// Share of the total flexion applied at each joint, thumb MCP/IP
const THUMB_FLEXION_SPLIT: [f64; 2] = [0.5, 0.5];

/// Share of the total flexion applied at each joint, finger MCP/PIP/DIP
const FINGER_FLEXION_SPLIT: [f64; 3] = [0.35, 0.4, 0.25];

/// Pose of one synthetic finger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerPose {
    /// Total bend over all joints, degrees
    pub flexion: f64,
    /// Pointing azimuth of the straight finger, degrees, y-up frame
    pub azimuth: f64,
}

impl FingerPose {
    pub fn new(flexion: f64, azimuth: f64) -> Self {
        Self { flexion, azimuth }
    }

    pub fn straight(azimuth: f64) -> Self {
        Self::new(0.0, azimuth)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticHand {
    fingers: [FingerPose; FINGER_COUNT],
    palm_azimuth: f64,
    scale: f64,
    origin: [f64; 3],
    yaw: f64,
}

impl SyntheticHand {
    /// Flat open hand, palm axis pointing up, thumb out to the upper left
    pub fn open() -> Self {
        Self {
            fingers: [
                FingerPose::straight(135.0),
                FingerPose::straight(90.0),
                FingerPose::straight(90.0),
                FingerPose::straight(90.0),
                FingerPose::straight(90.0),
            ],
            palm_azimuth: 90.0,
            scale: 120.0,
            origin: [320.0, 400.0, 0.0],
            yaw: 0.0,
        }
    }

    /// Every finger fully curled
    pub fn fist() -> Self {
        let mut hand = Self::open();
        hand.fingers[Finger::Thumb.index()].flexion = 130.0;
        for finger in &Finger::ALL[1..] {
            hand.fingers[finger.index()].flexion = 240.0;
        }
        hand
    }

    pub fn with_finger(mut self, finger: Finger, pose: FingerPose) -> Self {
        self.fingers[finger.index()] = pose;
        self
    }

    /// Direction of the palm axis (wrist to middle knuckle), degrees
    pub fn with_palm_azimuth(mut self, azimuth: f64) -> Self {
        self.palm_azimuth = azimuth;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Turn the hand about the vertical axis through the wrist, degrees
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn finger(&self, finger: Finger) -> FingerPose {
        self.fingers[finger.index()]
    }

    /// Landmarks in image coordinates, canonical ordering
    pub fn landmarks(&self) -> Vec<Landmark> {
        let palm = planar(self.palm_azimuth);
        let side = [-palm[1], palm[0], 0.0];

        let mut points = vec![[0.0; 3]; LANDMARK_COUNT];
        for finger in Finger::ALL {
            let pose = self.fingers[finger.index()];
            let chain = finger.landmark_chain();

            let ((along, across), segments, cumulative) = match finger {
                Finger::Thumb => {
                    let f = pose.flexion;
                    let split = THUMB_FLEXION_SPLIT;
                    (THUMB_BASE, THUMB_SEGMENTS, [0.0, f * split[0], f * (split[0] + split[1])])
                }
                _ => {
                    let f = pose.flexion;
                    let split = FINGER_FLEXION_SPLIT;
                    let knuckle = KNUCKLES[finger.index() - 1];
                    let length = if finger == Finger::Pinky { 0.8 } else { 1.0 };
                    (
                        knuckle,
                        FINGER_SEGMENTS.map(|s| s * length),
                        [f * split[0], f * (split[0] + split[1]), f],
                    )
                }
            };

            let mut current = add(scaled(palm, along), scaled(side, across));
            points[chain[0]] = current;
            for k in 0..3 {
                let step = bent(pose.azimuth, cumulative[k]);
                current = add(current, scaled(step, segments[k]));
                points[chain[k + 1]] = current;
            }
        }

        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        points
            .into_iter()
            .map(|[x, y, z]| {
                let (x, z) = (x * cos_yaw + z * sin_yaw, -x * sin_yaw + z * cos_yaw);
                Landmark::new(
                    self.origin[0] + self.scale * x,
                    self.origin[1] - self.scale * y,
                    self.origin[2] + self.scale * z,
                )
            })
            .collect()
    }
}

fn planar(azimuth: f64) -> [f64; 3] {
    let (sin, cos) = azimuth.to_radians().sin_cos();
    [cos, sin, 0.0]
}

/// Unit vector at `azimuth`, bent `flexion` degrees away from the viewer
fn bent(azimuth: f64, flexion: f64) -> [f64; 3] {
    let [x, y, _] = planar(azimuth);
    let (sin_f, cos_f) = flexion.to_radians().sin_cos();
    [cos_f * x, cos_f * y, -sin_f]
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scaled(v: [f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}
