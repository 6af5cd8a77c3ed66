//! Common Types and Constants
//!
//! Finger identities, curl and direction categories, and the raw landmark
//! point shared by every module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GestureError;

// ==================== Constants ====================

/// Number of landmarks in one hand frame (wrist + 4 points x 5 fingers)
pub const LANDMARK_COUNT: usize = 21;

/// Number of fingers on a hand
pub const FINGER_COUNT: usize = 5;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-9;

/// Landmark index of the wrist
pub const WRIST: usize = 0;

/// Landmark index of the middle finger MCP joint (end of the palm axis)
pub const MIDDLE_MCP: usize = 9;

// ==================== Landmark ====================

/// One 3D hand landmark as delivered by the pose model.
///
/// Deserializes from either `[x, y, z]` or `{ "x": .., "y": .., "z": .. }`;
/// a missing `z` defaults to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Vector from `self` to `other`
    pub fn to(&self, other: &Landmark) -> [f64; 3] {
        [other.x - self.x, other.y - self.y, other.z - self.z]
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        norm(self.to(other))
    }
}

impl From<[f64; 3]> for Landmark {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Array([f64; 3]),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Array(p) => p.into(),
            LandmarkRepr::Object { x, y, z } => Self::new(x, y, z),
        }
    }
}

#[inline]
pub(crate) fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[inline]
pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Angle between two vectors in degrees, 0 when either is degenerate
pub(crate) fn angle_between_degrees(a: [f64; 3], b: [f64; 3]) -> f64 {
    let denom = norm(a) * norm(b);
    if denom < EPSILON {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Normalize text for case- and separator-insensitive parsing
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// ==================== Finger ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; FINGER_COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }

    /// Landmark indices from the finger base to its tip.
    ///
    /// Thumb: CMC, MCP, IP, TIP. Others: MCP, PIP, DIP, TIP.
    pub fn landmark_chain(&self) -> [usize; 4] {
        let base = 1 + self.index() * 4;
        [base, base + 1, base + 2, base + 3]
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Finger {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "thumb" => Ok(Finger::Thumb),
            "index" => Ok(Finger::Index),
            "middle" => Ok(Finger::Middle),
            "ring" => Ok(Finger::Ring),
            "pinky" | "little" => Ok(Finger::Pinky),
            _ => Err(GestureError::UnknownFinger(s.to_string())),
        }
    }
}

// ==================== Curl ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FingerCurl {
    NoCurl,
    HalfCurl,
    FullCurl,
}

impl FingerCurl {
    pub const ALL: [FingerCurl; 3] = [FingerCurl::NoCurl, FingerCurl::HalfCurl, FingerCurl::FullCurl];

    pub fn as_str(&self) -> &'static str {
        match self {
            FingerCurl::NoCurl => "NoCurl",
            FingerCurl::HalfCurl => "HalfCurl",
            FingerCurl::FullCurl => "FullCurl",
        }
    }
}

impl fmt::Display for FingerCurl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerCurl {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Category::from_str(s)? {
            Category::Curl(curl) => Ok(curl),
            Category::Direction(_) => Err(GestureError::UnknownCategory(format!(
                "{s} is a direction, expected a curl category"
            ))),
        }
    }
}

// ==================== Direction ====================

/// Pointing octant in the image plane, viewer perspective with y up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FingerDirection {
    VerticalUp,
    VerticalDown,
    HorizontalLeft,
    HorizontalRight,
    DiagonalUpRight,
    DiagonalUpLeft,
    DiagonalDownRight,
    DiagonalDownLeft,
}

impl FingerDirection {
    pub const ALL: [FingerDirection; 8] = [
        FingerDirection::VerticalUp,
        FingerDirection::VerticalDown,
        FingerDirection::HorizontalLeft,
        FingerDirection::HorizontalRight,
        FingerDirection::DiagonalUpRight,
        FingerDirection::DiagonalUpLeft,
        FingerDirection::DiagonalDownRight,
        FingerDirection::DiagonalDownLeft,
    ];

    /// Canonical azimuth in degrees, counter-clockwise from +x
    pub fn azimuth_degrees(&self) -> f64 {
        match self {
            FingerDirection::HorizontalRight => 0.0,
            FingerDirection::DiagonalUpRight => 45.0,
            FingerDirection::VerticalUp => 90.0,
            FingerDirection::DiagonalUpLeft => 135.0,
            FingerDirection::HorizontalLeft => 180.0,
            FingerDirection::DiagonalDownLeft => 225.0,
            FingerDirection::VerticalDown => 270.0,
            FingerDirection::DiagonalDownRight => 315.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FingerDirection::VerticalUp => "VerticalUp",
            FingerDirection::VerticalDown => "VerticalDown",
            FingerDirection::HorizontalLeft => "HorizontalLeft",
            FingerDirection::HorizontalRight => "HorizontalRight",
            FingerDirection::DiagonalUpRight => "DiagonalUpRight",
            FingerDirection::DiagonalUpLeft => "DiagonalUpLeft",
            FingerDirection::DiagonalDownRight => "DiagonalDownRight",
            FingerDirection::DiagonalDownLeft => "DiagonalDownLeft",
        }
    }
}

impl fmt::Display for FingerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerDirection {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Category::from_str(s)? {
            Category::Direction(direction) => Ok(direction),
            Category::Curl(_) => Err(GestureError::UnknownCategory(format!(
                "{s} is a curl, expected a direction category"
            ))),
        }
    }
}

// ==================== Category ====================

/// Any matchable category: a curl level or a direction octant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Curl(FingerCurl),
    Direction(FingerDirection),
}

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        FingerCurl::ALL
            .into_iter()
            .map(Category::Curl)
            .chain(FingerDirection::ALL.into_iter().map(Category::Direction))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Curl(curl) => curl.as_str(),
            Category::Direction(direction) => direction.as_str(),
        }
    }
}

impl From<FingerCurl> for Category {
    fn from(curl: FingerCurl) -> Self {
        Category::Curl(curl)
    }
}

impl From<FingerDirection> for Category {
    fn from(direction: FingerDirection) -> Self {
        Category::Direction(direction)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Category::all()
            .find(|c| normalize_key(c.as_str()) == key)
            .ok_or_else(|| GestureError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = GestureError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

// ==================== Unit Tests ====================
