//! Gesture Description
//!
//! A declarative template of per-finger curl and direction targets plus
//! per-finger weights. Authored once through [`GestureDescriptionBuilder`],
//! frozen by `build()`, and never mutated while frames are classified.
//!
//! ```rust
//! use handsign_core::{Finger, FingerCurl, FingerDirection, GestureDescription};
//!
//! let mut builder = GestureDescription::builder("point");
//! builder.add_curl(Finger::Index, FingerCurl::NoCurl, 1.0);
//! builder.add_direction(Finger::Index, FingerDirection::VerticalUp, 1.0);
//! builder.add_curl(Finger::Middle, FingerCurl::FullCurl, 1.0);
//! builder.set_weight(Finger::Index, 2.0);
//! let point = builder.build();
//! assert_eq!(point.constrained_fingers().count(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::curve::CurveLibrary;
use crate::error::{GestureError, Result};
use crate::types::{Category, Finger, FingerCurl, FingerDirection, FINGER_COUNT};

/// Weight every finger starts with
pub const DEFAULT_FINGER_WEIGHT: f64 = 1.0;

// ==================== Constraints ====================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurlConstraint {
    pub curl: FingerCurl,
    /// Fuzzy membership the author expects, in `[0, 1]`
    pub target: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionConstraint {
    pub direction: FingerDirection,
    /// Fuzzy membership the author expects, in `[0, 1]`
    pub target: f64,
}

/// Everything a description says about one finger.
#[derive(Clone, Debug, PartialEq)]
pub struct FingerConstraints {
    curls: Vec<CurlConstraint>,
    directions: Vec<DirectionConstraint>,
    weight: f64,
}

impl Default for FingerConstraints {
    fn default() -> Self {
        Self {
            curls: Vec::new(),
            directions: Vec::new(),
            weight: DEFAULT_FINGER_WEIGHT,
        }
    }
}

impl FingerConstraints {
    pub fn curls(&self) -> &[CurlConstraint] {
        &self.curls
    }

    pub fn directions(&self) -> &[DirectionConstraint] {
        &self.directions
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// A finger without constraints is neutral: it never affects the score
    pub fn is_unconstrained(&self) -> bool {
        self.curls.is_empty() && self.directions.is_empty()
    }

    fn targets(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.curls
            .iter()
            .map(|c| (Category::Curl(c.curl), c.target))
            .chain(
                self.directions
                    .iter()
                    .map(|d| (Category::Direction(d.direction), d.target)),
            )
    }
}

// ==================== Description ====================

/// Immutable gesture template.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureDescription {
    name: String,
    fingers: [FingerConstraints; FINGER_COUNT],
}

impl GestureDescription {
    pub fn builder(name: impl Into<String>) -> GestureDescriptionBuilder {
        GestureDescriptionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn finger(&self, finger: Finger) -> &FingerConstraints {
        &self.fingers[finger.index()]
    }

    /// Fingers carrying at least one constraint, in finger order
    pub fn constrained_fingers(&self) -> impl Iterator<Item = (Finger, &FingerConstraints)> {
        Finger::ALL
            .into_iter()
            .zip(self.fingers.iter())
            .filter(|(_, c)| !c.is_unconstrained())
    }

    pub fn is_empty(&self) -> bool {
        self.constrained_fingers().next().is_none()
    }

    /// Sum of weights over constrained fingers
    pub fn total_weight(&self) -> f64 {
        self.constrained_fingers().map(|(_, c)| c.weight).sum()
    }

    /// Check the description against a curve library.
    ///
    /// Rejects constraint-free descriptions, targets outside `[0, 1]`,
    /// negative or non-finite weights, a zero total weight, and categories the
    /// library has no curve for.
    pub fn validate(&self, library: &CurveLibrary) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GestureError::InvalidParameter(
                "gesture name must not be empty".to_string(),
            ));
        }
        if self.is_empty() {
            return Err(GestureError::EmptyGestureDescription(self.name.clone()));
        }

        for (finger, constraints) in Finger::ALL.into_iter().zip(self.fingers.iter()) {
            if !(constraints.weight.is_finite() && constraints.weight >= 0.0) {
                return Err(GestureError::InvalidParameter(format!(
                    "gesture `{}`: {} weight must be a non-negative number, got {}",
                    self.name, finger, constraints.weight
                )));
            }
            for (category, target) in constraints.targets() {
                if !(0.0..=1.0).contains(&target) {
                    return Err(GestureError::InvalidParameter(format!(
                        "gesture `{}`: {} {} target must be in [0, 1], got {}",
                        self.name, finger, category, target
                    )));
                }
                if !library.contains(category) {
                    return Err(GestureError::UnknownCategory(format!(
                        "{} (gesture `{}`, {})",
                        category, self.name, finger
                    )));
                }
            }
        }

        if self.total_weight() <= 0.0 {
            return Err(GestureError::InvalidParameter(format!(
                "gesture `{}`: constrained fingers have zero total weight",
                self.name
            )));
        }

        Ok(())
    }

    /// Export as a serializable template
    pub fn to_template(&self) -> GestureTemplate {
        let mut template = GestureTemplate {
            name: self.name.clone(),
            curls: Vec::new(),
            directions: Vec::new(),
            weights: BTreeMap::new(),
        };
        for (finger, constraints) in Finger::ALL.into_iter().zip(self.fingers.iter()) {
            for c in &constraints.curls {
                template.curls.push(TemplateConstraint {
                    finger: finger.to_string(),
                    category: c.curl.to_string(),
                    confidence: c.target,
                });
            }
            for d in &constraints.directions {
                template.directions.push(TemplateConstraint {
                    finger: finger.to_string(),
                    category: d.direction.to_string(),
                    confidence: d.target,
                });
            }
            if constraints.weight != DEFAULT_FINGER_WEIGHT {
                template.weights.insert(finger.to_string(), constraints.weight);
            }
        }
        template
    }
}

// ==================== Builder ====================

/// Accumulates constraints; repeated calls add constraints, never overwrite.
#[derive(Clone, Debug)]
pub struct GestureDescriptionBuilder {
    name: String,
    fingers: [FingerConstraints; FINGER_COUNT],
}

impl GestureDescriptionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingers: Default::default(),
        }
    }

    pub fn add_curl(&mut self, finger: Finger, curl: FingerCurl, target: f64) -> &mut Self {
        self.fingers[finger.index()]
            .curls
            .push(CurlConstraint { curl, target });
        self
    }

    pub fn add_direction(&mut self, finger: Finger, direction: FingerDirection, target: f64) -> &mut Self {
        self.fingers[finger.index()]
            .directions
            .push(DirectionConstraint { direction, target });
        self
    }

    pub fn set_weight(&mut self, finger: Finger, weight: f64) -> &mut Self {
        self.fingers[finger.index()].weight = weight;
        self
    }

    /// Freeze into an immutable description; validation happens at registration
    pub fn build(&self) -> GestureDescription {
        GestureDescription {
            name: self.name.clone(),
            fingers: self.fingers.clone(),
        }
    }
}

// ==================== Template DTO ====================

fn default_confidence() -> f64 {
    1.0
}

/// One constraint in a JSON-authored template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateConstraint {
    pub finger: String,
    pub category: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

/// JSON-authorable gesture template.
///
/// ```json
/// {
///   "name": "stop",
///   "curls": [{ "finger": "Thumb", "category": "NoCurl", "confidence": 1.0 }],
///   "directions": [],
///   "weights": { "Thumb": 2.0 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureTemplate {
    pub name: String,
    #[serde(default)]
    pub curls: Vec<TemplateConstraint>,
    #[serde(default)]
    pub directions: Vec<TemplateConstraint>,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl GestureTemplate {
    /// Resolve finger and category names through the builder
    pub fn to_description(&self) -> Result<GestureDescription> {
        let mut builder = GestureDescription::builder(self.name.clone());
        for c in &self.curls {
            builder.add_curl(c.finger.parse()?, c.category.parse()?, c.confidence);
        }
        for d in &self.directions {
            builder.add_direction(d.finger.parse()?, d.category.parse()?, d.confidence);
        }
        for (finger, weight) in &self.weights {
            builder.set_weight(finger.parse()?, *weight);
        }
        Ok(builder.build())
    }
}

// ==================== Unit Tests ====================
