//! Gesture Estimator
//!
//! Scores one frame's hand geometry against every registered description.
//!
//! Per description, per constrained finger:
//! - each constraint's satisfaction is `1 - |curve score - target|`
//! - curl constraints combine by minimum, direction constraints likewise
//! - the finger score is the mean of the curl and direction sub-scores present
//!
//! The description confidence is the weighted mean of finger scores over
//! constrained fingers only; unconstrained fingers are neutral.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::curve::CurveLibrary;
use crate::description::{FingerConstraints, GestureDescription};
use crate::error::{GestureError, Result};
use crate::geometry::{FingerGeometry, GeometryExtractor, HandGeometry};
use crate::registry::GestureRegistry;
use crate::types::{Landmark, FINGER_COUNT};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.75;

// ==================== Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EstimatorConfig {
    /// Minimum confidence for a best match; below it the frame reports none
    pub acceptance_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold("estimator.acceptanceThreshold", self.acceptance_threshold)
    }
}

pub(crate) fn validate_threshold(field: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
        return Err(GestureError::InvalidConfig(format!(
            "{field} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

// ==================== Results ====================

/// Confidence of one description for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureScore {
    pub name: String,
    pub confidence: f64,
    /// Score per finger, `None` for unconstrained fingers
    pub finger_scores: [Option<f64>; FINGER_COUNT],
}

/// All description confidences for one frame, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEstimate {
    scores: Vec<GestureScore>,
    best: Option<usize>,
}

/// Flat interop record: `{ bestMatch, confidences }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRecord {
    pub best_match: Option<String>,
    pub confidences: BTreeMap<String, f64>,
}

impl FrameEstimate {
    /// Assemble from scores in registration order, selecting the best match
    pub fn from_scores(scores: Vec<GestureScore>, acceptance_threshold: f64) -> Self {
        let best = select_best(scores.iter().map(|s| s.confidence), acceptance_threshold);
        Self { scores, best }
    }

    pub fn scores(&self) -> &[GestureScore] {
        &self.scores
    }

    pub fn confidence(&self, name: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.confidence)
    }

    /// Accepted best match, or `None` when no description clears the threshold
    pub fn best_match(&self) -> Option<&GestureScore> {
        self.best.map(|i| &self.scores[i])
    }

    pub fn best_match_name(&self) -> Option<&str> {
        self.best_match().map(|s| s.name.as_str())
    }

    pub fn to_record(&self) -> EstimateRecord {
        EstimateRecord {
            best_match: self.best_match_name().map(str::to_string),
            confidences: self
                .scores
                .iter()
                .map(|s| (s.name.clone(), s.confidence))
                .collect(),
        }
    }
}

/// Index of the highest confidence; earlier entries win ties.
///
/// Returns `None` when the maximum is below `threshold`.
pub(crate) fn select_best(confidences: impl Iterator<Item = f64>, threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, confidence) in confidences.enumerate() {
        match best {
            Some((_, top)) if confidence <= top => {}
            _ => best = Some((i, confidence)),
        }
    }
    best.filter(|&(_, top)| top >= threshold).map(|(i, _)| i)
}

// ==================== Estimator ====================

#[derive(Debug, Clone, Default)]
pub struct GestureEstimator {
    config: EstimatorConfig,
}

impl GestureEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Score one frame against every registered description
    pub fn estimate(&self, hand: &HandGeometry, registry: &GestureRegistry) -> Result<FrameEstimate> {
        let scores = registry
            .iter()
            .map(|description| score_description(description, hand, registry.library()))
            .collect::<Result<Vec<_>>>()?;

        let estimate = FrameEstimate::from_scores(scores, self.config.acceptance_threshold);
        tracing::trace!(
            best_match = ?estimate.best_match_name(),
            confidence = ?estimate.best_match().map(|s| s.confidence),
            "Frame estimated"
        );
        Ok(estimate)
    }

    /// Extract geometry from raw landmarks, then estimate
    pub fn estimate_landmarks(
        &self,
        extractor: &GeometryExtractor,
        landmarks: &[Landmark],
        registry: &GestureRegistry,
    ) -> Result<FrameEstimate> {
        let hand = extractor.extract(landmarks)?;
        self.estimate(&hand, registry)
    }

    /// Estimate a batch of recorded frames, in order
    pub fn estimate_batch(&self, hands: &[HandGeometry], registry: &GestureRegistry) -> Result<Vec<FrameEstimate>> {
        #[cfg(feature = "parallel")]
        let frames = hands.par_iter();
        #[cfg(not(feature = "parallel"))]
        let frames = hands.iter();

        frames.map(|hand| self.estimate(hand, registry)).collect()
    }
}

// ==================== Scoring ====================

/// How close a measured membership is to the author's target
fn satisfaction(score: f64, target: f64) -> f64 {
    (1.0 - (score - target).abs()).clamp(0.0, 1.0)
}

fn min_satisfaction(satisfactions: impl Iterator<Item = Result<f64>>) -> Result<Option<f64>> {
    let mut min: Option<f64> = None;
    for s in satisfactions {
        let s = s?;
        min = Some(min.map_or(s, |m| m.min(s)));
    }
    Ok(min)
}

fn score_finger(
    constraints: &FingerConstraints,
    geometry: &FingerGeometry,
    library: &CurveLibrary,
) -> Result<f64> {
    let curl = min_satisfaction(constraints.curls().iter().map(|c| {
        library
            .curl_score(geometry.curl, c.curl)
            .map(|score| satisfaction(score, c.target))
    }))?;
    let direction = min_satisfaction(constraints.directions().iter().map(|d| {
        library
            .direction_score(&geometry.direction, d.direction)
            .map(|score| satisfaction(score, d.target))
    }))?;

    Ok(match (curl, direction) {
        (Some(c), Some(d)) => (c + d) / 2.0,
        (Some(c), None) => c,
        (None, Some(d)) => d,
        (None, None) => 0.0,
    })
}

/// Weighted mean of `(score, weight)` pairs; 0 when the weights sum to 0
pub(crate) fn weighted_confidence(parts: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (sum, total) = parts
        .into_iter()
        .fold((0.0, 0.0), |(sum, total), (score, weight)| {
            (sum + score * weight, total + weight)
        });
    if total > 0.0 {
        (sum / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Score one description against one frame
pub fn score_description(
    description: &GestureDescription,
    hand: &HandGeometry,
    library: &CurveLibrary,
) -> Result<GestureScore> {
    let mut finger_scores = [None; FINGER_COUNT];
    let mut parts = Vec::with_capacity(FINGER_COUNT);

    for (finger, constraints) in description.constrained_fingers() {
        let score = score_finger(constraints, hand.finger(finger), library)?;
        finger_scores[finger.index()] = Some(score);
        parts.push((score, constraints.weight()));
    }

    Ok(GestureScore {
        name: description.name().to_string(),
        confidence: weighted_confidence(parts),
        finger_scores,
    })
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DirectionVector;
    use crate::types::{Finger, FingerCurl, FingerDirection};
    use std::f64::consts::LN_2;

    const EPS: f64 = 1e-9;

    fn upright(curls: [f64; FINGER_COUNT]) -> HandGeometry {
        HandGeometry::from_measurements(curls, [DirectionVector::from_azimuth_degrees(90.0); FINGER_COUNT])
    }

    /// Curl distance from 0 at which the NoCurl curve scores `score`
    fn curl_scoring(score: f64) -> f64 {
        0.25 * (-score.ln() / LN_2).sqrt()
    }

    fn stop() -> GestureDescription {
        let mut builder = GestureDescription::builder("stop");
        for finger in Finger::ALL {
            builder.add_curl(finger, FingerCurl::NoCurl, 1.0);
        }
        builder.build()
    }

    fn registry(descriptions: Vec<GestureDescription>) -> GestureRegistry {
        let mut builder = GestureRegistry::builder();
        builder.register_all(descriptions).unwrap();
        builder.build()
    }

    #[test]
    fn test_satisfaction_measures_closeness_to_target() {
        assert_eq!(satisfaction(1.0, 1.0), 1.0);
        assert!((satisfaction(0.5, 0.5) - 1.0).abs() < EPS);
        assert!((satisfaction(0.1, 1.0) - 0.1).abs() < EPS);
        assert!((satisfaction(1.0, 0.0)).abs() < EPS);
    }

    #[test]
    fn test_stop_scenario() {
        let curl = curl_scoring(0.95);
        let hand = upright([curl; FINGER_COUNT]);
        let registry = registry(vec![stop()]);

        let estimator = GestureEstimator::new(EstimatorConfig {
            acceptance_threshold: 0.5,
        })
        .unwrap();
        let estimate = estimator.estimate(&hand, &registry).unwrap();

        let confidence = estimate.confidence("stop").unwrap();
        assert!((confidence - 0.95).abs() < 1e-6, "got {confidence}");
        assert_eq!(estimate.best_match_name(), Some("stop"));
    }

    #[test]
    fn test_weighted_mean_of_finger_scores() {
        // Thumb and index weight 2, middle poorly matched at weight 1 of 7
        let confidence = weighted_confidence([(0.9, 2.0), (0.9, 2.0), (0.1, 1.0), (0.9, 1.0), (0.9, 1.0)]);
        assert!((confidence - 5.5 / 7.0).abs() < EPS);
        assert_eq!(weighted_confidence(Vec::new()), 0.0);
    }

    #[test]
    fn test_unmet_direction_pulls_down_by_weight() {
        let mut builder = GestureDescription::builder("OK");
        builder
            .add_curl(Finger::Thumb, FingerCurl::NoCurl, 1.0)
            .add_curl(Finger::Index, FingerCurl::NoCurl, 1.0)
            .add_direction(Finger::Middle, FingerDirection::VerticalUp, 1.0)
            .add_curl(Finger::Ring, FingerCurl::NoCurl, 1.0)
            .add_curl(Finger::Pinky, FingerCurl::NoCurl, 1.0)
            .set_weight(Finger::Thumb, 2.0)
            .set_weight(Finger::Index, 2.0);
        let registry = registry(vec![builder.build()]);

        // Middle finger turned until VerticalUp scores 0.1
        let offset = 22.5 * (-(0.1f64).ln() / LN_2).sqrt();
        let curl = curl_scoring(0.9);
        let hand = upright([curl; FINGER_COUNT]).with_finger(
            Finger::Middle,
            FingerGeometry {
                curl,
                direction: DirectionVector::from_azimuth_degrees(90.0 + offset),
            },
        );

        let estimate = GestureEstimator::default().estimate(&hand, &registry).unwrap();
        let score = &estimate.scores()[0];
        assert!((score.finger_scores[Finger::Middle.index()].unwrap() - 0.1).abs() < 1e-6);
        assert!((score.confidence - 5.5 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_curl_and_direction_are_averaged() {
        let mut builder = GestureDescription::builder("point-up");
        builder
            .add_curl(Finger::Index, FingerCurl::NoCurl, 1.0)
            .add_direction(Finger::Index, FingerDirection::HorizontalRight, 1.0);
        let registry = registry(vec![builder.build()]);

        // Straight but pointing up: curl satisfied, direction ~0
        let estimate = GestureEstimator::default()
            .estimate(&upright([0.0; FINGER_COUNT]), &registry)
            .unwrap();
        let confidence = estimate.confidence("point-up").unwrap();
        assert!((confidence - 0.5).abs() < 1e-4, "got {confidence}");
    }

    #[test]
    fn test_same_axis_constraints_take_minimum() {
        let mut builder = GestureDescription::builder("strict");
        builder
            .add_curl(Finger::Index, FingerCurl::NoCurl, 1.0)
            .add_curl(Finger::Index, FingerCurl::FullCurl, 1.0);
        let registry = registry(vec![builder.build()]);

        let estimate = GestureEstimator::default()
            .estimate(&upright([0.0; FINGER_COUNT]), &registry)
            .unwrap();
        assert!(estimate.confidence("strict").unwrap() < 1e-3);
    }

    #[test]
    fn test_partial_target() {
        let mut builder = GestureDescription::builder("half");
        builder.add_curl(Finger::Index, FingerCurl::NoCurl, 0.5);
        let registry = registry(vec![builder.build()]);

        // At width the NoCurl curve scores exactly 0.5
        let estimate = GestureEstimator::default()
            .estimate(&upright([0.25; FINGER_COUNT]), &registry)
            .unwrap();
        assert!((estimate.confidence("half").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_below_threshold_is_no_match() {
        let hand = upright([curl_scoring(0.95); FINGER_COUNT]);
        let registry = registry(vec![stop()]);

        let estimator = GestureEstimator::new(EstimatorConfig {
            acceptance_threshold: 0.99,
        })
        .unwrap();
        let estimate = estimator.estimate(&hand, &registry).unwrap();
        assert!(estimate.best_match().is_none());
        assert!(estimate.confidence("stop").unwrap() > 0.9);

        let record = estimate.to_record();
        assert_eq!(record.best_match, None);
        assert_eq!(record.confidences.len(), 1);
    }

    #[test]
    fn test_ties_resolve_to_first_registered() {
        let mut first = GestureDescription::builder("first");
        first.add_curl(Finger::Ring, FingerCurl::NoCurl, 1.0);
        let mut second = GestureDescription::builder("second");
        second.add_curl(Finger::Pinky, FingerCurl::NoCurl, 1.0);

        let hand = upright([0.0; FINGER_COUNT]);
        let estimate = GestureEstimator::default()
            .estimate(&hand, &registry(vec![first.build(), second.build()]))
            .unwrap();
        assert_eq!(estimate.best_match_name(), Some("first"));

        assert_eq!(select_best([0.8, 0.9, 0.9].into_iter(), 0.5), Some(1));
        assert_eq!(select_best([0.4, 0.3].into_iter(), 0.5), None);
        assert_eq!(select_best(std::iter::empty(), 0.0), None);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let estimate = FrameEstimate::from_scores(
            vec![GestureScore {
                name: "stop".to_string(),
                confidence: 0.8,
                finger_scores: [Some(0.8), None, None, None, None],
            }],
            0.75,
        );
        let json = serde_json::to_value(estimate.to_record()).unwrap();
        assert_eq!(json["bestMatch"], "stop");
        assert_eq!(json["confidences"]["stop"], 0.8);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        for threshold in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                GestureEstimator::new(EstimatorConfig {
                    acceptance_threshold: threshold
                }),
                Err(GestureError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_batch_matches_sequential() {
        let registry = registry(vec![stop()]);
        let hands: Vec<HandGeometry> = (0..16)
            .map(|i| upright([i as f64 / 16.0; FINGER_COUNT]))
            .collect();

        let estimator = GestureEstimator::default();
        let batch = estimator.estimate_batch(&hands, &registry).unwrap();
        for (hand, estimate) in hands.iter().zip(&batch) {
            assert_eq!(&estimator.estimate(hand, &registry).unwrap(), estimate);
        }
    }
}
