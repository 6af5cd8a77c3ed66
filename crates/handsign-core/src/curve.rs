//! Fuzzy Curve Library
//!
//! Membership curves that turn a continuous finger measurement into a
//! `[0, 1]` score for one named category.
//!
//! Every curve has the shape `exp(-ln2 * (d / width)^falloff)`:
//! - 1.0 exactly at the category's center
//! - 0.5 at distance `width`, so neighbouring categories overlap
//! - strictly decreasing and continuous in the distance `d`
//!
//! Direction curves measure distance on a circle (360° period) and are
//! additionally scaled by how much of the finger lies in the image plane.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::LN_2;

use crate::error::{GestureError, Result};
use crate::geometry::{DirectionVector, FingerGeometry};
use crate::types::{Category, FingerCurl, FingerDirection};

// ==================== Constants ====================

/// Half-width of the curl curves (curl centers are 0.5 apart)
pub const CURL_WIDTH: f64 = 0.25;

/// Half-width of the direction curves in degrees (octants are 45° apart)
pub const DIRECTION_WIDTH_DEGREES: f64 = 22.5;

/// Default curve falloff exponent (Gaussian)
pub const DEFAULT_FALLOFF: f64 = 2.0;

/// Planarity at or above which a direction is scored at full strength
pub const DEFAULT_FULL_PLANARITY: f64 = 0.7;

fn default_falloff() -> f64 {
    DEFAULT_FALLOFF
}

fn default_full_planarity() -> f64 {
    DEFAULT_FULL_PLANARITY
}

// ==================== Fuzzy Curve ====================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyCurve {
    /// Canonical measurement of the category
    pub center: f64,
    /// Distance from the center at which the score is 0.5
    pub width: f64,
    /// Shape exponent; 2 is Gaussian, larger is flatter near the center
    #[serde(default = "default_falloff")]
    pub falloff: f64,
    /// Period for circular measurements (angles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,
}

impl FuzzyCurve {
    pub fn new(center: f64, width: f64, falloff: f64) -> Self {
        Self {
            center,
            width,
            falloff,
            period: None,
        }
    }

    pub fn circular(center: f64, width: f64, falloff: f64, period: f64) -> Self {
        Self {
            center,
            width,
            falloff,
            period: Some(period),
        }
    }

    /// Distance between a measurement and the center, wrapped when circular
    pub fn distance(&self, measurement: f64) -> f64 {
        let d = (measurement - self.center).abs();
        match self.period {
            Some(period) => {
                let wrapped = d.rem_euclid(period);
                wrapped.min(period - wrapped)
            }
            None => d,
        }
    }

    /// Membership score in `[0, 1]`; non-finite measurements score 0
    pub fn score(&self, measurement: f64) -> f64 {
        if !measurement.is_finite() {
            return 0.0;
        }
        let d = self.distance(measurement) / self.width;
        (-LN_2 * d.powf(self.falloff)).exp().clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(GestureError::InvalidParameter(format!(
                "curve center must be finite, got {}",
                self.center
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(GestureError::InvalidParameter(format!(
                "curve width must be positive, got {}",
                self.width
            )));
        }
        if !(self.falloff.is_finite() && self.falloff > 0.0) {
            return Err(GestureError::InvalidParameter(format!(
                "curve falloff must be positive, got {}",
                self.falloff
            )));
        }
        if let Some(period) = self.period {
            if !(period.is_finite() && period > 0.0) {
                return Err(GestureError::InvalidParameter(format!(
                    "curve period must be positive, got {period}"
                )));
            }
        }
        Ok(())
    }
}

// ==================== Curve Library ====================

/// Read-only set of curves, one per category, shared by all descriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveLibrary {
    curves: BTreeMap<Category, FuzzyCurve>,
    #[serde(default = "default_full_planarity")]
    full_planarity: f64,
}

impl Default for CurveLibrary {
    fn default() -> Self {
        let mut curves = BTreeMap::new();

        let curl_centers = [
            (FingerCurl::NoCurl, 0.0),
            (FingerCurl::HalfCurl, 0.5),
            (FingerCurl::FullCurl, 1.0),
        ];
        for (curl, center) in curl_centers {
            curves.insert(
                Category::Curl(curl),
                FuzzyCurve::new(center, CURL_WIDTH, DEFAULT_FALLOFF),
            );
        }

        for direction in FingerDirection::ALL {
            curves.insert(
                Category::Direction(direction),
                FuzzyCurve::circular(
                    direction.azimuth_degrees(),
                    DIRECTION_WIDTH_DEGREES,
                    DEFAULT_FALLOFF,
                    360.0,
                ),
            );
        }

        Self {
            curves,
            full_planarity: DEFAULT_FULL_PLANARITY,
        }
    }
}

impl CurveLibrary {
    /// Build a library from explicit curves; categories left out are unknown
    pub fn new(curves: BTreeMap<Category, FuzzyCurve>, full_planarity: f64) -> Result<Self> {
        let library = Self {
            curves,
            full_planarity,
        };
        library.validate()?;
        Ok(library)
    }

    /// Parse and validate a library from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let library: CurveLibrary = serde_json::from_str(json)?;
        library.validate()?;
        Ok(library)
    }

    pub fn validate(&self) -> Result<()> {
        for (category, curve) in &self.curves {
            curve
                .validate()
                .map_err(|e| GestureError::InvalidParameter(format!("{category}: {e}")))?;
        }
        if !(self.full_planarity.is_finite() && self.full_planarity > 0.0 && self.full_planarity <= 1.0) {
            return Err(GestureError::InvalidParameter(format!(
                "full planarity must be in (0, 1], got {}",
                self.full_planarity
            )));
        }
        Ok(())
    }

    /// Replace the curve for one category
    pub fn set_curve(&mut self, category: Category, curve: FuzzyCurve) -> Result<()> {
        curve.validate()?;
        self.curves.insert(category, curve);
        Ok(())
    }

    pub fn contains(&self, category: Category) -> bool {
        self.curves.contains_key(&category)
    }

    pub fn curve(&self, category: Category) -> Option<&FuzzyCurve> {
        self.curves.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.curves.keys().copied()
    }

    pub fn full_planarity(&self) -> f64 {
        self.full_planarity
    }

    fn require(&self, category: Category) -> Result<&FuzzyCurve> {
        self.curve(category)
            .ok_or_else(|| GestureError::UnknownCategory(category.to_string()))
    }

    /// Score a curl measurement against one curl category
    pub fn curl_score(&self, curl: f64, category: FingerCurl) -> Result<f64> {
        Ok(self.require(Category::Curl(category))?.score(curl))
    }

    /// Score a direction measurement against one octant
    pub fn direction_score(&self, direction: &DirectionVector, category: FingerDirection) -> Result<f64> {
        let curve = self.require(Category::Direction(category))?;
        let in_plane = (direction.planarity() / self.full_planarity).min(1.0);
        Ok(curve.score(direction.azimuth_degrees()) * in_plane)
    }

    /// Score a finger against any category, picking the matching measurement
    pub fn score(&self, finger: &FingerGeometry, category: Category) -> Result<f64> {
        match category {
            Category::Curl(curl) => self.curl_score(finger.curl, curl),
            Category::Direction(direction) => self.direction_score(&finger.direction, direction),
        }
    }
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_score_is_one_at_center() {
        let library = CurveLibrary::default();
        assert_eq!(library.curl_score(0.0, FingerCurl::NoCurl).unwrap(), 1.0);
        assert_eq!(library.curl_score(0.5, FingerCurl::HalfCurl).unwrap(), 1.0);
        assert_eq!(library.curl_score(1.0, FingerCurl::FullCurl).unwrap(), 1.0);

        for direction in FingerDirection::ALL {
            let v = DirectionVector::from_azimuth_degrees(direction.azimuth_degrees());
            let score = library.direction_score(&v, direction).unwrap();
            assert!((score - 1.0).abs() < EPS, "{} canonical score was {}", direction, score);
        }
    }

    #[test]
    fn test_score_strictly_decreases_away_from_center() {
        let curve = FuzzyCurve::new(0.5, CURL_WIDTH, DEFAULT_FALLOFF);
        let mut last_left = curve.score(0.5);
        let mut last_right = last_left;
        for step in 1..=20 {
            let delta = step as f64 * 0.02;
            let left = curve.score(0.5 - delta);
            let right = curve.score(0.5 + delta);
            assert!(left < last_left, "Score should drop moving left at delta {}", delta);
            assert!(right < last_right, "Score should drop moving right at delta {}", delta);
            last_left = left;
            last_right = right;
        }
    }

    #[test]
    fn test_adjacent_categories_overlap() {
        let library = CurveLibrary::default();
        let no = library.curl_score(0.25, FingerCurl::NoCurl).unwrap();
        let half = library.curl_score(0.25, FingerCurl::HalfCurl).unwrap();
        assert!((no - 0.5).abs() < EPS, "Borderline curl should give NoCurl 0.5, got {}", no);
        assert!((half - 0.5).abs() < EPS, "Borderline curl should give HalfCurl 0.5, got {}", half);

        let between = DirectionVector::from_azimuth_degrees(67.5);
        let up = library.direction_score(&between, FingerDirection::VerticalUp).unwrap();
        let diag = library.direction_score(&between, FingerDirection::DiagonalUpRight).unwrap();
        assert!((up - diag).abs() < EPS, "Halfway direction should split evenly");
        assert!((up - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_circular_distance_wraps() {
        let curve = FuzzyCurve::circular(0.0, 22.5, 2.0, 360.0);
        assert!((curve.distance(350.0) - 10.0).abs() < EPS);
        assert!((curve.distance(-10.0) - 10.0).abs() < EPS);
        assert!((curve.score(359.0) - curve.score(1.0)).abs() < EPS);
    }

    #[test]
    fn test_curve_is_continuous() {
        let curve = FuzzyCurve::new(0.0, CURL_WIDTH, DEFAULT_FALLOFF);
        let mut x: f64 = 0.0;
        while x < 1.0 {
            let jump = (curve.score(x) - curve.score(x + 1e-4)).abs();
            assert!(jump < 1e-3, "Jump {} at {} is too large", jump, x);
            x += 0.01;
        }
    }

    #[test]
    fn test_out_of_plane_direction_fades() {
        let library = CurveLibrary::default();
        let toward_camera = DirectionVector::new(0.0, 0.1, 1.0);
        let score = library
            .direction_score(&toward_camera, FingerDirection::VerticalUp)
            .unwrap();
        assert!(score < 0.2, "Finger pointing at the camera should score low, got {}", score);
    }

    #[test]
    fn test_missing_category_is_unknown() {
        let mut curves = BTreeMap::new();
        curves.insert(
            Category::Curl(FingerCurl::NoCurl),
            FuzzyCurve::new(0.0, 0.25, 2.0),
        );
        let library = CurveLibrary::new(curves, 0.7).unwrap();
        assert!(library.contains(Category::Curl(FingerCurl::NoCurl)));
        assert!(matches!(
            library.curl_score(0.3, FingerCurl::FullCurl),
            Err(GestureError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_invalid_curves_rejected() {
        assert!(FuzzyCurve::new(0.0, 0.0, 2.0).validate().is_err());
        assert!(FuzzyCurve::new(0.0, 0.2, -1.0).validate().is_err());
        assert!(FuzzyCurve::new(f64::NAN, 0.2, 2.0).validate().is_err());
        assert!(FuzzyCurve::circular(0.0, 0.2, 2.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_library_from_json() {
        let json = r#"{
            "curves": {
                "NoCurl": { "center": 0.0, "width": 0.3 },
                "VerticalUp": { "center": 90.0, "width": 30.0, "falloff": 4.0, "period": 360.0 }
            },
            "fullPlanarity": 0.5
        }"#;
        let library = CurveLibrary::from_json(json).unwrap();
        assert_eq!(library.categories().count(), 2);
        assert_eq!(library.full_planarity(), 0.5);
        let curve = library.curve(Category::Curl(FingerCurl::NoCurl)).unwrap();
        assert_eq!(curve.falloff, DEFAULT_FALLOFF);

        let bad = r#"{ "curves": { "Sideways": { "center": 0.0, "width": 1.0 } } }"#;
        assert!(CurveLibrary::from_json(bad).is_err());
    }
}
