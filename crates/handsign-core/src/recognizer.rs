//! Recognizer
//!
//! One hand stream end to end: landmarks in, geometry extracted, every
//! registered gesture scored, and the result optionally smoothed over time.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::estimator::{EstimateRecord, FrameEstimate, GestureEstimator};
use crate::geometry::{FingerPoseSummary, GeometryExtractor, HandGeometry};
use crate::registry::GestureRegistry;
use crate::session::{ClassificationSession, SmoothedEstimate};
use crate::types::Landmark;

/// Outcome of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub geometry: HandGeometry,
    pub frame: FrameEstimate,
    /// Present when smoothing is enabled
    pub smoothed: Option<SmoothedEstimate>,
}

impl Recognition {
    /// Smoothed best match when smoothing is on, otherwise the frame's
    pub fn best_match(&self) -> Option<&str> {
        match &self.smoothed {
            Some(smoothed) => smoothed.best_match_name(),
            None => self.frame.best_match_name(),
        }
    }

    /// Flat `{ bestMatch, confidences }` record of the reported result
    pub fn to_record(&self) -> EstimateRecord {
        match &self.smoothed {
            Some(smoothed) => smoothed.to_record(),
            None => self.frame.to_record(),
        }
    }
}

pub struct HandSignRecognizer {
    registry: Arc<GestureRegistry>,
    extractor: GeometryExtractor,
    estimator: GestureEstimator,
    session: Option<ClassificationSession>,
}

impl HandSignRecognizer {
    pub fn new(config: &EngineConfig, registry: Arc<GestureRegistry>) -> Result<Self> {
        config.validate()?;
        let session = if config.smoothing {
            Some(ClassificationSession::new(config.session.clone())?)
        } else {
            None
        };

        tracing::debug!(
            gestures = registry.len(),
            smoothing = config.smoothing,
            "Recognizer created"
        );
        Ok(Self {
            registry,
            extractor: GeometryExtractor::new(config.extractor.clone()),
            estimator: GestureEstimator::new(config.estimator.clone())?,
            session,
        })
    }

    pub fn registry(&self) -> &GestureRegistry {
        &self.registry
    }

    /// Process one frame of 21 landmarks
    pub fn process(&mut self, landmarks: &[Landmark]) -> Result<Recognition> {
        let geometry = self.extractor.extract(landmarks)?;
        let frame = self.estimator.estimate(&geometry, &self.registry)?;
        let smoothed = self.session.as_mut().map(|s| s.push(frame.clone()));
        Ok(Recognition {
            geometry,
            frame,
            smoothed,
        })
    }

    /// Best curl and direction per finger, without touching the session
    pub fn describe_pose(&self, landmarks: &[Landmark]) -> Result<Vec<FingerPoseSummary>> {
        let geometry = self.extractor.extract(landmarks)?;
        Ok(geometry.pose_summary(self.registry.library()))
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
    }
}
