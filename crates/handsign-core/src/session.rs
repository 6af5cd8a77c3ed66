//! Classification Session
//!
//! Temporal smoothing over the most recent frame estimates of one hand
//! stream. Single-frame flicker is damped by an exponentially weighted mean
//! that favours recent frames.
//!
//! A session is owned by one consumer; callers that share one must serialize
//! their `push` calls.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{GestureError, Result};
use crate::estimator::{select_best, validate_threshold, EstimateRecord, FrameEstimate};

pub const DEFAULT_WINDOW_SIZE: usize = 5;
pub const DEFAULT_DECAY: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Number of frames kept
    pub window_size: usize,
    /// Weight multiplier per frame of age, in `(0, 1]`
    pub decay: f64,
    /// Minimum smoothed confidence for a best match
    pub acceptance_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            decay: DEFAULT_DECAY,
            acceptance_threshold: crate::estimator::DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(GestureError::InvalidConfig(
                "session.windowSize must be at least 1".to_string(),
            ));
        }
        if !(self.decay.is_finite() && self.decay > 0.0 && self.decay <= 1.0) {
            return Err(GestureError::InvalidConfig(format!(
                "session.decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        validate_threshold("session.acceptanceThreshold", self.acceptance_threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedScore {
    pub name: String,
    pub confidence: f64,
}

/// Smoothed confidences after a push.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedEstimate {
    scores: Vec<SmoothedScore>,
    best: Option<usize>,
    frames: usize,
}

impl SmoothedEstimate {
    /// Gestures ordered as in the newest frame, then any seen only earlier
    pub fn scores(&self) -> &[SmoothedScore] {
        &self.scores
    }

    pub fn confidence(&self, name: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.confidence)
    }

    pub fn best_match(&self) -> Option<&SmoothedScore> {
        self.best.map(|i| &self.scores[i])
    }

    pub fn best_match_name(&self) -> Option<&str> {
        self.best_match().map(|s| s.name.as_str())
    }

    /// Frames the smoothing was computed over
    pub fn frames(&self) -> usize {
        self.frames
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

#[derive(Debug, Clone)]
pub struct ClassificationSession {
    config: SessionConfig,
    /// Newest first
    window: VecDeque<FrameEstimate>,
    last_best: Option<String>,
}

impl ClassificationSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: VecDeque::with_capacity(config.window_size),
            config,
            last_best: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Add a frame, evicting the oldest once the window is full
    pub fn push(&mut self, estimate: FrameEstimate) -> SmoothedEstimate {
        if self.window.len() == self.config.window_size {
            self.window.pop_back();
        }
        self.window.push_front(estimate);

        let smoothed = self.smooth();
        let best = smoothed.best_match_name();
        if best != self.last_best.as_deref() {
            tracing::debug!(
                previous = ?self.last_best,
                current = ?best,
                frames = smoothed.frames,
                "Smoothed best match changed"
            );
            self.last_best = best.map(str::to_string);
        }
        smoothed
    }

    /// Drop every buffered frame
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_best = None;
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn smooth(&self) -> SmoothedEstimate {
        let mut names: Vec<&str> = Vec::new();
        for frame in &self.window {
            for score in frame.scores() {
                if !names.contains(&score.name.as_str()) {
                    names.push(&score.name);
                }
            }
        }

        let mut weight = 1.0;
        let mut total_weight = 0.0;
        let mut sums = vec![0.0; names.len()];
        for frame in &self.window {
            for (sum, name) in sums.iter_mut().zip(&names) {
                // Missing from this frame counts as 0
                *sum += weight * frame.confidence(name).unwrap_or(0.0);
            }
            total_weight += weight;
            weight *= self.config.decay;
        }

        let scores: Vec<SmoothedScore> = names
            .iter()
            .zip(sums)
            .map(|(name, sum)| SmoothedScore {
                name: name.to_string(),
                confidence: if total_weight > 0.0 { sum / total_weight } else { 0.0 },
            })
            .collect();

        let best = select_best(scores.iter().map(|s| s.confidence), self.config.acceptance_threshold);
        SmoothedEstimate {
            scores,
            best,
            frames: self.window.len(),
        }
    }
}

// ==================== Unit Tests ====================
