//! Fuzzy hand-sign recognition over 21-point hand landmarks.
//!
//! Pipeline per frame:
//! 1. [`GeometryExtractor`] turns landmarks into per-finger curl and direction
//! 2. [`CurveLibrary`] maps each measurement to fuzzy category memberships
//! 3. [`GestureEstimator`] scores every [`GestureDescription`] in a [`GestureRegistry`]
//! 4. [`ClassificationSession`] smooths best matches over recent frames
//!
//! [`HandSignRecognizer`] wires the steps together for one hand stream.

pub mod config;
pub mod curve;
pub mod description;
pub mod error;
pub mod estimator;
pub mod geometry;
pub mod gestures;
pub mod recognizer;
pub mod registry;
pub mod session;
pub mod synthetic;
pub mod types;

pub use config::EngineConfig;
pub use curve::{CurveLibrary, FuzzyCurve};
pub use description::{
    CurlConstraint, DirectionConstraint, FingerConstraints, GestureDescription, GestureDescriptionBuilder,
    GestureTemplate, TemplateConstraint,
};
pub use error::{GestureError, Result};
pub use estimator::{EstimateRecord, EstimatorConfig, FrameEstimate, GestureEstimator, GestureScore};
pub use geometry::{
    DirectionVector, ExtractorConfig, FingerGeometry, FingerPoseSummary, GeometryExtractor, HandGeometry,
};
pub use recognizer::{HandSignRecognizer, Recognition};
pub use registry::{GestureRegistry, GestureRegistryBuilder};
pub use session::{ClassificationSession, SessionConfig, SmoothedEstimate, SmoothedScore};
pub use types::*;
