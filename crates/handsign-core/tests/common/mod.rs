//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use handsign_core::synthetic::{FingerPose, SyntheticHand};
use handsign_core::{gestures, DirectionVector, Finger, GestureRegistry, HandGeometry, FINGER_COUNT};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; filter with `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn default_registry() -> Arc<GestureRegistry> {
    Arc::new(gestures::default_registry().unwrap())
}

/// Thumb and index bent halfway into a ring, the rest straight up
pub fn ok_hand() -> SyntheticHand {
    SyntheticHand::open()
        .with_finger(Finger::Thumb, FingerPose::new(65.0, 120.0))
        .with_finger(Finger::Index, FingerPose::new(120.0, 90.0))
}

/// Whole hand pointing to the viewer's left
pub fn left_pointing_hand() -> SyntheticHand {
    Finger::ALL.into_iter().fold(
        SyntheticHand::open().with_palm_azimuth(180.0),
        |hand, finger| {
            let azimuth = if finger == Finger::Thumb { 225.0 } else { 180.0 };
            hand.with_finger(finger, FingerPose::straight(azimuth))
        },
    )
}

/// Geometry with the given curls and every finger pointing at `azimuth`
pub fn geometry(curls: [f64; FINGER_COUNT], azimuth: f64) -> HandGeometry {
    HandGeometry::from_measurements(curls, [DirectionVector::from_azimuth_degrees(azimuth); FINGER_COUNT])
}

pub const POINTING_TEMPLATES: &str = r#"[
    {
        "name": "point-left",
        "curls": [
            { "finger": "Index", "category": "NoCurl" },
            { "finger": "Middle", "category": "NoCurl" }
        ],
        "directions": [
            { "finger": "Index", "category": "HorizontalLeft" },
            { "finger": "Middle", "category": "HorizontalLeft", "confidence": 0.9 }
        ],
        "weights": { "Index": 2.0 }
    },
    {
        "name": "point-right",
        "curls": [{ "finger": "Index", "category": "NoCurl" }],
        "directions": [{ "finger": "Index", "category": "HorizontalRight" }],
        "weights": { "Index": 2.0 }
    }
]"#;
