//! End-to-end recognition over synthetic landmark streams

mod common;

use std::sync::Arc;

use handsign_core::gestures::{OK, STOP};
use handsign_core::synthetic::SyntheticHand;
use handsign_core::{
    CurveLibrary, EngineConfig, GeometryExtractor, GestureError, GestureEstimator, GestureRegistry,
    HandSignRecognizer, Landmark,
};

fn mirrored(landmarks: &[Landmark], width: f64) -> Vec<Landmark> {
    landmarks
        .iter()
        .map(|p| Landmark::new(width - p.x, p.y, p.z))
        .collect()
}

#[test]
fn test_default_gestures_end_to_end() {
    common::init_tracing();
    let config = EngineConfig {
        smoothing: false,
        ..Default::default()
    };
    let mut recognizer = HandSignRecognizer::new(&config, common::default_registry()).unwrap();

    let ok = recognizer.process(&common::ok_hand().landmarks()).unwrap();
    assert_eq!(ok.best_match(), Some(OK));

    let stop = recognizer.process(&SyntheticHand::open().landmarks()).unwrap();
    assert_eq!(stop.best_match(), Some(STOP));

    let fist = recognizer.process(&SyntheticHand::fist().landmarks()).unwrap();
    assert_eq!(fist.best_match(), None);
    assert_eq!(fist.to_record().confidences.len(), 2);
}

#[test]
fn test_recognition_ignores_scale_position_and_yaw() {
    common::init_tracing();
    let config = EngineConfig {
        smoothing: false,
        ..Default::default()
    };
    let mut recognizer = HandSignRecognizer::new(&config, common::default_registry()).unwrap();

    let variants = [
        common::ok_hand().with_scale(15.0),
        common::ok_hand().with_scale(900.0).with_origin([-50.0, 7.5, 3.0]),
        common::ok_hand().with_yaw(35.0),
    ];
    for hand in variants {
        let recognition = recognizer.process(&hand.landmarks()).unwrap();
        assert_eq!(recognition.best_match(), Some(OK), "{hand:?}");
    }
}

#[test]
fn test_json_templates_with_mirrored_feed() {
    common::init_tracing();
    let registry = Arc::new(GestureRegistry::from_json(CurveLibrary::default(), common::POINTING_TEMPLATES).unwrap());
    let config = EngineConfig::from_json_str(r#"{ "extractor": { "mirrorX": true }, "smoothing": false }"#).unwrap();
    let mut recognizer = HandSignRecognizer::new(&config, registry).unwrap();

    let landmarks = mirrored(&common::left_pointing_hand().landmarks(), 640.0);
    let recognition = recognizer.process(&landmarks).unwrap();
    assert_eq!(recognition.best_match(), Some("point-left"));
    assert!(recognition.frame.confidence("point-right").unwrap() < 0.51);

    // Same feed read without mirroring points the other way
    let config = EngineConfig::from_json_str(r#"{ "smoothing": false }"#).unwrap();
    let registry = Arc::new(GestureRegistry::from_json(CurveLibrary::default(), common::POINTING_TEMPLATES).unwrap());
    let mut unmirrored = HandSignRecognizer::new(&config, registry).unwrap();
    let recognition = unmirrored.process(&landmarks).unwrap();
    assert_eq!(recognition.best_match(), Some("point-right"));
}

#[test]
fn test_batch_replay_keeps_frame_order() {
    common::init_tracing();
    let registry = common::default_registry();
    let extractor = GeometryExtractor::default();
    let hands = [
        SyntheticHand::open(),
        common::ok_hand(),
        SyntheticHand::fist(),
        SyntheticHand::open().with_yaw(-20.0),
    ];
    let geometries = hands
        .iter()
        .map(|hand| extractor.extract(&hand.landmarks()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let estimates = GestureEstimator::default()
        .estimate_batch(&geometries, &registry)
        .unwrap();
    let best: Vec<Option<&str>> = estimates.iter().map(|e| e.best_match_name()).collect();
    assert_eq!(best, vec![Some(STOP), Some(OK), None, Some(STOP)]);
}

#[test]
fn test_template_rejections() {
    common::init_tracing();
    let cases = [
        (r#"[{ "name": "blank" }]"#, "empty"),
        (
            r#"[{ "name": "x", "curls": [{ "finger": "Index", "category": "Wiggly" }] }]"#,
            "category",
        ),
        (
            r#"[{ "name": "x", "curls": [{ "finger": "Index", "category": "NoCurl", "confidence": 1.2 }] }]"#,
            "parameter",
        ),
        (
            r#"[
                { "name": "stop", "curls": [{ "finger": "Thumb", "category": "NoCurl" }] },
                { "name": "stop", "curls": [{ "finger": "Index", "category": "NoCurl" }],
                  "directions": [{ "finger": "Index", "category": "VerticalUp" }] }
            ]"#,
            "duplicate",
        ),
    ];

    for (json, kind) in cases {
        let err = GestureRegistry::from_json(CurveLibrary::default(), json).unwrap_err();
        let matched = match kind {
            "empty" => matches!(err, GestureError::EmptyGestureDescription(_)),
            "category" => matches!(err, GestureError::UnknownCategory(_)),
            "parameter" => matches!(err, GestureError::InvalidParameter(_)),
            "duplicate" => matches!(err, GestureError::DuplicateGestureName(_)),
            _ => false,
        };
        assert!(matched, "{kind}: unexpected {err:?}");
    }
}

#[test]
fn test_custom_curve_library_from_json() {
    common::init_tracing();
    // Curl-only library: direction templates no longer register
    let library = CurveLibrary::from_json(
        r#"{
            "curves": {
                "NoCurl": { "center": 0.0, "width": 0.3 },
                "HalfCurl": { "center": 0.5, "width": 0.3 },
                "FullCurl": { "center": 1.0, "width": 0.3 }
            }
        }"#,
    )
    .unwrap();

    assert!(matches!(
        GestureRegistry::from_json(library.clone(), common::POINTING_TEMPLATES),
        Err(GestureError::UnknownCategory(_))
    ));

    let registry = GestureRegistry::from_json(
        library,
        r#"[{ "name": "fist", "curls": [
            { "finger": "Index", "category": "FullCurl" },
            { "finger": "Middle", "category": "FullCurl" }
        ] }]"#,
    )
    .unwrap();
    let estimate = GestureEstimator::default()
        .estimate(&common::geometry([1.0; 5], 270.0), &registry)
        .unwrap();
    assert_eq!(estimate.best_match_name(), Some("fist"));
}

#[test]
fn test_yawed_open_hands_always_extract() {
    common::init_tracing();
    let extractor = GeometryExtractor::default();
    for yaw in -45..45 {
        let hand = SyntheticHand::open().with_yaw(yaw as f64);
        assert!(extractor.extract(&hand.landmarks()).is_ok(), "yaw {yaw}");
    }
    assert!(extractor.extract(&common::ok_hand().landmarks()).is_ok());
}
