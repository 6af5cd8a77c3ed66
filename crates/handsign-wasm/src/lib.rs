use handsign_core::{
    gestures, EngineConfig, GestureError, GestureRegistry, GestureTemplate, HandSignRecognizer, Landmark,
    LANDMARK_COUNT,
};
use serde::Serialize;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Hand-sign recognizer for one landmark stream.
///
/// ```js
/// const recognizer = new GestureRecognizer({ extractor: { mirrorX: true } });
/// const { bestMatch, confidences } = recognizer.estimate(hand.keypoints3D);
/// ```
#[wasm_bindgen]
pub struct GestureRecognizer {
    inner: HandSignRecognizer,
}

#[wasm_bindgen]
impl GestureRecognizer {
    /// `config` is an `EngineConfig` object, `templates` an array of gesture
    /// templates; either may be omitted. Without templates the built-in
    /// "stop" and "OK" gestures are loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, templates: JsValue) -> Result<GestureRecognizer, JsError> {
        let config: EngineConfig = if is_absent(&config) {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&format!("invalid configuration: {e}")))?
        };
        let templates: Option<Vec<GestureTemplate>> = if is_absent(&templates) {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(templates).map_err(|e| JsError::new(&format!("invalid templates: {e}")))?)
        };

        let registry = build_registry(templates.as_deref())?;
        let inner = HandSignRecognizer::new(&config, Arc::new(registry))?;
        Ok(Self { inner })
    }

    /// Classify one frame given as `[[x, y, z], ...]` or `[{x, y, z}, ...]`.
    ///
    /// Returns `{ bestMatch, confidences }`.
    pub fn estimate(&mut self, landmarks: JsValue) -> Result<JsValue, JsError> {
        let landmarks: Vec<Landmark> = serde_wasm_bindgen::from_value(landmarks)
            .map_err(|e| JsError::new(&format!("invalid landmark set: {e}")))?;
        let recognition = self.inner.process(&landmarks)?;
        to_js(&recognition.to_record())
    }

    /// Classify one frame from 63 flat coordinates `x0, y0, z0, x1, ...`
    pub fn estimate_from_coords(&mut self, coords: &[f64]) -> Result<JsValue, JsError> {
        let landmarks = landmarks_from_coords(coords)?;
        let recognition = self.inner.process(&landmarks)?;
        to_js(&recognition.to_record())
    }

    /// Best curl and direction per finger, for overlays
    pub fn describe_pose(&self, landmarks: JsValue) -> Result<JsValue, JsError> {
        let landmarks: Vec<Landmark> = serde_wasm_bindgen::from_value(landmarks)
            .map_err(|e| JsError::new(&format!("invalid landmark set: {e}")))?;
        to_js(&self.inner.describe_pose(&landmarks)?)
    }

    /// Registered gesture names, in registration order
    pub fn gesture_names(&self) -> js_sys::Array {
        self.inner
            .registry()
            .names()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    /// Forget smoothing history, e.g. when the hand leaves the frame
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

fn build_registry(templates: Option<&[GestureTemplate]>) -> handsign_core::Result<GestureRegistry> {
    let Some(templates) = templates else {
        return gestures::default_registry();
    };
    let mut builder = GestureRegistry::builder();
    for template in templates {
        builder.register_template(template)?;
    }
    Ok(builder.build())
}

fn landmarks_from_coords(coords: &[f64]) -> handsign_core::Result<Vec<Landmark>> {
    if coords.len() != LANDMARK_COUNT * 3 {
        return Err(GestureError::InvalidLandmarkSet(format!(
            "expected {} coordinates, got {}",
            LANDMARK_COUNT * 3,
            coords.len()
        )));
    }
    Ok(coords
        .chunks_exact(3)
        .map(|c| Landmark::new(c[0], c[1], c[2]))
        .collect())
}
