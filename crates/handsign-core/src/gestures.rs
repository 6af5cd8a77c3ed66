//! Built-in gestures: "stop" (open palm) and "OK".

use crate::description::GestureDescription;
use crate::error::Result;
use crate::registry::GestureRegistry;
use crate::types::{Finger, FingerCurl, FingerDirection};

pub const STOP: &str = "stop";
pub const OK: &str = "OK";

/// Open palm ✋, every finger straight
pub fn stop() -> GestureDescription {
    let mut builder = GestureDescription::builder(STOP);
    for finger in Finger::ALL {
        builder.add_curl(finger, FingerCurl::NoCurl, 1.0);
    }
    builder.build()
}

/// 👌 thumb and index half curled into a ring, other fingers straight up
pub fn ok() -> GestureDescription {
    let mut builder = GestureDescription::builder(OK);
    builder
        .add_curl(Finger::Thumb, FingerCurl::HalfCurl, 1.0)
        .add_curl(Finger::Index, FingerCurl::HalfCurl, 1.0)
        .add_curl(Finger::Middle, FingerCurl::NoCurl, 1.0)
        .add_direction(Finger::Middle, FingerDirection::VerticalUp, 1.0)
        .add_curl(Finger::Ring, FingerCurl::NoCurl, 1.0)
        .add_curl(Finger::Pinky, FingerCurl::NoCurl, 1.0)
        .set_weight(Finger::Thumb, 2.0)
        .set_weight(Finger::Index, 2.0);
    builder.build()
}

/// Registry with "stop" then "OK" over the standard curve library
pub fn default_registry() -> Result<GestureRegistry> {
    let mut builder = GestureRegistry::builder();
    builder.register(stop())?.register(ok())?;
    Ok(builder.build())
}
