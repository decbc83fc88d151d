//! viewfinder: embeddable camera preview and still-photo capture.
//!
//! The [`camera::CaptureController`] owns the whole lifecycle: resolve camera
//! permission, bind a session to a matching device, run the preview feed into
//! a surface the embedding UI provides, and capture still photos on demand.
//! Outcomes surface through an optional [`camera::CameraDelegate`] and the
//! observable [`camera::CameraState`] slot.

pub mod camera;
pub mod config;
pub mod permissions;
