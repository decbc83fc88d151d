//! Camera capture module: permissioned session lifecycle, live preview feed,
//! and still-photo capture.
//!
//! This module provides a high-level API for embedding a camera preview:
//! - Lifecycle and capture via [`CaptureController`]
//! - The platform-pipeline seam via [`CameraBackend`] / [`CameraSession`]
//! - The display-layer seam via [`PreviewSurface`]
//! - Observable capture results via [`CameraState`]

mod backend;
mod controller;
mod delegate;
mod device;
mod feed_loop;
mod frame_utils;
mod native;
mod preview;
mod state;
mod types;

pub use backend::{CameraBackend, CameraSession};
pub use controller::{CaptureController, Phase};
pub use delegate::CameraDelegate;
pub use device::find_device;
pub use frame_utils::{decode_still, exif_orientation};
pub use native::NativeBackend;
pub use preview::{fit_rect, PreviewSurface, Rect, VideoGravity};
pub use state::{CameraState, CaptureResult};
pub use types::{
    CameraError, CameraInfo, ControllerSettings, DeviceKind, DevicePosition, FlashMode, Frame,
    FrameFormat, Orientation, PhotoSettings, Resolution, SessionFormat, SessionSettings,
    StillFrame, StillImage,
};
