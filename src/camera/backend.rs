//! Platform media-pipeline seam.
//!
//! The controller never talks to camera hardware directly; it goes through
//! [`CameraBackend`] to resolve access, enumerate devices, and bind a
//! session, and through [`CameraSession`] to run the bound pipeline. The
//! production implementation is [`crate::camera::NativeBackend`]; tests use
//! scripted fakes.

use crate::permissions::PermissionState;

use super::types::{
    CameraError, CameraInfo, Frame, PhotoSettings, SessionFormat, SessionSettings, StillFrame,
};

/// Entry point into the platform camera pipeline.
pub trait CameraBackend {
    /// Resolve camera access with the platform.
    ///
    /// Must answer from the backend's own context; the caller is free to be
    /// the UI thread, so this must never wait on a callback that could be
    /// scheduled onto the calling thread.
    fn request_access(&mut self) -> PermissionState;

    /// List the capture devices currently visible to the platform.
    ///
    /// No cameras is an empty list, not an error.
    fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError>;

    /// Bind a capture session to `device`: one video input, one photo output.
    ///
    /// # Errors
    /// * `CameraError::InputBindingFailed` - the device could not be opened as input
    /// * `CameraError::OutputBindingFailed` - the photo output could not be attached
    /// * `CameraError::PermissionDenied` - the platform refused access at open time
    fn bind_session(
        &mut self,
        device: &CameraInfo,
        settings: &SessionSettings,
    ) -> Result<Box<dyn CameraSession>, CameraError>;
}

/// A bound capture session: the live pipeline from one device to one
/// photo-capable output.
///
/// Sessions are `Send` so the controller can move them into its feed-loop
/// thread on attach and recover them on detach.
pub trait CameraSession: Send {
    /// The format the session is actually running at.
    fn active_format(&self) -> SessionFormat;

    /// Start the live stream. Idempotent.
    fn start_stream(&mut self) -> Result<(), CameraError>;

    /// Stop the live stream and release the device. Idempotent.
    fn stop_stream(&mut self) -> Result<(), CameraError>;

    /// Pull the next preview frame from the running stream.
    fn preview_frame(&mut self) -> Result<Frame, CameraError>;

    /// Capture one still frame from the running stream.
    fn capture_still(&mut self, settings: &PhotoSettings) -> Result<StillFrame, CameraError>;
}
