//! Controller lifecycle notifications.

/// Optional observer for controller lifecycle events.
///
/// Each notification fires at most once per controller lifecycle, during
/// construction, in causal order on the happy path: access granted, then
/// session started. All methods default to no-ops so implementors only
/// override what they care about.
pub trait CameraDelegate {
    /// The platform granted camera access.
    fn camera_access_granted(&self) {}

    /// The platform denied camera access; the controller is terminal.
    fn camera_access_denied(&self) {}

    /// No matching device was found or it could not be bound; terminal.
    fn no_camera_detected(&self) {}

    /// The capture session was configured and committed.
    fn camera_session_started(&self) {}
}
