//! Observable capture-result state.
//!
//! The feed loop publishes each capture outcome into a shared slot; the
//! embedding UI layer reads it on its own schedule. Last write wins, no
//! history is kept.

use std::sync::{Arc, Mutex};

use super::types::{CameraError, StillImage};

/// Outcome of a single `capture_photo()` invocation.
#[derive(Debug, Clone)]
pub enum CaptureResult {
    /// A decoded, displayable still image
    Image(StillImage),
    /// The capture failed; the controller remains usable
    Failure(CameraError),
}

/// Shared, observable capture-result slot.
///
/// Cloning yields another handle to the same slot. Writes come only from the
/// feed loop; readers get a snapshot clone and never block the writer for
/// longer than the copy.
#[derive(Debug, Clone, Default)]
pub struct CameraState {
    latest: Arc<Mutex<Option<CaptureResult>>>,
}

impl CameraState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a capture outcome, overwriting whatever was there before.
    pub fn publish(&self, result: CaptureResult) {
        if let Ok(mut slot) = self.latest.lock() {
            *slot = Some(result);
        }
    }

    /// The most recently published result, if any.
    pub fn latest(&self) -> Option<CaptureResult> {
        self.latest.lock().ok()?.clone()
    }

    /// The most recently captured image, if the latest result was a success.
    pub fn captured_image(&self) -> Option<StillImage> {
        match self.latest()? {
            CaptureResult::Image(image) => Some(image),
            CaptureResult::Failure(_) => None,
        }
    }

    /// The most recent capture error, if the latest result was a failure.
    pub fn captured_error(&self) -> Option<CameraError> {
        match self.latest()? {
            CaptureResult::Image(_) => None,
            CaptureResult::Failure(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::{Frame, Orientation};

    fn test_image(marker: u8) -> StillImage {
        StillImage {
            bitmap: Frame::rgb(vec![marker; 3], 1, 1),
            orientation: Orientation::Up,
        }
    }

    #[test]
    fn test_state_starts_empty() {
        let state = CameraState::new();
        assert!(state.latest().is_none());
        assert!(state.captured_image().is_none());
        assert!(state.captured_error().is_none());
    }

    #[test]
    fn test_publish_image_is_observable() {
        let state = CameraState::new();
        state.publish(CaptureResult::Image(test_image(7)));

        let image = state.captured_image().expect("image should be published");
        assert_eq!(image.bitmap.data, vec![7, 7, 7]);
        assert!(state.captured_error().is_none());
    }

    #[test]
    fn test_publish_overwrites_previous_result() {
        let state = CameraState::new();
        state.publish(CaptureResult::Image(test_image(1)));
        state.publish(CaptureResult::Image(test_image(2)));

        let image = state.captured_image().expect("image should be published");
        assert_eq!(image.bitmap.data, vec![2, 2, 2]);
    }

    #[test]
    fn test_failure_replaces_image() {
        let state = CameraState::new();
        state.publish(CaptureResult::Image(test_image(1)));
        state.publish(CaptureResult::Failure(CameraError::DecodeFailed(
            "truncated".to_string(),
        )));

        assert!(state.captured_image().is_none());
        let err = state.captured_error().expect("error should be published");
        assert!(matches!(err, CameraError::DecodeFailed(_)));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let state = CameraState::new();
        let observer = state.clone();
        state.publish(CaptureResult::Image(test_image(9)));

        assert!(observer.captured_image().is_some());
    }
}
