//! Background preview/capture feed.
//!
//! The feed loop owns the bound session while the controller is attached to a
//! surface: it pumps preview frames into the surface and the latest-frame
//! slot, and executes queued photo-capture commands, publishing each outcome
//! into the shared [`CameraState`] slot. Commands arrive over a channel and
//! run serially in order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::backend::CameraSession;
use super::frame_utils::decode_still;
use super::preview::PreviewSurface;
use super::state::{CameraState, CaptureResult};
use super::types::{CameraError, Frame, PhotoSettings, SessionSettings};

/// Commands sent to the feed loop.
pub enum FeedCommand {
    /// Capture one still photo and publish the result
    CapturePhoto(PhotoSettings),
    /// Stop the feed and hand the session back
    Stop,
}

/// Run the feed loop until stopped; returns the session to the caller so a
/// later attach can reuse it without rebinding.
pub fn run_feed_loop(
    mut session: Box<dyn CameraSession>,
    mut surface: Box<dyn PreviewSurface>,
    settings: SessionSettings,
    frame_slot: Arc<Mutex<Option<Frame>>>,
    state: CameraState,
    stop: Arc<AtomicBool>,
    rx: Receiver<FeedCommand>,
) -> Box<dyn CameraSession> {
    while !stop.load(Ordering::Relaxed) {
        match rx.try_recv() {
            Ok(FeedCommand::CapturePhoto(photo)) => {
                state.publish(capture_once(session.as_mut(), &photo));
                continue;
            }
            Ok(FeedCommand::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        if let Ok(mut frame) = session.preview_frame() {
            if settings.mirror_preview {
                frame.mirror_horizontal();
            }
            surface.render(&frame);
            if let Ok(mut slot) = frame_slot.lock() {
                *slot = Some(frame);
            }
        }

        // preview_frame blocks until the next frame on real sessions; the
        // sleep only paces fakes and error loops
        thread::sleep(Duration::from_millis(1));
    }

    let _ = session.stop_stream();
    session
}

/// Execute one still capture and map the outcome to a publishable result.
///
/// A platform-reported error surfaces as `PlatformCaptureError`; a frame with
/// no decodable representation surfaces as `DecodeFailed`. Neither touches
/// the session's ability to serve the next capture.
fn capture_once(session: &mut dyn CameraSession, settings: &PhotoSettings) -> CaptureResult {
    let still = match session.capture_still(settings) {
        Ok(still) => still,
        Err(err) => {
            let err = match err {
                platform @ CameraError::PlatformCaptureError(_) => platform,
                other => CameraError::PlatformCaptureError(other.to_string()),
            };
            log::warn!("still capture failed: {}", err);
            return CaptureResult::Failure(err);
        }
    };

    match decode_still(still) {
        Ok(image) => {
            log::debug!(
                "captured {}x{} still, orientation {:?}",
                image.bitmap.width,
                image.bitmap.height,
                image.orientation
            );
            CaptureResult::Image(image)
        }
        Err(err) => {
            log::warn!("still decode failed: {}", err);
            CaptureResult::Failure(err)
        }
    }
}
