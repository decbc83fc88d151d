//! Capture controller: permission resolution, session configuration, and the
//! attach/detach lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::permissions::PermissionState;

use super::backend::{CameraBackend, CameraSession};
use super::delegate::CameraDelegate;
use super::device::find_device;
use super::feed_loop::{run_feed_loop, FeedCommand};
use super::preview::PreviewSurface;
use super::state::CameraState;
use super::types::{CameraError, CameraInfo, ControllerSettings, Frame, SessionFormat};

/// Lifecycle phase of a controller.
///
/// `Denied` and `NoDevice` are terminal: there is no recovery transition
/// within one controller instance; construct a new one to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Camera access was denied (or never resolved to granted)
    Denied,
    /// No matching device was found, or it could not be bound
    NoDevice,
    /// Session bound and committed; feed not running
    Stopped,
    /// Session bound; feed running into an attached surface
    Running,
}

/// Owns the capture-session lifecycle and exposes still-photo capture.
///
/// Construction resolves permission, locates a device matching the requested
/// kind and position, and binds the session, reporting progress through the
/// optional delegate. Construction itself never fails; a controller that
/// could not be configured parks in a terminal [`Phase`] and rejects capture
/// calls with [`CameraError::NotConfigured`].
///
/// The live feed runs only between [`attach`](Self::attach) and
/// [`detach`](Self::detach); detaching releases the camera hardware and a
/// later attach reuses the bound session without re-requesting permission.
pub struct CaptureController {
    phase: Phase,
    permission: PermissionState,
    settings: ControllerSettings,
    device: Option<CameraInfo>,
    format: Option<SessionFormat>,
    /// Present while Stopped; moved into the feed thread while Running
    session: Option<Box<dyn CameraSession>>,
    feed: Option<FeedHandle>,
    state: CameraState,
    /// Latest preview frame (shared with the feed thread)
    frame_slot: Arc<Mutex<Option<Frame>>>,
}

struct FeedHandle {
    thread: JoinHandle<Box<dyn CameraSession>>,
    command_tx: Sender<FeedCommand>,
    stop: Arc<AtomicBool>,
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("phase", &self.phase)
            .field("permission", &self.permission)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl CaptureController {
    /// Build a controller: resolve permission, find a device, bind a session.
    ///
    /// Lifecycle events fire on `delegate` in causal order; on the happy path
    /// `camera_access_granted` then `camera_session_started`. Errors on this
    /// path never propagate to the caller; the resulting controller reports
    /// them through [`phase`](Self::phase).
    pub fn new(
        backend: &mut dyn CameraBackend,
        settings: ControllerSettings,
        delegate: Option<&dyn CameraDelegate>,
    ) -> Self {
        let mut controller = Self {
            phase: Phase::Denied,
            permission: PermissionState::Undetermined,
            settings,
            device: None,
            format: None,
            session: None,
            feed: None,
            state: CameraState::new(),
            frame_slot: Arc::new(Mutex::new(None)),
        };

        controller.permission = backend.request_access();
        if !controller.permission.is_granted() {
            log::warn!(
                "camera access {}; controller left unconfigured",
                controller.permission
            );
            notify(delegate, |d| d.camera_access_denied());
            return controller;
        }
        notify(delegate, |d| d.camera_access_granted());

        let devices = match backend.list_devices() {
            Ok(devices) => devices,
            Err(err) => {
                log::warn!("device enumeration failed: {}", err);
                controller.phase = Phase::NoDevice;
                notify(delegate, |d| d.no_camera_detected());
                return controller;
            }
        };

        let device = match find_device(
            &devices,
            controller.settings.kind,
            controller.settings.position,
        ) {
            Some(device) => device.clone(),
            None => {
                log::warn!(
                    "no {} camera at position '{}' among {} device(s)",
                    controller.settings.kind,
                    controller.settings.position,
                    devices.len()
                );
                controller.phase = Phase::NoDevice;
                notify(delegate, |d| d.no_camera_detected());
                return controller;
            }
        };

        let session = match backend.bind_session(&device, &controller.settings.session) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("failed to bind capture session to {}: {}", device, err);
                controller.phase = Phase::NoDevice;
                notify(delegate, |d| d.no_camera_detected());
                return controller;
            }
        };

        let format = session.active_format();
        log::info!(
            "capture session configured on {} at {} @ {} fps",
            device,
            format.resolution,
            format.fps
        );
        controller.format = Some(format);
        controller.device = Some(device);
        controller.session = Some(session);
        controller.phase = Phase::Stopped;
        notify(delegate, |d| d.camera_session_started());
        controller
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The permission state resolved at construction.
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Whether a session is bound (Stopped or Running).
    pub fn is_configured(&self) -> bool {
        matches!(self.phase, Phase::Stopped | Phase::Running)
    }

    /// Whether the feed is running into an attached surface.
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// The device the session is bound to, if configured.
    pub fn device(&self) -> Option<&CameraInfo> {
        self.device.as_ref()
    }

    /// The format the session is actually running at, if configured.
    pub fn active_format(&self) -> Option<SessionFormat> {
        self.format
    }

    /// The controller settings as given at construction.
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// A handle to the observable capture-result slot.
    pub fn state(&self) -> CameraState {
        self.state.clone()
    }

    /// The latest preview frame, if the feed has produced one.
    pub fn preview_frame(&self) -> Option<Frame> {
        self.frame_slot.lock().ok()?.clone()
    }

    /// Start the preview feed into `surface`.
    ///
    /// No-op when already running. Safe to call repeatedly.
    ///
    /// # Errors
    /// * `CameraError::NotConfigured` - the controller is in a terminal phase
    /// * `CameraError::StreamFailed` - the stream refused to start
    pub fn attach<S: PreviewSurface + 'static>(&mut self, surface: S) -> Result<(), CameraError> {
        if self.phase == Phase::Running {
            return Ok(());
        }
        let mut session = self.session.take().ok_or(CameraError::NotConfigured)?;

        if let Err(err) = session.start_stream() {
            self.session = Some(session);
            return Err(err);
        }

        let (command_tx, command_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let frame_slot = Arc::clone(&self.frame_slot);
        let state = self.state.clone();
        let session_settings = self.settings.session.clone();
        let loop_stop = Arc::clone(&stop);

        let thread = std::thread::spawn(move || {
            run_feed_loop(
                session,
                Box::new(surface),
                session_settings,
                frame_slot,
                state,
                loop_stop,
                command_rx,
            )
        });

        self.feed = Some(FeedHandle {
            thread,
            command_tx,
            stop,
        });
        self.phase = Phase::Running;
        log::info!("preview feed started");
        Ok(())
    }

    /// Stop the preview feed and release the camera hardware.
    ///
    /// No-op when not running. Safe to call repeatedly. The bound session is
    /// recovered for a later attach.
    pub fn detach(&mut self) {
        let Some(feed) = self.feed.take() else {
            return;
        };
        feed.stop.store(true, Ordering::SeqCst);
        // Also send a command in case the loop is blocked on the channel
        let _ = feed.command_tx.send(FeedCommand::Stop);

        match feed.thread.join() {
            Ok(session) => {
                self.session = Some(session);
                self.phase = Phase::Stopped;
                log::info!("preview feed stopped");
            }
            Err(_) => {
                // Feed thread panicked and took the session with it
                self.phase = Phase::NoDevice;
                log::error!("preview feed thread panicked; session lost");
            }
        }
    }

    /// Request one still-photo capture.
    ///
    /// Fire-and-forget: the outcome arrives in the observable state slot.
    /// Requests queue serially; each completion overwrites the previous
    /// result.
    ///
    /// # Errors
    /// * `CameraError::NotConfigured` - no configured, running session
    /// * `CameraError::StreamFailed` - the feed terminated unexpectedly
    pub fn capture_photo(&self) -> Result<(), CameraError> {
        let feed = self.feed.as_ref().ok_or(CameraError::NotConfigured)?;
        feed.command_tx
            .send(FeedCommand::CapturePhoto(self.settings.photo.clone()))
            .map_err(|_| CameraError::StreamFailed("preview feed terminated".to_string()))
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.detach();
    }
}

fn notify(delegate: Option<&dyn CameraDelegate>, event: impl Fn(&dyn CameraDelegate)) {
    if let Some(delegate) = delegate {
        event(delegate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeniedBackend;

    impl CameraBackend for DeniedBackend {
        fn request_access(&mut self) -> PermissionState {
            PermissionState::Denied
        }

        fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
            panic!("must not enumerate devices when access is denied");
        }

        fn bind_session(
            &mut self,
            _device: &CameraInfo,
            _settings: &super::super::types::SessionSettings,
        ) -> Result<Box<dyn CameraSession>, CameraError> {
            panic!("must not bind a session when access is denied");
        }
    }

    #[test]
    fn test_denied_controller_is_terminal() {
        let mut backend = DeniedBackend;
        let controller = CaptureController::new(&mut backend, ControllerSettings::default(), None);

        assert_eq!(controller.phase(), Phase::Denied);
        assert_eq!(controller.permission(), PermissionState::Denied);
        assert!(!controller.is_configured());
        assert!(controller.device().is_none());
        assert!(controller.active_format().is_none());
        assert!(matches!(
            controller.capture_photo(),
            Err(CameraError::NotConfigured)
        ));
    }
}
