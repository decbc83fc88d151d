//! nokhwa-backed camera backend.
//!
//! The platform camera handle is not `Send` on every OS, so each bound
//! session runs a worker thread that owns the handle and serves a small
//! command protocol. The [`NativeSession`] returned to the controller is
//! just a `Send` handle onto that worker.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use nokhwa::pixel_format::RgbFormat;
use nokhwa::query;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;

use crate::permissions::{is_access_denial, PermissionState};

use super::backend::{CameraBackend, CameraSession};
use super::types::{
    CameraError, CameraInfo, Frame, PhotoSettings, Resolution, SessionFormat, SessionSettings,
    StillFrame,
};

/// Platform camera backend built on nokhwa.
pub struct NativeBackend {
    api: ApiBackend,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self {
            api: ApiBackend::Auto,
        }
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for NativeBackend {
    fn request_access(&mut self) -> PermissionState {
        // Lenient probe: only a clearly access-related failure counts as a
        // denial. Anything else resolves at open time.
        match query(self.api) {
            Ok(_) => PermissionState::Granted,
            Err(e) if is_access_denial(&e.to_string()) => PermissionState::Denied,
            Err(_) => PermissionState::Granted,
        }
    }

    fn list_devices(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
        let devices = query(self.api).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

        Ok(devices
            .into_iter()
            .map(|d| CameraInfo {
                index: d.index().as_index().unwrap_or(0),
                name: d.human_name(),
                description: d.description().to_string(),
            })
            .collect())
    }

    fn bind_session(
        &mut self,
        device: &CameraInfo,
        settings: &SessionSettings,
    ) -> Result<Box<dyn CameraSession>, CameraError> {
        let session = NativeSession::bind(device.index, settings.clone())?;
        Ok(Box::new(session))
    }
}

enum SessionRequest {
    Start(Sender<Result<(), CameraError>>),
    Stop(Sender<Result<(), CameraError>>),
    Preview(Sender<Result<Frame, CameraError>>),
    Still(Sender<Result<StillFrame, CameraError>>),
    Shutdown,
}

/// `Send` handle onto the worker thread that owns the camera.
struct NativeSession {
    request_tx: Sender<SessionRequest>,
    worker: Option<JoinHandle<()>>,
    format: SessionFormat,
}

impl NativeSession {
    fn bind(index: u32, settings: SessionSettings) -> Result<Self, CameraError> {
        let (request_tx, request_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::spawn(move || run_session_worker(index, settings, ready_tx, request_rx));

        match ready_rx.recv() {
            Ok(Ok(format)) => Ok(Self {
                request_tx,
                worker: Some(worker),
                format,
            }),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => {
                let _ = worker.join();
                Err(CameraError::InputBindingFailed(
                    "session worker terminated during bind".to_string(),
                ))
            }
        }
    }

    fn request<T>(
        &self,
        make: impl FnOnce(Sender<Result<T, CameraError>>) -> SessionRequest,
    ) -> Result<T, CameraError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.request_tx
            .send(make(reply_tx))
            .map_err(|_| worker_gone())?;
        reply_rx.recv().map_err(|_| worker_gone())?
    }
}

fn worker_gone() -> CameraError {
    CameraError::StreamFailed("session worker terminated".to_string())
}

impl CameraSession for NativeSession {
    fn active_format(&self) -> SessionFormat {
        self.format
    }

    fn start_stream(&mut self) -> Result<(), CameraError> {
        self.request(SessionRequest::Start)
    }

    fn stop_stream(&mut self) -> Result<(), CameraError> {
        self.request(SessionRequest::Stop)
    }

    fn preview_frame(&mut self) -> Result<Frame, CameraError> {
        self.request(SessionRequest::Preview)
    }

    fn capture_still(&mut self, settings: &PhotoSettings) -> Result<StillFrame, CameraError> {
        // Flash and codec preference have no control surface here; the
        // format ladder at bind time already prefers efficient stream codecs.
        let _ = settings;
        self.request(SessionRequest::Still)
    }
}

impl Drop for NativeSession {
    fn drop(&mut self) {
        let _ = self.request_tx.send(SessionRequest::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker owning the camera handle. The handle is created and destroyed on
/// this thread; readiness and every command reply go back over channels.
fn run_session_worker(
    index: u32,
    settings: SessionSettings,
    ready_tx: Sender<Result<SessionFormat, CameraError>>,
    request_rx: Receiver<SessionRequest>,
) {
    let mut camera = match open_camera_with_fallback(&CameraIndex::Index(index), &settings) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    let resolution = camera.resolution();
    let format = SessionFormat {
        resolution: Resolution {
            width: resolution.width(),
            height: resolution.height(),
        },
        fps: camera.frame_rate(),
    };
    if ready_tx.send(Ok(format)).is_err() {
        return;
    }

    let mut streaming = false;
    while let Ok(request) = request_rx.recv() {
        match request {
            SessionRequest::Start(reply) => {
                let result = if streaming {
                    Ok(())
                } else {
                    match camera.open_stream() {
                        Ok(()) => {
                            streaming = true;
                            Ok(())
                        }
                        Err(e) => Err(CameraError::StreamFailed(e.to_string())),
                    }
                };
                let _ = reply.send(result);
            }
            SessionRequest::Stop(reply) => {
                let result = if !streaming {
                    Ok(())
                } else {
                    match camera.stop_stream() {
                        Ok(()) => {
                            streaming = false;
                            Ok(())
                        }
                        Err(e) => Err(CameraError::StreamFailed(e.to_string())),
                    }
                };
                let _ = reply.send(result);
            }
            SessionRequest::Preview(reply) => {
                let _ = reply.send(grab_preview(&mut camera, streaming));
            }
            SessionRequest::Still(reply) => {
                let _ = reply.send(grab_still(&mut camera, streaming));
            }
            SessionRequest::Shutdown => break,
        }
    }

    if streaming {
        let _ = camera.stop_stream();
    }
}

/// Try to open a camera with multiple format fallback strategies, in order of
/// preference: NV12 (native on macOS), then MJPEG (widely supported, good
/// compression), then whatever highest-resolution format the camera offers
/// when high-resolution capture is requested.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &SessionSettings,
) -> Result<Camera, CameraError> {
    let closest = |format: NokhwaFrameFormat| {
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
            format,
            settings.fps,
        )))
    };

    let mut attempts = vec![
        closest(NokhwaFrameFormat::NV12),
        closest(NokhwaFrameFormat::MJPEG),
    ];
    if settings.high_resolution {
        attempts.push(RequestedFormat::new::<RgbFormat>(
            RequestedFormatType::AbsoluteHighestResolution,
        ));
    }

    let mut last_error = None;

    for requested in attempts {
        match Camera::new(index.clone(), requested) {
            Ok(camera) => return Ok(camera),
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    match last_error {
        Some(e) if is_access_denial(&e.to_string()) => Err(CameraError::PermissionDenied),
        Some(e) => Err(CameraError::InputBindingFailed(e.to_string())),
        None => Err(CameraError::InputBindingFailed(
            "no format attempts were made".to_string(),
        )),
    }
}

fn grab_preview(camera: &mut Camera, streaming: bool) -> Result<Frame, CameraError> {
    if !streaming {
        return Err(CameraError::StreamFailed("stream is not running".to_string()));
    }
    let buffer = camera
        .frame()
        .map_err(|e| CameraError::StreamFailed(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::DecodeFailed(e.to_string()))?;
    let resolution = buffer.resolution();
    Ok(Frame::rgb(
        decoded.into_raw(),
        resolution.width(),
        resolution.height(),
    ))
}

fn grab_still(camera: &mut Camera, streaming: bool) -> Result<StillFrame, CameraError> {
    if !streaming {
        return Err(CameraError::PlatformCaptureError(
            "stream is not running".to_string(),
        ));
    }
    let buffer = camera
        .frame()
        .map_err(|e| CameraError::PlatformCaptureError(e.to_string()))?;

    // MJPEG streams deliver complete JPEGs; keep them encoded so any EXIF
    // metadata survives to the decode step.
    let bytes = buffer.buffer_bytes();
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xD8 {
        return Ok(StillFrame::Jpeg(bytes.to_vec()));
    }

    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::PlatformCaptureError(e.to_string()))?;
    let resolution = buffer.resolution();
    Ok(StillFrame::Rgb {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
    })
}
