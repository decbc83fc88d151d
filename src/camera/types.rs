//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use crate::permissions::CAMERA_SETTINGS_PATH;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// The kind of camera optics to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// Standard wide-angle camera (the default on virtually every device)
    #[default]
    WideAngle,
    /// Telephoto camera
    Telephoto,
    /// Ultra-wide camera
    UltraWide,
}

impl DeviceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::WideAngle => "wide-angle",
            DeviceKind::Telephoto => "telephoto",
            DeviceKind::UltraWide => "ultra-wide",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the device the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePosition {
    /// Front-facing (selfie) camera
    Front,
    /// Back-facing camera
    Back,
    /// Any position; the first available device wins
    #[default]
    Any,
}

impl DevicePosition {
    pub fn label(&self) -> &'static str {
        match self {
            DevicePosition::Front => "front",
            DevicePosition::Back => "back",
            DevicePosition::Any => "any",
        }
    }
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Low resolution (320x240) - fast, low bandwidth
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };

    /// Medium resolution (640x480) - balanced, recommended
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// High resolution (1280x720) - for large preview surfaces
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGB frame from raw pixel data, stamped now.
    pub fn rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        }
    }

    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }

    /// Mirror the frame horizontally (flip left-right), selfie style.
    pub fn mirror_horizontal(&mut self) {
        let width = self.width as usize;
        let height = self.height as usize;
        let bpp = self.bytes_per_pixel();

        for y in 0..height {
            let row_start = y * width * bpp;
            let row = &mut self.data[row_start..row_start + width * bpp];

            for x in 0..width / 2 {
                let left = x * bpp;
                let right = (width - 1 - x) * bpp;
                for i in 0..bpp {
                    row.swap(left + i, right + i);
                }
            }
        }
    }
}

/// Display orientation of a still image, as encoded by EXIF tag 0x0112.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Row 0 at top, column 0 at left (EXIF 1)
    #[default]
    Up,
    /// Mirrored along the vertical axis (EXIF 2)
    UpMirrored,
    /// Rotated 180 degrees (EXIF 3)
    Down,
    /// Mirrored along the horizontal axis (EXIF 4)
    DownMirrored,
    /// Mirrored then rotated 90 degrees clockwise (EXIF 5)
    LeftMirrored,
    /// Rotated 90 degrees clockwise (EXIF 6)
    Right,
    /// Mirrored then rotated 90 degrees counter-clockwise (EXIF 7)
    RightMirrored,
    /// Rotated 90 degrees counter-clockwise (EXIF 8)
    Left,
}

impl Orientation {
    /// Map a raw EXIF orientation value (1-8) to an `Orientation`.
    ///
    /// Returns `None` for out-of-range values.
    pub fn from_exif(value: u16) -> Option<Self> {
        match value {
            1 => Some(Orientation::Up),
            2 => Some(Orientation::UpMirrored),
            3 => Some(Orientation::Down),
            4 => Some(Orientation::DownMirrored),
            5 => Some(Orientation::LeftMirrored),
            6 => Some(Orientation::Right),
            7 => Some(Orientation::RightMirrored),
            8 => Some(Orientation::Left),
            _ => None,
        }
    }
}

/// Flash policy for still capture.
///
/// The backend applies this where the hardware supports it and ignores it
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashMode {
    /// Let the platform decide based on scene brightness
    #[default]
    Auto,
    /// Always fire
    On,
    /// Never fire
    Off,
}

/// Settings for the live capture session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Requested capture resolution (actual may differ)
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror preview frames horizontally (selfie mode); stills are never mirrored
    pub mirror_preview: bool,
    /// Enable high-resolution still capture where supported
    pub high_resolution: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30,
            mirror_preview: false,
            high_resolution: true,
        }
    }
}

/// Settings for a single still-photo capture.
#[derive(Debug, Clone)]
pub struct PhotoSettings {
    /// Flash policy
    pub flash: FlashMode,
    /// Prefer a high-efficiency codec when the platform offers one
    pub prefer_efficient_codec: bool,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            flash: FlashMode::Auto,
            prefer_efficient_codec: true,
        }
    }
}

/// Full controller configuration: which device to bind and how to run it.
#[derive(Debug, Clone, Default)]
pub struct ControllerSettings {
    /// Desired camera optics
    pub kind: DeviceKind,
    /// Desired camera position
    pub position: DevicePosition,
    /// Live session settings
    pub session: SessionSettings,
    /// Per-capture photo settings
    pub photo: PhotoSettings,
}

/// The format a bound session is actually running at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFormat {
    pub resolution: Resolution,
    pub fps: u32,
}

/// A still frame as delivered by the platform, before decoding.
#[derive(Debug, Clone)]
pub enum StillFrame {
    /// Encoded JPEG bytes straight from the stream
    Jpeg(Vec<u8>),
    /// Already-decoded RGB pixels
    Rgb {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

/// A decoded, displayable still image.
#[derive(Debug, Clone)]
pub struct StillImage {
    /// RGB bitmap
    pub bitmap: Frame,
    /// Display orientation read from the frame's metadata
    pub orientation: Orientation,
}

/// Errors that can occur during camera operations.
#[derive(Debug, Clone)]
pub enum CameraError {
    /// Camera permission denied by the platform
    PermissionDenied,
    /// No device matches the requested kind and position
    NoMatchingDevice {
        kind: DeviceKind,
        position: DevicePosition,
    },
    /// Failed to query camera devices
    QueryFailed(String),
    /// The device could not be bound as a session input
    InputBindingFailed(String),
    /// The photo output could not be bound to the session
    OutputBindingFailed(String),
    /// The controller has no configured, running session
    NotConfigured,
    /// The live stream failed to start or died
    StreamFailed(String),
    /// The platform reported a capture error
    PlatformCaptureError(String),
    /// The captured frame had no decodable representation
    DecodeFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Camera permission denied. On macOS, grant access in {}",
                    CAMERA_SETTINGS_PATH
                )
            }
            CameraError::NoMatchingDevice { kind, position } => {
                write!(
                    f,
                    "No {} camera found at position '{}'. Check that a camera is connected",
                    kind, position
                )
            }
            CameraError::QueryFailed(msg) => write!(f, "Failed to query cameras: {}", msg),
            CameraError::InputBindingFailed(msg) => {
                write!(f, "Failed to bind camera as session input: {}", msg)
            }
            CameraError::OutputBindingFailed(msg) => {
                write!(f, "Failed to bind photo output to session: {}", msg)
            }
            CameraError::NotConfigured => {
                write!(f, "Capture session is not configured and running")
            }
            CameraError::StreamFailed(msg) => write!(f, "Failed to run camera stream: {}", msg),
            CameraError::PlatformCaptureError(msg) => {
                write!(f, "Platform reported a capture error: {}", msg)
            }
            CameraError::DecodeFailed(msg) => {
                write!(f, "Captured frame could not be decoded: {}", msg)
            }
        }
    }
}

impl std::error::Error for CameraError {}
