//! Display-surface seam for the live preview feed.
//!
//! The embedding UI layer implements [`PreviewSurface`]; the feed loop hands
//! it each preview frame. [`fit_rect`] does the gravity placement math so
//! surface implementations only have to blit.

use super::types::Frame;

/// How preview frames are scaled into the surface bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoGravity {
    /// Fill the surface, cropping overflow (preserves aspect ratio)
    #[default]
    AspectFill,
    /// Fit inside the surface, letterboxing the rest (preserves aspect ratio)
    AspectFit,
}

/// Placement of a frame inside a surface, in surface coordinates.
///
/// `x`/`y` can be negative under `AspectFill`: the frame overflows the bounds
/// and the surface clips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A surface that renders the live preview feed.
///
/// Implementations are driven from the feed-loop thread, so they must be
/// `Send`. Rendering should be cheap; the loop pumps at stream rate.
pub trait PreviewSurface: Send {
    /// The gravity this surface wants frames scaled with.
    fn gravity(&self) -> VideoGravity {
        VideoGravity::AspectFill
    }

    /// Render one preview frame.
    fn render(&mut self, frame: &Frame);
}

/// Compute where a frame of `frame_size` lands inside `bounds` under
/// `gravity`, centered both ways. Degenerate inputs produce an empty rect.
pub fn fit_rect(frame_size: (u32, u32), bounds: (u32, u32), gravity: VideoGravity) -> Rect {
    let (fw, fh) = frame_size;
    let (bw, bh) = bounds;
    if fw == 0 || fh == 0 || bw == 0 || bh == 0 {
        return Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    let sx = bw as f64 / fw as f64;
    let sy = bh as f64 / fh as f64;
    let scale = match gravity {
        VideoGravity::AspectFill => sx.max(sy),
        VideoGravity::AspectFit => sx.min(sy),
    };

    let width = (fw as f64 * scale).round() as u32;
    let height = (fh as f64 * scale).round() as u32;
    Rect {
        x: (bw as i64 - width as i64) as i32 / 2,
        y: (bh as i64 - height as i64) as i32 / 2,
        width,
        height,
    }
}
