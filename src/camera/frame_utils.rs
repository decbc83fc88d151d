//! Still-frame decoding and metadata extraction.

use super::types::{CameraError, Frame, Orientation, StillFrame, StillImage};

/// Decode a platform still frame into a displayable image.
///
/// JPEG stills are decoded with the `image` crate and carry the orientation
/// read from their EXIF metadata (`Up` when the tag is absent). Raw RGB
/// stills pass through after a length check.
///
/// # Errors
/// * `CameraError::DecodeFailed` - undecodable JPEG or short RGB buffer
pub fn decode_still(frame: StillFrame) -> Result<StillImage, CameraError> {
    match frame {
        StillFrame::Jpeg(bytes) => {
            let orientation = exif_orientation(&bytes).unwrap_or_default();
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| CameraError::DecodeFailed(e.to_string()))?;
            let rgb = decoded.to_rgb8();
            let (width, height) = rgb.dimensions();
            Ok(StillImage {
                bitmap: Frame::rgb(rgb.into_raw(), width, height),
                orientation,
            })
        }
        StillFrame::Rgb {
            data,
            width,
            height,
        } => {
            let expected = width as usize * height as usize * 3;
            if data.len() != expected {
                return Err(CameraError::DecodeFailed(format!(
                    "RGB buffer is {} bytes, expected {} for {}x{}",
                    data.len(),
                    expected,
                    width,
                    height
                )));
            }
            Ok(StillImage {
                bitmap: Frame::rgb(data, width, height),
                orientation: Orientation::Up,
            })
        }
    }
}

/// Read the EXIF orientation tag (0x0112) from a JPEG buffer.
///
/// Walks the JPEG segment list to the APP1/Exif segment, then the first TIFF
/// IFD. Returns `None` when the buffer is not a JPEG, carries no EXIF, or the
/// tag is missing or out of range. Never panics on truncated input.
pub fn exif_orientation(jpeg: &[u8]) -> Option<Orientation> {
    // SOI marker
    if jpeg.len() < 4 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    loop {
        if *jpeg.get(pos)? != 0xFF {
            return None;
        }
        // Skip fill bytes
        while *jpeg.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        let marker = *jpeg.get(pos + 1)?;
        match marker {
            // Standalone markers without a length field
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // Start of scan / end of image: no EXIF ahead of the image data
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let len = read_u16(jpeg, pos + 2, false)? as usize;
        if len < 2 {
            return None;
        }
        let body = jpeg.get(pos + 4..pos + 2 + len)?;

        if marker == 0xE1 && body.len() > 6 && &body[..6] == b"Exif\0\0" {
            return tiff_orientation(&body[6..]);
        }

        pos += 2 + len;
    }
}

/// Find tag 0x0112 in the first IFD of a TIFF block.
fn tiff_orientation(tiff: &[u8]) -> Option<Orientation> {
    let byte_order = tiff.get(..2)?;
    let little_endian = if byte_order == b"II" {
        true
    } else if byte_order == b"MM" {
        false
    } else {
        return None;
    };
    if read_u16(tiff, 2, little_endian)? != 42 {
        return None;
    }

    let ifd = read_u32(tiff, 4, little_endian)? as usize;
    let entries = read_u16(tiff, ifd, little_endian)? as usize;

    for i in 0..entries {
        let entry = ifd + 2 + i * 12;
        let tag = read_u16(tiff, entry, little_endian)?;
        if tag != 0x0112 {
            continue;
        }
        // Type SHORT, count 1: the value lives in the first two bytes of
        // the 4-byte value field.
        let value = read_u16(tiff, entry + 8, little_endian)?;
        return Orientation::from_exif(value);
    }

    None
}

fn read_u16(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    let value = if little_endian {
        u16::from_le_bytes([raw[0], raw[1]])
    } else {
        u16::from_be_bytes([raw[0], raw[1]])
    };
    Some(value)
}

fn read_u32(bytes: &[u8], offset: usize, little_endian: bool) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    let value = if little_endian {
        u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])
    } else {
        u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])
    };
    Some(value)
}
