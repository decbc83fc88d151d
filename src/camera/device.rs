//! Capture-device selection.
//!
//! Platforms expose cameras as a flat list of named devices; the desired
//! optics and position are recovered from the device labels. Matching is
//! token-based and case-insensitive over name and description.

use super::types::{CameraInfo, DeviceKind, DevicePosition};

/// Label tokens that identify a device kind. An empty list matches every
/// device: almost no webcam advertises its optics, and wide-angle is the
/// universal default.
fn kind_tokens(kind: DeviceKind) -> &'static [&'static str] {
    match kind {
        DeviceKind::WideAngle => &[],
        DeviceKind::Telephoto => &["tele"],
        DeviceKind::UltraWide => &["ultra"],
    }
}

/// Label tokens that identify a device position. `Any` matches every device.
fn position_tokens(position: DevicePosition) -> &'static [&'static str] {
    match position {
        DevicePosition::Front => &["front", "facetime", "user"],
        DevicePosition::Back => &["back", "rear", "environment"],
        DevicePosition::Any => &[],
    }
}

fn labels_match(haystack: &str, tokens: &[&str]) -> bool {
    tokens.is_empty() || tokens.iter().any(|t| haystack.contains(t))
}

/// Select the first device matching the requested kind and position.
///
/// Returns `None` when nothing matches; the caller decides whether that is
/// terminal (it is, for controller construction).
pub fn find_device(
    devices: &[CameraInfo],
    kind: DeviceKind,
    position: DevicePosition,
) -> Option<&CameraInfo> {
    devices.iter().find(|d| {
        let labels = format!("{} {}", d.name, d.description).to_lowercase();
        labels_match(&labels, kind_tokens(kind)) && labels_match(&labels, position_tokens(position))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: u32, name: &str, description: &str) -> CameraInfo {
        CameraInfo {
            index,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_any_position_matches_unlabeled_webcam() {
        let devices = vec![device(0, "HD Pro Webcam C920", "USB video device")];
        let found = find_device(&devices, DeviceKind::WideAngle, DevicePosition::Any);
        assert_eq!(found.map(|d| d.index), Some(0));
    }

    #[test]
    fn test_front_position_matches_facetime() {
        let devices = vec![
            device(0, "Back Camera", "rear module"),
            device(1, "FaceTime HD Camera", "Built-in"),
        ];
        let found = find_device(&devices, DeviceKind::WideAngle, DevicePosition::Front);
        assert_eq!(found.map(|d| d.index), Some(1));
    }

    #[test]
    fn test_back_position_skips_front_devices() {
        let devices = vec![
            device(0, "Front Camera", "user-facing"),
            device(1, "Rear Wide Camera", "main module"),
        ];
        let found = find_device(&devices, DeviceKind::WideAngle, DevicePosition::Back);
        assert_eq!(found.map(|d| d.index), Some(1));
    }

    #[test]
    fn test_kind_filter_requires_label() {
        let devices = vec![
            device(0, "Rear Wide Camera", "main module"),
            device(1, "Rear Telephoto Camera", "zoom module"),
        ];
        let found = find_device(&devices, DeviceKind::Telephoto, DevicePosition::Back);
        assert_eq!(found.map(|d| d.index), Some(1));

        let ultra = find_device(&devices, DeviceKind::UltraWide, DevicePosition::Back);
        assert!(ultra.is_none());
    }

    #[test]
    fn test_no_match_on_position() {
        let devices = vec![device(0, "Rear Camera", "main module")];
        let found = find_device(&devices, DeviceKind::WideAngle, DevicePosition::Front);
        assert!(found.is_none());
    }

    #[test]
    fn test_empty_device_list() {
        let found = find_device(&[], DeviceKind::WideAngle, DevicePosition::Any);
        assert!(found.is_none());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let devices = vec![device(0, "REAR ULTRA WIDE", "")];
        let found = find_device(&devices, DeviceKind::UltraWide, DevicePosition::Back);
        assert_eq!(found.map(|d| d.index), Some(0));
    }
}
