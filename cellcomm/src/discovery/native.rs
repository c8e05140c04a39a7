//! Native port search using the `serialport` crate.

use {
    crate::{discovery::PortSearch, error::Result},
    log::trace,
    serialport::{SerialPortType, UsbPortInfo},
};

/// USB vendor/product identifier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsbId {
    /// USB Vendor ID.
    pub vid: u16,
    /// USB Product ID.
    pub pid: u16,
}

impl UsbId {
    /// Check if this identifier matches the given USB info.
    pub fn matches(&self, vid: u16, pid: u16) -> bool {
        self.vid == vid && self.pid == pid
    }
}

/// USB bridges fitted to family B boards.
pub const DEFAULT_FAMILY_B_DEVICES: &[UsbId] = &[
    // FTDI FT231X
    UsbId {
        vid: 0x0403,
        pid: 0x6015,
    },
    // Silicon Labs CP2102N
    UsbId {
        vid: 0x10C4,
        pid: 0xEA60,
    },
];

/// Port search over the serial ports enumerated by the operating system.
///
/// The default family B IDs are generic USB bridges, so a family A board
/// built on one of them matches both searches. [`discover_ports`] lists such
/// a port once.
///
/// [`discover_ports`]: crate::discover_ports
#[derive(Debug, Clone)]
pub struct NativePortSearch {
    family_b: Vec<UsbId>,
}

impl NativePortSearch {
    /// Create a search that recognizes family B boards by `family_b` IDs.
    pub fn new(family_b: Vec<UsbId>) -> Self {
        Self { family_b }
    }

    /// USB IDs recognized as family B.
    pub fn family_b_devices(&self) -> &[UsbId] {
        &self.family_b
    }

    fn usb_ports() -> Result<Vec<(String, UsbPortInfo)>> {
        Ok(serialport::available_ports()?
            .into_iter()
            .filter_map(|p| match p.port_type {
                SerialPortType::UsbPort(info) => Some((p.port_name, info)),
                _ => None,
            })
            .collect())
    }
}

impl Default for NativePortSearch {
    fn default() -> Self {
        Self::new(DEFAULT_FAMILY_B_DEVICES.to_vec())
    }
}

impl PortSearch for NativePortSearch {
    fn search_family_a(&mut self, id: &str) -> Result<Vec<String>> {
        Ok(Self::usb_ports()?
            .into_iter()
            .filter(|(name, info)| {
                let hit = descriptor_matches(
                    [
                        info.product.as_deref(),
                        info.manufacturer.as_deref(),
                        info.serial_number.as_deref(),
                    ],
                    id,
                );
                trace!(
                    "Family A check {name} (VID: {:04X}, PID: {:04X}): {hit}",
                    info.vid, info.pid
                );
                hit
            })
            .map(|(name, _)| name)
            .collect())
    }

    fn search_family_b(&mut self) -> Result<Vec<String>> {
        Ok(Self::usb_ports()?
            .into_iter()
            .filter(|(name, info)| {
                let hit = self
                    .family_b
                    .iter()
                    .any(|id| id.matches(info.vid, info.pid));
                trace!(
                    "Family B check {name} (VID: {:04X}, PID: {:04X}): {hit}",
                    info.vid, info.pid
                );
                hit
            })
            .map(|(name, _)| name)
            .collect())
    }
}

/// Case-insensitive substring match of `id` against any USB descriptor string.
fn descriptor_matches(fields: [Option<&str>; 3], id: &str) -> bool {
    if id.is_empty() {
        return false;
    }
    let needle = id.to_lowercase();
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_matches_case_insensitive() {
        assert!(descriptor_matches(
            [Some("BtComm Board v2"), None, None],
            "BTCOMM"
        ));
        assert!(descriptor_matches([None, None, Some("btcomm-0042")], "BtComm"));
        assert!(!descriptor_matches(
            [Some("USB Serial"), Some("FTDI"), None],
            "BTCOMM"
        ));
    }

    #[test]
    fn test_descriptor_matches_rejects_empty_id() {
        assert!(!descriptor_matches([Some("anything"), None, None], ""));
    }

    #[test]
    fn test_usb_id_matches() {
        let id = UsbId {
            vid: 0x0403,
            pid: 0x6015,
        };
        assert!(id.matches(0x0403, 0x6015));
        assert!(!id.matches(0x0403, 0x6001));
        assert!(!id.matches(0x10C4, 0x6015));
    }

    #[test]
    fn test_default_family_b_devices() {
        let search = NativePortSearch::default();
        assert_eq!(search.family_b_devices(), DEFAULT_FAMILY_B_DEVICES);
    }

    #[test]
    fn test_native_search_does_not_panic() {
        // Just make sure enumeration doesn't panic
        let mut search = NativePortSearch::default();
        let _ = search.search_family_a("BTCOMM");
        let _ = search.search_family_b();
    }
}
