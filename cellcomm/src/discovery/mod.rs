//! Board discovery across the two supported board families.
//!
//! Family A boards are found by an identifier string, family B boards by a
//! second, distinct identifier owned by the search backend. Both searches
//! always run; the merged list puts family A first and numbers entries
//! continuously.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "native")]
//! # {
//! use cellcomm::discovery::{NativePortSearch, discover_ports};
//!
//! let mut search = NativePortSearch::default();
//! let discovery = discover_ports(&mut search, "BTCOMM");
//! for port in &discovery.ports {
//!     println!("{}: {} ({})", port.index, port.name, port.family);
//! }
//! # }
//! ```

#[cfg(feature = "native")]
pub mod native;

use crate::error::Result;
use crate::result::CommResult;
use log::{debug, warn};
use std::fmt;

#[cfg(feature = "native")]
pub use native::{NativePortSearch, UsbId};

/// Hardware variant of a communication board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardFamily {
    /// Boards matched by identifier string.
    FamilyA,
    /// Boards matched by the backend's second identifier.
    FamilyB,
}

impl fmt::Display for BoardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FamilyA => write!(f, "family A"),
            Self::FamilyB => write!(f, "family B"),
        }
    }
}

/// One discovered board port.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortDescriptor {
    /// Position in the merged list.
    pub index: usize,
    /// Port name/path (e.g., "COM3" or "/dev/ttyUSB0").
    pub name: String,
    /// Board family the port was found by.
    pub family: BoardFamily,
}

/// Merged outcome of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// `PortDetected` when `ports` is non-empty, `PortNotDetected` otherwise.
    pub result: CommResult,
    /// Family A ports followed by family B ports.
    pub ports: Vec<PortDescriptor>,
}

impl Discovery {
    /// Whether at least one port was found.
    pub fn is_detected(&self) -> bool {
        self.result == CommResult::PortDetected
    }
}

/// Backend performing the device-specific port searches.
pub trait PortSearch {
    /// Names of family A ports matching `id`.
    fn search_family_a(&mut self, id: &str) -> Result<Vec<String>>;

    /// Names of family B ports.
    fn search_family_b(&mut self) -> Result<Vec<String>>;
}

/// Run both family searches and merge them into one indexed list.
///
/// A search that fails is logged and treated as having found nothing. A port
/// reported by both searches is listed once, as family A.
pub fn discover_ports<S: PortSearch + ?Sized>(search: &mut S, family_a_id: &str) -> Discovery {
    let family_a = search.search_family_a(family_a_id).unwrap_or_else(|e| {
        warn!("Family A port search failed: {e}");
        Vec::new()
    });
    let mut family_b = search.search_family_b().unwrap_or_else(|e| {
        warn!("Family B port search failed: {e}");
        Vec::new()
    });
    family_b.retain(|name| {
        let seen = family_a.contains(name);
        if seen {
            debug!("{name} matched both families, keeping it as family A");
        }
        !seen
    });

    debug!(
        "Port search found {} family A and {} family B port(s)",
        family_a.len(),
        family_b.len()
    );

    let ports: Vec<PortDescriptor> = family_a
        .into_iter()
        .map(|name| (name, BoardFamily::FamilyA))
        .chain(
            family_b
                .into_iter()
                .map(|name| (name, BoardFamily::FamilyB)),
        )
        .enumerate()
        .map(|(index, (name, family))| PortDescriptor {
            index,
            name,
            family,
        })
        .collect();

    let result = if ports.is_empty() {
        CommResult::PortNotDetected
    } else {
        CommResult::PortDetected
    };

    Discovery { result, ports }
}

/// Format a list of discovered ports for display.
pub fn format_port_list(ports: &[PortDescriptor]) -> Vec<String> {
    ports
        .iter()
        .map(|port| format!("{}: {} [{}]", port.index, port.name, port.family))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct StubSearch {
        family_a: Result<Vec<String>>,
        family_b: Result<Vec<String>>,
        seen_id: Option<String>,
        b_calls: usize,
    }

    impl StubSearch {
        fn new(family_a: Result<Vec<String>>, family_b: Result<Vec<String>>) -> Self {
            Self {
                family_a,
                family_b,
                seen_id: None,
                b_calls: 0,
            }
        }
    }

    fn take(result: &mut Result<Vec<String>>) -> Result<Vec<String>> {
        std::mem::replace(result, Ok(Vec::new()))
    }

    impl PortSearch for StubSearch {
        fn search_family_a(&mut self, id: &str) -> Result<Vec<String>> {
            self.seen_id = Some(id.to_string());
            take(&mut self.family_a)
        }

        fn search_family_b(&mut self) -> Result<Vec<String>> {
            self.b_calls += 1;
            take(&mut self.family_b)
        }
    }

    fn names(list: &[&str]) -> Result<Vec<String>> {
        Ok(list.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_merge_keeps_order_and_offsets_indices() {
        let mut search = StubSearch::new(names(&["COM3", "COM5"]), names(&["COM7"]));
        let discovery = discover_ports(&mut search, "BTCOMM");

        assert_eq!(discovery.result, CommResult::PortDetected);
        assert_eq!(
            discovery.ports,
            vec![
                PortDescriptor {
                    index: 0,
                    name: "COM3".into(),
                    family: BoardFamily::FamilyA,
                },
                PortDescriptor {
                    index: 1,
                    name: "COM5".into(),
                    family: BoardFamily::FamilyA,
                },
                PortDescriptor {
                    index: 2,
                    name: "COM7".into(),
                    family: BoardFamily::FamilyB,
                },
            ]
        );
        assert_eq!(search.seen_id.as_deref(), Some("BTCOMM"));
    }

    #[test]
    fn test_empty_searches_report_not_detected() {
        let mut search = StubSearch::new(names(&[]), names(&[]));
        let discovery = discover_ports(&mut search, "BTCOMM");

        assert_eq!(discovery.result, CommResult::PortNotDetected);
        assert!(discovery.ports.is_empty());
        assert!(!discovery.is_detected());
    }

    #[test]
    fn test_family_b_only() {
        let mut search = StubSearch::new(names(&[]), names(&["/dev/ttyUSB1", "/dev/ttyUSB2"]));
        let discovery = discover_ports(&mut search, "BTCOMM");

        assert!(discovery.is_detected());
        assert_eq!(discovery.ports[0].index, 0);
        assert_eq!(discovery.ports[1].index, 1);
        assert!(
            discovery
                .ports
                .iter()
                .all(|p| p.family == BoardFamily::FamilyB)
        );
    }

    #[test]
    fn test_port_matching_both_families_listed_once() {
        let mut search = StubSearch::new(names(&["COM3", "COM7"]), names(&["COM7", "COM9"]));
        let discovery = discover_ports(&mut search, "BTCOMM");

        let listed: Vec<_> = discovery
            .ports
            .iter()
            .map(|p| (p.index, p.name.as_str(), p.family))
            .collect();
        assert_eq!(
            listed,
            [
                (0, "COM3", BoardFamily::FamilyA),
                (1, "COM7", BoardFamily::FamilyA),
                (2, "COM9", BoardFamily::FamilyB),
            ]
        );
    }

    #[test]
    fn test_failed_search_does_not_abort_the_other() {
        let mut search = StubSearch::new(
            Err(Error::Driver("enumeration crashed".into())),
            names(&["COM7"]),
        );
        let discovery = discover_ports(&mut search, "BTCOMM");

        assert_eq!(search.b_calls, 1);
        assert_eq!(discovery.result, CommResult::PortDetected);
        assert_eq!(discovery.ports.len(), 1);
        assert_eq!(discovery.ports[0].name, "COM7");
        assert_eq!(discovery.ports[0].index, 0);
    }

    #[test]
    fn test_both_searches_failing() {
        let mut search = StubSearch::new(
            Err(Error::Driver("a".into())),
            Err(Error::Driver("b".into())),
        );
        let discovery = discover_ports(&mut search, "BTCOMM");

        assert_eq!(discovery.result, CommResult::PortNotDetected);
        assert!(discovery.ports.is_empty());
    }

    #[test]
    fn test_format_port_list() {
        let ports = vec![
            PortDescriptor {
                index: 0,
                name: "COM3".into(),
                family: BoardFamily::FamilyA,
            },
            PortDescriptor {
                index: 1,
                name: "COM7".into(),
                family: BoardFamily::FamilyB,
            },
        ];

        let formatted = format_port_list(&ports);
        assert_eq!(formatted, vec!["0: COM3 [family A]", "1: COM7 [family B]"]);
    }
}
