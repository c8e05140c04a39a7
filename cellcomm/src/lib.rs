//! # cellcomm
//!
//! A control layer for serial-attached battery-test communication boards.
//!
//! This crate turns high-level requests into bounded sequences of primitive
//! transactions on a vendor communication link:
//!
//! - Word and block transfers with result mapping
//! - One-byte status register access
//! - Flash page read/write and block erase with retry and confirmation polling
//! - Board version retrieval and firmware-update escape
//! - Port discovery across two board families
//!
//! The vendor link itself is abstracted by the [`LinkDriver`] trait; this
//! crate never encodes bytes on the wire.
//!
//! ## Features
//!
//! - `native` (default): port discovery through the `serialport` crate
//! - `serde`: serialization support for configuration and data types
//!
//! ## Example
//!
//! ```rust,no_run
//! use cellcomm::{CommResult, Controller, LinkDriver};
//!
//! fn battery_voltage<D: LinkDriver>(driver: D, port: &str) -> Result<u16, CommResult> {
//!     let mut board = Controller::new(driver);
//!     board.open(port).into_result()?;
//!
//!     let version = board.board_version()?;
//!     println!("Board firmware {version}");
//!
//!     // SBS Voltage() on the gauge at 0x16
//!     let millivolts = board.read_word(0x16, 0x09)?;
//!     board.close().into_result()?;
//!     Ok(millivolts)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod controller;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod result;
pub mod timing;

#[cfg(test)]
pub(crate) mod mock;

// Re-exports for convenience
#[cfg(feature = "native")]
pub use discovery::{NativePortSearch, UsbId};
pub use {
    commands::{CommandSet, EraseRequest},
    controller::{Block, Controller, decode_version_string},
    discovery::{
        BoardFamily, Discovery, PortDescriptor, PortSearch, discover_ports, format_port_list,
    },
    driver::{BlockRead, FlashRead, LinkDriver, WordRead},
    error::{Error, Result},
    result::{CommResult, OperationMode, RawCode, translate},
    timing::{CancelToken, Clock, SystemClock, Timing},
};
