//! Link driver contract.
//!
//! The vendor link is reached only through [`LinkDriver`]. Its wire encoding
//! is not this crate's concern; an implementation performs exactly one
//! physical transaction per call and reports the vendor's raw outcome code.
//!
//! ```text
//! +-------------------------------+
//! |          Controller           |  retries, polling, result mapping
//! +---------------+---------------+
//!                 |
//!                 v
//! +---------------+---------------+
//! |       LinkDriver trait        |  one transaction per call
//! +---------------+---------------+
//!                 |
//!                 v
//! +---------------+---------------+
//! |   vendor serial link / fake   |
//! +-------------------------------+
//! ```
//!
//! Returning `Err` from any method means the driver faulted. The controller
//! maps that to [`CommResult::ExceptionCaught`](crate::CommResult::ExceptionCaught).

use crate::error::Result;
use crate::result::RawCode;

/// Raw reply to a block read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRead {
    /// Driver outcome.
    pub code: RawCode,
    /// Payload bytes returned by the device.
    pub data: Vec<u8>,
    /// Check value (PEC byte) reported alongside the payload.
    pub check: u8,
}

/// Raw reply to a word read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRead {
    /// Driver outcome.
    pub code: RawCode,
    /// Word value.
    pub value: u16,
}

/// Raw reply to a flash fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRead {
    /// Driver outcome.
    pub code: RawCode,
    /// Bytes fetched from the board buffer.
    pub data: Vec<u8>,
}

/// Primitive transactions offered by the vendor communication link.
pub trait LinkDriver: Send {
    /// Open the serial handle for `port`. `Ok(false)` means the open was refused.
    fn open_serial(&mut self, port: &str) -> Result<bool>;

    /// Close the serial handle.
    fn close_serial(&mut self) -> Result<()>;

    /// Read one word from `command` on the device at `address`.
    fn read_word(&mut self, address: u8, command: u8) -> Result<WordRead>;

    /// Write one word to `command` on the device at `address`.
    fn write_word(&mut self, address: u8, command: u8, value: u16) -> Result<RawCode>;

    /// Read a block from `command` on the device at `address`.
    fn read_block(&mut self, address: u8, command: u8) -> Result<BlockRead>;

    /// Write a block to `command` on the device at `address`.
    fn write_block(&mut self, address: u8, command: u8, data: &[u8]) -> Result<RawCode>;

    /// Ask the board to buffer `len` bytes of flash starting at `address`.
    fn flash_read_prepare(&mut self, address: u32, len: usize, pec: bool) -> Result<RawCode>;

    /// Fetch `len` previously buffered flash bytes.
    fn flash_read_fetch(&mut self, len: usize, pec: bool) -> Result<FlashRead>;

    /// Write `data` to flash at `address`.
    fn flash_write(&mut self, address: u32, data: &[u8], pec: bool) -> Result<RawCode>;

    /// Read the raw, fixed-size version buffer of the board behind `port`.
    fn board_version(&mut self, port: &str) -> Result<Vec<u8>>;
}

impl<D: LinkDriver + ?Sized> LinkDriver for Box<D> {
    fn open_serial(&mut self, port: &str) -> Result<bool> {
        (**self).open_serial(port)
    }

    fn close_serial(&mut self) -> Result<()> {
        (**self).close_serial()
    }

    fn read_word(&mut self, address: u8, command: u8) -> Result<WordRead> {
        (**self).read_word(address, command)
    }

    fn write_word(&mut self, address: u8, command: u8, value: u16) -> Result<RawCode> {
        (**self).write_word(address, command, value)
    }

    fn read_block(&mut self, address: u8, command: u8) -> Result<BlockRead> {
        (**self).read_block(address, command)
    }

    fn write_block(&mut self, address: u8, command: u8, data: &[u8]) -> Result<RawCode> {
        (**self).write_block(address, command, data)
    }

    fn flash_read_prepare(&mut self, address: u32, len: usize, pec: bool) -> Result<RawCode> {
        (**self).flash_read_prepare(address, len, pec)
    }

    fn flash_read_fetch(&mut self, len: usize, pec: bool) -> Result<FlashRead> {
        (**self).flash_read_fetch(len, pec)
    }

    fn flash_write(&mut self, address: u32, data: &[u8], pec: bool) -> Result<RawCode> {
        (**self).flash_write(address, data, pec)
    }

    fn board_version(&mut self, port: &str) -> Result<Vec<u8>> {
        (**self).board_version(port)
    }
}
