//! Word and block transfers.
//!
//! Each operation is exactly one driver round-trip. Nothing here retries.

use super::Controller;
use crate::driver::LinkDriver;
use crate::result::{CommResult, translate};
use log::trace;

/// Block payload returned by [`Controller::read_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Payload bytes.
    pub data: Vec<u8>,
    /// Check value reported by the driver.
    pub check: u8,
}

impl<D: LinkDriver> Controller<D> {
    /// Read a word from `command` on the device at `address`.
    pub fn read_word(&mut self, address: u8, command: u8) -> Result<u16, CommResult> {
        self.ensure_open("read_word")?;
        let reply = self.call("read_word", |d| d.read_word(address, command))?;
        trace!(
            "read_word {address:#04x}/{command:#04x} -> {:?} {:#06x}",
            reply.code, reply.value
        );
        translate(reply.code).into_result().map(|()| reply.value)
    }

    /// Write `value` to `command` on the device at `address`.
    pub fn write_word(&mut self, address: u8, command: u8, value: u16) -> CommResult {
        if let Err(result) = self.ensure_open("write_word") {
            return result;
        }
        match self.call("write_word", |d| d.write_word(address, command, value)) {
            Ok(code) => {
                trace!("write_word {address:#04x}/{command:#04x} {value:#06x} -> {code:?}");
                translate(code)
            },
            Err(result) => result,
        }
    }

    /// Read a block from `command` on the device at `address`.
    pub fn read_block(&mut self, address: u8, command: u8) -> Result<Block, CommResult> {
        self.ensure_open("read_block")?;
        let reply = self.call("read_block", |d| d.read_block(address, command))?;
        trace!(
            "read_block {address:#04x}/{command:#04x} -> {:?} {} byte(s)",
            reply.code,
            reply.data.len()
        );
        translate(reply.code)
            .into_result()
            .map(|()| Block {
                data: reply.data,
                check: reply.check,
            })
    }

    /// Write `data` to `command` on the device at `address`.
    pub fn write_block(&mut self, address: u8, command: u8, data: &[u8]) -> CommResult {
        if let Err(result) = self.ensure_open("write_block") {
            return result;
        }
        match self.call("write_block", |d| d.write_block(address, command, data)) {
            Ok(code) => {
                trace!(
                    "write_block {address:#04x}/{command:#04x} {} byte(s) -> {code:?}",
                    data.len()
                );
                translate(code)
            },
            Err(result) => result,
        }
    }
}
