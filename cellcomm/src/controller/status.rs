//! One-byte status register access.

use super::Controller;
use crate::driver::LinkDriver;
use crate::result::CommResult;
use log::debug;

/// Status byte reported once the last operation finished cleanly.
pub const STATUS_CLEAN: u8 = 0x00;

/// Status byte assumed when erase confirmation times out.
pub const STATUS_INDETERMINATE: u8 = 0xFF;

impl<D: LinkDriver> Controller<D> {
    /// Clear the status register of the device at `address`.
    pub fn clear_status(&mut self, address: u8) -> CommResult {
        let command = self.commands.clear_status;
        self.write_block(address, command, &[])
    }

    /// Read the status register of the device at `address`.
    ///
    /// Succeeds only when the device returns exactly one byte; any other
    /// length is a `Failure` even if the driver reported success.
    pub fn read_status(&mut self, address: u8) -> Result<u8, CommResult> {
        let command = self.commands.read_status;
        let block = self.read_block(address, command)?;
        match block.data.as_slice() {
            [status] => Ok(*status),
            other => {
                debug!(
                    "Status read from {address:#04x} returned {} byte(s), expected 1",
                    other.len()
                );
                Err(CommResult::Failure)
            },
        }
    }
}
