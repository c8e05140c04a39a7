//! Firmware-update escape.

use super::Controller;
use crate::driver::LinkDriver;
use crate::result::{CommResult, OperationMode};
use log::{info, warn};

impl<D: LinkDriver> Controller<D> {
    /// Ask the device at `address` to abort firmware-update mode.
    ///
    /// Success means the command was accepted, not that the board left the
    /// update mode. The tracked mode returns to `Normal` on acceptance.
    pub fn escape_from_update(&mut self, address: u8) -> CommResult {
        let command = self.commands.escape_update;
        let result = self.write_block(address, command, &[]);
        if result.is_success() {
            info!("Escape from update accepted by {address:#04x}");
            self.mode = OperationMode::Normal;
        } else {
            warn!("Escape from update rejected by {address:#04x}: {result}");
        }
        result
    }
}
